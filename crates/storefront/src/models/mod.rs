//! Session-backed models.

pub mod session;
