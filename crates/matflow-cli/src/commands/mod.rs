//! Command handlers. Each returns a process exit code.

pub mod feed;
pub mod multiply;
pub mod produce;
