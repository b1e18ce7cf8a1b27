// Library root: re-exports all modules so integration tests and the `waves`
// binary share one implementation.

pub mod app;
pub mod cli;
pub mod config;
pub mod session;
pub mod store;
pub mod teams;
