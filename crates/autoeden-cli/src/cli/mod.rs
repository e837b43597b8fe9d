pub mod args;
pub mod commands;
pub mod handlers;

pub use args::{build_store, Args};
pub use commands::*;
