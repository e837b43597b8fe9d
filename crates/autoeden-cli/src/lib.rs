//! # Auto Eden CLI
//!
//! Command-line client for the Auto Eden car marketplace: sign in, browse
//! and manage listings, bid, request quotes and talk to the assistant.
//!
//! Commands are parsed with clap derive and dispatched to one handler module
//! per resource. Handlers go through the SDK's [`Store`](autoeden_sdk::Store)
//! so the session is renewed or expired exactly as in any other client.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;

pub use cli::*;
pub use error::*;
