//! Command handlers for the Auto Eden CLI

pub mod ai;
pub mod auth;
pub mod bids;
pub mod config;
pub mod notifications;
pub mod quotes;
pub mod searches;
pub mod stats;
pub mod vehicles;
