//! Order Digest — GroupMe bot that scrapes order blocks out of chat messages.

pub mod config;
pub mod error;
pub mod extract;
pub mod groupme;
pub mod report;
pub mod server;
