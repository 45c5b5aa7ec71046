//! Library components of the `reqview` command-line tool.

pub mod config;
pub mod links;
pub mod logging;
