pub mod client;
pub mod config;
pub mod default_colors;
pub mod error;
pub mod parse;
pub mod query;
pub mod session;
pub mod state;
pub mod thumbnail;
pub mod traits;
pub mod types;
