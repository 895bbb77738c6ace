pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod errors;
pub mod expiry;
pub mod listing;
pub mod orders;
pub mod render;
pub mod state;
pub mod status;
pub mod submission;
pub mod trees;
pub mod upload;
