pub mod config;
pub mod digest;
pub mod error;
pub mod grid;
pub mod pairs;
pub mod progress;
pub mod search;
