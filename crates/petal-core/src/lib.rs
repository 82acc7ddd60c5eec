pub mod config;
pub mod defaults;
pub mod speech;
pub mod vision;
pub mod wiki;
