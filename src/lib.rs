pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod mapping;
pub mod pipeline;
