pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod model;
pub mod reflect;
pub mod resolution;
