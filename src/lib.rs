pub mod analysis;
pub mod config;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
