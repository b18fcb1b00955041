pub mod cli;
pub mod config;
pub mod driver;
pub mod output;
pub mod plotting;
pub mod sampler;
