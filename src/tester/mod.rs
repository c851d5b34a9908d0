pub mod config;
pub mod logging;
pub mod operation;
pub mod runner;
