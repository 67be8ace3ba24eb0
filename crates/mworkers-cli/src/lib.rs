//! Command-line front end for the mworkers watch pipeline.

pub mod cli;
pub mod config;
pub mod run;
