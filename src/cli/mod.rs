//! Command line interface for contexto.

pub mod args;
pub mod commands;
pub mod config;
pub mod output;

pub use args::*;
pub use commands::*;
pub use config::ContextoConfig;
pub use output::*;
