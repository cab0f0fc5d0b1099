//! Mode routing: HTTP server (default) or one-shot CLI commands

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::run_server;
