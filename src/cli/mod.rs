//! CLI command handlers

pub mod commands;

pub use commands::{
    cmd_balance, cmd_demo, cmd_init, cmd_show, cmd_validate, AppState, CliResult,
};
