//! Command-line interface.

pub mod commands;
pub mod id_resolver;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use crate::domain::errors::DomainError;

/// Print an error in the selected output mode and exit with a non-zero code.
///
/// Domain errors carry their kind so scripts can tell a same-day conflict
/// apart from a failure.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let code = err
        .downcast_ref::<DomainError>()
        .map_or("ERROR", |e| e.kind().as_str());

    if json_mode {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "code": code,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }

    std::process::exit(1)
}
