//! # doolally-cli — Command-Line Validation
//!
//! Provides the `doolally` binary over the service payload [`Catalog`].
//!
//! ## Subcommands
//!
//! - `doolally list`: catalog schemas with their field counts.
//! - `doolally schema <NAME>`: the emitted JSON-Schema document.
//! - `doolally validate <NAME> [PATH]`: validate a JSON or YAML document
//!   read from `PATH` or stdin.
//!
//! ```bash
//! doolally validate InsertKVValuesReq payload.json
//! echo '{"blobId": "00"}' | doolally validate InsertBlobResp
//! doolally -vv --log-format json schema KVElementReq
//! ```
//!
//! [`Catalog`]: doolally_schemas::Catalog

pub mod config;
pub mod input;
pub mod list;
pub mod schema;
pub mod validate;

use config::{CliConfig, LogFormat};

/// Install the global `tracing` subscriber. Logs go to stderr so that
/// stdout carries only command output.
pub fn init_tracing(config: &CliConfig) -> Result<(), config::ConfigError> {
    let filter = config.log.filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match config.log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
