//! Layered configuration for a small network service.
//!
//! Precedence, lowest first: schema defaults, built-in feature switches,
//! `service.json` in the working directory, `SVC_*` environment variables, then command-line flags. The
//! debug port is always derived from the service port.
//!
//! ```text
//! SVC_LOG_LEVEL=DEBUG cargo run --example service_config -- --port 9000
//! ```

use std::ffi::OsString;

use anyhow::Result;
use clap::Command;
use ortho_schema::{
    CliFlags, Config, ConfigError, Derivation, Derivations, EnvSource, FileSource, MapSource,
    is_display_request,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Settings {
    port: u16,
    debug_port: u16,
    log_level: String,
    log_file: Option<String>,
    features: Vec<String>,
}

fn schema() -> Value {
    json!({
        "properties": {
            "PORT": {"type": "integer", "minimum": 1, "maximum": 65534, "default": 8080,
                     "description": "Port the service listens on"},
            "DEBUG_PORT": {"type": "integer", "description": "Derived debug endpoint port"},
            "LOG_LEVEL": {"type": "string", "enum": ["DEBUG", "INFO", "WARNING", "ERROR"],
                          "default": "INFO", "description": "Minimum log level"},
            "LOG_FILE": {"type": ["string", "null"], "default": null,
                         "description": "Optional log file"},
            "FEATURES": {"type": "array", "items": {"type": "string"}, "default": [],
                         "description": "Comma separated feature switches"}
        }
    })
}

fn derivations() -> Derivations {
    Derivations::new().rule(
        "DEBUG_PORT",
        Derivation::new(["PORT"], |args: &[&Value]| {
            json!(args.first().and_then(|port| port.as_i64()).unwrap_or_default() + 1)
        }),
    )
}

fn load<I, T>(args: I) -> Result<Settings, std::sync::Arc<ConfigError>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let base = Config::builder(schema())
        .derivations(derivations())
        .source(MapSource::new(json!({"FEATURES": "metrics"})).named("builtin"))
        .source(FileSource::open("service.json")?)
        .source(EnvSource::new("SVC_"))
        .build()?;
    let flags = CliFlags::from_schema(base.schema())?;
    let command = Command::new("service_config").about("Prints the resolved service settings");
    let (config, _) = flags.parse_from(&base, command, args)?;
    config.extract()
}

#[expect(clippy::print_stdout, reason = "examples report their result on stdout")]
fn main() -> Result<()> {
    let settings = match load(std::env::args_os()) {
        Ok(settings) => settings,
        Err(err) => match err.as_ref() {
            ConfigError::CliParsing(clap_err) if is_display_request(clap_err) => clap_err.exit(),
            _ => return Err(err.into()),
        },
    };
    println!("{settings:#?}");
    Ok(())
}
