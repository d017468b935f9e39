//! Entry point for the Wage Engine binary.
//!
//! Reads a JSON request (or an array of requests) from the file named
//! by the first argument, or from stdin when no argument is given, and
//! prints the JSON result to stdout.  Logs go to stderr.  The directory
//! holding additional tax regime files may be set via the
//! `WAGE_REGIME_DIR` environment variable; the `config` module lists the rest.

use anyhow::{Context, Result};
use std::io::Read;
use tracing_subscriber::EnvFilter;
use vn_wage_engine::config::EngineConfig;
use vn_wage_engine::engine::{run_batch, run_request, EngineRequest};

fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input() -> Result<String> {
    match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading request file {path}")),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            Ok(buf)
        }
    }
}

fn run(config: &EngineConfig) -> Result<()> {
    let regimes = config.load_regimes().context("loading tax regimes")?;
    let raw: serde_json::Value = serde_json::from_str(&read_input()?).context("request is not valid JSON")?;

    let output = if raw.is_array() {
        let requests: Vec<EngineRequest> = serde_json::from_value(raw).context("invalid request batch")?;
        serde_json::to_string_pretty(&run_batch(requests, &regimes))?
    } else {
        let request: EngineRequest = serde_json::from_value(raw).context("invalid request")?;
        let response = run_request(request, &regimes)?;
        serde_json::to_string_pretty(&response)?
    };
    println!("{output}");
    Ok(())
}

fn main() {
    let config = EngineConfig::from_env();
    init_logging(&config);
    if let Err(err) = run(&config) {
        tracing::error!(error = %format!("{err:#}"), "request failed");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
