mod ipc;

use gradecalcd::config::{CalcConfig, CONFIG_ENV};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn startup_config() -> CalcConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
        return CalcConfig::default();
    };
    match CalcConfig::load(&path) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "loaded calc config");
            cfg
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "config_load_failed, using defaults");
            CalcConfig::default()
        }
    }
}

fn main() {
    init_logging();

    let mut state = ipc::AppState::new(startup_config());
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gradecalcd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "bad request line");
                let resp = ipc::err_without_id("bad_json", e.to_string());
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
