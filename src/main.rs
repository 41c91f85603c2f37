use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sports_odds_fn::config::OddsConfig;
use sports_odds_fn::handler::{HandlerRequest, OddsHandler};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let req = read_request()?;
    let cfg = OddsConfig::from_env();
    debug!(
        mock = cfg.is_mock_mode(),
        base_url = %cfg.base_url,
        "odds handler configured"
    );

    let handler = OddsHandler::from_config(&cfg)?;
    let resp = handler.handle(&req);
    let json = serde_json::to_string(&resp).context("serialize handler response")?;
    println!("{json}");
    Ok(())
}

// Logs go to stderr; stdout carries only the response descriptor.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sports_odds_fn=debug"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("logging disabled: {err}");
    }
}

fn read_request() -> Result<HandlerRequest> {
    if let Some(path) = parse_event_path_arg() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read event file {}", path.display()))?;
        return parse_event(&raw);
    }
    if let Some(sport) = parse_sport_arg() {
        return Ok(HandlerRequest::get(Some(&sport)));
    }

    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .context("read event from stdin")?;
    if raw.trim().is_empty() {
        return Ok(HandlerRequest::get(None));
    }
    parse_event(&raw)
}

fn parse_event(raw: &str) -> Result<HandlerRequest> {
    serde_json::from_str(raw).context("invalid invocation event json")
}

fn parse_event_path_arg() -> Option<PathBuf> {
    arg_value("--event").map(PathBuf::from)
}

fn parse_sport_arg() -> Option<String> {
    arg_value("--sport")
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
