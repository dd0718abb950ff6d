use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};

use crate::http_cache::DEFAULT_TTL_SECS;
use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::odds_fetch::{DEFAULT_ODDS_API_BASE, DEFAULT_SPORT_KEY, OddsFetchConfig};
use crate::report::DEFAULT_TOP_N;
use crate::stats_fetch::DEFAULT_STATS_API_BASE;

const MAX_TTL_SECS: u64 = 86_400;
const MAX_TOP_N: usize = 50;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stats_base_url: String,
    pub odds: OddsFetchConfig,
    pub cache_ttl_secs: u64,
    pub cache_persist: bool,
    pub http_timeout_secs: u64,
    pub top_n: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let flag = |key: &str, default: bool| match get(key).map(|v| v.to_ascii_lowercase()) {
            Some(v) => matches!(v.as_str(), "1" | "true" | "yes" | "on"),
            None => default,
        };

        let odds = OddsFetchConfig {
            enabled: flag("ODDS_ENABLED", true),
            base_url: get("ODDS_API_BASE").unwrap_or_else(|| DEFAULT_ODDS_API_BASE.to_string()),
            api_key: get("ODDS_API_KEY"),
            regions: get("ODDS_REGIONS")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or_else(|| "us".to_string()),
            sport_key: get("ODDS_SPORT_KEY").unwrap_or_else(|| DEFAULT_SPORT_KEY.to_string()),
        };

        Self {
            stats_base_url: get("STATS_API_BASE").unwrap_or_else(|| DEFAULT_STATS_API_BASE.to_string()),
            odds,
            cache_ttl_secs: get("CACHE_TTL_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TTL_SECS)
                .min(MAX_TTL_SECS),
            cache_persist: flag("CACHE_PERSIST", true),
            http_timeout_secs: get("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .clamp(1, 120),
            top_n: get("TOP_N")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_TOP_N)
                .clamp(1, MAX_TOP_N),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub date: Option<NaiveDate>,
    pub export: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub top: Option<usize>,
    pub plain: bool,
    pub demo: bool,
}

impl CliArgs {
    pub fn from_env() -> Result<Self> {
        let args = env::args().skip(1).collect::<Vec<_>>();
        Self::parse(&args)
    }

    pub fn parse(args: &[String]) -> Result<Self> {
        let mut out = CliArgs {
            plain: has_flag(args, "--plain"),
            demo: has_flag(args, "--demo"),
            ..Default::default()
        };
        if let Some(raw) = arg_value(args, "--date") {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("invalid --date {raw}, expected YYYY-MM-DD"))?;
            out.date = Some(date);
        }
        out.export = arg_value(args, "--export").map(PathBuf::from);
        out.json = arg_value(args, "--json").map(PathBuf::from);
        if let Some(raw) = arg_value(args, "--top") {
            let n = raw
                .parse::<usize>()
                .map_err(|_| anyhow!("invalid --top {raw}"))?;
            out.top = Some(n.clamp(1, MAX_TOP_N));
        }
        Ok(out)
    }

    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix) {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
