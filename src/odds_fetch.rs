use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::http_cache::HttpCache;
use crate::http_client::http_client;
use crate::state::{Lookup, MarketGame};

pub const DEFAULT_ODDS_API_BASE: &str = "https://api.the-odds-api.com";
pub const DEFAULT_SPORT_KEY: &str = "baseball_mlb";

#[derive(Debug, Clone)]
pub struct OddsFetchConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub regions: String,
    pub sport_key: String,
}

impl Default for OddsFetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_ODDS_API_BASE.to_string(),
            api_key: None,
            regions: "us".to_string(),
            sport_key: DEFAULT_SPORT_KEY.to_string(),
        }
    }
}

/// Current market lines for every game of a league.
pub trait OddsSource {
    fn market_games(&self) -> Lookup<Vec<MarketGame>>;
}

pub struct OddsClient<'a> {
    cfg: OddsFetchConfig,
    timeout_secs: u64,
    cache: &'a HttpCache,
}

impl<'a> OddsClient<'a> {
    pub fn new(cfg: OddsFetchConfig, timeout_secs: u64, cache: &'a HttpCache) -> Self {
        Self {
            cfg,
            timeout_secs,
            cache,
        }
    }

    fn fetch(&self) -> Result<Vec<MarketGame>> {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            return Err(anyhow::anyhow!("ODDS_API_KEY missing"));
        };
        let url = format!(
            "{}/v4/sports/{}/odds",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.sport_key
        );
        let client = http_client(self.timeout_secs)?;
        let body = self
            .cache
            .fetch(
                client,
                &url,
                &[
                    ("apiKey", api_key),
                    ("regions", self.cfg.regions.as_str()),
                    ("markets", "spreads,totals"),
                    ("oddsFormat", "american"),
                ],
            )
            .context("odds request failed")?;
        parse_market_games_json(&body)
    }
}

impl OddsSource for OddsClient<'_> {
    fn market_games(&self) -> Lookup<Vec<MarketGame>> {
        if !self.cfg.enabled {
            return Lookup::missing("odds disabled");
        }
        let lookup = Lookup::from(self.fetch());
        match &lookup {
            Lookup::Found(games) => info!(games = games.len(), "market lines loaded"),
            Lookup::Missing { reason } => warn!("market lines unavailable: {reason}"),
        }
        lookup
    }
}

pub fn parse_market_games_json(raw: &str) -> Result<Vec<MarketGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid odds json")
}
