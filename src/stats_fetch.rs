use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http_cache::HttpCache;
use crate::http_client::http_client;
use crate::state::{Game, Lookup, PlayerStat, ProbablePitchers, ScheduleDay, StatGroup, UNKNOWN_PITCHER};

pub const DEFAULT_STATS_API_BASE: &str = "https://statsapi.mlb.com";

/// Schedule, roster and player statistics provider.
pub trait StatsSource {
    fn schedule(&self, date: NaiveDate) -> Lookup<ScheduleDay>;
    fn probable_pitchers(&self, game_id: u64) -> Lookup<ProbablePitchers>;
    fn career_stats(&self, player_id: u64, group: StatGroup) -> Lookup<PlayerStat>;
    fn roster(&self, team_id: u64) -> Lookup<Vec<u64>>;
}

pub struct StatsClient<'a> {
    base_url: String,
    timeout_secs: u64,
    cache: &'a HttpCache,
}

impl<'a> StatsClient<'a> {
    pub fn new(base_url: &str, timeout_secs: u64, cache: &'a HttpCache) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            cache,
        }
    }

    fn get(&self, path: &str) -> Result<String> {
        let client = http_client(self.timeout_secs)?;
        let url = format!("{}{}", self.base_url, path);
        self.cache
            .fetch(client, &url, &[])
            .with_context(|| format!("GET {url}"))
    }
}

impl StatsSource for StatsClient<'_> {
    fn schedule(&self, date: NaiveDate) -> Lookup<ScheduleDay> {
        let d = date.format("%Y-%m-%d");
        let res = self
            .get(&format!("/api/v1/schedule?sportId=1&date={d}"))
            .and_then(|body| parse_schedule_json(&body));
        log_missing(Lookup::from(res), "schedule")
    }

    fn probable_pitchers(&self, game_id: u64) -> Lookup<ProbablePitchers> {
        let res = self
            .get(&format!("/api/v1.1/game/{game_id}/feed/live"))
            .and_then(|body| parse_probable_pitchers_json(&body));
        log_missing(Lookup::from(res), "probable pitchers")
    }

    fn career_stats(&self, player_id: u64, group: StatGroup) -> Lookup<PlayerStat> {
        let res = self
            .get(&format!(
                "/api/v1/people/{player_id}/stats?stats=career&group={}",
                group.as_query()
            ))
            .and_then(|body| parse_career_stats_json(&body));
        let lookup = Lookup::from(res);
        if let Some(reason) = lookup.reason() {
            debug!(player_id, group = group.as_query(), "career stats missing: {reason}");
        }
        lookup
    }

    fn roster(&self, team_id: u64) -> Lookup<Vec<u64>> {
        let res = self
            .get(&format!("/api/v1/teams/{team_id}/roster"))
            .and_then(|body| parse_roster_json(&body));
        log_missing(Lookup::from(res), "roster")
    }
}

fn log_missing<T>(lookup: Lookup<T>, what: &str) -> Lookup<T> {
    if let Some(reason) = lookup.reason() {
        warn!("{what} unavailable: {reason}");
    }
    lookup
}

fn parse_root(raw: &str, what: &str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root = serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))?;
    Ok(Some(root))
}

pub fn parse_schedule_json(raw: &str) -> Result<ScheduleDay> {
    let Some(root) = parse_root(raw, "schedule")? else {
        return Ok(ScheduleDay::default());
    };
    let games = root
        .get("dates")
        .and_then(Value::as_array)
        .and_then(|dates| dates.first())
        .and_then(|d| d.get("games"))
        .and_then(Value::as_array);

    let mut day = ScheduleDay::default();
    for (idx, entry) in games.into_iter().flatten().enumerate() {
        match parse_game(entry) {
            Some(game) => day.games.push(game),
            None => {
                let id = entry
                    .get("gamePk")
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| format!("#{idx}"));
                day.skipped.push(format!("game {id}: malformed schedule entry"));
            }
        }
    }
    Ok(day)
}

fn parse_game(entry: &Value) -> Option<Game> {
    let id = entry.get("gamePk")?.as_u64()?;
    let teams = entry.get("teams")?;
    let home = teams.get("home")?.get("team")?;
    let away = teams.get("away")?.get("team")?;
    Some(Game {
        id,
        home: home.get("name")?.as_str()?.to_string(),
        away: away.get("name")?.as_str()?.to_string(),
        home_team_id: home.get("id")?.as_u64()?,
        away_team_id: away.get("id")?.as_u64()?,
    })
}

pub fn parse_probable_pitchers_json(raw: &str) -> Result<ProbablePitchers> {
    let Some(root) = parse_root(raw, "live feed")? else {
        return Ok(ProbablePitchers::default());
    };
    let pp = root
        .get("gameData")
        .and_then(|g| g.get("probablePitchers"))
        .unwrap_or(&Value::Null);
    let side = |key: &str| pp.get(key).unwrap_or(&Value::Null);
    let name = |v: &Value| {
        v.get("fullName")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_PITCHER)
            .to_string()
    };
    Ok(ProbablePitchers {
        home_id: side("home").get("id").and_then(Value::as_u64),
        away_id: side("away").get("id").and_then(Value::as_u64),
        home_name: name(side("home")),
        away_name: name(side("away")),
    })
}

/// Career stat line from the first split; an empty map when the player has
/// no record for the group.
pub fn parse_career_stats_json(raw: &str) -> Result<PlayerStat> {
    let Some(root) = parse_root(raw, "player stats")? else {
        return Ok(PlayerStat::default());
    };
    let stat = root
        .get("stats")
        .and_then(Value::as_array)
        .and_then(|s| s.first())
        .and_then(|s| s.get("splits"))
        .and_then(Value::as_array)
        .and_then(|s| s.first())
        .and_then(|s| s.get("stat"))
        .and_then(Value::as_object);
    Ok(match stat {
        Some(obj) => PlayerStat(obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        None => PlayerStat::default(),
    })
}

pub fn parse_roster_json(raw: &str) -> Result<Vec<u64>> {
    let Some(root) = parse_root(raw, "roster")? else {
        return Ok(Vec::new());
    };
    Ok(root
        .get("roster")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|p| p.get("person")?.get("id")?.as_u64())
        .collect())
}
