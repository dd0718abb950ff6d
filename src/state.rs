use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub home: String,
    pub away: String,
    pub home_team_id: u64,
    pub away_team_id: u64,
}

impl Game {
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away, self.home)
    }
}

/// Result of a schedule fetch. Entries that could not be read as a game are
/// described in `skipped` rather than failing the whole day.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDay {
    pub games: Vec<Game>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbablePitchers {
    pub home_id: Option<u64>,
    pub away_id: Option<u64>,
    pub home_name: String,
    pub away_name: String,
}

impl ProbablePitchers {
    pub fn both(&self) -> Option<(u64, u64)> {
        match (self.home_id, self.away_id) {
            (Some(h), Some(a)) => Some((h, a)),
            _ => None,
        }
    }
}

impl Default for ProbablePitchers {
    fn default() -> Self {
        Self {
            home_id: None,
            away_id: None,
            home_name: UNKNOWN_PITCHER.to_string(),
            away_name: UNKNOWN_PITCHER.to_string(),
        }
    }
}

pub const UNKNOWN_PITCHER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatGroup {
    Pitching,
    Hitting,
}

impl StatGroup {
    pub fn as_query(self) -> &'static str {
        match self {
            StatGroup::Pitching => "pitching",
            StatGroup::Hitting => "hitting",
        }
    }
}

/// Raw career stat line as returned by the provider: values are usually
/// strings such as `"3.45"` or `".271"`, occasionally numbers or `"-.--"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerStat(pub HashMap<String, Value>);

/// Why a stat field could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct StatParseError {
    pub field: String,
    pub raw: String,
}

impl fmt::Display for StatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stat {} is not numeric: {}", self.field, self.raw)
    }
}

impl std::error::Error for StatParseError {}

impl PlayerStat {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads `field` as a finite number, falling back to `default` when the
    /// field is absent.
    pub fn number_or(&self, field: &str, default: f64) -> Result<f64, StatParseError> {
        let Some(value) = self.0.get(field) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(StatParseError {
                field: field.to_string(),
                raw: value.to_string(),
            }),
        }
    }
}

/// Outcome of one external lookup. `Missing` carries a human-readable reason
/// and is never an error for the run as a whole.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Missing { reason: String },
}

impl<T> Lookup<T> {
    pub fn missing(reason: impl Into<String>) -> Self {
        Lookup::Missing {
            reason: reason.into(),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Missing { .. } => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::Missing { reason } => Lookup::Missing { reason },
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Lookup::Found(_) => None,
            Lookup::Missing { reason } => Some(reason),
        }
    }
}

impl<T: Default> Lookup<T> {
    pub fn unwrap_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

impl<T> From<anyhow::Result<T>> for Lookup<T> {
    fn from(res: anyhow::Result<T>) -> Self {
        match res {
            Ok(v) => Lookup::Found(v),
            Err(err) => Lookup::missing(format!("{err:#}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketGame {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub commence_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub point: Option<f64>,
}

/// Spread is quoted from the home team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketLine {
    pub spread: Option<f64>,
    pub total: Option<f64>,
}

impl MarketLine {
    pub fn is_empty(&self) -> bool {
        self.spread.is_none() && self.total.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub margin: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgePair {
    pub margin: Option<f64>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Picks {
    pub spread: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    Unavailable,
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    pub fn rank(self) -> Option<u8> {
        match self {
            ConfidenceTier::Unavailable => None,
            ConfidenceTier::VeryLow => Some(1),
            ConfidenceTier::Low => Some(2),
            ConfidenceTier::Medium => Some(3),
            ConfidenceTier::High => Some(4),
            ConfidenceTier::VeryHigh => Some(5),
        }
    }

    pub fn label(self) -> String {
        match self.rank() {
            Some(r) => format!("{r}/5"),
            None => "n/a".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeReport {
    pub game: Game,
    pub prediction: Prediction,
    pub line: Option<MarketLine>,
    pub edges: EdgePair,
    pub picks: Picks,
    pub spread_confidence: ConfidenceTier,
    pub total_confidence: ConfidenceTier,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Lookup, PlayerStat};

    #[test]
    fn number_or_reads_strings_numbers_and_defaults() {
        let stat = PlayerStat::from_pairs([("era", json!("3.45")), ("avg", json!(".271")), ("k", json!(9))]);
        assert_eq!(stat.number_or("era", 5.0), Ok(3.45));
        assert_eq!(stat.number_or("avg", 0.25), Ok(0.271));
        assert_eq!(stat.number_or("k", 0.0), Ok(9.0));
        assert_eq!(stat.number_or("bb9", 3.0), Ok(3.0));
    }

    #[test]
    fn number_or_rejects_placeholders_and_nulls() {
        let stat = PlayerStat::from_pairs([("era", json!("-.--")), ("obp", json!(null)), ("slg", json!("NaN"))]);
        assert!(stat.number_or("era", 5.0).is_err());
        assert!(stat.number_or("obp", 0.32).is_err());
        assert!(stat.number_or("slg", 0.4).is_err());
    }

    #[test]
    fn lookup_from_result_keeps_reason() {
        let lookup: Lookup<u32> = Lookup::from(Err(anyhow::anyhow!("http 500")));
        assert_eq!(lookup.reason(), Some("http 500"));
        assert_eq!(lookup.unwrap_or_default(), 0);
    }

    #[test]
    fn lookup_map_carries_the_missing_reason() {
        let found: Lookup<Vec<u64>> = Lookup::Found(vec![1, 2, 3]);
        let len = found.map(|ids| ids.len());
        assert!(!len.is_missing());
        assert_eq!(len.found(), Some(3));

        let missing: Lookup<Vec<u64>> = Lookup::missing("roster timeout");
        let len = missing.map(|ids| ids.len());
        assert!(len.is_missing());
        assert_eq!(len.reason(), Some("roster timeout"));
    }
}
