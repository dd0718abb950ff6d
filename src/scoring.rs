use std::collections::HashMap;

use crate::state::{Lookup, PlayerStat, StatGroup, StatParseError};
use crate::stats_fetch::StatsSource;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;
pub const NEUTRAL_SCORE: f64 = 50.0;

pub const LEAGUE_ERA: f64 = 5.0;
pub const LEAGUE_K9: f64 = 6.0;
pub const LEAGUE_BB9: f64 = 3.0;
pub const LEAGUE_AVG: f64 = 0.250;
pub const LEAGUE_OBP: f64 = 0.320;
pub const LEAGUE_SLG: f64 = 0.400;

const ERA_WEIGHT: f64 = 12.0;
const K9_WEIGHT: f64 = 8.0;
const BB9_WEIGHT: f64 = 5.0;

const AVG_WEIGHT: f64 = 100.0;
const OBP_WEIGHT: f64 = 80.0;
const SLG_WEIGHT: f64 = 60.0;

pub fn clamp_score(v: f64) -> f64 {
    v.clamp(SCORE_MIN, SCORE_MAX)
}

/// Pitcher quality relative to league-average anchors. An unreadable stat
/// line scores the neutral 50.
pub fn pitcher_score(stat: &PlayerStat) -> f64 {
    raw_pitcher_score(stat).map(clamp_score).unwrap_or(NEUTRAL_SCORE)
}

fn raw_pitcher_score(stat: &PlayerStat) -> Result<f64, StatParseError> {
    let era = stat.number_or("era", LEAGUE_ERA)?;
    let k9 = stat.number_or("strikeoutsPer9Inn", LEAGUE_K9)?;
    let bb9 = stat.number_or("walksPer9Inn", LEAGUE_BB9)?;
    Ok((LEAGUE_ERA - era) * ERA_WEIGHT + (k9 - LEAGUE_K9) * K9_WEIGHT + (LEAGUE_BB9 - bb9) * BB9_WEIGHT)
}

/// Single hitter's clamped score, or the parse failure that disqualifies them.
pub fn single_hitter_score(stat: &PlayerStat) -> Result<f64, StatParseError> {
    let avg = stat.number_or("avg", LEAGUE_AVG)?;
    let obp = stat.number_or("obp", LEAGUE_OBP)?;
    let slg = stat.number_or("slg", LEAGUE_SLG)?;
    let val = (avg - LEAGUE_AVG) * AVG_WEIGHT + (obp - LEAGUE_OBP) * OBP_WEIGHT + (slg - LEAGUE_SLG) * SLG_WEIGHT;
    Ok(clamp_score(val))
}

/// Mean of every hitter that scores; unreadable lines are skipped, and a
/// roster with nobody left scores 50.
pub fn hitter_score_from_stats<'a>(stats: impl IntoIterator<Item = &'a PlayerStat>) -> f64 {
    let (sum, n) = stats
        .into_iter()
        .filter_map(|s| single_hitter_score(s).ok())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { NEUTRAL_SCORE } else { sum / n as f64 }
}

/// Fetches each player's career hitting line and scores the group. A failed
/// fetch counts as an empty stat line, i.e. league-average defaults.
pub fn hitter_score<S: StatsSource + ?Sized>(source: &S, player_ids: &[u64]) -> f64 {
    let stats: Vec<PlayerStat> = player_ids
        .iter()
        .map(|&id| source.career_stats(id, StatGroup::Hitting).unwrap_or_default())
        .collect();
    hitter_score_from_stats(&stats)
}

/// Team rosters fetched during one run, keyed by team id.
#[derive(Debug, Default)]
pub struct RosterCache {
    rosters: HashMap<u64, Vec<u64>>,
}

impl RosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached roster, fetching it on first use. A missing roster
    /// is cached as empty for the rest of the run.
    pub fn get_or_fetch<S: StatsSource + ?Sized>(&mut self, source: &S, team_id: u64) -> &[u64] {
        self.rosters.entry(team_id).or_insert_with(|| match source.roster(team_id) {
            Lookup::Found(ids) => ids,
            Lookup::Missing { .. } => Vec::new(),
        })
        .as_slice()
    }

    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }

    pub fn clear(&mut self) {
        self.rosters.clear();
    }
}
