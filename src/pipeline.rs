use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::edge::analyze;
use crate::odds_fetch::OddsSource;
use crate::prediction::predict;
use crate::report::{GameScores, Report, ReportRow, build_report};
use crate::scoring::{RosterCache, hitter_score, pitcher_score};
use crate::state::{Game, Lookup, MarketGame, StatGroup};
use crate::stats_fetch::StatsSource;

pub struct RunProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcludedGame {
    pub game_id: u64,
    pub matchup: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub games_scheduled: usize,
    pub market_available: bool,
    pub report: Report,
    pub excluded: Vec<ExcludedGame>,
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn no_games(&self) -> bool {
        self.games_scheduled == 0
    }
}

/// Scores every game on `date` and compares it to the market.
///
/// Nothing here aborts the run: a game that cannot be processed is recorded in
/// `errors` and the loop moves on. The roster cache is cleared on entry.
pub fn run_for_date<S, O>(
    date: NaiveDate,
    stats: &S,
    odds: &O,
    rosters: &mut RosterCache,
    top_n: usize,
    mut on_progress: impl FnMut(RunProgress),
) -> RunReport
where
    S: StatsSource + ?Sized,
    O: OddsSource + ?Sized,
{
    rosters.clear();
    let mut errors = Vec::new();

    let day = match stats.schedule(date) {
        Lookup::Found(day) => day,
        Lookup::Missing { reason } => {
            errors.push(format!("schedule: {reason}"));
            Default::default()
        }
    };
    errors.extend(day.skipped);
    let games = day.games;

    if games.is_empty() {
        info!(%date, "no games scheduled");
        return RunReport {
            date,
            games_scheduled: 0,
            market_available: false,
            report: Report::default(),
            excluded: Vec::new(),
            errors,
        };
    }

    let (market, market_available) = match odds.market_games() {
        Lookup::Found(games) => (games, true),
        Lookup::Missing { .. } => (Vec::new(), false),
    };

    let total = games.len();
    let mut rows = Vec::new();
    let mut excluded = Vec::new();
    for (idx, game) in games.into_iter().enumerate() {
        let matchup = game.matchup();
        let message = match process_game(stats, rosters, &market, game.clone()) {
            Ok(GameOutcome::Row(row)) => {
                rows.push(*row);
                format!("Scored {matchup}")
            }
            Ok(GameOutcome::Excluded(reason)) => {
                excluded.push(ExcludedGame {
                    game_id: game.id,
                    matchup: matchup.clone(),
                    reason,
                });
                format!("Skipped {matchup}")
            }
            Err(err) => {
                warn!(game_id = game.id, "game failed: {err:#}");
                errors.push(format!("game {} ({matchup}): {err:#}", game.id));
                format!("Failed {matchup}")
            }
        };
        on_progress(RunProgress {
            current: idx + 1,
            total,
            message,
        });
    }

    info!(rows = rows.len(), excluded = excluded.len(), errors = errors.len(), "run complete");
    RunReport {
        date,
        games_scheduled: total,
        market_available,
        report: build_report(rows, top_n),
        excluded,
        errors,
    }
}

enum GameOutcome {
    Row(Box<ReportRow>),
    Excluded(String),
}

fn process_game<S: StatsSource + ?Sized>(
    stats: &S,
    rosters: &mut RosterCache,
    market: &[MarketGame],
    game: Game,
) -> Result<GameOutcome> {
    if game.home.trim().is_empty() || game.away.trim().is_empty() {
        return Err(anyhow!("team name missing"));
    }

    let pitchers = match stats.probable_pitchers(game.id) {
        Lookup::Found(p) => p,
        Lookup::Missing { reason } => {
            return Ok(GameOutcome::Excluded(format!("probable pitchers unavailable: {reason}")));
        }
    };
    let Some((home_pid, away_pid)) = pitchers.both() else {
        return Ok(GameOutcome::Excluded("probable pitcher not announced".to_string()));
    };

    let home_pitcher = pitcher_score(&stats.career_stats(home_pid, StatGroup::Pitching).unwrap_or_default());
    let away_pitcher = pitcher_score(&stats.career_stats(away_pid, StatGroup::Pitching).unwrap_or_default());

    let home_hitter = hitter_score(stats, rosters.get_or_fetch(stats, game.home_team_id));
    let away_hitter = hitter_score(stats, rosters.get_or_fetch(stats, game.away_team_id));

    let scores = GameScores {
        home_pitcher,
        away_pitcher,
        home_hitter,
        away_hitter,
    };
    let prediction = predict(home_pitcher, away_pitcher, home_hitter, away_hitter);
    let edge = analyze(game, prediction, market);
    Ok(GameOutcome::Row(Box::new(ReportRow::new(&pitchers, scores, edge))))
}
