use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use mlb_edge::fake_feed::DemoFeed;
use mlb_edge::odds_fetch::{OddsSource, parse_market_games_json};
use mlb_edge::pipeline::run_for_date;
use mlb_edge::scoring::RosterCache;
use mlb_edge::state::{
    ConfidenceTier, Game, Lookup, MarketGame, PlayerStat, ProbablePitchers, ScheduleDay, StatGroup,
};
use mlb_edge::stats_fetch::{
    StatsSource, parse_career_stats_json, parse_probable_pitchers_json, parse_roster_json,
    parse_schedule_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

/// Serves the JSON fixtures through the same parsers the network client uses.
struct FixtureStats {
    empty_schedule: bool,
}

impl StatsSource for FixtureStats {
    fn schedule(&self, _date: NaiveDate) -> Lookup<ScheduleDay> {
        if self.empty_schedule {
            return Lookup::from(parse_schedule_json(r#"{"dates":[]}"#));
        }
        Lookup::from(parse_schedule_json(&read_fixture("schedule.json")))
    }

    fn probable_pitchers(&self, game_id: u64) -> Lookup<ProbablePitchers> {
        match game_id {
            777001 => Lookup::from(parse_probable_pitchers_json(&read_fixture("feed_live.json"))),
            777002 => Lookup::from(parse_probable_pitchers_json(&read_fixture(
                "feed_live_missing_away.json",
            ))),
            _ => Lookup::missing("unknown game"),
        }
    }

    fn career_stats(&self, _player_id: u64, group: StatGroup) -> Lookup<PlayerStat> {
        let name = match group {
            StatGroup::Pitching => "pitcher_career.json",
            StatGroup::Hitting => "hitter_career.json",
        };
        Lookup::from(parse_career_stats_json(&read_fixture(name)))
    }

    fn roster(&self, _team_id: u64) -> Lookup<Vec<u64>> {
        Lookup::from(parse_roster_json(&read_fixture("roster.json")))
    }
}

/// Fixture stats, but the slate leads with a game whose home team has no name.
struct BlankTeamStats {
    inner: FixtureStats,
}

impl StatsSource for BlankTeamStats {
    fn schedule(&self, date: NaiveDate) -> Lookup<ScheduleDay> {
        let mut games = vec![Game {
            id: 900001,
            home: String::new(),
            away: "Boston Red Sox".to_string(),
            home_team_id: 147,
            away_team_id: 111,
        }];
        if let Lookup::Found(day) = self.inner.schedule(date) {
            games.extend(day.games.into_iter().filter(|g| g.id == 777001));
        }
        Lookup::Found(ScheduleDay {
            games,
            skipped: Vec::new(),
        })
    }

    fn probable_pitchers(&self, game_id: u64) -> Lookup<ProbablePitchers> {
        self.inner.probable_pitchers(game_id)
    }

    fn career_stats(&self, player_id: u64, group: StatGroup) -> Lookup<PlayerStat> {
        self.inner.career_stats(player_id, group)
    }

    fn roster(&self, team_id: u64) -> Lookup<Vec<u64>> {
        self.inner.roster(team_id)
    }
}

struct FixtureOdds;

impl OddsSource for FixtureOdds {
    fn market_games(&self) -> Lookup<Vec<MarketGame>> {
        Lookup::from(parse_market_games_json(&read_fixture("odds.json")))
    }
}

struct NoOdds;

impl OddsSource for NoOdds {
    fn market_games(&self) -> Lookup<Vec<MarketGame>> {
        Lookup::missing("ODDS_API_KEY missing")
    }
}

#[test]
fn game_missing_a_starter_is_excluded() {
    let stats = FixtureStats { empty_schedule: false };
    let mut rosters = RosterCache::new();
    let mut ticks = Vec::new();
    let run = run_for_date(date(), &stats, &FixtureOdds, &mut rosters, 5, |p| {
        ticks.push((p.current, p.total))
    });

    assert_eq!(run.games_scheduled, 2);
    assert_eq!(run.report.rows.len(), 1);
    assert_eq!(run.report.rows[0].edge.game.id, 777001);
    assert_eq!(run.excluded.len(), 1);
    assert_eq!(run.excluded[0].game_id, 777002);
    assert!(run.report.top_margin.len() <= run.report.rows.len());
    assert!(run.report.top_total.len() <= run.report.rows.len());
    assert_eq!(ticks, vec![(1, 2), (2, 2)]);
}

#[test]
fn malformed_schedule_entry_surfaces_as_error() {
    let stats = FixtureStats { empty_schedule: false };
    let run = run_for_date(date(), &stats, &FixtureOdds, &mut RosterCache::new(), 5, |_| {});
    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].contains("777003"));
}

#[test]
fn scored_row_matches_hand_computation() {
    let stats = FixtureStats { empty_schedule: false };
    let run = run_for_date(date(), &stats, &FixtureOdds, &mut RosterCache::new(), 5, |_| {});
    let row = &run.report.rows[0];

    assert_eq!(row.home_pitcher, "Home Starter");
    assert_eq!(row.away_pitcher, "Away Starter");
    assert_eq!(row.scores.home_pitcher, 53.0);
    assert_eq!(row.scores.away_pitcher, 53.0);
    assert!((row.scores.home_hitter - 17.4).abs() < 1e-9);
    assert!((row.scores.away_hitter - 17.4).abs() < 1e-9);

    assert_eq!(row.edge.prediction.margin, 0.0);
    assert_eq!(row.edge.prediction.total, 9.83);
    assert_eq!(row.edge.edges.margin, Some(-1.5));
    assert_eq!(row.edge.edges.total, Some(0.83));
    assert_eq!(row.edge.picks.spread.as_deref(), Some("Away +1.5"));
    assert_eq!(row.edge.picks.total.as_deref(), Some("Over 9.0"));
    assert_eq!(row.edge.spread_confidence, ConfidenceTier::High);
    assert_eq!(row.edge.total_confidence, ConfidenceTier::Low);
}

#[test]
fn unavailable_market_leaves_edges_null() {
    let stats = FixtureStats { empty_schedule: false };
    let run = run_for_date(date(), &stats, &NoOdds, &mut RosterCache::new(), 5, |_| {});
    assert!(!run.market_available);
    let row = &run.report.rows[0];
    assert!(row.edge.line.is_none());
    assert_eq!(row.edge.edges.margin, None);
    assert_eq!(row.edge.edges.total, None);
    assert_eq!(row.edge.spread_confidence, ConfidenceTier::Unavailable);
    assert!(run.report.top_margin.is_empty());
    assert!(run.report.top_total.is_empty());
}

#[test]
fn empty_schedule_is_a_normal_outcome() {
    let stats = FixtureStats { empty_schedule: true };
    let mut calls = 0;
    let run = run_for_date(date(), &stats, &FixtureOdds, &mut RosterCache::new(), 5, |_| calls += 1);
    assert!(run.no_games());
    assert!(run.report.is_empty());
    assert!(run.errors.is_empty());
    assert_eq!(calls, 0);
}

#[test]
fn roster_cache_is_reset_per_run() {
    let stats = FixtureStats { empty_schedule: false };
    let mut rosters = RosterCache::new();
    run_for_date(date(), &stats, &FixtureOdds, &mut rosters, 5, |_| {});
    assert_eq!(rosters.len(), 2);
    run_for_date(date(), &stats, &NoOdds, &mut rosters, 5, |_| {});
    assert_eq!(rosters.len(), 2);
}

#[test]
fn demo_feed_runs_end_to_end() {
    let feed = DemoFeed::new(date());
    let run = run_for_date(date(), &feed, &feed, &mut RosterCache::new(), 3, |_| {});
    assert_eq!(run.games_scheduled, 6);
    assert_eq!(run.report.rows.len(), 5);
    assert_eq!(run.excluded.len(), 1);
    assert!(run.market_available);
    assert!(run.report.top_margin.len() <= 3);
    assert!(run.report.top_total.len() <= 3);
    for row in &run.report.rows {
        for s in [row.scores.home_pitcher, row.scores.away_pitcher, row.scores.home_hitter, row.scores.away_hitter] {
            assert!((0.0..=100.0).contains(&s));
        }
    }
}

#[test]
fn failing_game_is_reported_and_the_run_continues() {
    let stats = BlankTeamStats {
        inner: FixtureStats { empty_schedule: false },
    };
    let mut ticks = Vec::new();
    let run = run_for_date(date(), &stats, &FixtureOdds, &mut RosterCache::new(), 5, |p| {
        ticks.push((p.current, p.total))
    });

    assert_eq!(run.games_scheduled, 2);
    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].contains("900001"), "got {:?}", run.errors);
    assert!(run.excluded.is_empty());
    assert_eq!(run.report.rows.len(), 1);
    assert_eq!(run.report.rows[0].edge.game.id, 777001);
    assert_eq!(ticks, vec![(1, 2), (2, 2)]);
}
