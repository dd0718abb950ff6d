use std::fs;
use std::path::PathBuf;

use mlb_edge::odds_fetch::parse_market_games_json;
use mlb_edge::state::UNKNOWN_PITCHER;
use mlb_edge::stats_fetch::{
    parse_career_stats_json, parse_probable_pitchers_json, parse_roster_json, parse_schedule_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_schedule_fixture() {
    let day = parse_schedule_json(&read_fixture("schedule.json")).expect("fixture should parse");
    assert_eq!(day.games.len(), 2);
    assert_eq!(day.games[0].id, 777001);
    assert_eq!(day.games[0].home, "New York Yankees");
    assert_eq!(day.games[0].away, "Boston Red Sox");
    assert_eq!(day.games[0].home_team_id, 147);
    assert_eq!(day.games[0].away_team_id, 111);
    assert_eq!(day.games[0].matchup(), "Boston Red Sox @ New York Yankees");
}

#[test]
fn malformed_schedule_entry_is_reported_not_fatal() {
    let day = parse_schedule_json(&read_fixture("schedule.json")).expect("fixture should parse");
    assert_eq!(day.skipped.len(), 1);
    assert!(day.skipped[0].contains("777003"));
}

#[test]
fn schedule_without_dates_is_empty() {
    let day = parse_schedule_json(r#"{"totalGames":0,"dates":[]}"#).expect("should parse");
    assert!(day.games.is_empty());
    assert!(day.skipped.is_empty());
    assert!(parse_schedule_json("null").expect("null").games.is_empty());
}

#[test]
fn parses_probable_pitchers() {
    let pp = parse_probable_pitchers_json(&read_fixture("feed_live.json")).expect("fixture should parse");
    assert_eq!(pp.home_id, Some(605002));
    assert_eq!(pp.away_id, Some(605001));
    assert_eq!(pp.home_name, "Home Starter");
    assert_eq!(pp.both(), Some((605002, 605001)));
}

#[test]
fn missing_probable_pitcher_has_placeholder_name() {
    let pp = parse_probable_pitchers_json(&read_fixture("feed_live_missing_away.json"))
        .expect("fixture should parse");
    assert_eq!(pp.home_id, Some(605003));
    assert_eq!(pp.away_id, None);
    assert_eq!(pp.away_name, UNKNOWN_PITCHER);
    assert!(pp.both().is_none());
}

#[test]
fn parses_career_stat_line() {
    let stat = parse_career_stats_json(&read_fixture("pitcher_career.json")).expect("fixture should parse");
    assert_eq!(stat.number_or("era", 5.0), Ok(3.0));
    assert_eq!(stat.number_or("strikeoutsPer9Inn", 6.0), Ok(9.0));
    assert_eq!(stat.number_or("walksPer9Inn", 3.0), Ok(2.0));
}

#[test]
fn player_without_splits_has_empty_stats() {
    let stat = parse_career_stats_json(r#"{"stats":[{"splits":[]}]}"#).expect("should parse");
    assert!(stat.is_empty());
    assert!(parse_career_stats_json(r#"{"stats":[]}"#).expect("should parse").is_empty());
}

#[test]
fn roster_skips_people_without_id() {
    let ids = parse_roster_json(&read_fixture("roster.json")).expect("fixture should parse");
    assert_eq!(ids, vec![501, 502, 503]);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(parse_roster_json("{not json").is_err());
    assert!(parse_schedule_json("<html>").is_err());
}

#[test]
fn parses_odds_fixture() {
    let games = parse_market_games_json(&read_fixture("odds.json")).expect("fixture should parse");
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].home_team, "New York Yankees");
    assert_eq!(games[0].bookmakers.len(), 2);
    assert_eq!(games[1].bookmakers[0].markets[0].key, "h2h");
}
