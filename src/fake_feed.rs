use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::odds_fetch::OddsSource;
use crate::state::{
    Bookmaker, Game, Lookup, Market, MarketGame, Outcome, PlayerStat, ProbablePitchers,
    ScheduleDay, StatGroup,
};
use crate::stats_fetch::StatsSource;

const TEAMS: &[(u64, &str)] = &[
    (147, "New York Yankees"),
    (111, "Boston Red Sox"),
    (119, "Los Angeles Dodgers"),
    (137, "San Francisco Giants"),
    (112, "Chicago Cubs"),
    (138, "St. Louis Cardinals"),
    (117, "Houston Astros"),
    (140, "Texas Rangers"),
    (144, "Atlanta Braves"),
    (143, "Philadelphia Phillies"),
    (136, "Seattle Mariners"),
    (108, "Los Angeles Angels"),
];

const HITTERS_PER_ROSTER: u64 = 13;
const BOOKMAKERS: &[&str] = &["draftkings", "fanduel"];

/// Offline provider with deterministic synthetic data for one date.
///
/// The sixth game has no announced away starter and the fifth has no market
/// line, so a demo run exercises both exclusion paths.
pub struct DemoFeed {
    date: NaiveDate,
    seed: u64,
}

impl DemoFeed {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            seed: date.num_days_from_ce() as u64,
        }
    }

    fn rng(&self, salt: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_mul(1_000_003).wrapping_add(salt))
    }

    fn games(&self) -> Vec<Game> {
        let n = TEAMS.len();
        let offset = (self.seed as usize) % n;
        (0..n / 2)
            .map(|i| {
                let (home_id, home) = TEAMS[(offset + 2 * i) % n];
                let (away_id, away) = TEAMS[(offset + 2 * i + 1) % n];
                Game {
                    id: self.game_id(i),
                    home: home.to_string(),
                    away: away.to_string(),
                    home_team_id: home_id,
                    away_team_id: away_id,
                }
            })
            .collect()
    }

    fn game_id(&self, idx: usize) -> u64 {
        700_000 + (self.seed % 1_000) * 100 + idx as u64
    }

    fn game_index(&self, game_id: u64) -> Option<usize> {
        let base = self.game_id(0);
        let idx = game_id.checked_sub(base)? as usize;
        (idx < TEAMS.len() / 2).then_some(idx)
    }
}

impl StatsSource for DemoFeed {
    fn schedule(&self, _date: NaiveDate) -> Lookup<ScheduleDay> {
        Lookup::Found(ScheduleDay {
            games: self.games(),
            skipped: Vec::new(),
        })
    }

    fn probable_pitchers(&self, game_id: u64) -> Lookup<ProbablePitchers> {
        let Some(idx) = self.game_index(game_id) else {
            return Lookup::missing(format!("unknown game {game_id}"));
        };
        let announced_away = idx % 6 != 5;
        Lookup::Found(ProbablePitchers {
            home_id: Some(game_id * 10 + 1),
            away_id: announced_away.then_some(game_id * 10 + 2),
            home_name: format!("Starter {}-H", idx + 1),
            away_name: if announced_away {
                format!("Starter {}-A", idx + 1)
            } else {
                crate::state::UNKNOWN_PITCHER.to_string()
            },
        })
    }

    fn career_stats(&self, player_id: u64, group: StatGroup) -> Lookup<PlayerStat> {
        let mut rng = self.rng(player_id);
        let stat = match group {
            StatGroup::Pitching => PlayerStat::from_pairs([
                ("era", Value::String(format!("{:.2}", rng.gen_range(2.4..6.2)))),
                ("strikeoutsPer9Inn", Value::String(format!("{:.2}", rng.gen_range(5.5..11.5)))),
                ("walksPer9Inn", Value::String(format!("{:.2}", rng.gen_range(1.4..4.6)))),
            ]),
            StatGroup::Hitting if player_id % HITTERS_PER_ROSTER == 0 => {
                PlayerStat::from_pairs([("avg", Value::String("-.--".to_string()))])
            }
            StatGroup::Hitting => PlayerStat::from_pairs([
                ("avg", Value::String(rate(rng.gen_range(0.210..0.320)))),
                ("obp", Value::String(rate(rng.gen_range(0.280..0.400)))),
                ("slg", Value::String(rate(rng.gen_range(0.340..0.560)))),
            ]),
        };
        Lookup::Found(stat)
    }

    fn roster(&self, team_id: u64) -> Lookup<Vec<u64>> {
        Lookup::Found((1..=HITTERS_PER_ROSTER).map(|i| team_id * 100 + i).collect())
    }
}

impl OddsSource for DemoFeed {
    fn market_games(&self) -> Lookup<Vec<MarketGame>> {
        let games = self
            .games()
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| *idx != 4)
            .map(|(_, g)| {
                let mut rng = self.rng(g.id);
                let home_favored = rng.gen_bool(0.5);
                let total = 7.0 + f64::from(rng.gen_range(0u8..7)) * 0.5;
                let bookmakers = BOOKMAKERS
                    .iter()
                    .map(|key| {
                        let spread = if home_favored { -1.5 } else { 1.5 };
                        Bookmaker {
                            key: key.to_string(),
                            markets: vec![
                                Market {
                                    key: "spreads".to_string(),
                                    outcomes: vec![
                                        outcome(&g.home, Some(spread)),
                                        outcome(&g.away, Some(-spread)),
                                    ],
                                },
                                Market {
                                    key: "totals".to_string(),
                                    outcomes: vec![outcome("Over", Some(total)), outcome("Under", Some(total))],
                                },
                            ],
                        }
                    })
                    .collect();
                MarketGame {
                    id: Some(format!("demo-{}", g.id)),
                    commence_time: Some(format!("{}T23:05:00Z", self.date.format("%Y-%m-%d"))),
                    home_team: g.home,
                    away_team: g.away,
                    bookmakers,
                }
            })
            .collect();
        Lookup::Found(games)
    }
}

fn outcome(name: &str, point: Option<f64>) -> Outcome {
    Outcome {
        name: name.to_string(),
        price: Some(-110.0),
        point,
    }
}

/// Provider style batting rate: `.271`.
fn rate(v: f64) -> String {
    let s = format!("{v:.3}");
    s.strip_prefix('0').map(str::to_string).unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DemoFeed, rate};
    use crate::state::StatGroup;
    use crate::stats_fetch::StatsSource;

    #[test]
    fn rate_drops_leading_zero() {
        assert_eq!(rate(0.2714), ".271");
    }

    #[test]
    fn same_date_same_numbers() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).expect("date");
        let a = DemoFeed::new(date).career_stats(42, StatGroup::Pitching);
        let b = DemoFeed::new(date).career_stats(42, StatGroup::Pitching);
        assert_eq!(a, b);
    }

    #[test]
    fn one_game_lacks_an_away_starter() {
        let feed = DemoFeed::new(NaiveDate::from_ymd_opt(2025, 7, 4).expect("date"));
        let day = feed.schedule(feed.date).found().expect("schedule");
        let missing = day
            .games
            .iter()
            .filter(|g| feed.probable_pitchers(g.id).found().and_then(|p| p.both()).is_none())
            .count();
        assert_eq!(day.games.len(), 6);
        assert_eq!(missing, 1);
    }
}
