use crate::prediction::round2;
use crate::state::{ConfidenceTier, EdgePair, EdgeReport, Game, MarketGame, MarketLine, Picks, Prediction};

pub const SPREADS_MARKET: &str = "spreads";
pub const TOTALS_MARKET: &str = "totals";

/// Tier lower bounds on absolute edge, least to most confident.
const TIER_CUTS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

/// Finds the market game whose team names equal `home` and `away` exactly.
///
/// Every bookmaker is scanned in payload order and the last spread quoted for
/// the home team, and the last total point seen, win. Returns `None` when the
/// game is unknown or neither market is quoted.
pub fn match_line(games: &[MarketGame], home: &str, away: &str) -> Option<MarketLine> {
    let game = games
        .iter()
        .find(|g| g.home_team == home && g.away_team == away)?;

    let mut line = MarketLine::default();
    for bookmaker in &game.bookmakers {
        for market in &bookmaker.markets {
            if market.key == SPREADS_MARKET {
                for outcome in &market.outcomes {
                    if outcome.name == game.home_team {
                        if let Some(point) = outcome.point {
                            line.spread = Some(point);
                        }
                    }
                }
            } else if market.key == TOTALS_MARKET {
                for outcome in &market.outcomes {
                    if let Some(point) = outcome.point {
                        line.total = Some(point);
                    }
                }
            }
        }
    }

    if line.is_empty() { None } else { Some(line) }
}

pub fn compute_edges(prediction: &Prediction, line: Option<&MarketLine>) -> EdgePair {
    let Some(line) = line else {
        return EdgePair::default();
    };
    EdgePair {
        margin: line.spread.map(|s| round2(prediction.margin - s)),
        total: line.total.map(|t| round2(prediction.total - t)),
    }
}

/// Directional picks. Ties fall to the away side and the under.
pub fn pick(prediction: &Prediction, line: Option<&MarketLine>) -> Picks {
    let Some(line) = line else {
        return Picks::default();
    };
    let spread = line.spread.map(|s| {
        if prediction.margin > s {
            format!("Home -{}", format_point(s.abs()))
        } else {
            format!("Away +{}", format_point(s.abs()))
        }
    });
    let total = line.total.map(|t| {
        if prediction.total > t {
            format!("Over {}", format_point(t))
        } else {
            format!("Under {}", format_point(t))
        }
    });
    Picks { spread, total }
}

pub fn confidence_tier(edge: Option<f64>) -> ConfidenceTier {
    let Some(edge) = edge.filter(|e| e.is_finite()) else {
        return ConfidenceTier::Unavailable;
    };
    let abs = edge.abs();
    match TIER_CUTS.iter().filter(|&&cut| abs >= cut).count() {
        0 => ConfidenceTier::VeryLow,
        1 => ConfidenceTier::Low,
        2 => ConfidenceTier::Medium,
        3 => ConfidenceTier::High,
        _ => ConfidenceTier::VeryHigh,
    }
}

pub fn analyze(game: Game, prediction: Prediction, market: &[MarketGame]) -> EdgeReport {
    let line = match_line(market, &game.home, &game.away);
    let edges = compute_edges(&prediction, line.as_ref());
    let picks = pick(&prediction, line.as_ref());
    EdgeReport {
        game,
        prediction,
        line,
        spread_confidence: confidence_tier(edges.margin),
        total_confidence: confidence_tier(edges.total),
        edges,
        picks,
    }
}

/// Line values keep at least one decimal: `1.5`, `8.0`.
pub fn format_point(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::{confidence_tier, format_point};
    use crate::state::ConfidenceTier;

    #[test]
    fn tier_cut_points_are_inclusive_lower_bounds() {
        assert_eq!(confidence_tier(Some(0.49)), ConfidenceTier::VeryLow);
        assert_eq!(confidence_tier(Some(1.0)), ConfidenceTier::Medium);
        assert_eq!(confidence_tier(Some(-1.5)), ConfidenceTier::High);
        assert_eq!(confidence_tier(Some(2.0)), ConfidenceTier::VeryHigh);
    }

    #[test]
    fn non_finite_edge_is_unavailable() {
        assert_eq!(confidence_tier(Some(f64::NAN)), ConfidenceTier::Unavailable);
    }

    #[test]
    fn points_print_with_a_decimal() {
        assert_eq!(format_point(8.0), "8.0");
        assert_eq!(format_point(1.5), "1.5");
        assert_eq!(format_point(0.0), "0.0");
    }
}
