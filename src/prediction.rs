use crate::state::Prediction;

const MARGIN_PITCHING_WEIGHT: f64 = 0.4;
const MARGIN_HITTING_WEIGHT: f64 = 0.6;

const TOTAL_HITTING_WEIGHT: f64 = 0.14;
const TOTAL_PITCHING_WEIGHT: f64 = 0.04;
const TOTAL_BASE_RUNS: f64 = 9.2;

/// Rounds to cents. Exact halves of the scaled value go to the even cent, so
/// `1.125` becomes `1.12`.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Home minus away run margin.
pub fn predict_margin(home_p: f64, away_p: f64, home_h: f64, away_h: f64) -> f64 {
    round2((home_p - away_p) * MARGIN_PITCHING_WEIGHT + (home_h - away_h) * MARGIN_HITTING_WEIGHT)
}

pub fn predict_total(home_p: f64, away_p: f64, home_h: f64, away_h: f64) -> f64 {
    round2((home_h + away_h) * TOTAL_HITTING_WEIGHT - (home_p + away_p) * TOTAL_PITCHING_WEIGHT + TOTAL_BASE_RUNS)
}

pub fn predict(home_p: f64, away_p: f64, home_h: f64, away_h: f64) -> Prediction {
    Prediction {
        margin: predict_margin(home_p, away_p, home_h, away_h),
        total: predict_total(home_p, away_p, home_h, away_h),
    }
}
