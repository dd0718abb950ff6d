use serde::Serialize;

use crate::prediction::round2;
use crate::state::{EdgeReport, ProbablePitchers};

pub const DEFAULT_TOP_N: usize = 5;

pub const COLUMNS: [&str; 17] = [
    "Matchup",
    "Home Pitcher",
    "Away Pitcher",
    "Home Pitcher Score",
    "Away Pitcher Score",
    "Home Hitter Score",
    "Away Hitter Score",
    "Predicted Margin (H - A)",
    "Predicted Total Runs",
    "Vegas Spread",
    "Vegas Total",
    "Margin Edge",
    "Total Edge",
    "Spread Pick",
    "Total Pick",
    "Spread Confidence",
    "Total Confidence",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameScores {
    pub home_pitcher: f64,
    pub away_pitcher: f64,
    pub home_hitter: f64,
    pub away_hitter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub matchup: String,
    pub home_pitcher: String,
    pub away_pitcher: String,
    pub scores: GameScores,
    pub edge: EdgeReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    fn text(v: Option<&String>) -> Self {
        v.map(|s| CellValue::Text(s.clone())).unwrap_or(CellValue::Empty)
    }

    fn number(v: Option<f64>) -> Self {
        v.map(CellValue::Number).unwrap_or(CellValue::Empty)
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format!("{n:.2}"),
            CellValue::Empty => String::new(),
        }
    }
}

impl ReportRow {
    pub fn new(pitchers: &ProbablePitchers, scores: GameScores, edge: EdgeReport) -> Self {
        Self {
            matchup: edge.game.matchup(),
            home_pitcher: pitchers.home_name.clone(),
            away_pitcher: pitchers.away_name.clone(),
            scores,
            edge,
        }
    }

    pub fn margin_edge(&self) -> Option<f64> {
        self.edge.edges.margin
    }

    pub fn total_edge(&self) -> Option<f64> {
        self.edge.edges.total
    }

    /// One value per entry of [`COLUMNS`].
    pub fn cells(&self) -> Vec<CellValue> {
        let line = self.edge.line.as_ref();
        vec![
            CellValue::Text(self.matchup.clone()),
            CellValue::Text(self.home_pitcher.clone()),
            CellValue::Text(self.away_pitcher.clone()),
            CellValue::Number(round2(self.scores.home_pitcher)),
            CellValue::Number(round2(self.scores.away_pitcher)),
            CellValue::Number(round2(self.scores.home_hitter)),
            CellValue::Number(round2(self.scores.away_hitter)),
            CellValue::Number(self.edge.prediction.margin),
            CellValue::Number(self.edge.prediction.total),
            CellValue::number(line.and_then(|l| l.spread)),
            CellValue::number(line.and_then(|l| l.total)),
            CellValue::number(self.edge.edges.margin),
            CellValue::number(self.edge.edges.total),
            CellValue::text(self.edge.picks.spread.as_ref()),
            CellValue::text(self.edge.picks.total.as_ref()),
            CellValue::Text(self.edge.spread_confidence.label()),
            CellValue::Text(self.edge.total_confidence.label()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub top_margin: Vec<ReportRow>,
    pub top_total: Vec<ReportRow>,
}

pub fn build_report(rows: Vec<ReportRow>, top_n: usize) -> Report {
    let top_margin = top_by_edge(&rows, top_n, ReportRow::margin_edge);
    let top_total = top_by_edge(&rows, top_n, ReportRow::total_edge);
    Report {
        rows,
        top_margin,
        top_total,
    }
}

/// Rows with a known edge, largest absolute edge first. Equal edges keep
/// their original order.
pub fn top_by_edge(rows: &[ReportRow], n: usize, edge: impl Fn(&ReportRow) -> Option<f64>) -> Vec<ReportRow> {
    let mut ranked: Vec<(f64, &ReportRow)> = rows
        .iter()
        .filter_map(|r| edge(r).filter(|e| e.is_finite()).map(|e| (e.abs(), r)))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().take(n).map(|(_, r)| r.clone()).collect()
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows_by_margin(&self) -> Vec<&ReportRow> {
        let mut rows: Vec<&ReportRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.edge.prediction.margin.total_cmp(&a.edge.prediction.margin));
        rows
    }
}

/// Fixed-width text rendering for non-interactive output.
pub fn render_plain<'a>(title: &str, rows: impl IntoIterator<Item = &'a ReportRow>) -> String {
    let body: Vec<Vec<String>> = rows
        .into_iter()
        .map(|r| r.cells().iter().map(CellValue::display).collect())
        .collect();
    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut out = format!("{title}\n");
    out.push_str(&pad_line(&header, &widths));
    out.push('\n');
    if body.is_empty() {
        out.push_str("(none)\n");
    }
    for row in &body {
        out.push_str(&pad_line(row, &widths));
        out.push('\n');
    }
    out
}

fn pad_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
