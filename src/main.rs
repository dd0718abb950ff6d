use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState, Tabs};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mlb_edge::config::{AppConfig, CliArgs};
use mlb_edge::export::{export_json, export_xlsx};
use mlb_edge::fake_feed::DemoFeed;
use mlb_edge::http_cache::HttpCache;
use mlb_edge::odds_fetch::OddsClient;
use mlb_edge::pipeline::{RunProgress, RunReport, run_for_date};
use mlb_edge::report::{COLUMNS, ReportRow, render_plain};
use mlb_edge::scoring::RosterCache;
use mlb_edge::stats_fetch::StatsClient;

/// Columns shown in the interactive table, as indices into `COLUMNS`.
const TUI_COLUMNS: [usize; 11] = [0, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let args = CliArgs::from_env()?;
    let cfg = AppConfig::from_env();
    let date = args.date_or_today();
    let top_n = args.top.unwrap_or(cfg.top_n);

    let mut rosters = RosterCache::new();
    let progress = |p: RunProgress| eprintln!("[{}/{}] {}", p.current, p.total, p.message);

    let run = if args.demo {
        let feed = DemoFeed::new(date);
        run_for_date(date, &feed, &feed, &mut rosters, top_n, progress)
    } else {
        let cache = if cfg.cache_persist {
            HttpCache::persistent(cfg.cache_ttl_secs)
        } else {
            HttpCache::in_memory(cfg.cache_ttl_secs)
        };
        let stats = StatsClient::new(&cfg.stats_base_url, cfg.http_timeout_secs, &cache);
        let odds = OddsClient::new(cfg.odds.clone(), cfg.http_timeout_secs, &cache);
        run_for_date(date, &stats, &odds, &mut rosters, top_n, progress)
    };

    for err in &run.errors {
        eprintln!("error: {err}");
    }
    if run.no_games() {
        println!("No games found for {date}.");
        return Ok(());
    }
    if !run.market_available {
        eprintln!("warning: market lines unavailable, edges left blank");
    }

    if let Some(path) = args.export.as_deref() {
        export_xlsx(path, &run.report)?;
        info!(path = %path.display(), "workbook written");
    }
    if let Some(path) = args.json.as_deref() {
        export_json(path, &run)?;
        info!(path = %path.display(), "json written");
    }

    if args.plain || !io::stdout().is_terminal() {
        print_plain(&run);
        return Ok(());
    }
    run_tui(&run).context("terminal display failed")
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mlb_edge=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn print_plain(run: &RunReport) {
    let title = format!("MLB spread & total model, {}", run.date);
    println!("{}", render_plain(&title, run.report.rows_by_margin()));
    println!("{}", render_plain("Top spread edges", &run.report.top_margin));
    println!("{}", render_plain("Top total edges", &run.report.top_total));
    if !run.excluded.is_empty() {
        println!("Excluded ({}):", run.excluded.len());
        for g in &run.excluded {
            println!("  {} - {}", g.matchup, g.reason);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    All,
    TopSpread,
    TopTotal,
}

impl View {
    const ALL: [View; 3] = [View::All, View::TopSpread, View::TopTotal];

    fn title(self) -> &'static str {
        match self {
            View::All => "All games",
            View::TopSpread => "Top spread edges",
            View::TopTotal => "Top total edges",
        }
    }

    fn next(self) -> Self {
        match self {
            View::All => View::TopSpread,
            View::TopSpread => View::TopTotal,
            View::TopTotal => View::All,
        }
    }
}

struct App<'a> {
    run: &'a RunReport,
    view: View,
    table: TableState,
    should_quit: bool,
}

impl<'a> App<'a> {
    fn new(run: &'a RunReport) -> Self {
        let mut table = TableState::default();
        table.select(Some(0));
        Self {
            run,
            view: View::All,
            table,
            should_quit: false,
        }
    }

    fn rows(&self) -> Vec<&'a ReportRow> {
        match self.view {
            View::All => self.run.report.rows_by_margin(),
            View::TopSpread => self.run.report.top_margin.iter().collect(),
            View::TopTotal => self.run.report.top_total.iter().collect(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => self.set_view(self.view.next()),
            KeyCode::Char('1') => self.set_view(View::All),
            KeyCode::Char('2') => self.set_view(View::TopSpread),
            KeyCode::Char('3') => self.set_view(View::TopTotal),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            _ => {}
        }
    }

    fn set_view(&mut self, view: View) {
        self.view = view;
        self.table.select(Some(0));
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let current = self.table.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table.select(Some(next as usize));
    }
}

/// Restores the terminal when dropped, whichever way `run_tui` exits.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

fn run_tui(run: &RunReport) -> io::Result<()> {
    let _guard = TerminalGuard::enter()?;
    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(run);
    event_loop(&mut terminal, &mut app)
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<'_>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let run = app.run;
    let header = Paragraph::new(format!(
        "MLB EDGE | {} | {} scored, {} excluded{}",
        run.date,
        run.report.rows.len(),
        run.excluded.len(),
        if run.market_available { "" } else { " | no market lines" }
    ))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let selected_tab = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()).collect::<Vec<_>>())
        .select(selected_tab)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, chunks[1]);

    let rows = app.rows();
    if rows.is_empty() {
        let empty = Paragraph::new("No rows with a market line")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, chunks[2]);
    } else {
        let header_row = Row::new(TUI_COLUMNS.iter().map(|&i| COLUMNS[i]))
            .style(Style::default().add_modifier(Modifier::BOLD));
        let body = rows.iter().map(|r| {
            let cells = r.cells();
            Row::new(TUI_COLUMNS.iter().map(|&i| cells[i].display()).collect::<Vec<_>>())
        });
        let widths = TUI_COLUMNS
            .iter()
            .map(|&i| if i == 0 { Constraint::Min(24) } else { Constraint::Length(12) })
            .collect::<Vec<_>>();
        let table = Table::new(body, widths)
            .header(header_row)
            .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_stateful_widget(table, chunks[2], &mut app.table);
    }

    let footer = Paragraph::new("Tab/1-3 View | j/k/↑/↓ Move | q Quit")
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);
}
