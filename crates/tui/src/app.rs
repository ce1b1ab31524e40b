use std::{fs, io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use corkboard_core::{
    catalog::{CatalogEvent, CatalogLoader, CatalogSnapshot},
    config::{self, AppConfig},
    models::{Category, Listing, NO_IMAGE_LABEL},
    search,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::banner;

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_QUERY_LEN: usize = 64;
const MAX_PRICE_DIGITS: usize = 7;
// One tick approximates the 200 ms blur delay of the original page, long
// enough for Enter on a highlighted suggestion to land first.
const SUGGESTION_HIDE_TICKS: u8 = 1;
const CARD_HEIGHT: usize = 4;

const MASTHEAD: &str = "CORKBOARD";
const TAGLINE: &str = "local classifieds and forums";

const CONDITION_LABELS: [&str; 4] = ["New", "Like New", "Good", "Fair"];
const DISTANCE_OPTIONS: [&str; 5] = ["5 miles", "10 miles", "25 miles", "50 miles", "100+ miles"];
const POSTED_LABELS: [&str; 3] = ["Today", "This week", "This month"];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::Blue,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
        }
    }
}

fn load_theme() -> (Theme, String) {
    let mut theme = Theme::default();
    let path = config::config_dir().join("theme.json");
    if !path.exists() {
        return (theme, "No theme file; using default palette.".to_string());
    }

    let data = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            return (
                theme,
                format!(
                    "Failed to read {} ({err}); using default palette.",
                    path.display()
                ),
            )
        }
    };

    let json: Value = match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            return (
                theme,
                format!(
                    "Failed to parse {} ({err}); using default palette.",
                    path.display()
                ),
            )
        }
    };

    let Some(map) = json.as_object() else {
        return (
            theme,
            format!("{} is not a JSON object; using default palette.", path.display()),
        );
    };

    let mut applied: Vec<&str> = Vec::new();
    let mut apply = |key: &'static str, slot: &mut Color| {
        if let Some(color) = map.get(key).and_then(value_to_color) {
            *slot = color;
            applied.push(key);
        }
    };
    apply("foreground", &mut theme.primary_fg);
    apply("accent", &mut theme.accent);
    apply("accent_alt", &mut theme.accent_alt);
    apply("muted", &mut theme.muted);
    apply("selection_bg", &mut theme.selection_bg);
    apply("selection_fg", &mut theme.selection_fg);
    apply("success", &mut theme.success);
    apply("warning", &mut theme.warning);

    if applied.iter().all(|entry| *entry != "selection_fg") {
        theme.selection_fg = contrast_color(&theme.selection_bg, theme.selection_fg);
    }

    let summary = if applied.is_empty() {
        format!(
            "Loaded theme from {} but no recognized color keys were applied.",
            path.display()
        )
    } else {
        format!(
            "Loaded theme from {} (applied {}).",
            path.display(),
            applied.join(", ")
        )
    };

    (theme, summary)
}

fn value_to_color(value: &Value) -> Option<Color> {
    value.as_str().and_then(parse_hex_color)
}

fn parse_hex_color(input: &str) -> Option<Color> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

fn contrast_color(color: &Color, fallback: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let luminance = 0.299 * f64::from(*r) + 0.587 * f64::from(*g) + 0.114 * f64::from(*b);
            if luminance > 186.0 {
                Color::Black
            } else {
                Color::White
            }
        }
        _ => fallback,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Results,
}

/// What the results screen currently shows, kept so the view can be
/// re-rendered after a catalog refresh.
#[derive(Debug, Clone)]
enum ResultsQuery {
    Category(Category),
    Text(String),
}

enum AppEvent {
    Input(Event),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterControl {
    MinPrice,
    MaxPrice,
    Condition(usize),
    Distance,
    Posted(usize),
}

impl FilterControl {
    const COUNT: usize = 2 + CONDITION_LABELS.len() + 1 + POSTED_LABELS.len();

    fn at(index: usize) -> FilterControl {
        match index {
            0 => FilterControl::MinPrice,
            1 => FilterControl::MaxPrice,
            idx if idx < 2 + CONDITION_LABELS.len() => FilterControl::Condition(idx - 2),
            idx if idx == 2 + CONDITION_LABELS.len() => FilterControl::Distance,
            idx => FilterControl::Posted(idx - 3 - CONDITION_LABELS.len()),
        }
    }
}

/// Display-only filter controls. Values are collected and logged on every
/// change but never applied to the rendered list.
#[derive(Debug, Clone)]
struct FilterPanel {
    focused: bool,
    cursor: usize,
    min_price: String,
    max_price: String,
    conditions: [bool; CONDITION_LABELS.len()],
    distance_index: usize,
    posted: [bool; POSTED_LABELS.len()],
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self {
            focused: false,
            cursor: 0,
            min_price: String::new(),
            max_price: String::new(),
            conditions: [false; CONDITION_LABELS.len()],
            distance_index: 0,
            posted: [false; POSTED_LABELS.len()],
        }
    }
}

impl FilterPanel {
    fn current(&self) -> FilterControl {
        FilterControl::at(self.cursor)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = FilterControl::COUNT as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
    }

    fn toggle_current(&mut self) -> bool {
        match self.current() {
            FilterControl::Condition(idx) => {
                self.conditions[idx] = !self.conditions[idx];
                true
            }
            FilterControl::Posted(idx) => {
                self.posted[idx] = !self.posted[idx];
                true
            }
            _ => false,
        }
    }

    fn cycle_distance(&mut self, delta: isize) -> bool {
        if self.current() != FilterControl::Distance {
            return false;
        }
        let len = DISTANCE_OPTIONS.len() as isize;
        let mut idx = self.distance_index as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        if idx as usize == self.distance_index {
            return false;
        }
        self.distance_index = idx as usize;
        true
    }

    fn push_digit(&mut self, ch: char) -> bool {
        let field = match self.current() {
            FilterControl::MinPrice => &mut self.min_price,
            FilterControl::MaxPrice => &mut self.max_price,
            _ => return false,
        };
        if field.len() >= MAX_PRICE_DIGITS || !ch.is_ascii_digit() {
            return false;
        }
        field.push(ch);
        true
    }

    fn backspace(&mut self) -> bool {
        let field = match self.current() {
            FilterControl::MinPrice => &mut self.min_price,
            FilterControl::MaxPrice => &mut self.max_price,
            _ => return false,
        };
        field.pop().is_some()
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection {
            min_price: self.min_price.parse().ok(),
            max_price: self.max_price.parse().ok(),
            condition: CONDITION_LABELS
                .iter()
                .zip(self.conditions)
                .filter_map(|(label, on)| on.then_some(*label))
                .collect(),
            distance: DISTANCE_OPTIONS[self.distance_index],
            posted: POSTED_LABELS
                .iter()
                .zip(self.posted)
                .filter_map(|(label, on)| on.then_some(*label))
                .collect(),
        }
    }
}

/// Snapshot of the collected filter values, mirroring the original page's
/// console log shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterSelection {
    min_price: Option<u32>,
    max_price: Option<u32>,
    condition: Vec<&'static str>,
    distance: &'static str,
    posted: Vec<&'static str>,
}

struct UiState {
    query: String,
    suggestions: Vec<&'static str>,
    suggestions_visible: bool,
    suggestion_cursor: Option<usize>,
    suggestion_hide_ticks: Option<u8>,
    category_cursor: usize,
    results: Vec<Listing>,
    results_header: String,
    results_cursor: usize,
    list_height: usize,
    show_banner: bool,
    mode: Mode,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            suggestions_visible: false,
            suggestion_cursor: None,
            suggestion_hide_ticks: None,
            category_cursor: 0,
            results: Vec::new(),
            results_header: String::new(),
            results_cursor: 0,
            list_height: 1,
            show_banner: true,
            mode: Mode::Browse,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn push_query_char(&mut self, ch: char) {
        if self.query.chars().count() >= MAX_QUERY_LEN || ch.is_control() {
            return;
        }
        self.query.push(ch);
        self.refresh_suggestions();
    }

    fn pop_query_char(&mut self) {
        self.query.pop();
        self.refresh_suggestions();
    }

    /// Recompute the dropdown for the current query. Queries below the
    /// minimum length, or without matches, hide it.
    fn refresh_suggestions(&mut self) {
        self.suggestions = search::suggestions_for(&self.query);
        self.suggestion_cursor = None;
        self.suggestion_hide_ticks = None;
        self.suggestions_visible = !self.suggestions.is_empty();
    }

    fn hide_suggestions(&mut self) {
        self.suggestions_visible = false;
        self.suggestion_cursor = None;
        self.suggestion_hide_ticks = None;
    }

    /// Hide the dropdown after a short delay instead of immediately, so an
    /// activation racing the blur still lands.
    fn schedule_suggestion_hide(&mut self) {
        if self.suggestions_visible {
            self.suggestion_hide_ticks = Some(SUGGESTION_HIDE_TICKS);
        }
    }

    /// Advance the delayed hide; returns true when the dropdown was hidden
    /// on this tick.
    fn tick_suggestion_hide(&mut self) -> bool {
        match self.suggestion_hide_ticks {
            Some(ticks) if ticks <= 1 => {
                self.hide_suggestions();
                true
            }
            Some(ticks) => {
                self.suggestion_hide_ticks = Some(ticks - 1);
                false
            }
            None => false,
        }
    }

    fn move_suggestion_cursor(&mut self, delta: isize) {
        if !self.suggestions_visible || self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len() as isize;
        let next = match self.suggestion_cursor {
            None => {
                if delta >= 0 {
                    0
                } else {
                    len - 1
                }
            }
            Some(current) => {
                let mut idx = current as isize + delta;
                if idx < 0 {
                    idx = 0;
                } else if idx >= len {
                    idx = len - 1;
                }
                idx
            }
        };
        self.suggestion_cursor = Some(next as usize);
    }

    fn selected_suggestion(&self) -> Option<&'static str> {
        let index = self.suggestion_cursor?;
        self.suggestions.get(index).copied()
    }

    fn move_category_cursor(&mut self, delta: isize) {
        let len = Category::ALL.len() as isize;
        let mut idx = self.category_cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.category_cursor = idx as usize;
    }

    fn selected_category(&self) -> Category {
        Category::ALL[self.category_cursor.min(Category::ALL.len() - 1)]
    }

    fn set_results(&mut self, results: Vec<Listing>, header: String) {
        self.results = results;
        self.results_header = header;
        self.results_cursor = 0;
    }

    fn move_results_cursor(&mut self, delta: isize) {
        if self.results.is_empty() {
            return;
        }
        let len = self.results.len() as isize;
        let mut idx = self.results_cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.results_cursor = idx as usize;
    }

    fn move_results_to(&mut self, index: usize) {
        if self.results.is_empty() {
            return;
        }
        self.results_cursor = index.min(self.results.len() - 1);
    }

    fn results_page(&self) -> usize {
        (self.list_height / CARD_HEIGHT).max(1)
    }

    fn current_listing(&self) -> Option<&Listing> {
        self.results.get(self.results_cursor)
    }

    /// The return-to-home transition always clears the search box and hides
    /// the dropdown.
    fn go_home(&mut self) {
        self.query.clear();
        self.hide_suggestions();
        self.mode = Mode::Browse;
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }
}

/// Top-level controller for the corkboard terminal UI.
pub struct BoardApp {
    loader: CatalogLoader,
    catalog: CatalogSnapshot,
    state: UiState,
    screen: Screen,
    results_query: Option<ResultsQuery>,
    filters: FilterPanel,
    catalog_rx: Option<mpsc::Receiver<CatalogEvent>>,
    search_area: Rect,
    theme: Theme,
    theme_status: Option<String>,
}

impl BoardApp {
    pub fn new(loader: CatalogLoader, config: &AppConfig) -> Self {
        let (theme, theme_status) = load_theme();
        let state = UiState {
            show_banner: config.show_banner,
            ..UiState::default()
        };
        Self {
            loader,
            catalog: CatalogSnapshot::empty(),
            state,
            screen: Screen::Home,
            results_query: None,
            filters: FilterPanel::default(),
            catalog_rx: None,
            search_area: Rect::default(),
            theme,
            theme_status: Some(theme_status),
        }
    }

    pub fn attach_catalog_watch(&mut self, receiver: mpsc::Receiver<CatalogEvent>) {
        self.catalog_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        self.reload_catalog()?;
        let mut status = format!(
            "Loaded {} across {} categories",
            pluralize(self.catalog.listing_count(), "listing"),
            self.catalog.category_count()
        );
        if let Some(note) = self.theme_status.as_ref() {
            status.push_str(" • ");
            status.push_str(note);
        }
        self.state.set_status(status);

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut catalog_rx = self.catalog_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            if catalog_rx.is_some() {
                let mut watch_closed = false;
                let rx = catalog_rx.as_mut().unwrap();
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_change = rx.recv() => {
                        match maybe_change {
                            Some(event) => self.handle_catalog_event(event),
                            None => watch_closed = true,
                        }
                    }
                }
                if watch_closed {
                    catalog_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn reload_catalog(&mut self) -> Result<()> {
        self.catalog = self.loader.snapshot()?;
        info!(
            listings = self.catalog.listing_count(),
            source = %self.loader.source().describe(),
            "Catalog loaded"
        );
        Ok(())
    }

    fn handle_catalog_event(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Changed { path } => {
                info!(path = %path.display(), "Catalog file changed; reloading");
                self.loader.refresh();
                match self.reload_catalog() {
                    Ok(()) => {
                        self.rerun_results_query();
                        self.state.set_status(format!(
                            "Catalog refreshed: {}",
                            pluralize(self.catalog.listing_count(), "listing")
                        ));
                    }
                    Err(err) => {
                        error!(?err, "Catalog reload failed");
                        self.state.set_status(format!("Catalog reload failed: {err}"));
                    }
                }
            }
            CatalogEvent::Error(err) => {
                error!(?err, "Catalog watch failed");
                self.state.set_status(format!("Catalog watch failed: {err}"));
            }
        }
    }

    /// Re-render the results screen against the current catalog.
    fn rerun_results_query(&mut self) {
        if self.screen != Screen::Results {
            return;
        }
        match self.results_query.clone() {
            Some(ResultsQuery::Category(category)) => self.show_category_results(category),
            Some(ResultsQuery::Text(query)) => self.show_search_results(query),
            None => {}
        }
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.state.tick_suggestion_hide() {
            debug!("Suggestion dropdown hidden after blur delay");
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        if let Event::Key(ref key) = event {
            if self.handle_global_shortcut(key) {
                return Ok(());
            }
        }
        match event {
            Event::Key(key) => self.handle_key(key)?,
            Event::Resize(_, _) => {}
            Event::Mouse(_) => {}
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }
        Ok(())
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers == KeyModifiers::CONTROL {
            match key.code {
                KeyCode::Char('c') => {
                    self.state.should_quit = true;
                    return true;
                }
                KeyCode::Char('r') => {
                    self.loader.refresh();
                    match self.reload_catalog() {
                        Ok(()) => {
                            self.rerun_results_query();
                            self.state.set_status(format!(
                                "Reloaded {}",
                                pluralize(self.catalog.listing_count(), "listing")
                            ));
                        }
                        Err(err) => {
                            error!(?err, "Manual catalog reload failed");
                            self.state.set_status(format!("Reload failed: {err}"));
                        }
                    }
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.state.mode == Mode::Search {
            return self.handle_search_key(key);
        }
        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Results => {
                if self.filters.focused {
                    self.handle_filter_key(key)
                } else {
                    self.handle_results_key(key)
                }
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.schedule_suggestion_hide();
                self.state.set_status("Search box unfocused".to_string());
            }
            KeyCode::Enter => {
                if let Some(suggestion) = self.state.selected_suggestion() {
                    self.state.query = suggestion.to_string();
                    self.state.hide_suggestions();
                }
                self.perform_search();
            }
            KeyCode::Down | KeyCode::Tab => self.state.move_suggestion_cursor(1),
            KeyCode::Up | KeyCode::BackTab => self.state.move_suggestion_cursor(-1),
            KeyCode::Backspace => self.state.pop_query_char(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.push_query_char(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('s') => self.focus_search(),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_category_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_category_cursor(-1),
            KeyCode::Char('b') => {
                self.state.show_banner = !self.state.show_banner;
                let message = if self.state.show_banner {
                    "Masthead shown"
                } else {
                    "Masthead hidden"
                };
                self.state.set_status(message.to_string());
            }
            KeyCode::Enter => {
                let category = self.state.selected_category();
                self.show_category_results(category);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Esc => self.go_home(),
            KeyCode::Char('/') | KeyCode::Char('s') => self.focus_search(),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_results_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_results_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.state.move_results_to(0),
            KeyCode::Char('G') | KeyCode::End => {
                self.state.move_results_to(usize::MAX);
            }
            KeyCode::PageDown => {
                let page = self.state.results_page();
                self.state.move_results_cursor(page as isize);
            }
            KeyCode::PageUp => {
                let page = self.state.results_page();
                self.state.move_results_cursor(-(page as isize));
            }
            KeyCode::Enter => self.view_listing(),
            KeyCode::Char('c') => self.contact_seller(),
            KeyCode::Char('f') => {
                self.filters.focused = true;
                self.state
                    .set_status("Filter panel focused (display only)".to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        let mut changed = false;
        match key.code {
            KeyCode::Esc | KeyCode::Char('f') => {
                self.filters.focused = false;
                self.state.set_status("Filter panel closed".to_string());
            }
            KeyCode::Char('j') | KeyCode::Down => self.filters.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.filters.move_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => changed = self.filters.toggle_current(),
            KeyCode::Char('h') | KeyCode::Left => changed = self.filters.cycle_distance(-1),
            KeyCode::Char('l') | KeyCode::Right => changed = self.filters.cycle_distance(1),
            KeyCode::Backspace => changed = self.filters.backspace(),
            KeyCode::Char(ch) if ch.is_ascii_digit() => changed = self.filters.push_digit(ch),
            _ => {}
        }
        if changed {
            self.note_filters();
        }
        Ok(())
    }

    /// The original page collects filter values on every change and logs
    /// them without applying anything; same here.
    fn note_filters(&mut self) {
        let selection = self.filters.selection();
        let summary = serde_json::to_string(&selection).unwrap_or_default();
        debug!(filters = %summary, "Filters collected (display only)");
    }

    fn focus_search(&mut self) {
        self.state.mode = Mode::Search;
        // Focus re-opens the dropdown for whatever the box already holds.
        self.state.refresh_suggestions();
        self.state
            .set_status("Type to search listing titles".to_string());
    }

    fn perform_search(&mut self) {
        let query = self.state.query.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.state.mode = Mode::Browse;
        self.state.hide_suggestions();
        self.show_search_results(query);
    }

    fn show_search_results(&mut self, query: String) {
        let results: Vec<Listing> = self
            .catalog
            .search_titles(&query)
            .into_iter()
            .cloned()
            .collect();
        info!(query = %query, results = results.len(), "Search executed");
        self.state
            .set_results(results, format!("Search results for \"{query}\""));
        self.screen = Screen::Results;
        self.state.set_status(format!(
            "{} · Enter view · c contact · f filters · Esc home",
            pluralize(self.state.results.len(), "result")
        ));
        self.results_query = Some(ResultsQuery::Text(query));
    }

    fn show_category_results(&mut self, category: Category) {
        let results = self.catalog.listings_in(category).to_vec();
        info!(category = %category, results = results.len(), "Category opened");
        self.state
            .set_results(results, format!("Browse {category}"));
        self.screen = Screen::Results;
        self.state.set_status(format!(
            "{} · Enter view · c contact · f filters · Esc home",
            pluralize(self.state.results.len(), "result")
        ));
        self.results_query = Some(ResultsQuery::Category(category));
    }

    fn view_listing(&mut self) {
        let Some(id) = self.state.current_listing().map(|listing| listing.id) else {
            self.state.set_status("No listing selected".to_string());
            return;
        };
        info!(id, "Listing opened (stub)");
        self.state.set_status(format!(
            "Viewing listing {id}: a detail view would open here"
        ));
    }

    fn contact_seller(&mut self) {
        let Some(id) = self.state.current_listing().map(|listing| listing.id) else {
            self.state.set_status("No listing selected".to_string());
            return;
        };
        info!(id, "Seller contacted (stub)");
        self.state.set_status(format!(
            "Contacting seller for listing {id}: a contact form would open here"
        ));
    }

    fn go_home(&mut self) {
        self.screen = Screen::Home;
        self.results_query = None;
        self.filters.focused = false;
        self.state.go_home();
        self.state
            .set_status("Back to the front page · / search · Enter browse".to_string());
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Home => self.draw_home(frame),
            Screen::Results => self.draw_results(frame),
        }
        if self.state.suggestions_visible && !self.state.suggestions.is_empty() {
            self.render_suggestions(frame);
        }
    }

    fn draw_home(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let banner_lines = if self.state.show_banner {
            Some(banner::render(MASTHEAD))
        } else {
            None
        };

        let mut constraints = Vec::new();
        if let Some(lines) = &banner_lines {
            constraints.push(Constraint::Length(lines.len() as u16 + 2));
        }
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Min(9));
        constraints.push(Constraint::Length(4));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);

        let mut chunk_iter = chunks.iter();
        let banner_chunk = if banner_lines.is_some() {
            chunk_iter.next()
        } else {
            None
        };
        let search_chunk = chunk_iter.next().copied().unwrap_or(size);
        let categories_chunk = chunk_iter.next().copied().unwrap_or(size);
        let status_chunk = chunk_iter.next().copied().unwrap_or(size);

        if let (Some(lines), Some(area)) = (banner_lines.as_ref(), banner_chunk.copied()) {
            self.render_hero(frame, area, lines);
        }
        self.render_search_bar(frame, search_chunk);
        self.render_categories(frame, categories_chunk);
        self.render_status(frame, status_chunk);
    }

    fn draw_results(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(20)])
            .split(chunks[1]);

        self.render_search_bar(frame, chunks[0]);
        self.render_filter_panel(frame, body[0]);
        self.render_results_list(frame, body[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_hero(&self, frame: &mut Frame, area: Rect, lines: &[String]) {
        let mut content: Vec<Line> = lines
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    line.clone(),
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            TAGLINE,
            Style::default().fg(self.theme.muted),
        )));
        let hero = Paragraph::new(content).alignment(Alignment::Center);
        frame.render_widget(hero, area);
    }

    fn render_search_bar(&mut self, frame: &mut Frame, area: Rect) {
        self.search_area = area;
        let focused = self.state.mode == Mode::Search;
        let title = if focused { "Search" } else { "Search (/)" };

        let content = if self.state.query.is_empty() && !focused {
            Line::from(Span::styled(
                "search listing titles",
                Style::default().fg(self.theme.muted),
            ))
        } else {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(self.theme.accent)),
                Span::raw(self.state.query.clone()),
            ])
        };

        let paragraph =
            Paragraph::new(vec![content]).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);

        if focused {
            let prefix = 3u16; // border + "> "
            let cursor_x = (area.x + prefix + self.state.query.chars().count() as u16)
                .min(area.x + area.width.saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
        }
    }

    fn render_categories(&self, frame: &mut Frame, area: Rect) {
        let mut list_state = ListState::default();
        list_state.select(Some(self.state.category_cursor));

        let items: Vec<ListItem> = Category::ALL
            .iter()
            .enumerate()
            .map(|(idx, category)| {
                let marker = if idx == self.state.category_cursor {
                    Span::styled("▶ ", Style::default().fg(self.theme.accent))
                } else {
                    Span::raw("  ")
                };
                let count = self.catalog.listings_in(*category).len();
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(
                        category.display_name(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", pluralize(count, "listing")),
                        Style::default().fg(self.theme.muted),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Categories"))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            );
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_filter_panel(&self, frame: &mut Frame, area: Rect) {
        let title = if self.filters.focused {
            "Filters (editing)"
        } else {
            "Filters (f)"
        };

        let section = |label: &'static str| {
            Line::from(Span::styled(
                label,
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
        };
        let marker = |index: usize| {
            if self.filters.focused && self.filters.cursor == index {
                Span::styled("▶ ", Style::default().fg(self.theme.accent))
            } else {
                Span::raw("  ")
            }
        };
        let value_span = |value: &str, placeholder: &'static str| {
            if value.is_empty() {
                Span::styled(placeholder.to_string(), Style::default().fg(self.theme.muted))
            } else {
                Span::raw(value.to_string())
            }
        };

        let mut lines = Vec::with_capacity(FilterControl::COUNT + 6);
        lines.push(section("Price Range"));
        lines.push(Line::from(vec![
            marker(0),
            Span::raw("Min price: "),
            value_span(&self.filters.min_price, "0"),
        ]));
        lines.push(Line::from(vec![
            marker(1),
            Span::raw("Max price: "),
            value_span(&self.filters.max_price, "10000"),
        ]));
        lines.push(Line::from(""));
        lines.push(section("Condition"));
        for (idx, label) in CONDITION_LABELS.iter().enumerate() {
            let check = if self.filters.conditions[idx] { "[x] " } else { "[ ] " };
            lines.push(Line::from(vec![
                marker(2 + idx),
                Span::raw(check),
                Span::raw(*label),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(section("Distance"));
        lines.push(Line::from(vec![
            marker(2 + CONDITION_LABELS.len()),
            Span::raw("Within: "),
            Span::raw("< "),
            Span::raw(DISTANCE_OPTIONS[self.filters.distance_index]),
            Span::raw(" >"),
        ]));
        lines.push(Line::from(""));
        lines.push(section("Posted"));
        for (idx, label) in POSTED_LABELS.iter().enumerate() {
            let check = if self.filters.posted[idx] { "[x] " } else { "[ ] " };
            lines.push(Line::from(vec![
                marker(3 + CONDITION_LABELS.len() + idx),
                Span::raw(check),
                Span::raw(*label),
            ]));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_results_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        let count = self.state.results.len();
        let title = format!(
            "{}  ({})",
            self.state.results_header,
            pluralize(count, "result")
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        if count == 0 {
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No results found",
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Try adjusting your search terms or filters",
                    Style::default().fg(self.theme.muted),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(message, area);
            return;
        }

        let mut list_state = ListState::default();
        list_state.select(Some(self.state.results_cursor.min(count - 1)));

        let items: Vec<ListItem> = self
            .state
            .results
            .iter()
            .map(|listing| listing_card(listing, &self.theme))
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(self.theme.selection_bg)
                .fg(self.theme.selection_fg),
        );
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_suggestions(&self, frame: &mut Frame) {
        let frame_area = frame.size();
        let anchor = self.search_area;
        let below = frame_area.height.saturating_sub(anchor.y + anchor.height);
        let height = (self.state.suggestions.len() as u16 + 2).min(below);
        if height < 3 || anchor.width < 4 {
            return;
        }
        let area = Rect::new(anchor.x, anchor.y + anchor.height, anchor.width, height);

        frame.render_widget(Clear, area);

        let mut list_state = ListState::default();
        list_state.select(self.state.suggestion_cursor);

        let items: Vec<ListItem> = self
            .state
            .suggestions
            .iter()
            .enumerate()
            .map(|(idx, suggestion)| {
                let marker = if self.state.suggestion_cursor == Some(idx) {
                    Span::styled("▶ ", Style::default().fg(self.theme.accent))
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![marker, Span::raw(*suggestion)]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Suggestions"))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            );
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Search {
            format!("Search: {}", self.state.query)
        } else {
            self.state.status.clone()
        };
        let secondary = format!(
            "{} across {} categories · loaded {}",
            pluralize(self.catalog.listing_count(), "listing"),
            self.catalog.category_count(),
            self.catalog
                .loaded_at()
                .with_timezone(&Local)
                .format("%H:%M:%S")
        );
        let paragraph = Paragraph::new(vec![
            Line::from(primary),
            Line::from(Span::styled(secondary, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn listing_card(listing: &Listing, theme: &Theme) -> ListItem<'static> {
    let image_label = listing
        .image_label()
        .unwrap_or_else(|| NO_IMAGE_LABEL.to_string());

    let mut seller_spans = vec![
        Span::styled("★★★★★", Style::default().fg(theme.warning)),
        Span::raw(format!(" {:.1}", listing.seller.rating)),
    ];
    if listing.seller.verified {
        seller_spans.push(Span::styled(
            "  Verified",
            Style::default().fg(theme.success),
        ));
    }
    seller_spans.push(Span::styled(
        format!("  Joined {}", listing.seller.join_date),
        Style::default().fg(theme.muted),
    ));
    seller_spans.push(Span::styled(
        format!("  [{image_label}]"),
        Style::default().fg(theme.accent_alt),
    ));

    ListItem::new(vec![
        Line::from(Span::styled(
            listing.title.clone(),
            Style::default()
                .fg(theme.primary_fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                listing.price.clone(),
                Style::default()
                    .fg(theme.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {} · {} · Posted {}",
                    listing.location, listing.distance, listing.time_posted
                ),
                Style::default().fg(theme.muted),
            ),
        ]),
        Line::from(seller_spans),
        Line::from(""),
    ])
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_updates_the_dropdown() {
        let mut state = UiState::default();
        state.push_query_char('p');
        assert!(!state.suggestions_visible);
        state.push_query_char('r');
        state.push_query_char('o');
        assert!(state.suggestions_visible);
        assert_eq!(
            state.suggestions,
            vec!["iPhone 13 Pro Max", "MacBook Pro M2"]
        );
    }

    #[test]
    fn shrinking_below_min_length_hides_the_dropdown() {
        let mut state = UiState::default();
        state.push_query_char('p');
        state.push_query_char('r');
        assert!(state.suggestions_visible);
        state.pop_query_char();
        assert!(!state.suggestions_visible);
        assert!(state.suggestions.is_empty());
    }

    #[test]
    fn unmatched_queries_hide_the_dropdown() {
        let mut state = UiState::default();
        for ch in "zzz".chars() {
            state.push_query_char(ch);
        }
        assert!(!state.suggestions_visible);
    }

    #[test]
    fn delayed_hide_takes_one_tick() {
        let mut state = UiState::default();
        state.push_query_char('p');
        state.push_query_char('r');
        state.schedule_suggestion_hide();
        assert!(state.suggestions_visible);
        assert!(state.tick_suggestion_hide());
        assert!(!state.suggestions_visible);
        assert!(!state.tick_suggestion_hide());
    }

    #[test]
    fn retyping_cancels_a_pending_hide() {
        let mut state = UiState::default();
        state.push_query_char('p');
        state.push_query_char('r');
        state.schedule_suggestion_hide();
        state.push_query_char('o');
        assert!(!state.tick_suggestion_hide());
        assert!(state.suggestions_visible);
    }

    #[test]
    fn suggestion_cursor_clamps_to_the_list() {
        let mut state = UiState::default();
        state.push_query_char('p');
        state.push_query_char('r');
        state.push_query_char('o');
        assert_eq!(state.selected_suggestion(), None);
        state.move_suggestion_cursor(1);
        assert_eq!(state.selected_suggestion(), Some("iPhone 13 Pro Max"));
        state.move_suggestion_cursor(5);
        assert_eq!(state.selected_suggestion(), Some("MacBook Pro M2"));
        state.move_suggestion_cursor(-10);
        assert_eq!(state.selected_suggestion(), Some("iPhone 13 Pro Max"));
    }

    #[test]
    fn going_home_clears_the_query_and_dropdown() {
        let mut state = UiState::default();
        for ch in "pro".chars() {
            state.push_query_char(ch);
        }
        state.mode = Mode::Search;
        state.go_home();
        assert!(state.query.is_empty());
        assert!(!state.suggestions_visible);
        assert_eq!(state.mode, Mode::Browse);
    }

    #[test]
    fn category_cursor_clamps() {
        let mut state = UiState::default();
        state.move_category_cursor(-5);
        assert_eq!(state.selected_category(), Category::Services);
        state.move_category_cursor(100);
        assert_eq!(state.selected_category(), Category::Gigs);
    }

    #[test]
    fn query_length_is_bounded() {
        let mut state = UiState::default();
        for _ in 0..(MAX_QUERY_LEN + 10) {
            state.push_query_char('a');
        }
        assert_eq!(state.query.chars().count(), MAX_QUERY_LEN);
    }

    #[test]
    fn filter_panel_collects_selection() {
        let mut filters = FilterPanel::default();
        for ch in "50".chars() {
            assert!(filters.push_digit(ch));
        }
        filters.move_cursor(1);
        for ch in "1200".chars() {
            assert!(filters.push_digit(ch));
        }
        filters.move_cursor(1); // New
        assert!(filters.toggle_current());
        filters.move_cursor(2); // Good
        assert!(filters.toggle_current());
        filters.move_cursor(2); // Distance
        assert_eq!(filters.current(), FilterControl::Distance);
        assert!(filters.cycle_distance(2));
        filters.move_cursor(1); // Today
        assert!(filters.toggle_current());

        assert_eq!(
            filters.selection(),
            FilterSelection {
                min_price: Some(50),
                max_price: Some(1200),
                condition: vec!["New", "Good"],
                distance: "25 miles",
                posted: vec!["Today"],
            }
        );
    }

    #[test]
    fn filter_toggle_ignores_price_fields() {
        let mut filters = FilterPanel::default();
        assert!(!filters.toggle_current());
        assert!(!filters.cycle_distance(1));
    }

    #[test]
    fn filter_backspace_edits_the_focused_price() {
        let mut filters = FilterPanel::default();
        assert!(filters.push_digit('9'));
        assert!(filters.backspace());
        assert!(!filters.backspace());
        assert_eq!(filters.selection().min_price, None);
    }

    #[test]
    fn filter_cursor_clamps() {
        let mut filters = FilterPanel::default();
        filters.move_cursor(-3);
        assert_eq!(filters.current(), FilterControl::MinPrice);
        filters.move_cursor(100);
        assert_eq!(
            filters.current(),
            FilterControl::Posted(POSTED_LABELS.len() - 1)
        );
    }

    #[test]
    fn results_cursor_follows_the_list() {
        let mut state = UiState::default();
        state.move_results_cursor(1);
        assert_eq!(state.results_cursor, 0);

        let snapshot = CatalogSnapshot::builtin().expect("builtin catalog parses");
        let jobs = snapshot.listings_in(Category::Jobs).to_vec();
        state.set_results(jobs, "Browse Jobs".to_string());
        state.move_results_cursor(10);
        assert_eq!(state.results_cursor, 2);
        assert_eq!(state.current_listing().map(|listing| listing.id), Some(9));
        state.move_results_to(0);
        assert_eq!(state.current_listing().map(|listing| listing.id), Some(7));
    }
}
