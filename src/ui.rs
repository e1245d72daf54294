use crate::adjacency::{self, TileLinks};
use crate::brush::Brush;
use crate::color::{palette_color, same_color, Rgb, DEFAULT_COLORS};
use crate::grid::{
    format_day, row_col, tile_range, tile_range_label, GRID_COLUMNS, TILE_MINUTES, TOTAL_TILES,
};
use crate::model::{
    Setting, State, Tile, NO_ACTIVITY_LABEL, TODAY_LABEL, UNGROUPED_LABEL, UNSET_ACTIVITY_LABEL,
};
use crate::rollover::{self, Rollover, RolloverWatch};
use crate::storage::{save_state, StateLocation};
use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Instant;
use tracing::{debug, info};

const GRID_ROWS: usize = TOTAL_TILES / GRID_COLUMNS;
const PAST_DIM_RATIO: f64 = 0.55;

pub fn run(state: State, location: StateLocation) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(state, location);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    state: State,
    location: StateLocation,
    watch: RolloverWatch,
    /// Keyboard stand-in for the mouse pointer.
    cursor: usize,
    painting: bool,
    focus: Focus,
    panel_idx: usize,
    next_color: usize,
    last_save: Instant,
    status: String,
    mode: Mode,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Grid,
    Panel,
}

enum Mode {
    Normal,
    Comment(FieldValue),
    Import(FieldValue),
    Rename { target: PanelRow, field: FieldValue },
    ConfirmDelete(PanelRow),
}

/// One line of the activity panel.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PanelRow {
    Group(Option<String>),
    Activity(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileTime {
    Past,
    Current,
    Future,
}

#[derive(Debug, PartialEq, Eq)]
enum FieldOutcome {
    Editing,
    Cancel,
    Submit,
}

struct Theme {
    background: Rgb,
    empty_tile: Rgb,
    text: Color,
    muted: Color,
    accent: Color,
}

impl Theme {
    fn new(dark: bool) -> Self {
        if dark {
            Theme {
                background: Rgb::new(16, 18, 24),
                empty_tile: Rgb::new(0x33, 0x41, 0x55),
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::LightCyan,
            }
        } else {
            Theme {
                background: Rgb::new(0xf8, 0xfa, 0xfc),
                empty_tile: Rgb::new(0xe2, 0xe8, 0xf0),
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
            }
        }
    }
}

struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn move_up(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx == 0 {
            return;
        }
        self.cursor = index_at_col(&self.value, line_starts[line_idx - 1], col);
    }

    fn move_down(&mut self) {
        let (line_starts, line_idx, col) = line_state(&self.value, self.cursor);
        if line_idx + 1 >= line_starts.len() {
            return;
        }
        self.cursor = index_at_col(&self.value, line_starts[line_idx + 1], col);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(mut state: State, location: StateLocation) -> Self {
        let watch = RolloverWatch::new(Local::now().naive_local());
        state.ensure_today(watch.today());
        let status = format!(
            "Loaded {} state from {}",
            location.scope.label(),
            location.path.display()
        );
        let cursor = state.selected_tile.unwrap_or_else(|| watch.current_tile());
        let next_color = state.activities.len() + state.groups.len();
        App {
            state,
            location,
            watch,
            cursor,
            painting: false,
            focus: Focus::Grid,
            panel_idx: 0,
            next_color,
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            let timeout = rollover::until_next_tile(Local::now().time());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key)? {
                        break;
                    }
                }
            }
            self.tick()?;
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        match self.watch.observe(Local::now().naive_local()) {
            Rollover::None => Ok(()),
            Rollover::Tile => {
                self.state.ensure_today(self.watch.today());
                Ok(())
            }
            Rollover::Day => {
                let today = self.watch.today().to_string();
                self.state.ensure_today(&today);
                self.persist(format!("New day: {}", format_day(&today)))
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Comment(_) | Mode::Import(_) | Mode::Rename { .. } => self.handle_field_key(key),
            Mode::ConfirmDelete(_) => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Grid => Focus::Panel,
                    Focus::Panel => Focus::Grid,
                };
            }
            KeyCode::Esc if self.painting => {
                self.painting = false;
                self.status = "Paint mode off".into();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let slot = c as usize - '1' as usize;
                self.pick_activity_brush(slot)?;
            }
            KeyCode::Char('e') => {
                self.state.select_erase_brush();
                let message = format!("Brush: {}", self.brush_label());
                self.persist(message)?;
            }
            KeyCode::Char('c') => {
                if self.state.select_copy_brush_from_selection() {
                    let message = format!("Brush: {}", self.brush_label());
                    self.persist(message)?;
                } else {
                    self.status = "Select a painted tile to copy".into();
                }
            }
            KeyCode::Char('x') => {
                if self.state.clear_selected_tile() {
                    self.persist("Tile cleared")?;
                } else {
                    self.status = "No tile selected".into();
                }
            }
            KeyCode::Char('#') => match self.state.selected_tile() {
                Some((_, tile)) => {
                    self.mode = Mode::Comment(FieldValue::new(&tile.comment));
                    self.status = "Editing comment (Enter save, Esc cancel)".into();
                }
                None => self.status = "No tile selected".into(),
            },
            KeyCode::Char('i') => {
                self.mode = Mode::Import(FieldValue::new(""));
                self.status = "Import meetings (Ctrl+S save, Esc cancel)".into();
            }
            KeyCode::Char('[') => self.shift_day(true)?,
            KeyCode::Char(']') => self.shift_day(false)?,
            KeyCode::Char('p') => self.toggle_painting()?,
            KeyCode::Char('a') => self.add_activity()?,
            KeyCode::Char('g') => self.add_group()?,
            KeyCode::Char('r') => self.start_rename(),
            KeyCode::Char('C') => self.recolor_highlighted()?,
            KeyCode::Char('D') => match self.highlighted_row() {
                Some(row) if row != PanelRow::Group(None) => {
                    self.status = format!(
                        "Delete {}? (y to confirm, n/Esc to cancel)",
                        self.row_name(&row)
                    );
                    self.mode = Mode::ConfirmDelete(row);
                }
                _ => self.status = "Nothing to delete here".into(),
            },
            KeyCode::Char('K') => self.reorder(true)?,
            KeyCode::Char('J') => self.reorder(false)?,
            KeyCode::Char('<') => self.move_to_neighbour_group(true)?,
            KeyCode::Char('>') => self.move_to_neighbour_group(false)?,
            KeyCode::Char('t') => self.toggle_setting(Setting::TimeLabels)?,
            KeyCode::Char('d') => self.toggle_setting(Setting::DarkMode)?,
            KeyCode::Char('n') => self.toggle_setting(Setting::ActivityLabels)?,
            KeyCode::Char('o') => self.toggle_setting(Setting::ConnectTiles)?,
            KeyCode::Char('m') => self.toggle_setting(Setting::DimPastTiles)?,
            _ => match self.focus {
                Focus::Grid => self.handle_grid_key(key)?,
                Focus::Panel => self.handle_panel_key(key)?,
            },
        }
        Ok(false)
    }

    fn handle_grid_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.state.click_tile(self.cursor) {
                    let message = format!("Selected {}", tile_range_label(self.cursor));
                    self.persist(message)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) -> Result<()> {
        let rows = panel_rows(&self.state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.panel_idx = self.panel_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.panel_idx + 1 < rows.len() {
                    self.panel_idx += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(PanelRow::Activity(id)) = rows.get(self.panel_idx) {
                    if self.state.select_activity_brush(id) {
                        let message = format!("Brush: {}", self.brush_label());
                        self.persist(message)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_field_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let outcome = match &mut mode {
            Mode::Comment(field) | Mode::Rename { field, .. } => edit_field(field, key, false),
            Mode::Import(field) => edit_field(field, key, true),
            Mode::Normal | Mode::ConfirmDelete(_) => FieldOutcome::Cancel,
        };
        match outcome {
            FieldOutcome::Editing => self.mode = mode,
            FieldOutcome::Cancel => self.status = "Canceled".into(),
            FieldOutcome::Submit => self.submit(mode)?,
        }
        Ok(false)
    }

    fn submit(&mut self, mode: Mode) -> Result<()> {
        match mode {
            Mode::Comment(field) => {
                if self.state.set_selected_comment(&field.value) {
                    self.persist("Comment saved")?;
                } else {
                    self.status = "No tile selected".into();
                }
            }
            Mode::Import(field) => {
                let summary = self.state.import_meetings(&field.value);
                if summary.matched == 0 {
                    self.status = format!("Nothing imported ({} lines skipped)", summary.skipped);
                } else {
                    self.persist(format!(
                        "Imported {} meetings ({} tiles, {} lines skipped)",
                        summary.matched, summary.tiles_written, summary.skipped
                    ))?;
                }
            }
            Mode::Rename { target, field } => {
                let name = field.value.trim();
                if name.is_empty() {
                    self.status = "Name cannot be empty".into();
                    return Ok(());
                }
                let renamed = match &target {
                    PanelRow::Activity(id) => {
                        self.state.update_activity(id, |a| a.name = name.to_string())
                    }
                    PanelRow::Group(Some(id)) => {
                        self.state.update_group(id, |g| g.name = name.to_string())
                    }
                    PanelRow::Group(None) => false,
                };
                if renamed {
                    self.persist(format!("Renamed to {}", name))?;
                }
            }
            Mode::Normal | Mode::ConfirmDelete(_) => {}
        }
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let target = match &self.mode {
            Mode::ConfirmDelete(target) => target.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                let name = self.row_name(&target);
                let deleted = match &target {
                    PanelRow::Activity(id) => self.state.delete_activity(id),
                    PanelRow::Group(Some(id)) => self.state.delete_group(id),
                    PanelRow::Group(None) => false,
                };
                if deleted {
                    self.persist(format!("Deleted {}", name))?;
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Delete canceled".into();
            }
            _ => {}
        }
        Ok(false)
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) -> Result<()> {
        let (row, col) = row_col(self.cursor);
        let row = row.saturating_add_signed(d_row).min(GRID_ROWS - 1);
        let col = col.saturating_add_signed(d_col).min(GRID_COLUMNS - 1);
        let next = row * GRID_COLUMNS + col;
        if next == self.cursor {
            return Ok(());
        }
        self.cursor = next;
        if self.painting && self.state.apply_brush(next) {
            let message = format!("Painted {}", tile_range_label(next));
            self.persist(message)?;
        }
        Ok(())
    }

    /// Paint mode is the keyboard version of holding the mouse button down.
    fn toggle_painting(&mut self) -> Result<()> {
        if self.painting {
            self.painting = false;
            self.status = "Paint mode off".into();
            return Ok(());
        }
        if !self.state.is_brush_active() {
            self.status = "Pick a brush before painting".into();
            return Ok(());
        }
        self.painting = true;
        self.state.click_tile(self.cursor);
        self.persist("Paint mode on (move to paint, p/Esc to stop)")
    }

    fn pick_activity_brush(&mut self, slot: usize) -> Result<()> {
        let ids = brush_order(&self.state);
        let Some(id) = ids.get(slot) else {
            self.status = format!("No activity on key {}", slot + 1);
            return Ok(());
        };
        if self.state.select_activity_brush(id) {
            let message = format!("Brush: {}", self.brush_label());
            self.persist(message)?;
        }
        Ok(())
    }

    fn shift_day(&mut self, older: bool) -> Result<()> {
        let days: Vec<String> = self
            .state
            .listed_days(self.watch.today())
            .into_iter()
            .map(str::to_string)
            .collect();
        let pos = days.iter().position(|key| *key == self.state.selected_day);
        let target = match pos {
            Some(pos) if older => days.get(pos + 1),
            Some(pos) => pos.checked_sub(1).and_then(|pos| days.get(pos)),
            None => days.first(),
        };
        match target {
            Some(key) => {
                let key = key.clone();
                self.state.select_day(&key);
                let message = format!("Showing {}", self.day_label(&key));
                self.persist(message)?;
            }
            None if older => self.status = "No older days".into(),
            None => self.status = "Already at the newest day".into(),
        }
        Ok(())
    }

    fn add_activity(&mut self) -> Result<()> {
        let group_id = self.highlighted_row().and_then(|row| self.row_group(&row));
        let group_color = group_id
            .as_deref()
            .and_then(|id| self.state.group(id))
            .map(|g| g.color.clone());
        let color = match group_color {
            Some(color) => color,
            None => self.take_palette_color(),
        };
        let id = self.state.create_activity(group_id, Some(&color));
        self.follow(&PanelRow::Activity(id.clone()));
        self.persist("Activity added")?;
        self.start_rename();
        Ok(())
    }

    fn add_group(&mut self) -> Result<()> {
        let color = self.take_palette_color();
        let id = self.state.add_group(None, &color);
        self.follow(&PanelRow::Group(Some(id)));
        self.persist("Group added")?;
        self.start_rename();
        Ok(())
    }

    fn take_palette_color(&mut self) -> String {
        let color = palette_color(self.next_color);
        self.next_color += 1;
        color.to_string()
    }

    fn start_rename(&mut self) {
        let Some(row) = self.highlighted_row() else {
            return;
        };
        let current = match &row {
            PanelRow::Activity(id) => self.state.activity(id).map(|a| a.name.clone()),
            PanelRow::Group(Some(id)) => self.state.group(id).map(|g| g.name.clone()),
            PanelRow::Group(None) => None,
        };
        match current {
            Some(name) => {
                self.mode = Mode::Rename {
                    target: row,
                    field: FieldValue::new(&name),
                };
                self.status = "Renaming (Enter save, Esc cancel)".into();
            }
            None => self.status = "Nothing to rename here".into(),
        }
    }

    /// Steps the highlighted activity or group to the next palette color.
    fn recolor_highlighted(&mut self) -> Result<()> {
        let Some(row) = self.highlighted_row() else {
            return Ok(());
        };
        let current = match &row {
            PanelRow::Activity(id) => self.state.activity(id).map(|a| a.color.clone()),
            PanelRow::Group(Some(id)) => self.state.group(id).map(|g| g.color.clone()),
            PanelRow::Group(None) => None,
        };
        let Some(current) = current else {
            self.status = "Nothing to recolor here".into();
            return Ok(());
        };
        let next = DEFAULT_COLORS
            .iter()
            .position(|c| same_color(c, &current))
            .map_or(0, |idx| idx + 1);
        let color = palette_color(next).to_string();
        let changed = match &row {
            PanelRow::Activity(id) => self.state.update_activity(id, |a| a.color = color.clone()),
            PanelRow::Group(Some(id)) => self.state.update_group(id, |g| g.color = color.clone()),
            PanelRow::Group(None) => false,
        };
        if changed {
            self.persist(format!("Color {}", color))?;
        }
        Ok(())
    }

    /// Swaps the highlighted activity with its neighbour inside the same group.
    fn reorder(&mut self, up: bool) -> Result<()> {
        let Some(PanelRow::Activity(id)) = self.highlighted_row() else {
            self.status = "Highlight an activity to reorder".into();
            return Ok(());
        };
        let group = self.state.activity(&id).and_then(|a| a.group_id.clone());
        let siblings: Vec<String> = self
            .state
            .activities_in(group.as_deref())
            .map(|a| a.id.clone())
            .collect();
        let Some(pos) = siblings.iter().position(|s| *s == id) else {
            return Ok(());
        };
        let target = if up {
            pos.checked_sub(1).and_then(|p| siblings.get(p))
        } else {
            siblings.get(pos + 1)
        };
        let Some(target) = target else {
            return Ok(());
        };
        if self
            .state
            .move_activity(&id, group.as_deref(), Some(target.as_str()), up)
        {
            self.follow(&PanelRow::Activity(id));
            self.persist("Reordered")?;
        }
        Ok(())
    }

    fn move_to_neighbour_group(&mut self, previous: bool) -> Result<()> {
        let Some(PanelRow::Activity(id)) = self.highlighted_row() else {
            self.status = "Highlight an activity to move".into();
            return Ok(());
        };
        let buckets: Vec<Option<String>> = std::iter::once(None)
            .chain(self.state.groups.iter().map(|g| Some(g.id.clone())))
            .collect();
        let current = self.state.activity(&id).and_then(|a| a.group_id.clone());
        let Some(pos) = buckets.iter().position(|b| *b == current) else {
            return Ok(());
        };
        let target = if previous {
            pos.checked_sub(1).and_then(|p| buckets.get(p))
        } else {
            buckets.get(pos + 1)
        };
        let Some(target) = target.cloned() else {
            return Ok(());
        };
        if self.state.move_activity(&id, target.as_deref(), None, false) {
            let label = self.row_name(&PanelRow::Group(target));
            self.follow(&PanelRow::Activity(id));
            self.persist(format!("Moved to {}", label))?;
        }
        Ok(())
    }

    fn toggle_setting(&mut self, setting: Setting) -> Result<()> {
        let value = self.state.settings.toggle(setting);
        self.persist(format!("{}: {}", setting.label(), if value { "on" } else { "off" }))
    }

    fn highlighted_row(&self) -> Option<PanelRow> {
        panel_rows(&self.state).get(self.panel_idx).cloned()
    }

    fn follow(&mut self, row: &PanelRow) {
        if let Some(idx) = panel_rows(&self.state).iter().position(|r| r == row) {
            self.panel_idx = idx;
        }
    }

    fn row_group(&self, row: &PanelRow) -> Option<String> {
        match row {
            PanelRow::Group(group) => group.clone(),
            PanelRow::Activity(id) => self.state.activity(id).and_then(|a| a.group_id.clone()),
        }
    }

    fn row_name(&self, row: &PanelRow) -> String {
        match row {
            PanelRow::Group(None) => UNGROUPED_LABEL.to_string(),
            PanelRow::Group(Some(id)) => self
                .state
                .group(id)
                .map_or_else(|| id.clone(), |g| g.name.clone()),
            PanelRow::Activity(id) => self
                .state
                .activity(id)
                .map_or_else(|| id.clone(), |a| a.name.clone()),
        }
    }

    fn activity_name(&self, id: Option<&str>) -> String {
        id.and_then(|id| self.state.activity(id))
            .map_or_else(|| NO_ACTIVITY_LABEL.to_string(), |a| a.name.clone())
    }

    fn brush_label(&self) -> String {
        match &self.state.selected_brush {
            None => "none".into(),
            Some(Brush::Erase) => "erase".into(),
            Some(Brush::Activity { activity_id }) => self.activity_name(activity_id.as_deref()),
            Some(Brush::Copy {
                activity_id,
                comment,
            }) => format!("copy {} \"{}\"", self.activity_name(activity_id.as_deref()), comment),
        }
    }

    fn day_label(&self, key: &str) -> String {
        if key == self.watch.today() {
            TODAY_LABEL.to_string()
        } else {
            format_day(key)
        }
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let theme = Theme::new(self.state.settings.dark_mode);
        let area = f.size();
        f.render_widget(
            Block::default().style(Style::default().bg(to_color(theme.background)).fg(theme.text)),
            area,
        );
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(4),
            ])
            .split(area);
        self.draw_header(f, layout[0], &theme);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(36)])
            .split(layout[1]);
        self.draw_grid(f, body[0], &theme);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Min(6),
                Constraint::Length(10),
            ])
            .split(body[1]);
        self.draw_days(f, side[0], &theme);
        self.draw_activities(f, side[1], &theme);
        self.draw_selection(f, side[2], &theme);
        self.draw_footer(f, layout[2], &theme);

        match &self.mode {
            Mode::Normal => {}
            Mode::Comment(field) => {
                let hint = "Enter to save • Esc to cancel";
                self.draw_field_dialog(f, "Comment", field, hint, false)
            }
            Mode::Import(field) => self.draw_field_dialog(
                f,
                "Import meetings",
                field,
                "One `HH:MM-HH:MM Title` per line • Ctrl+S to import • Esc to cancel",
                true,
            ),
            Mode::Rename { target, field } => {
                let title = format!("Rename {}", self.row_name(target));
                self.draw_field_dialog(f, &title, field, "Enter to save • Esc to cancel", false)
            }
            Mode::ConfirmDelete(target) => self.draw_confirm(f, target),
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect, theme: &Theme) {
        let mut title = vec![
            Span::styled(
                "daytiles",
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                self.day_label(&self.state.selected_day),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   brush: "),
            Span::styled(self.brush_label(), Style::default().fg(Color::LightMagenta)),
        ];
        if self.painting {
            title.push(Span::styled(
                "  [painting]",
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            ));
        }
        let meta = Line::from(Span::styled(
            format!(
                "{} {} • saved {}",
                self.location.scope.label(),
                self.location.path.display(),
                format_elapsed(self.last_save)
            ),
            Style::default().fg(theme.muted),
        ));
        let header = Paragraph::new(vec![Line::from(title), meta]).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.muted)),
        );
        f.render_widget(header, area);
    }

    fn draw_grid(&self, f: &mut ratatui::Frame<'_>, area: Rect, theme: &Theme) {
        let block = pane(
            format!("{} ({})", format_day(&self.state.selected_day), self.state.selected_day),
            self.focus == Focus::Grid,
            theme,
        );
        let inner = block.inner(area);
        f.render_widget(block, area);

        let Some(day) = self.state.selected_day() else {
            f.render_widget(Paragraph::new("No tiles for this day"), inner);
            return;
        };
        let cell_w = inner.width / GRID_COLUMNS as u16;
        let cell_h = inner.height / GRID_ROWS as u16;
        if cell_w < 3 || cell_h == 0 {
            f.render_widget(
                Paragraph::new("Window too small for the grid").wrap(Wrap { trim: true }),
                inner,
            );
            return;
        }
        let body_w = cell_w - 1;
        let body_h = if cell_h >= 2 { cell_h - 1 } else { cell_h };
        let settings = self.state.settings;
        let links = adjacency::resolve(day.tiles(), &self.state.activities, settings.connect_tiles);

        for (index, tile) in day.tiles().iter().enumerate() {
            let (row, col) = row_col(index);
            let x = inner.x + col as u16 * cell_w;
            let y = inner.y + row as u16 * cell_h;
            let link = links.get(index).copied().unwrap_or_default();
            let time = classify_tile(
                &self.state.selected_day,
                index,
                self.watch.today(),
                self.watch.current_tile(),
            );
            let fill = self.tile_fill(tile, time, theme);

            let body = Rect::new(x, y, body_w, body_h);
            let lines = self.tile_lines(index, tile, &link, time, body_w as usize, body_h);
            f.render_widget(
                Paragraph::new(lines).style(self.tile_style(index, fill, time)),
                body,
            );

            let join = to_color(link.join_color.unwrap_or(fill));
            if col + 1 < GRID_COLUMNS {
                let gap = Rect::new(x + body_w, y, 1, body_h);
                if link.joined_right {
                    f.render_widget(Block::default().style(Style::default().bg(join)), gap);
                } else if link.connected_right {
                    let seam = vec![Line::from("┊"); body_h as usize];
                    let style = Style::default().fg(to_color(fill));
                    f.render_widget(Paragraph::new(seam).style(style), gap);
                }
            }
            if cell_h >= 2 && row + 1 < GRID_ROWS {
                let gap = Rect::new(x, y + body_h, body_w, 1);
                if link.joined_down {
                    f.render_widget(Block::default().style(Style::default().bg(join)), gap);
                } else if link.connected_down {
                    let seam = "┄".repeat(body_w as usize);
                    let style = Style::default().fg(to_color(fill));
                    f.render_widget(Paragraph::new(seam).style(style), gap);
                }
                let square = link.joined_right
                    && link.joined_down
                    && links.get(index + 1).is_some_and(|next| next.joined_down);
                if square {
                    let corner = Rect::new(x + body_w, y + body_h, 1, 1);
                    f.render_widget(Block::default().style(Style::default().bg(join)), corner);
                }
            }
        }
    }

    fn tile_fill(&self, tile: &Tile, time: TileTime, theme: &Theme) -> Rgb {
        let base = tile
            .activity_id
            .as_deref()
            .and_then(|id| self.state.activity(id))
            .map_or(theme.empty_tile, |a| Rgb::parse_or_fallback(&a.color));
        if time == TileTime::Past && self.state.settings.dim_past_tiles {
            base.mix(theme.background, PAST_DIM_RATIO)
        } else {
            base
        }
    }

    fn tile_style(&self, index: usize, fill: Rgb, time: TileTime) -> Style {
        let fg = if fill.is_light() { Color::Black } else { Color::White };
        let mut style = Style::default().bg(to_color(fill)).fg(fg);
        if time == TileTime::Current {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.state.selected_tile == Some(index) {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if self.focus == Focus::Grid && index == self.cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    fn tile_lines(
        &self,
        index: usize,
        tile: &Tile,
        link: &TileLinks,
        time: TileTime,
        width: usize,
        height: u16,
    ) -> Vec<Line<'static>> {
        let settings = self.state.settings;
        let mut head = String::new();
        if time == TileTime::Current {
            head.push('•');
        }
        if self.state.selected_tile == Some(index) {
            head.push('▸');
        }
        if settings.show_time_labels {
            head.push_str(&tile_range(index).0);
        }
        if !tile.comment.is_empty() {
            head.push('*');
        }
        if self.state.is_copying(tile) {
            head.push('⧉');
        }

        // Label only the first tile of a run so long blocks stay readable.
        let label = tile
            .activity_id
            .as_deref()
            .and_then(|id| self.state.activity(id))
            .filter(|_| settings.show_activity_labels && !link.connected_left && !link.connected_up)
            .map(|a| truncate_text(&a.name, width));

        let mut lines = vec![Line::from(truncate_text(&head, width))];
        match label {
            Some(label) if height >= 2 => lines.push(Line::from(label)),
            Some(label) if head.is_empty() => lines[0] = Line::from(label),
            _ => {}
        }
        lines
    }

    fn draw_days(&self, f: &mut ratatui::Frame<'_>, area: Rect, theme: &Theme) {
        let keys = self.state.listed_days(self.watch.today());
        let items: Vec<ListItem> = keys
            .iter()
            .map(|key| {
                let painted = self.state.days.get(*key).map_or(0, |day| {
                    day.tiles().iter().filter(|t| t.activity_id.is_some()).count()
                });
                let minutes = painted as u32 * TILE_MINUTES;
                ListItem::new(Line::from(vec![
                    Span::raw(self.day_label(key)),
                    Span::styled(
                        format!("  {}h{:02}", minutes / 60, minutes % 60),
                        Style::default().fg(theme.muted),
                    ),
                ]))
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(keys.iter().position(|key| *key == self.state.selected_day));
        let list = List::new(items)
            .block(pane("Days [ ]".to_string(), false, theme))
            .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
        f.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_activities(&self, f: &mut ratatui::Frame<'_>, area: Rect, theme: &Theme) {
        let rows = panel_rows(&self.state);
        let order = brush_order(&self.state);
        let active = match &self.state.selected_brush {
            Some(Brush::Activity { activity_id }) => activity_id.as_deref(),
            _ => None,
        };
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match row {
                PanelRow::Group(None) => ListItem::new(Line::from(Span::styled(
                    UNGROUPED_LABEL,
                    Style::default().fg(theme.muted).add_modifier(Modifier::BOLD),
                ))),
                PanelRow::Group(Some(id)) => {
                    let (name, color) = self
                        .state
                        .group(id)
                        .map_or((id.clone(), theme.empty_tile), |g| {
                            (g.name.clone(), Rgb::parse_or_fallback(&g.color))
                        });
                    ListItem::new(Line::from(vec![
                        Span::styled("■ ", Style::default().fg(to_color(color))),
                        Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                    ]))
                }
                PanelRow::Activity(id) => {
                    let key = order
                        .iter()
                        .position(|o| o == id)
                        .filter(|pos| *pos < 9)
                        .map_or_else(|| "  ".to_string(), |pos| format!("{} ", pos + 1));
                    let (name, color) = self
                        .state
                        .activity(id)
                        .map_or((id.clone(), theme.empty_tile), |a| {
                            (a.name.clone(), Rgb::parse_or_fallback(&a.color))
                        });
                    let mut name_style = Style::default();
                    let mut spans = vec![
                        Span::styled(format!("  {}", key), Style::default().fg(theme.muted)),
                        Span::styled("● ", Style::default().fg(to_color(color))),
                    ];
                    if active == Some(id.as_str()) {
                        name_style = name_style.add_modifier(Modifier::BOLD);
                    }
                    spans.push(Span::styled(name, name_style));
                    if active == Some(id.as_str()) {
                        spans.push(Span::styled(" ◆", Style::default().fg(Color::LightMagenta)));
                    }
                    ListItem::new(Line::from(spans))
                }
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(Some(self.panel_idx.min(rows.len().saturating_sub(1))));
        let highlight = if self.focus == Focus::Panel {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::UNDERLINED)
        };
        let list = List::new(items)
            .block(pane("Activities".to_string(), self.focus == Focus::Panel, theme))
            .highlight_style(highlight);
        f.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_selection(&self, f: &mut ratatui::Frame<'_>, area: Rect, theme: &Theme) {
        let muted = Style::default().fg(theme.muted);
        let mut lines = Vec::new();
        match self.state.selected_tile() {
            Some((index, tile)) => {
                lines.push(Line::from(Span::styled(
                    tile_range_label(index),
                    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                )));
                let activity = tile
                    .activity_id
                    .as_deref()
                    .and_then(|id| self.state.activity(id))
                    .map_or(UNSET_ACTIVITY_LABEL, |a| a.name.as_str());
                lines.push(Line::from(format!("Activity: {}", activity)));
                if tile.comment.is_empty() {
                    lines.push(Line::from(Span::styled("No comment (# to add)", muted)));
                } else {
                    lines.push(Line::from(format!("Comment: {}", tile.comment)));
                }
                if self.state.is_copying(tile) {
                    lines.push(Line::from(Span::styled(
                        "Copy brush holds this tile",
                        Style::default().fg(Color::LightMagenta),
                    )));
                }
            }
            None => lines.push(Line::from(Span::styled("Space/Enter selects a tile", muted))),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Under cursor", muted)));
        lines.extend(
            tooltip_lines(&self.state, self.cursor)
                .into_iter()
                .map(Line::from),
        );
        let panel = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(pane("Selected".to_string(), false, theme));
        f.render_widget(panel, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(theme.muted)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(theme.muted));
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
        let mut spans = vec![key("Tab", Color::LightCyan), Span::raw(" focus  ")];
        match self.focus {
            Focus::Grid => spans.extend([
                key("←↑↓→/hjkl", Color::LightCyan),
                Span::raw(" move  "),
                key("Space", Color::LightGreen),
                Span::raw(" click  "),
                key("p", Color::LightGreen),
                Span::raw(" paint  "),
                key("1-9 e c", Color::LightMagenta),
                Span::raw(" brush  "),
                key("x", Color::LightRed),
                Span::raw(" clear  "),
                key("#", Color::LightYellow),
                Span::raw(" comment  "),
                key("i", Color::LightYellow),
                Span::raw(" import  "),
            ]),
            Focus::Panel => spans.extend([
                key("↑↓", Color::LightCyan),
                Span::raw(" browse  "),
                key("Enter", Color::LightGreen),
                Span::raw(" brush  "),
                key("a g", Color::LightMagenta),
                Span::raw(" add  "),
                key("r C", Color::LightYellow),
                Span::raw(" rename/color  "),
                key("J K < >", Color::LightCyan),
                Span::raw(" move  "),
                key("D", Color::LightRed),
                Span::raw(" delete  "),
            ]),
        }
        spans.extend([
            key("[ ]", Color::LightCyan),
            Span::raw(" day  "),
            key("t d n o m", Color::Gray),
            Span::raw(" view  "),
            key("q", Color::LightRed),
            Span::raw(" quit"),
        ]);
        Line::from(spans)
    }

    fn draw_field_dialog(
        &self,
        f: &mut ratatui::Frame<'_>,
        title: &str,
        field: &FieldValue,
        hint: &str,
        tall: bool,
    ) {
        let area = centered_rect(60, if tall { 60 } else { 25 }, f.size());
        let mut lines = field_lines(field);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, target: &PanelRow) {
        let area = centered_rect(50, 30, f.size());
        let consequence = match target {
            PanelRow::Activity(_) => "Its tiles are cleared on every day.",
            PanelRow::Group(_) => "Its activities become ungrouped.",
        };
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", self.row_name(target)),
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            )),
            Line::from(consequence),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn persist(&mut self, message: impl Into<String>) -> Result<()> {
        save_state(&self.location, &self.state)?;
        self.last_save = Instant::now();
        self.status = message.into();
        let rows = panel_rows(&self.state).len();
        self.panel_idx = self.panel_idx.min(rows.saturating_sub(1));
        debug!(status = %self.status, "persisted after ui action");
        Ok(())
    }
}

/// Ungrouped activities first, then every group followed by its members.
fn panel_rows(state: &State) -> Vec<PanelRow> {
    let mut rows = vec![PanelRow::Group(None)];
    rows.extend(state.activities_in(None).map(|a| PanelRow::Activity(a.id.clone())));
    for group in &state.groups {
        rows.push(PanelRow::Group(Some(group.id.clone())));
        rows.extend(
            state
                .activities_in(Some(group.id.as_str()))
                .map(|a| PanelRow::Activity(a.id.clone())),
        );
    }
    rows
}

/// Activity ids in panel order; the first nine get number keys.
fn brush_order(state: &State) -> Vec<String> {
    panel_rows(state)
        .into_iter()
        .filter_map(|row| match row {
            PanelRow::Activity(id) => Some(id),
            PanelRow::Group(_) => None,
        })
        .collect()
}

/// Only today has a past and a present; every tile of another day counts as future.
fn classify_tile(day: &str, index: usize, today: &str, current: usize) -> TileTime {
    if day != today {
        return TileTime::Future;
    }
    match index.cmp(&current) {
        std::cmp::Ordering::Less => TileTime::Past,
        std::cmp::Ordering::Equal => TileTime::Current,
        std::cmp::Ordering::Greater => TileTime::Future,
    }
}

fn tooltip_lines(state: &State, index: usize) -> Vec<String> {
    let tile = state.selected_day().and_then(|day| day.tile(index));
    let name = tile
        .and_then(|t| t.activity_id.as_deref())
        .and_then(|id| state.activity(id))
        .map_or_else(|| NO_ACTIVITY_LABEL.to_string(), |a| a.name.clone());
    let mut lines = vec![tile_range_label(index), name];
    if let Some(tile) = tile.filter(|t| !t.comment.is_empty()) {
        lines.push(tile.comment.clone());
    }
    lines
}

fn edit_field(field: &mut FieldValue, key: KeyEvent, multiline: bool) -> FieldOutcome {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return FieldOutcome::Cancel,
        KeyCode::Enter if multiline && !control => field.insert_char('\n'),
        KeyCode::Enter => return FieldOutcome::Submit,
        KeyCode::Char('s') if control => return FieldOutcome::Submit,
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Up => field.move_up(),
        KeyCode::Down => field.move_down(),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            field.insert_char(c)
        }
        _ => {}
    }
    FieldOutcome::Editing
}

fn pane(title: String, focused: bool, theme: &Theme) -> Block<'static> {
    let color = if focused { theme.accent } else { theme.muted };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    info!("terminal ui started");
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn prev_char(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map_or(0, |(idx, _)| idx)
}

fn next_char(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map_or(text.len(), |ch| cursor + ch.len_utf8())
}

/// Byte offsets of every line start, the line holding `cursor` and its column in chars.
fn line_state(text: &str, cursor: usize) -> (Vec<usize>, usize, usize) {
    let mut starts = vec![0];
    starts.extend(
        text.char_indices()
            .filter(|(_, ch)| *ch == '\n')
            .map(|(idx, _)| idx + 1),
    );
    let line_idx = starts.iter().rposition(|start| *start <= cursor).unwrap_or(0);
    let col = text[starts[line_idx]..cursor].chars().count();
    (starts, line_idx, col)
}

fn index_at_col(text: &str, start: usize, target_col: usize) -> usize {
    let slice = &text[start..];
    let limit = slice.find('\n').unwrap_or(slice.len());
    slice[..limit]
        .char_indices()
        .nth(target_col)
        .map_or(start + limit, |(idx, _)| start + idx)
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 1 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

fn field_lines(field: &FieldValue) -> Vec<Line<'static>> {
    field
        .with_caret()
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Cyan))))
        .collect()
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tile;
    use crate::storage::StateScope;
    use std::path::PathBuf;
    use std::time::SystemTime;

    const DAY: &str = "2026-10-19";

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(state: State, prefix: &str) -> (App, PathBuf) {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/{}_{}", prefix, nanos));
        let location = StateLocation {
            path: dir.join("state.json"),
            scope: StateScope::Explicit,
        };
        (App::new(state, location), dir)
    }

    #[test]
    fn panel_lists_ungrouped_before_groups() {
        let mut state = State::new(DAY);
        let work = state.add_group(Some("Work"), "#ef4444");
        let meeting = state.create_activity(Some(work.clone()), None);
        let walk = state.create_activity(None, None);
        assert_eq!(
            panel_rows(&state),
            vec![
                PanelRow::Group(None),
                PanelRow::Activity(walk.clone()),
                PanelRow::Group(Some(work)),
                PanelRow::Activity(meeting.clone()),
            ]
        );
        assert_eq!(brush_order(&state), vec![walk, meeting]);
    }

    #[test]
    fn only_today_has_past_and_current_tiles() {
        assert_eq!(classify_tile(DAY, 10, DAY, 54), TileTime::Past);
        assert_eq!(classify_tile(DAY, 54, DAY, 54), TileTime::Current);
        assert_eq!(classify_tile(DAY, 80, DAY, 54), TileTime::Future);
        assert_eq!(classify_tile("2026-10-18", 10, DAY, 54), TileTime::Future);
    }

    #[test]
    fn tooltip_names_activity_and_comment() {
        let mut state = State::new(DAY);
        let id = state.create_activity(None, None);
        state.update_activity(&id, |a| a.name = "Код".into());
        *state.selected_day_mut().tile_mut(54).unwrap() = Tile::painted(&id, "ревью");

        assert_eq!(tooltip_lines(&state, 54), vec!["09:00-09:10", "Код", "ревью"]);
        assert_eq!(tooltip_lines(&state, 0), vec!["00:00-00:10", NO_ACTIVITY_LABEL]);
    }

    #[test]
    fn field_editing_handles_multibyte_text() {
        let mut field = FieldValue::new("день");
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "деь");
        field.insert_char('н');
        assert_eq!(field.value, "день");
        assert_eq!(field.with_caret(), "ден▌ь");
    }

    #[test]
    fn multiline_field_moves_between_lines() {
        let mut field = FieldValue::new("09:00-09:30 A\n10:00");
        field.move_up();
        assert_eq!(field.cursor, 5);
        field.move_down();
        assert_eq!(field.cursor, field.value.len());
    }

    #[test]
    fn enter_submits_single_line_but_breaks_multiline() {
        let mut field = FieldValue::new("");
        assert_eq!(edit_field(&mut field, press(KeyCode::Char('a')), false), FieldOutcome::Editing);
        assert_eq!(edit_field(&mut field, press(KeyCode::Enter), false), FieldOutcome::Submit);
        assert_eq!(edit_field(&mut field, press(KeyCode::Enter), true), FieldOutcome::Editing);
        assert_eq!(field.value, "a\n");
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(edit_field(&mut field, save, true), FieldOutcome::Submit);
        assert_eq!(edit_field(&mut field, press(KeyCode::Esc), true), FieldOutcome::Cancel);
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_text("Встреча", 10), "Встреча");
        assert_eq!(truncate_text("Встреча", 4), "Вст…");
        assert_eq!(truncate_text("Встреча", 1), "В");
    }

    #[test]
    fn paint_mode_paints_while_the_cursor_moves() {
        let mut state = State::new(DAY);
        let id = state.create_activity(None, None);
        state.selected_tile = Some(0);
        let (mut app, dir) = app_with(state, "daytiles_ui_paint");
        app.cursor = 0;

        app.handle_key(press(KeyCode::Char('1'))).unwrap();
        assert_eq!(app.state.selected_brush, Some(Brush::activity(&id)));
        app.handle_key(press(KeyCode::Char('p'))).unwrap();
        app.handle_key(press(KeyCode::Right)).unwrap();
        app.handle_key(press(KeyCode::Right)).unwrap();
        app.handle_key(press(KeyCode::Char('p'))).unwrap();
        app.handle_key(press(KeyCode::Down)).unwrap();

        let day = app.state.selected_day().unwrap();
        let painted: Vec<usize> = (0..TOTAL_TILES)
            .filter(|i| day.tile(*i).unwrap().activity_id.is_some())
            .collect();
        assert_eq!(painted, vec![0, 1, 2]);
        assert!(dir.join("state.json").exists());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut state = State::new(DAY);
        let id = state.create_activity(None, None);
        let (mut app, dir) = app_with(state, "daytiles_ui_delete");
        app.panel_idx = 1;

        app.handle_key(press(KeyCode::Char('D'))).unwrap();
        app.handle_key(press(KeyCode::Esc)).unwrap();
        assert!(app.state.activity(&id).is_some());

        app.handle_key(press(KeyCode::Char('D'))).unwrap();
        app.handle_key(press(KeyCode::Char('y'))).unwrap();
        assert!(app.state.activity(&id).is_none());
        assert_eq!(app.panel_idx, 0);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn import_dialog_writes_meetings() {
        let (mut app, dir) = app_with(State::new(DAY), "daytiles_ui_import");
        app.handle_key(press(KeyCode::Char('i'))).unwrap();
        for ch in "09:00-09:20 Sync".chars() {
            app.handle_key(press(KeyCode::Char(ch))).unwrap();
        }
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        let meeting = app.state.meeting_activity().unwrap().id.clone();
        let tile = app.state.selected_day().unwrap().tile(55).unwrap();
        assert_eq!(tile.activity_id.as_deref(), Some(meeting.as_str()));
        assert_eq!(tile.comment, "Sync");
        std::fs::remove_dir_all(dir).ok();
    }
}
