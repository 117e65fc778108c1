use std::{io, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use escape_admin_core::{
    content::GameContent,
    models::{Channel, GameKey, GameRecord},
    session::{AdminAction, AdminState},
    snapshot::SnapshotCache,
    trigger::{TriggerConfig, TriggerPatch, DEFAULT_TRIGGER_CONFIG},
    GamesListing, PublishKey,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::client::ApiClient;

const TICK_RATE: Duration = Duration::from_millis(250);
/// `source` values that do not point at a directory.
const VIRTUAL_SOURCES: [&str; 2] = ["virtual", "fallback"];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn channel(&self, channel: Channel) -> Color {
        match channel {
            Channel::Published => self.success,
            Channel::Draft => self.warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Games,
    Missions,
    Devices,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Games => Focus::Missions,
            Focus::Missions => Focus::Devices,
            Focus::Devices => Focus::Games,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    GamesFetched(Result<GamesListing>),
    PublishFinished { key: GameKey, result: Result<()> },
}

/// Terminal console for browsing, publishing and editing games.
pub struct AdminApp {
    client: ApiClient,
    snapshots: SnapshotCache,
    state: AdminState,
    ui: UiState,
    theme: Theme,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    request_in_flight: bool,
}

impl AdminApp {
    pub fn new(client: ApiClient, snapshots: SnapshotCache) -> Self {
        Self {
            client,
            snapshots,
            state: AdminState::default(),
            ui: UiState::default(),
            theme: Theme::default(),
            event_tx: None,
            request_in_flight: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);
        self.request_games();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.ui.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                if let Err(err) = self.handle_key(key) {
                    self.state.apply(AdminAction::SetStatus(format!("Error: {err}")));
                }
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => return true,
            Some(AppEvent::GamesFetched(result)) => {
                self.request_in_flight = false;
                match result {
                    Ok(listing) => {
                        info!(
                            total = listing.games.len(),
                            dirs = listing.base_dirs.len(),
                            "Games reloaded"
                        );
                        self.state.apply(AdminAction::GamesLoaded(listing));
                    }
                    Err(err) => {
                        error!(?err, "Game list request failed");
                        self.state.apply(AdminAction::LoadFailed(format!("{err:#}")));
                    }
                }
            }
            Some(AppEvent::PublishFinished { key, result }) => {
                self.request_in_flight = false;
                match result {
                    Ok(()) => {
                        info!(%key, "Game published");
                        self.state.apply(AdminAction::Published(key));
                        self.request_games();
                    }
                    Err(err) => {
                        error!(?err, %key, "Publish failed");
                        self.state
                            .apply(AdminAction::PublishFailed(format!("{err:#}")));
                    }
                }
            }
            None => return false,
        }
        self.ensure_content_loaded();
        true
    }

    fn request_games(&mut self) {
        let Some(tx) = self.begin_request() else {
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.list_games().await;
            let _ = tx.send(AppEvent::GamesFetched(result)).await;
        });
    }

    fn request_publish(&mut self) {
        let Some(game) = self.state.current_game() else {
            return;
        };
        let key = game.key();
        let Some(tx) = self.begin_request() else {
            return;
        };
        self.state
            .apply(AdminAction::SetStatus(format!("Publishing {}...", key.slug)));
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.publish(&PublishKey::slug(key.slug.clone())).await;
            let _ = tx.send(AppEvent::PublishFinished { key, result }).await;
        });
    }

    /// One request at a time; returns the sender when a new one may start.
    fn begin_request(&mut self) -> Option<mpsc::Sender<AppEvent>> {
        if self.request_in_flight {
            self.state.apply(AdminAction::SetStatus(
                "A request is already in progress".to_string(),
            ));
            return None;
        }
        let tx = self.event_tx.clone()?;
        self.request_in_flight = true;
        Some(tx)
    }

    fn ensure_content_loaded(&mut self) {
        if self.state.content.is_some() {
            return;
        }
        let Some(game) = self.state.current_game().cloned() else {
            return;
        };
        self.ui.device_cursor = 0;
        match self.load_content(&game) {
            Ok((content, from_snapshot)) => self.state.apply(AdminAction::ContentLoaded {
                key: game.key(),
                content,
                from_snapshot,
            }),
            Err(err) => {
                error!(?err, slug = %game.slug, "Content load failed");
                self.state.apply(AdminAction::SetStatus(format!(
                    "Failed to load content for {}: {err}",
                    game.slug
                )));
            }
        }
    }

    fn load_content(&self, game: &GameRecord) -> Result<(GameContent, bool)> {
        if let Some(snapshot) = self.snapshots.get(&game.slug, game.channel)? {
            match GameContent::from_value(snapshot.data) {
                Ok(content) => return Ok((content, true)),
                Err(err) => warn!(slug = %game.slug, "Ignoring unreadable snapshot: {err}"),
            }
        }
        let content = content_dir(game)
            .map(|dir| GameContent::load(&dir))
            .unwrap_or_default();
        Ok((content, false))
    }

    fn save_snapshot(&mut self) -> Result<()> {
        let Some(loaded) = self.state.content.as_ref() else {
            return Ok(());
        };
        if let Err(err) = loaded.content.validate() {
            self.state.apply(AdminAction::SaveFailed(err.to_string()));
            return Ok(());
        }
        let key = loaded.key.clone();
        let data = serde_json::to_value(&loaded.content).context("failed to encode content")?;
        match self.snapshots.put(&key.slug, key.channel, data) {
            Ok(snapshot) => {
                info!(%key, saved_at = %snapshot.saved_at, "Snapshot saved");
                self.state.apply(AdminAction::Saved(key));
            }
            Err(err) => {
                error!(?err, %key, "Snapshot save failed");
                self.state.apply(AdminAction::SaveFailed(format!("{err:#}")));
            }
        }
        Ok(())
    }

    fn discard_snapshot(&mut self) -> Result<()> {
        let Some(game) = self.state.current_game().cloned() else {
            return Ok(());
        };
        let removed = self.snapshots.remove(&game.slug, game.channel)?;
        let (content, from_snapshot) = self.load_content(&game)?;
        self.state.apply(AdminAction::ContentLoaded {
            key: game.key(),
            content,
            from_snapshot,
        });
        let message = if removed {
            format!("Discarded local snapshot for {}", game.key())
        } else {
            format!("No local snapshot for {}", game.key())
        };
        self.state.apply(AdminAction::SetStatus(message));
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.ui.mode {
            Mode::Filter => {
                self.handle_filter_key(key);
                Ok(())
            }
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui.mode = Mode::Browse;
                self.state.apply(AdminAction::SetFilter(String::new()));
                self.state
                    .apply(AdminAction::SetStatus("Filter cleared".to_string()));
            }
            KeyCode::Enter => {
                self.ui.mode = Mode::Browse;
                let message = format!("Filter applied: {}", self.state.filter);
                self.state.apply(AdminAction::SetStatus(message));
            }
            KeyCode::Backspace => {
                let mut filter = self.state.filter.clone();
                filter.pop();
                self.state.apply(AdminAction::SetFilter(filter));
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    let mut filter = self.state.filter.clone();
                    filter.push(c);
                    self.state.apply(AdminAction::SetFilter(filter));
                }
            }
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('r') = key.code {
                self.request_games();
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => {
                if self.state.dirty && !self.ui.quit_armed {
                    self.ui.quit_armed = true;
                    self.state.apply(AdminAction::SetStatus(
                        "Unsaved trigger edits; press q again to quit".to_string(),
                    ));
                } else {
                    self.ui.should_quit = true;
                }
                return Ok(());
            }
            KeyCode::Tab => {
                self.ui.focus = self.ui.focus.next();
            }
            KeyCode::Esc => self.ui.focus = Focus::Games,
            KeyCode::Char('j') | KeyCode::Down => self.move_focused(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_focused(-1),
            KeyCode::PageDown => self.move_focused(self.ui.list_height.max(1) as isize),
            KeyCode::PageUp => self.move_focused(-(self.ui.list_height.max(1) as isize)),
            KeyCode::Char('/') => {
                self.ui.mode = Mode::Filter;
                self.state
                    .apply(AdminAction::SetStatus("Enter filter text".to_string()));
            }
            KeyCode::Char('c') => self.state.apply(AdminAction::CycleChannelFilter),
            KeyCode::Char('p') => self.request_publish(),
            KeyCode::Char('e') => self.patch_focused(|current| {
                TriggerPatch::enabled(!current.enabled)
            }),
            KeyCode::Char('a') => self.patch_focused(|current| {
                TriggerPatch::action_type(current.action_type.next())
            }),
            KeyCode::Char('s') => self.save_snapshot()?,
            KeyCode::Char('x') => self.discard_snapshot()?,
            _ => {}
        }
        self.ui.quit_armed = false;
        self.ensure_content_loaded();
        Ok(())
    }

    fn move_focused(&mut self, delta: isize) {
        match self.ui.focus {
            Focus::Games => self.state.apply(AdminAction::MoveCursor(delta)),
            Focus::Missions => {
                let index = step(self.state.mission_cursor, delta);
                self.state.apply(AdminAction::SelectMission(index));
            }
            Focus::Devices => {
                let total = self
                    .state
                    .content
                    .as_ref()
                    .map(|loaded| loaded.content.devices.len())
                    .unwrap_or(0);
                if total > 0 {
                    self.ui.device_cursor = step(self.ui.device_cursor, delta).min(total - 1);
                }
            }
        }
    }

    fn patch_focused(&mut self, build: impl Fn(&TriggerConfig) -> TriggerPatch) {
        if self.ui.focus == Focus::Games {
            self.state.apply(AdminAction::SetStatus(
                "Press Tab to focus missions or devices first".to_string(),
            ));
            return;
        }
        let Some(loaded) = self.state.content.as_ref() else {
            return;
        };
        let action = match self.ui.focus {
            Focus::Games => return,
            Focus::Missions => {
                let Some(mission) = loaded.content.missions.get(self.state.mission_cursor) else {
                    return;
                };
                AdminAction::UpdateMissionTrigger {
                    index: self.state.mission_cursor,
                    patch: build(mission.trigger.as_ref().unwrap_or(&DEFAULT_TRIGGER_CONFIG)),
                }
            }
            Focus::Devices => {
                let Some(device) = loaded.content.devices.get(self.ui.device_cursor) else {
                    return;
                };
                AdminAction::UpdateDeviceTrigger {
                    index: self.ui.device_cursor,
                    patch: build(device.trigger.as_ref().unwrap_or(&DEFAULT_TRIGGER_CONFIG)),
                }
            }
        };
        self.state.apply(action);
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(size);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        let detail_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10),
                Constraint::Min(5),
                Constraint::Length(8),
            ])
            .split(body_chunks[1]);

        self.render_game_list(frame, body_chunks[0]);
        self.render_game_info(frame, detail_chunks[0]);
        self.render_missions(frame, detail_chunks[1]);
        self.render_devices(frame, detail_chunks[2]);
        self.render_status(frame, chunks[1]);
    }

    fn focused_block(&self, title: String, focus: Focus) -> Block<'static> {
        let style = if self.ui.focus == focus {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(title)
    }

    fn render_game_list(&mut self, frame: &mut Frame, area: Rect) {
        let height = area.height.saturating_sub(2) as usize;
        self.ui.list_height = height;
        let games = self.state.visible_games();
        self.ui.offset = list_offset(self.state.cursor, self.ui.offset, height, games.len());

        let mut list_state = ListState::default();
        if !games.is_empty() {
            list_state.select(Some(self.state.cursor.saturating_sub(self.ui.offset)));
        }
        let items: Vec<ListItem> = games
            .iter()
            .enumerate()
            .skip(self.ui.offset)
            .take(height.max(1))
            .map(|(index, game)| {
                let marker = if index == self.state.cursor {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let title = Span::styled(
                    game.title.clone(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                );
                let channel = Span::styled(
                    format!(" · {}", game.channel),
                    Style::default().fg(self.theme.channel(game.channel)),
                );
                ListItem::new(Line::from(vec![marker, title, channel]))
            })
            .collect();

        let title = format!(
            "Games ({}/{} · {})",
            games.len(),
            self.state.games.len(),
            self.state.channel_filter.label()
        );
        let list = List::new(items)
            .block(self.focused_block(title, Focus::Games))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_game_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Game Details");
        let Some(game) = self.state.current_game() else {
            let paragraph = Paragraph::new("No games available").block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(
                game.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", game.channel),
                Style::default().fg(self.theme.channel(game.channel)),
            ),
        ])];
        if !game.short_description.is_empty() {
            lines.push(Line::from(Span::styled(
                game.short_description.clone(),
                Style::default().fg(self.theme.muted),
            )));
        }
        lines.push(Line::from(format!("Slug: {}", game.slug)));
        if !game.game_type.is_empty() || !game.mode.is_empty() {
            lines.push(Line::from(format!(
                "Type: {}  Mode: {}",
                or_dash(&game.game_type),
                or_dash(&game.mode)
            )));
        }
        lines.push(Line::from(format!(
            "Updated: {}",
            or_dash(&game.updated_at)
        )));
        lines.push(Line::from(format!("Source: {}", or_dash(&game.source))));
        if game.location != game.source {
            lines.push(Line::from(format!("Location: {}", or_dash(&game.location))));
        }
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn content_title(&self, label: &str, count: usize) -> String {
        let mut title = format!("{label} ({count})");
        if let Some(loaded) = &self.state.content {
            if loaded.from_snapshot {
                title.push_str(" · local snapshot");
            }
        }
        if self.state.dirty {
            title.push_str(" · unsaved");
        }
        title
    }

    fn render_missions(&self, frame: &mut Frame, area: Rect) {
        let missions = self
            .state
            .content
            .as_ref()
            .map(|loaded| loaded.content.missions.as_slice())
            .unwrap_or_default();
        let items: Vec<ListItem> = missions
            .iter()
            .map(|mission| {
                self.trigger_item(&mission.title, &mission.id, mission.trigger.as_ref())
            })
            .collect();
        let mut list_state = ListState::default();
        if !missions.is_empty() && self.ui.focus == Focus::Missions {
            list_state.select(Some(self.state.mission_cursor));
        }
        let list = List::new(items)
            .block(self.focused_block(self.content_title("Missions", missions.len()), Focus::Missions))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_devices(&self, frame: &mut Frame, area: Rect) {
        let devices = self
            .state
            .content
            .as_ref()
            .map(|loaded| loaded.content.devices.as_slice())
            .unwrap_or_default();
        let items: Vec<ListItem> = devices
            .iter()
            .map(|device| self.trigger_item(&device.title, &device.id, device.trigger.as_ref()))
            .collect();
        let mut list_state = ListState::default();
        if !devices.is_empty() && self.ui.focus == Focus::Devices {
            list_state.select(Some(self.ui.device_cursor.min(devices.len() - 1)));
        }
        let list = List::new(items)
            .block(self.focused_block(format!("Devices ({})", devices.len()), Focus::Devices))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn trigger_item(&self, title: &str, id: &str, trigger: Option<&TriggerConfig>) -> ListItem<'static> {
        let enabled = trigger.map(|t| t.enabled).unwrap_or(false);
        let summary_style = if enabled {
            Style::default().fg(self.theme.success)
        } else {
            Style::default().fg(self.theme.muted)
        };
        ListItem::new(Line::from(vec![
            Span::styled(
                entity_label(title, id),
                Style::default().fg(self.theme.primary_fg),
            ),
            Span::styled(format!("  {}", trigger_label(trigger)), summary_style),
        ]))
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.ui.mode == Mode::Filter {
            Line::from(format!("Filter: {}", self.state.filter))
        } else if self.state.status.contains("failed") || self.state.status.contains("Failed") {
            Line::from(Span::styled(
                self.state.status.clone(),
                Style::default().fg(self.theme.danger),
            ))
        } else {
            Line::from(self.state.status.clone())
        };
        let mut hints = match self.ui.focus {
            Focus::Games => "j/k move · / filter · c channel · p publish · Tab edit · ^R reload · q quit",
            Focus::Missions | Focus::Devices => {
                "j/k move · e toggle · a action · s save · x discard · Tab next · Esc back"
            }
        }
        .to_string();
        if self.request_in_flight {
            hints.push_str(" · request pending");
        }
        let secondary = Line::from(Span::styled(hints, Style::default().fg(self.theme.muted)));
        let paragraph = Paragraph::new(vec![primary, secondary])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
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

struct UiState {
    mode: Mode,
    focus: Focus,
    offset: usize,
    list_height: usize,
    device_cursor: usize,
    quit_armed: bool,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Browse,
            focus: Focus::Games,
            offset: 0,
            list_height: 1,
            device_cursor: 0,
            quit_armed: false,
            should_quit: false,
        }
    }
}

/// Scroll offset that keeps `cursor` inside a window of `height` rows.
fn list_offset(cursor: usize, offset: usize, height: usize, len: usize) -> usize {
    if len == 0 || height == 0 {
        return 0;
    }
    let mut offset = offset;
    if cursor < offset {
        offset = cursor;
    } else if cursor >= offset + height {
        offset = cursor + 1 - height;
    }
    offset.min(len.saturating_sub(height))
}

fn step(index: usize, delta: isize) -> usize {
    if delta.is_negative() {
        index.saturating_sub(delta.unsigned_abs())
    } else {
        index.saturating_add(delta as usize)
    }
}

/// Directory holding a record's `config.json`, if it has one on disk.
fn content_dir(game: &GameRecord) -> Option<PathBuf> {
    let source = game.source.trim();
    if source.is_empty() || VIRTUAL_SOURCES.iter().any(|name| *name == source) {
        return None;
    }
    Some(PathBuf::from(source))
}

fn trigger_label(trigger: Option<&TriggerConfig>) -> String {
    trigger.unwrap_or(&DEFAULT_TRIGGER_CONFIG).summary()
}

fn entity_label(title: &str, id: &str) -> String {
    match (title.trim(), id.trim()) {
        ("", "") => "(untitled)".to_string(),
        ("", id) => format!("[{id}]"),
        (title, "") => title.to_string(),
        (title, id) => format!("{title} [{id}]"),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_admin_core::{
        models::{normalize_record, RawGameRecord},
        trigger::ActionType,
    };

    fn record(source: &str) -> GameRecord {
        normalize_record(&RawGameRecord {
            slug: Some("harbor".to_string()),
            source: Some(source.to_string()),
            ..RawGameRecord::default()
        })
        .expect("record")
    }

    #[test]
    fn offset_follows_cursor() {
        assert_eq!(list_offset(0, 0, 5, 0), 0);
        assert_eq!(list_offset(7, 0, 5, 20), 3);
        assert_eq!(list_offset(2, 3, 5, 20), 2);
        assert_eq!(list_offset(19, 0, 5, 20), 15);
        assert_eq!(list_offset(1, 10, 5, 4), 0);
    }

    #[test]
    fn step_saturates() {
        assert_eq!(step(0, -3), 0);
        assert_eq!(step(2, 3), 5);
        assert_eq!(step(4, -1), 3);
    }

    #[test]
    fn virtual_records_have_no_content_dir() {
        assert_eq!(content_dir(&record("virtual")), None);
        assert_eq!(content_dir(&record("fallback")), None);
        assert_eq!(content_dir(&record("")), None);
        assert_eq!(
            content_dir(&record("/srv/game-data/harbor/draft")),
            Some(PathBuf::from("/srv/game-data/harbor/draft"))
        );
    }

    #[test]
    fn labels_describe_entities() {
        assert_eq!(trigger_label(None), "trigger off");
        let trigger = TriggerConfig {
            enabled: true,
            action_type: ActionType::Devices,
            action_label: "Gate".to_string(),
            ..TriggerConfig::default()
        };
        assert_eq!(trigger_label(Some(&trigger)), "devices → Gate");
        assert_eq!(entity_label("Bell", "m-1"), "Bell [m-1]");
        assert_eq!(entity_label(" ", "m-1"), "[m-1]");
        assert_eq!(entity_label("", ""), "(untitled)");
        assert_eq!(or_dash(""), "-");
    }
}
