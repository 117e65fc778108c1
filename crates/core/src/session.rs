//! Admin session state and its reducer.
//!
//! Every UI event becomes an [`AdminAction`] applied to one [`AdminState`];
//! failures only change the status line and leave prior state intact.

use crate::{
    content::{GameContent, Mission},
    discovery::GamesListing,
    models::{Channel, GameKey, GameRecord},
    trigger::{merge_trigger_state, TriggerPatch},
};

/// Which channels the game picker shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelFilter {
    /// Every channel.
    #[default]
    All,
    /// A single channel.
    Only(Channel),
}

impl ChannelFilter {
    /// All → published → draft → all.
    pub fn next(&self) -> Self {
        match self {
            ChannelFilter::All => ChannelFilter::Only(Channel::Published),
            ChannelFilter::Only(Channel::Published) => ChannelFilter::Only(Channel::Draft),
            ChannelFilter::Only(Channel::Draft) => ChannelFilter::All,
        }
    }

    /// Whether a record passes the filter.
    pub fn accepts(&self, channel: Channel) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Only(wanted) => *wanted == channel,
        }
    }

    /// Short label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelFilter::All => "all",
            ChannelFilter::Only(channel) => channel.as_str(),
        }
    }
}

/// Content currently open in the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedContent {
    /// Game the content belongs to.
    pub key: GameKey,
    /// Missions and devices, including unsaved edits.
    pub content: GameContent,
    /// True when the content came from the local snapshot cache.
    pub from_snapshot: bool,
}

/// Events that change the admin session.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    /// A discovery listing arrived.
    GamesLoaded(GamesListing),
    /// Fetching the listing failed.
    LoadFailed(String),
    /// Replace the picker's text filter.
    SetFilter(String),
    /// Advance the picker's channel filter.
    CycleChannelFilter,
    /// Move the game cursor by a delta.
    MoveCursor(isize),
    /// Content for a game was loaded.
    ContentLoaded {
        /// Game the content belongs to.
        key: GameKey,
        /// Loaded content.
        content: GameContent,
        /// Whether it came from the snapshot cache.
        from_snapshot: bool,
    },
    /// Select a mission by index; out-of-range indices are clamped.
    SelectMission(usize),
    /// Patch a mission's trigger.
    UpdateMissionTrigger {
        /// Position of the mission in the loaded content.
        index: usize,
        /// Fields to change.
        patch: TriggerPatch,
    },
    /// Patch a device's trigger.
    UpdateDeviceTrigger {
        /// Position of the device in the loaded content.
        index: usize,
        /// Fields to change.
        patch: TriggerPatch,
    },
    /// A publish request succeeded.
    Published(GameKey),
    /// A publish request failed.
    PublishFailed(String),
    /// Local edits were written to the snapshot cache.
    Saved(GameKey),
    /// Writing local edits failed or was blocked by validation.
    SaveFailed(String),
    /// Free-form status message.
    SetStatus(String),
}

/// The whole admin session.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminState {
    /// Every discovered game, in display order.
    pub games: Vec<GameRecord>,
    /// Directories the last listing was built from.
    pub base_dirs: Vec<String>,
    /// Case-insensitive picker filter.
    pub filter: String,
    /// Picker channel filter.
    pub channel_filter: ChannelFilter,
    /// Index into [`AdminState::visible_games`].
    pub cursor: usize,
    /// Content of the selected game, once loaded.
    pub content: Option<LoadedContent>,
    /// Index into the loaded missions.
    pub mission_cursor: usize,
    /// True when the loaded content has unsaved edits.
    pub dirty: bool,
    /// Status line shown to the user.
    pub status: String,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            games: Vec::new(),
            base_dirs: Vec::new(),
            filter: String::new(),
            channel_filter: ChannelFilter::All,
            cursor: 0,
            content: None,
            mission_cursor: 0,
            dirty: false,
            status: "Ready".to_string(),
        }
    }
}

impl AdminState {
    /// Apply one action.
    pub fn apply(&mut self, action: AdminAction) {
        match action {
            AdminAction::GamesLoaded(listing) => {
                let selected = self.current_key();
                self.games = listing.games;
                self.base_dirs = listing.base_dirs;
                self.status = format!(
                    "Loaded {} games from {} directories",
                    self.games.len(),
                    self.base_dirs.len()
                );
                match selected.and_then(|key| self.position_of(&key)) {
                    Some(index) => self.cursor = index,
                    None => self.select_index(0),
                }
                self.clamp_cursor();
            }
            AdminAction::LoadFailed(message) => {
                self.status = format!("Failed to load games: {message}");
            }
            AdminAction::SetFilter(filter) => {
                self.filter = filter;
                self.select_index(0);
            }
            AdminAction::CycleChannelFilter => {
                self.channel_filter = self.channel_filter.next();
                self.status = format!("Showing {} channels", self.channel_filter.label());
                self.select_index(0);
            }
            AdminAction::MoveCursor(delta) => {
                let len = self.visible_games().len();
                if len == 0 {
                    return;
                }
                let index = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
                if index != self.cursor {
                    self.select_index(index);
                }
            }
            AdminAction::ContentLoaded {
                key,
                content,
                from_snapshot,
            } => {
                if self.current_key().as_ref() != Some(&key) {
                    return;
                }
                self.status = format!(
                    "{}: {} missions, {} devices{}",
                    key,
                    content.missions.len(),
                    content.devices.len(),
                    if from_snapshot { " (local snapshot)" } else { "" }
                );
                self.content = Some(LoadedContent {
                    key,
                    content,
                    from_snapshot,
                });
                self.mission_cursor = 0;
                self.dirty = false;
            }
            AdminAction::SelectMission(index) => {
                let len = self
                    .content
                    .as_ref()
                    .map(|loaded| loaded.content.missions.len())
                    .unwrap_or(0);
                if len > 0 {
                    self.mission_cursor = index.min(len - 1);
                }
            }
            AdminAction::UpdateMissionTrigger { index, patch } => {
                let Some(loaded) = self.content.as_mut() else {
                    return;
                };
                match loaded.content.missions.get_mut(index) {
                    Some(mission) => {
                        let next = merge_trigger_state(mission.trigger.as_ref(), &patch);
                        self.status = format!("Mission #{}: {}", index + 1, next.summary());
                        mission.trigger = Some(next);
                        self.dirty = true;
                    }
                    None => self.status = format!("No mission #{}", index + 1),
                }
            }
            AdminAction::UpdateDeviceTrigger { index, patch } => {
                let Some(loaded) = self.content.as_mut() else {
                    return;
                };
                match loaded.content.devices.get_mut(index) {
                    Some(device) => {
                        let next = merge_trigger_state(device.trigger.as_ref(), &patch);
                        self.status = format!("Device #{}: {}", index + 1, next.summary());
                        device.trigger = Some(next);
                        self.dirty = true;
                    }
                    None => self.status = format!("No device #{}", index + 1),
                }
            }
            AdminAction::Published(key) => {
                self.status = format!("Published {}", key.slug);
            }
            AdminAction::PublishFailed(message) => {
                self.status = format!("Publish failed: {message}");
            }
            AdminAction::Saved(key) => {
                if let Some(loaded) = self.content.as_mut() {
                    if loaded.key == key {
                        loaded.from_snapshot = true;
                        self.dirty = false;
                    }
                }
                self.status = format!("Saved local snapshot for {key}");
            }
            AdminAction::SaveFailed(message) => {
                self.status = format!("Save failed: {message}");
            }
            AdminAction::SetStatus(message) => {
                self.status = message;
            }
        }
    }

    /// Games passing the text and channel filters.
    pub fn visible_games(&self) -> Vec<&GameRecord> {
        let needle = self.filter.trim().to_lowercase();
        self.games
            .iter()
            .filter(|game| self.channel_filter.accepts(game.channel))
            .filter(|game| needle.is_empty() || game_matches(game, &needle))
            .collect()
    }

    /// Game under the cursor.
    pub fn current_game(&self) -> Option<&GameRecord> {
        self.visible_games().get(self.cursor).copied()
    }

    /// Key of the game under the cursor.
    pub fn current_key(&self) -> Option<GameKey> {
        self.current_game().map(GameRecord::key)
    }

    /// Mission under the mission cursor.
    pub fn current_mission(&self) -> Option<&Mission> {
        self.content
            .as_ref()
            .and_then(|loaded| loaded.content.missions.get(self.mission_cursor))
    }

    fn position_of(&self, key: &GameKey) -> Option<usize> {
        self.visible_games()
            .iter()
            .position(|game| game.slug == key.slug && game.channel == key.channel)
    }

    fn select_index(&mut self, index: usize) {
        self.cursor = index;
        self.clamp_cursor();
        let current = self.current_key();
        if self.content.as_ref().map(|loaded| &loaded.key) != current.as_ref() {
            self.content = None;
            self.mission_cursor = 0;
            self.dirty = false;
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_games().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }
}

fn game_matches(game: &GameRecord, needle: &str) -> bool {
    [
        game.slug.as_str(),
        game.title.as_str(),
        game.short_description.as_str(),
        game.game_type.as_str(),
        game.mode.as_str(),
    ]
    .iter()
    .any(|value| value.to_lowercase().contains(needle))
}
