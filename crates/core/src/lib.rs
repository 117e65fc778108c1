#![warn(clippy::all, missing_docs)]

//! Core domain logic for the escape ride admin tooling.
//!
//! This crate hosts the game record model, directory discovery and
//! merge rules, the mission/device trigger model, the admin session
//! reducer, and the local persistence layers used by the API server
//! and the terminal console.

pub mod config;
pub mod content;
pub mod discovery;
pub mod models;
pub mod session;
pub mod slug;
pub mod snapshot;
pub mod store;
pub mod trigger;

pub use config::AppConfig;
pub use discovery::{find_games, DiscoveryRoots, GamesListing};
pub use models::{Channel, GameKey, GameRecord, RawGameRecord};
pub use session::{AdminAction, AdminState};
pub use store::{FsGameStore, GameStore, PublishKey};
pub use trigger::{ActionType, TriggerConfig, TriggerPatch};
