//! # headsup_table: Table Sessions
//!
//! Session layer around the heads-up engine: a [`TableSession`] pairs one
//! engine with the scripted opponent and validates every incoming action,
//! and the [`SessionManager`] keeps many independent tables alive with an
//! idle timeout. Settings, error reporting and logging setup live here too.
//!
//! ```rust
//! use headsup_table::{SessionManager, TableSettings};
//!
//! let settings = TableSettings { seed: Some(7), ..TableSettings::default() };
//! let manager = SessionManager::new(settings);
//! let id = manager.create_session("Alice").expect("create");
//!
//! let snap = manager.apply_player_action(&id, "p1", "call", 0).expect("call");
//! assert_eq!(snap.pot, 40);
//! let snap = manager.run_opponent_turn(&id).expect("opponent");
//! assert!(snap.pot >= 40);
//! ```

pub mod errors;
pub mod logging;
pub mod session;
pub mod settings;

pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use session::{
    PlayerView, SessionError, SessionId, SessionManager, TableSession, TableSnapshot,
    HUMAN_SEAT, OPPONENT_SEAT,
};
pub use settings::{
    load_with_sources, SettingsError, SettingsResolved, SettingsSources, TableSettings,
    ValueSource,
};
