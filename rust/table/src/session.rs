use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::settings::TableSettings;
use headsup_ai::policy;
use headsup_engine::engine::Engine;
use headsup_engine::errors::GameError;
use headsup_engine::game::Phase;
use headsup_engine::hand::current_category;
use headsup_engine::logger::{HandRecord, ShowdownInfo};
use headsup_engine::player::{PlayerAction, PlayerId};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = String;

/// The seat driven by callers. The other seat belongs to the opponent policy.
pub const HUMAN_SEAT: PlayerId = PlayerId::P1;
pub const OPPONENT_SEAT: PlayerId = PlayerId::P2;

// keeps the opponent's roll stream apart from the dealing stream
const OPPONENT_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// One heads-up table: the engine, the settings it was built from and the
/// opponent's RNG. Every operation returns a fresh [`TableSnapshot`].
#[derive(Debug)]
pub struct TableSession {
    id: SessionId,
    engine: Engine,
    settings: TableSettings,
    opponent_rng: ChaCha20Rng,
    last_active: Instant,
}

impl TableSession {
    pub fn new(settings: TableSettings) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), settings)
    }

    pub fn with_id(id: SessionId, settings: TableSettings) -> Self {
        let mut engine = Engine::new(settings.table_config(), settings.seed);
        engine.set_player_name(OPPONENT_SEAT, settings.opponent_name.as_str());
        let opponent_rng = ChaCha20Rng::seed_from_u64(engine.seed() ^ OPPONENT_STREAM);
        Self {
            id,
            engine,
            settings,
            opponent_rng,
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }
    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
    pub fn hand_record(&self) -> Option<&HandRecord> {
        self.engine.hand_record()
    }

    /// Names the human seat and deals the next hand. With a busted stack the
    /// engine only narrates; the snapshot then asks for a reset.
    pub fn start_new_hand(&mut self, player_name: &str) -> Result<TableSnapshot, SessionError> {
        self.touch();
        self.rename_player(player_name);
        self.engine.start_new_hand()?;
        tracing::info!(
            session_id = %self.id,
            hand_id = ?self.engine.hand_record().map(|r| r.hand_id.as_str()),
            "new hand requested"
        );
        Ok(self.state())
    }

    /// Applies a human action. The wire form is validated here: unknown
    /// seats and action types, the opponent's seat, acting out of turn and
    /// acting after showdown are all rejected without touching the table.
    ///
    /// The opponent is not run; call [`TableSession::run_opponent_turn`].
    pub fn apply_player_action(
        &mut self,
        player_id: &str,
        action_type: &str,
        amount: i64,
    ) -> Result<TableSnapshot, SessionError> {
        self.touch();
        let seat = PlayerId::parse(player_id)
            .ok_or_else(|| self.reject(format!("unknown player: {player_id}")))?;
        if seat != HUMAN_SEAT {
            return Err(self.reject(format!("{seat} is controlled by the table")));
        }
        if amount < 0 {
            return Err(self.reject(format!("amount cannot be negative: {amount}")));
        }
        let amount = u32::try_from(amount).unwrap_or(u32::MAX);
        let action = PlayerAction::from_parts(action_type, amount)
            .map_err(|err| self.reject(err.to_string()))?;
        self.engine
            .ensure_can_act(seat)
            .map_err(|err| self.reject(err.to_string()))?;

        self.engine.process_action(seat, action)?;
        tracing::debug!(session_id = %self.id, player = %seat, ?action, "player action applied");
        Ok(self.state())
    }

    /// Lets the opponent act when it holds the turn in a live hand; otherwise
    /// the table is returned unchanged.
    pub fn run_opponent_turn(&mut self) -> Result<TableSnapshot, SessionError> {
        self.touch();
        let state = self.engine.state();
        if state.is_hand_over() || state.current_turn() != OPPONENT_SEAT {
            return Ok(self.state());
        }

        let action = policy::decide(state, OPPONENT_SEAT, &mut self.opponent_rng);
        self.engine.process_action(OPPONENT_SEAT, action)?;
        tracing::debug!(session_id = %self.id, ?action, "opponent acted");
        Ok(self.state())
    }

    /// Restores both stacks to the starting amount and deals a new hand.
    pub fn reset_session(&mut self, player_name: &str) -> Result<TableSnapshot, SessionError> {
        self.touch();
        self.rename_player(player_name);
        self.engine.reset_game()?;
        tracing::info!(session_id = %self.id, "session reset");
        Ok(self.state())
    }

    pub fn state(&self) -> TableSnapshot {
        let state = self.engine.state();
        let players = state
            .players()
            .iter()
            .map(|p| PlayerView {
                id: p.id(),
                name: p.name().to_string(),
                stack: p.stack(),
                current_bet: p.current_bet(),
                is_active: p.is_active(),
                last_action: p.last_action().map(str::to_string),
                hole_cards: p.hole_cards().iter().map(|c| c.display()).collect(),
            })
            .collect();
        let record = self.engine.hand_record();

        TableSnapshot {
            session_id: self.id.clone(),
            hand_id: record.map(|r| r.hand_id.clone()),
            phase: state.phase(),
            pot: state.pot(),
            highest_bet: state.highest_bet(),
            to_call: state.to_call(HUMAN_SEAT),
            current_turn: state.current_turn(),
            dealer_button: state.dealer_button(),
            message: state.message().to_string(),
            community_cards: state.community_cards().iter().map(|c| c.display()).collect(),
            players,
            hand_label: current_category(&state.visible_cards(HUMAN_SEAT))
                .map(|c| c.label().to_string()),
            showdown: record.and_then(|r| r.showdown.clone()),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() >= ttl
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn rename_player(&mut self, player_name: &str) {
        let name = player_name.trim();
        if !name.is_empty() {
            self.engine.set_player_name(HUMAN_SEAT, name);
        }
    }

    fn reject(&self, reason: String) -> SessionError {
        tracing::warn!(session_id = %self.id, reason = %reason, "action rejected");
        SessionError::InvalidAction(reason)
    }
}

/// Registry of independent tables. Each table sits behind its own lock, so
/// nothing is shared between sessions.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<TableSession>>>>,
    defaults: TableSettings,
    session_ttl: Duration,
}

impl SessionManager {
    pub fn new(defaults: TableSettings) -> Self {
        let ttl = Duration::from_secs(defaults.session_timeout_minutes.saturating_mul(60));
        Self::with_ttl(defaults, ttl)
    }

    pub fn with_ttl(defaults: TableSettings, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            defaults,
            session_ttl: ttl,
        }
    }

    /// Creates a table from the manager's settings and deals its first hand.
    pub fn create_session(&self, player_name: &str) -> Result<SessionId, SessionError> {
        self.create_session_with(self.defaults.clone(), player_name)
    }

    pub fn create_session_with(
        &self,
        settings: TableSettings,
        player_name: &str,
    ) -> Result<SessionId, SessionError> {
        let mut session = TableSession::new(settings);
        let id = session.id().clone();
        tracing::info!(
            session_id = %id,
            seed = session.engine().seed(),
            starting_stack = session.settings().starting_stack,
            "creating table session"
        );
        session.start_new_hand(player_name)?;

        let mut guard = self
            .sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard.insert(id.clone(), Arc::new(Mutex::new(session)));
        Ok(id)
    }

    pub fn get_session(&self, id: &str) -> Result<Arc<Mutex<TableSession>>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Runs `f` against a live session. An idle session past its TTL is
    /// removed and reported as expired instead.
    pub fn with_session<F, R>(&self, id: &str, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut TableSession) -> Result<R, SessionError>,
    {
        let session = self.get_session(id)?;
        let mut guard = lock_session(&session)?;
        if guard.is_expired(self.session_ttl) {
            drop(guard);
            self.remove_session(id)?;
            tracing::info!(session_id = %id, "session expired due to inactivity");
            return Err(SessionError::Expired(id.to_string()));
        }
        f(&mut *guard)
    }

    pub fn state(&self, id: &str) -> Result<TableSnapshot, SessionError> {
        self.with_session(id, |s| Ok(s.state()))
    }

    pub fn start_new_hand(&self, id: &str, player_name: &str) -> Result<TableSnapshot, SessionError> {
        self.with_session(id, |s| s.start_new_hand(player_name))
    }

    pub fn apply_player_action(
        &self,
        id: &str,
        player_id: &str,
        action_type: &str,
        amount: i64,
    ) -> Result<TableSnapshot, SessionError> {
        self.with_session(id, |s| s.apply_player_action(player_id, action_type, amount))
    }

    pub fn run_opponent_turn(&self, id: &str) -> Result<TableSnapshot, SessionError> {
        self.with_session(id, |s| s.run_opponent_turn())
    }

    pub fn reset_session(&self, id: &str, player_name: &str) -> Result<TableSnapshot, SessionError> {
        self.with_session(id, |s| s.reset_session(player_name))
    }

    pub fn delete_session(&self, id: &str) -> Result<(), SessionError> {
        match self.remove_session(id)? {
            Some(_) => {
                tracing::info!(session_id = %id, "session deleted");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.to_string())),
        }
    }

    /// Drops every session idle for longer than the TTL and returns how many
    /// were removed.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let ttl = self.session_ttl;
        let mut tables = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = tables.len();
        tables.retain(|id, table| {
            // a table whose lock was poisoned is unusable
            let keep = table.lock().is_ok_and(|t| !t.is_expired(ttl));
            if !keep {
                tracing::info!(session_id = %id, "removing expired session");
            }
            keep
        });
        before - tables.len()
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.sessions
            .read()
            .map(|tables| tables.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    fn remove_session(&self, id: &str) -> Result<Option<Arc<Mutex<TableSession>>>, SessionError> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        Ok(guard.remove(id))
    }
}

fn lock_session(session: &Mutex<TableSession>) -> Result<MutexGuard<'_, TableSession>, SessionError> {
    session.lock().map_err(|_| SessionError::StoragePoisoned)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub stack: u32,
    pub current_bet: u32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    /// Display strings such as `♠A`
    pub hole_cards: Vec<String>,
}

/// Read-only view of a table handed to callers after every operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSnapshot {
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_id: Option<String>,
    pub phase: Phase,
    pub pot: u32,
    pub highest_bet: u32,
    /// Chips the human seat needs to call
    pub to_call: u32,
    pub current_turn: PlayerId,
    pub dealer_button: PlayerId,
    pub message: String,
    pub community_cards: Vec<String>,
    pub players: Vec<PlayerView>,
    /// Best category the human seat currently holds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showdown: Option<ShowdownInfo>,
}

impl TableSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_hand_over(&self) -> bool {
        self.phase == Phase::Showdown
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Game engine error: {0}")]
    Engine(#[from] GameError),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

impl IntoErrorResponse for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::InvalidAction(_) => "invalid_action",
            SessionError::Engine(_) => "engine_error",
            SessionError::StoragePoisoned => "session_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::NotFound(id) | SessionError::Expired(id) => {
                Some(serde_json::json!({ "session_id": id }))
            }
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            SessionError::Engine(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}

#[cfg(test)]
impl TableSession {
    fn force_last_active(&mut self, instant: Instant) {
        self.last_active = instant;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    fn seeded(seed: u64) -> TableSettings {
        TableSettings {
            seed: Some(seed),
            ..TableSettings::default()
        }
    }

    #[test]
    fn first_hand_is_dealt_with_names_and_blinds() {
        let mut session = TableSession::new(seeded(1));
        let snap = session.start_new_hand("Alice").expect("deal");

        assert_eq!(snap.phase, Phase::Preflop);
        assert_eq!(snap.pot, 30);
        assert_eq!(snap.to_call, 10);
        assert_eq!(snap.current_turn, HUMAN_SEAT);
        let hero = snap.player(HUMAN_SEAT).expect("hero");
        assert_eq!(hero.name, "Alice");
        assert_eq!(hero.hole_cards.len(), 2);
        assert_eq!(snap.player(OPPONENT_SEAT).expect("cpu").name, "CPU");
        assert!(snap.hand_label.is_some());
        assert!(snap.hand_id.is_some());
    }

    #[test]
    fn blank_names_keep_the_previous_one() {
        let mut session = TableSession::new(seeded(2));
        session.start_new_hand("Bob").expect("deal");
        let snap = session.reset_session("   ").expect("reset");
        assert_eq!(snap.player(HUMAN_SEAT).expect("hero").name, "Bob");
    }

    #[test]
    fn opponent_waits_for_its_turn() {
        let mut session = TableSession::new(seeded(3));
        let before = session.start_new_hand("Hero").expect("deal");
        let after = session.run_opponent_turn().expect("noop");
        assert_eq!(before, after);
    }

    #[test]
    fn opponent_acts_after_the_human() {
        let mut session = TableSession::new(seeded(4));
        session.start_new_hand("Hero").expect("deal");
        let snap = session
            .apply_player_action("p1", "call", 0)
            .expect("call");
        assert_eq!(snap.current_turn, OPPONENT_SEAT);

        let snap = session.run_opponent_turn().expect("opponent");
        let cpu = snap.player(OPPONENT_SEAT).expect("cpu");
        assert!(cpu.last_action.is_some());
        assert_ne!(cpu.last_action.as_deref(), Some("BB"));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut session = TableSession::new(seeded(5));
        session.start_new_hand("Hero").expect("deal");
        let err = session
            .apply_player_action("p1", "raise", -20)
            .expect_err("negative");
        assert!(matches!(err, SessionError::InvalidAction(_)));
        assert_eq!(session.state().pot, 30);
    }

    #[test]
    fn expired_session_is_removed_on_access() {
        let manager = SessionManager::with_ttl(seeded(6), Duration::from_secs(60));
        let id = manager.create_session("Hero").expect("create");
        {
            let session = manager.get_session(&id).expect("get");
            let mut guard = session.lock().expect("lock");
            guard.force_last_active(Instant::now() - Duration::from_secs(120));
        }

        match manager.state(&id) {
            Err(SessionError::Expired(expired)) => assert_eq!(expired, id),
            other => panic!("expected expiry, got {:?}", other),
        }
        assert!(matches!(
            manager.get_session(&id),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn cleanup_keeps_fresh_sessions() {
        let manager = SessionManager::with_ttl(seeded(7), Duration::from_secs(60));
        let stale = manager.create_session("Old").expect("create");
        let fresh = manager.create_session("New").expect("create");
        {
            let session = manager.get_session(&stale).expect("get");
            let mut guard = session.lock().expect("lock");
            guard.force_last_active(Instant::now() - Duration::from_secs(61));
        }

        assert_eq!(manager.cleanup_expired_sessions(), 1);
        assert_eq!(manager.active_sessions(), vec![fresh]);
    }

    #[test]
    fn concurrent_session_creation_is_safe() {
        let manager = Arc::new(SessionManager::new(TableSettings::default()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.create_session(&format!("player{i}")))
            })
            .collect();

        let ids: HashSet<SessionId> = handles
            .into_iter()
            .map(|h| h.join().expect("join").expect("create"))
            .collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(manager.active_sessions().len(), 8);
    }

    #[test]
    fn errors_map_to_codes_and_severity() {
        let err = SessionError::NotFound("abc".into());
        let response = err.to_error_response();
        assert_eq!(response.error, "session_not_found");
        assert_eq!(
            response.details.as_ref().and_then(|d| d["session_id"].as_str()),
            Some("abc")
        );

        assert_eq!(
            SessionError::from(GameError::DeckExhausted).severity(),
            ErrorSeverity::Server
        );
        assert_eq!(
            SessionError::StoragePoisoned.severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            SessionError::InvalidAction("x".into()).error_code(),
            "invalid_action"
        );
    }
}
