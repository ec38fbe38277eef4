use std::fmt;
use std::time::Duration;

use pongsync_transport::{Message, Transport};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::command::{Command, ACTION_START};
use crate::decoder::{decode, BallState};
use crate::error::{Result, SessionError};
use crate::reducer::{reduce, Scoreboard, KEY_ERROR};
use crate::roster::PaddleRoster;
use crate::settings::GameSettings;
use crate::timer::FrameTimer;

/// Session behavior configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay before a requested visual-frame callback runs. Default: 16 ms.
    pub frame_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// The mirrored state of one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameSnapshot {
    #[serde(flatten)]
    pub scoreboard: Scoreboard,
    pub ball: BallState,
}

/// Everything a session publishes to observers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub snapshot: GameSnapshot,
    pub roster: PaddleRoster,
    pub settings: GameSettings,
}

/// A live connection to one game instance.
///
/// The only writer of its [`SessionState`]. Observers call
/// [`Session::subscribe`] and get a versioned view that changes whenever an
/// inbound message changes the state.
///
/// Dropping the session cancels any pending frame callback and closes the
/// transport.
pub struct Session<T: Transport> {
    endpoint: String,
    transport: T,
    state: watch::Sender<SessionState>,
    frame: Option<FrameTimer>,
    config: SessionConfig,
    closed: bool,
}

impl<T: Transport> Session<T> {
    /// Open a session for `endpoint` over `transport`.
    pub fn new(endpoint: impl Into<String>, transport: T) -> Self {
        Self::with_config(endpoint, transport, SessionConfig::default())
    }

    /// Open a session with explicit configuration.
    pub fn with_config(endpoint: impl Into<String>, transport: T, config: SessionConfig) -> Self {
        let endpoint = endpoint.into();
        let (state, _) = watch::channel(SessionState::default());
        debug!(%endpoint, "session opened");
        Self {
            endpoint,
            transport,
            state,
            frame: None,
            config,
            closed: false,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns true once the session was torn down.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Live view of the session state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Copy of the current game snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.borrow().snapshot.clone()
    }

    /// Route one inbound message. Never fails: malformed input is logged
    /// and dropped.
    pub fn handle_message(&self, message: &Message) {
        if self.closed {
            trace!(kind = message.kind_name(), "session closed; dropping message");
            return;
        }
        match message {
            Message::Json(value) => self.apply_control(value),
            Message::Binary(payload) => self.apply_frame(payload),
        }
    }

    /// Surface a transport-level failure through the `error` slot.
    pub fn handle_transport_error(&self, err: &dyn fmt::Display) {
        warn!(endpoint = %self.endpoint, error = %err, "transport error");
        let mut message = serde_json::Map::new();
        message.insert(KEY_ERROR.to_string(), err.to_string().into());
        self.apply_control(&serde_json::Value::Object(message));
    }

    fn apply_control(&self, value: &serde_json::Value) {
        self.state.send_if_modified(|state| {
            let next = reduce(value, &state.snapshot.scoreboard);
            if next == state.snapshot.scoreboard {
                return false;
            }
            state.snapshot.scoreboard = next;
            true
        });
    }

    fn apply_frame(&self, payload: &[u8]) {
        self.state.send_if_modified(|state| {
            let frame = match decode(payload, state.roster.len()) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(endpoint = %self.endpoint, error = %err, "dropping malformed frame");
                    return false;
                }
            };

            let changed = state.snapshot.ball != frame.ball
                || state
                    .roster
                    .iter()
                    .zip(&frame.paddles)
                    .any(|(paddle, update)| paddle.state != *update);
            state.snapshot.ball = frame.ball;
            let applied = state.roster.apply(&frame.paddles);
            debug_assert!(applied, "frame decoded with roster length");
            changed
        });
    }

    /// Store `settings`, rebuild the roster from its controllers and send
    /// `start`. Does nothing when `settings` is `None`.
    pub fn start_game(&mut self, settings: Option<GameSettings>) -> Result<()> {
        let Some(settings) = settings else {
            debug!("start_game called without settings; ignoring");
            return Ok(());
        };

        let message = Command::Start(settings.clone()).to_value()?;
        let roster = PaddleRoster::from_names(settings.paddle_names());
        debug!(paddles = roster.len(), "starting game");
        self.state.send_modify(|state| {
            state.roster = roster;
            state.settings = settings;
        });

        self.send_value(ACTION_START, &message)
    }

    pub fn stop_game(&mut self) -> Result<()> {
        self.send_command(&Command::Stop)
    }

    pub fn pause_game(&mut self) -> Result<()> {
        self.send_command(&Command::Pause)
    }

    pub fn resume_game(&mut self) -> Result<()> {
        self.send_command(&Command::Resume)
    }

    /// Send `update_paddle` with `data`'s fields in snake_case.
    pub fn update_paddle_position<D: Serialize + ?Sized>(&mut self, data: &D) -> Result<()> {
        self.send_command(&Command::update_paddle(data)?)
    }

    /// Send `update_dimensions` with `data`'s fields in snake_case.
    pub fn update_game_dimensions<D: Serialize + ?Sized>(&mut self, data: &D) -> Result<()> {
        self.send_command(&Command::update_dimensions(data)?)
    }

    /// Send any command. `Start` goes through [`Session::start_game`] so the
    /// roster always matches the match being started; other commands leave
    /// local state alone.
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        if let Command::Start(settings) = command {
            return self.start_game(Some(settings.clone()));
        }
        let message = command.to_value()?;
        self.send_value(command.action(), &message)
    }

    fn send_value(&mut self, action: &str, message: &serde_json::Value) -> Result<()> {
        self.transport.send(message).map_err(SessionError::from)?;
        trace!(action, "command sent");
        Ok(())
    }

    /// Run `callback` with the latest state after the frame interval,
    /// replacing any callback still pending.
    pub fn request_frame<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnOnce(&SessionState) + Send + 'static,
    {
        self.cancel_frame();
        let receiver = self.state.subscribe();
        let timer = FrameTimer::schedule(self.config.frame_interval, move || {
            // No watch lock is held while the callback runs.
            let state = receiver.borrow().clone();
            callback(&state);
        })
        .map_err(SessionError::Timer)?;
        self.frame = Some(timer);
        Ok(())
    }

    /// Cancel the pending frame callback, if any.
    pub fn cancel_frame(&mut self) {
        if let Some(mut timer) = self.frame.take() {
            timer.cancel();
        }
    }

    /// Returns true while a frame callback is scheduled and has not run.
    pub fn frame_pending(&self) -> bool {
        self.frame.as_ref().is_some_and(FrameTimer::is_pending)
    }

    /// Tear the session down: cancel the frame callback, then close the
    /// transport. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cancel_frame();
        debug!(endpoint = %self.endpoint, "session closed");
        self.transport.close().map_err(SessionError::from)
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(endpoint = %self.endpoint, error = %err, "failed to close transport");
        }
    }
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.closed)
            .field("frame_pending", &self.frame_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};

    use pongsync_transport::{MemoryTransport, SentLog, TransportError};
    use serde_json::json;

    use super::*;
    use crate::decoder::{encode, DecodedFrame, PaddleState, Vec2};

    fn session() -> (Session<MemoryTransport>, SentLog) {
        let (transport, log) = MemoryTransport::new();
        (Session::new("unix:///tmp/pong.sock", transport), log)
    }

    fn two_player_settings() -> GameSettings {
        GameSettings::from_value(json!({
            "game": {"end_score": 5, "is_deuce_on": 2},
            "controllers": [
                {"side": "left", "name": "PLAYER 1", "controlledBy": {"key": "human"}},
                {"side": "right", "name": "PLAYER 2", "controlledBy": {"key": "human"}}
            ]
        }))
        .unwrap()
    }

    fn frame(ball_x: f32, positions: &[f32]) -> DecodedFrame {
        DecodedFrame {
            ball: BallState {
                position: Vec2::new(ball_x, 0.5),
                velocity: Vec2::new(1.0, -1.0),
                is_out_of_bounds: false,
                curve: 0.0,
                bounced_off_surface: 1,
            },
            paddles: positions
                .iter()
                .map(|&position| PaddleState {
                    width: 10.0,
                    height: 80.0,
                    position,
                    speed: 4.0,
                })
                .collect(),
        }
    }

    #[test]
    fn start_sends_stripped_controllers_and_builds_roster() {
        let (mut session, log) = session();
        let settings = GameSettings::from_value(json!({
            "end_score": 11,
            "controllers": [{"side": "left", "name": "PLAYER 1", "controlledBy": {"key": "human"}}]
        }))
        .unwrap();

        session.start_game(Some(settings.clone())).unwrap();

        assert_eq!(
            log.last().unwrap(),
            json!({
                "action": "start",
                "data": {"end_score": 11, "controllers": [{"side": "left", "name": "PLAYER 1"}]}
            })
        );
        let state = session.state();
        assert_eq!(state.settings, settings);
        assert_eq!(state.roster.names().collect::<Vec<_>>(), ["PLAYER 1"]);
    }

    #[test]
    fn generic_start_command_rebuilds_roster() {
        let (mut session, log) = session();
        session
            .send_command(&Command::Start(two_player_settings()))
            .unwrap();

        assert_eq!(log.last().unwrap()["action"], "start");
        assert_eq!(session.state().roster.len(), 2);

        let update = frame(2.0, &[50.0, 60.0]);
        session.handle_message(&Message::Binary(encode(&update)));
        assert_eq!(session.state().roster.get(1).unwrap().state, update.paddles[1]);
    }

    #[test]
    fn start_without_settings_is_a_no_op() {
        let (mut session, log) = session();
        let before = session.subscribe();
        session.start_game(None).unwrap();

        assert!(log.is_empty());
        assert!(!before.has_changed().unwrap());
        assert!(session.state().roster.is_empty());
    }

    #[test]
    fn simple_commands_do_not_touch_state() {
        let (mut session, log) = session();
        let rx = session.subscribe();

        session.stop_game().unwrap();
        session.pause_game().unwrap();
        session.resume_game().unwrap();

        assert_eq!(
            log.messages(),
            vec![
                json!({"action": "stop"}),
                json!({"action": "pause"}),
                json!({"action": "resume"})
            ]
        );
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn paddle_and_dimension_updates_use_wire_case() {
        let (mut session, log) = session();
        session
            .update_paddle_position(&json!({"name": "PLAYER 1", "direction": 1}))
            .unwrap();
        session
            .update_game_dimensions(&json!({"ballWidth": 20, "ballHeight": 20}))
            .unwrap();

        assert_eq!(
            log.messages(),
            vec![
                json!({"action": "update_paddle", "name": "PLAYER 1", "direction": 1}),
                json!({"action": "update_dimensions", "ball_width": 20, "ball_height": 20})
            ]
        );
    }

    #[test]
    fn control_messages_accumulate() {
        let (session, _log) = session();
        session.handle_message(&Message::Json(json!({"status": 2})));
        session.handle_message(&Message::Json(json!({"leftScore": 5})));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.scoreboard.status, 2);
        assert_eq!(snapshot.scoreboard.left_score, 5);
    }

    #[test]
    fn binary_frames_update_ball_and_roster() {
        let (mut session, _log) = session();
        session.start_game(Some(two_player_settings())).unwrap();

        let update = frame(3.0, &[120.0, 240.0]);
        session.handle_message(&Message::Binary(encode(&update)));

        let state = session.state();
        assert_eq!(state.snapshot.ball, update.ball);
        assert_eq!(state.roster.get(0).unwrap().state, update.paddles[0]);
        assert_eq!(state.roster.get(1).unwrap().state, update.paddles[1]);
        assert_eq!(state.roster.get(1).unwrap().name, "PLAYER 2");
    }

    #[test]
    fn malformed_frame_keeps_previous_snapshot() {
        let (mut session, _log) = session();
        session.start_game(Some(two_player_settings())).unwrap();
        session.handle_message(&Message::Binary(encode(&frame(3.0, &[1.0, 2.0]))));
        let before = session.state();

        let mut rx = session.subscribe();
        rx.mark_unchanged();

        // Ball state present, second paddle missing.
        let truncated = encode(&frame(9.0, &[7.0, 8.0])).slice(..38);
        session.handle_message(&Message::Binary(truncated));
        session.handle_message(&Message::binary(vec![0u8; 5]));

        assert_eq!(session.state(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn frames_before_start_carry_ball_only() {
        let (session, _log) = session();
        let update = frame(4.0, &[]);
        session.handle_message(&Message::Binary(encode(&update)));
        assert_eq!(session.snapshot().ball, update.ball);
        assert!(session.state().roster.is_empty());
    }

    #[test]
    fn duplicate_status_does_not_notify() {
        let (session, _log) = session();
        let mut rx = session.subscribe();
        session.handle_message(&Message::Json(json!({"status": 1})));
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();

        session.handle_message(&Message::Json(json!({"status": 1, "type": "game_state"})));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn transport_errors_reach_error_slot() {
        let (session, _log) = session();
        session.handle_transport_error(&"connection reset");
        assert_eq!(session.snapshot().scoreboard.error, "connection reset");
    }

    #[test]
    fn close_cancels_frame_and_closes_transport() {
        let (transport, log) = MemoryTransport::new();
        let config = SessionConfig {
            frame_interval: Duration::from_millis(40),
        };
        let mut session = Session::with_config("local", transport, config);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        session
            .request_frame(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        session.close().unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!session.frame_pending());
        assert!(matches!(
            session.stop_game(),
            Err(SessionError::Transport(TransportError::Closed))
        ));
        assert!(log.is_empty());

        session.handle_message(&Message::Json(json!({"status": 9})));
        assert_eq!(session.snapshot().scoreboard.status, 0);
    }

    #[test]
    fn frame_callback_sees_latest_state() {
        let (mut session, _log) = session();
        let (tx, rx) = mpsc::channel();
        session.handle_message(&Message::Json(json!({"rightScore": 3})));
        session
            .request_frame(move |state| {
                tx.send(state.snapshot.scoreboard.right_score).unwrap();
            })
            .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 3);
    }

    #[test]
    fn new_frame_request_replaces_pending_one() {
        let config = SessionConfig {
            frame_interval: Duration::from_millis(50),
        };
        let (transport, _log) = MemoryTransport::new();
        let mut session = Session::with_config("local", transport, config);
        let (tx, rx) = mpsc::channel();

        let first = tx.clone();
        session.request_frame(move |_| first.send("first").unwrap()).unwrap();
        session.request_frame(move |_| tx.send("second").unwrap()).unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "second");
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
