use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pongsync_frame::{FrameConfig, FrameError, FramedTransport, MessageReader};
use pongsync_session::{GameSettings, SessionContext};
use pongsync_transport::connect;
use tracing::{debug, info, warn};

use crate::cmd::WatchArgs;
use crate::exit::{
    frame_error, io_error, session_error, transport_error, CliError, CliResult, DATA_INVALID,
    INTERNAL, SUCCESS,
};
use crate::output::{print_snapshot, OutputFormat};

/// How often a blocked read wakes up to check for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let settings = args.start.as_deref().map(load_settings).transpose()?;

    let mut config = FrameConfig {
        read_timeout: Some(POLL_INTERVAL),
        ..FrameConfig::default()
    };
    if let Some(max) = args.max_payload {
        config.max_payload_size = max;
    }

    let stream = connect(&args.path).map_err(|err| transport_error("connect failed", err))?;
    let read_half = stream
        .try_clone()
        .map_err(|err| transport_error("connect failed", err))?;
    let mut reader = MessageReader::with_config_socket(read_half, config.clone())
        .map_err(|err| frame_error("connect failed", err))?;
    let transport = FramedTransport::socket(stream, config)
        .map_err(|err| frame_error("connect failed", err))?;

    let endpoint = args.path.display().to_string();
    let context = SessionContext::new();
    let session = context.provide(endpoint.as_str(), transport);
    let mut changes = session.subscribe();

    if settings.is_some() {
        session
            .with(|session| session.start_game(settings))
            .map_err(|err| session_error("start failed", err))?;
        info!(%endpoint, "match start requested");
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let mut disconnected = false;
        let mut fatal = None;

        match reader.read_message() {
            Ok(message) => session.handle_message(&message),
            Err(FrameError::Io(err))
                if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                continue;
            }
            Err(err @ FrameError::ConnectionClosed) => {
                debug!(%endpoint, "game socket closed");
                session.handle_transport_error(&err);
                disconnected = true;
            }
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "skipping unreadable message");
                session.handle_transport_error(&err);
            }
            Err(err) => {
                session.handle_transport_error(&err);
                fatal = Some(err);
            }
        }

        if changes.has_changed().unwrap_or(false) {
            let state = changes.borrow_and_update().clone();
            print_snapshot(&state, &endpoint, format);
            printed = printed.saturating_add(1);
        }

        if let Some(err) = fatal {
            return Err(frame_error("receive failed", err));
        }
        if disconnected || args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    context.end();
    Ok(SUCCESS)
}

fn load_settings(path: &Path) -> CliResult<GameSettings> {
    let text = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not valid JSON: {err}", path.display()),
        )
    })?;
    GameSettings::from_value(value).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not a valid settings object: {err}", path.display()),
        )
    })
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
