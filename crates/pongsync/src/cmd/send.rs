use std::fs;

use pongsync_frame::{FrameConfig, FramedTransport};
use pongsync_session::{Command, GameSettings, Session};
use pongsync_transport::connect;
use serde_json::Value;
use tracing::info;

use crate::cmd::{Action, SendArgs};
use crate::exit::{
    frame_error, io_error, session_error, transport_error, CliError, CliResult, SUCCESS, USAGE,
};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let command = build_command(args.action, payload)?;

    let stream = connect(&args.path).map_err(|err| transport_error("connect failed", err))?;
    let transport = FramedTransport::socket(stream, FrameConfig::default())
        .map_err(|err| frame_error("connect failed", err))?;
    let mut session = Session::new(args.path.display().to_string(), transport);

    session
        .send_command(&command)
        .map_err(|err| session_error("send failed", err))?;
    info!(action = ?args.action, "command sent");

    session
        .close()
        .map_err(|err| session_error("close failed", err))?;
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Option<Value>> {
    let text = if let Some(json) = &args.json {
        json.clone()
    } else if let Some(path) = &args.file {
        fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
    } else {
        return Ok(None);
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|err| CliError::new(USAGE, format!("payload is not valid JSON: {err}")))
}

fn build_command(action: Action, payload: Option<Value>) -> CliResult<Command> {
    let require = |payload: Option<Value>| {
        payload.ok_or_else(|| {
            CliError::new(
                USAGE,
                format!("{action:?} requires a payload (--json or --file)"),
            )
        })
    };

    match action {
        Action::Start => {
            let settings = GameSettings::from_value(require(payload)?)
                .map_err(|err| CliError::new(USAGE, format!("invalid settings: {err}")))?;
            Ok(Command::Start(settings))
        }
        Action::Stop => Ok(Command::Stop),
        Action::Pause => Ok(Command::Pause),
        Action::Resume => Ok(Command::Resume),
        Action::UpdatePaddle => Command::update_paddle(&require(payload)?)
            .map_err(|err| session_error("invalid payload", err)),
        Action::UpdateDimensions => Command::update_dimensions(&require(payload)?)
            .map_err(|err| session_error("invalid payload", err)),
    }
}
