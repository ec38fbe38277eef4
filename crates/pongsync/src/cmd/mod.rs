use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod send;
pub mod version;
pub mod watch;

/// Environment variable consulted when no socket path is given.
pub const SOCKET_ENV: &str = "PONGSYNC_SOCKET";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a game socket and print state snapshots as they change.
    Watch(WatchArgs),
    /// Send a single match command.
    Send(SendArgs),
    /// Decode a binary physics frame from a file.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Game socket path to connect to.
    #[arg(env = SOCKET_ENV)]
    pub path: PathBuf,
    /// Start a match with the settings in this JSON file.
    #[arg(long, value_name = "FILE")]
    pub start: Option<PathBuf>,
    /// Exit after printing N snapshots.
    #[arg(long)]
    pub count: Option<usize>,
    /// Maximum message payload size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_payload: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Start,
    Stop,
    Pause,
    Resume,
    UpdatePaddle,
    UpdateDimensions,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Game socket path to connect to.
    #[arg(env = SOCKET_ENV)]
    pub path: PathBuf,
    /// Command to send.
    #[arg(value_enum)]
    pub action: Action,
    /// JSON payload: settings for `start`, fields for the update commands.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the JSON payload from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding one raw frame.
    pub file: PathBuf,
    /// Number of paddle records the frame carries.
    #[arg(long, default_value = "2")]
    pub paddles: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
