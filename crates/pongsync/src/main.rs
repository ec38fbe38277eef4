mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pongsync", version, about = "Pong game socket client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Action;

    #[test]
    fn parses_watch_subcommand() {
        let cli = Cli::try_parse_from([
            "pongsync",
            "watch",
            "/tmp/pong.sock",
            "--start",
            "settings.json",
            "--count",
            "3",
        ])
        .expect("watch args should parse");

        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.count, Some(3));
                assert!(args.start.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_send_actions() {
        let cli = Cli::try_parse_from(["pongsync", "send", "/tmp/pong.sock", "update-paddle"])
            .expect("send args should parse");
        match cli.command {
            Command::Send(args) => assert_eq!(args.action, Action::UpdatePaddle),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "pongsync",
            "send",
            "/tmp/pong.sock",
            "start",
            "--json",
            "{}",
            "--file",
            "settings.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn decode_defaults_to_two_paddles() {
        let cli = Cli::try_parse_from(["pongsync", "decode", "frame.bin"])
            .expect("decode args should parse");
        match cli.command {
            Command::Decode(args) => assert_eq!(args.paddles, 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
