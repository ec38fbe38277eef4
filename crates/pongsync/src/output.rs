use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pongsync_session::{BallState, DecodedFrame, PaddleRoster, PaddleState, SessionState};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SnapshotOutput<'a> {
    endpoint: &'a str,
    #[serde(flatten)]
    state: &'a SessionState,
    timestamp: String,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    ball: &'a BallState,
    paddles: &'a [PaddleState],
}

pub fn print_snapshot(state: &SessionState, endpoint: &str, format: OutputFormat) {
    let board = &state.snapshot.scoreboard;
    match format {
        OutputFormat::Json => {
            let out = SnapshotOutput {
                endpoint,
                state,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATUS", "SCORE", "DEUCE", "WINNER", "BALL", "ERROR"])
                .add_row(vec![
                    board.status.to_string(),
                    format!("{}-{}", board.left_score, board.right_score),
                    deuce_label(state).to_string(),
                    winner_label(board.winner),
                    ball_label(&state.snapshot.ball),
                    board.error.clone(),
                ]);
            println!("{table}");
            if !state.roster.is_empty() {
                println!("{}", roster_table(&state.roster));
            }
        }
        OutputFormat::Pretty => {
            println!(
                "status={} score={}-{} deuce={} winner={} ball={}{}",
                board.status,
                board.left_score,
                board.right_score,
                deuce_label(state),
                winner_label(board.winner),
                ball_label(&state.snapshot.ball),
                if board.error.is_empty() {
                    String::new()
                } else {
                    format!(" error={:?}", board.error)
                }
            );
            for paddle in &state.roster {
                println!("  {} {}", paddle.name, paddle_label(&paddle.state));
            }
        }
    }
}

pub fn print_frame(frame: &DecodedFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                ball: &frame.ball,
                paddles: &frame.paddles,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let ball = &frame.ball;
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["POSITION", "VELOCITY", "CURVE", "OUT", "BOUNCED"])
                .add_row(vec![
                    format!("({}, {})", ball.position.x, ball.position.y),
                    format!("({}, {})", ball.velocity.x, ball.velocity.y),
                    ball.curve.to_string(),
                    ball.is_out_of_bounds.to_string(),
                    ball.bounced_off_surface.to_string(),
                ]);
            println!("{table}");

            let mut paddles = Table::new();
            paddles
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "WIDTH", "HEIGHT", "POSITION", "SPEED"]);
            for (index, paddle) in frame.paddles.iter().enumerate() {
                paddles.add_row(vec![
                    index.to_string(),
                    paddle.width.to_string(),
                    paddle.height.to_string(),
                    paddle.position.to_string(),
                    paddle.speed.to_string(),
                ]);
            }
            println!("{paddles}");
        }
        OutputFormat::Pretty => {
            println!("ball={}", ball_label(&frame.ball));
            for (index, paddle) in frame.paddles.iter().enumerate() {
                println!("  paddle[{index}] {}", paddle_label(paddle));
            }
        }
    }
}

fn roster_table(roster: &PaddleRoster) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["PADDLE", "WIDTH", "HEIGHT", "POSITION", "SPEED"]);
    for paddle in roster {
        table.add_row(vec![
            paddle.name.clone(),
            paddle.state.width.to_string(),
            paddle.state.height.to_string(),
            paddle.state.position.to_string(),
            paddle.state.speed.to_string(),
        ]);
    }
    table
}

fn deuce_label(state: &SessionState) -> &'static str {
    let board = &state.snapshot.scoreboard;
    match (board.is_deuce, board.is_left_advantage, board.is_right_advantage) {
        (_, true, _) => "adv-left",
        (_, _, true) => "adv-right",
        (true, _, _) => "deuce",
        _ => "-",
    }
}

fn winner_label(winner: Option<i64>) -> String {
    winner.map_or_else(|| "-".to_string(), |w| w.to_string())
}

fn ball_label(ball: &BallState) -> String {
    format!(
        "({:.1}, {:.1}) v=({:.1}, {:.1}){}",
        ball.position.x,
        ball.position.y,
        ball.velocity.x,
        ball.velocity.y,
        if ball.is_out_of_bounds { " out" } else { "" }
    )
}

fn paddle_label(paddle: &PaddleState) -> String {
    format!(
        "pos={:.1} speed={:.1} size={}x{}",
        paddle.position, paddle.speed, paddle.width, paddle.height
    )
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
