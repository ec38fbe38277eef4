use std::fs;

use pongsync_session::decode;
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{decode_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = fs::read(&args.file)
        .map_err(|err| io_error(&format!("failed reading {}", args.file.display()), err))?;
    debug!(len = bytes.len(), paddles = args.paddles, "decoding frame");

    let frame = decode(&bytes, args.paddles).map_err(|err| decode_error("decode failed", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
