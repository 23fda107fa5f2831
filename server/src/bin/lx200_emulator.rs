// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::time::Duration;

use canonical_error::{CanonicalError, invalid_argument_error};
use log::{error, info, warn};
use pico_args::Arguments;
use tracing_appender::non_blocking::NonBlockingBuilder;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};

use lx200_emulator::command_framer::FramingMode;
use lx200_emulator::lx200_server::{create_lx200_server, ServerConfig,
                                   DEFAULT_PORT};
use lx200_emulator::lx200_session::SessionConfig;

const HELP: &str = "\
Emulates an LX200/Autostar handset on a TCP port.

USAGE:
  lx200-emulator [PORT] [OPTIONS]

FLAGS:
  -h, --help                     Prints help information
  --buffer_partial_commands      Keep an unterminated command for the next read

OPTIONS:
  --port NUMBER                  4030
  --chunk_size NUMBER            16
  --chunk_delay_ms NUMBER        0
  --idle_ms NUMBER               200
  --log_dir <path>               .
  --log_file <file>              lx200_log.txt
";

#[derive(Debug)]
struct AppArgs {
    server: ServerConfig,
    log_dir: String,
    log_file: String,
}

fn arg_error(e: pico_args::Error) -> CanonicalError {
    invalid_argument_error(format!("{}", e).as_str())
}

fn parse_args(pargs: &mut Arguments) -> Result<AppArgs, CanonicalError> {
    let flag_port: Option<u16> =
        pargs.opt_value_from_str("--port").map_err(arg_error)?;
    let chunk_size: usize = pargs.opt_value_from_str("--chunk_size")
        .map_err(arg_error)?.unwrap_or(16);
    let chunk_delay_ms: u64 = pargs.opt_value_from_str("--chunk_delay_ms")
        .map_err(arg_error)?.unwrap_or(0);
    let idle_ms: u64 = pargs.opt_value_from_str("--idle_ms")
        .map_err(arg_error)?.unwrap_or(200);
    let framing_mode = if pargs.contains("--buffer_partial_commands") {
        FramingMode::Buffered
    } else {
        FramingMode::Legacy
    };
    let log_dir: String = pargs.opt_value_from_str("--log_dir")
        .map_err(arg_error)?.unwrap_or(".".to_string());
    let log_file: String = pargs.opt_value_from_str("--log_file")
        .map_err(arg_error)?.unwrap_or("lx200_log.txt".to_string());
    // The port may also be given on its own, as the original script took it.
    let free_port: Option<u16> = pargs.opt_free_from_str().map_err(arg_error)?;
    let port = match (flag_port, free_port) {
        (Some(a), Some(b)) if a != b => {
            return Err(invalid_argument_error(
                format!("conflicting ports {} and {}", a, b).as_str()));
        }
        (Some(p), _) | (None, Some(p)) => p,
        (None, None) => DEFAULT_PORT,
    };

    let session = SessionConfig::new(chunk_size,
                                     Duration::from_millis(chunk_delay_ms),
                                     Duration::from_millis(idle_ms),
                                     framing_mode)?;
    Ok(AppArgs {
        server: ServerConfig { port, session },
        log_dir,
        log_file,
    })
}

fn main() {
    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        println!("{}", HELP);
        std::process::exit(0);
    }
    let args = match parse_args(&mut pargs) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Invalid arguments: {:?}\n\n{}", e, HELP);
            std::process::exit(1);
        }
    };

    // Set up logging.
    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&args.log_file)
        .max_log_files(10)
        .build(&args.log_dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Could not create log file in {}: {}", args.log_dir, e);
            std::process::exit(1);
        }
    };

    // Create non-blocking writers for both the file and stdout
    let (non_blocking_file, _guard1) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(file_appender);
    let (non_blocking_stdout, _guard2) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stdout());
    registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(non_blocking_stdout))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking_file))
        .init();

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unrecognized arguments: {:?}", remaining);
    }

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Got control-c");
        std::thread::sleep(Duration::from_millis(100));
        info!("Exiting");
        std::process::exit(-1);
    }) {
        warn!("Could not install control-c handler: {}", e);
    }

    info!("Starting with {:?}", args.server);
    async_main(args);
}

#[tokio::main]
async fn async_main(args: AppArgs) {
    let mut server = create_lx200_server(args.server);
    if let Err(e) = server.serve_requests().await {
        error!("LX200 server failed: {}", e);
        std::process::exit(1);
    }
}
