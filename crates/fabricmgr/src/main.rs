//! fabric - PCIe switch fabric management
//!
//! Entry point for the `fabric` command.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fabric_mrpc::CharDevice;
use fabricmgr::cli;
use fabricmgr::commands::dispatch;

/// Initializes tracing/logging subsystem
///
/// `RUST_LOG` takes precedence over the `-v` count.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

fn main() -> ExitCode {
    let args = match cli::parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli::parse_exit_code(&e));
        }
    };

    init_logging(args.verbose);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            return ExitCode::from(3);
        }
    };

    let code = rt.block_on(dispatch(
        args,
        CharDevice::open,
        &mut io::stdout(),
        &mut io::stderr(),
    ));

    // A device exchange abandoned by the timeout may still sit in a blocking
    // thread. Do not wait for it.
    rt.shutdown_background();
    ExitCode::from(code)
}
