//! weather-now - current weather for your live location
//!
//! Runs the permission → location → weather pipeline on a single-threaded
//! runtime and prints one line per view change. Stdin drives the host
//! permission so revocation and re-grant can be tried live:
//!
//! ```sh
//! weather-now --weather-url https://weather-proxy.freecodecamp.rocks/api/current
//! > grant
//! > refresh
//! > deny
//! > quit
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=skycast_weather=debug,skycast_core=debug`
//! to see every dispatched action.

use std::process::ExitCode;

use clap::Parser;
use skycast_weather::config::{Args, PipelineConfig};
use skycast_weather::host::{render_view, Command};
use skycast_weather::permission::HostPermission;
use skycast_weather::pipeline::{Pipeline, PipelineHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast_weather=info,skycast_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(config))
}

async fn run(config: PipelineConfig) -> ExitCode {
    let permission = HostPermission::new(config.initial_permission);
    let capabilities = match config.capabilities(permission.clone()) {
        Ok(capabilities) => capabilities,
        Err(e) => {
            error!(error = %e, "failed to set up capabilities");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::new(capabilities);
    let handle = pipeline.handle();
    let mut views = pipeline.subscribe();
    let unit = config.unit;

    let printer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let line = render_view(&views.borrow_and_update(), unit);
            println!("{line}");
        }
    });
    let commands = tokio::spawn(read_commands(handle.clone(), permission));
    let interrupt = tokio::spawn({
        let handle = handle.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted");
                handle.stop();
            }
        }
    });

    let last = pipeline.run().await;
    commands.abort();
    interrupt.abort();
    // The view sender is gone, so the printer drains and exits
    let _ = printer.await;

    info!(status = %last.status, "session ended");
    ExitCode::SUCCESS
}

async fn read_commands(handle: PipelineHandle, permission: HostPermission) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // EOF: keep running until interrupted
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Permission(state)) => {
                info!(from = %permission.get(), to = %state, "permission changed by user");
                permission.set(state);
            }
            Ok(Command::Refresh) => {
                handle.refresh();
            }
            Ok(Command::Quit) => {
                handle.stop();
                return;
            }
            Err(message) => eprintln!("{message}"),
        }
    }
}
