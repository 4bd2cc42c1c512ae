mod cli;

use std::{io, process::ExitCode, sync::Arc};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use mprisbar::{
    error::AppError,
    event_loop::EventLoop,
    ipc,
    media_listener::{MprisBackend, PlayerBackend},
};

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mprisbar=debug"
    } else {
        "mprisbar=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let result = match cli.send.as_deref() {
        Some(command) => send(&cli.socket, command).await,
        None => run(&cli).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn send(socket_name: &str, command: &str) -> Result<(), AppError> {
    let reply = ipc::send_command(socket_name, command).await?;
    print!("{reply}");
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = Arc::new(cli.to_config());

    let backend = Arc::new(MprisBackend::connect().await?);
    let listener = ipc::bind(&cli.socket)?;

    // subscribe before the initial enumeration so nothing slips between them
    let events = backend.subscribe().await?;
    let event_loop = EventLoop::start(backend, config, Box::new(io::stdout())).await?;

    event_loop.run(events, listener).await
}
