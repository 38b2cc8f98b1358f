mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fireside_config::{Config, KeyringSecureStore};
use fireside_core::{FileStorage, KeyValueStorage, LocalCache, ReactiveStore, Session, SessionParts};

use crate::cli::{Cli, Command};
use crate::commands::Ctx;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fireside", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let config = fireside_config::load_config()?;
            let session = open_session(&config);
            let ctx = Ctx::new(config, &cli.global);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &session, &ctx).await
        }
    }
}

/// Wire the session to on-disk storage and the OS keychain, then load the
/// offline cache into memory. Credentials are restored per command.
fn open_session(config: &Config) -> Session {
    let dir = fireside_config::data_dir(config);
    tracing::debug!(dir = %dir.display(), "opening device storage");
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(dir));

    let session = Session::new(SessionParts {
        store: Arc::new(ReactiveStore::with_storage(Arc::clone(&storage))),
        cache: LocalCache::new(storage),
        secure_store: Arc::new(KeyringSecureStore::new()),
        transport: config.transport(),
    });
    session.hydrate_from_cache();
    session
}
