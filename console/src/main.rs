//! `user-console` entry point: loads settings, picks a backend, and runs the
//! terminal session.

use std::ffi::OsString;
use std::io::{self, BufReader};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use user_console::config::{BackendKind, CliArgs, ConsoleSettings};
use user_console::domain::Api;
use user_console::domain::ports::ResourceApi;
use user_console::inbound::terminal::{ConsoleSession, TerminalPresenter};
use user_console::outbound::memory::InMemoryResourceApi;
use user_console::outbound::rest::RestResourceApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ConsoleSettings::load_from_iter([OsString::from("user-console")])
        .map_err(|err| eyre!("failed to load console settings: {err}"))?
        .with_overrides(args);

    let resources = build_backend(&settings)?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build console runtime")?;

    let terminal = Arc::new(TerminalPresenter::new(
        BufReader::new(io::stdin()),
        io::stdout(),
    ));
    let mut session = ConsoleSession::wire(
        Api::new(resources),
        terminal,
        settings.notification_duration(),
    );
    runtime
        .block_on(session.run())
        .wrap_err("console session failed")
}

fn build_backend(settings: &ConsoleSettings) -> Result<Arc<dyn ResourceApi>> {
    match settings.backend()? {
        BackendKind::Rest => {
            let base = settings.api_base_url()?;
            info!(%base, "using REST backend");
            let api = RestResourceApi::new(base, settings.request_timeout())
                .wrap_err("failed to build HTTP client")?;
            Ok(Arc::new(api))
        }
        BackendKind::Memory => {
            let api = match settings.seed_path.as_deref() {
                Some(path) => {
                    info!(path = %path.display(), "using seeded in-memory backend");
                    InMemoryResourceApi::from_seed_file(path)?
                }
                None => {
                    info!("using empty in-memory backend");
                    InMemoryResourceApi::new()
                }
            };
            Ok(Arc::new(api))
        }
    }
}
