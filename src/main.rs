//! Fleet uplink simulator — binary entrypoint.
//! Restores the stored session (or logs in), opens the publish session, and
//! drives the simulated sources until ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleet_uplink::store::{SessionStore, StoredSession};
use fleet_uplink::{
    auth, Config, Credentials, Fleet, FleetConfig, PublishSink, RandomWalk, SimMode, SourceRunner,
    UplinkError, UplinkSession,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fleet_uplink=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Reuses the stored session when it has a usable credential pair,
/// otherwise logs in with BACKEND_USERNAME/BACKEND_PASSWORD and persists
/// the result.
async fn resolve_credentials(store: &SessionStore, login_url: &str) -> Result<Credentials> {
    let stored = store.load().await;
    if let Some(credentials) = stored.credentials() {
        info!(user_id = credentials.user_id, "restored stored session");
        return Ok(credentials);
    }

    let (Ok(username), Ok(password)) = (
        std::env::var("BACKEND_USERNAME"),
        std::env::var("BACKEND_PASSWORD"),
    ) else {
        return Err(UplinkError::MissingCredentials(
            "no stored session and no BACKEND_USERNAME/BACKEND_PASSWORD",
        )
        .into());
    };

    let login = auth::login(login_url, &username, &password)
        .await
        .context("login")?;
    info!(user = %login.full_name, role = %login.role, "logged in");

    let session = StoredSession::from_login(&login);
    if let Err(e) = store.save(&session).await {
        warn!("persist session: {e:#}");
    }
    session
        .credentials()
        .ok_or_else(|| UplinkError::MissingCredentials("login response incomplete").into())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::from_env();
    let store = SessionStore::new(&cfg.state_path);

    if std::env::args().nth(1).as_deref() == Some("logout") {
        store.clear().await.context("clear stored session")?;
        info!("stored session cleared");
        return Ok(());
    }

    let credentials = resolve_credentials(&store, &cfg.login_url).await?;
    let user_id = credentials.user_id;

    let session = Arc::new(UplinkSession::new(&cfg.ws_url, credentials));
    if let Err(e) = session.connect().await {
        error!(error = %e, "uplink handshake failed");
        return Err(e.into());
    }
    let sink: Arc<dyn PublishSink> = session.clone();

    match cfg.mode {
        SimMode::Single => {
            // One real-looking source publishing under the logged-in user.
            let walk = match cfg.seed {
                Some(seed) => RandomWalk::seeded(cfg.walk_policy(), seed),
                None => RandomWalk::new(cfg.walk_policy()),
            };
            let runner = SourceRunner::new(user_id, cfg.base, walk, sink, cfg.runner_config());
            runner.start();
            info!(user_id, "single-source simulation running; ctrl-c to stop");
            tokio::signal::ctrl_c().await.context("wait for ctrl-c")?;
            runner.stop();
        }
        SimMode::Fleet => {
            let fleet = Fleet::new(
                sink,
                FleetConfig {
                    size: cfg.fleet_size,
                    base: cfg.base,
                    spread: cfg.spread,
                    policy: cfg.walk_policy(),
                    runner: cfg.runner_config(),
                    seed: cfg.seed,
                },
            );
            fleet.start();
            info!(size = cfg.fleet_size, "fleet simulation running; ctrl-c to stop");
            tokio::signal::ctrl_c().await.context("wait for ctrl-c")?;
            fleet.stop();
        }
    }

    session.disconnect();
    Ok(())
}
