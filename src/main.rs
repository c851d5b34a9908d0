use std::net::SocketAddr;

use dotenvy::dotenv;
use tokio::task::JoinHandle;
use tracing::{error, info};

use syncgate::bootstrap::app_context::AppContext;
use syncgate::bootstrap::config::Config;
use syncgate::bootstrap::users::load_users;
use syncgate::presentation::http::{admin_app, public_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "syncgate=debug,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        api_port = cfg.api_port,
        admin_port = cfg.admin_port,
        keyspace = %cfg.keyspace(),
        policy = %cfg.policy.name,
        admin_auth = cfg.admin_user.is_some(),
        "Starting syncgate"
    );

    let users = match cfg.users_file.as_deref() {
        Some(path) => load_users(path)?,
        None => {
            tracing::warn!("USERS_FILE not set; only the admin listener is usable");
            Vec::new()
        }
    };
    info!(users = users.len(), "users_loaded");

    let ctx = AppContext::in_memory(cfg.clone(), users);

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    let admin_addr = SocketAddr::from(([127, 0, 0, 1], cfg.admin_port));
    let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
    let admin_listener = tokio::net::TcpListener::bind(admin_addr).await?;
    info!(%api_addr, "Public API listening");
    info!(%admin_addr, "Admin API listening");

    let public = public_app(ctx.clone());
    let admin = admin_app(ctx);

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(api_listener, public).await?;
        Ok(())
    });
    let admin_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(admin_listener, admin).await?;
        Ok(())
    });

    tokio::select! {
        res = api_handle => report("Public API", res),
        res = admin_handle => report("Admin API", res),
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
    }
    Ok(())
}

fn report(name: &str, res: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => info!(server = name, "server stopped"),
        Ok(Err(e)) => error!(?e, server = name, "server task failed"),
        Err(e) => error!(?e, server = name, "server task panicked"),
    }
}
