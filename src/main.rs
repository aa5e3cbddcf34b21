use arikitari::config::Config;
use arikitari::http::response::{Response, StatusCode};
use arikitari::server::{runtime, Listener};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    // Optional YAML config path; otherwise the environment.
    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };

    runtime::build(cfg.workers)?.block_on(serve(cfg))
}

async fn serve(cfg: Config) -> anyhow::Result<()> {
    let mut listener = Listener::bind_with_config(&cfg).await?;

    listener.get("/", |req| {
        Ok(Response::text(&req, StatusCode::Ok, "text/plain", "arikitari"))
    })?;

    listener.get_pattern(r"/user/(\d+)", |req, caps| {
        let id = caps.get(1).unwrap_or_default();
        Ok(Response::text(&req, StatusCode::Ok, "text/plain", format!("user {id}")))
    })?;

    let handle = listener.start()?;
    tracing::info!("http://{}", handle.local_addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    handle.shutdown().await?;
    Ok(())
}
