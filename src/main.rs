use greenmin_admin::cli::run_cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("greenmin_admin=info")),
        )
        .with_writer(std::io::stderr)
        .init();
    run_cli().await
}
