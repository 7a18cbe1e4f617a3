use clipshare_api::{setup, telemetry};
use clipshare_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    telemetry::init_telemetry();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, auth, routes)
    let (state, router) = setup::initialize_app(config.clone()).await?;

    // Background retention sweep; aborted implicitly on process exit
    let _sweeper = setup::start_retention_sweeper(&state);

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
