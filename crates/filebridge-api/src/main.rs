use filebridge_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, services, routes)
    let (state, router) = filebridge_api::setup::initialize_app(config.clone()).await?;

    let cleanup = state.cleanup.clone().start();

    // Start the server
    let served = filebridge_api::setup::server::start_server(&config, router).await;

    cleanup.abort();
    tracing::info!("Token cleanup stopped");

    served
}
