use firebolt_blocks::{Block, BlockRegistry, FireboltDatabase, config::Settings};
use mimalloc::MiMalloc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Settings::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let registry = BlockRegistry::with_firebolt_blocks()?;
    info!(
        blocks = ?registry.block_type_names().collect::<Vec<_>>(),
        "registered block types"
    );

    let db = cfg.database_block()?;
    info!(
        block = FireboltDatabase::BLOCK_TYPE_NAME,
        database = %db.database(),
        engine_name = ?db.engine_name(),
        engine_url = ?db.engine_url(),
        api_endpoint = %db.credentials().api_endpoint(),
        password = ?db.credentials().password(),
        token = ?db.credentials().token()
    );

    let statements: Vec<String> = std::env::args().skip(1).collect();
    if statements.is_empty() {
        warn!("no SQL statements given; only checking that a connection can be opened");
    }

    let conn = db.get_default_connection().await?;
    for sql in &statements {
        let result = conn.execute(sql).await?;
        info!(rows = result.rows, "statement finished");
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
