//! berry: command-line access to oracle submission series.
//!
//! Submissions are stored in `$BERRY_DATA_DIR/berry.db`. Every command prints
//! one JSON object on stdout; logs go to stderr.

mod commands;
mod config;

use tracing::{error, info};

use crate::config::BerryConfig;

fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = BerryConfig::load()?;

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("berry={}", config.advanced.log_level).parse()?),
        )
        .init();

    // 3. Open database
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("berry.db");
    let conn = berry_db::open(&db_path)?;
    info!("Opened {:?}", db_path);

    // 4. Run the command
    let args: Vec<String> = std::env::args().skip(1).collect();
    match commands::dispatch(&conn, &config, &args) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}
