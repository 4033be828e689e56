use clap::Parser;

use shortener::config::{AppConfig, CliArgs, init_config};
use shortener::errors::ShortenerError;
use shortener::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();

    let config = match AppConfig::load(&args) {
        Ok(config) => init_config(config),
        Err(e) => {
            let err = ShortenerError::internal(format!("Failed to load configuration: {}", e));
            eprintln!("{}", err.format_colored());
            std::process::exit(1);
        }
    };

    // 必须持有 guard，否则非阻塞日志会丢失
    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    #[cfg(feature = "server")]
    if let Err(e) = shortener::runtime::modes::run_server(config).await {
        tracing::error!("Server exited with error: {:#}", e);
        eprintln!("{}", ShortenerError::internal(format!("{:#}", e)).format_colored());
        return Err(e);
    }

    Ok(())
}
