//! Command-line arguments
//!
//! 每个参数都可以用同名的环境变量代替，命令行优先。

use clap::Parser;

/// Shortener - deterministic URL shortener service
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "shortener")]
#[command(version)]
#[command(about = "A URL shortener service with HTTP and gRPC surfaces", long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config", env = "CONFIG")]
    pub config: Option<String>,

    /// HTTP listen address, e.g. localhost:8080
    #[arg(short = 'a', long = "server-address", env = "SERVER_ADDRESS")]
    pub server_address: Option<String>,

    /// Public base URL used to build short links
    #[arg(short = 'b', long = "base-url", env = "BASE_URL")]
    pub base_url: Option<String>,

    /// JSON-lines file used by the file storage backend
    #[arg(short = 'f', long = "file-storage-path", env = "FILE_STORAGE_PATH")]
    pub file_storage_path: Option<String>,

    /// Database DSN (postgres:// or sqlite://)
    #[arg(short = 'd', long = "database-dsn", env = "DATABASE_DSN")]
    pub database_dsn: Option<String>,

    /// CIDR allowed to read /api/internal/stats
    #[arg(short = 't', long = "trusted-subnet", env = "TRUSTED_SUBNET")]
    pub trusted_subnet: Option<String>,

    /// gRPC listen address (empty disables gRPC)
    #[arg(short = 'g', long = "grpc-address", env = "GRPC_ADDRESS")]
    pub grpc_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let args = CliArgs::try_parse_from([
            "shortener",
            "-a",
            "0.0.0.0:9090",
            "-b",
            "https://sho.rt",
            "-f",
            "/tmp/urls.json",
            "-t",
            "10.0.0.0/8",
        ])
        .unwrap();

        assert_eq!(args.server_address.as_deref(), Some("0.0.0.0:9090"));
        assert_eq!(args.base_url.as_deref(), Some("https://sho.rt"));
        assert_eq!(args.file_storage_path.as_deref(), Some("/tmp/urls.json"));
        assert_eq!(args.trusted_subnet.as_deref(), Some("10.0.0.0/8"));
    }

    #[test]
    fn test_parse_long_flags() {
        let args = CliArgs::try_parse_from([
            "shortener",
            "--config",
            "shortener.toml",
            "--database-dsn",
            "postgres://localhost/urls",
            "--grpc-address",
            "127.0.0.1:3200",
        ])
        .unwrap();

        assert_eq!(args.config.as_deref(), Some("shortener.toml"));
        assert_eq!(args.database_dsn.as_deref(), Some("postgres://localhost/urls"));
        assert_eq!(args.grpc_address.as_deref(), Some("127.0.0.1:3200"));
    }
}
