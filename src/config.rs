// Server configuration - command-line flags, each with an environment fallback

use clap::Parser;
use std::path::PathBuf;

/// Largest accepted request body (2 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "gymflow-server", version, about = "GymFlow gym-management backend")]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "GYMFLOW_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// JSON document holding every collection
    #[arg(long, env = "GYMFLOW_DATA_FILE", default_value = "data.json")]
    pub data_file: PathBuf,

    /// Prebuilt frontend; its index.html answers every unmatched route
    #[arg(long, env = "GYMFLOW_STATIC_ROOT", default_value = "gym-management-system/frontend")]
    pub static_root: PathBuf,

    /// Maximum request body size in bytes
    #[arg(long, env = "GYMFLOW_BODY_LIMIT", default_value_t = DEFAULT_BODY_LIMIT)]
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn index_file(&self) -> PathBuf {
        self.static_root.join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "gymflow-server",
            "--port",
            "8080",
            "--bind",
            "127.0.0.1",
            "--data-file",
            "/tmp/gym.json",
            "--static-root",
            "dist",
            "--body-limit",
            "1024",
        ])
        .unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.data_file, PathBuf::from("/tmp/gym.json"));
        assert_eq!(config.index_file(), PathBuf::from("dist/index.html"));
        assert_eq!(config.body_limit, 1024);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerConfig::try_parse_from(["gymflow-server", "--port", "not-a-port"]).is_err());
    }
}
