use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_IDLE_EVICTION_SECS: u64 = 15;
const DEFAULT_DASHBOARD_PATH: &str = "dashboard/index.html";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Participants silent for longer than this move to history. Reports
    /// arrive every 10 s, so the default leaves room for one late report.
    pub idle_eviction: Duration,
    pub dashboard_path: PathBuf,
    /// Directory for rolling log files; `None` keeps logs on stdout only.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            idle_eviction: Duration::from_secs(DEFAULT_IDLE_EVICTION_SECS),
            dashboard_path: PathBuf::from(DEFAULT_DASHBOARD_PATH),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let idle_eviction = std::env::var("IDLE_EVICTION_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.idle_eviction);

        let dashboard_path = std::env::var("DASHBOARD_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.dashboard_path);

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs.then(|| {
            std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs"))
        });

        Self {
            host,
            port,
            log_level,
            idle_eviction,
            dashboard_path,
            log_dir,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.idle_eviction, Duration::from_secs(15));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8000");
    }
}
