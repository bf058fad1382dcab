use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("display name must not be empty")]
    EmptyName,
    #[error("collector host must not be empty")]
    EmptyHost,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("fps {0} is out of range")]
    InvalidFps(f64),
}

/// Student attention agent
#[derive(Debug, Clone, Parser)]
#[command(name = "student-agent", version, about = "Reports classroom attention signals to a collector")]
pub struct AgentArgs {
    /// Collector host or IP (e.g. 10.84.87.149)
    #[arg(long, env = "COLLECTOR_HOST")]
    pub host: String,

    /// Collector port
    #[arg(long, env = "COLLECTOR_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Display name shown on the dashboard
    #[arg(long, env = "STUDENT_NAME")]
    pub name: String,

    /// NDJSON landmark stream (use - for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Replay pace in frames per second; 0 processes frames as fast as they arrive
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,

    /// Seconds between reports
    #[arg(long, default_value_t = 10)]
    pub report_interval_secs: u64,

    /// Per-report delivery timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub send_timeout_ms: u64,

    /// Minimum seconds between local alerts
    #[arg(long, default_value_t = 5)]
    pub alert_cooldown_secs: u64,

    /// Log alerts instead of playing them
    #[arg(long)]
    pub silent: bool,

    /// Log filter (overrides RUST_LOG)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub student_id: String,
    pub student_name: String,
    pub collector_url: String,
    pub report_interval: Duration,
    pub send_timeout: Duration,
    pub alert_cooldown: Duration,
    pub frame_interval: Option<Duration>,
    pub input: PathBuf,
    pub silent: bool,
}

/// Short participant identifier, fixed for the lifetime of the process.
pub fn generate_student_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn update_url(host: &str, port: u16) -> String {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("http://[{host}]:{port}/update")
    } else {
        format!("http://{host}:{port}/update")
    }
}

impl AgentConfig {
    pub fn from_args(args: AgentArgs) -> Result<Self, ConfigError> {
        let name = args.name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let host = args.host.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if args.report_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("report interval"));
        }
        if args.send_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("send timeout"));
        }

        let frame_interval = if args.fps.is_finite() && args.fps > 0.0 {
            let interval = Duration::try_from_secs_f64(1.0 / args.fps)
                .map_err(|_| ConfigError::InvalidFps(args.fps))?;
            Some(interval)
        } else {
            None
        };

        Ok(Self {
            student_id: generate_student_id(),
            student_name: name.to_string(),
            collector_url: update_url(host, args.port),
            report_interval: Duration::from_secs(args.report_interval_secs),
            send_timeout: Duration::from_millis(args.send_timeout_ms),
            alert_cooldown: Duration::from_secs(args.alert_cooldown_secs),
            frame_interval,
            input: args.input,
            silent: args.silent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> AgentArgs {
        let mut argv = vec!["student-agent", "--host", "10.0.0.5", "--name", " Ada "];
        argv.extend_from_slice(extra);
        AgentArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::from_args(parse(&[])).unwrap();
        assert_eq!(config.collector_url, "http://10.0.0.5:8000/update");
        assert_eq!(config.student_name, "Ada");
        assert_eq!(config.report_interval, Duration::from_secs(10));
        assert_eq!(config.send_timeout, Duration::from_secs(1));
        assert_eq!(config.alert_cooldown, Duration::from_secs(5));
        assert_eq!(config.student_id.len(), 8);
    }

    #[test]
    fn test_zero_fps_disables_pacing() {
        let config = AgentConfig::from_args(parse(&["--fps", "0"])).unwrap();
        assert!(config.frame_interval.is_none());
    }

    #[test]
    fn test_vanishing_fps_rejected() {
        let result = AgentConfig::from_args(parse(&["--fps", "1e-20"]));
        assert!(matches!(result, Err(ConfigError::InvalidFps(_))));
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let args = AgentArgs::parse_from(["student-agent", "--host", "fe80::1", "--name", "Ada"]);
        let config = AgentConfig::from_args(args).unwrap();
        assert_eq!(config.collector_url, "http://[fe80::1]:8000/update");
    }

    #[test]
    fn test_blank_name_rejected() {
        let args = AgentArgs::parse_from(["student-agent", "--host", "h", "--name", "  "]);
        assert!(matches!(AgentConfig::from_args(args), Err(ConfigError::EmptyName)));
    }

    #[test]
    fn test_ids_differ_between_runs() {
        assert_ne!(generate_student_id(), generate_student_id());
    }
}
