use std::process::ExitCode;

use clap::Parser;
use student_agent::config::{AgentArgs, AgentConfig};
use student_agent::platform::platform_alert_sink;
use student_agent::provider::open_provider;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = AgentArgs::parse();
    init_tracing(&args.log_level);

    let config = match AgentConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let provider = match open_provider(&config.input) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, input = %config.input.display(), "cannot open landmark stream");
            return ExitCode::FAILURE;
        }
    };
    let alerts = platform_alert_sink(config.silent);

    tracing::info!(
        student_id = %config.student_id,
        name = %config.student_name,
        collector = %config.collector_url,
        "student agent started"
    );

    match student_agent::run(config, provider, alerts).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "student agent failed");
            ExitCode::FAILURE
        }
    }
}
