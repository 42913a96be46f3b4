//! Bootstrap utilities for the order service binary.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the ORDER_SERVICE_LOG environment variable.
///
/// Defaults to "info" level if ORDER_SERVICE_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Config file path from `--config <path>` or `--config=<path>`.
pub fn parse_config_path() -> Option<String> {
    config_path_from_args(std::env::args().skip(1))
}

fn config_path_from_args<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Resolves when the process receives Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, never shut down on our own.
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_config_path_flag_forms() {
        assert_eq!(
            config_path_from_args(args(&["--config", "prod.yaml"])),
            Some("prod.yaml".to_string())
        );
        assert_eq!(
            config_path_from_args(args(&["--config=dev.yaml"])),
            Some("dev.yaml".to_string())
        );
        assert_eq!(
            config_path_from_args(args(&["-v", "-c", "x.yaml"])),
            Some("x.yaml".to_string())
        );
    }

    #[test]
    fn test_config_path_absent() {
        assert_eq!(config_path_from_args(args(&[])), None);
        assert_eq!(config_path_from_args(args(&["--config"])), None);
    }
}
