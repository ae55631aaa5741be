use dialogue_commands_core::config::{LogFormat, LoggingConfig};
use tracing::Level;

/// Installs the global `tracing` subscriber described by `config`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use dialogue_commands_core::config::{LogFormat, LoggingConfig};

    use super::init_logging;

    #[test]
    fn second_initialisation_is_harmless() {
        let config = LoggingConfig { level: "not-a-level".to_string(), format: LogFormat::Json };
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
