use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub log_level: String,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            with_target: false,
        }
    }
}

/// Inicializa tracing hacia stderr. `RUST_LOG` tiene prioridad sobre `log_level`.
/// Llamarlo dos veces no es un error: el segundo intento se ignora.
pub fn init_tracing(config: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stderr_layer);

    // Falla solo si ya hay un subscriber global (tests, re-inicialización)
    let _ = registry.try_init();
}
