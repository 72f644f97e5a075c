use crate::cooldown::CooldownParams;
use crate::frame_rate::DEFAULT_FPS_WINDOW;
use crate::gesture_classifier::{
    ClassifierParams, DEFAULT_FRAME_HEIGHT, DEFAULT_HISTORY_SIZE, DEFAULT_PINCH_THRESHOLD,
    DEFAULT_SWIPE_THRESHOLD, DEFAULT_VOLUME_RATIO,
};
use crate::logging::LogConfig;
use crate::media::{SinkKind, DEFAULT_VOLUME_STEPS};
use crate::smoothing::DEFAULT_SMOOTHING_WINDOW;
use crate::types::Gesture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown gesture in cooldown table: {0:?}")]
    UnknownGesture(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// Resolución con la que el detector entrega coordenadas normalizadas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub swipe_threshold: f32,
    pub pinch_threshold: f32,
    /// Fracción de `capture.height`
    pub volume_ratio: f32,
    pub history_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            volume_ratio: DEFAULT_VOLUME_RATIO,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub default_secs: f64,
    /// Segundos por gesto, con la clave en snake_case (`swipe_right`, `pinch`, ...).
    /// Solo sustituye las entradas que aparecen.
    pub gestures: BTreeMap<String, f64>,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        let params = CooldownParams::default();
        let gestures = params
            .intervals
            .iter()
            .map(|(g, d)| (g.as_str().to_string(), d.as_secs_f64()))
            .collect();
        Self {
            default_secs: params.default_interval.as_secs_f64(),
            gestures,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameRateConfig {
    pub window: usize,
}

impl Default for FrameRateConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_FPS_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub volume_steps: u32,
    pub sink: SinkKind,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            volume_steps: DEFAULT_VOLUME_STEPS,
            sink: SinkKind::Log,
        }
    }
}

/// Configuración completa. Todos los campos tienen valor por defecto,
/// así que un JSON parcial (o `{}`) es válido.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub smoothing: SmoothingConfig,
    pub classifier: ClassifierConfig,
    pub cooldown: CooldownConfig,
    pub frame_rate: FrameRateConfig,
    pub media: MediaConfig,
    pub logging: LogConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.capture.width > 0.0) {
            return Err(invalid("capture.width", "must be positive"));
        }
        if !(self.capture.height > 0.0) {
            return Err(invalid("capture.height", "must be positive"));
        }
        if self.smoothing.window == 0 {
            return Err(invalid("smoothing.window", "must be at least 1"));
        }
        if !(self.classifier.swipe_threshold > 0.0) {
            return Err(invalid("classifier.swipe_threshold", "must be positive"));
        }
        if !(self.classifier.pinch_threshold > 0.0) {
            return Err(invalid("classifier.pinch_threshold", "must be positive"));
        }
        if !(self.classifier.volume_ratio > 0.0) {
            return Err(invalid("classifier.volume_ratio", "must be positive"));
        }
        if self.classifier.history_size < 2 {
            return Err(invalid(
                "classifier.history_size",
                "a swipe needs at least 2 samples",
            ));
        }
        if self.frame_rate.window == 0 {
            return Err(invalid("frame_rate.window", "must be at least 1"));
        }
        // Valida la tabla de cooldowns
        self.cooldown_params()?;
        Ok(())
    }

    pub fn classifier_params(&self) -> ClassifierParams {
        ClassifierParams {
            swipe_threshold: self.classifier.swipe_threshold,
            pinch_threshold: self.classifier.pinch_threshold,
            volume_threshold: self.classifier.volume_ratio * self.capture.height,
            history_size: self.classifier.history_size,
        }
    }

    pub fn cooldown_params(&self) -> Result<CooldownParams, ConfigError> {
        let default_interval = secs_to_duration("cooldown.default_secs", self.cooldown.default_secs)?;
        // Las entradas del fichero se aplican sobre la tabla por defecto
        let mut intervals = CooldownParams::default().intervals;
        for (name, secs) in &self.cooldown.gestures {
            let gesture: Gesture = name
                .parse()
                .map_err(|_| ConfigError::UnknownGesture(name.clone()))?;
            intervals.insert(gesture, secs_to_duration("cooldown.gestures", *secs)?);
        }
        Ok(CooldownParams {
            default_interval,
            intervals,
        })
    }
}

/// Precisión de milisegundos: 0.3 s son exactamente 300 ms
fn secs_to_duration(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(invalid(field, format!("{} is not a valid number of seconds", secs)));
    }
    Ok(Duration::from_millis((secs * 1000.0).round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());

        let params = config.classifier_params();
        assert!((params.volume_threshold - 14.4).abs() < 1e-4);
        assert_eq!(params.history_size, 5);

        let cooldown = config.cooldown_params().unwrap();
        assert_eq!(cooldown, CooldownParams::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "capture": { "height": 720 },
                "classifier": { "pinch_threshold": 25 },
                "cooldown": { "gestures": { "pinch": 1.5 } },
                "media": { "sink": "log", "volume_steps": 3 }
            }"#,
        )
        .unwrap();

        let params = config.classifier_params();
        assert_eq!(params.pinch_threshold, 25.0);
        assert_eq!(params.swipe_threshold, 80.0);
        assert!((params.volume_threshold - 21.6).abs() < 1e-3);
        assert_eq!(config.capture.width, 640.0);
        assert_eq!(config.media.volume_steps, 3);

        let cooldown = config.cooldown_params().unwrap();
        assert_eq!(cooldown.interval_for(Gesture::Pinch), Duration::from_millis(1500));
        // El resto de la tabla conserva sus valores por defecto
        assert_eq!(cooldown.interval_for(Gesture::Fist), Duration::from_millis(1000));
        assert_eq!(cooldown.interval_for(Gesture::SwipeRight), Duration::from_millis(1000));
        assert_eq!(cooldown.interval_for(Gesture::VolumeUp), Duration::from_millis(300));
    }

    #[test]
    fn unknown_gesture_is_rejected() {
        let err = AppConfig::from_json(r#"{ "cooldown": { "gestures": { "wave": 1.0 } } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownGesture(name) if name == "wave"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "smoothing": { "window": 0 } }"#,
            r#"{ "classifier": { "swipe_threshold": -1 } }"#,
            r#"{ "classifier": { "history_size": 1 } }"#,
            r#"{ "cooldown": { "default_secs": -0.5 } }"#,
            r#"{ "capture": { "height": 0 } }"#,
        ] {
            assert!(
                matches!(AppConfig::from_json(json), Err(ConfigError::InvalidValue { .. })),
                "expected rejection for {}",
                json
            );
        }
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/quiromedia.json");
        let config = AppConfig::load(path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn unknown_section_is_a_json_error() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "camera": {} }"#),
            Err(ConfigError::JsonError(_))
        ));
    }
}
