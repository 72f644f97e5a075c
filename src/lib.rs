pub mod config;
pub mod cooldown;
pub mod csv_loader;
pub mod feature_extractor;
pub mod frame_rate;
pub mod gesture_classifier;
pub mod logging;
pub mod media;
pub mod pipeline;
pub mod rolling_window;
pub mod smoothing;
pub mod source;
pub mod types;

#[cfg(test)]
mod fixtures;
