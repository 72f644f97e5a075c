//! Entrada JSON-lines desde el proceso detector.
//!
//! Una línea por frame de cámara: `null` si no hay mano, o
//! `{"landmarks": [[x, y, z], ...21], "handedness": "Right", "confidence": 0.93}`
//! con x, y normalizados a [0, 1]. Se escalan a píxeles con la resolución de captura.

use crate::types::{HandFrame, HandFrameError, Handedness, Keypoint};
use crossbeam_channel::Sender;
use serde::Deserialize;
use std::io::BufRead;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid hand frame: {0}")]
    FrameError(#[from] HandFrameError),
}

#[derive(Debug, Deserialize)]
struct RawHand {
    landmarks: Vec<[f32; 3]>,
    handedness: Handedness,
    #[serde(default = "full_confidence")]
    confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// Factor de escala de coordenadas normalizadas a píxeles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameScale {
    pub width: f32,
    pub height: f32,
}

/// Parsea una línea no vacía. `Ok(None)` significa "sin mano".
pub fn parse_line(line: &str, scale: FrameScale) -> Result<Option<HandFrame>, SourceError> {
    let raw: Option<RawHand> = serde_json::from_str(line)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let points: Vec<Keypoint> = raw
        .landmarks
        .iter()
        .map(|[x, y, z]| Keypoint::new(x * scale.width, y * scale.height, *z))
        .collect();
    let frame = HandFrame::from_slice(&points, raw.handedness, raw.confidence)?;
    Ok(Some(frame))
}

/// Lee frames hasta EOF y los envía por el canal.
/// Las líneas inválidas se registran y se descartan; retorna cuántos frames se enviaron.
pub fn read_frames<R: BufRead>(
    reader: R,
    scale: FrameScale,
    tx: &Sender<Option<HandFrame>>,
) -> Result<usize, SourceError> {
    let mut sent = 0;
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_line(trimmed, scale) {
            Ok(frame) => {
                if tx.send(frame).is_err() {
                    debug!("receptor cerrado, dejando de leer");
                    break;
                }
                sent += 1;
            }
            Err(e) => {
                warn!(line = line_idx + 1, error = %e, "línea descartada");
            }
        }
    }
    Ok(sent)
}
