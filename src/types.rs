use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Número de puntos clave de una mano (orden MediaPipe)
pub const NUM_LANDMARKS: usize = 21;

/// Número de dedos por mano
pub const NUM_FINGERS: usize = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandFrameError {
    #[error("Invalid keypoint count: expected {expected}, got {actual}")]
    KeypointCount { expected: usize, actual: usize },

    #[error("Unknown handedness: {0:?}")]
    UnknownHandedness(String),

    #[error("Unknown gesture: {0:?}")]
    UnknownGesture(String),
}

/// Un punto anatómico de la mano, en píxeles del frame (y crece hacia abajo)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Índices anatómicos fijos. El discriminante es la posición dentro del frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Landmark {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl Landmark {
    pub const ALL: [Landmark; NUM_LANDMARKS] = [
        Landmark::Wrist,
        Landmark::ThumbCmc,
        Landmark::ThumbMcp,
        Landmark::ThumbIp,
        Landmark::ThumbTip,
        Landmark::IndexMcp,
        Landmark::IndexPip,
        Landmark::IndexDip,
        Landmark::IndexTip,
        Landmark::MiddleMcp,
        Landmark::MiddlePip,
        Landmark::MiddleDip,
        Landmark::MiddleTip,
        Landmark::RingMcp,
        Landmark::RingPip,
        Landmark::RingDip,
        Landmark::RingTip,
        Landmark::PinkyMcp,
        Landmark::PinkyPip,
        Landmark::PinkyDip,
        Landmark::PinkyTip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// Dedos en el orden del vector de características: pulgar, índice, medio, anular, meñique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; NUM_FINGERS] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Articulación de la base (MCP)
    pub fn mcp(self) -> Landmark {
        match self {
            Finger::Thumb => Landmark::ThumbMcp,
            Finger::Index => Landmark::IndexMcp,
            Finger::Middle => Landmark::MiddleMcp,
            Finger::Ring => Landmark::RingMcp,
            Finger::Pinky => Landmark::PinkyMcp,
        }
    }

    /// Articulación intermedia (PIP; en el pulgar, IP)
    pub fn pip(self) -> Landmark {
        match self {
            Finger::Thumb => Landmark::ThumbIp,
            Finger::Index => Landmark::IndexPip,
            Finger::Middle => Landmark::MiddlePip,
            Finger::Ring => Landmark::RingPip,
            Finger::Pinky => Landmark::PinkyPip,
        }
    }

    pub fn tip(self) -> Landmark {
        match self {
            Finger::Thumb => Landmark::ThumbTip,
            Finger::Index => Landmark::IndexTip,
            Finger::Middle => Landmark::MiddleTip,
            Finger::Ring => Landmark::RingTip,
            Finger::Pinky => Landmark::PinkyTip,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl FromStr for Handedness {
    type Err = HandFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Handedness::Left),
            "right" | "r" => Ok(Handedness::Right),
            _ => Err(HandFrameError::UnknownHandedness(s.to_string())),
        }
    }
}

/// Una mano detectada en un tick: 21 puntos en orden fijo más metadatos.
/// La confianza se transporta pero el clasificador no la interpreta.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    keypoints: [Keypoint; NUM_LANDMARKS],
    handedness: Handedness,
    confidence: f32,
}

impl HandFrame {
    pub fn new(keypoints: [Keypoint; NUM_LANDMARKS], handedness: Handedness, confidence: f32) -> Self {
        Self {
            keypoints,
            handedness,
            confidence,
        }
    }

    /// Construye un frame desde una secuencia de longitud arbitraria.
    /// Falla si no hay exactamente 21 puntos.
    pub fn from_slice(
        points: &[Keypoint],
        handedness: Handedness,
        confidence: f32,
    ) -> Result<Self, HandFrameError> {
        let keypoints: [Keypoint; NUM_LANDMARKS] =
            points
                .try_into()
                .map_err(|_| HandFrameError::KeypointCount {
                    expected: NUM_LANDMARKS,
                    actual: points.len(),
                })?;
        Ok(Self::new(keypoints, handedness, confidence))
    }

    pub fn keypoint(&self, landmark: Landmark) -> Keypoint {
        self.keypoints[landmark.index()]
    }

    pub fn keypoints(&self) -> &[Keypoint; NUM_LANDMARKS] {
        &self.keypoints
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Vocabulario cerrado de gestos. `None` es un evento válido (no hubo gesto).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    #[default]
    None,
    SwipeRight,
    SwipeLeft,
    Pinch,
    VolumeUp,
    VolumeDown,
    Fist,
    OpenPalm,
}

impl Gesture {
    pub const ALL: [Gesture; 8] = [
        Gesture::None,
        Gesture::SwipeRight,
        Gesture::SwipeLeft,
        Gesture::Pinch,
        Gesture::VolumeUp,
        Gesture::VolumeDown,
        Gesture::Fist,
        Gesture::OpenPalm,
    ];

    /// Identificador estable usado en configuración y logs
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::None => "none",
            Gesture::SwipeRight => "swipe_right",
            Gesture::SwipeLeft => "swipe_left",
            Gesture::Pinch => "pinch",
            Gesture::VolumeUp => "volume_up",
            Gesture::VolumeDown => "volume_down",
            Gesture::Fist => "fist",
            Gesture::OpenPalm => "open_palm",
        }
    }

    /// Nombre legible para UI/logs
    pub fn display_name(self) -> &'static str {
        match self {
            Gesture::None => "None",
            Gesture::SwipeRight => "Swipe Right - Next Track",
            Gesture::SwipeLeft => "Swipe Left - Previous Track",
            Gesture::Pinch => "Pinch - Play/Pause",
            Gesture::VolumeUp => "Volume Up (3 Fingers + Move Up)",
            Gesture::VolumeDown => "Volume Down (3 Fingers + Move Down)",
            Gesture::Fist => "Fist - Mute",
            Gesture::OpenPalm => "Open Palm - Resume",
        }
    }

    pub fn is_none(self) -> bool {
        self == Gesture::None
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = HandFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| HandFrameError::UnknownGesture(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_indices_follow_mediapipe_order() {
        assert_eq!(Landmark::Wrist.index(), 0);
        assert_eq!(Landmark::ThumbTip.index(), 4);
        assert_eq!(Landmark::IndexMcp.index(), 5);
        assert_eq!(Landmark::MiddleMcp.index(), 9);
        assert_eq!(Landmark::RingMcp.index(), 13);
        assert_eq!(Landmark::PinkyTip.index(), 20);
        for (i, lm) in Landmark::ALL.iter().enumerate() {
            assert_eq!(lm.index(), i);
            assert_eq!(Landmark::from_index(i), Some(*lm));
        }
        assert_eq!(Landmark::from_index(21), None);
    }

    #[test]
    fn wrong_keypoint_count_is_rejected() {
        let points = vec![Keypoint::default(); 20];
        let err = HandFrame::from_slice(&points, Handedness::Right, 0.9).unwrap_err();
        assert_eq!(
            err,
            HandFrameError::KeypointCount {
                expected: 21,
                actual: 20
            }
        );

        let points = vec![Keypoint::default(); 22];
        assert!(HandFrame::from_slice(&points, Handedness::Right, 0.9).is_err());
    }

    #[test]
    fn frame_from_slice_keeps_order() {
        let points: Vec<Keypoint> = (0..21).map(|i| Keypoint::new(i as f32, 0.0, 0.0)).collect();
        let frame = HandFrame::from_slice(&points, Handedness::Left, 0.5).unwrap();
        assert_eq!(frame.keypoint(Landmark::PinkyMcp).x, 17.0);
        assert_eq!(frame.handedness(), Handedness::Left);
        assert_eq!(frame.confidence(), 0.5);
    }

    #[test]
    fn gesture_ids_round_trip_through_from_str() {
        for g in Gesture::ALL {
            assert_eq!(g.as_str().parse::<Gesture>().unwrap(), g);
        }
        assert!("wave".parse::<Gesture>().is_err());
        assert_eq!(Gesture::Pinch.display_name(), "Pinch - Play/Pause");
    }

    #[test]
    fn handedness_parsing_is_case_insensitive() {
        assert_eq!("Right".parse::<Handedness>().unwrap(), Handedness::Right);
        assert_eq!("left".parse::<Handedness>().unwrap(), Handedness::Left);
        assert!("both".parse::<Handedness>().is_err());
    }

    #[test]
    fn unknown_handedness_reports_original_input() {
        assert_eq!(
            " Both ".parse::<Handedness>().unwrap_err(),
            HandFrameError::UnknownHandedness(" Both ".to_string())
        );
    }
}
