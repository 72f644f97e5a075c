use crate::types::{Finger, HandFrame, Handedness, Keypoint, Landmark, NUM_FINGERS};

/// Evita la división por cero en el cálculo de ángulos
const ANGLE_EPSILON: f32 = 1e-6;

/// Puntos rígidos de la palma: no se mueven al cerrar los dedos
const PALM_ANCHORS: [Landmark; 5] = [
    Landmark::Wrist,
    Landmark::IndexMcp,
    Landmark::MiddleMcp,
    Landmark::RingMcp,
    Landmark::PinkyMcp,
];

/// Estado extendido/recogido de cada dedo (pulgar, índice, medio, anular, meñique)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerStates([bool; NUM_FINGERS]);

impl FingerStates {
    pub fn new(states: [bool; NUM_FINGERS]) -> Self {
        Self(states)
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&s| s).count()
    }

    pub fn as_array(&self) -> [bool; NUM_FINGERS] {
        self.0
    }
}

/// Categoría de pose derivada de los dedos extendidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    Fist,
    OpenPalm,
    /// Pulgar + índice + medio arriba, anular + meñique abajo (modo volumen)
    ThreeFinger,
    Other,
}

impl HandPose {
    pub fn from_fingers(fingers: &FingerStates) -> Self {
        match fingers.as_array() {
            [false, false, false, false, false] => HandPose::Fist,
            [true, true, true, true, true] => HandPose::OpenPalm,
            [true, true, true, false, false] => HandPose::ThreeFinger,
            _ => HandPose::Other,
        }
    }
}

/// Vector de características de un frame. Efímero: no sobrevive al tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub fingers: FingerStates,
    pub pinch_distance: f32,
    pub palm_center: (f32, f32),
    pub wrist_y: f32,
    pub pose: HandPose,
    /// Ángulo en la articulación intermedia de cada dedo, en grados (solo diagnóstico)
    pub joint_angles: [f32; NUM_FINGERS],
}

impl FeatureVector {
    pub fn extended_count(&self) -> usize {
        self.fingers.count()
    }
}

/// Extrae todas las características de un frame suavizado
pub fn extract(frame: &HandFrame) -> FeatureVector {
    let fingers = finger_states(frame);
    FeatureVector {
        fingers,
        pinch_distance: pinch_distance(frame),
        palm_center: palm_center(frame),
        wrist_y: frame.keypoint(Landmark::Wrist).y,
        pose: HandPose::from_fingers(&fingers),
        joint_angles: Finger::ALL.map(|f| {
            joint_angle(
                frame.keypoint(f.mcp()),
                frame.keypoint(f.pip()),
                frame.keypoint(f.tip()),
            )
        }),
    }
}

/// Dedo largo extendido: punta por encima de PIP y PIP por encima de MCP
/// (imagen volteada, y menor = más arriba)
pub fn is_finger_extended(frame: &HandFrame, finger: Finger) -> bool {
    if finger == Finger::Thumb {
        return is_thumb_extended(frame);
    }
    let tip = frame.keypoint(finger.tip());
    let pip = frame.keypoint(finger.pip());
    let mcp = frame.keypoint(finger.mcp());
    tip.y < pip.y && pip.y < mcp.y
}

/// El pulgar abduce lateralmente; la dirección depende de la mano
pub fn is_thumb_extended(frame: &HandFrame) -> bool {
    let tip = frame.keypoint(Landmark::ThumbTip);
    let mcp = frame.keypoint(Landmark::ThumbMcp);
    match frame.handedness() {
        Handedness::Right => tip.x < mcp.x,
        Handedness::Left => tip.x > mcp.x,
    }
}

pub fn finger_states(frame: &HandFrame) -> FingerStates {
    FingerStates(Finger::ALL.map(|f| is_finger_extended(frame, f)))
}

/// Distancia euclídea (x, y) entre la punta del pulgar y la del índice
pub fn pinch_distance(frame: &HandFrame) -> f32 {
    distance(
        frame.keypoint(Landmark::ThumbTip).xy(),
        frame.keypoint(Landmark::IndexTip).xy(),
    )
}

/// Centroide (x, y) de la muñeca y las cuatro MCP
pub fn palm_center(frame: &HandFrame) -> (f32, f32) {
    let (sx, sy) = PALM_ANCHORS.iter().fold((0.0f32, 0.0f32), |(sx, sy), lm| {
        let p = frame.keypoint(*lm);
        (sx + p.x, sy + p.y)
    });
    let n = PALM_ANCHORS.len() as f32;
    (sx / n, sy / n)
}

pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Ángulo en grados en `vertex` formado por `a` y `c` (solo x, y).
/// Con vectores de longitud cero el coseno queda en 0 y el resultado es 90°.
pub fn joint_angle(a: Keypoint, vertex: Keypoint, c: Keypoint) -> f32 {
    let v1 = (a.x - vertex.x, a.y - vertex.y);
    let v2 = (c.x - vertex.x, c.y - vertex.y);
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let norms = (v1.0.hypot(v1.1)) * (v2.0.hypot(v2.1));
    let cos_angle = (dot / (norms + ANGLE_EPSILON)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}
