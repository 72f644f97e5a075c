//! Manos sintéticas para tests: geometría fija en píxeles, con la muñeca en `center`.

use crate::types::{HandFrame, Handedness, Keypoint, Landmark, NUM_LANDMARKS};

/// Desplazamientos x de las MCP (índice, medio, anular, meñique) respecto a la muñeca
const MCP_DX: [f32; 4] = [-30.0, -10.0, 10.0, 30.0];
const MCP_DY: f32 = -60.0;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HandBuilder {
    center: (f32, f32),
    fingers: [bool; 5],
    handedness: Handedness,
    pinching: bool,
}

impl HandBuilder {
    pub(crate) fn new(fingers: [bool; 5]) -> Self {
        Self {
            center: (320.0, 300.0),
            fingers,
            handedness: Handedness::Right,
            pinching: false,
        }
    }

    pub(crate) fn at(mut self, x: f32, y: f32) -> Self {
        self.center = (x, y);
        self
    }

    pub(crate) fn left(mut self) -> Self {
        self.handedness = Handedness::Left;
        self
    }

    /// Lleva la punta del pulgar junto a la punta del índice
    pub(crate) fn pinching(mut self) -> Self {
        self.pinching = true;
        self
    }

    pub(crate) fn build(&self) -> HandFrame {
        let (cx, cy) = self.center;
        // Espejo horizontal para la mano izquierda
        let side = match self.handedness {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        };
        let mut pts = [Keypoint::default(); NUM_LANDMARKS];
        let mut set = |lm: Landmark, dx: f32, dy: f32| {
            pts[lm.index()] = Keypoint::new(cx + side * dx, cy + dy, 0.0);
        };

        set(Landmark::Wrist, 0.0, 0.0);
        set(Landmark::ThumbCmc, -30.0, -20.0);
        set(Landmark::ThumbMcp, -45.0, -35.0);
        if self.fingers[0] {
            set(Landmark::ThumbIp, -65.0, -45.0);
            set(Landmark::ThumbTip, -85.0, -55.0);
        } else {
            set(Landmark::ThumbIp, -30.0, -15.0);
            set(Landmark::ThumbTip, 10.0, 5.0);
        }

        let chains = [
            [Landmark::IndexMcp, Landmark::IndexPip, Landmark::IndexDip, Landmark::IndexTip],
            [Landmark::MiddleMcp, Landmark::MiddlePip, Landmark::MiddleDip, Landmark::MiddleTip],
            [Landmark::RingMcp, Landmark::RingPip, Landmark::RingDip, Landmark::RingTip],
            [Landmark::PinkyMcp, Landmark::PinkyPip, Landmark::PinkyDip, Landmark::PinkyTip],
        ];
        for (i, chain) in chains.iter().enumerate() {
            let dx = MCP_DX[i];
            let dys = if self.fingers[i + 1] {
                [0.0, -30.0, -50.0, -70.0]
            } else {
                [0.0, -20.0, -5.0, 25.0]
            };
            for (lm, dy) in chain.iter().zip(dys) {
                set(*lm, dx, MCP_DY + dy);
            }
        }

        if self.pinching {
            let index_tip = pts[Landmark::IndexTip.index()];
            pts[Landmark::ThumbTip.index()] =
                Keypoint::new(index_tip.x + side * 5.0, index_tip.y + 5.0, 0.0);
        }

        HandFrame::new(pts, self.handedness, 0.9)
    }
}

pub(crate) fn open_palm() -> HandBuilder {
    HandBuilder::new([true; 5])
}

pub(crate) fn fist() -> HandBuilder {
    HandBuilder::new([false; 5])
}

/// Pulgar, índice y medio extendidos; anular y meñique recogidos
pub(crate) fn three_finger() -> HandBuilder {
    HandBuilder::new([true, true, true, false, false])
}

/// Solo el índice extendido: no coincide con ninguna pose fija
pub(crate) fn pointing() -> HandBuilder {
    HandBuilder::new([false, true, false, false, false])
}
