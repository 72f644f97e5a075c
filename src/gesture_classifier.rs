use crate::feature_extractor::{self, FeatureVector, HandPose};
use crate::rolling_window::RollingWindow;
use crate::types::{Gesture, HandFrame};
use tracing::{debug, trace};

pub const DEFAULT_SWIPE_THRESHOLD: f32 = 80.0;
pub const DEFAULT_PINCH_THRESHOLD: f32 = 40.0;
/// Umbral de volumen como fracción de la altura del frame
pub const DEFAULT_VOLUME_RATIO: f32 = 0.03;
pub const DEFAULT_FRAME_HEIGHT: f32 = 480.0;
pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// Umbrales del clasificador, en píxeles del frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    /// Desplazamiento horizontal mínimo del centro de la palma para un swipe
    pub swipe_threshold: f32,
    /// Distancia pulgar-índice por debajo de la cual hay pinza
    pub pinch_threshold: f32,
    /// Desplazamiento vertical de la muñeca para subir/bajar volumen
    pub volume_threshold: f32,
    /// Capacidad del historial de centros de palma
    pub history_size: usize,
}

impl ClassifierParams {
    /// Parámetros por defecto con el umbral de volumen escalado a `frame_height`
    pub fn for_frame_height(frame_height: f32) -> Self {
        Self {
            volume_threshold: DEFAULT_VOLUME_RATIO * frame_height,
            ..Self::default()
        }
    }
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            volume_threshold: DEFAULT_VOLUME_RATIO * DEFAULT_FRAME_HEIGHT,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// Estado que sobrevive entre frames. Solo se borra cuando no hay mano.
#[derive(Debug, Clone)]
pub struct ClassifierState {
    palm_history: RollingWindow<(f32, f32)>,
    was_pinching: bool,
    last_wrist_y: Option<f32>,
}

impl ClassifierState {
    pub fn new(history_size: usize) -> Self {
        Self {
            palm_history: RollingWindow::new(history_size),
            was_pinching: false,
            last_wrist_y: None,
        }
    }

    pub fn reset(&mut self) {
        self.palm_history.clear();
        self.was_pinching = false;
        self.last_wrist_y = None;
    }

    pub fn palm_history(&self) -> &RollingWindow<(f32, f32)> {
        &self.palm_history
    }

    pub fn was_pinching(&self) -> bool {
        self.was_pinching
    }

    /// Referencia de la muñeca mientras se sigue un gesto de volumen
    pub fn last_wrist_y(&self) -> Option<f32> {
        self.last_wrist_y
    }

    pub fn is_clear(&self) -> bool {
        self.palm_history.is_empty() && !self.was_pinching && self.last_wrist_y.is_none()
    }
}

/// Resultado de evaluar una regla sobre un frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// La regla dispara un gesto
    Fire(Gesture),
    /// La regla se queda con el frame sin disparar (emite None)
    Hold,
    /// La regla no aplica; se evalúa la siguiente
    Pass,
}

/// Reglas del clasificador. `ORDER` es la prioridad: gana la primera que no pasa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Volume,
    Pinch,
    Fist,
    OpenPalm,
    Swipe,
}

impl Rule {
    pub const ORDER: [Rule; 5] = [
        Rule::Volume,
        Rule::Pinch,
        Rule::Fist,
        Rule::OpenPalm,
        Rule::Swipe,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Volume => "volume",
            Rule::Pinch => "pinch",
            Rule::Fist => "fist",
            Rule::OpenPalm => "open_palm",
            Rule::Swipe => "swipe",
        }
    }

    pub fn apply(
        self,
        features: &FeatureVector,
        state: &mut ClassifierState,
        params: &ClassifierParams,
    ) -> RuleOutcome {
        match self {
            Rule::Volume => volume_rule(features, state, params),
            Rule::Pinch => pinch_rule(features, state, params),
            Rule::Fist => {
                if features.extended_count() == 0 {
                    RuleOutcome::Fire(Gesture::Fist)
                } else {
                    RuleOutcome::Pass
                }
            }
            Rule::OpenPalm => {
                if features.extended_count() == 5 {
                    RuleOutcome::Fire(Gesture::OpenPalm)
                } else {
                    RuleOutcome::Pass
                }
            }
            Rule::Swipe => swipe_rule(features, state, params),
        }
    }
}

/// Tres dedos + movimiento vertical de la muñeca.
/// La referencia solo avanza al disparar: las derivas pequeñas se acumulan.
fn volume_rule(
    features: &FeatureVector,
    state: &mut ClassifierState,
    params: &ClassifierParams,
) -> RuleOutcome {
    if features.pose != HandPose::ThreeFinger {
        state.last_wrist_y = None;
        return RuleOutcome::Pass;
    }

    let current_y = features.wrist_y;
    let Some(last_y) = state.last_wrist_y else {
        // Primer frame en la pose: solo arma el seguimiento
        state.last_wrist_y = Some(current_y);
        return RuleOutcome::Hold;
    };

    // y menor = más arriba
    let delta_y = current_y - last_y;
    if delta_y < -params.volume_threshold {
        state.last_wrist_y = Some(current_y);
        RuleOutcome::Fire(Gesture::VolumeUp)
    } else if delta_y > params.volume_threshold {
        state.last_wrist_y = Some(current_y);
        RuleOutcome::Fire(Gesture::VolumeDown)
    } else {
        RuleOutcome::Hold
    }
}

/// Pinza por flanco de subida: no se repite mientras se mantiene
fn pinch_rule(
    features: &FeatureVector,
    state: &mut ClassifierState,
    params: &ClassifierParams,
) -> RuleOutcome {
    let is_pinching = features.pinch_distance < params.pinch_threshold;
    if !is_pinching {
        state.was_pinching = false;
        return RuleOutcome::Pass;
    }
    if state.was_pinching {
        return RuleOutcome::Pass;
    }
    state.was_pinching = true;
    RuleOutcome::Fire(Gesture::Pinch)
}

/// Compara el primer y el último centro de palma del historial.
/// Por debajo del umbral el historial no se vacía: la ventana sigue deslizando.
fn swipe_rule(
    features: &FeatureVector,
    state: &mut ClassifierState,
    params: &ClassifierParams,
) -> RuleOutcome {
    state.palm_history.push(features.palm_center);
    if !state.palm_history.is_full() {
        return RuleOutcome::Pass;
    }

    let (Some(&(start_x, _)), Some(&(end_x, _))) =
        (state.palm_history.first(), state.palm_history.last())
    else {
        return RuleOutcome::Pass;
    };

    let delta_x = end_x - start_x;
    if delta_x.abs() > params.swipe_threshold {
        state.palm_history.clear();
        if delta_x > 0.0 {
            RuleOutcome::Fire(Gesture::SwipeRight)
        } else {
            RuleOutcome::Fire(Gesture::SwipeLeft)
        }
    } else {
        RuleOutcome::Pass
    }
}

/// Clasificador temporal por reglas con prioridad fija.
/// Produce exactamente un `Gesture` (posiblemente `None`) por llamada.
pub struct GestureClassifier {
    params: ClassifierParams,
    state: ClassifierState,
}

impl GestureClassifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self {
            state: ClassifierState::new(params.history_size),
            params,
        }
    }

    /// `None` como entrada significa que no se detectó mano: borra todo el estado
    pub fn classify(&mut self, frame: Option<&HandFrame>) -> Gesture {
        let Some(frame) = frame else {
            if !self.state.is_clear() {
                trace!("mano perdida, estado del clasificador reiniciado");
            }
            self.state.reset();
            return Gesture::None;
        };

        let features = feature_extractor::extract(frame);
        self.classify_features(&features)
    }

    /// Evalúa las reglas en orden sobre un vector ya extraído
    pub fn classify_features(&mut self, features: &FeatureVector) -> Gesture {
        for rule in Rule::ORDER {
            match rule.apply(features, &mut self.state, &self.params) {
                RuleOutcome::Fire(gesture) => {
                    debug!(rule = rule.as_str(), gesture = %gesture, "gesto clasificado");
                    return gesture;
                }
                RuleOutcome::Hold => return Gesture::None,
                RuleOutcome::Pass => {}
            }
        }
        Gesture::None
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierParams::default())
    }
}
