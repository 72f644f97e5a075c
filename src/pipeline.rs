use crate::config::{AppConfig, ConfigError};
use crate::cooldown::{CooldownParams, GestureCooldown};
use crate::frame_rate::{FrameRateMonitor, DEFAULT_FPS_WINDOW};
use crate::gesture_classifier::{ClassifierParams, ClassifierState, GestureClassifier};
use crate::media::{KeySink, MediaController, DEFAULT_VOLUME_STEPS};
use crate::smoothing::{HandSmoother, DEFAULT_SMOOTHING_WINDOW};
use crate::types::{Gesture, HandFrame};
use std::time::Instant;
use tracing::{info, warn};

/// Qué pasó con el gesto clasificado en este tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No hubo gesto (o no tiene acción asociada)
    Idle,
    /// Gesto clasificado pero dentro de su cooldown
    CoolingDown,
    /// Acción ejecutada; el cooldown empieza a contar
    Executed,
    /// La acción falló; el cooldown no se consume
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub gesture: Gesture,
    pub dispatch: Dispatch,
    pub hand_detected: bool,
    pub fps: f32,
}

/// Un tick completo: suavizado → clasificación → cooldown → acción.
/// El monitor de FPS corre en paralelo y no condiciona nada.
pub struct GesturePipeline<S: KeySink> {
    smoother: HandSmoother,
    classifier: GestureClassifier,
    cooldown: GestureCooldown,
    frame_rate: FrameRateMonitor,
    media: MediaController<S>,
}

impl<S: KeySink> GesturePipeline<S> {
    pub fn new(
        smoothing_window: usize,
        classifier: ClassifierParams,
        cooldown: CooldownParams,
        fps_window: usize,
        media: MediaController<S>,
    ) -> Self {
        Self {
            smoother: HandSmoother::new(smoothing_window),
            classifier: GestureClassifier::new(classifier),
            cooldown: GestureCooldown::new(cooldown),
            frame_rate: FrameRateMonitor::new(fps_window),
            media,
        }
    }

    pub fn with_defaults(sink: S) -> Self {
        Self::new(
            DEFAULT_SMOOTHING_WINDOW,
            ClassifierParams::default(),
            CooldownParams::default(),
            DEFAULT_FPS_WINDOW,
            MediaController::new(sink, DEFAULT_VOLUME_STEPS),
        )
    }

    pub fn from_config(config: &AppConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.smoothing.window,
            config.classifier_params(),
            config.cooldown_params()?,
            config.frame_rate.window,
            MediaController::new(sink, config.media.volume_steps),
        ))
    }

    pub fn process(&mut self, frame: Option<&HandFrame>) -> TickReport {
        self.process_at(frame, Instant::now())
    }

    /// Procesa un tick con un instante explícito (reproducción, tests)
    pub fn process_at(&mut self, frame: Option<&HandFrame>, now: Instant) -> TickReport {
        let fps = self.frame_rate.update_at(now);

        let smoothed = match frame {
            Some(raw) => Some(self.smoother.smooth(raw)),
            None => {
                self.smoother.reset();
                None
            }
        };

        let gesture = self.classifier.classify(smoothed.as_ref());
        let dispatch = self.dispatch(gesture, now);

        TickReport {
            gesture,
            dispatch,
            hand_detected: frame.is_some(),
            fps,
        }
    }

    fn dispatch(&mut self, gesture: Gesture, now: Instant) -> Dispatch {
        if gesture.is_none() {
            return Dispatch::Idle;
        }
        if !self.cooldown.can_trigger_at(gesture, now) {
            return Dispatch::CoolingDown;
        }

        match self.media.execute(gesture) {
            Ok(true) => {
                self.cooldown.trigger_at(gesture, now);
                info!(
                    gesture = %gesture,
                    status = %self.media.status(),
                    "{}",
                    gesture.display_name()
                );
                Dispatch::Executed
            }
            Ok(false) => Dispatch::Idle,
            Err(e) => {
                warn!(gesture = %gesture, error = %e, "no se pudo ejecutar la acción");
                Dispatch::Failed
            }
        }
    }

    pub fn classifier_state(&self) -> &ClassifierState {
        self.classifier.state()
    }

    pub fn cooldown(&self) -> &GestureCooldown {
        &self.cooldown
    }

    pub fn media(&self) -> &MediaController<S> {
        &self.media
    }

    pub fn fps(&self) -> f32 {
        self.frame_rate.fps()
    }
}
