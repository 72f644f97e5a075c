use crate::rolling_window::RollingWindow;
use std::time::Instant;

pub const DEFAULT_FPS_WINDOW: usize = 30;

/// Estimación suavizada de FPS. Solo diagnóstico: no afecta a la clasificación.
#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    samples: RollingWindow<f32>,
    last_time: Option<Instant>,
}

impl FrameRateMonitor {
    /// Sin referencia: el primer frame solo fija el instante inicial
    pub fn new(window: usize) -> Self {
        Self {
            samples: RollingWindow::new(window),
            last_time: None,
        }
    }

    pub fn starting_at(window: usize, start: Instant) -> Self {
        Self {
            samples: RollingWindow::new(window),
            last_time: Some(start),
        }
    }

    pub fn update(&mut self) -> f32 {
        self.update_at(Instant::now())
    }

    /// Registra un frame en `now` y retorna la media de las tasas instantáneas.
    /// Un intervalo nulo se descarta; sin muestras retorna 0.
    pub fn update_at(&mut self, now: Instant) -> f32 {
        let Some(last) = self.last_time.replace(now) else {
            return self.fps();
        };
        let delta = now.saturating_duration_since(last).as_secs_f32();
        if delta > 0.0 {
            self.samples.push(1.0 / delta);
        }
        self.fps()
    }

    pub fn fps(&self) -> f32 {
        self.samples.mean().unwrap_or(0.0)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for FrameRateMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_FPS_WINDOW)
    }
}
