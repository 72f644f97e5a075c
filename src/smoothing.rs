use crate::rolling_window::RollingWindow;
use crate::types::{HandFrame, Keypoint, NUM_LANDMARKS};

/// Ventana por defecto del filtro de media móvil
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Media móvil sobre las últimas N muestras (x, y) de un punto clave.
/// Mientras la ventana no se llena, promedia las muestras que haya.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    x_history: RollingWindow<f32>,
    y_history: RollingWindow<f32>,
}

impl MovingAverageFilter {
    pub fn new(window_size: usize) -> Self {
        Self {
            x_history: RollingWindow::new(window_size),
            y_history: RollingWindow::new(window_size),
        }
    }

    pub fn update(&mut self, x: f32, y: f32) -> (f32, f32) {
        self.x_history.push(x);
        self.y_history.push(y);

        // Nunca vacías tras el push
        let smoothed_x = self.x_history.mean().unwrap_or(x);
        let smoothed_y = self.y_history.mean().unwrap_or(y);
        (smoothed_x, smoothed_y)
    }

    pub fn reset(&mut self) {
        self.x_history.clear();
        self.y_history.clear();
    }

    pub fn len(&self) -> usize {
        self.x_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_history.is_empty()
    }
}

impl Default for MovingAverageFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

/// Un filtro por punto clave (21). Suaviza x/y; z, lateralidad y confianza pasan intactos.
#[derive(Debug, Clone)]
pub struct HandSmoother {
    filters: [MovingAverageFilter; NUM_LANDMARKS],
}

impl HandSmoother {
    pub fn new(window_size: usize) -> Self {
        Self {
            filters: std::array::from_fn(|_| MovingAverageFilter::new(window_size)),
        }
    }

    pub fn smooth(&mut self, frame: &HandFrame) -> HandFrame {
        let raw = frame.keypoints();
        let keypoints: [Keypoint; NUM_LANDMARKS] = std::array::from_fn(|i| {
            let (x, y) = self.filters[i].update(raw[i].x, raw[i].y);
            Keypoint::new(x, y, raw[i].z)
        });
        HandFrame::new(keypoints, frame.handedness(), frame.confidence())
    }

    /// Se llama cuando se pierde el seguimiento de la mano
    pub fn reset(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(|f| f.is_empty())
    }
}

impl Default for HandSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Handedness, Landmark};

    fn uniform_frame(x: f32, y: f32) -> HandFrame {
        HandFrame::new(
            [Keypoint::new(x, y, -0.1); NUM_LANDMARKS],
            Handedness::Right,
            0.8,
        )
    }

    #[test]
    fn partial_window_averages_available_samples() {
        let mut filter = MovingAverageFilter::new(5);
        assert_eq!(filter.update(10.0, 0.0), (10.0, 0.0));
        assert_eq!(filter.update(20.0, 4.0), (15.0, 2.0));
    }

    #[test]
    fn full_window_drops_oldest_sample() {
        let mut filter = MovingAverageFilter::new(3);
        filter.update(0.0, 0.0);
        filter.update(3.0, 3.0);
        filter.update(6.0, 6.0);
        // 0 expulsado: media de 3, 6, 9
        assert_eq!(filter.update(9.0, 9.0), (6.0, 6.0));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn reset_clears_history() {
        let mut filter = MovingAverageFilter::new(5);
        filter.update(100.0, 100.0);
        filter.reset();
        assert!(filter.is_empty());
        assert_eq!(filter.update(2.0, 4.0), (2.0, 4.0));
    }

    #[test]
    fn hand_smoother_filters_each_keypoint_independently() {
        let mut smoother = HandSmoother::new(2);
        smoother.smooth(&uniform_frame(0.0, 0.0));
        let out = smoother.smooth(&uniform_frame(10.0, 20.0));

        let wrist = out.keypoint(Landmark::Wrist);
        assert_eq!(wrist.xy(), (5.0, 10.0));
        assert_eq!(wrist.z, -0.1);
        assert_eq!(out.handedness(), Handedness::Right);
        assert_eq!(out.confidence(), 0.8);

        smoother.reset();
        assert!(smoother.is_empty());
    }
}
