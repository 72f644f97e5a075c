use crate::types::Gesture;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(800);

/// Intervalos mínimos entre dos disparos del mismo gesto
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownParams {
    pub default_interval: Duration,
    pub intervals: HashMap<Gesture, Duration>,
}

impl CooldownParams {
    pub fn interval_for(&self, gesture: Gesture) -> Duration {
        self.intervals
            .get(&gesture)
            .copied()
            .unwrap_or(self.default_interval)
    }
}

impl Default for CooldownParams {
    fn default() -> Self {
        let intervals = [
            (Gesture::SwipeRight, Duration::from_millis(1000)),
            (Gesture::SwipeLeft, Duration::from_millis(1000)),
            (Gesture::Pinch, Duration::from_millis(800)),
            (Gesture::VolumeUp, Duration::from_millis(300)),
            (Gesture::VolumeDown, Duration::from_millis(300)),
            (Gesture::Fist, Duration::from_millis(1000)),
            (Gesture::OpenPalm, Duration::from_millis(1000)),
        ]
        .into_iter()
        .collect();

        Self {
            default_interval: DEFAULT_COOLDOWN,
            intervals,
        }
    }
}

/// Anti-rebote por gesto, independiente del estado del clasificador.
/// `can_trigger` solo lee; el llamador invoca `trigger` cuando la acción tuvo éxito.
#[derive(Debug, Clone, Default)]
pub struct GestureCooldown {
    params: CooldownParams,
    last_trigger: HashMap<Gesture, Instant>,
}

impl GestureCooldown {
    pub fn new(params: CooldownParams) -> Self {
        Self {
            params,
            last_trigger: HashMap::new(),
        }
    }

    pub fn can_trigger(&self, gesture: Gesture) -> bool {
        self.can_trigger_at(gesture, Instant::now())
    }

    /// Un gesto sin disparos previos siempre puede dispararse
    pub fn can_trigger_at(&self, gesture: Gesture, now: Instant) -> bool {
        match self.last_trigger.get(&gesture) {
            Some(&last) => {
                now.saturating_duration_since(last) >= self.params.interval_for(gesture)
            }
            None => true,
        }
    }

    pub fn trigger(&mut self, gesture: Gesture) {
        self.trigger_at(gesture, Instant::now());
    }

    pub fn trigger_at(&mut self, gesture: Gesture, now: Instant) {
        self.last_trigger.insert(gesture, now);
    }

    /// Borra un gesto concreto o, con `None`, todos
    pub fn reset(&mut self, gesture: Option<Gesture>) {
        match gesture {
            Some(g) => {
                self.last_trigger.remove(&g);
            }
            None => self.last_trigger.clear(),
        }
    }

    /// Tiempo restante hasta que el gesto vuelva a estar disponible
    pub fn remaining_at(&self, gesture: Gesture, now: Instant) -> Duration {
        self.last_trigger
            .get(&gesture)
            .map(|&last| {
                self.params
                    .interval_for(gesture)
                    .saturating_sub(now.saturating_duration_since(last))
            })
            .unwrap_or(Duration::ZERO)
    }

    pub fn params(&self) -> &CooldownParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_is_always_allowed() {
        let cooldown = GestureCooldown::default();
        for g in Gesture::ALL {
            assert!(cooldown.can_trigger(g));
        }
    }

    #[test]
    fn blocked_within_interval_allowed_after() {
        let mut cooldown = GestureCooldown::default();
        let t0 = Instant::now();
        cooldown.trigger_at(Gesture::Pinch, t0);

        assert!(!cooldown.can_trigger_at(Gesture::Pinch, t0));
        assert!(!cooldown.can_trigger_at(Gesture::Pinch, t0 + Duration::from_millis(799)));
        assert!(cooldown.can_trigger_at(Gesture::Pinch, t0 + Duration::from_millis(800)));
    }

    #[test]
    fn can_trigger_has_no_side_effect() {
        let mut cooldown = GestureCooldown::default();
        let t0 = Instant::now();
        assert!(cooldown.can_trigger_at(Gesture::Fist, t0));
        assert!(cooldown.can_trigger_at(Gesture::Fist, t0));
        cooldown.trigger_at(Gesture::Fist, t0);
        assert!(!cooldown.can_trigger_at(Gesture::Fist, t0 + Duration::from_millis(10)));
    }

    #[test]
    fn unrelated_labels_are_unaffected() {
        let mut cooldown = GestureCooldown::default();
        let t0 = Instant::now();
        cooldown.trigger_at(Gesture::SwipeRight, t0);
        assert!(cooldown.can_trigger_at(Gesture::SwipeLeft, t0));
        assert!(cooldown.can_trigger_at(Gesture::VolumeUp, t0));
    }

    #[test]
    fn per_gesture_intervals_and_default_fallback() {
        let params = CooldownParams::default();
        assert_eq!(params.interval_for(Gesture::VolumeUp), Duration::from_millis(300));
        assert_eq!(params.interval_for(Gesture::SwipeLeft), Duration::from_secs(1));
        assert_eq!(params.interval_for(Gesture::None), DEFAULT_COOLDOWN);

        let mut cooldown = GestureCooldown::new(params);
        let t0 = Instant::now();
        cooldown.trigger_at(Gesture::VolumeUp, t0);
        assert!(cooldown.can_trigger_at(Gesture::VolumeUp, t0 + Duration::from_millis(300)));
        assert_eq!(
            cooldown.remaining_at(Gesture::VolumeUp, t0 + Duration::from_millis(100)),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn reset_one_or_all() {
        let mut cooldown = GestureCooldown::default();
        let t0 = Instant::now();
        cooldown.trigger_at(Gesture::Pinch, t0);
        cooldown.trigger_at(Gesture::Fist, t0);

        cooldown.reset(Some(Gesture::Pinch));
        assert!(cooldown.can_trigger_at(Gesture::Pinch, t0));
        assert!(!cooldown.can_trigger_at(Gesture::Fist, t0));

        cooldown.reset(None);
        assert!(cooldown.can_trigger_at(Gesture::Fist, t0));
    }
}
