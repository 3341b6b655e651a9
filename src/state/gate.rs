//! Hysteresis gate: a gesture must hold for N consecutive cycles

use tracing::debug;

use super::window::Gesture;

/// Counts consecutive cycles of the same smoothed gesture
#[derive(Debug, Clone)]
pub struct StabilityGate {
    candidate: Option<Gesture>,
    consecutive: u32,
    threshold: u32,
}

impl StabilityGate {
    pub fn new(threshold: u32) -> Self {
        Self {
            candidate: None,
            consecutive: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feed this cycle's gesture. Returns the gesture when it has held for
    /// `threshold` cycles; the count then restarts from zero so a held
    /// gesture fires at most once per `threshold` cycles.
    pub fn observe(&mut self, gesture: Gesture) -> Option<Gesture> {
        if self.candidate.as_ref() == Some(&gesture) {
            self.consecutive += 1;
        } else {
            self.candidate = Some(gesture);
            self.consecutive = 1;
        }

        if self.consecutive < self.threshold {
            return None;
        }

        self.consecutive = 0;
        let fired = self.candidate.clone();
        if let Some(g) = &fired {
            debug!(gesture = %g, threshold = self.threshold, "stability gate fired");
        }
        fired
    }

    pub fn candidate(&self) -> Option<&Gesture> {
        self.candidate.as_ref()
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.candidate = None;
        self.consecutive = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(label: &str) -> Gesture {
        Gesture::Sign(label.into())
    }

    #[test]
    fn test_fires_at_threshold_only() {
        let mut gate = StabilityGate::new(3);
        assert_eq!(gate.observe(sign("A")), None);
        assert_eq!(gate.observe(sign("A")), None);
        assert_eq!(gate.observe(sign("A")), Some(sign("A")));
        assert_eq!(gate.consecutive(), 0);
    }

    #[test]
    fn test_held_gesture_refires_after_full_threshold() {
        let mut gate = StabilityGate::new(3);
        let fired: Vec<bool> = (0..9).map(|_| gate.observe(sign("A")).is_some()).collect();
        assert_eq!(
            fired,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_change_restarts_count() {
        let mut gate = StabilityGate::new(3);
        gate.observe(sign("A"));
        gate.observe(sign("A"));
        assert_eq!(gate.observe(sign("B")), None);
        assert_eq!(gate.consecutive(), 1);
        assert_eq!(gate.candidate(), Some(&sign("B")));
    }

    #[test]
    fn test_empty_counts_like_any_gesture() {
        let mut gate = StabilityGate::new(2);
        assert_eq!(gate.observe(Gesture::Empty), None);
        assert_eq!(gate.observe(Gesture::Empty), Some(Gesture::Empty));
    }

    #[test]
    fn test_threshold_of_one_fires_every_cycle() {
        let mut gate = StabilityGate::new(1);
        assert_eq!(gate.observe(sign("A")), Some(sign("A")));
        assert_eq!(gate.observe(sign("A")), Some(sign("A")));
    }

    #[test]
    fn test_reset() {
        let mut gate = StabilityGate::new(3);
        gate.observe(sign("A"));
        gate.reset();
        assert_eq!(gate.candidate(), None);
        assert_eq!(gate.consecutive(), 0);
    }
}
