//! Randomised model-overload simulation.
//!
//! Both the generation endpoint and the client-side unit of work roll this
//! die before doing any real work; a hit is reported as the
//! [`OVERLOAD_SENTINEL`](crate::generation::OVERLOAD_SENTINEL) condition.

use rand::Rng;

/// Chance of a simulated overload when nothing else is configured.
pub const DEFAULT_OVERLOAD_PROBABILITY: f64 = 0.2;

/// Decides, per attempt, whether to pretend the model is overloaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverloadSimulator {
    probability: f64,
}

impl OverloadSimulator {
    /// Create a simulator with the given probability, clamped to `0.0..=1.0`.
    /// Non-finite values disable the simulation.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { probability }
    }

    /// A simulator that never fires.
    pub fn disabled() -> Self {
        Self { probability: 0.0 }
    }

    /// A simulator that always fires.
    pub fn always() -> Self {
        Self { probability: 1.0 }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Roll once. Never touches the RNG when disabled.
    pub fn should_overload(&self) -> bool {
        if self.probability <= 0.0 {
            return false;
        }
        if self.probability >= 1.0 {
            return true;
        }
        rand::rng().random_bool(self.probability)
    }
}

impl Default for OverloadSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLOAD_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_never_fires() {
        let sim = OverloadSimulator::disabled();
        assert!((0..1_000).all(|_| !sim.should_overload()));
    }

    #[test]
    fn always_fires() {
        let sim = OverloadSimulator::always();
        assert!((0..1_000).all(|_| sim.should_overload()));
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(OverloadSimulator::new(3.0).probability(), 1.0);
        assert_eq!(OverloadSimulator::new(-1.0).probability(), 0.0);
        assert_eq!(OverloadSimulator::new(f64::NAN).probability(), 0.0);
        assert_eq!(OverloadSimulator::default().probability(), 0.2);
    }

    #[test]
    fn default_rate_is_roughly_one_in_five() {
        let sim = OverloadSimulator::default();
        let hits = (0..10_000).filter(|_| sim.should_overload()).count();
        // Loose bounds; this only guards against an inverted comparison.
        assert!((1_000..3_000).contains(&hits), "got {hits} hits");
    }
}
