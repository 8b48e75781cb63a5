use log::debug;

use crate::error::EngineError;
use crate::{lerp, Vec2};

/// Linear blend between two layouts at `t` in `[0, 1]`.
pub fn interpolate_positions(from: &[Vec2], to: &[Vec2], t: f64) -> Result<Vec<Vec2>, EngineError> {
    if from.len() != to.len() {
        return Err(EngineError::ShapeMismatch {
            what: "transition target",
            expected: from.len(),
            actual: to.len(),
        });
    }
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    Ok(from.iter().zip(to).map(|(&a, &b)| lerp(a, b, t)).collect())
}

/// Handle for one requested transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Keeps overlapping transitions from fighting over the same layers.
///
/// Each `begin` supersedes every earlier ticket, so a renderer that checks
/// `is_current` before applying a frame only ever animates toward the most
/// recent target.
#[derive(Debug, Default)]
pub struct TransitionTracker {
    current: u64,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        if self.current > 0 {
            debug!("transition {} superseded", self.current);
        }
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }

    /// Aborts whatever transition is in flight.
    pub fn cancel(&mut self) {
        self.current += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_transition_wins() {
        let mut tracker = TransitionTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(first));
        let second = tracker.begin();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        tracker.cancel();
        assert!(!tracker.is_current(second));
    }

    #[test]
    fn interpolation_hits_endpoints() {
        let from = vec![[0.0, 0.0], [10.0, 10.0]];
        let to = vec![[10.0, 0.0], [0.0, 10.0]];
        assert_eq!(interpolate_positions(&from, &to, 0.0).unwrap(), from);
        assert_eq!(interpolate_positions(&from, &to, 1.0).unwrap(), to);
        assert_eq!(
            interpolate_positions(&from, &to, 0.5).unwrap(),
            vec![[5.0, 0.0], [5.0, 10.0]]
        );
        assert!(interpolate_positions(&from, &to[..1], 0.5).is_err());
    }
}
