use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::spatial::KDTree;
use crate::{distance, lerp, Vec2};

/// Inverse-distance-weighted displacement field defined by control points.
///
/// A query point moves by the weighted average of the control
/// displacements, each weighted `1 / d^power`. Queries within the snap
/// radius of a control point land exactly on that control's target. The
/// warp is a plain per-point function, so it can be dropped into any
/// streaming geometry pipeline without building a mesh.
#[derive(Debug, Clone)]
pub struct Warp {
    originals: Vec<Vec2>,
    targets: Vec<Vec2>,
    power: f64,
    snap_radius: f64,
    index: KDTree,
}

impl Warp {
    pub fn new(
        originals: &[Vec2],
        targets: &[Vec2],
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        if originals.len() != targets.len() {
            return Err(EngineError::ShapeMismatch {
                what: "control targets",
                expected: originals.len(),
                actual: targets.len(),
            });
        }
        Ok(Warp {
            originals: originals.to_vec(),
            targets: targets.to_vec(),
            power: config.idw_power,
            snap_radius: config.snap_radius,
            index: KDTree::build(originals),
        })
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Fully deformed position of `p`.
    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.apply_at(p, 1.0)
    }

    /// Position of `p` at fraction `t` of the way from undeformed (0) to
    /// fully deformed (1). `t` is clamped into `[0, 1]`.
    pub fn apply_at(&self, p: Vec2, t: f64) -> Vec2 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
        if let Some(i) = self.snapped(p) {
            let target = self.targets[i];
            return if t >= 1.0 { target } else { lerp(p, target, t) };
        }
        let d = self.weighted_displacement(p);
        [p[0] + d[0] * t, p[1] + d[1] * t]
    }

    pub fn apply_all(&self, points: &[Vec2], t: f64) -> Vec<Vec2> {
        points.iter().map(|&p| self.apply_at(p, t)).collect()
    }

    /// Adapter for pipelines that take a point-transform closure.
    pub fn as_fn(&self, t: f64) -> impl Fn(Vec2) -> Vec2 + '_ {
        move |p| self.apply_at(p, t)
    }

    /// Full displacement at `p`; zero when there are no controls.
    pub fn displacement(&self, p: Vec2) -> Vec2 {
        match self.snapped(p) {
            Some(i) => [self.targets[i][0] - p[0], self.targets[i][1] - p[1]],
            None => self.weighted_displacement(p),
        }
    }

    /// Control whose original lies within the snap radius of `p`.
    fn snapped(&self, p: Vec2) -> Option<usize> {
        self.index
            .nearest(p)
            .filter(|&(_, d)| d < self.snap_radius)
            .map(|(i, _)| i)
    }

    fn weighted_displacement(&self, p: Vec2) -> Vec2 {
        let mut sum_w = 0.0;
        let mut sum_dx = 0.0;
        let mut sum_dy = 0.0;
        for i in 0..self.originals.len() {
            let w = 1.0 / distance(self.originals[i], p).powf(self.power);
            if !w.is_finite() {
                continue;
            }
            let disp = self.control_displacement(i);
            sum_w += w;
            sum_dx += w * disp[0];
            sum_dy += w * disp[1];
        }

        if sum_w > 0.0 && sum_w.is_finite() {
            [sum_dx / sum_w, sum_dy / sum_w]
        } else {
            // no controls, or weights underflowed far away from all of them
            [0.0, 0.0]
        }
    }

    fn control_displacement(&self, i: usize) -> Vec2 {
        [
            self.targets[i][0] - self.originals[i][0],
            self.targets[i][1] - self.originals[i][1],
        ]
    }
}
