use crate::Vec2;

/// Node in a 2D k-d tree.
#[derive(Debug, Clone)]
pub struct KDNode {
    pub point: Vec2,
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KDNode>>,
    pub right: Option<Box<KDNode>>,
}

/// Simple 2D k-d tree over screen-plane points, answering nearest-point
/// queries. Indices refer to the slice passed to `build`.
#[derive(Debug, Clone)]
pub struct KDTree {
    pub root: Option<Box<KDNode>>,
}

impl KDTree {
    pub fn build(points: &[Vec2]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(points, &mut indices, 0);
        KDTree { root }
    }

    fn build_recursive(points: &[Vec2], idx: &mut [usize], depth: usize) -> Option<Box<KDNode>> {
        if idx.is_empty() {
            return None;
        }

        let axis = depth % 2;
        idx.sort_by(|&a, &b| points[a][axis].total_cmp(&points[b][axis]));
        let mid = idx.len() / 2;
        let median = idx[mid];

        Some(Box::new(KDNode {
            point: points[median],
            index: median,
            axis,
            left: Self::build_recursive(points, &mut idx[..mid], depth + 1),
            right: Self::build_recursive(points, &mut idx[mid + 1..], depth + 1),
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Closest point to `target`, if the tree is non-empty.
    pub fn nearest(&self, target: Vec2) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        Self::nearest_recursive(&self.root, target, &mut best);
        best.map(|(idx, d2)| (idx, d2.sqrt()))
    }

    fn nearest_recursive(node: &Option<Box<KDNode>>, target: Vec2, best: &mut Option<(usize, f64)>) {
        if let Some(noderef) = node {
            let dx = noderef.point[0] - target[0];
            let dy = noderef.point[1] - target[1];
            let dist2 = dx * dx + dy * dy;
            let closer = match *best {
                None => true,
                Some((idx, d2)) => dist2 < d2 || (dist2 == d2 && noderef.index < idx),
            };
            if closer {
                *best = Some((noderef.index, dist2));
            }

            let axis = noderef.axis;
            let delta = target[axis] - noderef.point[axis];
            let (first, second) = if delta < 0.0 {
                (&noderef.left, &noderef.right)
            } else {
                (&noderef.right, &noderef.left)
            };

            Self::nearest_recursive(first, target, best);
            if best.map_or(true, |(_, d2)| delta * delta <= d2) {
                Self::nearest_recursive(second, target, best);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::KDTree;

    #[test]
    fn nearest_matches_brute_force() {
        let pts: Vec<[f64; 2]> = (0..40)
            .map(|i| {
                let f = i as f64;
                [(f * 37.0) % 101.0, (f * 53.0) % 89.0]
            })
            .collect();
        let kd = KDTree::build(&pts);
        for target in [[10.0, 10.0], [50.5, 3.0], [100.0, 88.0], [-20.0, 40.0]] {
            let (idx, d) = kd.nearest(target).expect("non-empty");
            let brute = pts
                .iter()
                .map(|p| crate::distance(*p, target))
                .fold(f64::INFINITY, f64::min);
            assert!((d - brute).abs() < 1e-9, "index {idx}");
        }
    }

    #[test]
    fn empty_tree_has_no_nearest() {
        let kd = KDTree::build(&[]);
        assert!(kd.is_empty());
        assert!(kd.nearest([0.0, 0.0]).is_none());
    }
}
