//! Axis-aligned box domain.
//!
//! Mirrors StoGO's `TBox`: a lower and an upper bound per dimension. The
//! caller guarantees `lower[i] <= upper[i]`; nothing here validates it.

/// An axis-aligned hyper-rectangle `[lower[0], upper[0]] x ... x [lower[n-1], upper[n-1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxDomain {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoxDomain {
    /// Build a domain from separate lower/upper arrays of equal length.
    pub fn new(lower: &[f64], upper: &[f64]) -> Self {
        debug_assert_eq!(lower.len(), upper.len());
        Self {
            lower: lower.to_vec(),
            upper: upper.to_vec(),
        }
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// True iff `lower[i] <= x[i] <= upper[i]` for every dimension.
    ///
    /// Matches `TBox::InsideBox()`. NaN coordinates are never inside.
    pub fn contains(&self, x: &[f64]) -> bool {
        debug_assert_eq!(x.len(), self.dim());
        x.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(&xi, (&l, &u))| l <= xi && xi <= u)
    }

    /// Side length in dimension `i`.
    pub fn width(&self, i: usize) -> f64 {
        self.upper[i] - self.lower[i]
    }

    /// Longest side length.
    pub fn max_width(&self) -> f64 {
        (0..self.dim()).map(|i| self.width(i)).fold(0.0, f64::max)
    }

    /// Index of the longest side; the lowest index wins ties.
    pub fn longest_side(&self) -> usize {
        let mut best = 0;
        for i in 1..self.dim() {
            if self.width(i) > self.width(best) {
                best = i;
            }
        }
        best
    }

    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&l, &u)| 0.5 * (l + u))
            .collect()
    }

    /// Split into two halves across dimension `i` (StoGO's `TBox::split`).
    ///
    /// Both halves share the midpoint plane, so a point on it is inside both.
    pub fn bisect(&self, i: usize) -> (BoxDomain, BoxDomain) {
        let mid = 0.5 * (self.lower[i] + self.upper[i]);
        let mut left = self.clone();
        let mut right = self.clone();
        left.upper[i] = mid;
        right.lower[i] = mid;
        (left, right)
    }

    /// Distance between `a` and `b` in the max-norm, each axis scaled by
    /// this domain's width (axes of zero width are compared unscaled).
    pub fn scaled_distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .enumerate()
            .map(|(i, (&ai, &bi))| {
                let w = self.width(i);
                if w > 0.0 {
                    (ai - bi).abs() / w
                } else {
                    (ai - bi).abs()
                }
            })
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_interior_and_boundary() {
        let d = BoxDomain::new(&[-1.0, 0.0], &[1.0, 2.0]);
        assert!(d.contains(&[0.0, 1.0]));
        assert!(d.contains(&[-1.0, 0.0]));
        assert!(d.contains(&[1.0, 2.0]));
        assert!(!d.contains(&[1.0 + 1e-12, 1.0]));
        assert!(!d.contains(&[0.0, -1e-300]));
    }

    #[test]
    fn test_contains_nan_is_outside() {
        let d = BoxDomain::new(&[0.0], &[1.0]);
        assert!(!d.contains(&[f64::NAN]));
    }

    #[test]
    fn test_degenerate_box() {
        let d = BoxDomain::new(&[2.0, -3.0], &[2.0, -3.0]);
        assert!(d.contains(&[2.0, -3.0]));
        assert!(!d.contains(&[2.0, -2.999]));
        assert_eq!(d.max_width(), 0.0);
        assert_eq!(d.center(), vec![2.0, -3.0]);
    }

    #[test]
    fn test_longest_side_and_bisect() {
        let d = BoxDomain::new(&[0.0, 0.0, 0.0], &[1.0, 4.0, 4.0]);
        assert_eq!(d.longest_side(), 1);
        let (l, r) = d.bisect(1);
        assert_eq!(l.upper(), &[1.0, 2.0, 4.0]);
        assert_eq!(r.lower(), &[0.0, 2.0, 0.0]);
        assert!(l.contains(&[0.5, 2.0, 1.0]));
        assert!(r.contains(&[0.5, 2.0, 1.0]));
    }

    #[test]
    fn test_scaled_distance() {
        let d = BoxDomain::new(&[0.0, 0.0], &[10.0, 0.0]);
        assert!((d.scaled_distance(&[1.0, 0.0], &[3.0, 0.0]) - 0.2).abs() < 1e-15);
        assert!((d.scaled_distance(&[1.0, 0.5], &[1.0, 0.0]) - 0.5).abs() < 1e-15);
    }
}
