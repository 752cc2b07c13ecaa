// Copyright 2026 the Tandem Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! This type covers what the scroll and copy-output paths need from the
//! embedder's property-tree evaluator: composition, inversion, and mapping or
//! projecting 2-D points through a possibly perspective transform.

use core::ops::Mul;

use kurbo::{Point, Rect};

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Returns the element at `row`, `col`.
    #[inline]
    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Returns the inverse transform, or `None` if the matrix is singular or
    /// not finite.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }
        let m = self.flatten();
        let mut inv = [0.0_f64; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut cols = [[0.0_f64; 4]; 4];
        for (i, v) in inv.iter().enumerate() {
            cols[i / 4][i % 4] = v * inv_det;
        }
        Some(Self { cols })
    }

    /// Whether [`inverse`](Self::inverse) would succeed.
    #[inline]
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.inverse().is_some()
    }

    /// Maps a point on the `z = 0` plane through this transform.
    ///
    /// Returns `None` when the homogeneous `w` is not positive (the point maps
    /// behind the viewer).
    #[must_use]
    pub fn map_point(&self, p: Point) -> Option<Point> {
        let h = self.map_homogeneous([p.x, p.y, 0.0, 1.0]);
        if h[3] <= 0.0 {
            return None;
        }
        Some(Point::new(h[0] / h[3], h[1] / h[3]))
    }

    /// Projects a 2-D point back onto the `z = 0` plane of the space this
    /// transform maps from.
    ///
    /// `self` is expected to be an *inverse* screen-space transform: the
    /// screen point is extended along z until it meets the plane, then mapped.
    /// Returns `None` when the ray is parallel to the plane or the result is
    /// clipped behind the viewer.
    #[must_use]
    pub fn project_point(&self, p: Point) -> Option<Point> {
        let m22 = self.get(2, 2);
        if m22 == 0.0 {
            return None;
        }
        let z = -(self.get(2, 0) * p.x + self.get(2, 1) * p.y + self.get(2, 3)) / m22;
        let h = self.map_homogeneous([p.x, p.y, z, 1.0]);
        if h[3] <= 0.0 || !z.is_finite() {
            return None;
        }
        Some(Point::new(h[0] / h[3], h[1] / h[3]))
    }

    /// Returns the axis-aligned bounds of `rect` after mapping its corners.
    ///
    /// Corners that map behind the viewer are skipped; if all do, returns
    /// `Rect::ZERO`.
    #[must_use]
    pub fn map_rect_bounds(&self, rect: Rect) -> Rect {
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
        ];
        let mut out: Option<Rect> = None;
        for corner in corners.into_iter().filter_map(|c| self.map_point(c)) {
            out = Some(match out {
                Some(r) => r.union_pt(corner),
                None => Rect::from_points(corner, corner),
            });
        }
        out.unwrap_or(Rect::ZERO)
    }

    fn map_homogeneous(&self, v: [f64; 4]) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0_f64; 4];
        for (r, slot) in out.iter_mut().enumerate() {
            *slot = c[0][r] * v[0] + c[1][r] * v[1] + c[2][r] * v[2] + c[3][r] * v[3];
        }
        out
    }

    fn flatten(&self) -> [f64; 16] {
        let mut m = [0.0_f64; 16];
        for (c, col) in self.cols.iter().enumerate() {
            m[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        m
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        let d = a - b;
        d < 1e-9 && d > -1e-9
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0, 0.0);
        let c = a * b;
        assert_eq!(c.col(3), [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn inverse_of_translate_scale() {
        let t = Transform3d::from_translation(10.0, 20.0, 0.0) * Transform3d::from_scale(2.0, 4.0, 1.0);
        let inv = t.inverse().expect("invertible");
        let round = t * inv;
        for c in 0..4 {
            for r in 0..4 {
                assert!(
                    close(round.get(r, c), Transform3d::IDENTITY.get(r, c)),
                    "t * t^-1 should be identity at ({r}, {c})"
                );
            }
        }
    }

    #[test]
    fn zero_scale_is_singular() {
        let t = Transform3d::from_scale(0.0, 1.0, 1.0);
        assert!(!t.is_invertible());
    }

    #[test]
    fn non_finite_is_singular() {
        let mut t = Transform3d::IDENTITY;
        t.cols[3][0] = f64::NAN;
        assert!(!t.is_finite());
        assert!(t.inverse().is_none());
    }

    #[test]
    fn map_point_applies_translation() {
        let t = Transform3d::from_translation(5.0, -3.0, 0.0);
        assert_eq!(t.map_point(Point::new(1.0, 1.0)), Some(Point::new(6.0, -2.0)));
    }

    #[test]
    fn project_point_through_inverse_recovers_local_point() {
        let screen = Transform3d::from_translation(100.0, 50.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 1.0);
        let inv = screen.inverse().expect("invertible");
        let local = inv.project_point(Point::new(110.0, 70.0)).expect("not clipped");
        assert!(close(local.x, 5.0));
        assert!(close(local.y, 10.0));
    }

    #[test]
    fn project_point_fails_for_flat_z() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][2] = 0.0;
        assert!(t.project_point(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn map_rect_bounds_scales() {
        let t = Transform3d::from_scale(2.0, 3.0, 1.0);
        let r = t.map_rect_bounds(Rect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(r, Rect::new(2.0, 3.0, 4.0, 6.0));
    }
}
