//! Geometry value types recorded into display lists.
//!
//! All rectangles are stored as edges (left, top, right, bottom), matching
//! how they are encoded in the op buffer.

use serde::Serialize;

/// A point (or vector) in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned rectangle given by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const EMPTY: Self = Self::from_ltrb(0.0, 0.0, 0.0, 0.0);

    /// The cull rect used when a builder is created without one.
    pub const LARGEST: Self = Self::from_ltrb(-1.0e9, -1.0e9, 1.0e9, 1.0e9);

    /// Create a rectangle from its four edges.
    #[must_use]
    pub const fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size.
    #[must_use]
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_ltrb(x, y, x + width, y + height)
    }

    /// Create the rectangle bounding a circle.
    #[must_use]
    pub fn from_circle(center: Point, radius: f32) -> Self {
        Self::from_ltrb(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    /// Width (`right - left`).
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height (`bottom - top`).
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// True if the rectangle encloses no area (or has a NaN edge).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Written negated so NaN edges count as empty.
        !(self.left < self.right && self.top < self.bottom)
    }

    /// All four edges are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    /// The same rectangle with edges swapped so that `left <= right` and
    /// `top <= bottom`.
    #[must_use]
    pub fn sorted(&self) -> Self {
        Self::from_ltrb(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    /// Smallest rectangle containing both. Empty rectangles are ignored.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self::from_ltrb(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Overlap of both rectangles, or `None` if they do not intersect.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let result = Self::from_ltrb(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!result.is_empty()).then_some(result)
    }

    /// True if `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// Grow (or shrink, with negative values) each edge outward.
    #[must_use]
    pub fn outset(&self, dx: f32, dy: f32) -> Self {
        Self::from_ltrb(
            self.left - dx,
            self.top - dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::from_ltrb(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Smallest rectangle with integer edges containing this one.
    #[must_use]
    pub fn round_out(&self) -> Self {
        Self::from_ltrb(
            self.left.floor(),
            self.top.floor(),
            self.right.ceil(),
            self.bottom.ceil(),
        )
    }

    /// Bounding box of a set of points, or `None` for an empty slice.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_ltrb(first.x, first.y, first.x, first.y);
        for p in rest {
            bounds.left = bounds.left.min(p.x);
            bounds.top = bounds.top.min(p.y);
            bounds.right = bounds.right.max(p.x);
            bounds.bottom = bounds.bottom.max(p.y);
        }
        Some(bounds)
    }

    /// The four corners, clockwise from the top-left.
    #[must_use]
    pub const fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }
}

/// An axis-aligned rectangle with integer edges (nine-patch centers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl IRect {
    /// Create an integer rectangle from its four edges.
    #[must_use]
    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Convert to a floating-point rectangle.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn to_rect(&self) -> Rect {
        Rect::from_ltrb(
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        )
    }
}

/// A rectangle with elliptical corners.
///
/// Radii are stored clockwise from the upper-left corner. Construction
/// normalizes them, so two rounded rects describing the same shape always
/// carry the same values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RRect {
    rect: Rect,
    radii: [Point; 4],
}

impl RRect {
    /// Rounded rect with square corners.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_rect_radii(rect, [Point::ZERO; 4])
    }

    /// Rounded rect with the same elliptical radius at every corner.
    #[must_use]
    pub fn from_rect_xy(rect: Rect, rx: f32, ry: f32) -> Self {
        Self::from_rect_radii(rect, [Point::new(rx, ry); 4])
    }

    /// Rounded rect inscribing an ellipse in `rect`.
    #[must_use]
    pub fn oval(rect: Rect) -> Self {
        let rect = rect.sorted();
        Self::from_rect_xy(rect, rect.width() * 0.5, rect.height() * 0.5)
    }

    /// Rounded rect with per-corner radii (upper-left, upper-right,
    /// lower-right, lower-left).
    #[must_use]
    pub fn from_rect_radii(rect: Rect, radii: [Point; 4]) -> Self {
        let rect = rect.sorted();
        if rect.is_empty() || !rect.is_finite() {
            return Self {
                rect,
                radii: [Point::ZERO; 4],
            };
        }

        // A corner with either radius non-positive is square.
        let mut radii = radii.map(|r| {
            if r.x > 0.0 && r.y > 0.0 && r.is_finite() {
                r
            } else {
                Point::ZERO
            }
        });

        // Adjacent radii may not exceed the side they share.
        let width = rect.width();
        let height = rect.height();
        let mut scale = 1.0_f32;
        for (sum, limit) in [
            (radii[0].x + radii[1].x, width),
            (radii[1].y + radii[2].y, height),
            (radii[2].x + radii[3].x, width),
            (radii[3].y + radii[0].y, height),
        ] {
            if sum > limit {
                scale = scale.min(limit / sum);
            }
        }
        if scale < 1.0 {
            for r in &mut radii {
                r.x *= scale;
                r.y *= scale;
            }
        }

        Self { rect, radii }
    }

    /// Reassemble an already normalized rounded rect, as read back from a
    /// record.
    pub(crate) const fn from_normalized(rect: Rect, radii: [Point; 4]) -> Self {
        Self { rect, radii }
    }

    /// Bounding rectangle.
    #[must_use]
    pub const fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Corner radii, clockwise from the upper-left.
    #[must_use]
    pub const fn radii(&self) -> &[Point; 4] {
        &self.radii
    }

    /// Encloses no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// Every corner is square.
    #[must_use]
    pub fn is_rect(&self) -> bool {
        self.radii.iter().all(|r| r.x == 0.0 && r.y == 0.0)
    }

    /// The corners meet to form a full ellipse.
    #[must_use]
    pub fn is_oval(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let half_w = self.rect.width() * 0.5;
        let half_h = self.rect.height() * 0.5;
        self.radii.iter().all(|r| r.x >= half_w && r.y >= half_h)
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            rect: self.rect.offset(dx, dy),
            radii: self.radii,
        }
    }
}

/// Rotation-scale-translation used to place atlas sprites.
///
/// Maps sprite-local `(x, y)` to
/// `(scos * x - ssin * y + tx, ssin * x + scos * y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RSTransform {
    /// Scaled cosine.
    pub scos: f32,
    /// Scaled sine.
    pub ssin: f32,
    /// Horizontal translation.
    pub tx: f32,
    /// Vertical translation.
    pub ty: f32,
}

impl RSTransform {
    /// Create a transform from its four components.
    #[must_use]
    pub const fn new(scos: f32, ssin: f32, tx: f32, ty: f32) -> Self {
        Self { scos, ssin, tx, ty }
    }

    /// Map a sprite-local point.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        Point::new(
            self.scos * p.x - self.ssin * p.y + self.tx,
            self.ssin * p.x + self.scos * p.y + self.ty,
        )
    }

    /// Bounds of a `width` x `height` sprite placed by this transform.
    #[must_use]
    pub fn bounds_for_size(&self, width: f32, height: f32) -> Rect {
        let corners = Rect::from_ltrb(0.0, 0.0, width, height)
            .corners()
            .map(|c| self.map_point(c));
        Rect::bounding(&corners).unwrap_or(Rect::EMPTY)
    }

    /// The equivalent affine matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix {
        Matrix::affine(self.scos, -self.ssin, self.tx, self.ssin, self.scos, self.ty)
    }
}

/// A 4x4 transform stored row-major.
///
/// Points are mapped with `z = 0`. The 2D affine subset lives in entries
/// `[0, 1, 3]` and `[4, 5, 7]`; entries `12, 13, 15` hold perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix {
    m: [f32; 16],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Create a matrix from 16 row-major values.
    #[must_use]
    pub const fn from_row_major(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// The 2D affine matrix `[mxx mxy mxt; myx myy myt]`.
    #[must_use]
    pub const fn affine(mxx: f32, mxy: f32, mxt: f32, myx: f32, myy: f32, myt: f32) -> Self {
        Self {
            m: [
                mxx, mxy, 0.0, mxt, //
                myx, myy, 0.0, myt, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Translation by `(tx, ty)`.
    #[must_use]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self::affine(1.0, 0.0, tx, 0.0, 1.0, ty)
    }

    /// Scale by `(sx, sy)`.
    #[must_use]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::affine(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Clockwise rotation (y axis down) by `degrees`.
    #[must_use]
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::affine(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// Skew by `(sx, sy)`.
    #[must_use]
    pub const fn skew(sx: f32, sy: f32) -> Self {
        Self::affine(1.0, sx, 0.0, sy, 1.0, 0.0)
    }

    /// Row-major values.
    #[must_use]
    pub const fn values(&self) -> &[f32; 16] {
        &self.m
    }

    /// The affine subset as `[mxx, mxy, mxt, myx, myy, myt]`.
    #[must_use]
    pub const fn to_affine(&self) -> [f32; 6] {
        [
            self.m[0], self.m[1], self.m[3], //
            self.m[4], self.m[5], self.m[7],
        ]
    }

    /// True for the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True if the z row, z column and perspective row are the identity,
    /// so the matrix is fully described by [`Matrix::to_affine`].
    #[must_use]
    pub fn is_2d_affine(&self) -> bool {
        let m = &self.m;
        m[2] == 0.0
            && m[6] == 0.0
            && m[8] == 0.0
            && m[9] == 0.0
            && m[10] == 1.0
            && m[11] == 0.0
            && m[12] == 0.0
            && m[13] == 0.0
            && m[14] == 0.0
            && m[15] == 1.0
    }

    /// True if mapping can produce a `w` other than one.
    #[must_use]
    pub fn has_perspective(&self) -> bool {
        self.m[12] != 0.0 || self.m[13] != 0.0 || self.m[15] != 1.0
    }

    /// All entries are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    /// `self * other`: `other` is applied to points first.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let a = &self.m;
        let b = &other.m;
        let mut m = [0.0_f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                m[row * 4 + col] = (0..4).map(|k| a[row * 4 + k] * b[k * 4 + col]).sum();
            }
        }
        Self { m }
    }

    /// Map a point. Returns `None` when the point lands behind the viewer
    /// (`w <= 0`).
    #[must_use]
    pub fn map_point(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let x = m[0] * p.x + m[1] * p.y + m[3];
        let y = m[4] * p.x + m[5] * p.y + m[7];
        let w = m[12] * p.x + m[13] * p.y + m[15];
        if w <= f32::EPSILON {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }

    /// Inverse of a 2D affine matrix. Returns `None` for singular matrices
    /// and for matrices with a perspective or z component.
    #[must_use]
    pub fn invert_affine(&self) -> Option<Self> {
        if !self.is_2d_affine() {
            return None;
        }
        let [a, b, c, d, e, f] = self.to_affine();
        let det = a * e - b * d;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let inverse = Self::affine(
            e * inv,
            -b * inv,
            (b * f - c * e) * inv,
            -d * inv,
            a * inv,
            (c * d - a * f) * inv,
        );
        inverse.is_finite().then_some(inverse)
    }

    /// Bounding box of the mapped rectangle. Returns `None` if any corner
    /// is not mappable, in which case the result is unbounded.
    #[must_use]
    pub fn map_rect(&self, rect: &Rect) -> Option<Rect> {
        let mut mapped = [Point::ZERO; 4];
        for (out, corner) in mapped.iter_mut().zip(rect.corners()) {
            *out = self.map_point(corner)?;
        }
        Rect::bounding(&mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_affine() {
        let m = Matrix::translate(5.0, -3.0).concat(&Matrix::scale(2.0, 4.0));
        let inv = m.invert_affine().unwrap();
        let p = inv.map_point(Point::new(9.0, 5.0)).unwrap();
        assert_eq!(p, Point::new(2.0, 2.0));
        assert!(Matrix::scale(0.0, 1.0).invert_affine().is_none());
    }

    #[test]
    fn test_rrect_zero_radius_is_rect() {
        let rr = RRect::from_rect_xy(Rect::from_ltrb(0.0, 0.0, 10.0, 10.0), 0.0, 5.0);
        assert!(rr.is_rect());
        assert!(!rr.is_oval());
    }

    #[test]
    fn test_rrect_radii_scaled_to_fit() {
        let rr = RRect::from_rect_xy(Rect::from_ltrb(0.0, 0.0, 10.0, 20.0), 10.0, 10.0);
        // Width 10 can hold two radii of 5; the scale applies to both axes.
        assert_eq!(rr.radii()[0], Point::new(5.0, 5.0));
    }

    #[test]
    fn test_rrect_oval_detection() {
        let rr = RRect::oval(Rect::from_ltrb(0.0, 0.0, 10.0, 20.0));
        assert!(rr.is_oval());
        assert!(!rr.is_rect());
    }

    #[test]
    fn test_rect_sorted_and_union() {
        let a = Rect::from_ltrb(10.0, 10.0, 0.0, 0.0).sorted();
        assert_eq!(a, Rect::from_ltrb(0.0, 0.0, 10.0, 10.0));
        let b = Rect::from_ltrb(5.0, 5.0, 20.0, 15.0);
        assert_eq!(a.union(&b), Rect::from_ltrb(0.0, 0.0, 20.0, 15.0));
        assert_eq!(a.union(&Rect::EMPTY), a);
    }

    #[test]
    fn test_rect_intersect_disjoint() {
        let a = Rect::from_ltrb(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_ltrb(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn test_matrix_concat_applies_right_first() {
        let m = Matrix::translate(10.0, 0.0).concat(&Matrix::scale(2.0, 2.0));
        assert_eq!(m.map_point(Point::new(1.0, 1.0)), Some(Point::new(12.0, 2.0)));
    }

    #[test]
    fn test_matrix_rotate_quarter_turn() {
        let p = Matrix::rotate(90.0).map_point(Point::new(1.0, 0.0)).unwrap();
        assert!((p.x).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_matrix_perspective_behind_viewer() {
        let mut values = *Matrix::IDENTITY.values();
        values[12] = -1.0;
        let m = Matrix::from_row_major(values);
        assert!(m.has_perspective());
        assert_eq!(m.map_point(Point::new(2.0, 0.0)), None);
        assert_eq!(m.map_rect(&Rect::from_ltrb(0.0, 0.0, 5.0, 5.0)), None);
    }

    #[test]
    fn test_rs_transform_bounds() {
        let xform = RSTransform::new(1.0, 0.0, 5.0, 6.0);
        assert_eq!(
            xform.bounds_for_size(10.0, 4.0),
            Rect::from_ltrb(5.0, 6.0, 15.0, 10.0)
        );
    }
}
