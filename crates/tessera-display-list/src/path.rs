//! Vector paths.
//!
//! A path remembers whether it was created from a simple shape so the
//! builder can record the cheaper shape op instead (a rect-shaped path clip
//! becomes a rect clip). Rect detection also works for paths assembled by
//! hand from line segments.

use crate::geometry::{Point, RRect, Rect};
use crate::paint::FillType;

/// Cubic control-point distance approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// One path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathVerb {
    /// Start a new contour.
    MoveTo(Point),
    /// Straight line to the point.
    LineTo(Point),
    /// Quadratic curve through a control point.
    QuadTo(Point, Point),
    /// Cubic curve through two control points.
    CubicTo(Point, Point, Point),
    /// Close the current contour.
    Close,
}

/// The simple shape a path was constructed from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ShapeHint {
    None,
    Oval(Rect),
    RRect(RRect),
}

/// A sequence of contours with a fill rule.
#[derive(Debug, Clone)]
pub struct Path {
    verbs: Vec<PathVerb>,
    fill_type: FillType,
    hint: ShapeHint,
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

/// Two paths are equal when they have the same segments and fill rule,
/// regardless of how they were constructed.
impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.fill_type == other.fill_type && self.verbs == other.verbs
    }
}

impl Path {
    /// An empty path.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verbs: Vec::new(),
            fill_type: FillType::Winding,
            hint: ShapeHint::None,
        }
    }

    /// A closed rectangle contour, clockwise from the top-left.
    #[must_use]
    pub fn from_rect(rect: &Rect) -> Self {
        let [a, b, c, d] = rect.sorted().corners();
        let mut path = Self::new();
        let _ = path.move_to(a).line_to(b).line_to(c).line_to(d).close();
        path
    }

    /// A closed ellipse inscribed in `rect`.
    #[must_use]
    pub fn from_oval(rect: &Rect) -> Self {
        let mut path = Self::from_rrect(&RRect::oval(*rect));
        path.hint = ShapeHint::Oval(rect.sorted());
        path
    }

    /// A closed rounded-rect contour.
    #[must_use]
    pub fn from_rrect(rrect: &RRect) -> Self {
        let r = rrect.rect();
        let [ul, ur, lr, ll] = *rrect.radii();
        let mut path = Self::new();
        let _ = path
            .move_to(Point::new(r.left + ul.x, r.top))
            .line_to(Point::new(r.right - ur.x, r.top));
        path.corner(
            Point::new(r.right - ur.x, r.top),
            Point::new(r.right, r.top + ur.y),
            Point::new(r.right, r.top),
        );
        let _ = path.line_to(Point::new(r.right, r.bottom - lr.y));
        path.corner(
            Point::new(r.right, r.bottom - lr.y),
            Point::new(r.right - lr.x, r.bottom),
            Point::new(r.right, r.bottom),
        );
        let _ = path.line_to(Point::new(r.left + ll.x, r.bottom));
        path.corner(
            Point::new(r.left + ll.x, r.bottom),
            Point::new(r.left, r.bottom - ll.y),
            Point::new(r.left, r.bottom),
        );
        let _ = path.line_to(Point::new(r.left, r.top + ul.y));
        path.corner(
            Point::new(r.left, r.top + ul.y),
            Point::new(r.left + ul.x, r.top),
            Point::new(r.left, r.top),
        );
        let _ = path.close();
        path.hint = if rrect.is_rect() {
            ShapeHint::None
        } else {
            ShapeHint::RRect(*rrect)
        };
        path
    }

    /// Quarter-ellipse from `from` to `to` bulging toward `corner`.
    fn corner(&mut self, from: Point, to: Point, corner: Point) {
        if from == to {
            return;
        }
        let c1 = Point::new(
            from.x + (corner.x - from.x) * KAPPA,
            from.y + (corner.y - from.y) * KAPPA,
        );
        let c2 = Point::new(
            to.x + (corner.x - to.x) * KAPPA,
            to.y + (corner.y - to.y) * KAPPA,
        );
        let _ = self.cubic_to(c1, c2, to);
    }

    fn push(&mut self, verb: PathVerb) -> &mut Self {
        self.hint = ShapeHint::None;
        self.verbs.push(verb);
        self
    }

    /// Start a new contour at `p`.
    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.push(PathVerb::MoveTo(p))
    }

    /// Add a line to `p`.
    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.push(PathVerb::LineTo(p))
    }

    /// Add a quadratic curve.
    pub fn quad_to(&mut self, control: Point, end: Point) -> &mut Self {
        self.push(PathVerb::QuadTo(control, end))
    }

    /// Add a cubic curve.
    pub fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) -> &mut Self {
        self.push(PathVerb::CubicTo(c1, c2, end))
    }

    /// Close the current contour.
    pub fn close(&mut self) -> &mut Self {
        self.push(PathVerb::Close)
    }

    /// Set the fill rule.
    pub const fn set_fill_type(&mut self, fill_type: FillType) -> &mut Self {
        self.fill_type = fill_type;
        self
    }

    /// Fill rule.
    #[must_use]
    pub const fn fill_type(&self) -> FillType {
        self.fill_type
    }

    /// Segments in order.
    #[must_use]
    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    /// No segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Bounds of all points, including curve control points. Always
    /// contains the drawn outline.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let points: Vec<Point> = self
            .verbs
            .iter()
            .flat_map(|verb| match *verb {
                PathVerb::MoveTo(p) | PathVerb::LineTo(p) => vec![p],
                PathVerb::QuadTo(c, p) => vec![c, p],
                PathVerb::CubicTo(c1, c2, p) => vec![c1, c2, p],
                PathVerb::Close => Vec::new(),
            })
            .collect();
        Rect::bounding(&points).unwrap_or(Rect::EMPTY)
    }

    /// The rectangle this path traces, if it is a single closed,
    /// axis-aligned, four-cornered contour with the default fill rule.
    #[must_use]
    pub fn as_rect(&self) -> Option<Rect> {
        if self.fill_type != FillType::Winding {
            return None;
        }
        let (first, rest) = self.verbs.split_first()?;
        let PathVerb::MoveTo(start) = *first else {
            return None;
        };
        let (last, lines) = rest.split_last()?;
        if *last != PathVerb::Close {
            return None;
        }
        let mut corners = vec![start];
        for verb in lines {
            let PathVerb::LineTo(p) = *verb else {
                return None;
            };
            corners.push(p);
        }
        // An explicit line back to the start is allowed.
        if corners.len() == 5 && corners[4] == start {
            let _ = corners.pop();
        }
        if corners.len() != 4 {
            return None;
        }
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let horizontal = a.y == b.y && a.x != b.x;
            let vertical = a.x == b.x && a.y != b.y;
            if !(horizontal || vertical) {
                return None;
            }
            // Edges must alternate direction.
            let c = corners[(i + 2) % 4];
            let next_horizontal = b.y == c.y;
            if horizontal == next_horizontal {
                return None;
            }
        }
        Rect::bounding(&corners)
    }

    /// The ellipse this path was constructed from.
    #[must_use]
    pub const fn as_oval(&self) -> Option<Rect> {
        match self.hint {
            ShapeHint::Oval(rect) if self.fill_type as u8 == FillType::Winding as u8 => {
                Some(rect)
            }
            _ => None,
        }
    }

    /// The rounded rect this path was constructed from.
    #[must_use]
    pub const fn as_rrect(&self) -> Option<RRect> {
        match self.hint {
            ShapeHint::RRect(rrect) if self.fill_type as u8 == FillType::Winding as u8 => {
                Some(rrect)
            }
            _ => None,
        }
    }

    /// A copy of this path translated by `(dx, dy)`.
    #[must_use]
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        let shift = |p: Point| Point::new(p.x + dx, p.y + dy);
        Self {
            verbs: self
                .verbs
                .iter()
                .map(|verb| match *verb {
                    PathVerb::MoveTo(p) => PathVerb::MoveTo(shift(p)),
                    PathVerb::LineTo(p) => PathVerb::LineTo(shift(p)),
                    PathVerb::QuadTo(c, p) => PathVerb::QuadTo(shift(c), shift(p)),
                    PathVerb::CubicTo(c1, c2, p) => {
                        PathVerb::CubicTo(shift(c1), shift(c2), shift(p))
                    }
                    PathVerb::Close => PathVerb::Close,
                })
                .collect(),
            fill_type: self.fill_type,
            hint: match self.hint {
                ShapeHint::None => ShapeHint::None,
                ShapeHint::Oval(rect) => ShapeHint::Oval(rect.offset(dx, dy)),
                ShapeHint::RRect(rrect) => ShapeHint::RRect(rrect.offset(dx, dy)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_path_detected() {
        let rect = Rect::from_ltrb(1.0, 2.0, 11.0, 12.0);
        assert_eq!(Path::from_rect(&rect).as_rect(), Some(rect));
    }

    #[test]
    fn test_hand_built_rect_with_closing_line() {
        let mut path = Path::new();
        let _ = path
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(0.0, 5.0))
            .line_to(Point::new(5.0, 5.0))
            .line_to(Point::new(5.0, 0.0))
            .line_to(Point::new(0.0, 0.0))
            .close();
        assert_eq!(path.as_rect(), Some(Rect::from_ltrb(0.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_open_or_diagonal_paths_are_not_rects() {
        let mut open = Path::new();
        let _ = open
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(5.0, 0.0))
            .line_to(Point::new(5.0, 5.0))
            .line_to(Point::new(0.0, 5.0));
        assert_eq!(open.as_rect(), None);

        let mut diamond = Path::new();
        let _ = diamond
            .move_to(Point::new(5.0, 0.0))
            .line_to(Point::new(10.0, 5.0))
            .line_to(Point::new(5.0, 10.0))
            .line_to(Point::new(0.0, 5.0))
            .close();
        assert_eq!(diamond.as_rect(), None);
    }

    #[test]
    fn test_oval_hint_survives_until_mutation() {
        let rect = Rect::from_ltrb(0.0, 0.0, 20.0, 10.0);
        let mut path = Path::from_oval(&rect);
        assert_eq!(path.as_oval(), Some(rect));
        assert_eq!(path.as_rect(), None);
        let _ = path.line_to(Point::new(1.0, 1.0));
        assert_eq!(path.as_oval(), None);
    }

    #[test]
    fn test_even_odd_disables_shape_detection() {
        let rect = Rect::from_ltrb(0.0, 0.0, 20.0, 10.0);
        let mut path = Path::from_rect(&rect);
        let _ = path.set_fill_type(FillType::EvenOdd);
        assert_eq!(path.as_rect(), None);
    }

    #[test]
    fn test_bounds_include_control_points() {
        let mut path = Path::new();
        let _ = path
            .move_to(Point::new(0.0, 0.0))
            .quad_to(Point::new(5.0, -10.0), Point::new(10.0, 0.0));
        assert_eq!(path.bounds(), Rect::from_ltrb(0.0, -10.0, 10.0, 0.0));
    }

    #[test]
    fn test_equality_ignores_construction() {
        let rect = Rect::from_ltrb(0.0, 0.0, 4.0, 4.0);
        let mut manual = Path::new();
        let _ = manual
            .move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(4.0, 0.0))
            .line_to(Point::new(4.0, 4.0))
            .line_to(Point::new(0.0, 4.0))
            .close();
        assert_eq!(manual, Path::from_rect(&rect));
    }
}
