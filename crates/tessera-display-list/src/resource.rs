//! Shared resources referenced by ops.
//!
//! Records never embed resources in the byte buffer. They carry a `u32`
//! index into a [`ResourceTable`] owned by the same buffer, which holds the
//! `Arc` handles. Dropping the table releases every handle; no per-record
//! destructor walk is needed.

use std::sync::Arc;

use serde::Serialize;
use strum_macros::{Display, FromRepr};
use tessera_common::Image;

use crate::color::Color;
use crate::display_list::DisplayList;
use crate::effects::{ColorFilter, ImageFilter, MaskFilter, PathEffect, Shader};
use crate::geometry::{Point, Rect};
use crate::path::Path;

/// Width of one character relative to the font size, for bounds estimates.
///
/// Deliberately wide (a full em) so estimates never undercount.
const EM_WIDTH_RATIO: f32 = 1.0;

/// Space above the baseline relative to the font size. Stacked accents
/// reach past one em.
const ASCENT_RATIO: f32 = 1.5;

/// Space below the baseline relative to the font size.
const DESCENT_RATIO: f32 = 0.5;

/// Overhang allowed past either end of the run, for negative left side
/// bearings and italic tails.
const SIDE_BEARING_RATIO: f32 = 0.25;

/// A run of text at a single size, positioned relative to its baseline
/// origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlob {
    text: String,
    font_size: f32,
    bounds: Rect,
}

impl TextBlob {
    /// Create a blob with estimated bounds: one em per character plus a
    /// quarter em of overhang at each end, 1.5 em of ascent and 0.5 em of
    /// descent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * EM_WIDTH_RATIO;
        let overhang = font_size * SIDE_BEARING_RATIO;
        let bounds = Rect::from_ltrb(
            -overhang,
            -font_size * ASCENT_RATIO,
            width + overhang,
            font_size * DESCENT_RATIO,
        );
        Self {
            text,
            font_size,
            bounds,
        }
    }

    /// Create a blob with bounds measured by a shaper.
    #[must_use]
    pub fn with_bounds(text: impl Into<String>, font_size: f32, bounds: Rect) -> Self {
        Self {
            text: text.into(),
            font_size,
            bounds,
        }
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Font size in pixels.
    #[must_use]
    pub const fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Bounds relative to the baseline origin.
    #[must_use]
    pub const fn bounds(&self) -> &Rect {
        &self.bounds
    }
}

/// How vertex positions form triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum VertexMode {
    /// Every three vertices form a triangle.
    Triangles,
    /// Each vertex after the second forms a triangle with the previous two.
    TriangleStrip,
    /// Each vertex after the second forms a triangle with the previous one
    /// and the first.
    TriangleFan,
}

/// A triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertices {
    mode: VertexMode,
    positions: Vec<Point>,
    texture_coordinates: Option<Vec<Point>>,
    colors: Option<Vec<Color>>,
    indices: Option<Vec<u16>>,
    bounds: Rect,
}

impl Vertices {
    /// Create a mesh. Optional per-vertex arrays must be as long as
    /// `positions`; mismatched arrays are dropped.
    #[must_use]
    pub fn new(
        mode: VertexMode,
        positions: Vec<Point>,
        texture_coordinates: Option<Vec<Point>>,
        colors: Option<Vec<Color>>,
        indices: Option<Vec<u16>>,
    ) -> Self {
        let count = positions.len();
        let texture_coordinates = texture_coordinates.filter(|t| t.len() == count);
        let colors = colors.filter(|c| c.len() == count);
        let bounds = Rect::bounding(&positions).unwrap_or(Rect::EMPTY);
        Self {
            mode,
            positions,
            texture_coordinates,
            colors,
            indices,
            bounds,
        }
    }

    /// Triangle assembly mode.
    #[must_use]
    pub const fn mode(&self) -> VertexMode {
        self.mode
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Per-vertex texture coordinates.
    #[must_use]
    pub fn texture_coordinates(&self) -> Option<&[Point]> {
        self.texture_coordinates.as_deref()
    }

    /// Per-vertex colors.
    #[must_use]
    pub fn colors(&self) -> Option<&[Color]> {
        self.colors.as_deref()
    }

    /// Optional index buffer into `positions`.
    #[must_use]
    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    /// Bounds of all positions.
    #[must_use]
    pub const fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Vertex indices of each assembled triangle.
    #[must_use]
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let order: Vec<usize> = self.indices.as_ref().map_or_else(
            || (0..self.positions.len()).collect(),
            |indices| indices.iter().map(|&i| usize::from(i)).collect(),
        );
        let valid = |t: [usize; 3]| t.iter().all(|&i| i < self.positions.len());
        let triangles: Vec<[usize; 3]> = match self.mode {
            VertexMode::Triangles => order
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
            VertexMode::TriangleStrip => order
                .windows(3)
                .map(|w| [w[0], w[1], w[2]])
                .collect(),
            VertexMode::TriangleFan => order
                .get(1..)
                .unwrap_or_default()
                .windows(2)
                .map(|w| [order[0], w[0], w[1]])
                .collect(),
        };
        triangles.into_iter().filter(|&t| valid(t)).collect()
    }
}

/// One entry of a resource table.
#[derive(Debug, Clone)]
pub(crate) enum Resource {
    Image(Arc<Image>),
    Path(Arc<Path>),
    TextBlob(Arc<TextBlob>),
    Vertices(Arc<Vertices>),
    DisplayList(Arc<DisplayList>),
    Shader(Arc<Shader>),
    ColorFilter(Arc<ColorFilter>),
    ImageFilter(Arc<ImageFilter>),
    PathEffect(Arc<PathEffect>),
    MaskFilter(Arc<MaskFilter>),
}

/// Owned handles referenced by index from the op buffer.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceTable {
    entries: Vec<Resource>,
}

/// Generates the typed accessor for one resource kind. A kind mismatch
/// means the buffer does not belong to this table.
macro_rules! resource_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub(crate) fn $name(&self, index: u32) -> &Arc<$ty> {
            match self.entries.get(index as usize) {
                Some(Resource::$variant(value)) => value,
                other => unreachable!(
                    "resource {index} is {other:?}, expected {}",
                    stringify!($variant)
                ),
            }
        }
    };
}

impl ResourceTable {
    /// Store a handle and return its index.
    pub(crate) fn add(&mut self, resource: Resource) -> u32 {
        let index = u32::try_from(self.entries.len())
            .unwrap_or_else(|_| unreachable!("resource table exceeds u32 indices"));
        self.entries.push(resource);
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn nested_lists(&self) -> impl Iterator<Item = &Arc<DisplayList>> {
        self.entries.iter().filter_map(|entry| match entry {
            Resource::DisplayList(list) => Some(list),
            _ => None,
        })
    }

    resource_accessor!(image, Image, Image);
    resource_accessor!(path, Path, Path);
    resource_accessor!(text_blob, TextBlob, TextBlob);
    resource_accessor!(vertices, Vertices, Vertices);
    resource_accessor!(display_list, DisplayList, DisplayList);
    resource_accessor!(shader, Shader, Shader);
    resource_accessor!(color_filter, ColorFilter, ColorFilter);
    resource_accessor!(image_filter, ImageFilter, ImageFilter);
    resource_accessor!(path_effect, PathEffect, PathEffect);
    resource_accessor!(mask_filter, MaskFilter, MaskFilter);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_blob_bounds_cover_overhang_and_accents() {
        let blob = TextBlob::new("abc", 10.0);
        assert_eq!(*blob.bounds(), Rect::from_ltrb(-2.5, -15.0, 32.5, 5.0));
    }

    #[test]
    fn test_triangle_strip_assembly() {
        let positions = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ];
        let mesh = Vertices::new(VertexMode::TriangleStrip, positions, None, None, None);
        assert_eq!(mesh.triangles(), vec![[0, 1, 2], [1, 2, 3]]);
        assert_eq!(*mesh.bounds(), Rect::from_ltrb(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let positions = vec![Point::ZERO; 3];
        let mesh = Vertices::new(
            VertexMode::Triangles,
            positions,
            None,
            Some(vec![Color::RED]),
            Some(vec![0, 1, 2, 0, 1, 9]),
        );
        assert_eq!(mesh.triangles(), vec![[0, 1, 2]]);
        assert_eq!(mesh.colors(), None);
    }

    #[test]
    fn test_resource_table_indices() {
        let mut table = ResourceTable::default();
        let a = table.add(Resource::Path(Arc::new(Path::new())));
        let b = table.add(Resource::TextBlob(Arc::new(TextBlob::new("x", 1.0))));
        assert_eq!((a, b), (0, 1));
        assert_eq!(table.text_blob(b).text(), "x");
    }
}
