//! Display-list recording and playback for the Tessera rendering engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Recording** ([`DisplayListBuilder`])
//!   - Attribute ops recorded only when the value changes
//!   - Save/restore and layer nesting, closed automatically on build
//!   - Canonicalization of simple shapes, paths and transforms
//!
//! - **Storage** ([`op`])
//!   - Variable-size records with a 4-byte header, packed into a paged
//!     byte arena
//!   - Shared resources (paths, images, filters, nested lists) held by
//!     reference count outside the byte buffer
//!
//! - **Playback** ([`Dispatcher`], [`Canvas`])
//!   - Full or ranged replay into any dispatcher
//!   - An adapter lowering ops onto paint-per-call backends
//!
//! - **Queries** ([`DisplayList`])
//!   - Cached conservative bounds
//!   - Structural equality with bulk byte comparison
//!   - Nested op and byte counts
//!
//! # Threading
//!
//! A built [`DisplayList`] is immutable and `Send + Sync`. Builders are
//! single-threaded.

mod bounds;
/// Recording display lists.
pub mod builder;
/// Playback onto paint-per-call rendering backends.
pub mod canvas;
/// Colors and blend modes.
pub mod color;
/// The playback interface.
pub mod dispatcher;
/// Sealed display lists.
pub mod display_list;
/// Shaders, filters, path effects and shadow geometry.
pub mod effects;
mod equality;
/// Geometry value types.
pub mod geometry;
/// The op catalog and record header encoding.
pub mod op;
/// Paint attributes and drawing enums.
pub mod paint;
/// Vector paths.
pub mod path;
mod record;
/// Text blobs, vertex meshes and the resource table.
pub mod resource;
/// The byte arena backing a display list.
pub mod storage;

pub use builder::DisplayListBuilder;
pub use canvas::{Canvas, CanvasDispatcher};
pub use color::{BlendMode, Color};
pub use dispatcher::Dispatcher;
pub use display_list::DisplayList;
pub use effects::{
    ColorFilter, GradientStop, ImageFilter, MaskFilter, PathEffect, ShadowGeometry, Shader,
};
pub use geometry::{IRect, Matrix, Point, RRect, RSTransform, Rect};
pub use op::{CompareResult, OpHeader, OpKind};
pub use paint::{
    BlurStyle, ClipOp, DrawStyle, FillType, ImageSampling, Paint, PointMode, SrcRectConstraint,
    StrokeCap, StrokeJoin, TileMode,
};
pub use path::{Path, PathVerb};
pub use resource::{TextBlob, VertexMode, Vertices};
pub use storage::PAGE_SIZE;
pub use tessera_common::Image;
