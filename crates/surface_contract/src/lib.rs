//! Shared contract types between the desktop layout engine and the rendering surface.
//!
//! The engine never touches elements, styling, or animation. It consumes pointer and
//! resize notifications expressed in the types below and emits target rectangles per
//! icon/component id; a thin adapter on the surface side translates both directions.
//! All coordinates are integer device units with the origin at the container's
//! top-left corner.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// A point in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the container's left edge.
    pub x: i32,
    /// Vertical offset from the container's top edge.
    pub y: i32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Component-wise difference `self - other`.
    pub const fn delta(self, other: Point) -> (i32, i32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// A width/height pair in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in device units.
    pub w: i32,
    /// Height in device units.
    pub h: i32,
}

impl Size {
    /// Creates a size.
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Returns whether both dimensions are strictly positive.
    pub const fn is_positive(self) -> bool {
        self.w > 0 && self.h > 0
    }
}

/// An axis-aligned rectangle in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from an origin point and a size.
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w: size.w,
            h: size.h,
        }
    }

    /// Top-left corner.
    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Dimensions.
    pub const fn size(self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Exclusive right edge.
    pub const fn right(self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    pub const fn bottom(self) -> i32 {
        self.y + self.h
    }

    /// Center point (rounded toward the top-left for odd dimensions).
    pub const fn center(self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Returns this rectangle grown by `pad` device units on every side.
    pub const fn expanded(self, pad: i32) -> Self {
        Self {
            x: self.x - pad,
            y: self.y - pad,
            w: self.w + pad * 2,
            h: self.h + pad * 2,
        }
    }

    /// Returns whether `self` and `other` overlap.
    ///
    /// Two rectangles overlap unless they are separated on at least one axis.
    /// Zero-area rectangles never overlap anything.
    pub const fn intersects(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Overlap test with both rectangles independently expanded by `pad`.
    ///
    /// Unlike [`Rect::intersects`], expanded rectangles that exactly touch count
    /// as overlapping: two elements are separated only when the gap between them
    /// is strictly wider than `2 * pad`.
    pub const fn intersects_padded(self, other: Rect, pad: i32) -> bool {
        let a = self.expanded(pad);
        let b = other.expanded(pad);
        a.x <= b.right() && b.x <= a.right() && a.y <= b.bottom() && b.y <= a.bottom()
    }

    /// Squared Euclidean distance between the centers of `self` and `other`.
    ///
    /// Squared distance preserves ordering, which is all nearest-neighbor
    /// selection needs, and avoids floating point entirely.
    pub fn center_distance_sq(self, other: Rect) -> i64 {
        let a = self.center();
        let b = other.center();
        let dx = (a.x - b.x) as i64;
        let dy = (a.y - b.y) as i64;
        dx * dx + dy * dy
    }

    /// Returns whether this rectangle lies entirely inside `container`.
    pub const fn fits_within(self, container: Size) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= container.w && self.bottom() <= container.h
    }

    /// Clamps this rectangle's origin so it lies within `container`, each axis
    /// independently. Rectangles larger than the container pin to the origin.
    pub fn clamped_within(self, container: Size) -> Self {
        Self {
            x: self.x.clamp(0, (container.w - self.w).max(0)),
            y: self.y.clamp(0, (container.h - self.h).max(0)),
            ..self
        }
    }
}

/// Clamps an origin point so an element of `size` stays inside `container`,
/// each axis independently.
pub fn clamp_origin(origin: Point, size: Size, container: Size) -> Point {
    Point {
        x: origin.x.clamp(0, (container.w - size.w).max(0)),
        y: origin.y.clamp(0, (container.h - size.h).max(0)),
    }
}

/// A pointer position reported by the surface, in container coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl PointerPosition {
    /// Creates a pointer position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to a plain [`Point`].
    pub const fn point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Identifies one drawable the surface positions on behalf of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderTargetId {
    /// A desktop shortcut icon, by numeric icon id.
    Icon(u64),
    /// A floating overlay component, by string component id.
    Component(String),
}

/// One target rectangle the surface should apply to a drawable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTarget {
    /// Which drawable this rectangle belongs to.
    pub id: RenderTargetId,
    /// Where the drawable should be placed.
    pub rect: Rect,
}
