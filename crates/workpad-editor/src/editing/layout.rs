//! Geometry types and the host layout seam.
//!
//! The engine never measures anything itself. Whatever renders the surface
//! implements [`SurfaceLayout`] so pointer gestures can be translated into
//! anchor coordinates. All `client` coordinates share one space (the host's
//! viewport); anchor positions are stored relative to the scrollable content
//! box.

use serde::{Deserialize, Serialize};

use crate::surface::{NodeId, Position, SurfaceRange};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }
}

/// The surface's scrollable content box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContentBox {
    /// Client coordinates of the visible top-left corner
    pub origin: Point,
    /// Current scroll offset
    pub scroll: Point,
    /// Full scrollable extent, not just the visible part
    pub size: Size,
}

impl ContentBox {
    /// Convert a client point into content coordinates.
    pub fn to_content(&self, client: Point) -> Point {
        Point::new(
            client.x - self.origin.x + self.scroll.x,
            client.y - self.origin.y + self.scroll.y,
        )
    }

    /// Convert a content point into client coordinates.
    pub fn to_client(&self, content: Point) -> Point {
        Point::new(
            content.x + self.origin.x - self.scroll.x,
            content.y + self.origin.y - self.scroll.y,
        )
    }

    /// Clamp a top-left corner so a box of `size` stays inside.
    pub fn clamp(&self, top_left: Point, size: Size) -> Point {
        let max_x = (self.size.width - size.width).max(0.0);
        let max_y = (self.size.height - size.height).max(0.0);
        Point::new(top_left.x.clamp(0.0, max_x), top_left.y.clamp(0.0, max_y))
    }
}

/// Geometry queries the host answers on behalf of the engine.
///
/// Only [`SurfaceLayout::content_box`] is mandatory; the engine falls back
/// to the persisted anchor attributes when a measurement is unavailable.
pub trait SurfaceLayout {
    fn content_box(&self) -> ContentBox;

    /// Rendered box of an anchor wrapper, in client coordinates.
    fn anchor_box(&self, _anchor: NodeId) -> Option<Rect> {
        None
    }

    /// Caret or selection box of a range, in client coordinates.
    fn caret_rect(&self, _range: &SurfaceRange) -> Option<Rect> {
        None
    }

    /// Hit-test a client point to a boundary point in the surface.
    fn position_at(&self, _client: Point) -> Option<Position> {
        None
    }
}

/// A layout with a fixed content box and no measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLayout {
    pub content: ContentBox,
}

impl StaticLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            content: ContentBox {
                size: Size::new(width, height),
                ..ContentBox::default()
            },
        }
    }
}

impl SurfaceLayout for StaticLayout {
    fn content_box(&self) -> ContentBox {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_conversion_accounts_for_origin_and_scroll() {
        let content = ContentBox {
            origin: Point::new(100.0, 50.0),
            scroll: Point::new(0.0, 200.0),
            size: Size::new(800.0, 2000.0),
        };

        let p = content.to_content(Point::new(110.0, 60.0));
        assert_eq!(p, Point::new(10.0, 210.0));
        assert_eq!(content.to_client(p), Point::new(110.0, 60.0));
    }

    #[test]
    fn clamp_keeps_box_inside() {
        let content = StaticLayout::new(400.0, 300.0).content_box();
        let size = Size::new(160.0, 100.0);

        assert_eq!(content.clamp(Point::new(-50.0, -50.0), size), Point::new(0.0, 0.0));
        assert_eq!(
            content.clamp(Point::new(390.0, 290.0), size),
            Point::new(240.0, 200.0)
        );
    }

    #[test]
    fn clamp_pins_oversized_box_to_origin() {
        let content = StaticLayout::new(100.0, 100.0).content_box();

        assert_eq!(
            content.clamp(Point::new(30.0, 30.0), Size::new(200.0, 200.0)),
            Point::new(0.0, 0.0)
        );
    }
}
