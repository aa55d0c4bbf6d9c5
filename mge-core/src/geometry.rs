//! 2D collision primitives: axis-aligned rectangles and circles.
//!
//! This module provides the closed shape set used by hitboxes, plus the
//! `Region` rectangle handed to the rendering layer for clipping/placement.
//!
//! Edge policy: shapes that merely touch are **not** intersecting. Circle
//! tests compare distances with a strict `<`, rectangle tests require strict
//! interior overlap on every axis. Callers rely on boundary-adjacent shapes
//! (tiles sharing an edge, tangent circles) never colliding.

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Zero or negative sizes are accepted and simply never intersect anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Separating-axis test. Rectangles sharing only a boundary edge do not
    /// intersect: the separating conditions compare with `<=`/`>=`.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (left_a, right_a) = (self.x, self.x + self.w);
        let (top_a, bottom_a) = (self.y, self.y + self.h);
        let (left_b, right_b) = (other.x, other.x + other.w);
        let (top_b, bottom_b) = (other.y, other.y + other.h);

        !(right_a <= left_b || left_a >= right_b || top_a >= bottom_b || bottom_a <= top_b)
    }
}

/// Circle anchored at its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub r: i32,
}

impl Circle {
    pub fn new(x: i32, y: i32, r: i32) -> Self {
        Self { x, y, r }
    }

    /// Euclidean center distance strictly below the radius sum. Exactly
    /// tangent circles do not intersect.
    pub fn intersects(&self, other: &Circle) -> bool {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let distance = ((dx * dx + dy * dy) as f64).sqrt();
        distance < (i64::from(self.r) + i64::from(other.r)) as f64
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        circle_hits_rect(self, rect)
    }
}

/// Nearest-point test shared by both circle/rect dispatch directions, so the
/// outcome is identical no matter which shape the call starts from.
///
/// The clamp is written as an explicit chain (not `clamp()`) so degenerate
/// rectangles with negative sizes stay silently non-intersecting.
fn circle_hits_rect(circle: &Circle, rect: &Rect) -> bool {
    let nearest_x = if circle.x < rect.x {
        rect.x
    } else if circle.x > rect.x + rect.w {
        rect.x + rect.w
    } else {
        circle.x
    };
    let nearest_y = if circle.y < rect.y {
        rect.y
    } else if circle.y > rect.y + rect.h {
        rect.y + rect.h
    } else {
        circle.y
    };

    let dx = i64::from(circle.x) - i64::from(nearest_x);
    let dy = i64::from(circle.y) - i64::from(nearest_y);
    let r = i64::from(circle.r);

    dx * dx + dy * dy < r * r
}

/// Closed set of collision shapes.
///
/// The kind of a shape never changes after construction; its geometric
/// fields stay mutable in place so a hitbox can track a moving object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::Rect(Rect::new(x, y, w, h))
    }

    pub fn circle(x: i32, y: i32, r: i32) -> Self {
        Self::Circle(Circle::new(x, y, r))
    }

    /// Pure intersection test over every shape pairing. Symmetric:
    /// `a.intersects(b) == b.intersects(a)`.
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Rect(a), Shape::Rect(b)) => a.intersects(b),
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects(b),
            (Shape::Circle(c), Shape::Rect(r)) | (Shape::Rect(r), Shape::Circle(c)) => {
                circle_hits_rect(c, r)
            }
        }
    }

    /// Moves the shape by the given deltas.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            Shape::Rect(rect) => {
                rect.x += dx;
                rect.y += dy;
            }
            Shape::Circle(circle) => {
                circle.x += dx;
                circle.y += dy;
            }
        }
    }

    /// Grows the shape by the given deltas. For a circle `dw` adjusts the
    /// radius and `dh` is ignored.
    pub fn resize(&mut self, dw: i32, dh: i32) {
        match self {
            Shape::Rect(rect) => {
                rect.w += dw;
                rect.h += dh;
            }
            Shape::Circle(circle) => {
                circle.r += dw;
            }
        }
    }
}

/// Clip/placement rectangle forwarded verbatim to the rendering layer.
///
/// Not collision geometry: a `Region` selects what part of a visual resource
/// is shown (clip) or where it lands on screen (placement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}
