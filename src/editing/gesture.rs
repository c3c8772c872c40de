// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Drag / resize gesture state machine for the signature box.
//!
//! A [`Gesture`] lives for exactly one pointer-down-to-pointer-up cycle. It
//! captures the anchor pointer position and the box's screen rect at the
//! start, then derives a candidate rect from every pointer move as
//! `anchor rect + (pointer - anchor)` - never by accumulating per-event
//! deltas, so a wild intermediate event can't leave residue. All math here
//! is screen-pixel math; nothing round-trips through point space until the
//! owning workflow commits the final rect on pointer-up.
//!
//! [`BoxController`] owns the optional active gesture and gives the cycle a
//! symmetric lifecycle: `pointer_up` and `cancel` both consume the gesture,
//! so a stray move event after the cycle ends has nothing to act on.

use kurbo::{Point, Rect, Size, Vec2};

use crate::settings;

/// Which corner handle a resize grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeCorner {
    /// All four corners, pairable with [`corner_point`]
    pub const ALL: [ResizeCorner; 4] = [
        ResizeCorner::TopLeft,
        ResizeCorner::TopRight,
        ResizeCorner::BottomLeft,
        ResizeCorner::BottomRight,
    ];

    /// Does dragging this corner move the box's left edge?
    fn moves_left_edge(self) -> bool {
        matches!(self, ResizeCorner::TopLeft | ResizeCorner::BottomLeft)
    }

    /// Does dragging this corner move the box's top edge?
    fn moves_top_edge(self) -> bool {
        matches!(self, ResizeCorner::TopLeft | ResizeCorner::TopRight)
    }
}

/// The screen position of a corner handle on `rect`.
pub fn corner_point(rect: Rect, corner: ResizeCorner) -> Point {
    match corner {
        ResizeCorner::TopLeft => Point::new(rect.x0, rect.y0),
        ResizeCorner::TopRight => Point::new(rect.x1, rect.y0),
        ResizeCorner::BottomLeft => Point::new(rect.x0, rect.y1),
        ResizeCorner::BottomRight => Point::new(rect.x1, rect.y1),
    }
}

/// Hit-test a pointer against the four corner handles.
pub fn hit_corner(rect: Rect, pointer: Point, radius: f64) -> Option<ResizeCorner> {
    ResizeCorner::ALL
        .into_iter()
        .find(|&corner| corner_point(rect, corner).distance(pointer) <= radius)
}

/// What an active gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeCorner),
}

/// One pointer-down-to-pointer-up interaction with the box.
#[derive(Debug, Clone)]
pub struct Gesture {
    kind: GestureKind,
    /// Pointer position at pointer-down
    anchor: Point,
    /// Box rect at pointer-down
    start_rect: Rect,
    /// Container size the box must stay inside
    bounds: Size,
    /// Current candidate rect (starts equal to `start_rect`)
    current: Rect,
}

impl Gesture {
    pub fn begin_drag(rect: Rect, pointer: Point, bounds: Size) -> Self {
        Self {
            kind: GestureKind::Drag,
            anchor: pointer,
            start_rect: rect,
            bounds,
            current: rect,
        }
    }

    pub fn begin_resize(rect: Rect, corner: ResizeCorner, pointer: Point, bounds: Size) -> Self {
        Self {
            kind: GestureKind::Resize(corner),
            anchor: pointer,
            start_rect: rect,
            bounds,
            current: rect,
        }
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// The live candidate rect, for drawing during the gesture
    pub fn rect(&self) -> Rect {
        self.current
    }

    /// Recompute the candidate rect for a new pointer position.
    pub fn update(&mut self, pointer: Point) {
        let delta = pointer - self.anchor;
        self.current = match self.kind {
            GestureKind::Drag => drag_rect(self.start_rect, delta, self.bounds),
            GestureKind::Resize(corner) => {
                resize_rect(self.start_rect, corner, delta, self.bounds)
            }
        };
    }

    /// End the gesture at `pointer` and yield the final rect.
    pub fn finish(mut self, pointer: Point) -> Rect {
        self.update(pointer);
        self.current
    }
}

/// Translate `start` by `delta`, keeping the box fully inside the container.
fn drag_rect(start: Rect, delta: Vec2, bounds: Size) -> Rect {
    let max_x = (bounds.width - start.width()).max(0.0);
    let max_y = (bounds.height - start.height()).max(0.0);

    let x = (start.x0 + delta.x).clamp(0.0, max_x);
    let y = (start.y0 + delta.y).clamp(0.0, max_y);

    Rect::new(x, y, x + start.width(), y + start.height())
}

/// Move the two edges adjacent to `corner` by `delta`.
///
/// The box can neither invert nor shrink below the minimum size, and moved
/// edges are clamped to the container. The minimum-size clamp is applied
/// last so it wins over the container clamp.
fn resize_rect(start: Rect, corner: ResizeCorner, delta: Vec2, bounds: Size) -> Rect {
    let min_w = settings::gesture::MIN_WIDTH_PX;
    let min_h = settings::gesture::MIN_HEIGHT_PX;

    let (x0, x1) = if corner.moves_left_edge() {
        let x0 = (start.x0 + delta.x).max(0.0).min(start.x1 - min_w);
        (x0, start.x1)
    } else {
        let x1 = (start.x1 + delta.x).min(bounds.width).max(start.x0 + min_w);
        (start.x0, x1)
    };

    let (y0, y1) = if corner.moves_top_edge() {
        let y0 = (start.y0 + delta.y).max(0.0).min(start.y1 - min_h);
        (y0, start.y1)
    } else {
        let y1 = (start.y1 + delta.y).min(bounds.height).max(start.y0 + min_h);
        (start.y0, y1)
    };

    Rect::new(x0, y0, x1, y1)
}

/// Owns the active gesture (if any) for one signature box.
///
/// Pointer capture is modeled by ownership: beginning a gesture acquires
/// it, `pointer_up` / `cancel` release it. A second pointer-down while one
/// gesture is active is not a supported input and is ignored.
#[derive(Debug, Clone, Default)]
pub struct BoxController {
    gesture: Option<Gesture>,
}

impl BoxController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Begin dragging the box body.
    pub fn begin_drag(&mut self, rect: Rect, pointer: Point, bounds: Size) {
        if self.gesture.is_some() {
            tracing::warn!("ignoring pointer-down during an active gesture");
            return;
        }
        self.gesture = Some(Gesture::begin_drag(rect, pointer, bounds));
    }

    /// Begin resizing from a corner handle.
    pub fn begin_resize(
        &mut self,
        rect: Rect,
        corner: ResizeCorner,
        pointer: Point,
        bounds: Size,
    ) {
        if self.gesture.is_some() {
            tracing::warn!("ignoring pointer-down during an active gesture");
            return;
        }
        self.gesture = Some(Gesture::begin_resize(rect, corner, pointer, bounds));
    }

    /// Advance the active gesture; returns the live rect for drawing.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Rect> {
        let gesture = self.gesture.as_mut()?;
        gesture.update(pointer);
        Some(gesture.rect())
    }

    /// End the active gesture, consuming it. The returned rect is the one
    /// the caller commits through the coordinate transformer; `None` when
    /// no gesture was active.
    pub fn pointer_up(&mut self, pointer: Point) -> Option<Rect> {
        self.gesture.take().map(|g| g.finish(pointer))
    }

    /// The live rect of the active gesture, for drawing
    pub fn live_rect(&self) -> Option<Rect> {
        self.gesture.as_ref().map(Gesture::rect)
    }

    /// Abandon the active gesture without committing anything.
    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            tracing::debug!("gesture cancelled; keeping last committed placement");
        }
    }
}
