//! Overlay transform controller
//!
//! Turns pointer events over the document container into moves, resizes and
//! rotations of the signature overlay:
//! - Pointer-down on the overlay body starts a drag
//! - Pointer-down on the corner handle starts a resize
//! - Pointer-down on the rotate handle starts a rotation
//!
//! Exactly one interaction is active at a time. The container bounds are
//! re-queried on every event because scrolling or layout changes move them.

use std::cell::Cell;

use placement_model::{
    InteractionMode, OverlayTransform, Point, Size, ViewportRect, MIN_OVERLAY_EDGE,
};

/// Element that received a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The overlay itself, not one of its handles
    Overlay,
    /// Bottom-right resize handle
    ResizeHandle,
    /// Top-left rotate handle
    RotateHandle,
    /// Anything else inside or outside the container
    Elsewhere,
}

/// Provides the current on-screen bounds of the container.
///
/// `None` means the container has not been laid out yet.
pub trait ViewportSource {
    fn viewport_rect(&self) -> Option<ViewportRect>;
}

impl ViewportSource for ViewportRect {
    fn viewport_rect(&self) -> Option<ViewportRect> {
        Some(*self)
    }
}

impl ViewportSource for Option<ViewportRect> {
    fn viewport_rect(&self) -> Option<ViewportRect> {
        *self
    }
}

impl ViewportSource for Cell<Option<ViewportRect>> {
    fn viewport_rect(&self) -> Option<ViewportRect> {
        self.get()
    }
}

#[derive(Debug, Clone)]
pub struct OverlayController {
    transform: OverlayTransform,
    mode: InteractionMode,
    min_edge: f64,
}

impl Default for OverlayController {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayController {
    pub fn new() -> Self {
        Self::with_transform(OverlayTransform::default())
    }

    pub fn with_transform(transform: OverlayTransform) -> Self {
        Self { transform, mode: InteractionMode::Idle, min_edge: MIN_OVERLAY_EDGE }
    }

    /// Raises the resize floor. It never drops below [`MIN_OVERLAY_EDGE`].
    pub fn with_min_edge(mut self, min_edge: f64) -> Self {
        if min_edge.is_finite() {
            self.min_edge = min_edge.max(MIN_OVERLAY_EDGE);
        }
        self
    }

    pub fn transform(&self) -> &OverlayTransform {
        &self.transform
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn min_edge(&self) -> f64 {
        self.min_edge
    }

    /// Routes a pointer-down to the matching begin operation.
    ///
    /// Handle presses are consumed by the handle, so they never start a drag.
    pub fn pointer_down<V>(&mut self, target: PointerTarget, pointer: Point, viewport: &V) -> bool
    where
        V: ViewportSource + ?Sized,
    {
        match target {
            PointerTarget::ResizeHandle => self.begin_resize(),
            PointerTarget::RotateHandle => self.begin_rotate(pointer, viewport),
            PointerTarget::Overlay | PointerTarget::Elsewhere => self.begin_drag(target),
        }
    }

    /// Starts a drag if the press landed on the overlay body.
    pub fn begin_drag(&mut self, target: PointerTarget) -> bool {
        if target != PointerTarget::Overlay {
            return false;
        }

        self.enter(InteractionMode::Dragging)
    }

    pub fn begin_resize(&mut self) -> bool {
        self.enter(InteractionMode::Resizing)
    }

    /// Captures the pointer angle around the overlay center as the rotation reference.
    pub fn begin_rotate<V>(&mut self, pointer: Point, viewport: &V) -> bool
    where
        V: ViewportSource + ?Sized,
    {
        if self.mode.is_active() {
            return false;
        }

        let Some(local) = local_pointer(pointer, viewport) else {
            log::debug!("rotate ignored: container not measured");
            return false;
        };

        let reference_degrees = angle_degrees(self.transform.center(), local);
        if !self.enter(InteractionMode::Rotating { reference_degrees }) {
            return false;
        }

        self.transform.rotation_degrees = 0.0;
        true
    }

    /// Applies a pointer move to the active interaction.
    ///
    /// Returns true if the transform changed.
    pub fn on_pointer_move<V>(&mut self, pointer: Point, viewport: &V) -> bool
    where
        V: ViewportSource + ?Sized,
    {
        if !self.mode.is_active() {
            return false;
        }

        let Some(local) = local_pointer(pointer, viewport) else {
            log::debug!("pointer move dropped while {}: no usable geometry", self.mode.name());
            return false;
        };

        let before = self.transform;

        match self.mode {
            InteractionMode::Idle => {}
            InteractionMode::Dragging => {
                let size = self.transform.size;
                self.transform.position = Point::new(
                    (local.x - size.width / 2.0).max(0.0),
                    (local.y - size.height / 2.0).max(0.0),
                );
            }
            InteractionMode::Resizing => {
                let origin = self.transform.position;
                self.transform.size = Size::new(
                    (local.x - origin.x).max(self.min_edge),
                    (local.y - origin.y).max(self.min_edge),
                );
            }
            InteractionMode::Rotating { reference_degrees } => {
                let current = angle_degrees(self.transform.center(), local);
                self.transform.rotation_degrees = current - reference_degrees;
            }
        }

        self.transform != before
    }

    /// Global pointer release. Returns the mode that was active.
    pub fn end_interaction(&mut self) -> InteractionMode {
        let previous = std::mem::take(&mut self.mode);
        if previous.is_active() {
            log::debug!("{} ended", previous.name());
        }
        previous
    }

    /// The transform to hand off. Bounds were already enforced while interacting.
    pub fn confirm(&self) -> OverlayTransform {
        self.transform
    }

    fn enter(&mut self, mode: InteractionMode) -> bool {
        if self.mode.is_active() {
            log::debug!("{} ignored while {}", mode.name(), self.mode.name());
            return false;
        }

        log::debug!("{} started", mode.name());
        self.mode = mode;
        true
    }
}

fn local_pointer<V>(pointer: Point, viewport: &V) -> Option<Point>
where
    V: ViewportSource + ?Sized,
{
    let rect = viewport.viewport_rect().filter(ViewportRect::is_measured)?;
    if !pointer.is_finite() {
        return None;
    }

    Some(rect.to_local(pointer))
}

fn angle_degrees(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}
