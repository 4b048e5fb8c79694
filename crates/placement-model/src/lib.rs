//! Plain data for signature placement: geometry, the overlay transform,
//! the interaction mode and the document position.

mod asset;
mod document;

pub use asset::{AssetError, SignatureAsset};
pub use document::{apply_page_action, DocumentPosition, PageAction};

use serde::{Deserialize, Serialize};

/// Smallest width or height an overlay can be resized to, in pixels.
pub const MIN_OVERLAY_EDGE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// On-screen bounds of the container holding the page and the overlay.
///
/// All pointer math is done relative to `left`/`top`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// A container that has not been laid out yet reports zero or garbage bounds.
    pub fn is_measured(&self) -> bool {
        [self.left, self.top, self.width, self.height].iter().all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Converts a client-space pointer position into container-local coordinates.
    pub fn to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.left, client.y - self.top)
    }
}

/// Placement of the signature overlay on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayTransform {
    pub position: Point,
    pub size: Size,
    pub rotation_degrees: f64,
}

impl Default for OverlayTransform {
    fn default() -> Self {
        Self {
            position: Point::new(100.0, 100.0),
            size: Size::new(200.0, 100.0),
            rotation_degrees: 0.0,
        }
    }
}

impl OverlayTransform {
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }
}

/// The single active pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    Resizing,
    /// `reference_degrees` is the pointer angle captured when the gesture began.
    Rotating { reference_degrees: f64 },
}

impl InteractionMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn cursor(&self) -> CursorHint {
        match self {
            Self::Idle => CursorHint::Grab,
            Self::Dragging => CursorHint::Grabbing,
            Self::Resizing => CursorHint::ResizeSouthEast,
            Self::Rotating { .. } => CursorHint::Pointer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging => "dragging",
            Self::Resizing => "resizing",
            Self::Rotating { .. } => "rotating",
        }
    }
}

/// CSS-style cursor name for the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorHint {
    Grab,
    Grabbing,
    #[serde(rename = "se-resize")]
    ResizeSouthEast,
    Pointer,
}

/// What the confirm action hands to the next step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedPlacement {
    pub page_number: u32,
    pub transform: OverlayTransform,
}
