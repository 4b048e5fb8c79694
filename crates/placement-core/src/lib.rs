//! Signature placement core: the overlay transform controller, scoped global
//! pointer listeners and the session that wires them to a document and a
//! persistence boundary.

pub mod config;
pub mod controller;
pub mod listeners;
pub mod session;

pub use config::{ConfigError, PlacementConfig, CONFIRMATION_ROUTE, DEFAULT_RENDER_WIDTH};
pub use controller::{OverlayController, PointerTarget, ViewportSource};
pub use listeners::{GlobalPointerEvent, ListenerGuard, ListenerKind, PointerHub};
pub use session::{DocumentRenderer, Navigator, PersistenceBoundary, PlacementSession};
