//! Gesture scripts: a recorded sequence of pointer and navigation events
//! replayed against a placement session.

use placement_core::{
    GlobalPointerEvent, Navigator, PersistenceBoundary, PlacementSession, PointerHub,
    PointerTarget,
};
use placement_model::{ConfirmedPlacement, Point, ViewportRect};
use serde::Deserialize;
use std::cell::Cell;

#[derive(Debug, Clone, Deserialize)]
pub struct GestureScript {
    /// Container bounds; when absent the rendered page bounds are used
    #[serde(default)]
    pub viewport: Option<ViewportRect>,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTarget {
    Overlay,
    ResizeHandle,
    RotateHandle,
    Elsewhere,
}

impl From<ScriptTarget> for PointerTarget {
    fn from(value: ScriptTarget) -> Self {
        match value {
            ScriptTarget::Overlay => Self::Overlay,
            ScriptTarget::ResizeHandle => Self::ResizeHandle,
            ScriptTarget::RotateHandle => Self::RotateHandle,
            ScriptTarget::Elsewhere => Self::Elsewhere,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    PointerDown { target: ScriptTarget, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerRelease,
    SetViewport { viewport: Option<ViewportRect> },
    PreviousPage,
    NextPage,
    Confirm,
    Back,
}

/// Records navigation instead of switching screens.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub routes: Vec<String>,
}

pub const BACK_ROUTE: &str = "<back>";

impl Navigator for RecordingNavigator {
    fn push(&mut self, route: &str) {
        self.routes.push(route.to_owned());
    }

    fn back(&mut self) {
        self.routes.push(BACK_ROUTE.to_owned());
    }
}

/// Replays `steps`. Pointer moves and releases go through the global hub,
/// the same path a real host would use.
pub fn replay<B>(
    steps: &[ScriptStep],
    hub: &PointerHub,
    viewport: &Cell<Option<ViewportRect>>,
    session: &mut PlacementSession<B, RecordingNavigator>,
) -> Result<Option<ConfirmedPlacement>, B::Error>
where
    B: PersistenceBoundary,
{
    let mut confirmed = None;

    for step in steps {
        match *step {
            ScriptStep::PointerDown { target, x, y } => {
                session.pointer_down(target.into(), Point::new(x, y));
            }
            ScriptStep::PointerMove { x, y } => {
                hub.dispatch(GlobalPointerEvent::Move(Point::new(x, y)));
            }
            ScriptStep::PointerRelease => {
                hub.dispatch(GlobalPointerEvent::Release);
            }
            ScriptStep::SetViewport { viewport: rect } => viewport.set(rect),
            ScriptStep::PreviousPage => {
                session.previous_page();
            }
            ScriptStep::NextPage => {
                session.next_page();
            }
            ScriptStep::Confirm => confirmed = Some(session.confirm()?),
            ScriptStep::Back => session.back(),
        }
    }

    Ok(confirmed)
}
