//! Placement session: lifecycle wiring of the signature placement screen.
//!
//! Mounting reads the stored signature once and attaches global pointer
//! listeners; dropping the session detaches them. The session owns page
//! navigation and forwards the confirmed placement to the persistence boundary.

use std::cell::RefCell;
use std::rc::Rc;

use placement_model::{
    apply_page_action, ConfirmedPlacement, DocumentPosition, InteractionMode, OverlayTransform,
    PageAction, Point, SignatureAsset,
};

use crate::config::PlacementConfig;
use crate::controller::{OverlayController, PointerTarget, ViewportSource};
use crate::listeners::{GlobalPointerEvent, ListenerGuard, ListenerKind, PointerHub};

/// Where the signature comes from and where the confirmed placement goes.
pub trait PersistenceBoundary {
    type Error: std::error::Error;

    /// Previously captured signature, if any.
    fn load_signature(&self) -> Result<Option<SignatureAsset>, Self::Error>;

    /// Accepts the confirmed placement for the next step.
    fn hand_off(&mut self, placement: &ConfirmedPlacement) -> Result<(), Self::Error>;
}

/// Screen-to-screen navigation.
pub trait Navigator {
    fn push(&mut self, route: &str);
    fn back(&mut self);
}

/// Renders the document the signature is placed on.
pub trait DocumentRenderer {
    type Page;
    type Error: std::error::Error;

    /// Loads the document and reports its page count.
    fn load(&mut self) -> Result<u32, Self::Error>;

    /// Renders a 1-indexed page at the given pixel width.
    fn render_page(&mut self, page_number: u32, width_px: u32) -> Result<Self::Page, Self::Error>;
}

pub struct PlacementSession<B, N> {
    overlay: Rc<RefCell<OverlayController>>,
    viewport: Rc<dyn ViewportSource>,
    document: DocumentPosition,
    signature: Option<SignatureAsset>,
    boundary: B,
    navigator: N,
    render_width_px: u32,
    confirmation_route: String,
    _listeners: [ListenerGuard; 2],
}

impl<B, N> PlacementSession<B, N>
where
    B: PersistenceBoundary,
    N: Navigator,
{
    pub fn mount(
        hub: &PointerHub,
        viewport: Rc<dyn ViewportSource>,
        boundary: B,
        navigator: N,
        config: &PlacementConfig,
    ) -> Self {
        let signature = match boundary.load_signature() {
            Ok(Some(asset)) => Some(asset),
            Ok(None) => {
                log::debug!("no stored signature, overlay hidden");
                None
            }
            Err(err) => {
                log::warn!("stored signature unavailable, overlay hidden: {err}");
                None
            }
        };

        let overlay = Rc::new(RefCell::new(
            OverlayController::new().with_min_edge(config.min_overlay_edge),
        ));

        let move_listener = {
            let overlay = Rc::clone(&overlay);
            let viewport = Rc::clone(&viewport);
            hub.add_listener(ListenerKind::PointerMove, move |event| {
                if let GlobalPointerEvent::Move(pointer) = event {
                    overlay.borrow_mut().on_pointer_move(pointer, &*viewport);
                }
            })
        };

        let release_listener = {
            let overlay = Rc::clone(&overlay);
            hub.add_listener(ListenerKind::PointerRelease, move |_| {
                overlay.borrow_mut().end_interaction();
            })
        };

        Self {
            overlay,
            viewport,
            document: DocumentPosition::default(),
            signature,
            boundary,
            navigator,
            render_width_px: config.render_width_px,
            confirmation_route: config.confirmation_route.clone(),
            _listeners: [move_listener, release_listener],
        }
    }

    /// Whether an overlay is shown at all.
    pub fn has_overlay(&self) -> bool {
        self.signature.is_some()
    }

    pub fn signature(&self) -> Option<&SignatureAsset> {
        self.signature.as_ref()
    }

    pub fn transform(&self) -> OverlayTransform {
        *self.overlay.borrow().transform()
    }

    pub fn mode(&self) -> InteractionMode {
        self.overlay.borrow().mode()
    }

    pub fn document(&self) -> DocumentPosition {
        self.document
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Pointer-down inside the container. Ignored when no overlay is shown.
    pub fn pointer_down(&mut self, target: PointerTarget, pointer: Point) -> bool {
        if !self.has_overlay() {
            return false;
        }

        self.overlay.borrow_mut().pointer_down(target, pointer, &*self.viewport)
    }

    /// Loads the document through `renderer`. A failed load leaves the page count unknown.
    pub fn load_document<R: DocumentRenderer>(&mut self, renderer: &mut R) -> Option<u32> {
        match renderer.load() {
            Ok(page_count) => {
                self.on_document_loaded(page_count);
                Some(page_count)
            }
            Err(err) => {
                log::warn!("document failed to load: {err}");
                self.on_document_load_failed();
                None
            }
        }
    }

    pub fn on_document_loaded(&mut self, page_count: u32) {
        self.document.set_page_count(page_count);
    }

    pub fn on_document_load_failed(&mut self) {
        self.document.clear_page_count();
    }

    pub fn render_current_page<R: DocumentRenderer>(
        &self,
        renderer: &mut R,
    ) -> Result<R::Page, R::Error> {
        renderer.render_page(self.document.page_number, self.render_width_px)
    }

    pub fn can_go_previous(&self) -> bool {
        self.document.can_go_previous()
    }

    pub fn can_go_next(&self) -> bool {
        self.document.can_go_next()
    }

    pub fn previous_page(&mut self) -> bool {
        apply_page_action(&mut self.document, PageAction::Previous)
    }

    pub fn next_page(&mut self) -> bool {
        apply_page_action(&mut self.document, PageAction::Next)
    }

    pub fn go_to_page(&mut self, page_number: u32) -> bool {
        apply_page_action(&mut self.document, PageAction::GoTo(page_number))
    }

    pub fn page_label(&self) -> String {
        self.document.label()
    }

    /// Hands the current placement off, then moves to the confirmation step.
    pub fn confirm(&mut self) -> Result<ConfirmedPlacement, B::Error> {
        let placement = ConfirmedPlacement {
            page_number: self.document.page_number,
            transform: self.overlay.borrow().confirm(),
        };

        self.boundary.hand_off(&placement)?;
        log::info!(
            "signature placed on page {} at ({}, {})",
            placement.page_number,
            placement.transform.position.x,
            placement.transform.position.y
        );

        self.navigator.push(&self.confirmation_route);
        Ok(placement)
    }

    pub fn back(&mut self) {
        self.navigator.back();
    }
}
