// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! The signing workflow: position the box, customize, submit.
//!
//! `SignFlow` is the single writer context over the session. It reacts to
//! named events (document loaded, render completed, pointer input, page
//! change) and recomputes each derived value from its declared inputs -
//! there is no observer machinery. The viewport is page-scoped: changing
//! page drops it, and everything that needs a conversion stays in a
//! not-ready state until the next render completes.

use kurbo::{Point, Rect, Size};

use crate::editing::{BoxController, gesture};
use crate::error::SignError;
use crate::render::RenderedPage;
use crate::session::SessionState;
use crate::settings;
use crate::storage::SnapshotStore;
use crate::submit::{self, SigningClient};
use crate::asset::SignatureAsset;
use crate::viewport::PageViewport;

/// Where the user is in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    /// Upload a document and position the box
    #[default]
    Position,
    /// Appearance, signer details, signature capture
    Customize,
    /// Signed document available
    Complete,
}

/// One signing workflow from upload to signed result.
pub struct SignFlow {
    state: SessionState,
    controller: BoxController,
    viewport: Option<PageViewport>,
    asset: Option<SignatureAsset>,
    step: Step,
    in_flight: bool,
}

impl SignFlow {
    /// Create a workflow, restoring any snapshot the store holds.
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self {
            state: SessionState::new(store),
            controller: BoxController::new(),
            viewport: None,
            asset: None,
            step: Step::Position,
            in_flight: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Direct access to the session mutators (appearance form, etc.)
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.placement().page_number
    }

    pub fn total_pages(&self) -> u32 {
        self.state.session().total_pages.unwrap_or(1)
    }

    pub fn viewport(&self) -> Option<&PageViewport> {
        self.viewport.as_ref()
    }

    // ========================================================================
    // DOCUMENT INTAKE
    // ========================================================================

    /// Accept an uploaded document. The page count is provisional until
    /// [`document_loaded`](Self::document_loaded) reports the real one.
    pub fn load_document(&mut self, bytes: Vec<u8>, name: &str) -> Result<(), SignError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(SignError::InvalidDocument);
        }
        let limit = settings::document::MAX_BYTES;
        if bytes.len() > limit {
            return Err(SignError::DocumentTooLarge {
                size: bytes.len(),
                limit,
            });
        }

        tracing::info!(name, bytes = bytes.len(), "document accepted");
        self.state.set_document(bytes, name, 1);
        self.viewport = None;
        Ok(())
    }

    /// The renderer opened the document and knows its page count.
    pub fn document_loaded(&mut self, total_pages: u32) {
        self.state.set_total_pages(total_pages.max(1));
    }

    // ========================================================================
    // RENDER EVENTS
    // ========================================================================

    /// A page render completed; capture its viewport.
    ///
    /// Metadata for a page other than the one currently shown is stale by
    /// definition (the user already navigated away) and is dropped, so a
    /// rect committed on page 1 can never be reinterpreted against page
    /// 2's height.
    pub fn page_rendered(&mut self, rendered: &RenderedPage) {
        if rendered.page_number != self.current_page() {
            tracing::debug!(
                rendered = rendered.page_number,
                current = self.current_page(),
                "dropping stale viewport for another page"
            );
            return;
        }

        match PageViewport::capture(rendered) {
            Ok(viewport) => self.viewport = Some(viewport),
            Err(e) => tracing::warn!("skipping viewport update: {e}"),
        }
    }

    // ========================================================================
    // PAGE NAVIGATION
    // ========================================================================

    pub fn next_page(&mut self) {
        let page = self.current_page();
        if page < self.total_pages() {
            self.change_page(page + 1);
        }
    }

    pub fn previous_page(&mut self) {
        let page = self.current_page();
        if page > 1 {
            self.change_page(page - 1);
        }
    }

    fn change_page(&mut self, page_number: u32) {
        // The old page's metadata must never touch the new page's rect
        self.controller.cancel();
        self.viewport = None;
        self.state.set_page_number(page_number);
    }

    // ========================================================================
    // BOX INTERACTION
    // ========================================================================

    /// The box's screen rect: the live gesture rect while one is active,
    /// otherwise the committed placement mapped through the viewport.
    /// `None` while no render has completed for this page.
    pub fn box_screen_rect(&self) -> Option<Rect> {
        if let Some(live) = self.controller.live_rect() {
            return Some(live);
        }
        let viewport = self.viewport.as_ref()?;
        Some(viewport.to_screen(&self.state.placement()))
    }

    /// Pointer down on the page: start a resize if a corner handle was
    /// hit, a drag if the body was, otherwise nothing.
    pub fn pointer_down(&mut self, pointer: Point) {
        let Some(viewport) = self.viewport.as_ref() else {
            tracing::debug!("pointer-down before first render; not ready");
            return;
        };

        let rect = viewport.to_screen(&self.state.placement());
        let bounds = Size::new(viewport.display_width, viewport.display_height);

        let radius = settings::gesture::HANDLE_HIT_RADIUS_PX;
        if let Some(corner) = gesture::hit_corner(rect, pointer, radius) {
            self.controller.begin_resize(rect, corner, pointer, bounds);
        } else if rect.contains(pointer) {
            self.controller.begin_drag(rect, pointer, bounds);
        }
    }

    /// Pointer moved; returns the live rect for drawing.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Rect> {
        self.controller.pointer_move(pointer)
    }

    /// Pointer up: commit the gesture's final rect to the session through
    /// the coordinate transformer.
    pub fn pointer_up(&mut self, pointer: Point) {
        let Some(final_rect) = self.controller.pointer_up(pointer) else {
            return;
        };

        let Some(viewport) = self.viewport.as_ref() else {
            // Render raced the gesture; keep the last committed placement
            tracing::warn!("gesture ended before the viewport was captured; not committing");
            return;
        };

        let placement = viewport.to_page(final_rect, self.current_page());
        tracing::debug!(
            x = placement.x,
            y = placement.y,
            width = placement.width,
            height = placement.height,
            page = placement.page_number,
            "committed placement"
        );
        self.state.update_position(placement);
    }

    /// Abandon any active gesture (pointer left tracking, document
    /// cleared, page torn down).
    pub fn cancel_gesture(&mut self) {
        self.controller.cancel();
    }

    // ========================================================================
    // STEP NAVIGATION AND SUBMISSION
    // ========================================================================

    /// Move to the customize step; requires a loaded document.
    pub fn go_to_customize(&mut self) -> Result<(), SignError> {
        if !self.state.has_document() {
            return Err(SignError::DocumentMissing);
        }
        self.step = Step::Customize;
        Ok(())
    }

    /// Back to positioning; everything entered so far is kept.
    pub fn back_to_position(&mut self) {
        self.step = Step::Position;
    }

    /// Record the user's signature selection and mirror it into the
    /// session (raster to volatile memory, typed metadata to the
    /// snapshot).
    pub fn set_signature(&mut self, asset: SignatureAsset) {
        self.state
            .set_signature_image(asset.raster().map(|bytes| bytes.to_vec()));
        match &asset.typed {
            Some(typed) => self
                .state
                .set_typed_signature(Some((typed.text.clone(), typed.font.clone()))),
            None => self.state.set_typed_signature(None),
        }
        self.asset = Some(asset);
    }

    pub fn signature(&self) -> Option<&SignatureAsset> {
        self.asset.as_ref()
    }

    /// Submit the signing request. Success stores the signed document and
    /// completes the workflow; failure leaves every input in place so the
    /// user can retry.
    pub fn submit(&mut self, client: &dyn SigningClient) -> Result<(), SignError> {
        if self.in_flight {
            return Err(SignError::SubmissionInFlight);
        }
        let asset = self.asset.as_ref().ok_or(SignError::AssetMissing)?;
        let request = submit::build_request(&self.state, asset)?;

        self.in_flight = true;
        let result = client.sign(&request);
        self.in_flight = false;

        match result {
            Ok(signed) => {
                tracing::info!(bytes = signed.bytes.len(), "document signed");
                self.state.set_signed_result(signed.bytes);
                self.step = Step::Complete;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("signing failed: {e}");
                Err(e)
            }
        }
    }

    /// Discard the whole session and start from a clean slate.
    pub fn start_over(&mut self) {
        self.state.reset();
        self.controller.cancel();
        self.viewport = None;
        self.asset = None;
        self.step = Step::Position;
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PageRenderer, StaticPageRenderer};
    use crate::session::SignerPatch;
    use crate::storage::MemoryStore;
    use crate::submit::{SignatureRequest, SignedDocument};
    use kurbo::Size as KSize;

    fn flow_with_document(pages: u32) -> (SignFlow, StaticPageRenderer) {
        let mut flow = SignFlow::new(Box::new(MemoryStore::new()));
        flow.load_document(b"%PDF-1.4 test".to_vec(), "test.pdf").unwrap();
        let renderer = StaticPageRenderer::letter(pages);
        flow.document_loaded(pages);
        (flow, renderer)
    }

    fn render_current(flow: &mut SignFlow, renderer: &mut StaticPageRenderer, width: f64) {
        let rendered = renderer.render_page(flow.current_page(), width).unwrap();
        flow.page_rendered(&rendered);
    }

    struct OkClient;
    impl SigningClient for OkClient {
        fn sign(&self, _request: &SignatureRequest) -> Result<SignedDocument, SignError> {
            Ok(SignedDocument {
                bytes: b"%PDF-1.4 signed".to_vec(),
                message: "signed".to_owned(),
            })
        }
    }

    struct FailClient;
    impl SigningClient for FailClient {
        fn sign(&self, _request: &SignatureRequest) -> Result<SignedDocument, SignError> {
            Err(SignError::SubmissionFailed("backend unavailable".to_owned()))
        }
    }

    fn fill_signer(flow: &mut SignFlow) {
        flow.state_mut().update_signing_details(SignerPatch {
            role: Some("Director".to_owned()),
            reason: Some("Approval".to_owned()),
            location: Some("Porto".to_owned()),
        });
    }

    #[test]
    fn rejects_non_pdf_upload() {
        let mut flow = SignFlow::new(Box::new(MemoryStore::new()));
        assert!(matches!(
            flow.load_document(b"GIF89a...".to_vec(), "cat.gif"),
            Err(SignError::InvalidDocument)
        ));
        assert!(!flow.state().has_document());
    }

    #[test]
    fn rejects_oversized_upload() {
        let mut flow = SignFlow::new(Box::new(MemoryStore::new()));
        let mut bytes = b"%PDF-1.4".to_vec();
        bytes.resize(settings::document::MAX_BYTES + 1, 0);
        assert!(matches!(
            flow.load_document(bytes, "big.pdf"),
            Err(SignError::DocumentTooLarge { .. })
        ));
    }

    #[test]
    fn box_rect_is_not_ready_before_first_render() {
        let (flow, _renderer) = flow_with_document(1);
        assert!(flow.box_screen_rect().is_none());
    }

    #[test]
    fn pointer_up_before_render_commits_nothing() {
        let (mut flow, _renderer) = flow_with_document(1);
        let before = flow.state().placement();

        flow.pointer_down(Point::new(10.0, 10.0));
        flow.pointer_up(Point::new(50.0, 50.0));

        assert_eq!(flow.state().placement(), before);
    }

    #[test]
    fn drag_commits_through_the_transformer() {
        let (mut flow, mut renderer) = flow_with_document(1);
        // 612pt-wide page displayed at 612px: scale 1.0, height 792px
        render_current(&mut flow, &mut renderer, 612.0);

        let rect = flow.box_screen_rect().unwrap();
        // Default placement (100,100) 200x80 -> screen y = 792-100-80 = 612
        assert_eq!(rect, Rect::new(100.0, 612.0, 300.0, 692.0));

        // Grab the middle of the box and move it 50px right, 100px up
        let grab = Point::new(200.0, 650.0);
        flow.pointer_down(grab);
        flow.pointer_move(Point::new(250.0, 550.0));
        flow.pointer_up(Point::new(250.0, 550.0));

        let placement = flow.state().placement();
        assert_eq!(placement.x, 150.0);
        // Screen y 512 -> point y = 792 - 512 - 80 = 200
        assert_eq!(placement.y, 200.0);
        assert_eq!(placement.width, 200.0);
        assert_eq!(placement.height, 80.0);
        assert_eq!(placement.page_number, 1);
    }

    #[test]
    fn corner_resize_commits_min_clamped_size() {
        let (mut flow, mut renderer) = flow_with_document(1);
        render_current(&mut flow, &mut renderer, 612.0);

        // Grab the bottom-right handle and collapse the box completely
        flow.pointer_down(Point::new(300.0, 692.0));
        flow.pointer_up(Point::new(0.0, 0.0));

        let placement = flow.state().placement();
        assert_eq!(placement.width, settings::gesture::MIN_WIDTH_PX);
        assert_eq!(placement.height, settings::gesture::MIN_HEIGHT_PX);
    }

    #[test]
    fn page_change_drops_the_viewport() {
        let (mut flow, mut renderer) = flow_with_document(3);
        render_current(&mut flow, &mut renderer, 612.0);
        assert!(flow.viewport().is_some());

        flow.next_page();
        assert_eq!(flow.current_page(), 2);
        // NotReady until the new page's render completes
        assert!(flow.viewport().is_none());
        assert!(flow.box_screen_rect().is_none());

        render_current(&mut flow, &mut renderer, 612.0);
        assert_eq!(flow.viewport().unwrap().page_number, 2);
    }

    #[test]
    fn stale_render_for_another_page_is_dropped() {
        let (mut flow, mut renderer) = flow_with_document(3);
        // A late render completion for page 1 arrives after navigating to 2
        let late = renderer.render_page(1, 612.0).unwrap();
        flow.next_page();
        flow.page_rendered(&late);

        assert!(flow.viewport().is_none());
    }

    #[test]
    fn placement_committed_on_page_one_is_not_reinterpreted() {
        // Pages with different heights: commit on page 1, navigate to the
        // shorter page 2, and the stored point rect must be untouched.
        let mut flow = SignFlow::new(Box::new(MemoryStore::new()));
        flow.load_document(b"%PDF-1.4 test".to_vec(), "test.pdf").unwrap();
        let mut renderer = StaticPageRenderer::new(vec![
            KSize::new(612.0, 792.0),
            KSize::new(612.0, 400.0),
        ]);
        flow.document_loaded(2);

        render_current(&mut flow, &mut renderer, 612.0);
        flow.pointer_down(Point::new(200.0, 650.0));
        flow.pointer_up(Point::new(200.0, 250.0));
        let committed = flow.state().placement();
        assert_eq!(committed.y, 500.0); // 792 - 212 - 80

        flow.next_page();
        assert_eq!(flow.state().placement().y, committed.y);

        render_current(&mut flow, &mut renderer, 612.0);
        // New page, new height: the screen rect is derived fresh
        let rect = flow.box_screen_rect().unwrap();
        assert_eq!(rect.y0, 400.0 - 500.0 - 80.0);
    }

    #[test]
    fn page_navigation_stops_at_bounds() {
        let (mut flow, _renderer) = flow_with_document(2);
        flow.previous_page();
        assert_eq!(flow.current_page(), 1);

        flow.next_page();
        flow.next_page();
        flow.next_page();
        assert_eq!(flow.current_page(), 2);
    }

    #[test]
    fn customize_requires_a_document() {
        let mut flow = SignFlow::new(Box::new(MemoryStore::new()));
        assert!(matches!(
            flow.go_to_customize(),
            Err(SignError::DocumentMissing)
        ));

        flow.load_document(b"%PDF-1.4".to_vec(), "a.pdf").unwrap();
        flow.go_to_customize().unwrap();
        assert_eq!(flow.step(), Step::Customize);
    }

    #[test]
    fn standard_mode_submits_without_an_asset() {
        let (mut flow, _renderer) = flow_with_document(1);
        fill_signer(&mut flow);
        flow.go_to_customize().unwrap();
        flow.set_signature(SignatureAsset::standard());

        flow.submit(&OkClient).unwrap();
        assert_eq!(flow.step(), Step::Complete);
        assert_eq!(flow.state().signed_result(), Some(b"%PDF-1.4 signed".as_slice()));
    }

    #[test]
    fn draw_mode_without_strokes_is_blocked() {
        let (mut flow, _renderer) = flow_with_document(1);
        fill_signer(&mut flow);
        flow.go_to_customize().unwrap();
        flow.set_signature(SignatureAsset::drawn(None));

        assert!(matches!(flow.submit(&OkClient), Err(SignError::AssetMissing)));
        assert_eq!(flow.step(), Step::Customize);
    }

    #[test]
    fn submit_without_selecting_a_signature_is_blocked() {
        let (mut flow, _renderer) = flow_with_document(1);
        fill_signer(&mut flow);
        flow.go_to_customize().unwrap();

        assert!(matches!(flow.submit(&OkClient), Err(SignError::AssetMissing)));
    }

    #[test]
    fn failed_submission_preserves_the_session() {
        let (mut flow, _renderer) = flow_with_document(1);
        fill_signer(&mut flow);
        flow.go_to_customize().unwrap();
        flow.set_signature(SignatureAsset::standard());

        let result = flow.submit(&FailClient);
        assert!(matches!(result, Err(SignError::SubmissionFailed(_))));

        // Everything is still there for a retry
        assert_eq!(flow.step(), Step::Customize);
        assert!(flow.state().has_document());
        assert_eq!(flow.state().session().signer.role, "Director");
        assert!(flow.state().signed_result().is_none());

        // And the retry can succeed
        flow.submit(&OkClient).unwrap();
        assert_eq!(flow.step(), Step::Complete);
    }

    #[test]
    fn start_over_resets_everything() {
        let (mut flow, mut renderer) = flow_with_document(2);
        fill_signer(&mut flow);
        render_current(&mut flow, &mut renderer, 612.0);
        flow.go_to_customize().unwrap();
        flow.set_signature(SignatureAsset::standard());
        flow.submit(&OkClient).unwrap();

        flow.start_over();

        assert_eq!(flow.step(), Step::Position);
        assert!(!flow.state().has_document());
        assert!(flow.viewport().is_none());
        assert!(flow.signature().is_none());
        assert_eq!(flow.current_page(), 1);
    }

    #[test]
    fn typed_signature_metadata_reaches_the_session() {
        let (mut flow, _renderer) = flow_with_document(1);
        flow.set_signature(SignatureAsset::typed(
            "Ana Reis".into(),
            "Caveat".into(),
            Some(vec![1, 2]),
        ));

        assert_eq!(
            flow.state().session().signature_text.as_deref(),
            Some("Ana Reis")
        );
        assert_eq!(flow.state().signature_image(), Some([1u8, 2].as_slice()));

        // Switching back to standard clears the metadata
        flow.set_signature(SignatureAsset::standard());
        assert!(flow.state().session().signature_text.is_none());
        assert!(flow.state().signature_image().is_none());
    }
}
