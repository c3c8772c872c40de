// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Signing session - the single source of truth for one signing workflow.
//!
//! [`SigningSession`] is the serializable aggregate (placement, appearance,
//! signer info, document metadata). [`SessionState`] owns it together with
//! the three volatile binary buffers and a [`SnapshotStore`]; every mutation
//! funnels through a named operation that shallow-merges, then mirrors the
//! binary-stripped projection to the store. The store is a trusting one: it
//! never validates bounds or minimum sizes, so externally computed or
//! restored values are never silently clamped. That responsibility sits
//! with the gesture layer, before anything reaches `update_position`.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::settings;
use crate::storage::SnapshotStore;

/// The signature box in PDF point space.
///
/// `x`/`y` name the box's lower-left corner, consistent with PDF's
/// bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 1-based page the box sits on
    pub page_number: u32,
}

impl Default for PlacementRect {
    fn default() -> Self {
        Self {
            x: settings::placement::DEFAULT_X_PT,
            y: settings::placement::DEFAULT_Y_PT,
            width: settings::placement::DEFAULT_WIDTH_PT,
            height: settings::placement::DEFAULT_HEIGHT_PT,
            page_number: 1,
        }
    }
}

/// How the signature block is drawn into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub border_color: String,
    pub font_size: f64,
    pub font_style: String,
    pub font_color: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            border_color: "#000000".to_owned(),
            font_size: 10.0,
            font_style: "normal".to_owned(),
            font_color: "#000000".to_owned(),
        }
    }
}

/// Who is signing, and why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignerInfo {
    pub role: String,
    pub reason: String,
    pub location: String,
}

/// Partial update for [`Appearance`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AppearancePatch {
    pub border_color: Option<String>,
    pub font_size: Option<f64>,
    pub font_style: Option<String>,
    pub font_color: Option<String>,
}

/// Partial update for [`SignerInfo`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SignerPatch {
    pub role: Option<String>,
    pub reason: Option<String>,
    pub location: Option<String>,
}

/// Everything about one signing workflow that survives a reload.
///
/// This struct *is* the persisted projection; the binary payloads live
/// beside it in [`SessionState`] and are excluded by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSession {
    pub placement: PlacementRect,
    pub appearance: Appearance,
    pub signer: SignerInfo,
    pub file_name: Option<String>,
    pub total_pages: Option<u32>,
    /// Typed-signature metadata (text mode only)
    pub signature_text: Option<String>,
    pub signature_font: Option<String>,
}

/// Owns the session aggregate, the volatile binaries, and the snapshot
/// store. One writer context at a time; no interior locking.
pub struct SessionState {
    session: SigningSession,
    store: Box<dyn SnapshotStore>,

    // Memory-only binary payloads. Irrecoverable after a reload; callers
    // that find them missing must ask the user to re-upload.
    document: Option<Vec<u8>>,
    signature_image: Option<Vec<u8>>,
    signed_result: Option<Vec<u8>>,

    last_saved: Option<String>,
}

impl SessionState {
    /// Create a state, restoring any prior snapshot from the store.
    ///
    /// A restored placement is trusted as-is, even if the page it was
    /// committed on had a different size; the gesture layer re-clamps on
    /// the next interaction.
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        let session = restore_snapshot(store.as_ref());
        Self {
            session,
            store,
            document: None,
            signature_image: None,
            signed_result: None,
            last_saved: None,
        }
    }

    /// The current session aggregate
    pub fn session(&self) -> &SigningSession {
        &self.session
    }

    /// The current point-space placement
    pub fn placement(&self) -> PlacementRect {
        self.session.placement
    }

    /// Commit a new point-space placement (gesture end, already clamped)
    pub fn update_position(&mut self, placement: PlacementRect) {
        self.session.placement = placement;
        self.persist();
    }

    /// Move the box to another page without touching its rectangle
    pub fn set_page_number(&mut self, page_number: u32) {
        self.session.placement.page_number = page_number;
        self.persist();
    }

    /// Shallow-merge appearance fields
    pub fn update_appearance(&mut self, patch: AppearancePatch) {
        let appearance = &mut self.session.appearance;
        if let Some(border_color) = patch.border_color {
            appearance.border_color = border_color;
        }
        if let Some(font_size) = patch.font_size {
            appearance.font_size = font_size;
        }
        if let Some(font_style) = patch.font_style {
            appearance.font_style = font_style;
        }
        if let Some(font_color) = patch.font_color {
            appearance.font_color = font_color;
        }
        self.persist();
    }

    /// Shallow-merge signer fields
    pub fn update_signing_details(&mut self, patch: SignerPatch) {
        let signer = &mut self.session.signer;
        if let Some(role) = patch.role {
            signer.role = role;
        }
        if let Some(reason) = patch.reason {
            signer.reason = reason;
        }
        if let Some(location) = patch.location {
            signer.location = location;
        }
        self.persist();
    }

    /// Attach the source document. Bytes stay in memory; only the name and
    /// page count reach the snapshot.
    pub fn set_document(&mut self, bytes: Vec<u8>, name: &str, total_pages: u32) {
        self.document = Some(bytes);
        self.session.file_name = Some(name.to_owned());
        self.session.total_pages = Some(total_pages);
        self.persist();
    }

    /// Correct the page count once the renderer has opened the document
    pub fn set_total_pages(&mut self, total_pages: u32) {
        if self.session.total_pages != Some(total_pages) {
            self.session.total_pages = Some(total_pages);
            self.persist();
        }
    }

    pub fn document(&self) -> Option<&[u8]> {
        self.document.as_deref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Attach or clear the graphical signature raster (memory only)
    pub fn set_signature_image(&mut self, bytes: Option<Vec<u8>>) {
        self.signature_image = bytes;
    }

    pub fn signature_image(&self) -> Option<&[u8]> {
        self.signature_image.as_deref()
    }

    /// Record or clear the typed-signature metadata
    pub fn set_typed_signature(&mut self, typed: Option<(String, String)>) {
        match typed {
            Some((text, font)) => {
                self.session.signature_text = Some(text);
                self.session.signature_font = Some(font);
            }
            None => {
                self.session.signature_text = None;
                self.session.signature_font = None;
            }
        }
        self.persist();
    }

    /// Store the signed document returned by the backend (memory only)
    pub fn set_signed_result(&mut self, bytes: Vec<u8>) {
        self.signed_result = Some(bytes);
    }

    pub fn signed_result(&self) -> Option<&[u8]> {
        self.signed_result.as_deref()
    }

    /// Wipe everything: binaries, aggregate, and the persisted snapshot.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("failed to clear session snapshot: {e}");
        }
        self.session = SigningSession::default();
        self.document = None;
        self.signature_image = None;
        self.signed_result = None;
        self.last_saved = None;
    }

    /// When the snapshot last hit the store, e.g. "03:24 PM"
    pub fn last_saved_display(&self) -> Option<&str> {
        self.last_saved.as_deref()
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.session) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize session snapshot: {e}");
                return;
            }
        };

        match self.store.save(&json) {
            Ok(()) => {
                self.last_saved = Some(Local::now().format("%I:%M %p").to_string());
            }
            Err(e) => {
                // Store trouble must never interrupt the interaction
                tracing::warn!("failed to save session snapshot: {e}");
            }
        }
    }
}

fn restore_snapshot(store: &dyn SnapshotStore) -> SigningSession {
    let json = match store.load() {
        Ok(Some(json)) => json,
        Ok(None) => return SigningSession::default(),
        Err(e) => {
            tracing::warn!("session snapshot store unavailable: {e}");
            return SigningSession::default();
        }
    };

    match serde_json::from_str(&json) {
        Ok(session) => {
            tracing::info!("restored session snapshot");
            session
        }
        Err(e) => {
            tracing::warn!("ignoring corrupt session snapshot: {e}");
            SigningSession::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn state() -> SessionState {
        SessionState::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn defaults() {
        let state = state();
        let session = state.session();

        assert_eq!(session.placement.page_number, 1);
        assert_eq!(session.placement.x, 100.0);
        assert_eq!(session.placement.width, 200.0);
        assert_eq!(session.placement.height, 80.0);
        assert_eq!(session.appearance.font_size, 10.0);
        assert_eq!(session.appearance.border_color, "#000000");
        assert!(session.signer.role.is_empty());
        assert!(!state.has_document());
    }

    #[test]
    fn update_appearance_is_idempotent() {
        let mut state = state();

        let patch = AppearancePatch {
            font_size: Some(12.0),
            ..Default::default()
        };
        state.update_appearance(patch.clone());
        let once = state.session().clone();

        state.update_appearance(patch);
        assert_eq!(state.session(), &once);
    }

    #[test]
    fn partial_patch_leaves_other_fields_alone() {
        let mut state = state();
        state.update_appearance(AppearancePatch {
            border_color: Some("#ff0000".to_owned()),
            ..Default::default()
        });

        assert_eq!(state.session().appearance.border_color, "#ff0000");
        assert_eq!(state.session().appearance.font_size, 10.0);
        assert_eq!(state.session().appearance.font_style, "normal");
    }

    #[test]
    fn update_signing_details_merges() {
        let mut state = state();
        state.update_signing_details(SignerPatch {
            role: Some("Reviewer".to_owned()),
            ..Default::default()
        });
        state.update_signing_details(SignerPatch {
            reason: Some("Approved".to_owned()),
            location: Some("Lisbon".to_owned()),
            ..Default::default()
        });

        let signer = &state.session().signer;
        assert_eq!(signer.role, "Reviewer");
        assert_eq!(signer.reason, "Approved");
        assert_eq!(signer.location, "Lisbon");
    }

    #[test]
    fn snapshot_never_contains_document_bytes() {
        let store = MemoryStore::new();
        {
            let mut state = SessionState::new(Box::new(store.clone()));
            state.set_document(b"%PDF-1.4 secret payload".to_vec(), "contract.pdf", 3);
        }

        let snapshot = store.load().unwrap().unwrap();
        assert!(!snapshot.contains("secret payload"));
        assert!(snapshot.contains("contract.pdf"));

        // A fresh load from the same snapshot has the metadata but no bytes
        let restored = SessionState::new(Box::new(store));
        assert_eq!(restored.session().file_name.as_deref(), Some("contract.pdf"));
        assert_eq!(restored.session().total_pages, Some(3));
        assert!(!restored.has_document());
    }

    #[test]
    fn placement_survives_reload() {
        let store = MemoryStore::new();

        {
            let mut state = SessionState::new(Box::new(store.clone()));
            state.update_position(PlacementRect {
                x: 50.0,
                y: 40.0,
                width: 200.0,
                height: 60.0,
                page_number: 2,
            });
        }

        let restored = SessionState::new(Box::new(store));
        let placement = restored.placement();
        assert_eq!(placement.x, 50.0);
        assert_eq!(placement.y, 40.0);
        assert_eq!(placement.page_number, 2);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.save("{not json at all").unwrap();

        let state = SessionState::new(Box::new(store));
        assert_eq!(state.session(), &SigningSession::default());
    }

    #[test]
    fn reset_clears_binaries_and_session() {
        let mut state = state();
        state.set_document(b"%PDF-1.4".to_vec(), "a.pdf", 1);
        state.set_signature_image(Some(vec![1, 2, 3]));
        state.set_signed_result(vec![4, 5, 6]);
        state.update_signing_details(SignerPatch {
            role: Some("CEO".to_owned()),
            ..Default::default()
        });

        state.reset();

        assert!(!state.has_document());
        assert!(state.signature_image().is_none());
        assert!(state.signed_result().is_none());
        assert_eq!(state.session(), &SigningSession::default());
    }

    #[test]
    fn typed_signature_set_and_clear() {
        let mut state = state();
        state.set_typed_signature(Some(("Ana Reis".to_owned(), "Homemade Apple".to_owned())));
        assert_eq!(state.session().signature_text.as_deref(), Some("Ana Reis"));

        state.set_typed_signature(None);
        assert!(state.session().signature_text.is_none());
        assert!(state.session().signature_font.is_none());
    }
}
