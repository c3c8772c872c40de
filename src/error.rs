// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the signing workflow.
//!
//! Only `AssetMissing`, `InvalidField` and `SubmissionFailed` are meant for
//! the user. `ViewportNotReady` is a transient condition (a gesture or
//! conversion raced a page render) and callers retry on the next render.
//! Out-of-bounds gestures never produce an error at all; they are clamped
//! at the gesture layer. Snapshot-store failures live in
//! [`crate::storage::StoreError`] and are logged, never surfaced.

use thiserror::Error;

/// Errors produced by the signing workflow.
#[derive(Debug, Error)]
pub enum SignError {
    /// The page viewport has not been captured since the last render or
    /// page change. Transient; retried on the next render completion.
    #[error("page viewport has not been captured yet")]
    ViewportNotReady,

    /// An operation that needs a source document ran before one was loaded.
    #[error("no document loaded; upload a PDF first")]
    DocumentMissing,

    /// The uploaded bytes are not a PDF.
    #[error("the selected file is not a PDF document")]
    InvalidDocument,

    /// The uploaded document exceeds the intake limit.
    #[error("document is {size} bytes; the limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    /// The selected signature mode requires an asset that was never
    /// captured (e.g. draw mode with no strokes).
    #[error("a signature is required before signing; create or upload one")]
    AssetMissing,

    /// A signer form field failed validation.
    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// A signing request is already in flight; resubmission is blocked
    /// until it completes.
    #[error("a signing request is already in flight")]
    SubmissionInFlight,

    /// The backend rejected or failed the signing request. The message is
    /// user-facing; session state is preserved so the user can retry.
    #[error("signing failed: {0}")]
    SubmissionFailed(String),
}
