// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Signing submission: request assembly, validation, and transport.
//!
//! [`build_request`] is the gate between the session and the wire. It is
//! the only place that enforces business rules on the way out (fields,
//! font size, asset presence per mode); everything upstream is a trusting
//! store. Geometry leaves as whole points - values were rounded when they
//! were committed, `round()` here just pins the type.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::asset::{SignatureAsset, SignatureMode};
use crate::error::SignError;
use crate::session::{SessionState, SigningSession};
use crate::settings;

/// The flat signing request the backend expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub page_number: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub border_color: String,
    pub font_size: f64,
    pub font_style: String,
    pub font_color: String,
    pub role: String,
    pub reason: String,
    pub location: String,
    /// Full source document, base64
    pub base64_pdf: String,
    /// Graphical signature (base64 PNG), drawn / typed / uploaded modes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_image: Option<String>,
    /// Typed-signature metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_font: Option<String>,
}

/// Backend response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

/// A successfully signed document.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedDocument {
    pub bytes: Vec<u8>,
    /// The backend's success message
    pub message: String,
}

/// Assemble and validate the signing request from the current session.
pub fn build_request(
    state: &SessionState,
    asset: &SignatureAsset,
) -> Result<SignatureRequest, SignError> {
    let document = state.document().ok_or(SignError::DocumentMissing)?;
    let session = state.session();

    validate_fields(session)?;
    validate_asset(asset)?;

    let placement = session.placement;
    let (signature_text, signature_font) = match (&asset.typed, asset.mode) {
        (Some(typed), SignatureMode::Type) => {
            (Some(typed.text.clone()), Some(typed.font.clone()))
        }
        _ => (None, None),
    };

    Ok(SignatureRequest {
        page_number: placement.page_number,
        x: placement.x.round() as i32,
        y: placement.y.round() as i32,
        width: placement.width.round() as i32,
        height: placement.height.round() as i32,
        border_color: session.appearance.border_color.clone(),
        font_size: session.appearance.font_size,
        font_style: session.appearance.font_style.clone(),
        font_color: session.appearance.font_color.clone(),
        role: session.signer.role.trim().to_owned(),
        reason: session.signer.reason.trim().to_owned(),
        location: session.signer.location.trim().to_owned(),
        base64_pdf: BASE64.encode(document),
        signature_image: asset.raster().map(|bytes| BASE64.encode(bytes)),
        signature_text,
        signature_font,
    })
}

fn validate_fields(session: &SigningSession) -> Result<(), SignError> {
    let min = settings::form::MIN_FIELD_CHARS;
    for (field, value) in [
        ("role", &session.signer.role),
        ("reason", &session.signer.reason),
        ("location", &session.signer.location),
    ] {
        if value.trim().chars().count() < min {
            return Err(SignError::InvalidField {
                field,
                message: format!("must be at least {min} characters"),
            });
        }
    }

    let font_size = session.appearance.font_size;
    if !(settings::form::MIN_FONT_SIZE_PT..=settings::form::MAX_FONT_SIZE_PT).contains(&font_size)
    {
        return Err(SignError::InvalidField {
            field: "fontSize",
            message: format!(
                "must be between {} and {} points",
                settings::form::MIN_FONT_SIZE_PT,
                settings::form::MAX_FONT_SIZE_PT
            ),
        });
    }

    Ok(())
}

fn validate_asset(asset: &SignatureAsset) -> Result<(), SignError> {
    match asset.mode {
        // Standard mode stamps details only; nothing to check
        SignatureMode::Standard => Ok(()),
        SignatureMode::Draw | SignatureMode::Upload => {
            if asset.image.is_none() {
                return Err(SignError::AssetMissing);
            }
            Ok(())
        }
        SignatureMode::Type => {
            match &asset.typed {
                Some(typed) if !typed.text.trim().is_empty() => Ok(()),
                _ => Err(SignError::AssetMissing),
            }
        }
    }
}

/// Transport seam for the signing call. The blocking call is the one
/// suspension point of the submit step; the workflow refuses re-entry
/// while a call is in flight.
pub trait SigningClient {
    fn sign(&self, request: &SignatureRequest) -> Result<SignedDocument, SignError>;
}

/// HTTP client posting to the signer backend.
#[derive(Debug, Clone)]
pub struct HttpSigningClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpSigningClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl SigningClient for HttpSigningClient {
    fn sign(&self, request: &SignatureRequest) -> Result<SignedDocument, SignError> {
        let url = format!(
            "{}/api/signature/sign",
            self.base_url.trim_end_matches('/')
        );
        tracing::info!(%url, page = request.page_number, "submitting signing request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| SignError::SubmissionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The backend wraps errors in the same envelope; fall back to
            // the status line when the body isn't parseable.
            let message = response
                .json::<ApiResponse<serde_json::Value>>()
                .map(|envelope| envelope.message)
                .unwrap_or_else(|_| format!("signing failed with status {status}"));
            return Err(SignError::SubmissionFailed(message));
        }

        let envelope: ApiResponse<String> = response
            .json()
            .map_err(|e| SignError::SubmissionFailed(e.to_string()))?;

        let bytes = BASE64.decode(envelope.data.as_bytes()).map_err(|e| {
            SignError::SubmissionFailed(format!("invalid signed document payload: {e}"))
        })?;

        Ok(SignedDocument {
            bytes,
            message: envelope.message,
        })
    }
}
