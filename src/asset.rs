// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Signature asset collaborator.
//!
//! Drawing pad, typed-font rasterizer and file upload all reduce to the
//! same thing here: a raster image, or nothing (standard mode signs with
//! details only). Size and format validation is this module's own
//! responsibility; the placement core never inspects the bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

use crate::settings;

/// How the user chose to produce their signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMode {
    /// No graphic; only role / reason / location / date are stamped
    Standard,
    /// Drawn on the signature pad
    Draw,
    /// Typed text rendered in a script font
    Type,
    /// Uploaded image file
    Upload,
}

/// Typed-signature data: the text, the chosen font, and the raster the
/// text renderer produced from them.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedSignature {
    pub text: String,
    pub font: String,
    /// Rendered raster (PNG bytes), when the renderer has produced one
    pub raster: Option<Vec<u8>>,
}

/// The selected signature for this session.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAsset {
    pub mode: SignatureMode,
    /// Raster bytes for draw / upload modes
    pub image: Option<Vec<u8>>,
    /// Text metadata for type mode
    pub typed: Option<TypedSignature>,
}

impl SignatureAsset {
    /// Standard mode: no asset required or carried
    pub fn standard() -> Self {
        Self {
            mode: SignatureMode::Standard,
            image: None,
            typed: None,
        }
    }

    /// Draw mode with the pad's captured strokes (pass `None` for an
    /// empty pad; submission will block on it)
    pub fn drawn(png: Option<Vec<u8>>) -> Self {
        Self {
            mode: SignatureMode::Draw,
            image: png,
            typed: None,
        }
    }

    /// Upload mode with the validated file bytes
    pub fn uploaded(image: Vec<u8>) -> Self {
        Self {
            mode: SignatureMode::Upload,
            image: Some(image),
            typed: None,
        }
    }

    /// Type mode with the entered text, font, and rendered raster
    pub fn typed(text: String, font: String, raster: Option<Vec<u8>>) -> Self {
        Self {
            mode: SignatureMode::Type,
            image: None,
            typed: Some(TypedSignature { text, font, raster }),
        }
    }

    /// The raster to embed, whichever mode produced it
    pub fn raster(&self) -> Option<&[u8]> {
        self.image
            .as_deref()
            .or_else(|| self.typed.as_ref().and_then(|t| t.raster.as_deref()))
    }
}

/// Validation failures for incoming rasters. Surfaced by the capture UI,
/// not by the placement core.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("not a decodable image: {0}")]
    Image(#[from] image::ImageError),

    #[error("image is {size} bytes; the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("image has a zero dimension")]
    EmptyImage,
}

/// Decode and validate a base64 raster from the pad or an upload.
///
/// Accepts a bare base64 string or a `data:` URL; the decoded bytes must
/// be a readable PNG or JPEG within the size limit.
pub fn decode_signature_image(encoded: &str) -> Result<Vec<u8>, AssetError> {
    let encoded = encoded
        .strip_prefix("data:image/png;base64,")
        .or_else(|| encoded.strip_prefix("data:image/jpeg;base64,"))
        .unwrap_or(encoded);

    let bytes = BASE64.decode(encoded.trim())?;

    let limit = settings::signature::MAX_IMAGE_BYTES;
    if bytes.len() > limit {
        return Err(AssetError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }

    let decoded = image::load_from_memory(&bytes)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(AssetError::EmptyImage);
    }

    tracing::debug!(
        bytes = bytes.len(),
        width = decoded.width(),
        height = decoded.height(),
        "accepted signature raster"
    );
    Ok(bytes)
}
