// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Engine settings and configuration constants.
//!
//! This module holds the non-negotiable numbers of the placement engine:
//! minimum box dimensions, defaults, and validation limits.

// ============================================================================
// GESTURE SETTINGS
// ============================================================================
/// Minimum signature box width during a resize (screen pixels)
const MIN_BOX_WIDTH_PX: f64 = 100.0;

/// Minimum signature box height during a resize (screen pixels)
const MIN_BOX_HEIGHT_PX: f64 = 40.0;

/// Hit radius around a corner handle (screen pixels)
const HANDLE_HIT_RADIUS_PX: f64 = 8.0;

// ============================================================================
// PLACEMENT DEFAULTS
// ============================================================================
// The nominal box a fresh session starts with, in PDF points with a
// bottom-left origin.

/// Default box X (points)
const DEFAULT_BOX_X_PT: f64 = 100.0;
/// Default box Y (points)
const DEFAULT_BOX_Y_PT: f64 = 100.0;
/// Default box width (points)
const DEFAULT_BOX_WIDTH_PT: f64 = 200.0;
/// Default box height (points)
const DEFAULT_BOX_HEIGHT_PT: f64 = 80.0;

// ============================================================================
// DOCUMENT SETTINGS
// ============================================================================
/// Maximum accepted source document size (10 MB)
const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum accepted signature raster size (2 MB)
const MAX_SIGNATURE_IMAGE_BYTES: usize = 2 * 1024 * 1024;

// ============================================================================
// FORM SETTINGS
// ============================================================================
/// Minimum length for role / reason / location fields
const MIN_FIELD_CHARS: usize = 2;

/// Smallest accepted appearance font size (points)
const MIN_FONT_SIZE_PT: f64 = 8.0;

/// Largest accepted appearance font size (points)
const MAX_FONT_SIZE_PT: f64 = 20.0;

// ============================================================================
// RENDERER SETTINGS
// ============================================================================
/// Raster zoom the renderer draws pages at. The displayed size is what
/// placement math uses; this only affects raster sharpness.
const DEFAULT_RENDER_ZOOM: f64 = 1.5;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Gesture settings (drag / resize limits)
pub mod gesture {
    /// Minimum box width during a resize (screen pixels)
    pub const MIN_WIDTH_PX: f64 = super::MIN_BOX_WIDTH_PX;

    /// Minimum box height during a resize (screen pixels)
    pub const MIN_HEIGHT_PX: f64 = super::MIN_BOX_HEIGHT_PX;

    /// Hit radius around a corner handle (screen pixels)
    pub const HANDLE_HIT_RADIUS_PX: f64 = super::HANDLE_HIT_RADIUS_PX;
}

/// Default placement for a fresh session (points, bottom-left origin)
pub mod placement {
    pub const DEFAULT_X_PT: f64 = super::DEFAULT_BOX_X_PT;
    pub const DEFAULT_Y_PT: f64 = super::DEFAULT_BOX_Y_PT;
    pub const DEFAULT_WIDTH_PT: f64 = super::DEFAULT_BOX_WIDTH_PT;
    pub const DEFAULT_HEIGHT_PT: f64 = super::DEFAULT_BOX_HEIGHT_PT;
}

/// Document intake limits
pub mod document {
    /// Maximum accepted source document size in bytes
    pub const MAX_BYTES: usize = super::MAX_DOCUMENT_BYTES;
}

/// Signature asset limits
pub mod signature {
    /// Maximum accepted signature raster size in bytes
    pub const MAX_IMAGE_BYTES: usize = super::MAX_SIGNATURE_IMAGE_BYTES;
}

/// Signer form validation limits
pub mod form {
    /// Minimum length for role / reason / location fields
    pub const MIN_FIELD_CHARS: usize = super::MIN_FIELD_CHARS;

    /// Smallest accepted appearance font size (points)
    pub const MIN_FONT_SIZE_PT: f64 = super::MIN_FONT_SIZE_PT;

    /// Largest accepted appearance font size (points)
    pub const MAX_FONT_SIZE_PT: f64 = super::MAX_FONT_SIZE_PT;
}

/// Renderer settings
pub mod renderer {
    /// Raster zoom pages are drawn at
    pub const DEFAULT_ZOOM: f64 = super::DEFAULT_RENDER_ZOOM;
}
