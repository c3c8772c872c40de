// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Viewport metadata and the screen <-> page coordinate transform.
//!
//! Screen space has its origin at the top-left with Y growing downward;
//! PDF point space has its origin at the bottom-left with Y growing upward.
//! A [`PageViewport`] is an immutable snapshot of one completed page render
//! and carries the single conversion factor (`scale`, displayed pixels per
//! point) between the two spaces. It is recaptured on every render and must
//! never be applied to a different page's rectangle: the workflow drops it
//! on page change and stays in a not-ready state until the next render.

use kurbo::Rect;

use crate::render::{RenderError, RenderedPage};
use crate::session::PlacementRect;

/// Immutable geometry snapshot of the currently displayed page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    /// 1-based page number this snapshot belongs to
    pub page_number: u32,

    /// Displayed page width (CSS pixels, after layout scaling)
    pub display_width: f64,

    /// Displayed page height (CSS pixels, after layout scaling)
    pub display_height: f64,

    /// Displayed pixels per PDF point
    pub scale: f64,

    /// Page height in points, needed for the vertical flip
    pub page_height_pt: f64,
}

impl PageViewport {
    /// Capture a viewport from a completed render.
    ///
    /// The scale is derived from the *displayed* width, not the raster
    /// buffer width: the box is positioned in displayed pixels, and a scale
    /// computed from the raster would misplace it on every zoomed or
    /// reflowed layout. Fails (and publishes nothing) when the page box or
    /// displayed size would make the scale zero or non-finite.
    pub fn capture(rendered: &RenderedPage) -> Result<Self, RenderError> {
        let page_width = rendered.page_width_pt();
        let page_height = rendered.page_height_pt();

        let scale = rendered.display_width / page_width;
        if !scale.is_finite() || scale <= 0.0 || page_height <= 0.0 {
            return Err(RenderError::DegeneratePage {
                width: page_width,
                height: page_height,
            });
        }

        tracing::debug!(
            page = rendered.page_number,
            display_width = rendered.display_width,
            display_height = rendered.display_height,
            scale,
            page_height_pt = page_height,
            "captured page viewport"
        );

        Ok(Self {
            page_number: rendered.page_number,
            display_width: rendered.display_width,
            display_height: rendered.display_height,
            scale,
            page_height_pt: page_height,
        })
    }

    /// Convert a point-space placement to a screen-pixel rect.
    ///
    /// `y_px = display_height - y_pt * scale - height_pt * scale`: the flip
    /// is mandatory because the placement's origin is the box's lower-left
    /// corner in a bottom-up space.
    pub fn to_screen(&self, placement: &PlacementRect) -> Rect {
        let x = placement.x * self.scale;
        let y = self.display_height
            - placement.y * self.scale
            - placement.height * self.scale;
        Rect::new(
            x,
            y,
            x + placement.width * self.scale,
            y + placement.height * self.scale,
        )
    }

    /// Convert a screen-pixel rect back to a point-space placement.
    ///
    /// Exact inverse of [`to_screen`](Self::to_screen). Rounding to whole
    /// points happens here and only here; rounding mid-pipeline would
    /// compound across the dozens of conversions a drag produces.
    pub fn to_page(&self, rect: Rect, page_number: u32) -> PlacementRect {
        let x = rect.x0 / self.scale;
        let y = (self.display_height - rect.y0 - rect.height()) / self.scale;

        PlacementRect {
            x: x.round(),
            y: y.round(),
            width: (rect.width() / self.scale).round(),
            height: (rect.height() / self.scale).round(),
            page_number,
        }
    }
}
