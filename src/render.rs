// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Page renderer collaborator seam.
//!
//! The engine never rasterizes PDFs itself. A [`PageRenderer`] is handed a
//! page number and a display width and reports back the geometry of the
//! rendered page: the raster buffer size, the displayed (layout-scaled)
//! size, and the point-space page bounding box. Placement math must only
//! ever consume the *displayed* size; the raster size exists so callers can
//! blit, and using it for coordinates is the classic correctness bug.

use kurbo::Size;
use thiserror::Error;

use crate::settings;

/// Errors a renderer can report. A failed render is simply skipped by the
/// caller; no viewport is published for it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("page has a degenerate size: {width}x{height} pt")]
    DegeneratePage { width: f64, height: f64 },
}

/// Geometry of one completed page render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// 1-based page number that was rendered
    pub page_number: u32,

    /// Raster buffer size (pixels, before layout scaling)
    pub raster_width: f64,
    pub raster_height: f64,

    /// Displayed size after layout scaling (CSS pixels). This is the size
    /// the signature box is positioned against.
    pub display_width: f64,
    pub display_height: f64,

    /// Point-space page bounding box, `[min_x, min_y, max_x, max_y]`
    pub view_box: [f64; 4],
}

impl RenderedPage {
    /// Page width in points
    pub fn page_width_pt(&self) -> f64 {
        self.view_box[2] - self.view_box[0]
    }

    /// Page height in points
    pub fn page_height_pt(&self) -> f64 {
        self.view_box[3] - self.view_box[1]
    }
}

/// Something that can rasterize one page of the loaded document.
pub trait PageRenderer {
    /// Number of pages in the loaded document
    fn page_count(&self) -> u32;

    /// Render `page_number` (1-based) scaled to fit `display_width`
    fn render_page(
        &mut self,
        page_number: u32,
        display_width: f64,
    ) -> Result<RenderedPage, RenderError>;
}

/// Deterministic in-process renderer.
///
/// Holds a point-space size per page and fakes the fit-to-width layout a
/// real viewer does: the raster is drawn at a fixed zoom, then displayed at
/// `display_width` with the aspect ratio preserved. Used by the demo binary
/// and by tests; a production embedding supplies its own renderer.
#[derive(Debug, Clone)]
pub struct StaticPageRenderer {
    pages: Vec<Size>,
    zoom: f64,
}

impl StaticPageRenderer {
    /// A renderer over explicit per-page point sizes
    pub fn new(pages: Vec<Size>) -> Self {
        Self {
            pages,
            zoom: settings::renderer::DEFAULT_ZOOM,
        }
    }

    /// A renderer over `page_count` US-Letter pages (612x792 pt)
    pub fn letter(page_count: u32) -> Self {
        Self::new(vec![Size::new(612.0, 792.0); page_count as usize])
    }
}

impl PageRenderer for StaticPageRenderer {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn render_page(
        &mut self,
        page_number: u32,
        display_width: f64,
    ) -> Result<RenderedPage, RenderError> {
        let total = self.page_count();
        if page_number == 0 || page_number > total {
            return Err(RenderError::PageOutOfRange {
                page: page_number,
                total,
            });
        }

        let size = self.pages[(page_number - 1) as usize];
        if size.width <= 0.0 || size.height <= 0.0 {
            return Err(RenderError::DegeneratePage {
                width: size.width,
                height: size.height,
            });
        }

        let raster_width = size.width * self.zoom;
        let raster_height = size.height * self.zoom;

        // Fit-to-width layout: displayed height keeps the raster aspect
        let display_height = display_width * (raster_height / raster_width);

        Ok(RenderedPage {
            page_number,
            raster_width,
            raster_height,
            display_width,
            display_height,
            view_box: [0.0, 0.0, size.width, size.height],
        })
    }
}
