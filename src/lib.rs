// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! A placement engine for PDF signature blocks.
//!
//! Sigil owns the geometry and state of placing a signature box on a
//! rendered PDF page: the screen <-> point coordinate transform (top-left
//! pixel space vs. PDF's bottom-left point space), the drag and resize
//! gesture machine, the persisted signing session, and the multi-step
//! workflow from document upload to the signed result.
//!
//! The crate is headless. Rendering, pointer events, and the widget tree
//! belong to the embedding; Sigil consumes render geometry through
//! [`render::PageRenderer`] and pointer positions through [`SignFlow`],
//! and hands back screen rects to draw.

pub mod asset;
pub mod editing;
pub mod error;
pub mod flow;
pub mod render;
pub mod session;
pub mod settings;
pub mod storage;
pub mod submit;
pub mod viewport;

pub use error::SignError;
pub use flow::{SignFlow, Step};
pub use session::{PlacementRect, SessionState, SigningSession};
pub use viewport::PageViewport;
