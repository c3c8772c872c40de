// Copyright 2025 the Sigil Authors
// SPDX-License-Identifier: Apache-2.0

//! Scripted demo of the placement engine.
//!
//! Loads a PDF (a path argument, or a tiny built-in stand-in), renders a
//! page through the static renderer, walks the box through a drag and a
//! resize, and prints the signing request the workflow would submit.

use anyhow::Result;
use kurbo::Point;
use tracing_subscriber::filter::EnvFilter;

use sigil::asset::SignatureAsset;
use sigil::flow::SignFlow;
use sigil::render::{PageRenderer, StaticPageRenderer};
use sigil::session::SignerPatch;
use sigil::storage::MemoryStore;
use sigil::submit;

const DISPLAY_WIDTH: f64 = 612.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sigil=info".parse()?),
        )
        .init();

    let (bytes, name) = match std::env::args().nth(1) {
        Some(path) => (std::fs::read(&path)?, path),
        None => (b"%PDF-1.4 demo document".to_vec(), "demo.pdf".to_owned()),
    };

    let mut renderer = StaticPageRenderer::letter(2);
    let mut flow = SignFlow::new(Box::new(MemoryStore::new()));

    flow.load_document(bytes, &name)?;
    flow.document_loaded(renderer.page_count());

    let rendered = renderer.render_page(flow.current_page(), DISPLAY_WIDTH)?;
    flow.page_rendered(&rendered);

    let rect = flow
        .box_screen_rect()
        .ok_or_else(|| anyhow::anyhow!("no viewport after render"))?;
    println!("box on screen:     {rect:?}");

    // Drag the box 80px right and 150px up
    let grab = rect.center();
    flow.pointer_down(grab);
    flow.pointer_move(Point::new(grab.x + 40.0, grab.y - 75.0));
    flow.pointer_up(Point::new(grab.x + 80.0, grab.y - 150.0));
    println!("after drag:        {:?}", flow.state().placement());

    // Grow it from the bottom-right handle
    let rect = flow
        .box_screen_rect()
        .ok_or_else(|| anyhow::anyhow!("no viewport after render"))?;
    flow.pointer_down(Point::new(rect.x1, rect.y1));
    flow.pointer_up(Point::new(rect.x1 + 60.0, rect.y1 + 30.0));
    println!("after resize:      {:?}", flow.state().placement());

    flow.state_mut().update_signing_details(SignerPatch {
        role: Some("Project Director".to_owned()),
        reason: Some("Final approval".to_owned()),
        location: Some("Lisbon".to_owned()),
    });
    flow.go_to_customize()?;
    let asset = SignatureAsset::standard();
    flow.set_signature(asset.clone());

    let request = submit::build_request(flow.state(), &asset)?;
    println!(
        "signing request:   page {} at ({}, {}) {}x{} pt, {} base64 bytes of document",
        request.page_number,
        request.x,
        request.y,
        request.width,
        request.height,
        request.base64_pdf.len(),
    );

    if let Some(saved) = flow.state().last_saved_display() {
        println!("session saved at:  {saved}");
    }

    Ok(())
}
