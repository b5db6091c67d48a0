//! Builds a small sepia + caption pipeline, saves it and exports the result.
//!
//! ```text
//! cargo run --example sepia_pipeline -- [input.png] [output-dir]
//! ```
//!
//! Without an input file a gradient is generated in memory. Set `RUST_LOG=debug` to
//! watch pulls and refreshes.

use pixelgraph::prelude::*;
use std::env;
use std::path::PathBuf;

fn gradient(width: u32, height: u32) -> Raster {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let b = (255 * x / width.max(1)) as u8;
            let g = (255 * y / height.max(1)) as u8;
            data.extend_from_slice(&[b, g, 128]);
        }
    }
    Raster::from_bgr(width, height, data).unwrap_or_else(|| Raster::filled(width, height, [0, 0, 0]))
}

fn main() -> Result<(), GraphError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input = args.next().map(PathBuf::from);
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(env::temp_dir);

    let mut session = Session::default();
    let sink = session.sinks()[0].clone();

    // ========================================================================
    // Sources
    // ========================================================================

    let image = session.spawn(NodeKind::ImageSource);
    let caption = session.spawn(NodeKind::Text);
    let x = session.spawn(NodeKind::Float);
    let y = session.spawn(NodeKind::Float);
    let size = session.spawn(NodeKind::Float);

    // ========================================================================
    // Transforms
    // ========================================================================

    let sepia = session.spawn(NodeKind::Sepia);
    let label = session.spawn(NodeKind::AddTextPercent);

    let graph = session.graph_mut();
    match &input {
        Some(path) => graph.load_image(&image, path)?,
        None => graph.set_image(&image, gradient(320, 200))?,
    }
    graph.set_literal(&caption, "PIXELGRAPH")?;
    graph.set_literal(&x, "5")?;
    graph.set_literal(&y, "95")?;
    graph.set_literal(&size, "1.0")?;

    graph.connect(&image, &sepia, PortSlot::First)?;
    graph.connect(&sepia, &label, PortSlot::First)?;
    graph.connect(&x, &label, PortSlot::Second)?;
    graph.connect(&y, &label, PortSlot::Third)?;
    graph.connect(&caption, &label, PortSlot::Fourth)?;
    graph.connect(&size, &label, PortSlot::Fifth)?;
    graph.connect(&label, &sink, PortSlot::First)?;

    let report = graph.validate();
    report.log_summary();
    if !report.is_safe() {
        eprintln!("Graph is not ready to export");
        return Ok(());
    }

    // ========================================================================
    // Save and export
    // ========================================================================

    let graph_file = out_dir.join("sepia_pipeline.ns");
    let image_file = out_dir.join("sepia_pipeline.png");
    session.save(&graph_file)?;
    session.export_image(&sink, &image_file)?;

    println!("Graph saved to {}", graph_file.display());
    println!("Image written to {}", image_file.display());
    Ok(())
}
