//! Render the bundled demo archive through a short gesture tour and
//! write every produced scene as JSON, one file per step. Handy for
//! eyeballing renderer output and for feeding a frontend prototype.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use btv_rust::config::EngineConfig;
use btv_rust::db::fixtures::demo_repository;
use btv_rust::models::datapoint::EventCategory;
use btv_rust::models::dates::DateRange;
use btv_rust::models::view_state::{GroupingCriterion, OrderingCriterion};
use btv_rust::{PrepareRequest, VisualizationEngine};

fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.json"));
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {name}"))?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

async fn render_tour(out_dir: &Path) -> Result<String> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let (repo, archive) = demo_repository();
    let config = EngineConfig::default();
    let mut engine = VisualizationEngine::load(Arc::new(repo), config, PrepareRequest::all())
        .await
        .context("Failed to load the demo archive")?;

    println!(
        "Loaded {} subjects, {} points, domain {} to {}",
        engine.data().len(),
        engine.data().point_count(),
        engine.data().domain.start,
        engine.data().domain.end
    );
    println!(
        "Themes in the archive: music={}, exile={}",
        archive.music_theme, archive.exile_theme
    );

    // Full initial render.
    let bundle = engine.render();
    write_json(out_dir, "01_initial", &bundle)?;
    println!("  wrote 01_initial ({} spokes)", bundle.radial.spokes.len());

    // Category filter: only exile events at full strength.
    let update = engine.filter_events_by_type(Some(EventCategory::Exile));
    write_json(out_dir, "02_filter_exile", &update.radial)?;
    println!("  wrote 02_filter_exile");

    // Detail mode rotates the chart and shrinks the linear view.
    let update = engine
        .display_subject_details("Stefan Zweig")
        .context("Demo archive is missing Stefan Zweig")?;
    write_json(out_dir, "03_highlight_zweig", &update.radial)?;
    write_json(out_dir, "03_highlight_zweig_linear", &update.linear)?;
    println!("  wrote 03_highlight_zweig");
    engine.close_subject_details();

    // Zoom into the annexation years.
    let update = engine.rescale_time(DateRange::from_ymd(1938, 1, 1, 1945, 12, 31));
    write_json(out_dir, "04_zoom_1938_1945", &update.radial)?;
    write_json(out_dir, "04_zoom_1938_1945_brush", &update.brush)?;
    println!("  wrote 04_zoom_1938_1945");
    engine.clear_time_selection();

    // Regroup and reorder the spokes.
    let update = engine.update_group(GroupingCriterion::Exiled);
    write_json(out_dir, "05_group_exiled", &update.radial)?;
    println!("  wrote 05_group_exiled");
    let update = engine.update_order(OrderingCriterion::Death);
    write_json(out_dir, "06_order_by_death", &update.radial)?;
    println!("  wrote 06_order_by_death");

    // Persist the final state.
    let snapshot_id = engine
        .save_snapshot()
        .await
        .context("Failed to store the snapshot")?;
    write_json(out_dir, "07_final", &engine.render())?;
    println!("  wrote 07_final");

    Ok(snapshot_id)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let out_dir = PathBuf::from(args.get(1).map(|s| s.as_str()).unwrap_or("scenes"));

    println!("=== Timeline Scene Renderer ===");
    println!("Output directory: {}", out_dir.display());
    println!();

    match render_tour(&out_dir).await {
        Ok(snapshot_id) => {
            println!();
            println!("✓ Render tour completed");
            println!("  Snapshot ID: {}", snapshot_id);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Render tour failed: {:#}", e);
            Err(e)
        }
    }
}
