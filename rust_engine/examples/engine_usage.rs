//! Example demonstrating the engine facade.
//!
//! Walks through loading the demo archive, rendering, gestures and
//! snapshots, printing what each step produced.

use std::sync::Arc;

use chrono::Datelike;

use btv_rust::config::EngineConfig;
use btv_rust::db::fixtures::demo_repository;
use btv_rust::db::LocalRepository;
use btv_rust::models::datapoint::EventCategory;
use btv_rust::models::dates::DateRange;
use btv_rust::models::view_state::{GroupingCriterion, OrderingCriterion};
use btv_rust::{EngineError, PrepareRequest, VisualizationEngine};

/// Example 1: Load the demo archive and render everything once
async fn example_load_and_render() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Example 1: Load and Render ===");

    let (repo, _) = demo_repository();
    let engine = VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await?;

    let bundle = engine.render();
    println!("Radial spokes: {}", bundle.radial.spokes.len());
    println!("Linear dots: {}", bundle.linear.dots.len());
    println!(
        "Domain: {} to {}",
        bundle.linear.domain.start, bundle.linear.domain.end
    );
    for tooltip in bundle.tooltips.iter().take(3) {
        println!(
            "  - {} ({}, {} honors)",
            tooltip.title, tooltip.life, tooltip.honor_count
        );
    }

    Ok(())
}

/// Example 2: Gestures answer with a refresh plan
async fn example_refresh_plans() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 2: Refresh Plans ===");

    let (repo, _) = demo_repository();
    let mut engine = VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await?;

    // A category filter re-renders both charts but leaves the brush be.
    let update = engine.filter_events_by_type(Some(EventCategory::Exile));
    println!(
        "Filter: radial={} linear={} brush={}",
        update.radial.is_some(),
        update.linear.is_some(),
        update.brush.is_some()
    );

    // Repeating the same gesture changes nothing and renders nothing.
    let update = engine.filter_events_by_type(Some(EventCategory::Exile));
    println!("Same filter again: any refresh = {}", update.outcome.plan.any());

    // A brush drag must not be echoed back into the brush.
    let update = engine.brush_range(DateRange::from_ymd(1938, 1, 1, 1945, 12, 31));
    println!(
        "Brush drag: radial={} brush={}",
        update.radial.is_some(),
        update.brush.is_some()
    );

    Ok(())
}

/// Example 3: Detail mode
async fn example_detail_mode() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 3: Detail Mode ===");

    let (repo, _) = demo_repository();
    let mut engine = VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await?;

    let full_width = engine.render_linear().width;
    let update = engine.display_subject_details("Stefan Zweig")?;
    let radial = update.radial.as_ref().ok_or("radial scene expected")?;
    let linear = update.linear.as_ref().ok_or("linear scene expected")?;
    println!("Chart rotated by {:.3} rad", radial.rotation);
    println!(
        "Linear chart width: {} -> {} (panel open)",
        full_width, linear.width
    );

    engine.close_subject_details();
    println!("Detail mode closed: highlighted = {:?}", engine.state().highlighted);

    Ok(())
}

/// Example 4: Ordering, grouping and a custom criterion
async fn example_ordering_and_grouping() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 4: Ordering and Grouping ===");

    let (repo, _) = demo_repository();
    let mut engine = VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await?;

    engine.update_order(OrderingCriterion::EventCount);
    let first = engine.angles().order().first().copied();
    println!("Least honored subject now sits at angle zero: {:?}", first);

    engine.update_group(GroupingCriterion::Exiled);
    let groups: Vec<_> = engine
        .angles()
        .order()
        .iter()
        .filter_map(|id| engine.groups().category_of(*id))
        .collect();
    println!("Exile partition in slot order: {:?}", groups);

    // Criteria are plain functions, so a custom partition is one
    // registration away. Birth decades, reusing the district slot.
    engine.register_grouping(GroupingCriterion::District, |prepared, _| {
        prepared.birth.map(|b| format!("{}0s", b.year() / 10))
    });
    engine.update_group(GroupingCriterion::District);
    let decades: Vec<_> = engine
        .angles()
        .order()
        .iter()
        .filter_map(|id| engine.groups().category_of(*id))
        .collect();
    println!("Birth decades in slot order: {:?}", decades);

    Ok(())
}

/// Example 5: Snapshots
async fn example_snapshots() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 5: Snapshots ===");

    let (repo, _) = demo_repository();
    let mut engine = VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await?;

    engine.rescale_time(DateRange::from_ymd(1914, 1, 1, 1955, 12, 31));
    engine.filter_events_by_type(Some(EventCategory::Street));
    let snapshot_id = engine.save_snapshot().await?;
    println!("Stored snapshot {}", snapshot_id);

    engine.clear_time_selection();
    engine.filter_events_by_type(None);
    println!("State reset, visible = {:?}", engine.state().visible);

    engine.restore_snapshot(&snapshot_id).await?;
    println!(
        "Restored: visible = {:?}, filter = {:?}",
        engine.state().visible,
        engine.state().category_filter
    );

    Ok(())
}

/// Example 6: Error handling
async fn example_error_handling() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 6: Error Handling ===");

    // An unreachable archive fails the load, there is nothing to show.
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    match VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await
    {
        Ok(_) => println!("Unexpectedly loaded"),
        Err(EngineError::Prepare(e)) => println!("Expected error - {}", e),
        Err(e) => println!("Unexpected error: {}", e),
    }

    // Unknown subject names are reported, not swallowed.
    let (repo, _) = demo_repository();
    let mut engine = VisualizationEngine::load(
        Arc::new(repo),
        EngineConfig::default(),
        PrepareRequest::all(),
    )
    .await?;
    match engine.display_subject_details("Niemand") {
        Err(EngineError::UnknownSubject(name)) => {
            println!("Expected error - unknown subject: {}", name)
        }
        other => println!("Unexpected outcome: {:?}", other.is_ok()),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Timeline Engine Examples\n");

    example_load_and_render().await?;
    example_refresh_plans().await?;
    example_detail_mode().await?;
    example_ordering_and_grouping().await?;
    example_snapshots().await?;
    example_error_handling().await?;

    println!("\n✓ All examples completed successfully!");
    Ok(())
}
