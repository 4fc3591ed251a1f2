//! Getting Started with Geocluster
//!
//! This example walks through the core workflow: build an index over a
//! marker set, query clusters for a bounding box at different zoom
//! levels, and resolve cluster members back to caller payloads.

use bytes::Bytes;
use geocluster::{ClusterConfig, ClusterIndex};
use geocluster_types::{BoundingBox, MarkerPoint};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Geocluster - Getting Started ===\n");

    // ========================================
    // 1. Ingest markers
    // ========================================
    println!("1. Building the index");
    println!("---------------------");

    let markers = vec![
        MarkerPoint::new("times-square", -73.9855, 40.7580, Bytes::from("Times Square")),
        MarkerPoint::new("bryant-park", -73.9832, 40.7536, Bytes::from("Bryant Park")),
        MarkerPoint::new("grand-central", -73.9772, 40.7527, Bytes::from("Grand Central")),
        MarkerPoint::new("brooklyn-bridge", -73.9969, 40.7061, Bytes::from("Brooklyn Bridge")),
        MarkerPoint::new("liberty", -74.0445, 40.6892, Bytes::from("Statue of Liberty")),
        MarkerPoint::new("la-defense", 2.2370, 48.8920, Bytes::from("La Défense")),
    ];

    let config = ClusterConfig::default().with_zoom_range(0, 16);
    let index = ClusterIndex::build(markers, &config)?;
    println!("   ✓ Indexed {} markers\n", index.len());

    // ========================================
    // 2. Query at different zoom levels
    // ========================================
    println!("2. Zoom-dependent clustering");
    println!("----------------------------");

    let nyc = BoundingBox::new(-74.1, 40.6, -73.9, 40.8);
    for zoom in [4, 8, 12, 16] {
        let clusters = index.clusters(&nyc, zoom)?;
        let total: usize = clusters.iter().map(|c| c.point_count).sum();
        println!(
            "   zoom {:>2}: {} entries covering {} markers",
            zoom,
            clusters.len(),
            total
        );
    }

    // ========================================
    // 3. Inspect a cluster
    // ========================================
    println!("\n3. Cluster contents");
    println!("-------------------");

    let clusters = index.clusters(&nyc, 8)?;
    for cluster in &clusters {
        if cluster.is_singleton() {
            println!(
                "   singleton at ({:.4}, {:.4}): {:?}",
                cluster.longitude(),
                cluster.latitude(),
                cluster.member_ids[0]
            );
        } else {
            println!(
                "   cluster of {} at ({:.4}, {:.4})",
                cluster.point_count,
                cluster.longitude(),
                cluster.latitude()
            );
            for id in &cluster.member_ids {
                let marker = index.point_by_id(id).expect("member must be indexed");
                println!("     - {}", String::from_utf8_lossy(marker.payload()));
            }
        }
    }

    // ========================================
    // 4. Load configuration from JSON
    // ========================================
    println!("\n4. Configuration");
    println!("----------------");

    let json = r#"{ "radius": 60.0, "max_cluster_zoom": 16 }"#;
    let custom = ClusterConfig::from_json(json)?;
    println!("   ✓ Loaded config: radius {}, clustering off at zoom {}", custom.radius, custom.max_cluster_zoom);

    let world = index.clusters(&BoundingBox::WORLD, 3)?;
    let total: usize = world.iter().map(|c| c.point_count).sum();
    println!("   ✓ World query at zoom 3: {} entries, {} markers\n", world.len(), total);

    println!("Getting started demo completed successfully!");
    Ok(())
}
