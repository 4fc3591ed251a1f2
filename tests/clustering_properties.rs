use bytes::Bytes;
use geocluster::policy::zoom_for_longitude_delta;
use geocluster::{ClusterConfig, ClusterIndex, should_cluster, should_requery};
use geocluster_types::{BoundingBox, MarkerPoint, Viewport};

fn marker(id: &str, lng: f64, lat: f64) -> MarkerPoint {
    MarkerPoint::new(id, lng, lat, Bytes::new())
}

fn scattered_markers(n: usize) -> Vec<MarkerPoint> {
    // Deterministic pseudo-random scatter across a continent-sized area.
    (0..n)
        .map(|i| {
            let lng = -120.0 + ((i * 7919) % 6000) as f64 * 0.01;
            let lat = 25.0 + ((i * 104729) % 3000) as f64 * 0.01;
            marker(&format!("m{}", i), lng, lat)
        })
        .collect()
}

/// The sum of point counts over a full-world query equals the number of
/// indexed markers, at every zoom level.
#[test]
fn test_world_count_invariant_across_zooms() {
    let markers = scattered_markers(500);
    let config = ClusterConfig::default().with_zoom_range(0, 14);
    let index = ClusterIndex::build(markers, &config).expect("build failed");

    for zoom in 0..=14 {
        let clusters = index
            .clusters(&BoundingBox::WORLD, zoom)
            .expect("query failed");
        let total: usize = clusters.iter().map(|c| c.point_count).sum();
        assert_eq!(total, 500, "zoom {}", zoom);

        // Every entry accounts for its members.
        for cluster in &clusters {
            assert_eq!(cluster.member_ids.len(), cluster.point_count);
        }
    }
}

#[test]
fn test_zoom_formula_round_trip() {
    assert_eq!(zoom_for_longitude_delta(360.0).unwrap(), 0);
    for n in 0..=18 {
        let delta = 360.0 / f64::powi(2.0, n);
        assert_eq!(zoom_for_longitude_delta(delta).unwrap(), n);
    }
    assert_eq!(zoom_for_longitude_delta(80.0).unwrap(), 2);
}

#[test]
fn test_zoom_formula_invalid_deltas() {
    assert!(zoom_for_longitude_delta(0.0).is_err());
    assert!(zoom_for_longitude_delta(-0.5).is_err());
    assert!(zoom_for_longitude_delta(f64::NAN).is_err());
}

/// Increasing the radius never increases the number of clusters for a
/// fixed marker set and zoom.
#[test]
fn test_radius_monotonic_merging() {
    let markers = scattered_markers(300);

    for zoom in [2, 5, 8] {
        let mut previous = usize::MAX;
        for radius in [5.0, 20.0, 80.0, 320.0] {
            let config = ClusterConfig::default()
                .with_radius(radius)
                .with_zoom_range(0, 10);
            let index = ClusterIndex::build(markers.clone(), &config).expect("build failed");
            let clusters = index
                .clusters(&BoundingBox::WORLD, zoom)
                .expect("query failed");
            assert!(
                clusters.len() <= previous,
                "zoom {}, radius {}: {} clusters after {}",
                zoom,
                radius,
                clusters.len(),
                previous
            );
            previous = clusters.len();
        }
    }
}

#[test]
fn test_empty_index_empty_results() {
    let index = ClusterIndex::build(Vec::new(), &ClusterConfig::default()).expect("build failed");

    let boxes = [
        BoundingBox::WORLD,
        BoundingBox::new(-1.0, -1.0, 1.0, 1.0),
        BoundingBox::new(100.0, -50.0, 170.0, 50.0),
    ];
    for bbox in &boxes {
        for zoom in [0, 3, 9, 18] {
            assert!(index.clusters(bbox, zoom).expect("query failed").is_empty());
        }
    }
}

#[test]
fn test_should_requery_identical_viewports_is_false() {
    let viewport = Viewport::new(13.4, 52.5, 0.25, 0.25);
    assert!(!should_requery(&viewport, &viewport));

    // Same center and longitude delta, different latitude delta, still
    // within the 1/8 threshold.
    let nearly = Viewport::new(13.4, 52.5, 0.25, 0.26);
    assert!(!should_requery(&viewport, &nearly));
}

#[test]
fn test_should_cluster_platform_thresholds() {
    for max in [16, 17] {
        assert!(!should_cluster(max, max));
        assert!(!should_cluster(max + 1, max));
        assert!(should_cluster(max - 1, max));
        assert!(should_cluster(3, max));
    }
}

/// Two markers a thousandth of a degree apart merge at high zoom while
/// a distant third stays out of the box.
#[test]
fn test_close_pair_merges_distant_excluded() {
    let markers = vec![
        marker("first", 0.0, 0.0),
        marker("second", 0.0, 0.001),
        marker("far", 10.0, 10.0),
    ];
    let config = ClusterConfig::default()
        .with_radius(200.0)
        .with_zoom_range(0, 18);
    let index = ClusterIndex::build(markers, &config).expect("build failed");

    let clusters = index
        .clusters(&BoundingBox::new(-1.0, -1.0, 1.0, 1.0), 18)
        .expect("query failed");
    assert_eq!(clusters.len(), 1, "only the merged pair is in the box");
    assert_eq!(clusters[0].point_count, 2);
    assert!((clusters[0].longitude()).abs() < 1e-6);
    assert!((clusters[0].latitude() - 0.0005).abs() < 1e-6);

    let world = index
        .clusters(&BoundingBox::WORLD, 18)
        .expect("query failed");
    assert_eq!(world.len(), 2);
    let total: usize = world.iter().map(|c| c.point_count).sum();
    assert_eq!(total, 3);
}

/// Payloads survive the trip through the index untouched.
#[test]
fn test_payload_resolution() {
    let markers = vec![MarkerPoint::new("poi", 2.35, 48.85, Bytes::from("Paris"))];
    let index = ClusterIndex::build(markers, &ClusterConfig::default()).expect("build failed");

    let clusters = index
        .clusters(&BoundingBox::WORLD, 5)
        .expect("query failed");
    assert_eq!(clusters.len(), 1);
    let member = &clusters[0].member_ids[0];
    let point = index.point_by_id(member).expect("member not indexed");
    assert_eq!(point.payload().as_ref(), b"Paris");
}
