//! Viewport Panning Demo
//!
//! This example drives a [`ClusterSession`] the way a map widget would:
//! a stream of viewport updates runs through the policy gates, only the
//! meaningful ones trigger a re-query, and a superseded query's result
//! is discarded instead of overwriting a newer one.

use bytes::Bytes;
use geocluster::prelude::*;

fn main() -> Result<()> {
    println!("Geocluster Viewport Demo");
    println!("========================\n");

    let session = ClusterSession::new(ClusterConfig::default())?;

    // 1. The map reports its region before any content exists.
    let city = Viewport::new(-74.0, 40.7, 0.35, 0.35);
    assert!(session.viewport_changed(city)?.is_none());
    println!("1. Viewport registered, no content yet");

    // 2. Content arrives; the initial query is issued for that viewport.
    let markers: Vec<MarkerPoint> = (0..60)
        .map(|i| {
            MarkerPoint::new(
                format!("poi-{}", i),
                -74.0 + (i % 10) as f64 * 0.003,
                40.7 + (i / 10) as f64 * 0.003,
                Bytes::new(),
            )
        })
        .collect();

    let request = session
        .set_points(markers)?
        .expect("content change issues the initial query");
    let clusters = session.execute(&request)?;
    println!(
        "2. Ingested content, initial query returned {} entries",
        clusters.len()
    );
    session.complete(&request, clusters);

    // 3. A slow drag produces a stream of near-identical viewports; the
    //    policy absorbs every one of them.
    let mut absorbed = 0;
    for step in 1..=15 {
        let nudged = Viewport::new(-74.0 + step as f64 * 0.001, 40.7, 0.35, 0.35);
        if session.viewport_changed(nudged)?.is_none() {
            absorbed += 1;
        }
    }
    println!("3. Drag gesture: {}/15 updates absorbed without a query", absorbed);

    // 4. A zoom-out passes the gates, but is itself superseded by a
    //    second zoom-out before its result is applied.
    let zoomed = Viewport::new(-74.0, 40.7, 0.7, 0.7);
    let stale = session
        .viewport_changed(zoomed)?
        .expect("zoom change passes the gates");

    let zoomed_again = Viewport::new(-74.0, 40.7, 1.4, 1.4);
    let fresh = session
        .viewport_changed(zoomed_again)?
        .expect("second zoom supersedes the first");

    let stale_result = session.execute(&stale)?;
    let fresh_result = session.execute(&fresh)?;

    // Completions land out of order; only the latest request applies.
    assert!(session.complete(&fresh, fresh_result));
    assert!(!session.complete(&stale, stale_result));
    println!("4. Superseded query discarded, latest viewport's result kept");

    // 5. At street-level zoom the session stops clustering entirely and
    //    requests raw markers.
    let street = Viewport::new(-74.0, 40.7, 360.0 / f64::powi(2.0, 17), 0.002);
    let raw_request = session
        .viewport_changed(street)?
        .expect("street zoom passes the gates");
    assert!(!raw_request.clustered);
    let raw = session.execute(&raw_request)?;
    println!(
        "5. Street-level viewport: clustering off, {} raw markers",
        raw.len()
    );
    session.complete(&raw_request, raw);

    println!("\nViewport demo completed successfully!");
    Ok(())
}
