//! `span` and `distance` command handlers.

use ember_core::geo::{distance_meters, meters_to_pixels, span_for_radius};
use ember_core::{Coordinate, Region, ViewportSize};

pub(crate) fn run_span(
    radius_km: f64,
    latitude: f64,
    viewport: Option<ViewportSize>,
) -> anyhow::Result<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        anyhow::bail!("radius must be a non-negative number of kilometers");
    }
    if !(-90.0..=90.0).contains(&latitude) {
        anyhow::bail!("latitude out of range: {latitude}");
    }

    let span = span_for_radius(radius_km, latitude);
    println!(
        "span at {latitude:.4}: {:.5} deg lat x {:.5} deg lon",
        span.latitude_delta, span.longitude_delta
    );

    if let Some(viewport) = viewport {
        let region = Region::around(Coordinate::new(latitude, 0.0), radius_km);
        let px = meters_to_pixels(radius_km * 1000.0, latitude, &region, viewport);
        println!(
            "{radius_km} km is {px:.1} pt on a {}x{} viewport",
            viewport.width, viewport.height
        );
    }
    Ok(())
}

pub(crate) fn run_distance(from: Coordinate, to: Coordinate) {
    let meters = distance_meters(from, to);
    if meters >= 1_000.0 {
        println!("{:.2} km", meters / 1_000.0);
    } else {
        println!("{meters:.0} m");
    }
}
