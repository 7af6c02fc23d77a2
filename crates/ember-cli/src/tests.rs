use super::*;

use ember_news::{Asset, NewsSnapshot, RawResult, ResultItem};

#[test]
fn parses_refresh_command() {
    let cli = Cli::try_parse_from(["ember", "refresh", "--lat", "37.77", "--lon", "-122.42"])
        .expect("expected valid cli args");

    match cli.command {
        Commands::Refresh {
            lat,
            lon,
            force,
            json,
        } => {
            assert!((lat - 37.77).abs() < f64::EPSILON);
            assert!((lon + 122.42).abs() < f64::EPSILON);
            assert!(!force);
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_refresh_flags() {
    let cli = Cli::try_parse_from([
        "ember", "refresh", "--lat", "1", "--lon", "2", "--force", "--json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Refresh {
            force: true,
            json: true,
            ..
        }
    ));
}

#[test]
fn watch_defaults() {
    let cli = Cli::try_parse_from(["ember", "watch", "--lat", "1", "--lon", "2"]).unwrap();
    match cli.command {
        Commands::Watch {
            step_meters,
            interval_secs,
            ticks,
            ..
        } => {
            assert!((step_meters - 250.0).abs() < f64::EPSILON);
            assert_eq!(interval_secs, 5);
            assert_eq!(ticks, 6);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn watch_rejects_zero_interval() {
    let result = Cli::try_parse_from([
        "ember",
        "watch",
        "--lat",
        "1",
        "--lon",
        "2",
        "--interval-secs",
        "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn span_viewport_needs_both_dimensions() {
    assert!(Cli::try_parse_from([
        "ember",
        "span",
        "--radius-km",
        "5",
        "--lat",
        "40",
        "--width",
        "390"
    ])
    .is_err());

    let cli = Cli::try_parse_from([
        "ember",
        "span",
        "--radius-km",
        "5",
        "--lat",
        "40",
        "--width",
        "390",
        "--height",
        "844",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Span {
            width: Some(_),
            height: Some(_),
            ..
        }
    ));
}

#[test]
fn distance_parses_coordinate_pairs() {
    let cli = Cli::try_parse_from([
        "ember",
        "distance",
        "--from",
        "37.7749,-122.4194",
        "--to",
        "37.8044,-122.2712",
    ])
    .unwrap();
    match cli.command {
        Commands::Distance { from, to } => {
            assert_eq!(from, Coordinate::new(37.7749, -122.4194));
            assert_eq!(to, Coordinate::new(37.8044, -122.2712));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn distance_rejects_malformed_coordinate() {
    assert!(Cli::try_parse_from(["ember", "distance", "--from", "37.7", "--to", "1,2"]).is_err());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["ember"]).is_err());
}

#[test]
fn anchor_rejects_out_of_range() {
    assert!(anchor(91.0, 0.0).is_err());
    assert!(anchor(45.0, 12.5).is_ok());
}

#[test]
fn render_snapshot_lists_items_with_details() {
    let origin = Coordinate::new(37.0, -122.0);
    let mut raw = RawResult::named("City Library", Coordinate::new(37.01, -122.0));
    raw.locality = Some("Springfield".to_owned());
    let item = ResultItem::from_raw(&raw, Some(origin));
    let bare = ResultItem::from_raw(&RawResult::named("Park", origin), None);

    let mut snapshot = NewsSnapshot::default();
    snapshot.assets.set(
        item.id,
        Asset {
            image_url: "https://img.example.test/lib.jpg".to_owned(),
            heading_degrees: None,
        },
    );
    snapshot.items = vec![item, bare];

    let text = news::render_snapshot(origin, &snapshot);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "2 stories near 37.00000,-122.00000 (1 with imagery)");
    assert_eq!(
        lines[1],
        " 1. City Library | Springfield | 1.1 km | https://img.example.test/lib.jpg"
    );
    assert_eq!(lines[2], " 2. Park");
}

#[test]
fn render_snapshot_shows_error_first() {
    let snapshot = NewsSnapshot {
        last_error: Some("no stories for this area yet".to_owned()),
        ..NewsSnapshot::default()
    };
    let text = news::render_snapshot(Coordinate::new(0.0, 0.0), &snapshot);
    assert!(text.starts_with("! no stories for this area yet\n0 stories near"));
}
