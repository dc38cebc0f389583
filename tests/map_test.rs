//! Integration tests for the world maps: boundary loading, degraded rendering
//! without land, pan/zoom and the visitor ticker.

use std::fs;

use tempfile::TempDir;

use portviz::application::services::{InteractiveMap, Renderer, VisitorMap};
use portviz::config::{MapConfig, VisitorConfig};
use portviz::domain::datasets::{STUDIED_PLACES, VISITED_PLACES};
use portviz::domain::Point;
use portviz::infrastructure::traits::{FileBoundarySource, OfflineBoundarySource, RealFileSystem};
use portviz::util::testing;

const WORLD: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "name": "Squareland" },
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
      }
    },
    {
      "type": "Feature",
      "properties": { "name": "Islands" },
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [
          [[[20, 20], [25, 20], [25, 25], [20, 20]]],
          [[[30, 30], [35, 30], [35, 35], [30, 30]]]
        ]
      }
    }
  ]
}"#;

fn local_world(dir: &TempDir) -> MapConfig {
    let path = dir.path().join("world.geojson");
    fs::write(&path, WORLD).unwrap();
    MapConfig {
        boundary_url: format!("file://{}", path.display()),
        ..MapConfig::default()
    }
}

#[test]
fn given_unreachable_boundaries_when_rendered_then_markers_drawn_without_land() {
    testing::init_test_setup();
    let mut map = InteractiveMap::new("map", &MapConfig::default());

    let loaded = map.load_boundaries(&OfflineBoundarySource);
    let svg = map.draw(0).expect("fetch failure never propagates");

    assert!(!loaded);
    assert!(map.load_failed());
    assert!(svg.find_by_class("country").is_empty());
    assert_eq!(svg.find_by_class("visited").len(), VISITED_PLACES.len());
    assert_eq!(svg.find_by_class("studied").len(), STUDIED_PLACES.len());
    assert_eq!(
        svg.find_by_class("map-error")[0].text_content(),
        "could not load map data"
    );
}

#[test]
fn given_local_boundaries_when_rendered_then_one_path_per_country() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let config = local_world(&dir);
    let mut map = InteractiveMap::new("map", &config);

    assert!(map.load_boundaries(&FileBoundarySource::new(RealFileSystem)));
    let svg = map.draw(0).unwrap();

    let countries = svg.find_by_class("country");
    assert_eq!(countries.len(), 2);
    // a MultiPolygon draws both parts in one path
    let islands = countries[1].get_attr("d").unwrap();
    assert_eq!(islands.matches('M').count(), 2);
    assert!(svg.find_by_class("map-error").is_empty());
}

#[test]
fn given_boundaries_with_altitude_when_loaded_then_land_drawn() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("world.geojson");
    let world = WORLD.replace("[10, 10]", "[10, 10, 120.5]");
    fs::write(&path, world).unwrap();
    let config = MapConfig {
        boundary_url: format!("file://{}", path.display()),
        ..MapConfig::default()
    };
    let mut map = InteractiveMap::new("map", &config);

    assert!(map.load_boundaries(&FileBoundarySource::new(RealFileSystem)));
    assert_eq!(map.draw(0).unwrap().find_by_class("country").len(), 2);
}

#[test]
fn given_malformed_boundaries_when_loaded_then_map_degrades_gracefully() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("world.geojson");
    fs::write(&path, "{ not json").unwrap();
    let config = MapConfig {
        boundary_url: format!("file://{}", path.display()),
        ..MapConfig::default()
    };
    let mut map = InteractiveMap::new("map", &config);

    assert!(!map.load_boundaries(&FileBoundarySource::new(RealFileSystem)));
    assert!(map.draw(0).is_ok());
}

#[test]
fn given_hovered_country_when_drawn_then_highlighted_and_labelled() {
    let dir = TempDir::new().unwrap();
    let mut map = InteractiveMap::new("map", &local_world(&dir));
    map.load_boundaries(&FileBoundarySource::new(RealFileSystem));
    let mut tooltip = portviz::domain::Tooltip::new();

    map.element_mut("country-0")
        .unwrap()
        .on_hover_enter(&mut tooltip, Point::ORIGIN);
    let svg = map.draw(0).unwrap();

    assert_eq!(svg.find_by_class("country")[0].get_attr("fill"), Some("#fdb4c6"));
    assert_eq!(svg.find_by_class("country-label")[0].text_content(), "Squareland");
}

#[test]
fn given_zoom_beyond_extent_when_applied_then_clamped_to_max() {
    let mut map = InteractiveMap::new("map", &MapConfig::default());

    map.zoom_by(100.0, Point::new(500.0, 300.0));

    assert_eq!(map.transform().k, 10.0);
    let svg = map.draw(0).unwrap();
    assert_eq!(
        svg.find_by_class("visited")[0].get_attr("r"),
        Some("0.6"),
        "marker radius is 6/k"
    );
}

#[test]
fn given_visitor_map_when_interval_not_elapsed_then_visitors_unchanged() {
    let mut map = VisitorMap::with_seed(
        "visitor-map",
        &MapConfig::default(),
        &VisitorConfig::default(),
        42,
        0,
    );
    let before = map.visitors().to_vec();

    assert!(!map.tick(1999));
    assert_eq!(map.visitors(), before.as_slice());

    assert!(map.tick(2000));
    assert_ne!(map.visitors(), before.as_slice());
    assert_eq!(map.visitors().len(), VisitorConfig::default().count);
}

#[test]
fn given_regenerated_visitors_when_drawn_then_old_ones_fade_out() {
    let mut map = VisitorMap::with_seed(
        "visitor-map",
        &MapConfig::default(),
        &VisitorConfig::default(),
        42,
        0,
    );
    map.tick(2000);

    let fading = map.draw(2500).unwrap();
    assert_eq!(fading.find_by_class("visitor--exiting").len(), 40);

    let settled = map.draw(3500).unwrap();
    assert!(settled.find_by_class("visitor--exiting").is_empty());
    assert_eq!(settled.find_by_class("visitor").len(), 40);
}

#[test]
fn given_stopped_visitor_map_when_ticked_then_never_regenerates() {
    let mut map = VisitorMap::with_seed(
        "visitor-map",
        &MapConfig::default(),
        &VisitorConfig::default(),
        1,
        0,
    );
    let before = map.visitors().to_vec();

    map.stop();

    assert!(map.ticker().is_stopped());
    assert!(!map.tick(1_000_000));
    assert_eq!(map.visitors(), before.as_slice());
}
