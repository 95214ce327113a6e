use std::{fs, sync::Arc, thread};

use vulnmap::{
    ColorMode, Dashboard, Geometry, MultiPolygonPolicy, Palette, RenderConfig, Rgba, ScoreRange, SourceCache,
    TableSchema, map_score, read_geometry_layer,
};

const SCORES: &str = "\
neighbourhood,weighted_score,longitude,latitude
Abbottsfield,5.0,-113.39,53.57
Allendale,10.0,-113.51,53.49
Beverly Heights,15.0,-113.40,53.56
";

const HOODS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "neighbourhood": "Abbottsfield" },
      "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] } },
    { "type": "Feature", "properties": { "neighbourhood": "Allendale" },
      "geometry": { "type": "MultiPolygon", "coordinates": [
        [[[2,0],[3,0],[3,1],[2,0]]],
        [[[4,0],[5,0],[5,1],[4,0]], [[4.2,0.1],[4.8,0.1],[4.8,0.5],[4.2,0.1]]]
      ] } },
    { "type": "Feature", "properties": { "neighbourhood": "Westmount" },
      "geometry": { "type": "Polygon", "coordinates": [[[6,0],[7,0],[7,1],[6,0]]] } },
    { "type": "Feature", "properties": { "neighbourhood": "Broken" },
      "geometry": { "type": "Polygon", "coordinates": "nope" } }
  ]
}"#;

fn sources() -> (tempfile::TempDir, Dashboard) {
    let dir = tempfile::tempdir().unwrap();
    let scores = dir.path().join("scores.csv");
    let hoods = dir.path().join("hoods.geojson");
    fs::write(&scores, SCORES).unwrap();
    fs::write(&hoods, HOODS).unwrap();

    let cache = SourceCache::new();
    let dashboard = Dashboard::open(&cache, &scores, Some(&hoods), &TableSchema::default(), "neighbourhood").unwrap();
    (dir, dashboard)
}

#[test]
fn end_to_end_geojson() {
    let (dir, dashboard) = sources();
    let render = dashboard.render(&RenderConfig::default()).unwrap();

    let keys: Vec<&str> = render.features.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, ["Abbottsfield", "Allendale"]);
    assert_eq!(render.report.unmatched_features, ["Westmount", "Broken"]);
    assert_eq!(render.report.unmatched_records, ["Beverly Heights"]);
    assert!(matches!(render.features[1].geometry, Geometry::MultiPolygon(ref parts) if parts.len() == 2));
    assert_eq!(render.features[1].color, map_score(10.0, 5.0, 15.0, ColorMode::Standard, Palette::LinearRedGreen));

    let out = dir.path().join("map.geojson");
    render.write_geojson("neighbourhood", &out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(value["features"].as_array().unwrap().len(), 2);
    assert_eq!(value["features"][1]["properties"]["color"], serde_json::json!([127, 128, 0, 255]));

    let back = read_geometry_layer(&out, "neighbourhood").unwrap();
    assert_eq!(back.len(), 2);
}

#[test]
fn flattening_keeps_outer_rings_only() {
    let (_dir, dashboard) = sources();
    let config = RenderConfig::default().with_multipolygon(MultiPolygonPolicy::FlattenOuterRings);
    let render = dashboard.render(&config).unwrap();
    let Geometry::Polygon(ref flat) = render.features[1].geometry else { panic!("expected a flattened polygon") };
    assert_eq!(flat.num_rings(), 2);
}

#[test]
fn unparseable_geometry_only_affects_its_record() {
    let dir = tempfile::tempdir().unwrap();
    let scores = dir.path().join("scores.csv");
    let hoods = dir.path().join("hoods.geojson");
    fs::write(&scores, format!("{SCORES}Broken,7.0,,\n")).unwrap();
    fs::write(&hoods, HOODS).unwrap();

    let dashboard = Dashboard::open(&SourceCache::new(), &scores, Some(&hoods), &TableSchema::default(), "neighbourhood").unwrap();
    let render = dashboard.render(&RenderConfig::default()).unwrap();
    assert_eq!(render.features.len(), 2);
    assert_eq!(render.report.errors.len(), 1);
    assert_eq!(render.report.errors[0].key, "Broken");
}

#[test]
fn filtered_render_recolors() {
    let (_dir, dashboard) = sources();
    let config = RenderConfig::default().with_range(8.0, 12.0).unwrap().with_palette(Palette::Viridis);
    let render = dashboard.render(&config).unwrap();
    assert_eq!(render.features.len(), 1);
    assert_eq!(render.features[0].color, Palette::Viridis.sample(0.5));
    assert_eq!(render.report.color_range, Some(ScoreRange { min: 8.0, max: 12.0 }));
    assert_eq!(render.summary.to_string(), "Displaying data for 1 neighbourhoods");
}

#[test]
fn concurrent_renders_share_sources() {
    let (_dir, dashboard) = sources();
    let dashboard = Arc::new(dashboard);
    let handles: Vec<_> = [Palette::LinearRedGreen, Palette::Magma, Palette::Cividis]
        .into_iter()
        .map(|palette| {
            let d = dashboard.clone();
            thread::spawn(move || d.render(&RenderConfig::default().with_palette(palette)).unwrap().features.len())
        })
        .collect();
    for h in handles { assert_eq!(h.join().unwrap(), 2) }
}

#[test]
fn scatter_and_view_from_positions() {
    let (_dir, dashboard) = sources();
    let render = dashboard.render(&RenderConfig::default()).unwrap();
    assert_eq!(render.points.len(), 3);
    assert_eq!(render.points[0].color, Rgba::opaque(0, 255, 0));
    let view = render.view.unwrap();
    assert!((view.latitude - 53.54).abs() < 1e-9);
}
