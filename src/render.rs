use crate::config::{AppConfig, LegendConfig};
use crate::data::Datasets;
use crate::processing::{join_stats, JoinIndex};
use crate::scale::ColorScale;
use crate::types::{EducationRecord, RegionFeature, RegionShape};
use crate::{export, raster, svg};
use anyhow::{Context, Result};
use geo::MultiPolygon;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Legend placement: measured from the surface's right edge, and down from
/// `height - LEGEND_BOTTOM_OFFSET`.
const LEGEND_RIGHT_MARGIN: f64 = 150.0;
const LEGEND_BOTTOM_OFFSET: f64 = 570.0;

/// Resolves every feature against the index and builds its drawable shape.
///
/// Regions without a record are kept, with an attainment of 0.
pub fn plan_regions(
    features: &[RegionFeature],
    index: &JoinIndex,
    scale: &ColorScale,
    precision: u8,
) -> Vec<RegionShape> {
    features
        .par_iter()
        .map(|feature| {
            let record = index.get(feature.id);
            let education = record.map_or(0.0, |r| r.bachelors_or_higher);
            let bucket = scale.bucket_for(education);
            RegionShape {
                fips: feature.id,
                area_name: record.map(|r| r.area_name.clone()),
                state: record.map(|r| r.state.clone()),
                education,
                bucket,
                fill: scale.bucket_color(bucket),
                path: path_data(&feature.geometry, precision),
                label: tooltip_label(feature.id, record, education),
            }
        })
        .collect()
}

pub fn tooltip_label(fips: u32, record: Option<&EducationRecord>, education: f64) -> String {
    match record {
        Some(r) => format!("{}, {}: {}%", r.area_name, r.state, education),
        None => format!("No data (FIPS {}): {}%", fips, education),
    }
}

/// SVG path data, one `M…Z` subpath per ring. The closing point of each
/// ring is left to `Z`.
pub fn path_data(geometry: &MultiPolygon<f64>, precision: u8) -> String {
    let mut d = String::new();
    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut coords = ring.0.as_slice();
            if coords.len() > 1 && coords.first() == coords.last() {
                coords = &coords[..coords.len() - 1];
            }
            for (i, c) in coords.iter().enumerate() {
                d.push(if i == 0 { 'M' } else { 'L' });
                d.push_str(&format!("{},{}", fmt_coord(c.x, precision), fmt_coord(c.y, precision)));
            }
            if !coords.is_empty() {
                d.push('Z');
            }
        }
    }
    d
}

pub fn fmt_coord(value: f64, precision: u8) -> String {
    let k = 10f64.powi(i32::from(precision));
    let rounded = (value * k).round() / k;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x: f64,
    pub y1: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Static legend: one swatch, tick and label per threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub translate: (f64, f64),
    pub swatches: Vec<Swatch>,
    pub ticks: Vec<Tick>,
    pub labels: Vec<LegendLabel>,
}

impl LegendLayout {
    pub fn new(scale: &ColorScale, surface_width: u32, surface_height: u32, legend: &LegendConfig) -> Self {
        let thresholds = scale.thresholds();
        let (lo, hi) = match (thresholds.first(), thresholds.last()) {
            (Some(&lo), Some(&hi)) if hi > lo => (lo, hi),
            _ => (0.0, 1.0),
        };
        let x = |t: f64| (t - lo) / (hi - lo) * legend.width;
        let swatch_width = legend.width / (thresholds.len().saturating_sub(1).max(1)) as f64;
        let center = swatch_width / 2.0;

        let swatches = thresholds
            .iter()
            .enumerate()
            .map(|(bucket, &t)| Swatch {
                x: x(t),
                width: swatch_width,
                height: legend.height,
                fill: scale.bucket_color(bucket),
            })
            .collect();
        let ticks = thresholds
            .iter()
            .map(|&t| Tick { x: x(t) + center, y1: legend.height, y2: legend.height + 5.0 })
            .collect();
        let labels = thresholds
            .iter()
            .map(|&t| LegendLabel { x: x(t) + center, y: legend.height + 15.0, text: format!("{}%", t) })
            .collect();

        Self {
            translate: (
                f64::from(surface_width) - legend.width - LEGEND_RIGHT_MARGIN,
                f64::from(surface_height) - LEGEND_BOTTOM_OFFSET,
            ),
            swatches,
            ticks,
            labels,
        }
    }
}

/// Files produced by [`generate_map`].
#[derive(Debug)]
pub struct GeneratedMap {
    pub shapes: Vec<RegionShape>,
    pub files: Vec<PathBuf>,
}

/// Joins the datasets and writes the surface to the output directory.
pub fn generate_map(config: &AppConfig, datasets: &Datasets) -> Result<GeneratedMap> {
    let scale = ColorScale::default();
    let index = JoinIndex::build(&datasets.records);
    join_stats(&datasets.features, &index);

    let shapes = plan_regions(&datasets.features, &index, &scale, config.map.precision);
    let legend = LegendLayout::new(&scale, config.map.width, config.map.height, &config.legend);

    let out_dir = &config.output.dir;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let mut files = Vec::new();
    let mut write = |name: &str, contents: &[u8]| -> Result<()> {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
        info!(path = %path.display(), bytes = contents.len(), "Wrote output");
        files.push(path);
        Ok(())
    };

    let map_svg = svg::map_svg(&shapes, &legend, &config.map, true);
    write("map.svg", map_svg.as_bytes())?;

    let inline_svg = svg::map_svg(&shapes, &legend, &config.map, false);
    let page = svg::html_page(&inline_svg, &config.map, &config.tooltip);
    write("index.html", page.as_bytes())?;

    if config.output.geojson {
        let geojson = export::regions_geojson(&datasets.features, &shapes);
        write("regions.geojson", geojson.as_bytes())?;
    }

    if config.output.png {
        let image = raster::rasterize(&datasets.features, &shapes, &scale, config.map.width, config.map.height)?;
        let path = out_dir.join("map.png");
        image.save(&path).with_context(|| format!("Failed to save {:?}", path))?;
        info!(path = %path.display(), "Wrote raster preview");
        files.push(path);
    }

    Ok(GeneratedMap { shapes, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(id: u32, x: f64) -> RegionFeature {
        RegionFeature {
            id,
            geometry: MultiPolygon::new(vec![polygon![
                (x: x, y: 0.0),
                (x: x + 10.0, y: 0.0),
                (x: x + 10.0, y: 10.0),
                (x: x, y: 10.0),
            ]]),
        }
    }

    #[test]
    fn two_regions_one_record() {
        let index = JoinIndex::build(&[EducationRecord {
            fips: 1,
            state: "S".to_string(),
            area_name: "A".to_string(),
            bachelors_or_higher: 10.0,
        }]);
        let shapes = plan_regions(&[square(1, 0.0), square(2, 10.0)], &index, &ColorScale::default(), 3);
        assert_eq!(shapes.len(), 2);

        assert_eq!(shapes[0].fips, 1);
        assert_eq!(shapes[0].education, 10.0);
        assert_eq!(shapes[0].bucket, 1);
        assert_eq!(shapes[0].fill, "#deebf7");
        assert_eq!(shapes[0].label, "A, S: 10%");

        assert_eq!(shapes[1].fips, 2);
        assert_eq!(shapes[1].education, 0.0);
        assert_eq!(shapes[1].bucket, 0);
        assert_eq!(shapes[1].area_name, None);
        assert_eq!(shapes[1].label, "No data (FIPS 2): 0%");
    }

    #[test]
    fn path_data_drops_closing_point() {
        assert_eq!(path_data(&square(1, 0.0).geometry, 3), "M0,0L10,0L10,10L0,10Z");
        assert_eq!(path_data(&MultiPolygon::new(vec![]), 3), "");
    }

    #[test]
    fn coordinates_are_rounded() {
        assert_eq!(fmt_coord(1.23456, 3), "1.235");
        assert_eq!(fmt_coord(-0.0001, 3), "0");
        assert_eq!(fmt_coord(12.5, 0), "13");
        assert_eq!(fmt_coord(0.1 + 0.2, 3), "0.3");
    }

    #[test]
    fn legend_has_nine_of_everything() {
        let legend = LegendLayout::new(&ColorScale::default(), 960, 600, &LegendConfig::default());
        assert_eq!(legend.translate, (610.0, 30.0));
        assert_eq!(legend.swatches.len(), 9);
        assert_eq!(legend.ticks.len(), 9);
        let texts: Vec<_> = legend.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["7%", "14%", "21%", "28%", "35%", "42%", "49%", "56%", "63%"]);

        assert_eq!(legend.swatches[0].x, 0.0);
        assert_eq!(legend.swatches[0].width, 25.0);
        assert_eq!(legend.swatches[8].x, 200.0);
        assert_eq!(legend.ticks[0].x, 12.5);
        assert_eq!(legend.labels[0].y, 25.0);
        let fills: Vec<_> = legend.swatches.iter().map(|s| s.fill).collect();
        assert_eq!(fills, crate::scale::BLUES);
    }

    #[test]
    fn legend_follows_surface_height() {
        let legend = LegendLayout::new(&ColorScale::default(), 960, 800, &LegendConfig::default());
        assert_eq!(legend.translate, (610.0, 230.0));

        let wide = LegendLayout::new(&ColorScale::default(), 1200, 600, &LegendConfig { width: 300.0, height: 12.0 });
        assert_eq!(wide.translate, (750.0, 30.0));
        assert_eq!(wide.labels[0].y, 27.0);
    }
}
