//! PNG preview of the map.
//!
//! Each region is filled with an even-odd scanline rule sampled at pixel
//! centres, so holes stay empty. Rows are independent and filled in
//! parallel.

use crate::scale::ColorScale;
use crate::types::{RegionFeature, RegionShape};
use anyhow::{anyhow, Result};
use geo::{BoundingRect, Line, LinesIter};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

struct RasterRegion {
    min_y: f64,
    max_y: f64,
    edges: Vec<Line<f64>>,
    color: Rgba<u8>,
}

pub fn rasterize(
    features: &[RegionFeature],
    shapes: &[RegionShape],
    scale: &ColorScale,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    let regions: Vec<RasterRegion> = features
        .iter()
        .zip(shapes)
        .filter_map(|(feature, shape)| {
            let bbox = feature.geometry.bounding_rect()?;
            Some(RasterRegion {
                min_y: bbox.min().y,
                max_y: bbox.max().y,
                edges: feature.geometry.lines_iter().collect(),
                color: scale.bucket_rgba(shape.bucket),
            })
        })
        .collect();

    let row_len = width as usize * 4;
    let mut buffer: Vec<u8> = BACKGROUND.0.repeat(width as usize * height as usize);

    if row_len > 0 {
        buffer.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
            let yc = y as f64 + 0.5;
            let mut crossings = Vec::new();
            for region in regions.iter().filter(|r| r.min_y <= yc && yc <= r.max_y) {
                crossings.clear();
                crossings.extend(region.edges.iter().filter_map(|e| crossing(e, yc)));
                crossings.sort_by(f64::total_cmp);
                for span in crossings.chunks_exact(2) {
                    for x in pixel_span(span[0], span[1], width) {
                        row[x * 4..x * 4 + 4].copy_from_slice(&region.color.0);
                    }
                }
            }
        });
    }

    RgbaImage::from_raw(width, height, buffer).ok_or_else(|| anyhow!("raster buffer does not match {}x{}", width, height))
}

/// X where the edge crosses the horizontal line `y`, half-open in y so a
/// shared vertex is counted once.
fn crossing(edge: &Line<f64>, y: f64) -> Option<f64> {
    let (a, b) = (edge.start, edge.end);
    if (a.y <= y) == (b.y <= y) {
        return None;
    }
    Some(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
}

/// Pixels whose centre lies in `[x0, x1)`.
fn pixel_span(x0: f64, x1: f64, width: u32) -> std::ops::Range<usize> {
    let clamp = |v: f64| v.max(0.0).min(f64::from(width)) as usize;
    clamp((x0 - 0.5).ceil())..clamp((x1 - 0.5).ceil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn shape(bucket: usize) -> RegionShape {
        RegionShape {
            fips: 1,
            area_name: None,
            state: None,
            education: 0.0,
            bucket,
            fill: "",
            path: String::new(),
            label: String::new(),
        }
    }

    #[test]
    fn fills_inside_and_leaves_holes() {
        let ring = polygon!(
            exterior: [(x: 2.0, y: 2.0), (x: 18.0, y: 2.0), (x: 18.0, y: 18.0), (x: 2.0, y: 18.0)],
            interiors: [[(x: 8.0, y: 8.0), (x: 12.0, y: 8.0), (x: 12.0, y: 12.0), (x: 8.0, y: 12.0)]]
        );
        let feature = RegionFeature { id: 1, geometry: MultiPolygon::new(vec![ring]) };
        let scale = ColorScale::default();
        let image = rasterize(&[feature], &[shape(8)], &scale, 20, 20).unwrap();

        let dark = scale.bucket_rgba(8);
        assert_eq!(*image.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*image.get_pixel(3, 3), dark);
        assert_eq!(*image.get_pixel(17, 17), dark);
        assert_eq!(*image.get_pixel(10, 10), BACKGROUND);
        assert_eq!(*image.get_pixel(19, 10), BACKGROUND);
    }

    #[test]
    fn regions_outside_the_surface_are_clipped() {
        let feature = RegionFeature {
            id: 1,
            geometry: MultiPolygon::new(vec![polygon![
                (x: -10.0, y: -10.0), (x: 5.0, y: -10.0), (x: 5.0, y: 5.0), (x: -10.0, y: 5.0),
            ]]),
        };
        let scale = ColorScale::default();
        let image = rasterize(&[feature], &[shape(4)], &scale, 8, 8).unwrap();
        assert_eq!(*image.get_pixel(0, 0), scale.bucket_rgba(4));
        assert_eq!(*image.get_pixel(4, 4), scale.bucket_rgba(4));
        assert_eq!(*image.get_pixel(5, 5), BACKGROUND);
    }

    #[test]
    fn pixel_spans() {
        assert_eq!(pixel_span(2.0, 5.0, 10), 2..5);
        assert_eq!(pixel_span(-3.0, 2.6, 10), 0..3);
        assert_eq!(pixel_span(8.0, 50.0, 10), 8..10);
    }
}
