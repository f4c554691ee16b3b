//! Threshold colour scale for attainment percentages.
//!
//! Nine buckets: values below the first threshold land in bucket 0, each
//! threshold crossed moves one bucket up, and everything from the last
//! threshold on is clamped into bucket 8.

use image::Rgba;

pub const BUCKETS: usize = 9;

/// Threshold domain, in percent.
pub const THRESHOLDS: [f64; BUCKETS] = [7.0, 14.0, 21.0, 28.0, 35.0, 42.0, 49.0, 56.0, 63.0];

/// Nine shades of blue, lightest first.
pub const BLUES: [&str; BUCKETS] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    thresholds: [f64; BUCKETS],
    colors: [&'static str; BUCKETS],
}

impl Default for ColorScale {
    fn default() -> Self {
        Self { thresholds: THRESHOLDS, colors: BLUES }
    }
}

impl ColorScale {
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[&'static str] {
        &self.colors
    }

    /// Bucket index in `0..BUCKETS`. NaN falls into bucket 0.
    pub fn bucket_for(&self, percent: f64) -> usize {
        self.thresholds
            .partition_point(|&t| t <= percent)
            .min(BUCKETS - 1)
    }

    pub fn color_for(&self, percent: f64) -> &'static str {
        self.colors[self.bucket_for(percent)]
    }

    pub fn bucket_color(&self, bucket: usize) -> &'static str {
        self.colors[bucket.min(BUCKETS - 1)]
    }

    pub fn bucket_rgba(&self, bucket: usize) -> Rgba<u8> {
        hex_to_rgba(self.bucket_color(bucket))
    }
}

pub fn hex_to_rgba(hex: &str) -> Rgba<u8> {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    Rgba([channel(0..2), channel(2..4), channel(4..6), 255])
}
