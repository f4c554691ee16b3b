use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// One county row of the education dataset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EducationRecord {
    pub fips: u32,
    pub state: String,
    pub area_name: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// A county boundary decoded from the topology.
#[derive(Debug, Clone)]
pub struct RegionFeature {
    pub id: u32,
    pub geometry: MultiPolygon<f64>,
}

/// A region after the join: everything needed to draw it and its tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShape {
    pub fips: u32,
    pub area_name: Option<String>,
    pub state: Option<String>,
    pub education: f64,
    pub bucket: usize,
    pub fill: &'static str,
    pub path: String,
    pub label: String,
}
