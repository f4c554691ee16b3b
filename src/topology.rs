//! TopoJSON decoding.
//!
//! Turns a topology object (usually the `counties` geometry collection) into
//! one [`RegionFeature`] per areal geometry, stitching shared arcs back into
//! closed rings.

use crate::error::TopologyError;
use crate::types::RegionFeature;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, TopoGeometry>,
}

/// Quantization transform. When present, arc positions are delta-encoded
/// integers.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub struct TopoGeometry {
    /// `None` for null geometries.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub arcs: Option<Value>,
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

impl Topology {
    /// Decodes every arc into absolute coordinates.
    fn decode_arcs(&self) -> Result<Vec<Vec<Coord<f64>>>, TopologyError> {
        self.arcs
            .iter()
            .enumerate()
            .map(|(i, arc)| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .map(|pos| {
                        if pos.len() < 2 {
                            return Err(TopologyError::ShortPosition(i));
                        }
                        Ok(match self.transform {
                            Some(t) => {
                                x += pos[0];
                                y += pos[1];
                                Coord {
                                    x: x * t.scale[0] + t.translate[0],
                                    y: y * t.scale[1] + t.translate[1],
                                }
                            }
                            None => Coord { x: pos[0], y: pos[1] },
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    /// Extracts the features of the named object.
    pub fn features(&self, object: &str) -> Result<Vec<RegionFeature>, TopologyError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;
        let arcs = self.decode_arcs()?;

        let mut features = Vec::new();
        collect_features(root, &arcs, &mut features)?;
        debug!(object, features = features.len(), arcs = arcs.len(), "decoded topology");
        Ok(features)
    }
}

fn collect_features(
    geom: &TopoGeometry,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<RegionFeature>,
) -> Result<(), TopologyError> {
    if geom.kind.as_deref() == Some("GeometryCollection") {
        for child in &geom.geometries {
            collect_features(child, arcs, out)?;
        }
        return Ok(());
    }

    let Some(id) = geom.id.as_ref().and_then(parse_id) else {
        warn!(id = ?geom.id, kind = ?geom.kind, "skipping geometry without a numeric id");
        return Ok(());
    };

    let geometry = match geom.kind.as_deref() {
        None => MultiPolygon::new(Vec::new()),
        Some(kind @ "Polygon") => {
            let rings: Vec<Vec<i64>> = arc_refs(kind, geom.arcs.as_ref())?;
            MultiPolygon::new(polygon(arcs, &rings)?.into_iter().collect())
        }
        Some(kind @ "MultiPolygon") => {
            let polys: Vec<Vec<Vec<i64>>> = arc_refs(kind, geom.arcs.as_ref())?;
            let mut polygons = Vec::with_capacity(polys.len());
            for rings in &polys {
                polygons.extend(polygon(arcs, rings)?);
            }
            MultiPolygon::new(polygons)
        }
        Some(other) => {
            warn!(id, kind = other, "skipping non-areal geometry");
            return Ok(());
        }
    };

    out.push(RegionFeature { id, geometry });
    Ok(())
}

fn arc_refs<T>(kind: &str, arcs: Option<&Value>) -> Result<Vec<T>, TopologyError>
where
    T: serde::de::DeserializeOwned,
{
    match arcs {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| TopologyError::MalformedArcs {
            kind: kind.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// First ring is the exterior, the rest are holes. No rings, no polygon.
fn polygon(arcs: &[Vec<Coord<f64>>], rings: &[Vec<i64>]) -> Result<Option<Polygon<f64>>, TopologyError> {
    let mut rings = rings.iter().map(|r| ring(arcs, r));
    let Some(exterior) = rings.next().transpose()? else {
        return Ok(None);
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Polygon::new(exterior, interiors)))
}

fn ring(arcs: &[Vec<Coord<f64>>], refs: &[i64]) -> Result<LineString<f64>, TopologyError> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for &r in refs {
        let index = if r < 0 { !r } else { r };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::ArcOutOfRange { index: r, count: arcs.len() })?;

        // each arc starts where the previous one ended
        points.pop();
        if r < 0 {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(LineString::new(points))
}

fn parse_id(id: &Value) -> Option<u32> {
    match id {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
