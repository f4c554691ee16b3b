use crate::types::{RegionFeature, RegionShape};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use geo::{BoundingRect, Contains, Point};
use rstar::{RTree, RTreeObject, AABB};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

// Bounding box of one region, pointing back into `AppState::features`.
pub struct RegionIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for RegionIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub features: Vec<RegionFeature>,
    pub shapes: Vec<RegionShape>,
    pub tree: RTree<RegionIndex>,
    by_fips: HashMap<u32, usize>,
}

impl AppState {
    /// `features` and `shapes` must be in the same order, as produced by
    /// `render::plan_regions`.
    pub fn new(features: Vec<RegionFeature>, shapes: Vec<RegionShape>) -> Self {
        let items: Vec<RegionIndex> = features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let rect = feature.geometry.bounding_rect()?;
                Some(RegionIndex {
                    index,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();
        let tree = RTree::bulk_load(items);
        // later shapes win, as in the join
        let by_fips = shapes.iter().enumerate().map(|(i, s)| (s.fips, i)).collect();
        Self { features, shapes, tree, by_fips }
    }

    pub fn region(&self, fips: u32) -> Option<&RegionShape> {
        self.by_fips.get(&fips).and_then(|&i| self.shapes.get(i))
    }

    /// Region containing the point, in surface coordinates.
    pub fn region_at(&self, x: f64, y: f64) -> Option<&RegionShape> {
        let point = Point::new(x, y);
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .filter(|candidate| self.features[candidate.index].geometry.contains(&point))
            .find_map(|candidate| self.shapes.get(candidate.index))
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    x: f64,
    y: f64,
}

pub fn router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/region/:fips", get(region_handler))
        .route("/api/query", get(query_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(state: AppState, static_dir: PathBuf, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let app = router(Arc::new(state), static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving map on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn region_handler(
    State(state): State<Arc<AppState>>,
    Path(fips): Path<u32>,
) -> Result<Json<RegionShape>, StatusCode> {
    state.region(fips).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<RegionShape>> {
    Json(state.region_at(params.x, params.y).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn state() -> AppState {
        let features: Vec<RegionFeature> = [(1, 0.0), (2, 10.0)]
            .into_iter()
            .map(|(id, x)| RegionFeature {
                id,
                geometry: MultiPolygon::new(vec![polygon![
                    (x: x, y: 0.0), (x: x + 10.0, y: 0.0), (x: x + 10.0, y: 10.0), (x: x, y: 10.0),
                ]]),
            })
            .collect();
        let shapes = features
            .iter()
            .map(|f| RegionShape {
                fips: f.id,
                area_name: None,
                state: None,
                education: 0.0,
                bucket: 0,
                fill: "#f7fbff",
                path: String::new(),
                label: String::new(),
            })
            .collect();
        AppState::new(features, shapes)
    }

    #[test]
    fn point_lookup_uses_exact_containment() {
        let state = state();
        assert_eq!(state.region_at(5.0, 5.0).map(|s| s.fips), Some(1));
        assert_eq!(state.region_at(15.0, 2.0).map(|s| s.fips), Some(2));
        assert!(state.region_at(25.0, 5.0).is_none());
    }

    #[test]
    fn fips_lookup() {
        let state = state();
        assert_eq!(state.region(1).map(|s| s.fips), Some(1));
        assert_eq!(state.region(2).map(|s| s.fips), Some(2));
        assert!(state.region(3).is_none());
    }

    #[test]
    fn fips_lookup_without_regions() {
        let state = AppState::new(Vec::new(), Vec::new());
        assert!(state.region(1).is_none());
        assert!(state.region_at(0.0, 0.0).is_none());
    }
}
