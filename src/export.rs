use crate::types::{RegionFeature, RegionShape};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;

/// Joined regions as a GeoJSON FeatureCollection, in surface coordinates.
pub fn regions_geojson(features: &[RegionFeature], shapes: &[RegionShape]) -> String {
    let features = features
        .iter()
        .zip(shapes)
        .map(|(feature, shape)| {
            let mut properties = JsonObject::new();
            properties.insert("fips".to_string(), json!(shape.fips));
            properties.insert("area_name".to_string(), json!(shape.area_name));
            properties.insert("state".to_string(), json!(shape.state));
            properties.insert("bachelorsOrHigher".to_string(), json!(shape.education));
            properties.insert("bucket".to_string(), json!(shape.bucket));
            properties.insert("fill".to_string(), json!(shape.fill));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&feature.geometry))),
                id: Some(Id::Number(shape.fips.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn properties_follow_the_shape() {
        let feature = RegionFeature {
            id: 9,
            geometry: MultiPolygon::new(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]]),
        };
        let shape = RegionShape {
            fips: 9,
            area_name: Some("Nine County".to_string()),
            state: Some("NN".to_string()),
            education: 44.0,
            bucket: 6,
            fill: "#2171b5",
            path: String::new(),
            label: String::new(),
        };

        let parsed: GeoJson = regions_geojson(&[feature], &[shape]).parse().unwrap();
        let GeoJson::FeatureCollection(fc) = parsed else {
            panic!("expected a feature collection");
        };
        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.id, Some(Id::Number(9.into())));
        assert_eq!(f.property("area_name"), Some(&json!("Nine County")));
        assert_eq!(f.property("bucket"), Some(&json!(6)));
        assert!(matches!(
            f.geometry.as_ref().map(|g| &g.value),
            Some(Value::MultiPolygon(_))
        ));
    }
}
