use serde_json::{Value, json};

use crate::config::*;
use crate::gpx::{FeatureAttributes, TrackRecord, WaypointRecord};

/// A record that can be sent to a feature layer as `{geometry, attributes}`.
pub trait ToFeature {
    fn to_feature(&self) -> Value;
}

impl ToFeature for WaypointRecord {
    fn to_feature(&self) -> Value {
        json!({
            "geometry": {
                "x": self.point.x(),
                "y": self.point.y(),
                "spatialReference": { "wkid": WGS84_WKID },
            },
            "attributes": attributes_json(&self.attributes),
        })
    }
}

impl ToFeature for TrackRecord {
    fn to_feature(&self) -> Value {
        let path: Vec<Value> = self.path.0.iter().map(|c| json!([c.x, c.y])).collect();

        json!({
            "geometry": {
                "paths": [path],
                "spatialReference": { "wkid": WGS84_WKID },
            },
            "attributes": attributes_json(&self.attributes),
        })
    }
}

fn attributes_json(attrs: &FeatureAttributes) -> Value {
    json!({
        FIELD_NAME: attrs.name,
        FIELD_DESCRIPTION: attrs.description,
        FIELD_PROJECT_NUMBER: attrs.project_number,
        FIELD_SURVEYOR: attrs.surveyor,
    })
}
