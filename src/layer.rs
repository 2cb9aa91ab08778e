use reqwest::header::REFERER;
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::config::*;
use crate::error::{AppendError, Result};
use crate::portal::{ServiceError, Session};

/// A hosted feature layer, usable only while its session is alive.
pub struct FeatureLayer<'s> {
    session: &'s Session,
    url: String,
    pub name: String,
    pub geometry_type: String,
}

#[derive(Deserialize)]
struct LayerInfo {
    name: Option<String>,
    #[serde(rename = "geometryType")]
    geometry_type: Option<String>,
    error: Option<ServiceError>,
}

impl<'s> FeatureLayer<'s> {
    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
impl<'s> FeatureLayer<'s> {
    pub fn for_tests(session: &'s Session, url: &str, geometry_type: &str) -> Self {
        FeatureLayer {
            session,
            url: url.to_string(),
            name: "test layer".to_string(),
            geometry_type: geometry_type.to_string(),
        }
    }
}

/// Resolves the waypoint layer, then the track layer. Stops at the first
/// failure.
pub async fn resolve_targets<'s>(
    session: &'s Session,
    waypoints_url: &str,
    tracks_url: &str,
) -> Result<(FeatureLayer<'s>, FeatureLayer<'s>)> {
    let waypoints = resolve_layer(session, waypoints_url, GEOMETRY_POINT).await?;
    let tracks = resolve_layer(session, tracks_url, GEOMETRY_POLYLINE).await?;
    Ok((waypoints, tracks))
}

pub async fn resolve_layer<'s>(
    session: &'s Session,
    layer_url: &str,
    expected_geometry: &str,
) -> Result<FeatureLayer<'s>> {
    let url = validate_layer_url(layer_url).map_err(|m| AppendError::resolve(layer_url, m))?;

    info!("Resolving layer {url}...");
    let described = session
        .client()
        .get(&url)
        .header(REFERER, session.referer())
        .query(&[("f", "json"), ("token", session.token())])
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| AppendError::resolve(&url, e))?
        .json::<LayerInfo>()
        .await
        .map_err(|e| AppendError::resolve(&url, format!("invalid layer description: {e}")))?;

    let (name, geometry_type) =
        check_layer(described, expected_geometry).map_err(|m| AppendError::resolve(&url, m))?;

    info!("Resolved layer '{name}' ({geometry_type})");
    Ok(FeatureLayer {
        session,
        url,
        name,
        geometry_type,
    })
}

fn validate_layer_url(layer_url: &str) -> std::result::Result<String, String> {
    let parsed = Url::parse(layer_url.trim()).map_err(|e| format!("invalid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", parsed.scheme()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn check_layer(
    info: LayerInfo,
    expected_geometry: &str,
) -> std::result::Result<(String, String), String> {
    if let Some(err) = info.error {
        return Err(err.to_string());
    }

    let geometry_type = info
        .geometry_type
        .ok_or_else(|| "not a feature layer (no geometryType)".to_string())?;
    if geometry_type != expected_geometry {
        return Err(format!("expected {expected_geometry} layer, found {geometry_type}"));
    }

    Ok((info.name.unwrap_or_default(), geometry_type))
}
