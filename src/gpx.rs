use geo_types::{LineString, Point};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::config::*;
use crate::error::{AppendError, Result};

/// The four attributes every uploaded feature carries.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAttributes {
    pub name: String,
    pub description: String,
    pub project_number: String,
    pub surveyor: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaypointRecord {
    pub point: Point<f64>,
    pub attributes: FeatureAttributes,
}

/// One qualifying segment of a GPX track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub path: LineString<f64>,
    pub attributes: FeatureAttributes,
}

#[derive(Debug, Default)]
pub struct ParsedGpx {
    pub waypoints: Vec<WaypointRecord>,
    pub tracks: Vec<TrackRecord>,
}

pub fn parse_gpx_file(path: &Path, project_number: &str, surveyor: &str) -> Result<ParsedGpx> {
    if !path.exists() {
        return Err(AppendError::MissingInput(path.to_path_buf()));
    }

    let data = fs::read(path).map_err(|e| AppendError::ReadInput {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let parsed = parse_gpx(data.as_slice(), project_number, surveyor).map_err(|e| {
        AppendError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    info!(
        "Parsed {}: {} waypoints, {} track segments",
        path.display(),
        parsed.waypoints.len(),
        parsed.tracks.len()
    );
    Ok(parsed)
}

pub fn parse_gpx<R: Read>(
    reader: R,
    project_number: &str,
    surveyor: &str,
) -> std::result::Result<ParsedGpx, gpx::errors::GpxError> {
    let gpx_data = gpx::read(reader)?;

    let attributes = |name: Option<&str>, description: Option<&str>, unnamed: &str| {
        FeatureAttributes {
            name: text_or(name, unnamed),
            description: text_or(description, NO_DESCRIPTION),
            project_number: project_number.to_string(),
            surveyor: surveyor.to_string(),
        }
    };

    let waypoints = gpx_data
        .waypoints
        .iter()
        .map(|wpt| WaypointRecord {
            point: wpt.point(),
            attributes: attributes(
                wpt.name.as_deref(),
                wpt.description.as_deref(),
                UNNAMED_WAYPOINT,
            ),
        })
        .collect();

    let mut tracks = Vec::new();
    for track in &gpx_data.tracks {
        for segment in &track.segments {
            let coords: Vec<(f64, f64)> = segment
                .points
                .iter()
                .map(|p| (p.point().x(), p.point().y()))
                .collect();

            if coords.len() < 2 {
                debug!(
                    "Dropping segment of {} with {} point(s)",
                    track.name.as_deref().unwrap_or(UNNAMED_TRACK),
                    coords.len()
                );
                continue;
            }

            tracks.push(TrackRecord {
                path: LineString::from(coords),
                attributes: attributes(
                    track.name.as_deref(),
                    track.description.as_deref(),
                    UNNAMED_TRACK,
                ),
            });
        }
    }

    Ok(ParsedGpx { waypoints, tracks })
}

fn text_or(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}
