/// Public ArcGIS Online portal, used when no portal URL is given
pub const DEFAULT_PORTAL_URL: &str = "https://www.arcgis.com";

pub const USER_AGENT: &str = "gpx-append/0.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Token lifetime requested from generateToken, in minutes
pub const TOKEN_EXPIRATION_MINUTES: u32 = 60;

/// Coordinates are written as WGS84 lon/lat
pub const WGS84_WKID: u32 = 4326;

pub const UNNAMED_WAYPOINT: &str = "Unnamed Waypoint";
pub const UNNAMED_TRACK: &str = "Unnamed Track";
pub const NO_DESCRIPTION: &str = "No description";

pub const FIELD_NAME: &str = "name";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PROJECT_NUMBER: &str = "project_number";
pub const FIELD_SURVEYOR: &str = "surveyor";

pub const GEOMETRY_POINT: &str = "esriGeometryPoint";
pub const GEOMETRY_POLYLINE: &str = "esriGeometryPolyline";
