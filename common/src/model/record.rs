use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// One row of the store list, as read from the input CSV.
///
/// The header must name `store_id`, `banner_id`, `item_id`, `lat` and `lng`.
/// `campaign_id` is optional: when the column is missing, or the cell is left
/// empty, the record carries campaign `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub store_id: i64,
    pub banner_id: i64,
    pub item_id: i64,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, deserialize_with = "empty_campaign_as_zero")]
    pub campaign_id: i64,
}

impl SourceRecord {
    /// Checks that the record names a real place on the globe.
    ///
    /// Rows that fail here must be rejected before anything is signed or
    /// published for them.
    pub fn check_coordinates(&self) -> Result<(), CoordinateError> {
        check_axis("lat", self.lat, MAX_LATITUDE)?;
        check_axis("lng", self.lng, MAX_LONGITUDE)
    }
}

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("{axis} is not a finite number: {value}")]
    NotFinite { axis: &'static str, value: f64 },
    #[error("{axis} {value} is outside [-{limit}, {limit}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        limit: f64,
    },
}

fn check_axis(axis: &'static str, value: f64, limit: f64) -> Result<(), CoordinateError> {
    if !value.is_finite() {
        return Err(CoordinateError::NotFinite { axis, value });
    }
    if value.abs() > limit {
        return Err(CoordinateError::OutOfRange { axis, value, limit });
    }
    Ok(())
}

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["store_id", "banner_id", "item_id", "lat", "lng"];

/// Campaign stored for rows that do not name one.
pub const DEFAULT_CAMPAIGN_ID: i64 = 0;

fn empty_campaign_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(DEFAULT_CAMPAIGN_ID))
}

/// Renders a coordinate the way it appears in signed payloads and WKT points.
///
/// Plain decimal with the fewest digits that round-trip, never exponent
/// notation, and always with a fractional part: `10.0`, `45.5`, `-73.5673`,
/// `0.00001`. Consumers recompute the signature over this exact text, so the
/// format must never change.
pub fn format_coordinate(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}
