use crate::model::record::{format_coordinate, SourceRecord};
use serde::{Serialize, Serializer};

/// A geographic point. Stored and serialized longitude first, as WKT
/// `POINT(<lng> <lat>)`, which PostGIS accepts directly for a geography column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn from_lng_lat(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn to_wkt(&self) -> String {
        format!(
            "POINT({} {})",
            format_coordinate(self.lng),
            format_coordinate(self.lat)
        )
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wkt())
    }
}

/// A row of the `qr_codes` table.
///
/// Created once per generated code and never updated. `id` is the same
/// identifier that appears in the signed payload and in the image filename.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub id: String,
    pub store_id: i64,
    pub banner_id: i64,
    pub item_id: i64,
    pub location: GeoPoint,
    pub campaign_id: i64,
}

impl MetadataRecord {
    pub fn new(record: &SourceRecord, unique_id: &str) -> Self {
        Self {
            id: unique_id.to_string(),
            store_id: record.store_id,
            banner_id: record.banner_id,
            item_id: record.item_id,
            location: GeoPoint::from_lng_lat(record.lng, record.lat),
            campaign_id: record.campaign_id,
        }
    }
}
