//! Fixed-point coordinate handling shared with the API database schema.

use crate::error::ApiDbError;

/// Degrees are stored as `round(deg * COORDINATE_SCALE)` fixed-point values.
pub const COORDINATE_SCALE: f64 = 10_000_000.0;

const LATITUDE_LIMIT: i64 = 900_000_000;
const LONGITUDE_LIMIT: i64 = 1_800_000_000;

pub fn scale_coordinate(degrees: f64) -> i64 {
    (degrees * COORDINATE_SCALE).round() as i64
}

pub fn scale_latitude(latitude: f64) -> Result<i32, ApiDbError> {
    let scaled = scale_coordinate(latitude);
    if !(-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&scaled) {
        return Err(ApiDbError::InvalidLatitude { latitude, scaled });
    }
    Ok(scaled as i32)
}

pub fn scale_longitude(longitude: f64) -> Result<i32, ApiDbError> {
    let scaled = scale_coordinate(longitude);
    if !(-LONGITUDE_LIMIT..=LONGITUDE_LIMIT).contains(&scaled) {
        return Err(ApiDbError::InvalidLongitude { longitude, scaled });
    }
    Ok(scaled as i32)
}

/// Quadtile index for a point, interleaving 16-bit scaled longitude and
/// latitude.  Matches the tile numbering the API database indexes nodes by.
pub fn tile_for_point(lat: f64, lon: f64) -> u64 {
    let lon_int = ((lon + 180.0) * 65535.0 / 360.0).round() as u32;
    let lat_int = ((lat + 90.0) * 65535.0 / 180.0).round() as u32;

    let mut tile = 0u64;
    for i in (0..16).rev() {
        tile = (tile << 1) | u64::from((lon_int >> i) & 1);
        tile = (tile << 1) | u64::from((lat_int >> i) & 1);
    }
    tile
}
