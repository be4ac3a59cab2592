use apidb_bulk::error::ApiDbError;
use apidb_bulk::tile::{scale_coordinate, scale_latitude, scale_longitude, tile_for_point};

#[test]
fn coordinates_scale_to_fixed_point_with_rounding() {
    assert_eq!(scale_coordinate(1.0), 10_000_000);
    assert_eq!(scale_coordinate(-0.5), -5_000_000);
    assert_eq!(scale_coordinate(1.23456789), 12_345_679);
}

#[test]
fn latitude_bounds_are_inclusive() -> Result<(), ApiDbError> {
    assert_eq!(scale_latitude(90.0)?, 900_000_000);
    assert_eq!(scale_latitude(-90.0)?, -900_000_000);
    assert!(matches!(scale_latitude(90.1), Err(ApiDbError::InvalidLatitude { .. })));
    Ok(())
}

#[test]
fn longitude_bounds_are_inclusive() -> Result<(), ApiDbError> {
    assert_eq!(scale_longitude(180.0)?, 1_800_000_000);
    assert_eq!(scale_longitude(-180.0)?, -1_800_000_000);
    assert!(matches!(scale_longitude(180.1), Err(ApiDbError::InvalidLongitude { .. })));
    Ok(())
}

#[test]
fn tiles_interleave_longitude_and_latitude_bits() {
    // corners of the grid
    assert_eq!(tile_for_point(-90.0, -180.0), 0);
    assert_eq!(tile_for_point(90.0, 180.0), u64::from(u32::MAX));
    // the origin scales to bit 15 in both axes
    assert_eq!(tile_for_point(0.0, 0.0), 0b11 << 30);
}

#[test]
fn nearby_points_often_share_a_tile() {
    let a = tile_for_point(51.50740, -0.12780);
    let b = tile_for_point(51.50741, -0.12781);
    assert_eq!(a, b);
}
