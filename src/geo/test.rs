use crate::geo::{Coordinate, GeoError, Trace};

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, Utc};
use geo::wkt;

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

#[test]
fn rejects_out_of_range_coordinates() {
    assert!(Coordinate::new(91.0, 0.0).is_err());
    assert!(Coordinate::new(0.0, -180.5).is_err());
    assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    assert!(Coordinate::new(-90.0, 180.0).is_ok());
}

#[test]
fn rejects_negative_accuracy() {
    let coordinate = Coordinate::new_unchecked(10.0, 10.0).with_accuracy(-1.0);
    assert!(matches!(
        coordinate.validate(),
        Err(GeoError::InvalidCoordinate(_))
    ));
}

#[test]
fn point_is_lng_lat_ordered() {
    let coordinate = Coordinate::new(-33.8688, 151.2093).expect("valid coordinate");
    let point = coordinate.point();

    assert_relative_eq!(point.x(), 151.2093);
    assert_relative_eq!(point.y(), -33.8688);
}

#[test]
fn empty_trace_is_rejected() {
    assert_eq!(Trace::new(vec![]), Err(GeoError::EmptyTrace));
}

#[test]
fn decreasing_timestamps_are_rejected() {
    let coordinates = vec![
        Coordinate::new_unchecked(0.0, 0.0).with_timestamp(epoch()),
        Coordinate::new_unchecked(0.0, 0.001).with_timestamp(epoch() + Duration::seconds(10)),
        Coordinate::new_unchecked(0.0, 0.002).with_timestamp(epoch() + Duration::seconds(5)),
    ];

    assert_eq!(
        Trace::new(coordinates),
        Err(GeoError::TimestampOutOfOrder { index: 2 })
    );
}

#[test]
fn untimed_points_do_not_break_ordering() {
    let coordinates = vec![
        Coordinate::new_unchecked(0.0, 0.0).with_timestamp(epoch()),
        Coordinate::new_unchecked(0.0, 0.001),
        Coordinate::new_unchecked(0.0, 0.002).with_timestamp(epoch()),
    ];

    let trace = Trace::new(coordinates).expect("equal timestamps are allowed");

    assert_eq!(trace.elapsed(0), None);
    assert_eq!(trace.elapsed(1), None);
    assert_eq!(trace.elapsed(2), None);
}

#[test]
fn elapsed_between_observations() {
    let coordinates = vec![
        Coordinate::new_unchecked(0.0, 0.0).with_timestamp(epoch()),
        Coordinate::new_unchecked(0.0, 0.001)
            .with_timestamp(epoch() + Duration::milliseconds(2500)),
    ];

    let trace = Trace::new(coordinates).expect("valid trace");
    assert_relative_eq!(trace.elapsed(1).expect("both timed"), 2.5);
}

#[test]
fn trace_from_linestring() {
    let linestring = wkt! { LINESTRING (151.19462 -33.885309, 151.193783 -33.887126) };
    let trace = Trace::try_from(linestring).expect("valid trace");

    assert_eq!(trace.len(), 2);
    assert_relative_eq!(trace[0].latitude(), -33.885309);
    assert_relative_eq!(trace[1].longitude(), 151.193783);
}
