use geo::{Distance, HaversineMeasure, Intersects, Polygon};

use super::GeoPoint;

/// earth radius used by every distance computation in the engine, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// great-circle distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`], using geo's haversine measure.
///
/// this function does not validate its inputs. callers that accept
/// coordinates from outside the engine should build them with
/// [`GeoPoint::try_new`] first.
///
/// # Arguments
///
/// * `p1` - first point, in signed decimal degrees
/// * `p2` - second point, in signed decimal degrees
///
/// # Returns
///
/// * the distance between the points in kilometers
pub fn distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let haversine = HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0);
    haversine.distance(p1.to_geo(), p2.to_geo()) / 1000.0
}

/// tests whether a point lies inside or on the boundary of a polygon whose
/// coordinates are in (lng, lat) order.
pub fn within_polygon(point: &GeoPoint, polygon: &Polygon<f64>) -> bool {
    polygon.intersects(&point.to_geo())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(41.293, -82.205);
        assert_eq!(distance(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let oberlin = GeoPoint::new(41.2939, -82.2175);
        let cleveland = GeoPoint::new(41.4993, -81.6944);
        let d1 = distance(&oberlin, &cleveland);
        let d2 = distance(&cleveland, &oberlin);
        assert!((d1 - d2).abs() < 1e-9);
        // roughly 48 km as the crow flies
        assert!(d1 > 45.0 && d1 < 52.0, "unexpected distance {d1}");
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!((distance(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_within_polygon_includes_boundary() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(within_polygon(&GeoPoint::new(1.0, 1.0), &square));
        assert!(within_polygon(&GeoPoint::new(0.0, 1.0), &square));
        assert!(!within_polygon(&GeoPoint::new(1.0, 2.5), &square));
    }
}
