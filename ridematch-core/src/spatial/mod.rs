mod geo_point;
mod location;
mod route_polygon;

pub mod geo_utils;

pub use geo_point::GeoPoint;
pub use geo_utils::distance;
pub use location::{Location, SAME_PLACE_KM};
pub use route_polygon::{merge_boxes, RouteBoxes, RoutePolygon};
