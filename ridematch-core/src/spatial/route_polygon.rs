use geo::{coord, BooleanOps, BoundingRect, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};

use super::{geo_utils, GeoPoint};
use crate::InputError;

/// a driver's route corridor: a single polygon in (lng, lat) space. stored and
/// serialized as its contour, an ordered list of `[lng, lat]` vertices without
/// the closing vertex. an empty contour means the offer has no corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct RoutePolygon {
    polygon: Polygon<f64>,
}

impl RoutePolygon {
    pub fn new(polygon: Polygon<f64>) -> RoutePolygon {
        let (exterior, _) = polygon.into_inner();
        RoutePolygon {
            polygon: Polygon::new(exterior, vec![]),
        }
    }

    pub fn empty() -> RoutePolygon {
        RoutePolygon {
            polygon: Polygon::new(LineString::new(vec![]), vec![]),
        }
    }

    /// builds a corridor from contour points in `[lng, lat]` order.
    pub fn from_contour(points: &[[f64; 2]]) -> Result<RoutePolygon, InputError> {
        if points.is_empty() {
            return Ok(RoutePolygon::empty());
        }
        if points.len() < 3 {
            return Err(InputError::MalformedRectangles(format!(
                "a route polygon needs at least 3 vertices, found {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().flatten().find(|v| !v.is_finite()) {
            return Err(InputError::MalformedRectangles(format!(
                "route polygon vertex '{bad}' is not a finite number"
            )));
        }
        let ring: LineString<f64> = points.iter().map(|[x, y]| coord! { x: *x, y: *y }).collect();
        // Polygon::new closes the ring
        Ok(RoutePolygon::new(Polygon::new(ring, vec![])))
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn is_empty(&self) -> bool {
        self.polygon.exterior().0.is_empty()
    }

    /// the contour in `[lng, lat]` order, without repeating the first vertex.
    pub fn contour(&self) -> Vec<[f64; 2]> {
        let coords = &self.polygon.exterior().0;
        let open_len = match (coords.first(), coords.last()) {
            (Some(first), Some(last)) if coords.len() > 1 && first == last => coords.len() - 1,
            _ => coords.len(),
        };
        coords[..open_len].iter().map(|c| [c.x, c.y]).collect()
    }

    /// boundary-inclusive point-in-polygon test. an empty corridor contains nothing.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        !self.is_empty() && geo_utils::within_polygon(point, &self.polygon)
    }

    /// axis-aligned bounds of the corridor, for spatial index pre-filtering.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }
}

impl TryFrom<Vec<[f64; 2]>> for RoutePolygon {
    type Error = InputError;

    fn try_from(value: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        RoutePolygon::from_contour(&value)
    }
}

impl From<RoutePolygon> for Vec<[f64; 2]> {
    fn from(value: RoutePolygon) -> Self {
        value.contour()
    }
}

/// the serialized rectangle list a client submits for a drawn route:
/// `{"rectangles": [minLng, minLat, maxLng, maxLat, ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteBoxes {
    pub rectangles: Vec<f64>,
}

impl RouteBoxes {
    pub fn from_json(json: &str) -> Result<RouteBoxes, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::MalformedJson(e.to_string()))
    }

    pub fn merge(&self) -> Result<RoutePolygon, InputError> {
        merge_boxes(&self.rectangles)
    }
}

/// merges a chain of axis-aligned route boxes into one corridor polygon.
///
/// each group of 4 numbers describes one rectangle in (lng, lat) space. the
/// corner order within a group is normalized, so swapped corners describe the
/// same rectangle. the rectangles are combined with a boolean polygon union
/// and the outer boundary of the 0th resulting polygon becomes the corridor.
///
/// # Arguments
///
/// * `rectangles` - flat list of `minLng, minLat, maxLng, maxLat` quadruples
///
/// # Returns
///
/// * the corridor polygon, or an error if the list is empty or malformed
pub fn merge_boxes(rectangles: &[f64]) -> Result<RoutePolygon, InputError> {
    if rectangles.is_empty() {
        return Err(InputError::EmptyRectangles);
    }
    if rectangles.len() % 4 != 0 {
        return Err(InputError::MalformedRectangles(format!(
            "expected 4 numbers per rectangle, found {} numbers",
            rectangles.len()
        )));
    }
    if let Some(bad) = rectangles.iter().find(|v| !v.is_finite()) {
        return Err(InputError::MalformedRectangles(format!(
            "rectangle bound '{bad}' is not a finite number"
        )));
    }

    let boxes: Vec<Polygon<f64>> = rectangles
        .chunks_exact(4)
        .map(|b| Rect::new(coord! { x: b[0], y: b[1] }, coord! { x: b[2], y: b[3] }).to_polygon())
        .collect();

    if let [single] = boxes.as_slice() {
        return Ok(RoutePolygon::new(single.clone()));
    }

    let merged = boxes
        .into_iter()
        .map(|b| MultiPolygon::new(vec![b]))
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or_else(|| MultiPolygon::new(vec![]));

    if merged.0.len() > 1 {
        log::warn!(
            "route boxes form {} disjoint regions, keeping the first as the corridor",
            merged.0.len()
        );
    }
    let outer = merged.0.into_iter().next().ok_or_else(|| {
        InputError::MalformedRectangles(String::from(
            "rectangle union is empty, all rectangles have zero area",
        ))
    })?;
    Ok(RoutePolygon::new(outer))
}
