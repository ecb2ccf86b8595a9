use ridematch_core::{
    spatial::{GeoPoint, RouteBoxes},
    temporal::{parse_date, Fuzziness},
    InputError,
};
use serde::{Deserialize, Serialize};

use super::{MatchConfig, OfferSearch, RequestSearch};

/// raw search fields as submitted by a client. every value is still text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub start_lat: String,
    #[serde(default)]
    pub start_lng: String,
    #[serde(default)]
    pub end_lat: String,
    #[serde(default)]
    pub end_lng: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub fuzziness: Option<String>,
    /// serialized route boxes, `{"rectangles": [...]}`
    #[serde(default)]
    pub polygon: Option<String>,
}

impl SearchForm {
    pub fn to_offer_search(&self, config: &MatchConfig) -> Result<OfferSearch, InputError> {
        let start = GeoPoint::parse(
            required("start_lat", &self.start_lat)?,
            required("start_lng", &self.start_lng)?,
        )?;
        let end = GeoPoint::parse(
            required("end_lat", &self.end_lat)?,
            required("end_lng", &self.end_lng)?,
        )?;
        let date = parse_date(required("date", &self.date)?)?;
        OfferSearch::new(start, end, date, self.fuzziness(config)?)
    }

    pub fn to_request_search(&self, config: &MatchConfig) -> Result<RequestSearch, InputError> {
        let boxes = self
            .polygon
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or(InputError::MissingField("polygon"))?;
        let polygon = RouteBoxes::from_json(boxes)?.merge()?;
        let date = parse_date(required("date", &self.date)?)?;
        Ok(RequestSearch::new(polygon, date, self.fuzziness(config)?))
    }

    /// a blank fuzziness falls back to the configured default.
    fn fuzziness(&self, config: &MatchConfig) -> Result<Fuzziness, InputError> {
        match self.fuzziness.as_deref().map(str::trim) {
            None | Some("") => Ok(config.default_fuzziness),
            Some(value) => value.parse(),
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, InputError> {
    if value.trim().is_empty() {
        Err(InputError::MissingField(field))
    } else {
        Ok(value)
    }
}
