use std::path::Path;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use ridematch_core::{spatial::RouteBoxes, temporal::parse_date};
use serde::{Deserialize, Serialize};

use super::AppError;
use crate::{
    output::{offer_records, request_records, OfferRecord, RequestRecord},
    search::{search_offers, search_requests, MatchConfig, SearchForm},
    store::InMemoryListingStore,
    workflow::browse,
};

/// Command line tool for searching ride offers and ride requests in a listing snapshot
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct RideMatchApp {
    /// TOML file with matching configuration. RIDEMATCH_* environment variables override it.
    #[arg(long, global = true)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub op: RideMatchOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum RideMatchOperation {
    /// find offers that serve a passenger's trip
    SearchOffers {
        /// JSON listing snapshot
        #[arg(long)]
        listings: String,
        #[arg(long, allow_negative_numbers = true)]
        start_lat: String,
        #[arg(long, allow_negative_numbers = true)]
        start_lng: String,
        #[arg(long, allow_negative_numbers = true)]
        end_lat: String,
        #[arg(long, allow_negative_numbers = true)]
        end_lng: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        fuzziness: Option<String>,
    },
    /// find requests along a driver's route corridor
    SearchRequests {
        /// JSON listing snapshot
        #[arg(long)]
        listings: String,
        /// route boxes as JSON, `{"rectangles": [minLng, minLat, maxLng, maxLat, ...]}`
        #[arg(long, allow_hyphen_values = true)]
        rectangles: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        fuzziness: Option<String>,
    },
    /// merge route boxes into a corridor and print its contour as `[lng, lat]` pairs
    MergeBoxes {
        #[arg(long, allow_hyphen_values = true)]
        rectangles: String,
    },
    /// list upcoming open offers and requests
    Browse {
        /// JSON listing snapshot
        #[arg(long)]
        listings: String,
        /// reference time, defaults to the current local time
        #[arg(long)]
        now: Option<String>,
    },
}

#[derive(Serialize)]
struct BrowseOutput {
    offers: Vec<OfferRecord>,
    requests: Vec<RequestRecord>,
}

impl RideMatchApp {
    pub fn run(self) -> Result<(), AppError> {
        let config = read_config(self.config.as_deref())?;
        self.op.run(&config)
    }
}

impl RideMatchOperation {
    pub fn run(self, config: &MatchConfig) -> Result<(), AppError> {
        match self {
            RideMatchOperation::SearchOffers {
                listings,
                start_lat,
                start_lng,
                end_lat,
                end_lng,
                date,
                fuzziness,
            } => {
                let form = SearchForm {
                    start_lat,
                    start_lng,
                    end_lat,
                    end_lng,
                    date,
                    fuzziness,
                    polygon: None,
                };
                let search = form.to_offer_search(config)?;
                let store = InMemoryListingStore::load(Path::new(&listings))?;
                let offers = search_offers(&store, &search, config)?;
                log::info!("found {} matching ride offers", offers.len());
                print_json(&offer_records(&store, &offers)?)
            }
            RideMatchOperation::SearchRequests {
                listings,
                rectangles,
                date,
                fuzziness,
            } => {
                let form = SearchForm {
                    date,
                    fuzziness,
                    polygon: Some(rectangles),
                    ..SearchForm::default()
                };
                let search = form.to_request_search(config)?;
                let store = InMemoryListingStore::load(Path::new(&listings))?;
                let requests = search_requests(&store, &search)?;
                log::info!("found {} matching ride requests", requests.len());
                print_json(&request_records(&store, &requests)?)
            }
            RideMatchOperation::MergeBoxes { rectangles } => {
                let corridor = RouteBoxes::from_json(&rectangles)?.merge()?;
                print_json(&corridor.contour())
            }
            RideMatchOperation::Browse { listings, now } => {
                let now = reference_time(now.as_deref())?;
                let store = InMemoryListingStore::load(Path::new(&listings))?;
                let found = browse(&store, &now)?;
                let output = BrowseOutput {
                    offers: offer_records(&store, &found.offers)?,
                    requests: request_records(&store, &found.requests)?,
                };
                print_json(&output)
            }
        }
    }
}

fn read_config(filepath: Option<&str>) -> Result<MatchConfig, AppError> {
    let config = MatchConfig::load(filepath.map(Path::new)).map_err(|e| AppError::ConfigReadError {
        msg: match filepath {
            Some(f) => format!("failed reading '{f}'"),
            None => String::from("failed reading configuration from the environment"),
        },
        source: e,
    })?;
    log::debug!("matching configuration: {config:?}");
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}

fn reference_time(now: Option<&str>) -> Result<NaiveDateTime, AppError> {
    Ok(match now {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().naive_local(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::ListingStore,
        workflow::test_support::{offer_draft, store},
    };

    #[test]
    fn test_parse_search_offers_with_negative_coordinates() {
        let app = RideMatchApp::try_parse_from([
            "ridematch",
            "search-offers",
            "--listings",
            "listings.json",
            "--start-lat",
            "41.293",
            "--start-lng",
            "-82.205",
            "--end-lat",
            "41.266",
            "--end-lng",
            "-82.223",
            "--date",
            "06/01/2024 02:30 PM",
            "--config",
            "ridematch.toml",
        ])
        .expect("test invariant failed: parse");
        assert_eq!(app.config.as_deref(), Some("ridematch.toml"));
        match app.op {
            RideMatchOperation::SearchOffers {
                start_lng,
                fuzziness,
                ..
            } => {
                assert_eq!(start_lng, "-82.205");
                assert_eq!(fuzziness, None);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn test_operations_against_snapshot_file() {
        let store = store();
        store
            .insert_offer(offer_draft("driver"))
            .expect("test invariant failed: offer");
        let path = std::env::temp_dir().join(format!("ridematch-app-{}.json", std::process::id()));
        store.save(&path).expect("test invariant failed: save");
        let listings = path.to_string_lossy().to_string();
        let config = MatchConfig::default();

        let search = RideMatchOperation::SearchOffers {
            listings: listings.clone(),
            start_lat: String::from("41.293"),
            start_lng: String::from("-82.205"),
            end_lat: String::from("41.266"),
            end_lng: String::from("-82.223"),
            date: String::from("2024-06-01 14:30"),
            fuzziness: Some(String::from("anytime")),
        };
        let browse = RideMatchOperation::Browse {
            listings: listings.clone(),
            now: Some(String::from("2024-06-01")),
        };
        let bad_date = RideMatchOperation::Browse {
            listings,
            now: Some(String::from("whenever")),
        };
        let results = (search.run(&config), browse.run(&config), bad_date.run(&config));
        let _ = std::fs::remove_file(&path);
        assert!(results.0.is_ok());
        assert!(results.1.is_ok());
        assert!(matches!(
            results.2,
            Err(AppError::Match(crate::RideMatchError::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_merge_boxes_rejects_empty_list() {
        let op = RideMatchOperation::MergeBoxes {
            rectangles: String::from(r#"{"rectangles": []}"#),
        };
        assert!(op.run(&MatchConfig::default()).is_err());
        let op = RideMatchOperation::MergeBoxes {
            rectangles: String::from(r#"{"rectangles": [0, 0, 2, 2]}"#),
        };
        assert!(op.run(&MatchConfig::default()).is_ok());
    }
}
