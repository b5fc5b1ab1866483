//! Nominatim geocoding: blocking client plus the asynchronous front used by
//! the UI.
//!
//! The client wraps `GET {base}/search?format=json&limit=N&polygon_geojson=1`.
//! Parsing is split out into pure functions so the response handling can be
//! tested from JSON fixtures without any network access.
//!
//! The [`Geocoder`] runs the client on a worker thread and talks to the frame
//! loop through channels. Every request carries a monotonically increasing
//! sequence number; [`Geocoder::poll`] drops any response whose number is not
//! the most recently issued one, so a slow earlier search can never clobber a
//! newer result.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use geo::BoundingRect;
use geo_types::{Coord, LineString, Polygon};
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

/// Public Nominatim instance. Override via [`NominatimClient::new`] for tests
/// or self-hosted deployments.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying agent string.
const USER_AGENT: &str = concat!("aoimap/", env!("CARGO_PKG_VERSION"));

static AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(10))
        .build()
});

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("geocoding response could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("geocoding response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Geographic bounds in WGS-84 lon/lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl LonLatBounds {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// The bounds as a closed rectangle ring, the fallback when no
    /// administrative polygon is available.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                Coord {
                    x: self.min_lon,
                    y: self.min_lat,
                },
                Coord {
                    x: self.max_lon,
                    y: self.min_lat,
                },
                Coord {
                    x: self.max_lon,
                    y: self.max_lat,
                },
                Coord {
                    x: self.min_lon,
                    y: self.max_lat,
                },
                Coord {
                    x: self.min_lon,
                    y: self.min_lat,
                },
            ]),
            vec![],
        )
    }
}

/// Bounds of a polygon's exterior, for viewport fitting.
pub fn polygon_bounds(polygon: &Polygon<f64>) -> Option<LonLatBounds> {
    let rect = polygon.bounding_rect()?;
    Some(LonLatBounds {
        min_lon: rect.min().x,
        min_lat: rect.min().y,
        max_lon: rect.max().x,
        max_lat: rect.max().y,
    })
}

/// One geocoding match.
#[derive(Debug, Clone)]
pub struct Place {
    pub display_name: String,
    pub bounds: LonLatBounds,
}

/// Raw result row; only the fields this crate consumes.
#[derive(Debug, Deserialize)]
struct NominatimRow {
    display_name: String,
    /// Nominatim order: `[minLat, maxLat, minLon, maxLon]`.
    boundingbox: [String; 4],
    #[serde(default)]
    geojson: Option<geojson::Geometry>,
}

/// Parse Nominatim's `[minLat, maxLat, minLon, maxLon]` string quadruple into
/// lon/lat-ordered bounds.
pub fn parse_bounding_box(raw: &[String; 4]) -> Option<LonLatBounds> {
    let min_lat: f64 = raw[0].parse().ok()?;
    let max_lat: f64 = raw[1].parse().ok()?;
    let min_lon: f64 = raw[2].parse().ok()?;
    let max_lon: f64 = raw[3].parse().ok()?;
    Some(LonLatBounds {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
    })
}

fn polygon_from_geojson(geometry: &geojson::Geometry) -> Option<Polygon<f64>> {
    match geo_types::Geometry::<f64>::try_from(geometry) {
        Ok(geo_types::Geometry::Polygon(p)) => Some(p),
        Ok(geo_types::Geometry::MultiPolygon(mp)) => mp.0.into_iter().next(),
        _ => None,
    }
}

fn rows_from_body(body: &str) -> Result<Vec<NominatimRow>, GeocodeError> {
    Ok(serde_json::from_str(body)?)
}

/// The best match of a search response, or `None` for an empty result set or
/// an unparseable bounding box.
pub fn first_place(body: &str) -> Result<Option<Place>, GeocodeError> {
    let rows = rows_from_body(body)?;
    Ok(rows.into_iter().next().and_then(|row| {
        let bounds = parse_bounding_box(&row.boundingbox)?;
        Some(Place {
            display_name: row.display_name,
            bounds,
        })
    }))
}

/// The first polygonal geometry of a search response. Results whose geometry
/// is a point or line are skipped; a multi-polygon contributes its first
/// polygon.
pub fn best_area_polygon(body: &str) -> Result<Option<Polygon<f64>>, GeocodeError> {
    let rows = rows_from_body(body)?;
    Ok(rows
        .iter()
        .filter_map(|row| row.geojson.as_ref())
        .find_map(polygon_from_geojson))
}

/// Blocking Nominatim client.
pub struct NominatimClient {
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn fetch(&self, query: &str, limit: u8) -> Result<String, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let response = AGENT
            .get(&url)
            .query("format", "json")
            .query("limit", &limit.to_string())
            .query("polygon_geojson", "1")
            .query("q", query)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(Box::new)?;
        Ok(response.into_string()?)
    }

    /// Best match for a free-form place query, or `None`.
    pub fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        first_place(&self.fetch(query, 1)?)
    }

    /// Administrative polygon for a place, or `None` when only point/line
    /// geometry is available (callers fall back to the bounding box).
    pub fn area_polygon(&self, query: &str) -> Result<Option<Polygon<f64>>, GeocodeError> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        best_area_polygon(&self.fetch(query, 5)?)
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Asynchronous front
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum GeocodeRequest {
    /// Find a place and fit the viewport to its bounding box.
    Locate { query: String },
    /// Resolve a place's outline polygon (bbox rectangle fallback).
    Outline { query: String },
}

/// Outcome delivered back to the frame loop.
#[derive(Debug)]
pub enum GeocodeOutcome {
    /// Place found: fit the viewport to its bounds.
    Located(Place),
    /// Outline resolved: set as base outline and fit the viewport.
    Outline {
        polygon: Polygon<f64>,
        bounds: LonLatBounds,
        display_name: String,
    },
    /// Nothing usable came back (including swallowed network errors).
    NotFound,
}

struct Job {
    seq: u64,
    request: GeocodeRequest,
}

struct Response {
    seq: u64,
    outcome: GeocodeOutcome,
}

/// Worker-thread geocoder with stale-response suppression.
pub struct Geocoder {
    jobs: Sender<Job>,
    results: Receiver<Response>,
    /// Sequence number of the most recently issued request.
    issued: u64,
    /// Sequence number still awaiting a response, if any.
    pending: Option<u64>,
}

impl Geocoder {
    /// Spawn the worker thread.
    pub fn spawn(base_url: impl Into<String>) -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (res_tx, res_rx) = channel::<Response>();
        let client = NominatimClient::new(base_url);
        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let outcome = run_job(&client, &job.request);
                if res_tx
                    .send(Response {
                        seq: job.seq,
                        outcome,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });
        Self {
            jobs: job_tx,
            results: res_rx,
            issued: 0,
            pending: None,
        }
    }

    pub fn locate(&mut self, query: impl Into<String>) {
        self.issue(GeocodeRequest::Locate {
            query: query.into(),
        });
    }

    pub fn outline(&mut self, query: impl Into<String>) {
        self.issue(GeocodeRequest::Outline {
            query: query.into(),
        });
    }

    /// Whether a request is still in flight (drives the sidebar hint).
    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Drain responses; return the outcome of the newest request, dropping
    /// everything stale.
    pub fn poll(&mut self) -> Option<GeocodeOutcome> {
        let mut latest = None;
        while let Ok(response) = self.results.try_recv() {
            if response.seq == self.issued {
                self.pending = None;
                latest = Some(response.outcome);
            }
        }
        latest
    }

    fn issue(&mut self, request: GeocodeRequest) {
        self.issued += 1;
        self.pending = Some(self.issued);
        let _ = self.jobs.send(Job {
            seq: self.issued,
            request,
        });
    }

    #[cfg(test)]
    fn with_channels(results: Receiver<Response>) -> (Self, Sender<Job>) {
        let (job_tx, _job_rx) = channel::<Job>();
        (
            Self {
                jobs: job_tx.clone(),
                results,
                issued: 0,
                pending: None,
            },
            job_tx,
        )
    }
}

fn run_job(client: &NominatimClient, request: &GeocodeRequest) -> GeocodeOutcome {
    match request {
        GeocodeRequest::Locate { query } => match client.search(query) {
            Ok(Some(place)) => GeocodeOutcome::Located(place),
            Ok(None) => GeocodeOutcome::NotFound,
            Err(err) => {
                eprintln!("Geocoding failed for {query:?}: {err}");
                GeocodeOutcome::NotFound
            }
        },
        GeocodeRequest::Outline { query } => {
            let polygon = match client.area_polygon(query) {
                Ok(p) => p,
                Err(err) => {
                    eprintln!("Outline lookup failed for {query:?}: {err}");
                    None
                }
            };
            if let Some(polygon) = polygon {
                if let Some(bounds) = polygon_bounds(&polygon) {
                    return GeocodeOutcome::Outline {
                        polygon,
                        bounds,
                        display_name: query.clone(),
                    };
                }
            }
            // No polygon (or a degenerate one): fall back to the bbox rectangle.
            match client.search(query) {
                Ok(Some(place)) => GeocodeOutcome::Outline {
                    polygon: place.bounds.to_polygon(),
                    bounds: place.bounds,
                    display_name: place.display_name,
                },
                Ok(None) => GeocodeOutcome::NotFound,
                Err(err) => {
                    eprintln!("Geocoding failed for {query:?}: {err}");
                    GeocodeOutcome::NotFound
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_reorders_lat_lon() {
        let raw = [
            "50".to_string(),
            "51".to_string(),
            "6".to_string(),
            "7".to_string(),
        ];
        let bounds = parse_bounding_box(&raw).unwrap();
        assert_eq!(bounds.min_lon, 6.0);
        assert_eq!(bounds.min_lat, 50.0);
        assert_eq!(bounds.max_lon, 7.0);
        assert_eq!(bounds.max_lat, 51.0);
    }

    #[test]
    fn bounding_box_rejects_garbage() {
        let raw = [
            "fifty".to_string(),
            "51".to_string(),
            "6".to_string(),
            "7".to_string(),
        ];
        assert!(parse_bounding_box(&raw).is_none());
    }

    #[test]
    fn bbox_polygon_ring_is_closed() {
        let bounds = LonLatBounds {
            min_lon: 6.0,
            min_lat: 50.0,
            max_lon: 7.0,
            max_lat: 51.0,
        };
        let ring = bounds.to_polygon();
        let coords = &ring.exterior().0;
        assert_eq!(coords.len(), 5);
        assert_eq!(coords.first(), coords.last());
    }

    #[test]
    fn stale_responses_are_dropped() {
        let (res_tx, res_rx) = channel::<Response>();
        let (mut geocoder, _jobs) = Geocoder::with_channels(res_rx);
        // Two requests issued back to back; only the second may apply.
        geocoder.issued = 2;
        geocoder.pending = Some(2);
        res_tx
            .send(Response {
                seq: 1,
                outcome: GeocodeOutcome::NotFound,
            })
            .unwrap();
        assert!(geocoder.poll().is_none());
        assert!(geocoder.in_flight());
        res_tx
            .send(Response {
                seq: 2,
                outcome: GeocodeOutcome::NotFound,
            })
            .unwrap();
        assert!(matches!(geocoder.poll(), Some(GeocodeOutcome::NotFound)));
        assert!(!geocoder.in_flight());
    }

    #[test]
    fn late_stale_response_after_applied_result_is_dropped() {
        let (res_tx, res_rx) = channel::<Response>();
        let (mut geocoder, _jobs) = Geocoder::with_channels(res_rx);
        geocoder.issued = 2;
        geocoder.pending = Some(2);
        res_tx
            .send(Response {
                seq: 2,
                outcome: GeocodeOutcome::NotFound,
            })
            .unwrap();
        assert!(geocoder.poll().is_some());
        res_tx
            .send(Response {
                seq: 1,
                outcome: GeocodeOutcome::NotFound,
            })
            .unwrap();
        assert!(geocoder.poll().is_none());
    }
}
