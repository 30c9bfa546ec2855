use crate::decode::Coordinate;
use crate::error::{AppError, RouteError};
use crate::processor::ImageRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io::Write;
use std::path::PathBuf;
use url::Url;

/// Timestamp used to order waypoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RouteOrder {
    /// Filesystem creation time.
    #[default]
    FileCreated,
    /// Camera capture time, falling back to filesystem creation time.
    ExifCaptured,
}

impl RouteOrder {
    fn key(self, record: &ImageRecord) -> Option<NaiveDateTime> {
        match self {
            RouteOrder::FileCreated => record.created,
            RouteOrder::ExifCaptured => record.captured.or(record.created),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub source: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.waypoints
            .iter()
            .map(|w| (w.latitude.degrees(), w.longitude.degrees()))
            .collect()
    }
}

/// Orders the geotagged records by timestamp. Records without a timestamp
/// go last; equal keys keep their input order.
pub fn build_route<'a, I>(records: I, order: RouteOrder) -> Result<Route, RouteError>
where
    I: IntoIterator<Item = &'a ImageRecord>,
{
    let mut located: Vec<(Option<NaiveDateTime>, Waypoint)> = records
        .into_iter()
        .filter_map(|record| {
            let (latitude, longitude) = record.gps.position()?;
            let waypoint = Waypoint { latitude, longitude, source: record.path.clone() };
            Some((order.key(record), waypoint))
        })
        .collect();

    if located.len() < 2 {
        return Err(RouteError::InsufficientData { found: located.len() });
    }

    located.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    log::debug!("Route has {} waypoint(s)", located.len());

    Ok(Route { waypoints: located.into_iter().map(|(_, w)| w).collect() })
}

/// Appends one `lat,lon` path segment per waypoint to `base`.
pub fn directions_url(route: &Route, base: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(
            route
                .waypoints
                .iter()
                .map(|w| format!("{},{}", w.latitude, w.longitude)),
        );
    Ok(url)
}

/// Consumer of a finished route.
pub trait RouteSink {
    fn deliver(&mut self, route: &Route) -> Result<(), AppError>;
}

/// Writes the directions URL as a line of text.
pub struct PrintSink<W: Write> {
    base_url: String,
    out: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(base_url: impl Into<String>, out: W) -> Self {
        Self { base_url: base_url.into(), out }
    }
}

impl<W: Write> RouteSink for PrintSink<W> {
    fn deliver(&mut self, route: &Route) -> Result<(), AppError> {
        let url = directions_url(route, &self.base_url)?;
        writeln!(self.out, "{url}")?;
        Ok(())
    }
}

/// Opens the directions URL in the default browser.
pub struct BrowserSink {
    base_url: String,
}

impl BrowserSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl RouteSink for BrowserSink {
    fn deliver(&mut self, route: &Route) -> Result<(), AppError> {
        let url = directions_url(route, &self.base_url)?;
        log::info!("Opening {}", url);
        opener::open(url.as_str())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAPS_BASE_URL;
    use crate::gps::GpsInfo;

    fn at(secs: i64) -> Option<NaiveDateTime> {
        chrono::DateTime::from_timestamp(secs, 0).map(|t| t.naive_utc())
    }

    fn record(name: &str, created: Option<NaiveDateTime>, position: Option<(f64, f64)>) -> ImageRecord {
        ImageRecord {
            path: PathBuf::from(name),
            width: 1,
            height: 1,
            gps: GpsInfo {
                latitude: position.map(|(lat, _)| Coordinate::new(lat)),
                longitude: position.map(|(_, lon)| Coordinate::new(lon)),
                altitude: None,
            },
            created,
            modified: None,
            captured: None,
            size: None,
            file_name: name.into(),
            extension: None,
            content_type: None,
        }
    }

    #[test]
    fn fewer_than_two_geotagged_records_is_insufficient() {
        assert_eq!(
            build_route(std::iter::empty(), RouteOrder::FileCreated),
            Err(RouteError::InsufficientData { found: 0 })
        );
        let records = [
            record("a.jpg", at(10), Some((1.0, 2.0))),
            record("b.jpg", at(20), None),
        ];
        assert_eq!(
            build_route(&records, RouteOrder::FileCreated),
            Err(RouteError::InsufficientData { found: 1 })
        );
    }

    #[test]
    fn two_records_come_back_in_timestamp_order() {
        let records = [
            record("late.jpg", at(200), Some((3.0, 4.0))),
            record("early.jpg", at(100), Some((1.0, 2.0))),
        ];
        let route = build_route(&records, RouteOrder::FileCreated).unwrap();
        assert_eq!(route.pairs(), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let records = [
            record("first.jpg", at(50), Some((10.0, 10.0))),
            record("second.jpg", at(50), Some((20.0, 20.0))),
            record("earliest.jpg", at(5), Some((0.0, 0.0))),
        ];
        let route = build_route(&records, RouteOrder::FileCreated).unwrap();
        assert_eq!(route.pairs(), vec![(0.0, 0.0), (10.0, 10.0), (20.0, 20.0)]);
    }

    #[test]
    fn records_without_gps_are_skipped() {
        let records = [
            record("1.jpg", at(1), Some((48.858222, 2.2945))),
            record("2.jpg", at(2), None),
            record("3.jpg", at(3), Some((51.500729, -0.124625))),
        ];
        let route = build_route(&records, RouteOrder::FileCreated).unwrap();
        assert_eq!(route.pairs(), vec![(48.858222, 2.2945), (51.500729, -0.124625)]);
        assert_eq!(route.waypoints[1].source, PathBuf::from("3.jpg"));
    }

    #[test]
    fn untimed_records_sort_last() {
        let records = [
            record("untimed.jpg", None, Some((5.0, 5.0))),
            record("timed.jpg", at(1_000), Some((6.0, 6.0))),
        ];
        let route = build_route(&records, RouteOrder::FileCreated).unwrap();
        assert_eq!(route.pairs(), vec![(6.0, 6.0), (5.0, 5.0)]);
    }

    #[test]
    fn capture_order_prefers_camera_time() {
        let mut shot_first = record("shot_first.jpg", at(900), Some((1.0, 1.0)));
        shot_first.captured = at(100);
        let shot_second = record("shot_second.jpg", at(500), Some((2.0, 2.0)));
        let records = [shot_second, shot_first];

        let by_file = build_route(&records, RouteOrder::FileCreated).unwrap();
        assert_eq!(by_file.pairs(), vec![(2.0, 2.0), (1.0, 1.0)]);
        let by_capture = build_route(&records, RouteOrder::ExifCaptured).unwrap();
        assert_eq!(by_capture.pairs(), vec![(1.0, 1.0), (2.0, 2.0)]);
    }

    #[test]
    fn url_joins_waypoints_with_slashes() {
        let records = [
            record("a.jpg", at(1), Some((40.446111, -79.982222))),
            record("b.jpg", at(2), Some((-33.8675, 151.207))),
        ];
        let route = build_route(&records, RouteOrder::FileCreated).unwrap();
        let url = directions_url(&route, DEFAULT_MAPS_BASE_URL).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.google.com/maps/dir/40.446111,-79.982222/-33.8675,151.207"
        );

        let mut out = Vec::new();
        PrintSink::new("https://maps.example/dir", &mut out).deliver(&route).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://maps.example/dir/40.446111,-79.982222/-33.8675,151.207\n"
        );
    }
}
