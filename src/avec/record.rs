//! Waypoint records and trip upload payloads.
//!
//! While a trip is open its waypoints are appended to a record, one line per
//! waypoint:
//!
//! ```text
//! 2024-05-04 09:12:31, 48.1173, 11.516666666666667, 11.5235456
//! ```
//!
//! A finished trip is uploaded as a JSON [`TripPayload`].

use std::io::{self, Read, Write};

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Serialize, Serializer};

use crate::sans::{
    fix::Fix,
    trip::{TIMESTAMP_FORMAT, Trip, TripId},
};

use super::TripReceiver;

/// A waypoint as persisted and uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    #[serde(serialize_with = "timestamp")]
    pub datetime: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    /// Speed over ground in m/s.
    pub speed: f64,
}

impl From<&Fix> for Waypoint {
    fn from(fix: &Fix) -> Self {
        Self {
            datetime: fix.timestamp,
            lat: fix.latitude,
            lng: fix.longitude,
            speed: fix.speed,
        }
    }
}

/// The body uploaded for a finished trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPayload {
    pub trip_id: String,
    pub user_id: String,
    #[serde(serialize_with = "timestamp")]
    pub start_datetime: NaiveDateTime,
    pub waypoints: Vec<Waypoint>,
}

impl TripPayload {
    /// Rebuild a payload from persisted waypoints.
    ///
    /// Returns `None` if there are no waypoints.
    pub fn from_waypoints(device: &str, waypoints: Vec<Waypoint>) -> Option<Self> {
        let start = waypoints.first()?.datetime;

        Some(Self {
            trip_id: TripId::new(device, start).to_string(),
            user_id: device.to_string(),
            start_datetime: start,
            waypoints,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&Trip> for TripPayload {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id.to_string(),
            user_id: trip.user_id.clone(),
            start_datetime: trip.start,
            waypoints: trip.waypoints.iter().map(Waypoint::from).collect(),
        }
    }
}

/// Append one record line per fix, then flush.
pub fn write_waypoints(w: &mut impl Write, waypoints: &[Fix]) -> io::Result<()> {
    for fix in waypoints {
        writeln!(
            w,
            "{}, {}, {}, {}",
            fix.timestamp.format(TIMESTAMP_FORMAT),
            fix.latitude,
            fix.longitude,
            fix.speed
        )?;
    }

    w.flush()
}

/// Read back the waypoints of a record, skipping malformed lines.
pub fn read_waypoints(r: impl Read) -> io::Result<Vec<Waypoint>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(r);

    let mut waypoints = Vec::new();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => Err(err)?,
            Err(err) => {
                debug!("skipped record: {err}");
                continue;
            }
        };

        let Ok((datetime, lat, lng, speed)) = record.deserialize::<(String, f64, f64, f64)>(None)
        else {
            debug!("skipped record {record:?}");
            continue;
        };

        let Ok(datetime) = NaiveDateTime::parse_from_str(&datetime, TIMESTAMP_FORMAT) else {
            debug!("skipped record {record:?}");
            continue;
        };

        waypoints.push(Waypoint {
            datetime,
            lat,
            lng,
            speed,
        });
    }

    Ok(waypoints)
}

fn timestamp<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format(TIMESTAMP_FORMAT))
}

/// A receiver persisting each trip to its own record and uploading it once
/// finished.
///
/// `open` creates the record writer when a trip starts; `upload` receives the
/// payload when it finishes. Persistence and transport are left to these
/// callbacks.
pub struct Recorder<O, W, U> {
    open: O,
    record: Option<W>,
    upload: U,
}

impl<O, W, U> Recorder<O, W, U>
where
    O: FnMut(&TripId) -> io::Result<W>,
    W: Write,
    U: FnMut(TripPayload) -> io::Result<()>,
{
    pub fn new(open: O, upload: U) -> Self {
        Self {
            open,
            record: None,
            upload,
        }
    }
}

impl<O, W, U> TripReceiver for Recorder<O, W, U>
where
    O: FnMut(&TripId) -> io::Result<W>,
    W: Write,
    U: FnMut(TripPayload) -> io::Result<()>,
{
    fn start_trip(&mut self, id: &TripId) -> io::Result<()> {
        self.record = Some((self.open)(id)?);
        Ok(())
    }

    fn add_waypoints(&mut self, id: &TripId, waypoints: &[Fix]) -> io::Result<()> {
        let record = match self.record.take() {
            Some(record) => record,
            None => (self.open)(id)?,
        };

        write_waypoints(self.record.insert(record), waypoints)
    }

    fn finish_trip(&mut self, trip: Trip) -> io::Result<()> {
        // Dropping the writer closes the record.
        self.record = None;
        (self.upload)(TripPayload::from(&trip))
    }
}
