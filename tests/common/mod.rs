#![allow(dead_code)]

use std::{
    cell::RefCell,
    io::{self, Read, Write},
    rc::Rc,
};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use odometer::{
    avec::TripReceiver,
    sans::{
        check::compute_checksum,
        fix::Fix,
        trip::{Trip, TripId},
    },
};

pub const DEVICE: &str = "dev-42";

/// Roughly one metre of latitude, in degrees.
pub const METRE: f64 = 1.0 / 111_195.0;

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 4)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

pub fn fix(timestamp: NaiveDateTime, latitude: f64, longitude: f64) -> Fix {
    Fix {
        timestamp,
        latitude,
        longitude,
        speed: 0.0,
        valid: true,
    }
}

/// Fixes one second apart, all at the same position.
pub fn stationary(start: NaiveDateTime, n: usize, latitude: f64, longitude: f64) -> Vec<Fix> {
    (0..n)
        .map(|i| fix(start + TimeDelta::seconds(i as i64), latitude, longitude))
        .collect()
}

/// Fixes one second apart, heading north at a number of metres per second.
pub fn northbound(
    start: NaiveDateTime,
    n: usize,
    latitude: f64,
    longitude: f64,
    mps: f64,
) -> Vec<Fix> {
    (0..n)
        .map(|i| {
            let t = start + TimeDelta::seconds(i as i64);
            let mut f = fix(t, latitude + i as f64 * mps * METRE, longitude);
            f.speed = mps;
            f
        })
        .collect()
}

/// A `GPRMC` sentence with a correct checksum and CRLF terminator.
pub fn rmc(t: NaiveDateTime, latitude: f64, longitude: f64, knots: f64) -> String {
    let body = format!(
        "GPRMC,{},A,{},{},{},{},{knots:.3},0.00,{},,,A",
        t.format("%H%M%S.00"),
        degrees_minutes(latitude.abs(), 2),
        if latitude < 0.0 { "S" } else { "N" },
        degrees_minutes(longitude.abs(), 3),
        if longitude < 0.0 { "W" } else { "E" },
        t.format("%d%m%y"),
    );

    format!("${body}*{:02X}\r\n", compute_checksum(0, body.as_bytes()))
}

fn degrees_minutes(value: f64, width: usize) -> String {
    let degrees = value.trunc();
    let minutes = (value - degrees) * 60.0;
    format!("{:0width$}{minutes:07.4}", degrees as u32)
}

/// A reader handing out at most `n` bytes per read.
pub struct Trickle<'a> {
    data: &'a [u8],
    n: usize,
}

impl<'a> Trickle<'a> {
    pub fn new(data: &'a [u8], n: usize) -> Self {
        Self { data, n }
    }
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.n.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// A receiver recording every transition.
#[derive(Debug, Default)]
pub struct Log {
    pub started: Vec<TripId>,
    pub appended: Vec<(TripId, usize)>,
    pub finished: Vec<Trip>,
}

impl TripReceiver for Log {
    fn start_trip(&mut self, id: &TripId) -> io::Result<()> {
        self.started.push(id.clone());
        Ok(())
    }

    fn add_waypoints(&mut self, id: &TripId, waypoints: &[Fix]) -> io::Result<()> {
        self.appended.push((id.clone(), waypoints.len()));
        Ok(())
    }

    fn finish_trip(&mut self, trip: Trip) -> io::Result<()> {
        self.finished.push(trip);
        Ok(())
    }
}

/// A writer whose bytes stay readable after it is dropped.
#[derive(Debug, Default, Clone)]
pub struct Shared(pub Rc<RefCell<Vec<u8>>>);

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
