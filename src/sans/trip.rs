//! States detecting trips from a sequence of fixes.

use std::{fmt, time::Instant};

use chrono::NaiveDateTime;
use either::Either::{self, Left, Right};
use log::trace;

use crate::config::Config;

use super::{fix::Fix, geo::centroid};

/// Format of trip identifiers and exported timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifier of a trip: the device identifier and the start timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripId(String);

impl TripId {
    pub fn new(device: &str, start: NaiveDateTime) -> Self {
        Self(format!("{device}-{}", start.format(TIMESTAMP_FORMAT)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contiguous span of detected movement.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: TripId,
    /// Device identifier supplied by the host.
    pub user_id: String,
    /// Timestamp of the first waypoint.
    pub start: NaiveDateTime,
    /// Waypoints in arrival order.
    pub waypoints: Vec<Fix>,
}

/// An output of a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Movement was detected while idle and a trip opened.
    Started(TripId),
    /// Fixes were appended to an open trip and should be persisted.
    Appended { trip: TripId, waypoints: Vec<Fix> },
    /// A trip was closed and is ready for upload.
    Finished(Trip),
}

/// Fixes awaiting a movement decision.
#[derive(Debug, Clone)]
struct Window {
    fixes: Vec<Fix>,
    capacity: usize,
}

impl Window {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            fixes: Vec::new(),
            capacity,
        }
    }

    /// Whether any fix lies further than a radius from the centroid.
    fn has_moved(&self, radius_m: f64) -> bool {
        let Some(centre) = centroid(&self.fixes) else {
            return false;
        };

        self.fixes
            .iter()
            .any(|f| centre.distance_m(&f.position()) > radius_m)
    }

    fn take(&mut self) -> Vec<Fix> {
        std::mem::take(&mut self.fixes)
    }
}

/// State shared by both tokens.
#[derive(Debug, Clone)]
struct Context {
    config: Config,
    device: String,
    window: Window,
    /// Arrival time of the latest fix.
    last_fix: Option<Instant>,
}

impl Context {
    /// Buffer a fix, returning the evaluated window once full.
    ///
    /// The window is emptied on every evaluation.
    fn accept(&mut self, now: Instant, fix: Option<Fix>) -> Option<(Vec<Fix>, bool)> {
        let fix = fix?;

        self.last_fix = Some(now);
        self.window.fixes.push(fix);

        if self.window.fixes.len() < self.window.capacity {
            return None;
        }

        let moved = self.window.has_moved(self.config.movement_radius_m);
        trace!("evaluated window of {} fixes, moved: {moved}", self.window.capacity);

        Some((self.window.take(), moved))
    }

    fn stale_at(&self) -> Option<Instant> {
        self.last_fix?.checked_add(self.config.stale_after)
    }

    fn is_stale(&self, now: Instant) -> bool {
        self.last_fix
            .is_some_and(|t| now.saturating_duration_since(t) > self.config.stale_after)
    }
}

/// Either trip state.
pub type State = Either<Idle, InTrip>;

/// State token while no trip is open.
#[derive(Debug, Clone)]
pub struct Idle(Context);

impl Idle {
    /// Begin tracking for a device.
    pub fn new(device: impl Into<String>, config: Config) -> Self {
        Self(Context {
            window: Window::new(config.window_capacity),
            device: device.into(),
            last_fix: None,
            config,
        })
    }

    /// Transition to another state by processing one line.
    ///
    /// Supply the parsed fix, or `None` if the line was rejected. Returns the
    /// emitted events and the successor state token.
    pub fn advance(self, now: Instant, fix: Option<Fix>) -> (Vec<Event>, State) {
        let Self(mut cx) = self;

        let Some((fixes, true)) = cx.accept(now, fix) else {
            return (Vec::new(), Left(Self(cx)));
        };

        let id = TripId::new(&cx.device, fixes[0].timestamp);

        let trip = Trip {
            id: id.clone(),
            user_id: cx.device.clone(),
            start: fixes[0].timestamp,
            waypoints: fixes.clone(),
        };

        let events = vec![
            Event::Started(id.clone()),
            Event::Appended {
                trip: id,
                waypoints: fixes,
            },
        ];

        (events, Right(InTrip { cx, trip }))
    }

    /// Fixes buffered since the last window evaluation.
    pub fn buffered(&self) -> &[Fix] {
        &self.0.window.fixes
    }
}

/// State token while a trip is open.
#[derive(Debug, Clone)]
pub struct InTrip {
    cx: Context,
    trip: Trip,
}

impl InTrip {
    /// Transition to another state by processing one line.
    ///
    /// Supply the parsed fix, or `None` if the line was rejected. A full window
    /// without movement closes the trip, as does a stale receiver. Returns the
    /// emitted events and the successor state token.
    pub fn advance(self, now: Instant, fix: Option<Fix>) -> (Vec<Event>, State) {
        let Self { mut cx, mut trip } = self;
        let mut events = Vec::new();

        match cx.accept(now, fix) {
            Some((fixes, true)) => {
                trip.waypoints.extend_from_slice(&fixes);
                events.push(Event::Appended {
                    trip: trip.id.clone(),
                    waypoints: fixes,
                });
            }
            Some((fixes, false)) => {
                let idle = finish(cx, trip, fixes, &mut events);
                return (events, Left(idle));
            }
            None => {}
        }

        if cx.is_stale(now) {
            let fixes = cx.window.take();
            let idle = finish(cx, trip, fixes, &mut events);
            return (events, Left(idle));
        }

        (events, Right(Self { cx, trip }))
    }

    /// Close the trip now, flushing any buffered fixes into it.
    pub fn close(self) -> (Vec<Event>, Idle) {
        let Self { mut cx, trip } = self;
        let mut events = Vec::new();

        let fixes = cx.window.take();
        let idle = finish(cx, trip, fixes, &mut events);

        (events, idle)
    }

    /// The instant the trip goes stale unless another fix arrives.
    ///
    /// The trip is closed by the first line or tick strictly after it.
    pub fn stale_at(&self) -> Option<Instant> {
        self.cx.stale_at()
    }

    /// The open trip.
    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    /// Fixes buffered since the last window evaluation.
    pub fn buffered(&self) -> &[Fix] {
        &self.cx.window.fixes
    }
}

fn finish(cx: Context, mut trip: Trip, fixes: Vec<Fix>, events: &mut Vec<Event>) -> Idle {
    if !fixes.is_empty() {
        trip.waypoints.extend_from_slice(&fixes);
        events.push(Event::Appended {
            trip: trip.id.clone(),
            waypoints: fixes,
        });
    }

    events.push(Event::Finished(trip));
    Idle(cx)
}

/// Advance whichever state token is current.
pub fn advance(state: State, now: Instant, fix: Option<Fix>) -> (Vec<Event>, State) {
    match state {
        Left(idle) => idle.advance(now, fix),
        Right(in_trip) => in_trip.advance(now, fix),
    }
}

/// Close any open trip.
pub fn close(state: State) -> (Vec<Event>, Idle) {
    match state {
        Left(idle) => (Vec::new(), idle),
        Right(in_trip) => in_trip.close(),
    }
}
