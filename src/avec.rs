//! Convenience drivers for common tracking setups.
//!
//! The [`Tracker`] owns a line framer and the trip states, and publishes every
//! trip transition to a [`TripReceiver`]. The functions in [`reader`] and
//! [`stream`] drive a tracker from a blocking or an async byte source until it
//! ends.

pub mod reader;
pub mod record;
#[cfg(feature = "tokio")]
pub mod stream;

use std::{io, time::Instant};

use either::Either::{Left, Right};
use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::{
    config::{Config, ConfigError},
    sans::{
        fix::{Fix, ParseError, parse, parse_checked},
        framer::LineFramer,
        trip::{self, Event, Idle, State, Trip, TripId},
    },
};

pub use reader::track as track_reader;
#[cfg(feature = "tokio")]
pub use stream::track as track_stream;

/// Errors occurring while tracking.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the byte source or a receiver.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The supplied configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Receive trip transitions.
///
/// Methods are called in the order the transitions happen, after the tracker
/// has already moved to its next state. A failure does not stop the remaining
/// transitions from being delivered; the first failure is then returned to the
/// caller of the tracker and is not retried.
///
/// The default implementation of each method ignores the transition.
#[allow(unused_variables)]
pub trait TripReceiver {
    /// A trip opened.
    fn start_trip(&mut self, id: &TripId) -> io::Result<()> {
        Ok(())
    }
    /// Waypoints were appended to an open trip.
    fn add_waypoints(&mut self, id: &TripId, waypoints: &[Fix]) -> io::Result<()> {
        Ok(())
    }
    /// A trip closed. This is called exactly once per trip.
    fn finish_trip(&mut self, trip: Trip) -> io::Result<()> {
        Ok(())
    }
}

/// Frames, parses and tracks a receiver's byte stream.
#[derive(Debug)]
pub struct Tracker {
    config: Config,
    framer: LineFramer,
    state: State,
}

impl Tracker {
    /// Create a tracker for a device, validating its configuration.
    pub fn new(device: impl Into<String>, config: Config) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            framer: LineFramer::new(),
            state: Left(Idle::new(device, config)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The open trip, if any.
    pub fn trip(&self) -> Option<&Trip> {
        match &self.state {
            Right(in_trip) => Some(in_trip.trip()),
            _ => None,
        }
    }

    /// The instant an open trip goes stale unless another fix arrives.
    pub fn stale_at(&self) -> Option<Instant> {
        match &self.state {
            Right(in_trip) => in_trip.stale_at(),
            Left(_) => None,
        }
    }

    /// Append a chunk of the stream and process every line it completes.
    ///
    /// All lines completed by the chunk are stamped with the same arrival time.
    pub fn feed(
        &mut self,
        chunk: impl AsRef<[u8]>,
        now: Instant,
        o: &mut impl TripReceiver,
    ) -> Result<(), Error> {
        self.framer.feed(chunk);

        while let Some(line) = self.framer.next_line() {
            self.process(&line, now, o)?;
        }

        Ok(())
    }

    /// Process one complete line.
    pub fn process(
        &mut self,
        line: &str,
        now: Instant,
        o: &mut impl TripReceiver,
    ) -> Result<(), Error> {
        let result = if self.config.verify_checksum {
            parse_checked(line)
        } else {
            parse(line)
        };

        let fix = match result {
            Ok(fix) => Some(fix),
            Err(err @ (ParseError::NotSentence | ParseError::UnsupportedSentence)) => {
                trace!("skipped line {:?}: {err}", line.trim_end());
                None
            }
            Err(err) => {
                debug!("rejected sentence {:?}: {err}", line.trim_end());
                None
            }
        };

        self.step(now, fix, o)
    }

    /// Check for a stale receiver without a new line.
    pub fn tick(&mut self, now: Instant, o: &mut impl TripReceiver) -> Result<(), Error> {
        self.step(now, None, o)
    }

    /// Close any open trip, flushing its buffered fixes.
    ///
    /// An unterminated line still held by the framer is kept.
    pub fn close(&mut self, o: &mut impl TripReceiver) -> Result<(), Error> {
        let events = self.transition(|state| {
            let (events, idle) = trip::close(state);
            (events, Left(idle))
        });

        if self.framer.pending() != 0 {
            debug!("closing with {} bytes of a partial line", self.framer.pending());
        }

        publish(events, o)
    }

    fn step(
        &mut self,
        now: Instant,
        fix: Option<Fix>,
        o: &mut impl TripReceiver,
    ) -> Result<(), Error> {
        let events = self.transition(|state| trip::advance(state, now, fix));
        publish(events, o)
    }

    /// Replace the state with its successor.
    fn transition(&mut self, f: impl FnOnce(State) -> (Vec<Event>, State)) -> Vec<Event> {
        // Holds no fixes and allocates nothing.
        let vacant = Left(Idle::new(String::new(), self.config));

        let (events, state) = f(std::mem::replace(&mut self.state, vacant));
        self.state = state;

        events
    }
}

/// Hand every event to a receiver in order, returning the first failure.
fn publish(events: Vec<Event>, o: &mut impl TripReceiver) -> Result<(), Error> {
    let mut failure = None;

    for event in events {
        let result = match event {
            Event::Started(id) => {
                info!("trip {id} started");
                o.start_trip(&id)
            }
            Event::Appended { trip, waypoints } => o.add_waypoints(&trip, &waypoints),
            Event::Finished(trip) => {
                info!(
                    "trip {} finished with {} waypoints",
                    trip.id,
                    trip.waypoints.len()
                );
                o.finish_trip(trip)
            }
        };

        if let Err(err) = result {
            warn!("trip receiver failed: {err}");
            failure.get_or_insert(err);
        }
    }

    match failure {
        Some(err) => Err(Error::Io(err)),
        None => Ok(()),
    }
}
