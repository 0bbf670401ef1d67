//! Incremental NMEA decoding and trip detection for GPS receiver streams.
//!
//! Odometer turns an unbounded, arbitrarily chunked byte stream from a GPS
//! receiver into discrete trips: periods in which the receiver actually moved.
//! Complete sentences are framed out of the stream, `GPRMC` sentences are
//! parsed into position fixes, and fixes are evaluated in fixed-size windows
//! against a movement radius to open, extend and close trips.
//!
//! Most users should begin with the [`avec`] module, which drives the whole
//! pipeline from a reader (or an async reader) and publishes trips to a
//! [`avec::TripReceiver`]. The I/O-free state machines underneath are exposed
//! in the [`sans`] module for applications that schedule their own input.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `tokio`: enable the async stream driver (default).

extern crate self as odometer;

pub mod avec;
pub mod config;
pub mod sans;

pub use config::Config;
