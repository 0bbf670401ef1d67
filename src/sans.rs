//! I/O-free building blocks for the tracking pipeline.
//!
//! Each stage is a pure function or a finite-state machine that never reads,
//! writes, sleeps or consults a clock. Callers feed input and the current time
//! explicitly, which keeps every transition reproducible in tests.
//!
//! # Architecture
//!
//! Data flows strictly downstream:
//!
//! 1. [`framer::LineFramer`] reassembles newline-terminated lines from
//! arbitrarily aligned chunks.
//!
//! 2. [`fix::parse`] tokenizes a line with [`sentence::tokenize`] and converts
//! a `GPRMC` sentence into a [`fix::Fix`], or rejects it.
//!
//! 3. The trip states in [`trip`] buffer fixes into windows, test each full
//! window for movement with [`geo::haversine`], and emit [`trip::Event`]s.
//!
//! The trip states are represented by non-copy tokens, [`trip::Idle`] and
//! [`trip::InTrip`]. Calling a token's `advance` method consumes it and returns
//! the emitted events along with a successor token. Only [`trip::Idle`] can be
//! constructed directly; re-exported for convenience as [`Tracking`].
//!
//! Some concerns are left to the caller:
//!
//! - Supplying a monotonic timestamp with every processed line, so the trip
//! states can detect a stale receiver.
//!
//! - Persisting appended waypoints and uploading finished trips. See
//! [`crate::avec::TripReceiver`] for a ready-made boundary.

pub mod check;
pub mod fix;
pub mod framer;
pub mod geo;
pub mod sentence;
pub mod trip;

/// Entrypoint to the trip finite-state machine.
pub type Tracking = trip::Idle;
