//! Reader-based driver.

use std::{
    io::{ErrorKind, Read},
    time::Instant,
};

use log::debug;

use super::{Error, Tracker, TripReceiver};

/// Track a reader of a receiver's byte stream until it ends, publishing to a
/// receiver.
///
/// Reads are sized by the tracker's configured buffer. Any trip still open at
/// the end of the stream is closed.
///
/// This method is also re-exported as `odometer::avec::track_reader`.
pub fn track(
    r: &mut impl Read,
    t: &mut Tracker,
    o: &mut impl TripReceiver,
) -> Result<(), Error> {
    let mut buf = vec![0; t.config().read_buffer_size];

    loop {
        let n = match r.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => Err(err)?,
        };

        t.feed(&buf[..n], Instant::now(), o)?;
    }

    debug!("end of stream");
    t.close(o)
}
