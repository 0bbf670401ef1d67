//! Async stream driver.
//!
//! _Requires Cargo feature `tokio`._

use std::{io::ErrorKind, time::Duration};

use log::debug;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::{Instant, timeout_at},
};

use super::{Error, Tracker, TripReceiver};

/// Delay past the stale instant before ticking, so the tick lands strictly
/// after it.
const TICK_DELAY: Duration = Duration::from_millis(1);

/// Track an async reader of a receiver's byte stream until it ends, publishing
/// to a receiver.
///
/// While a trip is open and no chunk arrives, the tracker is ticked just after
/// the trip goes stale, so it still closes on a silent line. Any trip still
/// open at the end of the stream is closed.
///
/// Dropping the returned future between chunks abandons the stream; call
/// [`Tracker::close`] afterward to finish an open trip.
///
/// This method is also re-exported as `odometer::avec::track_stream`.
///
/// _Requires Cargo feature `tokio`._
pub async fn track(
    r: &mut (impl AsyncRead + Unpin),
    t: &mut Tracker,
    o: &mut impl TripReceiver,
) -> Result<(), Error> {
    let mut buf = vec![0; t.config().read_buffer_size];

    loop {
        let read = r.read(&mut buf);

        let result = match t.stale_at() {
            Some(at) => timeout_at(Instant::from_std(at) + TICK_DELAY, read).await,
            None => Ok(read.await),
        };

        let n = match result {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
            Ok(Err(err)) if err.kind() == ErrorKind::Interrupted => continue,
            Ok(Err(err)) => Err(err)?,
            Err(_) => {
                debug!("no data before the open trip went stale");
                t.tick(Instant::now().into_std(), o)?;
                continue;
            }
        };

        t.feed(&buf[..n], Instant::now().into_std(), o)?;
    }

    debug!("end of stream");
    t.close(o)
}
