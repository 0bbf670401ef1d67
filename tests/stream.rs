#![cfg(feature = "tokio")]

mod common;

use std::{io, time::Duration};

use odometer::{
    Config,
    avec::{Tracker, TripReceiver, track_stream},
    sans::trip::Trip,
};
use tokio::{io::AsyncWriteExt, time::Instant};

use common::{DEVICE, Log, METRE, at, rmc};

#[tokio::test(start_paused = true)]
async fn silent_line_closes_trip() {
    let (mut rx, mut tx) = tokio::io::duplex(4096);
    let mut tracker = Tracker::new(DEVICE, Config::default()).unwrap();
    let mut log = Log::default();

    let write = async move {
        for i in 0..25 {
            let lat = 52.52 + i as f64 * 10.0 * METRE;
            tx.write_all(rmc(at(9, 0, i), lat, 13.405, 19.4).as_bytes())
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        tokio::time::sleep(Duration::from_secs(300)).await;
        drop(tx);
    };

    let (result, ()) = tokio::join!(track_stream(&mut rx, &mut tracker, &mut log), write);
    result.unwrap();

    assert_eq!(log.started.len(), 1);
    assert_eq!(log.finished.len(), 1);
    assert_eq!(log.finished[0].waypoints.len(), 25);
    assert_eq!(log.finished[0].start, at(9, 0, 0));
}

#[tokio::test(start_paused = true)]
async fn stale_trip_finishes_before_end_of_stream() {
    let (mut rx, mut tx) = tokio::io::duplex(4096);
    let config = Config::default().with_stale_after(Duration::from_secs(30));
    let mut tracker = Tracker::new(DEVICE, config).unwrap();
    let mut log = Log::default();

    let track = async {
        track_stream(&mut rx, &mut tracker, &mut log).await.unwrap();
        log
    };

    let write = async move {
        for i in 0..20 {
            let lat = 52.52 + i as f64 * 10.0 * METRE;
            tx.write_all(rmc(at(9, 0, i), lat, 13.405, 19.4).as_bytes())
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_secs(100)).await;

        // A fresh trip after the first one timed out.
        for i in 0..20 {
            let lat = 52.6 + i as f64 * 10.0 * METRE;
            tx.write_all(rmc(at(9, 5, i), lat, 13.405, 19.4).as_bytes())
                .await
                .unwrap();
        }
    };

    let (log, ()) = tokio::join!(track, write);

    assert_eq!(log.started.len(), 2);
    assert_eq!(log.finished.len(), 2);
    assert_eq!(log.finished[0].start, at(9, 0, 0));
    assert_eq!(log.finished[1].start, at(9, 5, 0));
}

/// Records when each trip finished.
struct Timed {
    start: Instant,
    finished: Vec<(Duration, usize)>,
}

impl TripReceiver for Timed {
    fn finish_trip(&mut self, trip: Trip) -> io::Result<()> {
        self.finished.push((self.start.elapsed(), trip.waypoints.len()));
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn stale_trip_finishes_on_time() {
    let (mut rx, mut tx) = tokio::io::duplex(4096);
    let mut tracker = Tracker::new(DEVICE, Config::default()).unwrap();
    let mut timed = Timed {
        start: Instant::now(),
        finished: vec![],
    };

    let write = async move {
        for i in 0..20 {
            let lat = 52.52 + i as f64 * 10.0 * METRE;
            tx.write_all(rmc(at(9, 0, i), lat, 13.405, 19.4).as_bytes())
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_secs(600)).await;
        drop(tx);
    };

    let (result, ()) = tokio::join!(track_stream(&mut rx, &mut tracker, &mut timed), write);
    result.unwrap();

    assert_eq!(timed.finished.len(), 1);

    let (elapsed, waypoints) = timed.finished[0];
    assert_eq!(waypoints, 20);
    assert!(elapsed > Duration::from_secs(120), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(121), "{elapsed:?}");
}
