use odometer::sans::framer::LineFramer;

const STREAM: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,*6A\r\n\
$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n\
\n\
$GPRMC,123520,A,4807.039,N,01131.001,E,022.4,084.4,230394,003.1,W,*6A\r\n\
$GPGSA,A,3,04,05,,";

fn drain(framer: &mut LineFramer) -> Vec<String> {
    framer.by_ref().collect()
}

#[test]
fn single_chunk() {
    let mut framer = LineFramer::new();
    framer.feed(STREAM);

    let lines = drain(&mut framer);
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.ends_with('\n')));
    assert_eq!(lines[2], "\n");
    assert_eq!(framer.pending(), "$GPGSA,A,3,04,05,,".len());
}

#[test]
fn split_at_every_offset() {
    let mut whole = LineFramer::new();
    whole.feed(STREAM);
    let expected = drain(&mut whole);

    for i in 0..=STREAM.len() {
        let mut framer = LineFramer::new();
        framer.feed(&STREAM[..i]);
        let mut lines = drain(&mut framer);
        framer.feed(&STREAM[i..]);
        lines.extend(drain(&mut framer));

        assert_eq!(lines, expected, "split at {i}");
    }
}

#[test]
fn byte_by_byte() {
    let mut whole = LineFramer::new();
    whole.feed(STREAM);
    let expected = drain(&mut whole);

    let mut framer = LineFramer::new();
    let mut lines = vec![];

    for b in STREAM.as_bytes() {
        framer.feed([*b]);
        lines.extend(drain(&mut framer));
    }

    assert_eq!(lines, expected);
}

#[test]
fn partial_line_held_back() {
    let mut framer = LineFramer::new();

    framer.feed("$GPRMC,1235");
    assert!(!framer.has_next());
    assert_eq!(framer.next_line(), None);

    framer.feed("19,A");
    framer.feed("");
    assert!(!framer.has_next());

    framer.feed(",4807.038\n$GP");
    assert!(framer.has_next());
    assert_eq!(framer.next_line().as_deref(), Some("$GPRMC,123519,A,4807.038\n"));
    assert!(!framer.has_next());
    assert_eq!(framer.pending(), 3);
}

#[test]
fn empty_chunks_are_ignored() {
    let mut framer = LineFramer::new();
    framer.feed("");
    framer.feed(b"");
    assert!(!framer.has_next());
    assert_eq!(framer.pending(), 0);
}

#[test]
fn multibyte_character_across_chunks() {
    let text = "caf\u{e9}\n".as_bytes();
    let mut framer = LineFramer::new();

    framer.feed(&text[..4]);
    framer.feed(&text[4..]);

    assert_eq!(framer.next_line().as_deref(), Some("caf\u{e9}\n"));
}
