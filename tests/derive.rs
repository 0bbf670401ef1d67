use odometer::sans::sentence::{FromSentence, SentenceError, tokenize};

#[derive(Debug, Default, PartialEq, FromSentence)]
#[sentence(tag = "GPVTG", fields = 9)]
struct Vtg<'a> {
    #[field(1)]
    track_true: &'a str,
    #[field(7)]
    speed_kmh: &'a str,
    #[field(9)]
    mode: &'a str,
}

#[derive(Debug, Default, PartialEq, FromSentence)]
#[sentence(tag = "PGRMZ", fields = 3)]
struct Altitude {
    #[field(1)]
    feet: String,
    #[field(2)]
    unit: String,
    seen: bool,
}

#[test]
fn borrowed_fields() {
    let sentence = tokenize("$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K,A*25\r\n").unwrap();
    let vtg: Vtg = sentence.decode().unwrap();

    assert_eq!(
        vtg,
        Vtg {
            track_true: "054.7",
            speed_kmh: "010.2",
            mode: "A",
        }
    );

    assert_eq!(<Vtg<'_> as FromSentence<'_>>::TAG, "GPVTG");
    assert_eq!(<Vtg<'_> as FromSentence<'_>>::FIELDS, 9);
}

#[test]
fn owned_fields() {
    let altitude: Altitude = tokenize("$PGRMZ,2282,f,3*21").unwrap().decode().unwrap();

    assert_eq!(
        altitude,
        Altitude {
            feet: "2282".to_string(),
            unit: "f".to_string(),
            seen: false,
        }
    );
}

#[test]
fn tag_and_arity_checked() {
    let sentence = tokenize("$PGRMZ,2282,f,3,extra*21").unwrap();

    assert_eq!(
        sentence.decode::<Altitude>(),
        Err(SentenceError::FieldCount {
            found: 4,
            expected: 3
        })
    );
    assert_eq!(sentence.decode::<Vtg>(), Err(SentenceError::UnexpectedTag));
}

#[test]
fn sentence_accessors() {
    let sentence = tokenize("$PGRMZ,2282,f,3").unwrap();

    assert_eq!(sentence.tag(), "PGRMZ");
    assert_eq!(sentence.len(), 3);
    assert_eq!(sentence.field(0), None);
    assert_eq!(sentence.field(2), Some("f"));
    assert_eq!(sentence.field(4), None);
    assert_eq!(sentence.verify(), Err(SentenceError::MissingChecksum));

    assert_eq!(tokenize("PGRMZ,1").unwrap_err(), SentenceError::NotSentence);
}
