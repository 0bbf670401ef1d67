//! Fixed-arity tokenization of protocol sentences.

use thiserror::Error;
use tinyvec::ArrayVec;

use super::check::{compute_checksum, decode_checksum};

/// Largest number of fields held after the tag.
pub const MAX_FIELDS: usize = 24;

/// An error tokenizing or decoding a sentence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SentenceError {
    /// The line does not begin with `$`.
    #[error("Line does not begin a sentence.")]
    NotSentence,
    /// The sentence tag differs from the one requested.
    #[error("Unexpected sentence tag.")]
    UnexpectedTag,
    /// Wrong number of fields after the tag.
    #[error("Found {found} sentence fields, expected {expected}.")]
    FieldCount { found: usize, expected: usize },
    /// No `*` delimited checksum is present.
    #[error("Sentence has no checksum.")]
    MissingChecksum,
    /// The checksum is not two hexadecimal digits.
    #[error("Malformed sentence checksum.")]
    MalformedChecksum,
    /// Calculated and found checksums do not match.
    #[error("Calculated ({calculated:02X}) and found ({found:02X}) checksums do not match.")]
    Checksum { found: u8, calculated: u8 },
}

/// Decode a sentence from its fields.
///
/// See the [`FromSentence`](macro@FromSentence) derive macro for an automatic
/// implementation of this trait.
pub trait FromSentence<'a>: Sized {
    /// Tag naming the sentence, without the leading `$`.
    const TAG: &'static str;
    /// Number of comma-separated fields following the tag.
    const FIELDS: usize;

    /// Build the sentence from exactly [`Self::FIELDS`] fields.
    fn from_fields(fields: &[&'a str]) -> Self;
}

/// Derive [`FromSentence`] for a struct borrowing the fields of a sentence.
///
/// Name the tag and field count with the `sentence` attribute, and bind struct
/// members to field positions (counting from 1 after the tag) with `field`.
/// Members without an attribute are filled with their default value.
///
/// ```
/// #[derive(Debug, Default, FromSentence)]
/// #[sentence(tag = "GPVTG", fields = 9)]
/// struct Vtg<'a> {
///     #[field(1)]
///     track_true: &'a str,
///     #[field(7)]
///     speed_kmh: &'a str,
/// }
/// ```
///
/// Rather than converting fields while decoding, store the borrowed text and
/// convert it afterward in an accessor.
pub use odometer_derive::FromSentence;

/// A tokenized sentence, borrowing from its line.
#[derive(Debug, Clone)]
pub struct Sentence<'a> {
    body: &'a str,
    tag: &'a str,
    fields: ArrayVec<[&'a str; MAX_FIELDS]>,
    count: usize,
    checksum: Option<&'a str>,
}

impl<'a> Sentence<'a> {
    /// The tag, without the leading `$`.
    pub fn tag(&self) -> &'a str {
        self.tag
    }

    /// Number of fields following the tag.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Field at a position counted from 1 after the tag.
    pub fn field(&self, position: usize) -> Option<&'a str> {
        self.fields.get(position.checked_sub(1)?).copied()
    }

    /// Compare the transmitted checksum against the sentence body.
    pub fn verify(&self) -> Result<(), SentenceError> {
        let Some(found) = self.checksum else {
            Err(SentenceError::MissingChecksum)?
        };

        let found = decode_checksum(found).ok_or(SentenceError::MalformedChecksum)?;
        let calculated = compute_checksum(0, self.body.as_bytes());

        if found != calculated {
            Err(SentenceError::Checksum { found, calculated })?;
        }

        Ok(())
    }

    /// Decode the fields into a sentence type, checking its tag and arity.
    pub fn decode<T: FromSentence<'a>>(&self) -> Result<T, SentenceError> {
        if self.tag != T::TAG {
            Err(SentenceError::UnexpectedTag)?;
        }

        if self.count != T::FIELDS || T::FIELDS > MAX_FIELDS {
            Err(SentenceError::FieldCount {
                found: self.count,
                expected: T::FIELDS,
            })?;
        }

        Ok(T::from_fields(self.fields.as_slice()))
    }
}

/// Split a line into its tag, fields and checksum.
///
/// Trailing line terminators are ignored. A `*hh` suffix is split off as the
/// checksum before the remaining body is split on commas, so a checksum may
/// either follow the last field directly or stand in a field of its own.
pub fn tokenize(line: &str) -> Result<Sentence<'_>, SentenceError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(rest) = line.strip_prefix('$') else {
        Err(SentenceError::NotSentence)?
    };

    let (body, checksum) = match rest.rsplit_once('*') {
        Some((body, checksum)) => (body, Some(checksum)),
        None => (rest, None),
    };

    let mut parts = body.split(',');
    let tag = parts.next().unwrap_or_default();

    let mut fields = ArrayVec::new();
    let mut count = 0;

    for part in parts {
        // Excess fields are counted but not held; decoding rejects them.
        let _ = fields.try_push(part);
        count += 1;
    }

    Ok(Sentence {
        body,
        tag,
        fields,
        count,
        checksum,
    })
}
