//! Match finding and back-reference replay shared by Yaz0 and Yay0.
//!
//! Both formats describe the same token stream, a sequence of literal bytes
//! and `(distance, length)` back-references into the last 4096 bytes of
//! output. They only differ in where the control bits, reference pairs and
//! extra bytes are stored, so the token production lives here.

use crate::error::{Error, Result};

/// Furthest a back-reference may reach behind the current position
pub const WINDOW_SIZE: usize = 0x1000;

/// Shortest match worth encoding; two bytes cost as much as two literals
pub const MIN_MATCH: usize = 3;

/// Lengths up to this value fit in the reference nibble
pub const MAX_SHORT_MATCH: usize = 0x11;

/// Longest match a single reference can describe (`0xFF + 0x12`)
pub const MAX_MATCH: usize = 0xFF + 0x12;

/// A single decision of the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Copy one byte from the input
    Literal(u8),

    /// Copy `length` bytes starting `distance` bytes behind the output cursor
    Reference {
        /// Distance back into the output, `1..=WINDOW_SIZE`
        distance: usize,
        /// Number of bytes to copy, `MIN_MATCH..=MAX_MATCH`
        length: usize,
    },
}

impl Token {
    /// Number of decoded bytes this token produces
    pub fn decoded_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Reference { length, .. } => *length,
        }
    }

    /// Reference pair as stored in the stream: `(length - 2) << 12 | (distance - 1)`,
    /// with a zero length nibble and an extra byte for long matches.
    pub(crate) fn reference_bytes(distance: usize, length: usize) -> (u16, Option<u8>) {
        let distance = ((distance - 1) & 0x0FFF) as u16;
        if length > MAX_SHORT_MATCH {
            (distance, Some((length - (MAX_SHORT_MATCH + 1)) as u8))
        } else {
            ((((length - 2) as u16) << 12) | distance, None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    source: usize,
    length: usize,
}

/// Longest match for `position` inside the trailing window.
///
/// Candidates are scanned from the farthest to the nearest and only a
/// strictly longer run replaces the current best, so ties resolve to the
/// most distant source. Runs are bounded by the end of the input only, not
/// by [`MAX_MATCH`]; the cap is applied once the reference is emitted. Runs
/// of two bytes are reported as no match.
fn longest_match(data: &[u8], position: usize) -> Option<Candidate> {
    let limit = data.len().saturating_sub(position);
    let start = position.saturating_sub(WINDOW_SIZE);

    let mut best: Option<Candidate> = None;
    let mut best_length = 1;
    for source in start..position {
        let length = data[source..]
            .iter()
            .zip(&data[position..position + limit])
            .take_while(|(a, b)| a == b)
            .count();

        if length > best_length {
            best_length = length;
            best = Some(Candidate { source, length });
            if length == limit {
                break;
            }
        }
    }

    best.filter(|c| c.length >= MIN_MATCH)
}

/// Iterator turning an input buffer into [`Token`]s.
///
/// Carries the one-step lookahead of the reference encoder: when the match
/// starting one byte later is at least two bytes longer than the current
/// one, the current byte is emitted as a literal and the later match is kept
/// for the next step instead of being searched again. The state belongs to a
/// single encode call.
#[derive(Debug)]
pub struct Tokens<'a> {
    data: &'a [u8],
    position: usize,
    pending: Option<Candidate>,
}

impl<'a> Tokens<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            pending: None,
        }
    }

    fn next_match(&mut self) -> Option<Candidate> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        let current = longest_match(self.data, self.position)?;
        let next = longest_match(self.data, self.position + 1);
        match next {
            Some(next) if next.length >= current.length + 2 => {
                self.pending = Some(next);
                None
            }
            _ => Some(current),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.data.len() {
            return None;
        }

        let token = match self.next_match() {
            Some(candidate) => Token::Reference {
                distance: self.position - candidate.source,
                length: candidate.length.min(MAX_MATCH),
            },
            None => Token::Literal(self.data[self.position]),
        };
        self.position += token.decoded_len();

        Some(token)
    }
}

/// Largest output accepted for an input of `input_len` bytes
pub(crate) fn size_limit(input_len: usize) -> u64 {
    (input_len.max(16) as u64).saturating_mul(1000)
}

/// Reject a header-declared output size before anything is allocated for it
pub(crate) fn check_declared_size(declared: u32, input_len: usize) -> Result<usize> {
    let limit = size_limit(input_len);
    if declared as u64 > limit {
        return Err(Error::DecodedSizeTooLarge {
            declared: declared as u64,
            limit,
        });
    }
    Ok(declared as usize)
}

/// Split a stored reference pair into `(distance, length)`.
///
/// A zero length nibble means the length lives in an extra byte, which is
/// fetched through `extra`.
pub(crate) fn decode_reference(
    pair: u16,
    extra: impl FnOnce() -> Result<u8>,
) -> Result<(usize, usize)> {
    let distance = (pair & 0x0FFF) as usize + 1;
    let length = match pair >> 12 {
        0 => extra()? as usize + MAX_SHORT_MATCH + 1,
        nibble => nibble as usize + 2,
    };
    Ok((distance, length))
}

/// Replay a back-reference onto `output`.
///
/// The source range may overlap the bytes being written, which is how runs
/// are expressed, so the copy goes byte by byte.
pub(crate) fn copy_back_reference(
    output: &mut Vec<u8>,
    distance: usize,
    length: usize,
    size: usize,
) -> Result<()> {
    let position = output.len();
    if distance > position {
        return Err(Error::InvalidBackReference { distance, position });
    }
    if position + length > size {
        return Err(Error::OutputOverrun {
            length,
            position,
            size,
        });
    }

    let start = position - distance;
    for i in 0..length {
        let byte = output[start + i];
        output.push(byte);
    }

    Ok(())
}
