//! Mixed alphanumeric repair: five mutually distinct digits plus exactly
//! one letter. Letter `a + i` stands for slot index `i`, so the one
//! letter in the final code implicitly names the digit that is missing.
//!
//! The position visit order and the digit preference list are deliberate,
//! tested tie-break policy carried over from the deployed rig. Do not
//! "simplify" them.

use super::{CanonicalCode, RawSymbol, RawTuple};

/// Position visit order for letter reduction and digit dedup.
pub const SLOT_PRIORITY: [usize; 6] = [1, 5, 0, 2, 3, 4];

/// Replacement digits are tried in this exact order.
pub const DIGIT_PREFERENCE: [u8; 6] = [b'6', b'4', b'5', b'1', b'2', b'3'];

/// Letter forced into the code when the raw tuple held no letters at all,
/// and the position it lands on when the digits were already distinct.
const FORCED_LETTER: u8 = b'b';
const FORCED_POSITION: usize = 1;

pub(crate) fn canonicalize(raw: &RawTuple) -> CanonicalCode {
    // Seed: empty slots and out-of-alphabet symbols become the slot's own
    // letter, which gives the reduction below a resolvable value.
    let mut chars = [0u8; 6];
    for (i, sym) in raw.0.iter().enumerate() {
        chars[i] = match sym {
            RawSymbol::Class(name) => in_alphabet(name).unwrap_or(slot_letter(i)),
            RawSymbol::Empty => slot_letter(i),
        };
    }

    let mut letters = chars.iter().filter(|c| c.is_ascii_lowercase()).count();

    // Reduce surplus letters toward exactly one.
    if letters > 1 {
        for &idx in SLOT_PRIORITY.iter() {
            if letters <= 1 {
                break;
            }
            if chars[idx].is_ascii_digit() {
                continue;
            }
            match unused_digit(&chars) {
                Some(d) => {
                    chars[idx] = d;
                    letters -= 1;
                }
                None => break,
            }
        }
    }

    if letters == 1 {
        dedup_digits(&mut chars);
    } else if letters == 0 {
        // Input was six digits. Force exactly one letter so the output
        // contract holds: overwrite the fixed position when the digits
        // are already distinct, otherwise the first duplicate found in
        // priority order.
        if distinct(&chars) {
            chars[FORCED_POSITION] = FORCED_LETTER;
        } else {
            for &idx in SLOT_PRIORITY.iter() {
                if count_of(&chars, chars[idx]) > 1 {
                    chars[idx] = FORCED_LETTER;
                    break;
                }
            }
            dedup_digits(&mut chars);
        }
    }

    CanonicalCode::from_bytes(chars)
}

/// Replace duplicated digits until all digit positions are distinct.
/// Positions are visited in priority order; every replacement restarts
/// the scan from the head of the order.
fn dedup_digits(chars: &mut [u8; 6]) {
    loop {
        let mut replaced = false;
        for &idx in SLOT_PRIORITY.iter() {
            if chars[idx].is_ascii_lowercase() {
                continue;
            }
            if count_of(chars, chars[idx]) > 1 {
                if let Some(d) = unused_digit(chars) {
                    chars[idx] = d;
                    replaced = true;
                    break;
                }
            }
        }
        if !replaced {
            break;
        }
    }
}

fn slot_letter(i: usize) -> u8 {
    b'a' + i as u8
}

fn in_alphabet(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [c @ b'1'..=b'6'] | [c @ b'a'..=b'f'] => Some(*c),
        _ => None,
    }
}

fn unused_digit(chars: &[u8; 6]) -> Option<u8> {
    DIGIT_PREFERENCE.iter().copied().find(|d| !chars.contains(d))
}

fn count_of(chars: &[u8; 6], c: u8) -> usize {
    chars.iter().filter(|&&x| x == c).count()
}

fn distinct(chars: &[u8; 6]) -> bool {
    for (i, c) in chars.iter().enumerate() {
        if chars[i + 1..].contains(c) {
            return false;
        }
    }
    true
}
