//! Digit-bijection repair: the canonical code is a permutation of 1-6.
//!
//! Non-digit symbols and empty slots are both treated as empty. A first
//! left-to-right pass replaces already-claimed duplicate digits with
//! digits taken from the missing set; a second pass fills the remaining
//! empty slots. Missing digits are consumed in ascending order.

use super::{CanonicalCode, RawSymbol, RawTuple};

pub(crate) fn canonicalize(raw: &RawTuple) -> CanonicalCode {
    // Seed the working array: digits pass through, everything else is empty.
    let mut slots: [Option<u8>; 6] = [None; 6];
    for (i, sym) in raw.0.iter().enumerate() {
        if let RawSymbol::Class(name) = sym {
            slots[i] = single_digit(name);
        }
    }

    let mut missing: Vec<u8> = (b'1'..=b'6').filter(|d| !slots.contains(&Some(*d))).collect();

    // Pass 1: later duplicates claim a digit from the missing set. The
    // missing set always covers every duplicate, since each duplicate
    // occurrence leaves one digit of the alphabet unclaimed.
    let mut seen = [false; 6];
    for slot in slots.iter_mut() {
        if let Some(d) = *slot {
            let idx = (d - b'1') as usize;
            if seen[idx] {
                let repl = missing.remove(0);
                *slot = Some(repl);
                seen[(repl - b'1') as usize] = true;
            } else {
                seen[idx] = true;
            }
        }
    }

    // Pass 2: empty slots consume the rest of the missing set, left to
    // right, exhausting it exactly.
    let mut out = [0u8; 6];
    for (i, slot) in slots.iter().enumerate() {
        out[i] = match slot {
            Some(d) => *d,
            None => missing.remove(0),
        };
    }

    CanonicalCode::from_bytes(out)
}

fn single_digit(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [d @ b'1'..=b'6'] => Some(*d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(symbols: [&str; 6]) -> RawTuple {
        RawTuple(std::array::from_fn(|i| match symbols[i] {
            "x" => RawSymbol::Empty,
            s => RawSymbol::Class(s.to_string()),
        }))
    }

    fn assert_permutation(code: &CanonicalCode) {
        let mut seen = [false; 6];
        for &b in code.as_bytes() {
            assert!((b'1'..=b'6').contains(&b), "non-digit symbol in {}", code);
            let idx = (b - b'1') as usize;
            assert!(!seen[idx], "duplicate digit in {}", code);
            seen[idx] = true;
        }
    }

    #[test]
    fn test_canonical_input_unchanged() {
        let code = canonicalize(&raw(["1", "2", "3", "4", "5", "6"]));
        assert_eq!(code.to_string(), "123456");
    }

    #[test]
    fn test_idempotent() {
        let first = canonicalize(&raw(["3", "x", "3", "x", "1", "x"]));
        let rendered: Vec<String> =
            first.as_bytes().iter().map(|b| (*b as char).to_string()).collect();
        let again = canonicalize(&raw(std::array::from_fn(|i| rendered[i].as_str())));
        assert_eq!(first, again);
    }

    #[test]
    fn test_all_empty_fills_every_slot() {
        let code = canonicalize(&RawTuple::empty());
        assert_permutation(&code);
    }

    #[test]
    fn test_duplicate_resolved_and_gaps_filled() {
        // duplicate 1 at position 2 must become a digit other than 1,
        // and the empty slots must exhaust the complement set
        let code = canonicalize(&raw(["1", "x", "1", "x", "x", "x"]));
        assert_permutation(&code);
        assert_eq!(code.as_bytes()[0], b'1');
        assert_ne!(code.as_bytes()[2], b'1');
    }

    #[test]
    fn test_triple_duplicate() {
        let code = canonicalize(&raw(["2", "2", "2", "x", "x", "x"]));
        assert_permutation(&code);
        assert_eq!(code.as_bytes()[0], b'2');
    }

    #[test]
    fn test_non_digit_symbols_treated_as_empty() {
        let code = canonicalize(&raw(["person", "4", "b", "x", "12", "x"]));
        assert_permutation(&code);
        assert_eq!(code.as_bytes()[1], b'4');
    }

    #[test]
    fn test_always_a_permutation() {
        let inputs = [
            ["6", "6", "6", "6", "6", "6"],
            ["1", "1", "2", "2", "3", "3"],
            ["x", "5", "x", "5", "x", "5"],
            ["a", "x", "x", "x", "x", "1"],
            ["4", "3", "2", "1", "x", "x"],
        ];
        for input in inputs {
            assert_permutation(&canonicalize(&raw(input)));
        }
    }
}
