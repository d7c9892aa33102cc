/**
 * Symbol Canonicalizer
 *
 * Repairs the raw six-slot tuple produced by the classifier into a
 * canonical six-symbol code. Two policies exist, selected at
 * configuration time:
 *
 * - Digits: the output is a permutation of the digits 1-6
 * - Mixed:  the output holds exactly one letter a-f plus five mutually
 *           distinct digits
 *
 * Both are pure, deterministic and total: every input tuple yields a
 * well-formed code.
 */

pub mod digits;
pub mod mixed;

use std::fmt;

/// One unresolved slot entry as produced by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawSymbol {
    /// No detection landed in the slot.
    #[default]
    Empty,
    /// Class symbol reported by the detector, forwarded as-is even when
    /// it falls outside the policy alphabet.
    Class(String),
}

/// Ordered six-slot tuple before canonicalization. Always produced and
/// consumed as a whole unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTuple(pub [RawSymbol; 6]);

impl RawTuple {
    pub fn empty() -> Self {
        RawTuple(std::array::from_fn(|_| RawSymbol::Empty))
    }
}

/// The repaired six-symbol output code. Symbols are ASCII digits 1-6 or
/// letters a-f, so the code renders as exactly six characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalCode([u8; 6]);

impl CanonicalCode {
    pub(crate) fn from_bytes(bytes: [u8; 6]) -> Self {
        CanonicalCode(bytes)
    }

    /// Re-parse a rendered code, e.g. a line from the history file. Only
    /// symbols the policies can emit are accepted: digits 1-6, letters a-f.
    pub fn from_code_str(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 6 || !bytes.iter().all(|b| matches!(b, b'1'..=b'6' | b'a'..=b'f')) {
            return None;
        }
        let mut out = [0u8; 6];
        out.copy_from_slice(bytes);
        Some(CanonicalCode(out))
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for CanonicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// Canonicalization policy, a configuration choice of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePolicy {
    /// Pure-digit bijection over {1..6}.
    Digits,
    /// Five distinct digits plus exactly one letter a-f.
    Mixed,
}

impl CodePolicy {
    /// Repair a raw tuple into a canonical code. Same tuple in, same
    /// code out; already-canonical codes pass through unchanged.
    pub fn canonicalize(&self, raw: &RawTuple) -> CanonicalCode {
        match self {
            CodePolicy::Digits => digits::canonicalize(raw),
            CodePolicy::Mixed => mixed::canonicalize(raw),
        }
    }
}
