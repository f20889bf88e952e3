//! Identifier to key derivation.
//!
//! Identifiers look like `AAAAA-FFFFFFF-G`. Only the two numeric fields feed
//! the key; the trailing check digit and the separators are ignored.
use std::fmt;
use std::str::FromStr;

use crate::TableError;

/// Odd multiplier used by [`KeyPolicy::Multiplicative`] (Knuth's 2^32 / phi).
pub const GOLDEN_MULTIPLIER: u32 = 2_654_435_761;

const FIRST_FIELD: std::ops::Range<usize> = 0..5;
const SECOND_FIELD: std::ops::Range<usize> = 6..13;

/// How the two numeric fields of an identifier are mixed into a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyPolicy {
    /// `num1 + num2`. The result is not reduced and routinely exceeds the
    /// table capacity.
    Sum,
    /// `num1 * GOLDEN_MULTIPLIER ^ num2` in 32-bit wrapping arithmetic.
    #[default]
    Multiplicative,
}

impl fmt::Display for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPolicy::Sum => write!(f, "sum"),
            KeyPolicy::Multiplicative => write!(f, "mul"),
        }
    }
}

impl FromStr for KeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(KeyPolicy::Sum),
            "mul" | "multiplicative" => Ok(KeyPolicy::Multiplicative),
            other => Err(format!("unknown key policy '{other}', expected 'sum' or 'mul'")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyDeriver {
    policy: KeyPolicy,
}

impl KeyDeriver {
    pub fn new(policy: KeyPolicy) -> Self {
        KeyDeriver { policy }
    }

    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Mixes the numeric fields of `id` into a raw key. The key is *not*
    /// reduced into any table range, see [`reduce`].
    pub fn derive(&self, id: &str) -> Result<u64, TableError> {
        let num1 = parse_field(id, FIRST_FIELD)?;
        let num2 = parse_field(id, SECOND_FIELD)?;
        let key = match self.policy {
            KeyPolicy::Sum => u64::from(num1) + u64::from(num2),
            KeyPolicy::Multiplicative => u64::from(num1.wrapping_mul(GOLDEN_MULTIPLIER) ^ num2),
        };
        Ok(key)
    }

    /// Derives the key of `id` and reduces it to a slot in `0..capacity`.
    pub fn slot(&self, id: &str, capacity: usize) -> Result<usize, TableError> {
        Ok(reduce(self.derive(id)?, capacity))
    }
}

/// Reduces a raw key to a slot index in `0..capacity`.
///
/// `capacity` must be non-zero; tables check this on construction.
pub fn reduce(key: u64, capacity: usize) -> usize {
    (key % capacity as u64) as usize
}

fn parse_field(id: &str, range: std::ops::Range<usize>) -> Result<u32, TableError> {
    let malformed = |reason: &'static str| TableError::MalformedIdentifier {
        identifier: id.to_owned(),
        reason,
    };

    if id.len() < SECOND_FIELD.end {
        return Err(malformed("shorter than 13 characters"));
    }
    let field = id
        .get(range)
        .ok_or_else(|| malformed("field is not on a character boundary"))?;
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("numeric field contains a non-digit"));
    }
    // at most 7 digits, always fits
    field
        .parse()
        .map_err(|_| malformed("numeric field does not fit in 32 bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_is_not_reduced() {
        let deriver = KeyDeriver::new(KeyPolicy::Sum);
        assert_eq!(deriver.derive("00001-0000001-1").unwrap(), 2);
        assert_eq!(deriver.derive("99999-9999999-9").unwrap(), 10_099_998);
        assert_eq!(deriver.slot("99999-9999999-9", 1000).unwrap(), 998);
    }

    #[test]
    fn multiplicative_mixes_fields() {
        let deriver = KeyDeriver::new(KeyPolicy::Multiplicative);
        assert_eq!(deriver.derive("00000-0000042-0").unwrap(), 42);
        assert_eq!(
            deriver.derive("00001-0000000-0").unwrap(),
            u64::from(GOLDEN_MULTIPLIER)
        );
        let expected = 12345u32.wrapping_mul(GOLDEN_MULTIPLIER) ^ 6_789_012;
        assert_eq!(
            deriver.derive("12345-6789012-3").unwrap(),
            u64::from(expected)
        );
    }

    #[test]
    fn slots_stay_in_range() {
        let deriver = KeyDeriver::default();
        for id in ["00000-0000000-0", "99999-9999999-9", "31415-9265358-9"] {
            for capacity in [1, 4, 7, 1000] {
                assert!(deriver.slot(id, capacity).unwrap() < capacity);
            }
        }
    }

    #[test]
    fn derivation_is_deterministic() {
        let deriver = KeyDeriver::default();
        let a = deriver.derive("27182-8182845-9").unwrap();
        let b = deriver.derive("27182-8182845-9").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn separators_are_not_checked() {
        let deriver = KeyDeriver::new(KeyPolicy::Sum);
        assert_eq!(
            deriver.derive("00003x0000004").unwrap(),
            deriver.derive("00003-0000004-9").unwrap()
        );
    }

    #[test]
    fn malformed_identifiers() {
        let deriver = KeyDeriver::default();
        for id in [
            "",
            "12345-678901",
            "1234a-6789012-3",
            "12345-67890x2-3",
            "+1234-6789012-3",
            "12345- 789012-3",
            "ééééé-6789012-3",
        ] {
            match deriver.derive(id) {
                Err(TableError::MalformedIdentifier { identifier, .. }) => {
                    assert_eq!(identifier, id)
                }
                other => panic!("expected malformed identifier for {id:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn policy_round_trips_through_strings() {
        assert_eq!("sum".parse::<KeyPolicy>().unwrap(), KeyPolicy::Sum);
        assert_eq!("mul".parse::<KeyPolicy>().unwrap(), KeyPolicy::Multiplicative);
        assert_eq!(
            "multiplicative".parse::<KeyPolicy>().unwrap(),
            KeyPolicy::Multiplicative
        );
        assert!("xor".parse::<KeyPolicy>().is_err());
        assert_eq!(KeyPolicy::Sum.to_string(), "sum");
    }
}
