//! Tabserve - Size resolver
//!
//! Maps a size token onto a row count through a fixed percentage table.

use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Closed set of size tokens accepted by the size-aware routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeSpecifier {
    Small,
    Medium,
    Large,
    Complete,
}

impl SizeSpecifier {
    pub const ALL: [SizeSpecifier; 4] = [
        SizeSpecifier::Small,
        SizeSpecifier::Medium,
        SizeSpecifier::Large,
        SizeSpecifier::Complete,
    ];

    /// Fraction of the dataset this token makes eligible.
    pub fn fraction(self) -> f64 {
        match self {
            SizeSpecifier::Small => 0.001,
            SizeSpecifier::Medium => 0.01,
            SizeSpecifier::Large => 0.1,
            SizeSpecifier::Complete => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeSpecifier::Small => "small",
            SizeSpecifier::Medium => "medium",
            SizeSpecifier::Large => "large",
            SizeSpecifier::Complete => "complete",
        }
    }

    /// `floor(len * fraction)`, never more than `len`.
    pub fn rows_for(self, len: usize) -> usize {
        match self {
            SizeSpecifier::Complete => len,
            // f64 has 53 bits of mantissa, exact for any realistic row count
            other => ((len as f64 * other.fraction()).floor() as usize).min(len),
        }
    }
}

impl fmt::Display for SizeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeSpecifier {
    type Err = QueryError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeSpecifier::ALL
            .into_iter()
            .find(|spec| spec.as_str() == s)
            .ok_or_else(|| QueryError::InvalidSpecifier(s.to_string()))
    }
}

/// Resolve a raw size token against a dataset length.
pub fn resolve_count(len: usize, specifier: &str) -> Result<usize, QueryError> {
    Ok(specifier.parse::<SizeSpecifier>()?.rows_for(len))
}
