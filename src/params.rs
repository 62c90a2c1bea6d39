//! Tabserve - Request parameter validation
//!
//! Turns raw query-string values into typed inputs for the windowing engine.
//! All checks happen here, before the dataset is touched.

use crate::error::{QueryError, RangeViolation};
use crate::size::SizeSpecifier;
use crate::window::RangeRequest;

/// Raw query parameters shared by all windowing routes.
#[derive(Debug, Default, Clone)]
pub struct WindowParams {
    pub size: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl WindowParams {
    /// Collect the known keys from decoded query pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "size" => &mut params.size,
                "start" => &mut params.start,
                "end" => &mut params.end,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }

    /// The `size` token, or `default` when the parameter is absent.
    ///
    /// A present but empty value is invalid, not a request for the default.
    pub fn size_or(&self, default: SizeSpecifier) -> Result<SizeSpecifier, QueryError> {
        match self.size.as_deref() {
            None => Ok(default),
            Some(raw) => raw.parse(),
        }
    }

    /// Both range bounds, validated.
    pub fn range(&self) -> Result<RangeRequest, QueryError> {
        parse_range(self.start.as_deref(), self.end.as_deref())
    }
}

/// Validate a `(start, end)` pair of raw bounds.
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<RangeRequest, QueryError> {
    let (start, end) = match (non_empty(start), non_empty(end)) {
        (Some(s), Some(e)) => (s, e),
        _ => return Err(QueryError::MissingParameter),
    };
    RangeRequest::new(parse_bound(start)?, parse_bound(end)?)
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

/// Plain ASCII digits only: no sign, whitespace or decimal point.
///
/// Values too large for `usize` saturate; they lie past any dataset anyway.
fn parse_bound(raw: &str) -> Result<usize, QueryError> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeViolation::NotPositiveInteger.into());
    }
    Ok(raw.parse().unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(size: Option<&str>, start: Option<&str>, end: Option<&str>) -> WindowParams {
        WindowParams {
            size: size.map(String::from),
            start: start.map(String::from),
            end: end.map(String::from),
        }
    }

    #[test]
    fn test_from_pairs_keeps_first_value() {
        let parsed = WindowParams::from_pairs([
            ("start", "1"),
            ("size", "large"),
            ("start", "2"),
            ("other", "x"),
            ("end", "3"),
            ("size", "small"),
        ]);
        assert_eq!(parsed.start.as_deref(), Some("1"));
        assert_eq!(parsed.end.as_deref(), Some("3"));
        assert_eq!(parsed.size.as_deref(), Some("large"));

        let empty = WindowParams::from_pairs(Vec::<(String, String)>::new());
        assert!(empty.size.is_none() && empty.start.is_none() && empty.end.is_none());
    }

    #[test]
    fn test_size_default_and_explicit() {
        let absent = params(None, None, None);
        assert_eq!(absent.size_or(SizeSpecifier::Small), Ok(SizeSpecifier::Small));
        assert_eq!(absent.size_or(SizeSpecifier::Complete), Ok(SizeSpecifier::Complete));

        let large = params(Some("large"), None, None);
        assert_eq!(large.size_or(SizeSpecifier::Small), Ok(SizeSpecifier::Large));
    }

    #[test]
    fn test_size_invalid_is_not_defaulted() {
        for raw in ["", "huge", "Medium"] {
            assert_eq!(
                params(Some(raw), None, None).size_or(SizeSpecifier::Small),
                Err(QueryError::InvalidSpecifier(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_missing_bounds() {
        for (start, end) in [(None, Some("5")), (Some("1"), None), (Some(""), Some("5")), (None, None)] {
            assert_eq!(parse_range(start, end), Err(QueryError::MissingParameter));
        }
    }

    #[test]
    fn test_malformed_bounds() {
        let not_positive: Result<RangeRequest, QueryError> =
            Err(QueryError::InvalidRange(RangeViolation::NotPositiveInteger));
        for (start, end) in [
            ("abc", "5"),
            ("0", "5"),
            ("1", "0"),
            ("-1", "5"),
            ("+1", "5"),
            ("1.5", "5"),
            (" 1", "5"),
            ("000", "5"),
        ] {
            assert_eq!(parse_range(Some(start), Some(end)), not_positive, "{} {}", start, end);
        }
    }

    #[test]
    fn test_start_after_end() {
        assert_eq!(
            parse_range(Some("10"), Some("2")),
            Err(QueryError::InvalidRange(RangeViolation::StartAfterEnd))
        );
    }

    #[test]
    fn test_valid_bounds() -> Result<(), QueryError> {
        let r = parse_range(Some("007"), Some("12"))?;
        assert_eq!((r.start(), r.end()), (7, 12));

        let huge = params(None, Some("5"), Some("99999999999999999999999999")).range()?;
        assert_eq!(huge.end(), usize::MAX);
        Ok(())
    }
}
