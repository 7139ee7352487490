//! Raw score parsing and 0-100 normalization.
//!
//! Both operations are deliberately total: a malformed row must never abort a
//! batch, so unparsable content coerces to zero and a non-positive maximum
//! normalizes to zero instead of dividing by it.

/// Parse a raw score of the form `"<actual>/<max>"`.
///
/// The first `/`-separated segment becomes the score, the second the maximum;
/// a segment that is absent or fails integer parsing after trimming becomes 0.
pub fn parse_raw_score(raw: &str) -> (i64, i64) {
    let mut segments = raw.split('/');
    let score = parse_segment(segments.next());
    let max = parse_segment(segments.next());
    (score, max)
}

fn parse_segment(segment: Option<&str>) -> i64 {
    segment
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Rescale a score to the 0-100 range. A non-positive maximum is a degenerate
/// input (blank or malformed row) and normalizes to 0 by policy.
pub fn normalize(score: i64, max: i64) -> f64 {
    if max > 0 {
        score as f64 / max as f64 * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_scores() {
        assert_eq!(parse_raw_score("35/100"), (35, 100));
        assert_eq!(parse_raw_score("0/20"), (0, 20));
        assert_eq!(parse_raw_score(" 7 / 10 "), (7, 10));
    }

    #[test]
    fn coerces_unparsable_segments_to_zero() {
        assert_eq!(parse_raw_score("abc"), (0, 0));
        assert_eq!(parse_raw_score(""), (0, 0));
        assert_eq!(parse_raw_score("abc/100"), (0, 100));
        assert_eq!(parse_raw_score("35/xyz"), (35, 0));
        assert_eq!(parse_raw_score("35/"), (35, 0));
        assert_eq!(parse_raw_score("/100"), (0, 100));
        assert_eq!(parse_raw_score("12.5/100"), (0, 100));
    }

    #[test]
    fn extra_segments_are_ignored() {
        assert_eq!(parse_raw_score("35/100/extra"), (35, 100));
    }

    #[test]
    fn normalizes_against_positive_maximum() {
        assert_eq!(normalize(35, 100), 35.0);
        assert_eq!(normalize(7, 10), 70.0);
        assert_eq!(normalize(12, 20), 60.0);
        assert_eq!(normalize(100, 100), 100.0);
    }

    #[test]
    fn non_positive_maximum_normalizes_to_zero() {
        assert_eq!(normalize(35, 0), 0.0);
        assert_eq!(normalize(35, -5), 0.0);
        assert_eq!(normalize(0, 0), 0.0);
    }
}
