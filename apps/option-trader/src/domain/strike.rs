//! Nearest-strike selection for default trading targets.

use rust_decimal::Decimal;

/// Index of the strike nearest to `reference` in an ascending-sorted
/// slice of distinct strikes. Ties break to the lower strike (the first
/// occurrence in ascending order). Returns `None` for an empty slice.
#[must_use]
pub fn nearest_strike(strikes: &[Decimal], reference: Decimal) -> Option<usize> {
    strikes
        .iter()
        .enumerate()
        .min_by_key(|(_, strike)| (**strike - reference).abs())
        .map(|(idx, _)| idx)
}

/// A display window of `radius` neighbors on each side of `center`,
/// clipped at the ends of the range. The window may be asymmetric at the
/// boundaries but is never an error.
#[must_use]
pub fn strike_window(strikes: &[Decimal], center: usize, radius: usize) -> &[Decimal] {
    if strikes.is_empty() {
        return strikes;
    }
    let center = center.min(strikes.len() - 1);
    let start = center.saturating_sub(radius);
    let end = (center + radius + 1).min(strikes.len());
    &strikes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strikes(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn nearest_picks_minimum_distance() {
        let s = strikes(&[5, 10, 15, 20]);
        // distance 2 to 10 beats distance 3 to 15
        assert_eq!(nearest_strike(&s, Decimal::from(12)), Some(1));
    }

    #[test]
    fn nearest_ties_break_low() {
        let s = strikes(&[10, 20]);
        assert_eq!(nearest_strike(&s, Decimal::from(15)), Some(0));
    }

    #[test]
    fn nearest_empty_is_none() {
        assert_eq!(nearest_strike(&[], Decimal::from(10)), None);
    }

    #[test]
    fn nearest_exact_match() {
        let s = strikes(&[5, 10, 15]);
        assert_eq!(nearest_strike(&s, Decimal::from(15)), Some(2));
    }

    #[test]
    fn window_interior() {
        let s = strikes(&[5, 10, 15, 20, 25]);
        assert_eq!(strike_window(&s, 2, 1), &s[1..4]);
    }

    #[test]
    fn window_clipped_at_start() {
        let s = strikes(&[5, 10, 15, 20, 25]);
        assert_eq!(strike_window(&s, 0, 2), &s[0..3]);
    }

    #[test]
    fn window_clipped_at_end() {
        let s = strikes(&[5, 10, 15, 20, 25]);
        assert_eq!(strike_window(&s, 4, 2), &s[2..5]);
    }

    #[test]
    fn window_radius_exceeds_range() {
        let s = strikes(&[5, 10]);
        assert_eq!(strike_window(&s, 0, 10), &s[..]);
    }

    #[test]
    fn window_empty_input() {
        let s: Vec<Decimal> = vec![];
        assert!(strike_window(&s, 3, 2).is_empty());
    }
}
