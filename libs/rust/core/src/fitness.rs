//! The single minimization comparator used for personal best, global best,
//! elite selection and worst selection.

use std::cmp::Ordering;

/// `candidate` replaces `incumbent` only when strictly lower. NaN on either
/// side never wins, so a NaN incumbent is never displaced.
#[inline]
pub fn is_strictly_better(candidate: f64, incumbent: f64) -> bool { candidate < incumbent }

/// Ascending order agreeing with [`is_strictly_better`]. Every NaN, whatever
/// its sign bit, sorts after every number and compares equal to other NaNs.
/// `-0.0` and `0.0` are equal, so stable sorts keep their original order.
#[inline]
pub fn best_first(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_do_not_replace() {
        assert!(is_strictly_better(1.0, 2.0));
        assert!(!is_strictly_better(2.0, 2.0));
        assert!(!is_strictly_better(f64::NAN, 2.0));
        assert!(!is_strictly_better(1.0, f64::NAN));
    }

    #[test]
    fn nan_ranks_last() {
        let mut v = vec![3.0, f64::NAN, -1.0, f64::INFINITY];
        v.sort_by(|a, b| best_first(*a, *b));
        assert_eq!(&v[..3], &[-1.0, 3.0, f64::INFINITY]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn runtime_nan_ranks_last_regardless_of_sign() {
        let nan = std::hint::black_box(f64::INFINITY) - f64::INFINITY;
        assert!(nan.is_nan());
        for n in [nan, -nan, f64::NAN, -f64::NAN] {
            assert_eq!(best_first(n, f64::INFINITY), Ordering::Greater);
            assert_eq!(best_first(f64::NEG_INFINITY, n), Ordering::Less);
            assert_eq!(best_first(n, nan), Ordering::Equal);
        }
        let mut v = vec![nan, 1.0, -nan, -3.0];
        v.sort_by(|a, b| best_first(*a, *b));
        assert_eq!(&v[..2], &[-3.0, 1.0]);
        assert!(v[2].is_nan() && v[3].is_nan());
    }

    #[test]
    fn signed_zeros_tie() {
        assert_eq!(best_first(0.0, -0.0), Ordering::Equal);
        assert_eq!(best_first(-0.0, 0.0), Ordering::Equal);
        let mut v = vec![(0.0, 0), (-0.0, 1), (0.0, 2)];
        v.sort_by(|a, b| best_first(a.0, b.0));
        assert_eq!(v.iter().map(|e| e.1).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
