/// First strict improvement over `floor`, scanning in index order.
///
/// Returns the winning index and its value, or `None` when no value is
/// strictly greater than `floor`. Ties keep the lowest index.
pub fn strict_argmax<I>(values: I, floor: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut best = None;
    let mut best_val = floor;
    for (idx, v) in values.into_iter().enumerate() {
        if v > best_val {
            best_val = v;
            best = Some(idx);
        }
    }
    best.map(|idx| (idx, best_val))
}

pub fn is_valid_prob(p: f64) -> bool {
    p.is_finite() && p >= 0.0
}

/// Sum is within `tol` of one.
pub fn is_distribution<'a, I>(values: I, tol: f64) -> bool
where
    I: IntoIterator<Item = &'a f64>,
{
    let sum = values.into_iter().sum::<f64>();
    (sum - 1.0).abs() <= tol
}

/// Rescales to sum 1. Non-finite or negative entries are zeroed first;
/// an all-zero input becomes uniform.
pub fn normalize_in_place(values: &mut [f64]) {
    let mut sum = 0.0;
    for v in values.iter_mut() {
        if !is_valid_prob(*v) {
            *v = 0.0;
        }
        sum += *v;
    }
    if sum <= 0.0 {
        let uniform = 1.0 / values.len().max(1) as f64;
        for v in values.iter_mut() {
            *v = uniform;
        }
        return;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_argmax_keeps_first_of_ties() {
        assert_eq!(strict_argmax([0.2, 0.5, 0.5, 0.1], 0.0), Some((1, 0.5)));
    }

    #[test]
    fn strict_argmax_nothing_above_floor() {
        assert_eq!(strict_argmax([0.0, 0.0], 0.0), None);
        assert_eq!(strict_argmax(Vec::<f64>::new(), 0.0), None);
        assert_eq!(strict_argmax([f64::NEG_INFINITY], f64::NEG_INFINITY), None);
    }

    #[test]
    fn normalize_zeroes_bad_entries_and_falls_back_to_uniform() {
        let mut v = [2.0, f64::NAN, -1.0, 2.0];
        normalize_in_place(&mut v);
        assert_eq!(v, [0.5, 0.0, 0.0, 0.5]);

        let mut z = [0.0, 0.0];
        normalize_in_place(&mut z);
        assert_eq!(z, [0.5, 0.5]);
    }

    #[test]
    fn distribution_check_uses_tolerance() {
        assert!(is_distribution(&[0.3, 0.7], 1e-9));
        assert!(!is_distribution(&[0.3, 0.6], 1e-6));
        assert!(is_distribution(&[0.3, 0.6], 0.2));
    }
}
