//! Column helpers over partially defined series.
//!
//! A value is `None` when it cannot be computed. Rolling windows are
//! defined only when every value inside them is defined.

pub type Column = Vec<Option<f64>>;

fn defined(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// Simple return `x_t / x_{t-1} - 1`.
pub fn pct_change(xs: &[f64]) -> Column {
    let mut out = Vec::with_capacity(xs.len());
    out.push(None);
    for w in xs.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        out.push(if prev == 0.0 {
            None
        } else {
            defined(cur / prev - 1.0)
        });
    }
    out.truncate(xs.len());
    out
}

/// First difference `x_t - x_{t-1}`.
pub fn diff(xs: &[f64]) -> Column {
    let mut out = Vec::with_capacity(xs.len());
    out.push(None);
    for w in xs.windows(2) {
        out.push(defined(w[1] - w[0]));
    }
    out.truncate(xs.len());
    out
}

/// Value `lag` rows earlier.
pub fn shift(col: &[Option<f64>], lag: usize) -> Column {
    (0..col.len())
        .map(|i| i.checked_sub(lag).and_then(|j| col[j]))
        .collect()
}

fn window_values(col: &[Option<f64>], end: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || end + 1 < window {
        return None;
    }
    col[end + 1 - window..=end].iter().copied().collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    defined(var.max(0.0).sqrt())
}

pub fn rolling_mean(col: &[Option<f64>], window: usize) -> Column {
    (0..col.len())
        .map(|i| window_values(col, i, window).and_then(|w| defined(mean(&w))))
        .collect()
}

pub fn rolling_std(col: &[Option<f64>], window: usize) -> Column {
    (0..col.len())
        .map(|i| window_values(col, i, window).and_then(|w| sample_std(&w)))
        .collect()
}

/// Rolling Pearson correlation. Undefined when either side is constant.
pub fn rolling_corr(a: &[Option<f64>], b: &[Option<f64>], window: usize) -> Column {
    (0..a.len().min(b.len()))
        .map(|i| {
            let xs = window_values(a, i, window)?;
            let ys = window_values(b, i, window)?;
            let (mx, my) = (mean(&xs), mean(&ys));
            let mut sxy = 0.0;
            let mut sxx = 0.0;
            let mut syy = 0.0;
            for (x, y) in xs.iter().zip(&ys) {
                sxy += (x - mx) * (y - my);
                sxx += (x - mx).powi(2);
                syy += (y - my).powi(2);
            }
            if sxx <= 0.0 || syy <= 0.0 {
                return None;
            }
            defined((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
        })
        .collect()
}

/// Element-wise map of defined values.
pub fn map(col: &[Option<f64>], f: impl Fn(f64) -> Option<f64>) -> Column {
    col.iter().map(|v| v.and_then(&f).and_then(defined)).collect()
}

/// Element-wise combination of two columns.
pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> Option<f64>) -> Column {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => f(*x, *y).and_then(defined),
            _ => None,
        })
        .collect()
}

/// Carry the last defined value forward, then zero anything still undefined.
pub fn carry_forward_then_zero(col: &[Option<f64>]) -> Vec<f64> {
    let mut last = None;
    col.iter()
        .map(|v| {
            if let Some(x) = v.and_then(defined) {
                last = Some(x);
            }
            last.unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_pct_change_and_zero_divisor() {
        let r = pct_change(&[100.0, 110.0, 0.0, 5.0]);
        assert_eq!(r[0], None);
        assert!(approx(r[1].unwrap(), 0.1));
        assert!(approx(r[2].unwrap(), -1.0));
        assert_eq!(r[3], None);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![None, Some(3.0), Some(-2.0)]);
        assert!(diff(&[]).is_empty());
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn test_shift() {
        let col = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        assert_eq!(shift(&col, 1), vec![None, Some(1.0), Some(2.0), None]);
        assert_eq!(shift(&col, 0), col);
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let col: Column = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].iter().map(|v| Some(*v)).collect();
        let out = rolling_std(&col, 8);
        // population std is 2.0; sample std is sqrt(32/7)
        assert!(approx(out[7].unwrap(), (32.0f64 / 7.0).sqrt()));
        assert!(out[..7].iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_window_needs_all_defined() {
        let col = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        let m = rolling_mean(&col, 3);
        assert_eq!(m[2], None);
        assert!(approx(m[3].unwrap(), 2.0));
    }

    #[test]
    fn test_rolling_corr() {
        let a: Column = (0..6).map(|i| Some(i as f64)).collect();
        let b: Column = (0..6).map(|i| Some(-2.0 * i as f64)).collect();
        let flat: Column = vec![Some(1.0); 6];

        assert!(approx(rolling_corr(&a, &b, 6)[5].unwrap(), -1.0));
        assert_eq!(rolling_corr(&a, &flat, 6)[5], None);
    }

    #[test]
    fn test_carry_forward_then_zero() {
        let col = vec![None, Some(2.0), None, Some(f64::NAN), Some(3.0)];
        assert_eq!(carry_forward_then_zero(&col), vec![0.0, 2.0, 2.0, 2.0, 3.0]);
    }
}
