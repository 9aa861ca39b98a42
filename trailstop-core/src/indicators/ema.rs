//! Exponential smoothing by span.
//!
//! Recursive, non-adjusted form seeded with the first sample:
//! y[0] = x[0], y[t] = alpha * x[t] + (1 - alpha) * y[t-1], alpha = 2 / (span + 1).
//! Span 1 gives alpha = 1, so the output equals the input exactly.

/// Smooth `values` with the given span. Output has the same length as input.
pub fn ema_span(values: &[f64], span: usize) -> Vec<f64> {
    assert!(span >= 1, "smoothing span must be >= 1");
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());

    let mut prev: Option<f64> = None;
    for &v in values {
        let y = match prev {
            None => v,
            Some(p) => alpha * v + (1.0 - alpha) * p,
        };
        result.push(y);
        prev = Some(y);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn span_1_equals_input_bitwise() {
        let xs = [100.0, 200.5, 0.1 + 0.2, 1e-300, 12345.678];
        let ys = ema_span(&xs, 1);
        for (x, y) in xs.iter().zip(&ys) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn span_3_known_values() {
        // alpha = 0.5
        // y0 = 10, y1 = 0.5*12 + 0.5*10 = 11, y2 = 0.5*14 + 0.5*11 = 12.5
        let ys = ema_span(&[10.0, 12.0, 14.0], 3);
        assert_approx(ys[0], 10.0, DEFAULT_EPSILON);
        assert_approx(ys[1], 11.0, DEFAULT_EPSILON);
        assert_approx(ys[2], 12.5, DEFAULT_EPSILON);
    }

    #[test]
    fn empty_input() {
        assert!(ema_span(&[], 5).is_empty());
    }

    #[test]
    #[should_panic(expected = "smoothing span must be >= 1")]
    fn zero_span_panics() {
        ema_span(&[1.0], 0);
    }
}
