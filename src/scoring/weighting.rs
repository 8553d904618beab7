use crate::core::error::{Error, Result};

/// `tf_weight` column of the SMART weighting table.
pub fn tf_weight(code: char, f: f64) -> Result<f64> {
    match code {
        'n' => Ok(f),
        'l' => Ok(1.0 + f.log10()),
        'b' => Ok(1.0),
        _ => Err(Error::config(format!("unknown tf_weight code '{code}'"))),
    }
}

/// `df_weight` column of the SMART weighting table.
pub fn df_weight(code: char, df: f64, n: f64) -> Result<f64> {
    match code {
        'n' => Ok(1.0),
        't' => Ok((n / df).log10()),
        'p' => Ok(((n - df) / df).log10().max(0.0)),
        _ => Err(Error::config(format!("unknown df_weight code '{code}'"))),
    }
}

/// `norm` column of the SMART weighting table, applied in place over a
/// document's or query's full weight vector.
pub fn normalize(code: char, weights: &mut [f64]) -> Result<()> {
    match code {
        'n' => Ok(()),
        'c' => {
            let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for w in weights.iter_mut() {
                    *w /= norm;
                }
            }
            Ok(())
        }
        _ => Err(Error::config(format!("unknown normalization code '{code}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_tf_is_identity() {
        assert_eq!(tf_weight('n', 4.0).unwrap(), 4.0);
    }

    #[test]
    fn logarithmic_tf_matches_formula() {
        assert!((tf_weight('l', 10.0).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert!(tf_weight('z', 1.0).is_err());
        assert!(df_weight('z', 1.0, 10.0).is_err());
        assert!(normalize('z', &mut [1.0]).is_err());
    }

    #[test]
    fn cosine_normalization_yields_unit_length() {
        let mut weights = vec![3.0, 4.0];
        normalize('c', &mut weights).unwrap();
        let norm: f64 = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn prob_idf_clamps_at_zero() {
        // df == N means (N - df) / df == 0, log10(0) -> -inf, clamp to 0.
        assert_eq!(df_weight('p', 5.0, 5.0).unwrap(), 0.0);
    }
}
