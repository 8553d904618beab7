/// BM25 parameters.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.2, b: 0.75 }
    }
}

/// `idf_t = log10(N / df_t)`.
pub fn idf(n: f64, df: f64) -> f64 {
    (n / df).log10()
}

/// The RSV (retrieval status value) for one `(term, document)` pair under
/// Okapi BM25:
/// `idf * (tf * (k1+1)) / (tf + k1 * ((1-b) + b * dl/avgdl))`.
pub fn bm25_score(params: Bm25Params, idf: f64, tf: f64, dl: f64, avgdl: f64) -> f64 {
    let numerator = idf * (tf * (params.k1 + 1.0));
    let denominator = tf + params.k1 * ((1.0 - params.b) + params.b * (dl / avgdl));
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k1_zero_makes_score_independent_of_tf() {
        let params = Bm25Params { k1: 0.0, b: 0.75 };
        let score_low_tf = bm25_score(params, 1.0, 1.0, 10.0, 20.0);
        let score_high_tf = bm25_score(params, 1.0, 50.0, 10.0, 20.0);
        assert!((score_low_tf - score_high_tf).abs() < 1e-9);
    }

    #[test]
    fn b_zero_makes_score_independent_of_document_length() {
        let params = Bm25Params { k1: 1.2, b: 0.0 };
        let score_short = bm25_score(params, 1.0, 3.0, 5.0, 20.0);
        let score_long = bm25_score(params, 1.0, 3.0, 500.0, 20.0);
        assert!((score_short - score_long).abs() < 1e-9);
    }

    #[test]
    fn idf_matches_log10_ratio() {
        assert!((idf(100.0, 10.0) - 1.0).abs() < 1e-9);
    }
}
