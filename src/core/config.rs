use serde::{Serialize, Deserialize};
use crate::core::types::{CacheMode, IndexKind, SmartSpec};

/// Tokenizer settings, fixed for the lifetime of an index and re-applied
/// unchanged at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub regex: String,
    pub lowercase: bool,
    pub min_len: usize,
    pub stopwords_path: Option<String>,
    pub stemmer: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            regex: "[a-zA-Z0-9]{3,}".to_string(),
            lowercase: true,
            min_len: 3,
            stopwords_path: None,
            stemmer: false,
        }
    }
}

/// Indexing-time configuration: tokenizer plus the SPIMI/merge/cache options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub tokenizer: TokenizerConfig,
    pub index_kind: IndexKind,
    pub cache_mode: CacheMode,
    pub bm25_k1: f64,
    pub bm25_b: f64,
    pub tfidf_smart: String,
    pub memory_budget_fraction: Option<f64>,
    pub probe_batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            tokenizer: TokenizerConfig::default(),
            index_kind: IndexKind::NonPositional,
            cache_mode: CacheMode::None,
            bm25_k1: 1.2,
            bm25_b: 0.75,
            tfidf_smart: "lnc.ltc".to_string(),
            memory_budget_fraction: None,
            probe_batch_size: 10_000,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> crate::core::error::Result<()> {
        if self.cache_mode != CacheMode::None && self.index_kind == IndexKind::Positional {
            return Err(crate::core::error::Error::config(
                "cannot combine a score cache with positional postings",
            ));
        }
        SmartSpec::parse(&self.tfidf_smart)?;
        Ok(())
    }
}

/// Search-time configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub top_k: usize,
    pub bm25_k1: f64,
    pub bm25_b: f64,
    pub tfidf_smart: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            top_k: 10,
            bm25_k1: 1.2,
            bm25_b: 0.75,
            tfidf_smart: "lnc.ltc".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> crate::core::error::Result<()> {
        SmartSpec::parse(&self.tfidf_smart)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_config_rejects_an_illegal_smart_code_before_any_indexing_work() {
        let config = IndexConfig { tfidf_smart: "xyz.xyz".to_string(), ..IndexConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn search_config_rejects_an_illegal_smart_code() {
        let config = SearchConfig { tfidf_smart: "xyz.xyz".to_string(), ..SearchConfig::default() };
        assert!(config.validate().is_err());
    }
}

/// The metadata record written alongside a finished index, so search can
/// reconstruct an identical tokenizer and ranking defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub index_algorithm: String,
    pub index_kind: IndexKind,
    pub cache_mode: CacheMode,
    pub bm25_k1: f64,
    pub bm25_b: f64,
    pub tfidf_smart: String,
    pub tokenizer: TokenizerConfig,
    pub document_count: u32,
    pub built_at: chrono::DateTime<chrono::Utc>,
}
