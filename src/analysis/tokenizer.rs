use regex::Regex;
use rust_stemmers::Algorithm;
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::core::config::TokenizerConfig;
use crate::core::error::{Error, Result};

/// Text → ordered token stream, preserving input order so positions line up
/// with postings offsets.
///
/// Fixed for the lifetime of an index: extract → lowercase → stopword drop →
/// stem → minL drop, in that order, deterministically.
pub struct Tokenizer {
    regex: Regex,
    lowercase: bool,
    min_len: usize,
    pipeline: Vec<Box<dyn TokenFilter>>,
}

impl Tokenizer {
    pub fn new(config: &TokenizerConfig) -> Result<Self> {
        let regex = Regex::new(&config.regex)
            .map_err(|e| Error::config(format!("invalid tokenizer regex '{}': {e}", config.regex)))?;

        let mut pipeline: Vec<Box<dyn TokenFilter>> = Vec::new();
        if let Some(path) = &config.stopwords_path {
            pipeline.push(Box::new(StopWordFilter::from_file(path)?));
        }
        if config.stemmer {
            pipeline.push(Box::new(StemmerFilter::new(Algorithm::English)));
        }

        Ok(Tokenizer { regex, lowercase: config.lowercase, min_len: config.min_len, pipeline })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = self.regex.find_iter(text).map(|m| m.as_str().to_string()).collect();

        if self.lowercase {
            tokens = LowercaseFilter.filter(tokens);
        }

        for filter in &self.pipeline {
            tokens = filter.filter(tokens);
        }

        tokens.retain(|t| t.chars().count() >= self.min_len);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn tiny_corpus_tokenization() {
        let mut stopwords_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(stopwords_file, "the\non").unwrap();

        let config = TokenizerConfig {
            regex: "[a-zA-Z0-9]{3,}".to_string(),
            lowercase: true,
            min_len: 3,
            stopwords_path: Some(stopwords_file.path().to_string_lossy().to_string()),
            stemmer: false,
        };
        let tokenizer = Tokenizer::new(&config).unwrap();

        let tokens = tokenizer.tokenize(&format!("{} {}", "The cat sat", "on the mat"));
        assert_eq!(tokens, vec!["cat".to_string(), "sat".to_string(), "mat".to_string()]);
    }

    #[test]
    fn deterministic_across_calls() {
        let config = TokenizerConfig::default();
        let tokenizer = Tokenizer::new(&config).unwrap();
        let text = "Rust programming is fun and rewarding";
        assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
    }

    #[test]
    fn drops_short_tokens() {
        let config = TokenizerConfig { min_len: 5, stopwords_path: None, ..TokenizerConfig::default() };
        let tokenizer = Tokenizer::new(&config).unwrap();
        assert_eq!(tokenizer.tokenize("cat dog house"), vec!["house".to_string()]);
    }
}
