use std::collections::HashSet;
use std::fs;
use std::path::Path;
use crate::analysis::filter::TokenFilter;
use crate::core::error::Result;

pub struct StopWordFilter {
    pub stop_words: HashSet<String>,
}

impl StopWordFilter {
    pub fn new(stop_words: Vec<String>) -> Self {
        StopWordFilter {
            stop_words: stop_words.into_iter().collect(),
        }
    }

    /// Load one stopword per line, as the original indexer does
    /// (`examples/original_source/tokenizer.py::_load_stopwords`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(StopWordFilter::new(contents.lines().map(String::from).collect()))
    }

    pub fn english() -> Self {
        let words = vec![
            "a", "an", "and", "are", "as", "at", "be", "by", "for",
            "from", "has", "he", "in", "is", "it", "its", "of", "on",
            "that", "the", "to", "was", "will", "with",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        StopWordFilter::new(words)
    }
}

impl TokenFilter for StopWordFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    fn name(&self) -> &str {
        "stop_words"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_configured_words() {
        let filter = StopWordFilter::new(vec!["the".to_string(), "on".to_string()]);
        let tokens = vec!["the".to_string(), "cat".to_string(), "on".to_string(), "mat".to_string()];
        assert_eq!(filter.filter(tokens), vec!["cat".to_string(), "mat".to_string()]);
    }
}
