use rust_stemmers::{Algorithm, Stemmer};
use crate::analysis::filter::TokenFilter;

pub struct StemmerFilter {
    pub algorithm: Algorithm,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter { algorithm }
    }

    pub fn english() -> Self {
        StemmerFilter::new(Algorithm::English)
    }
}

impl TokenFilter for StemmerFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        let stemmer = Stemmer::create(self.algorithm);
        tokens.into_iter().map(|text| stemmer.stem(&text).to_string()).collect()
    }

    fn name(&self) -> &str {
        "stemmer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_plurals() {
        let filter = StemmerFilter::english();
        assert_eq!(filter.filter(vec!["cats".to_string()]), vec!["cat".to_string()]);
    }
}
