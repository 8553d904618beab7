use serde::{Serialize, Deserialize};

/// A 0-based internal document id, dense and contiguous within one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

/// A parsed corpus record: external id plus the concatenated title+abstract text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
}

impl CorpusRecord {
    /// `title + abstract` as the tokenizer's input field. A space separates
    /// them so a word ending the title can never fuse with one starting the
    /// abstract.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text)
    }
}

/// Whether an index stores positions or just per-document term frequencies.
/// Chosen once at construction time, replacing class mutation at construction
/// time with a plain tagged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    NonPositional,
    Positional,
}

/// Which score cache (if any) is materialized during the final merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheMode {
    None,
    Bm25,
    TfIdf,
}

/// Ranking family selected at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    Bm25,
    TfIdf,
}

/// A SMART weighting triple: (tf_weight code, df_weight code, normalization code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartTriple {
    pub tf: char,
    pub df: char,
    pub norm: char,
}

impl SmartTriple {
    pub fn parse(s: &str) -> crate::core::error::Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(crate::core::error::Error::config(format!(
                "invalid SMART triple '{s}': expected exactly 3 letters"
            )));
        }
        let triple = SmartTriple { tf: chars[0], df: chars[1], norm: chars[2] };
        triple.validate()?;
        Ok(triple)
    }

    /// Probes each letter against the weighting table with neutral values,
    /// so an illegal code is rejected here instead of surfacing later at
    /// query or cache-materialization time.
    fn validate(&self) -> crate::core::error::Result<()> {
        crate::scoring::weighting::tf_weight(self.tf, 1.0)?;
        crate::scoring::weighting::df_weight(self.df, 1.0, 1.0)?;
        crate::scoring::weighting::normalize(self.norm, &mut [1.0])?;
        Ok(())
    }
}

/// A full SMART spec for scoring: document-side and query-side triples,
/// e.g. "lnc.ltc".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartSpec {
    pub doc: SmartTriple,
    pub query: SmartTriple,
}

impl SmartSpec {
    pub fn parse(s: &str) -> crate::core::error::Result<Self> {
        let mut parts = s.split('.');
        let doc = parts.next().ok_or_else(|| {
            crate::core::error::Error::config(format!("invalid SMART spec '{s}'"))
        })?;
        let query = parts.next().ok_or_else(|| {
            crate::core::error::Error::config(format!("invalid SMART spec '{s}': missing query side"))
        })?;
        if parts.next().is_some() {
            return Err(crate::core::error::Error::config(format!(
                "invalid SMART spec '{s}': expected exactly one '.'"
            )));
        }
        Ok(SmartSpec { doc: SmartTriple::parse(doc)?, query: SmartTriple::parse(query)? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_structurally_valid_but_illegal_smart_triple() {
        assert!(SmartTriple::parse("xyz").is_err());
    }

    #[test]
    fn rejects_an_illegal_code_on_either_side_of_a_smart_spec() {
        assert!(SmartSpec::parse("xyz.ltc").is_err());
        assert!(SmartSpec::parse("lnc.xyz").is_err());
    }

    #[test]
    fn accepts_a_legal_smart_spec() {
        assert!(SmartSpec::parse("lnc.ltc").is_ok());
    }
}
