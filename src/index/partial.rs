use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::error::Result;
use crate::core::types::{DocId, IndexKind};

enum Accumulator {
    NonPositional(BTreeMap<u32, u32>),
    Positional(BTreeMap<u32, Vec<u32>>),
}

/// Accumulates postings for one batch of documents in memory, then spills
/// them sorted to a run file. `doc_id` arrives already in
/// reading order, so per-term document ids come out ascending for free.
pub struct PartialIndex {
    kind: IndexKind,
    terms: BTreeMap<String, Accumulator>,
    doc_map_lines: Vec<String>,
    doc_count: usize,
}

impl PartialIndex {
    pub fn new(kind: IndexKind) -> Self {
        PartialIndex { kind, terms: BTreeMap::new(), doc_map_lines: Vec::new(), doc_count: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.doc_map_lines.is_empty()
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn add_document(&mut self, doc_id: DocId, pmid: &str, tokens: &[String]) {
        match self.kind {
            IndexKind::NonPositional => {
                let mut freq: BTreeMap<&str, u32> = BTreeMap::new();
                for token in tokens {
                    *freq.entry(token.as_str()).or_insert(0) += 1;
                }
                for (term, tf) in freq {
                    let acc = self
                        .terms
                        .entry(term.to_string())
                        .or_insert_with(|| Accumulator::NonPositional(BTreeMap::new()));
                    if let Accumulator::NonPositional(docs) = acc {
                        docs.insert(doc_id.value(), tf);
                    }
                }
            }
            IndexKind::Positional => {
                for (position, token) in tokens.iter().enumerate() {
                    let acc = self
                        .terms
                        .entry(token.clone())
                        .or_insert_with(|| Accumulator::Positional(BTreeMap::new()));
                    if let Accumulator::Positional(docs) = acc {
                        docs.entry(doc_id.value()).or_default().push(position as u32);
                    }
                }
            }
        }

        self.doc_map_lines.push(format!("{}:{}\n", pmid, tokens.len()));
        self.doc_count += 1;
    }

    /// Write this batch's terms, ascending, one per line, and return the
    /// accumulated `pmid:dl` document-map lines for the caller to append.
    /// Clears the in-memory state on return.
    pub fn spill(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for (term, acc) in &self.terms {
            let groups: Vec<String> = match acc {
                Accumulator::NonPositional(docs) => {
                    docs.iter().map(|(doc_id, tf)| format!("{doc_id}:{tf}")).collect()
                }
                Accumulator::Positional(docs) => docs
                    .iter()
                    .map(|(doc_id, positions)| {
                        let positions = positions.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
                        format!("{doc_id}:{positions}")
                    })
                    .collect(),
            };
            writeln!(writer, "{term};{}", groups.join(";"))?;
        }
        writer.flush()?;

        self.terms.clear();
        Ok(std::mem::take(&mut self.doc_map_lines))
    }
}
