use std::fs::File;
use std::path::Path;

use fst::{IntoStreamer, Map, Streamer};
use memmap2::Mmap;

use crate::core::error::{Error, Result};
use crate::index::posting::Posting;
use crate::storage::layout::IndexLayout;

/// Mmap's the postings file and, in the same pass, builds an in-memory table
/// of line byte ranges. This replaces the source's `linecache` line-number
/// addressing with a length-prefixed-free line offset table over a single
/// memory-mapped file — same `line N` semantics as the source's line-number
/// addressing, without a second indirection layer.
pub struct PostingsIndex {
    mmap: Mmap,
    line_offsets: Vec<(usize, usize)>,
    jump_table: Map<Vec<u8>>,
}

impl PostingsIndex {
    pub fn open(layout: &IndexLayout) -> Result<Self> {
        let file = File::open(layout.postings_path())?;
        let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };
        let line_offsets = index_lines(&mmap);

        let jump_bytes = std::fs::read(layout.jump_table_path())?;
        let jump_table = Map::new(jump_bytes).map_err(|e| Error::data(e.to_string()))?;

        Ok(PostingsIndex { mmap, line_offsets, jump_table })
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    pub fn line(&self, line_number: usize) -> &str {
        let (start, end) = self.line_offsets[line_number];
        std::str::from_utf8(&self.mmap[start..end]).unwrap_or("")
    }

    /// `[start, end)` line bounds for every term sharing `term`'s two-byte
    /// prefix, from the prefix jump table.
    fn prefix_bounds(&self, prefix: &str) -> Option<(u64, u64)> {
        let start = self.jump_table.get(prefix.as_bytes())?;
        let end = self
            .jump_table
            .range()
            .gt(prefix.as_bytes())
            .into_stream()
            .next()
            .map(|(_, value)| value)
            .unwrap_or(self.line_offsets.len() as u64);
        Some((start, end))
    }

    /// Finds the line number of `term`'s postings via the prefix jump table
    /// plus a bounded linear scan. The same line number
    /// indexes the parallel score cache, when one exists.
    pub fn find_line(&self, term: &str) -> Option<usize> {
        let prefix: String = term.chars().take(2).collect();
        let (start, end) = self.prefix_bounds(&prefix)?;

        for line_number in start as usize..end as usize {
            let line = self.line(line_number);
            if line.split(';').next() == Some(term) {
                return Some(line_number);
            }
        }
        None
    }

    /// Locates `term`'s postings. Returns `None` when the term is absent.
    pub fn locate(&self, term: &str, positional: bool) -> Result<Option<Vec<Posting>>> {
        let Some(line_number) = self.find_line(term) else { return Ok(None) };
        let rest = self.line(line_number).split_once(';').map(|(_, rest)| rest).unwrap_or("");
        let postings = rest
            .split(';')
            .filter(|group| !group.is_empty())
            .map(|group| Posting::parse_group(group, positional))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(postings))
    }
}

/// Scans the mapped bytes once for newline positions, yielding `(start, end)`
/// byte ranges (end exclusive of the newline) for every line.
pub(crate) fn index_lines(mmap: &Mmap) -> Vec<(usize, usize)> {
    let mut offsets = Vec::new();
    let mut start = 0usize;
    for (i, &byte) in mmap.iter().enumerate() {
        if byte == b'\n' {
            offsets.push((start, i));
            start = i + 1;
        }
    }
    if start < mmap.len() {
        offsets.push((start, mmap.len()));
    }
    offsets
}

/// Reads the `pmid:dl` document map fully into memory, keyed by `doc_id`.
/// Small relative to the postings file (one line per document, no postings),
/// so no mmap indirection is needed here.
pub fn read_document_map(layout: &IndexLayout) -> Result<Vec<(String, u32)>> {
    let contents = std::fs::read_to_string(layout.document_map_path())?;
    contents
        .lines()
        .map(|line| {
            let (pmid, dl) = line
                .rsplit_once(':')
                .ok_or_else(|| Error::data(format!("malformed document map line '{line}'")))?;
            let dl: u32 = dl.parse().map_err(|_| Error::data(format!("bad document length in '{line}'")))?;
            Ok((pmid.to_string(), dl))
        })
        .collect()
}

pub fn read_metadata(path: impl AsRef<Path>) -> Result<crate::core::config::IndexMetadata> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::IndexConfig;
    use crate::core::types::CorpusRecord;
    use crate::index::writer::build_index;

    fn build_test_index(dir: &Path) {
        let config = IndexConfig {
            tokenizer: crate::core::config::TokenizerConfig {
                regex: "\\S+".to_string(),
                lowercase: false,
                min_len: 0,
                stopwords_path: None,
                stemmer: false,
            },
            ..IndexConfig::default()
        };
        let records = vec![
            Ok(CorpusRecord { pmid: "A".into(), title: "alpha beta".into(), abstract_text: "beta".into() }),
            Ok(CorpusRecord { pmid: "B".into(), title: "beta gamma".into(), abstract_text: "gamma gamma".into() }),
        ];
        build_index(records.into_iter(), &config, dir).unwrap();
    }

    #[test]
    fn locates_a_term_present_in_the_index() {
        let dir = tempfile::tempdir().unwrap();
        build_test_index(dir.path());
        let layout = IndexLayout::new(dir.path()).unwrap();

        let postings = PostingsIndex::open(&layout).unwrap();
        let result = postings.locate("beta", false).unwrap().unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].doc_id().value(), 0);
        assert_eq!(result[0].tf(), 2);
    }

    #[test]
    fn missing_term_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        build_test_index(dir.path());
        let layout = IndexLayout::new(dir.path()).unwrap();

        let postings = PostingsIndex::open(&layout).unwrap();
        assert!(postings.locate("zzz", false).unwrap().is_none());
    }

    #[test]
    fn reads_document_map_in_doc_id_order() {
        let dir = tempfile::tempdir().unwrap();
        build_test_index(dir.path());
        let layout = IndexLayout::new(dir.path()).unwrap();

        let doc_map = read_document_map(&layout).unwrap();
        assert_eq!(doc_map, vec![("A".to_string(), 3), ("B".to_string(), 4)]);
    }
}
