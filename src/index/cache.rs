use std::fs::File;

use memmap2::Mmap;

use crate::core::error::{Error, Result};
use crate::core::types::DocId;

/// Mmap's a precomputed score cache. Shares the postings file's line
/// numbering — line `i` of the cache always corresponds to line `i` of the
/// postings file — so lookups reuse `PostingsIndex::find_line`
/// rather than maintaining a second jump table.
pub struct ScoreCache {
    mmap: Mmap,
    line_offsets: Vec<(usize, usize)>,
}

impl ScoreCache {
    pub fn open(cache_path: &std::path::Path) -> Result<Self> {
        let file = File::open(cache_path)?;
        let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };
        let line_offsets = super::reader::index_lines(&mmap);
        Ok(ScoreCache { mmap, line_offsets })
    }

    /// Reads the `doc_id:score` pairs on cache line `line_number`.
    pub fn scores_at(&self, line_number: usize) -> Result<Vec<(DocId, f64)>> {
        let (start, end) = *self
            .line_offsets
            .get(line_number)
            .ok_or_else(|| Error::data(format!("cache line {line_number} out of range")))?;
        let line = std::str::from_utf8(&self.mmap[start..end]).unwrap_or("");
        let rest = line.split_once(';').map(|(_, rest)| rest).unwrap_or("");

        rest.split(';')
            .filter(|group| !group.is_empty())
            .map(|group| {
                let (doc_id, score) = group
                    .split_once(':')
                    .ok_or_else(|| Error::data(format!("malformed cache entry '{group}'")))?;
                let doc_id: u32 = doc_id.parse().map_err(|_| Error::data(format!("bad doc_id in '{group}'")))?;
                let score: f64 = score.parse().map_err(|_| Error::data(format!("bad score in '{group}'")))?;
                Ok((DocId(doc_id), score))
            })
            .collect()
    }
}
