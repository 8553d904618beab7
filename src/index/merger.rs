use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fst::MapBuilder;

use crate::core::config::IndexConfig;
use crate::core::error::{Error, Result};
use crate::core::types::{CacheMode, SmartSpec};
use crate::scoring::scorer::{bm25_score, idf, Bm25Params};
use crate::scoring::weighting::tf_weight;
use crate::storage::layout::IndexLayout;

/// Read-ahead buffer over one sorted run file, refilled in `block_size`
/// chunks.
struct RunReader {
    lines: std::io::Lines<BufReader<File>>,
    buffer: VecDeque<(String, Vec<String>)>,
    exhausted: bool,
}

impl RunReader {
    fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(RunReader { lines: BufReader::new(file).lines(), buffer: VecDeque::new(), exhausted: false })
    }

    fn fill(&mut self, block_size: usize) -> Result<()> {
        while self.buffer.len() < block_size && !self.exhausted {
            match self.lines.next() {
                Some(line) => {
                    let line = line?;
                    let mut parts = line.split(';');
                    let term = parts.next().unwrap_or_default().to_string();
                    let groups: Vec<String> = parts.map(String::from).collect();
                    self.buffer.push_back((term, groups));
                }
                None => self.exhausted = true,
            }
        }
        Ok(())
    }

    fn peek_term(&self) -> Option<&str> {
        self.buffer.front().map(|(term, _)| term.as_str())
    }
}

/// K-way merges sorted run files produced by `PartialIndex::spill` into one
/// sorted postings file, building the prefix jump table alongside and
/// optionally materializing a score cache.
///
/// Terms come out of the merge in strictly ascending order, so each merged
/// term is flushed to disk the moment it is fully assembled rather than
/// batched behind a read-ahead buffer — the buffering in step 2 only bounds
/// how much of each run is held in memory at once, not when output happens.
///
/// `doc_lengths` is the document map's `dl` column indexed by doc id, needed
/// for BM25 cache materialization.
pub fn merge(
    run_paths: &[PathBuf],
    layout: &IndexLayout,
    config: &IndexConfig,
    doc_count: u32,
    avgdl: f64,
    doc_lengths: &[u32],
) -> Result<()> {
    let mut block_size: usize = 4096;
    if config.cache_mode != CacheMode::None {
        block_size /= 2;
    }

    let mut runs: Vec<RunReader> = run_paths.iter().map(RunReader::open).collect::<Result<_>>()?;
    for run in &mut runs {
        run.fill(block_size)?;
    }

    let mut postings_writer = BufWriter::new(File::create(layout.postings_path())?);
    let mut dictionary_writer = BufWriter::new(File::create(layout.dictionary_path())?);
    let mut cache_writer = match layout.cache_path(config.cache_mode) {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };
    let mut jump_builder = MapBuilder::new(BufWriter::new(File::create(layout.jump_table_path())?))
        .map_err(|e| Error::data(e.to_string()))?;

    let n = doc_count as f64;
    let mut last_prefix: Option<String> = None;
    let mut line_number: u64 = 0;

    loop {
        let mut lowest: Option<usize> = None;
        for (i, run) in runs.iter().enumerate() {
            if let Some(term) = run.peek_term() {
                let is_lower = match lowest {
                    None => true,
                    Some(j) => term < runs[j].peek_term().unwrap(),
                };
                if is_lower {
                    lowest = Some(i);
                }
            }
        }
        let Some(lowest) = lowest else { break };
        let term = runs[lowest].peek_term().unwrap().to_string();

        let mut groups: Vec<String> = Vec::new();
        for run in runs.iter_mut() {
            if run.peek_term() == Some(term.as_str()) {
                let (_, g) = run.buffer.pop_front().expect("peeked term implies a front entry");
                check_doc_ids_increasing(&term, &g)?;
                groups.extend(g);
                run.fill(block_size)?;
            }
        }

        writeln!(postings_writer, "{term};{}", groups.join(";"))?;
        writeln!(dictionary_writer, "{term}:{}", groups.len())?;

        let prefix: String = term.chars().take(2).collect();
        if last_prefix.as_deref() != Some(prefix.as_str()) {
            jump_builder.insert(prefix.as_bytes(), line_number).map_err(|e| Error::data(e.to_string()))?;
            last_prefix = Some(prefix);
        }

        if let Some(writer) = cache_writer.as_mut() {
            materialize_cache(writer, &term, &groups, config, n, avgdl, doc_lengths)?;
        }

        line_number += 1;
    }

    postings_writer.flush()?;
    dictionary_writer.flush()?;
    if let Some(mut writer) = cache_writer {
        writer.flush()?;
    }
    jump_builder.finish().map_err(|e| Error::data(e.to_string()))?;

    Ok(())
}

/// Verifies one run's posting groups for a term come out with strictly
/// increasing doc ids, the order `PartialIndex::spill` guarantees on write.
/// A run file with a non-increasing doc_id is corrupt input, not a bug in
/// the merge itself, so it fails here with the offending term rather than
/// silently producing out-of-order postings.
fn check_doc_ids_increasing(term: &str, groups: &[String]) -> Result<()> {
    let mut last: Option<u32> = None;
    for group in groups {
        let doc_id = group
            .split_once(':')
            .ok_or_else(|| Error::data(format!("malformed posting group '{group}' for term '{term}'")))?
            .0
            .parse::<u32>()
            .map_err(|_| Error::data(format!("bad doc_id in posting group '{group}' for term '{term}'")))?;
        if let Some(last) = last
            && doc_id <= last
        {
            return Err(Error::data(format!(
                "non-increasing doc_id in run for term '{term}': {doc_id} after {last}"
            )));
        }
        last = Some(doc_id);
    }
    Ok(())
}

/// Writes one cache line for `term`'s postings.
///
/// BM25 stores the final per-posting RSV contribution directly — it is a
/// plain sum over terms at query time, so nothing more is needed.
///
/// TF-IDF stores `tf_weight(x, tf) * df_weight(y, df, N)` *before*
/// normalization. The document-side `norm` step only makes sense over the
/// full set of terms a query matches in one document, which isn't known
/// until query time, so normalization is deferred to the query executor and
/// applied identically whether it reads from this cache or from raw
/// postings, so the two paths agree.
fn materialize_cache(
    writer: &mut BufWriter<File>,
    term: &str,
    groups: &[String],
    config: &IndexConfig,
    n: f64,
    avgdl: f64,
    doc_lengths: &[u32],
) -> Result<()> {
    let df = groups.len() as f64;
    let postings: Vec<(u32, u32)> = groups
        .iter()
        .map(|group| {
            let (doc_id, tf) = group
                .split_once(':')
                .ok_or_else(|| Error::data(format!("malformed posting group '{group}'")))?;
            let doc_id: u32 = doc_id.parse().map_err(|_| Error::data(format!("bad doc_id in '{group}'")))?;
            let tf: u32 = tf.parse().map_err(|_| Error::data(format!("bad tf in '{group}'")))?;
            Ok((doc_id, tf))
        })
        .collect::<Result<_>>()?;

    let scored: Vec<(u32, f64)> = match config.cache_mode {
        CacheMode::TfIdf => {
            let smart = SmartSpec::parse(&config.tfidf_smart)?.doc;
            let dfw = crate::scoring::weighting::df_weight(smart.df, df, n)?;
            postings
                .iter()
                .map(|(doc_id, tf)| Ok((*doc_id, tf_weight(smart.tf, *tf as f64)? * dfw)))
                .collect::<Result<_>>()?
        }
        CacheMode::Bm25 => {
            let idf = idf(n, df);
            let params = Bm25Params { k1: config.bm25_k1, b: config.bm25_b };
            postings
                .iter()
                .map(|(doc_id, tf)| {
                    let dl = *doc_lengths.get(*doc_id as usize).unwrap_or(&0) as f64;
                    (*doc_id, bm25_score(params, idf, *tf as f64, dl, avgdl))
                })
                .collect()
        }
        CacheMode::None => unreachable!("cache writer only exists when cache_mode is set"),
    };

    let body: Vec<String> = scored.iter().map(|(doc_id, score)| format!("{doc_id}:{score:.4}")).collect();
    writeln!(writer, "{term};{}", body.join(";"))?;
    Ok(())
}
