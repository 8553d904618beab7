use std::io::{BufRead, BufReader, Write};
use std::fs::File;

use crate::analysis::tokenizer::Tokenizer;
use crate::core::config::{IndexConfig, IndexMetadata};
use crate::core::error::Result;
use crate::core::types::{CorpusRecord, DocId};
use crate::index::merger;
use crate::index::partial::PartialIndex;
use crate::memory::governor::MemoryGovernor;
use crate::storage::layout::IndexLayout;

/// Drives SPIMI end to end: tokenize and accumulate documents in
/// memory-governed batches, spilling each as a sorted run file, then merge
/// every run into the final postings file and write metadata. `records` is
/// consumed lazily so the corpus never has to fit
/// in memory at once — only one batch's partial index does.
pub fn build_index(
    records: impl Iterator<Item = Result<CorpusRecord>>,
    config: &IndexConfig,
    output_path: impl Into<std::path::PathBuf>,
) -> Result<IndexMetadata> {
    config.validate()?;

    let layout = IndexLayout::new(output_path.into())?;
    layout.clean_runs()?;

    let tokenizer = Tokenizer::new(&config.tokenizer)?;
    let governor = MemoryGovernor::new(config.memory_budget_fraction);

    let mut document_mapping = std::io::BufWriter::new(File::create(layout.document_map_path())?);
    let mut partial = PartialIndex::new(config.index_kind);
    let mut run_paths = Vec::new();
    let mut doc_id: u32 = 0;
    let mut batch_size = config.probe_batch_size;
    let mut probed = false;
    let baseline_rss = governor.current_usage();

    let mut records = records.peekable();
    while records.peek().is_some() {
        let mut in_batch = 0usize;
        while in_batch < batch_size {
            let Some(record) = records.next() else { break };
            let record = record?;
            let tokens = tokenizer.tokenize(&record.text());
            partial.add_document(DocId(doc_id), &record.pmid, &tokens);
            doc_id += 1;
            in_batch += 1;
        }

        if !probed {
            let delta = governor.current_usage().saturating_sub(baseline_rss);
            batch_size = governor.inflate_batch_size(batch_size, delta);
            probed = true;
        }

        let run_path = layout.run_path(run_paths.len())?;
        let doc_map_lines = partial.spill(&run_path)?;
        for line in &doc_map_lines {
            document_mapping.write_all(line.as_bytes())?;
        }
        run_paths.push(run_path);

        log::debug!("spilled run {} ({} documents so far)", run_paths.len(), doc_id);
    }
    document_mapping.flush()?;
    drop(document_mapping);

    log::info!("indexed {doc_id} documents across {} partial runs, merging", run_paths.len());

    let (doc_lengths, avgdl) = read_document_lengths(&layout)?;
    merger::merge(&run_paths, &layout, config, doc_id, avgdl, &doc_lengths)?;
    layout.clean_runs()?;

    let metadata = IndexMetadata {
        index_algorithm: "SPIMI".to_string(),
        index_kind: config.index_kind,
        cache_mode: config.cache_mode,
        bm25_k1: config.bm25_k1,
        bm25_b: config.bm25_b,
        tfidf_smart: config.tfidf_smart.clone(),
        tokenizer: config.tokenizer.clone(),
        document_count: doc_id,
        built_at: chrono::Utc::now(),
    };
    let metadata_file = File::create(layout.metadata_path())?;
    serde_json::to_writer_pretty(metadata_file, &metadata)?;

    log::info!("finished indexing: {doc_id} documents, {} terms", run_paths.len());

    Ok(metadata)
}

/// Reads the `pmid:dl` document map to compute each document's length (for
/// BM25 cache materialization) and the corpus-wide average document length.
fn read_document_lengths(layout: &IndexLayout) -> Result<(Vec<u32>, f64)> {
    let file = File::open(layout.document_map_path())?;
    let mut lengths = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let dl: u32 = line
            .rsplit_once(':')
            .and_then(|(_, dl)| dl.parse().ok())
            .ok_or_else(|| crate::core::error::Error::data(format!("malformed document map line '{line}'")))?;
        lengths.push(dl);
    }
    let avgdl = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().map(|&dl| dl as f64).sum::<f64>() / lengths.len() as f64
    };
    Ok((lengths, avgdl))
}
