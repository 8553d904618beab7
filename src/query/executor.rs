use std::collections::HashMap;

use rayon::prelude::*;

use crate::analysis::tokenizer::Tokenizer;
use crate::corpus::reader::{QueryRecord, RunRecord};
use crate::core::config::{IndexMetadata, SearchConfig};
use crate::core::error::Result;
use crate::core::types::{CacheMode, IndexKind, RankingMode, SmartSpec};
use crate::index::cache::ScoreCache;
use crate::index::reader::{self, PostingsIndex};
use crate::scoring::scorer::{bm25_score, idf, Bm25Params};
use crate::scoring::weighting::{df_weight, normalize, tf_weight};
use crate::storage::layout::IndexLayout;

/// Ties a tokenizer reconstructed from index metadata to the on-disk
/// postings, optional score cache, and document map, so a query can be
/// scored without re-reading any artifact more than once per search.
pub struct QueryExecutor {
    postings: PostingsIndex,
    cache: Option<ScoreCache>,
    cache_mode: CacheMode,
    positional: bool,
    doc_map: Vec<(String, u32)>,
    n: f64,
    avgdl: f64,
    tokenizer: Tokenizer,
}

impl QueryExecutor {
    pub fn open(layout: &IndexLayout) -> Result<Self> {
        let metadata: IndexMetadata = reader::read_metadata(layout.metadata_path())?;
        let tokenizer = Tokenizer::new(&metadata.tokenizer)?;
        let postings = PostingsIndex::open(layout)?;
        let doc_map = reader::read_document_map(layout)?;

        let n = doc_map.len() as f64;
        let avgdl = if doc_map.is_empty() {
            0.0
        } else {
            doc_map.iter().map(|(_, dl)| *dl as f64).sum::<f64>() / n
        };

        let cache = match layout.cache_path(metadata.cache_mode) {
            Some(path) if path.exists() => Some(ScoreCache::open(&path)?),
            _ => None,
        };

        Ok(QueryExecutor {
            postings,
            cache,
            cache_mode: metadata.cache_mode,
            positional: metadata.index_kind == IndexKind::Positional,
            doc_map,
            n,
            avgdl,
            tokenizer,
        })
    }

    /// Scores and ranks one query's tokens. A query that tokenizes to
    /// nothing yields an empty result, not an error.
    pub fn search(&self, query_text: &str, mode: RankingMode, config: &SearchConfig) -> Result<Vec<(String, f64)>> {
        let tokens = self.tokenizer.tokenize(query_text);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let scores = match mode {
            RankingMode::Bm25 => self.score_bm25(&tokens, config)?,
            RankingMode::TfIdf => self.score_tfidf(&tokens, config)?,
        };
        Ok(self.rank(scores, config.top_k))
    }

    /// Runs every query in `queries` and returns one run record per query,
    /// in the same order. Independent per query, so it parallelizes cleanly.
    pub fn search_batch(
        &self,
        queries: &[QueryRecord],
        mode: RankingMode,
        config: &SearchConfig,
    ) -> Result<Vec<RunRecord>> {
        queries
            .par_iter()
            .map(|query| {
                let ranked = self.search(&query.query_text, mode, config)?;
                Ok(RunRecord {
                    query_id: query.query_id.clone(),
                    documents_pmid: ranked.iter().map(|(pmid, _)| pmid.clone()).collect(),
                    scores: ranked.iter().map(|(_, score)| *score).collect(),
                })
            })
            .collect()
    }

    fn score_bm25(&self, tokens: &[String], config: &SearchConfig) -> Result<HashMap<u32, f64>> {
        let params = Bm25Params { k1: config.bm25_k1, b: config.bm25_b };
        let mut scores: HashMap<u32, f64> = HashMap::new();

        for term in unique_terms(tokens) {
            let Some(line) = self.postings.find_line(term) else { continue };

            if self.cache_mode == CacheMode::Bm25 && let Some(cache) = &self.cache {
                for (doc_id, score) in cache.scores_at(line)? {
                    *scores.entry(doc_id.value()).or_insert(0.0) += score;
                }
                continue;
            }

            let postings = self.postings.locate(term, self.positional)?.unwrap_or_default();
            let df = postings.len() as f64;
            let idf = idf(self.n, df);
            for posting in &postings {
                let dl = self.doc_length(posting.doc_id().value());
                let score = bm25_score(params, idf, posting.tf() as f64, dl, self.avgdl);
                *scores.entry(posting.doc_id().value()).or_insert(0.0) += score;
            }
        }
        Ok(scores)
    }

    /// Document-side weight is un-normalized whether it comes from the cache
    /// (which stores `tf_weight · df_weight` before normalization) or is
    /// computed fresh from postings — `norm` is applied afterwards over
    /// exactly the query-matched terms each document has a weight for, the
    /// same vector in both paths, so cached and uncached results agree.
    fn score_tfidf(&self, tokens: &[String], config: &SearchConfig) -> Result<HashMap<u32, f64>> {
        let smart = SmartSpec::parse(&config.tfidf_smart)?;

        let mut query_tf: HashMap<&str, u32> = HashMap::new();
        for token in tokens {
            *query_tf.entry(token.as_str()).or_insert(0) += 1;
        }

        let mut query_terms: Vec<&str> = Vec::new();
        let mut query_weights: Vec<f64> = Vec::new();
        let mut doc_weights: HashMap<u32, Vec<(usize, f64)>> = HashMap::new();

        for (term, qtf) in &query_tf {
            let Some(line) = self.postings.find_line(term) else { continue };

            let cached = if self.cache_mode == CacheMode::TfIdf { self.cache.as_ref() } else { None };
            let (df, per_doc): (f64, Vec<(u32, f64)>) =
                if let Some(cache) = cached {
                    let entries = cache.scores_at(line)?;
                    let df = entries.len() as f64;
                    (df, entries.into_iter().map(|(doc_id, w)| (doc_id.value(), w)).collect())
                } else {
                    let postings = self.postings.locate(term, self.positional)?.unwrap_or_default();
                    let df = postings.len() as f64;
                    let dfw = df_weight(smart.doc.df, df, self.n)?;
                    let weights = postings
                        .iter()
                        .map(|p| Ok((p.doc_id().value(), tf_weight(smart.doc.tf, p.tf() as f64)? * dfw)))
                        .collect::<Result<Vec<_>>>()?;
                    (df, weights)
                };

            let qw = tf_weight(smart.query.tf, *qtf as f64)? * df_weight(smart.query.df, df, self.n)?;
            let term_index = query_terms.len();
            query_terms.push(term);
            query_weights.push(qw);

            for (doc_id, w) in per_doc {
                doc_weights.entry(doc_id).or_default().push((term_index, w));
            }
        }

        normalize(smart.query.norm, &mut query_weights)?;

        let mut scores: HashMap<u32, f64> = HashMap::new();
        for (doc_id, weighted_terms) in doc_weights {
            let mut values: Vec<f64> = weighted_terms.iter().map(|(_, w)| *w).collect();
            normalize(smart.doc.norm, &mut values)?;
            for ((term_index, _), value) in weighted_terms.iter().zip(values) {
                *scores.entry(doc_id).or_insert(0.0) += query_weights[*term_index] * value;
            }
        }
        Ok(scores)
    }

    fn doc_length(&self, doc_id: u32) -> f64 {
        self.doc_map.get(doc_id as usize).map(|(_, dl)| *dl as f64).unwrap_or(0.0)
    }

    /// Descending score, ascending external id on ties.
    fn rank(&self, scores: HashMap<u32, f64>, top_k: usize) -> Vec<(String, f64)> {
        let mut results: Vec<(String, f64)> = scores
            .into_iter()
            .map(|(doc_id, score)| (self.doc_map[doc_id as usize].0.clone(), score))
            .collect();
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
        results.truncate(top_k);
        results
    }
}

fn unique_terms(tokens: &[String]) -> impl Iterator<Item = &str> {
    let mut seen = std::collections::HashSet::new();
    tokens.iter().filter(move |t| seen.insert(t.as_str())).map(|t| t.as_str())
}
