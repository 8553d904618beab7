use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use corpus_index::core::config::{IndexConfig, SearchConfig};
use corpus_index::core::types::{CorpusRecord, RankingMode};
use corpus_index::index::writer::build_index;
use corpus_index::query::executor::QueryExecutor;
use corpus_index::storage::layout::IndexLayout;

const VOCAB: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa", "lambda", "mu",
];

fn synthetic_corpus(doc_count: usize) -> Vec<Result<CorpusRecord, corpus_index::core::error::Error>> {
    (0..doc_count)
        .map(|i| {
            let title: String = (0..6).map(|j| VOCAB[(i + j) % VOCAB.len()]).collect::<Vec<_>>().join(" ");
            let abstract_text: String = (0..20).map(|j| VOCAB[(i * 3 + j) % VOCAB.len()]).collect::<Vec<_>>().join(" ");
            Ok(CorpusRecord { pmid: format!("PMID{i}"), title, abstract_text })
        })
        .collect()
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    for &doc_count in &[100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(doc_count), &doc_count, |b, &doc_count| {
            b.iter(|| {
                let dir = tempfile::tempdir().unwrap();
                let config = IndexConfig::default();
                let records = synthetic_corpus(doc_count);
                black_box(build_index(records.into_iter(), &config, dir.path()).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let config = IndexConfig::default();
    build_index(synthetic_corpus(2_000).into_iter(), &config, dir.path()).unwrap();
    let layout = IndexLayout::new(dir.path()).unwrap();
    let executor = QueryExecutor::open(&layout).unwrap();
    let search_config = SearchConfig::default();

    let mut group = c.benchmark_group("query");
    group.bench_function("bm25", |b| {
        b.iter(|| black_box(executor.search("alpha beta gamma", RankingMode::Bm25, &search_config).unwrap()));
    });
    group.bench_function("tfidf", |b| {
        b.iter(|| black_box(executor.search("alpha beta gamma", RankingMode::TfIdf, &search_config).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_build_index, bench_query);
criterion_main!(benches);
