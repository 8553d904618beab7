use corpus_index::core::config::IndexConfig;
use corpus_index::core::types::CorpusRecord;
use corpus_index::index::writer::build_index;
use corpus_index::storage::layout::IndexLayout;

fn corpus() -> Vec<Result<CorpusRecord, corpus_index::core::error::Error>> {
    vec![
        Ok(CorpusRecord { pmid: "PMID1".into(), title: "the cat sat".into(), abstract_text: "on the mat".into() }),
        Ok(CorpusRecord { pmid: "PMID2".into(), title: "the dog ran".into(), abstract_text: "in the yard".into() }),
        Ok(CorpusRecord { pmid: "PMID3".into(), title: "cats and dogs".into(), abstract_text: "sat together".into() }),
        Ok(CorpusRecord { pmid: "PMID4".into(), title: "the mat and the yard".into(), abstract_text: "were wet".into() }),
        Ok(CorpusRecord { pmid: "PMID5".into(), title: "a dog sat on a cat".into(), abstract_text: "near the yard".into() }),
    ]
}

fn build_with_batch_size(batch_size: usize) -> (tempfile::TempDir, IndexLayout) {
    let dir = tempfile::tempdir().unwrap();
    let config = IndexConfig { probe_batch_size: batch_size, ..IndexConfig::default() };
    build_index(corpus().into_iter(), &config, dir.path()).unwrap();
    let layout = IndexLayout::new(dir.path()).unwrap();
    (dir, layout)
}

/// Forcing one run file per document (batch_size = 1) exercises the widest
/// possible k-way merge. The merged postings, dictionary, and document map
/// must come out identical to a single-batch build, since doc ids are
/// assigned by corpus order independent of how the SPIMI runs were split.
#[test]
fn external_merge_with_batch_size_one_matches_a_single_batch_build() {
    let (_dir_one, layout_one) = build_with_batch_size(1);
    let (_dir_many, layout_many) = build_with_batch_size(10_000);

    let postings_one = std::fs::read_to_string(layout_one.postings_path()).unwrap();
    let postings_many = std::fs::read_to_string(layout_many.postings_path()).unwrap();
    assert_eq!(postings_one, postings_many);

    let dict_one = std::fs::read_to_string(layout_one.dictionary_path()).unwrap();
    let dict_many = std::fs::read_to_string(layout_many.dictionary_path()).unwrap();
    assert_eq!(dict_one, dict_many);

    let doc_map_one = std::fs::read_to_string(layout_one.document_map_path()).unwrap();
    let doc_map_many = std::fs::read_to_string(layout_many.document_map_path()).unwrap();
    assert_eq!(doc_map_one, doc_map_many);

    assert!(!layout_one.run_dir.exists(), "run directory should be cleaned up after a successful merge");
}

/// No run files should survive a successful build regardless of how many
/// were spilled, and the run directory created for batch_size = 1 is removed
/// just like any other.
#[test]
fn runs_are_cleaned_up_after_merge_even_with_many_run_files() {
    let (_dir, layout) = build_with_batch_size(1);
    assert!(!layout.run_dir.exists());
}
