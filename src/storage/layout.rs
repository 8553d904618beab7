use std::fs;
use std::path::PathBuf;
use crate::core::error::Result;
use crate::core::types::CacheMode;

/// Canonical paths for every artifact belonging to one index.
/// `run_dir` holds partial-index run files produced during SPIMI and is
/// removed once the merge completes successfully.
#[derive(Debug, Clone)]
pub struct IndexLayout {
    pub root: PathBuf,
    pub run_dir: PathBuf,
}

impl IndexLayout {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let run_dir = root.join("runs");
        fs::create_dir_all(&root)?;
        Ok(IndexLayout { root, run_dir })
    }

    pub fn postings_path(&self) -> PathBuf {
        self.root.join("index")
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.root.join("dictionary")
    }

    pub fn document_map_path(&self) -> PathBuf {
        self.root.join("document_mapping")
    }

    pub fn jump_table_path(&self) -> PathBuf {
        self.root.join("index_map.fst")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("metadata.json")
    }

    pub fn cache_path(&self, mode: CacheMode) -> Option<PathBuf> {
        match mode {
            CacheMode::None => None,
            CacheMode::Bm25 => Some(self.root.join("cache_bm25")),
            CacheMode::TfIdf => Some(self.root.join("cache_tfidf")),
        }
    }

    pub fn run_path(&self, index: usize) -> Result<PathBuf> {
        fs::create_dir_all(&self.run_dir)?;
        Ok(self.run_dir.join(format!("run_{index:06}")))
    }

    pub fn clean_runs(&self) -> Result<()> {
        if self.run_dir.exists() {
            fs::remove_dir_all(&self.run_dir)?;
        }
        Ok(())
    }
}
