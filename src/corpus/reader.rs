use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::core::error::Result;
use crate::core::types::CorpusRecord;

/// Opens a line-delimited input file, transparently decompressing it when
/// its name ends in `.gz`, grounded on `reader.py`'s `Reader`/`JsonReader`
/// split — the line-vs-JSON distinction collapses here since every consumer
/// in this crate wants JSON lines.
fn open_lines(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if path.extension().and_then(|ext| ext.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_jsonl<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let reader = open_lines(path)?;
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        records.push(serde_json::from_str(line)?);
    }
    Ok(records)
}

/// Streams corpus records one line at a time, so indexing a corpus larger
/// than memory never has to hold the whole thing at once (grounded on
/// `reader.py`'s generator-based `read()`).
pub struct CorpusReader {
    lines: std::io::Lines<Box<dyn BufRead>>,
}

impl CorpusReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(CorpusReader { lines: open_lines(path)?.lines() })
    }
}

impl Iterator for CorpusReader {
    type Item = Result<CorpusRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str::<RawCorpusRecord>(line).map(CorpusRecord::from).map_err(Into::into),
            );
        }
    }
}

/// Reads a line-delimited (optionally gzipped) corpus file into memory.
pub fn read_corpus(path: impl AsRef<Path>) -> Result<Vec<CorpusRecord>> {
    CorpusReader::open(path)?.collect()
}

#[derive(Debug, Deserialize)]
struct RawCorpusRecord {
    pmid: String,
    title: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
}

impl From<RawCorpusRecord> for CorpusRecord {
    fn from(raw: RawCorpusRecord) -> Self {
        CorpusRecord { pmid: raw.pmid, title: raw.title, abstract_text: raw.abstract_text }
    }
}

/// One query record from a questions file.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRecord {
    pub query_id: String,
    pub query_text: String,
}

pub fn read_queries(path: impl AsRef<Path>) -> Result<Vec<QueryRecord>> {
    read_jsonl(path)
}

/// A gold or run record: a query paired with a ranked (or unranked, for
/// gold) list of relevant document ids, optionally with parallel scores.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct RunRecord {
    pub query_id: String,
    pub documents_pmid: Vec<String>,
    #[serde(default)]
    pub scores: Vec<f64>,
}

pub fn read_runs(path: impl AsRef<Path>) -> Result<Vec<RunRecord>> {
    read_jsonl(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_plain_jsonl_corpus() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, r#"{{"pmid":"A","title":"alpha","abstract":"beta"}}"#).unwrap();
        writeln!(tmp, r#"{{"pmid":"B","title":"gamma","abstract":"delta"}}"#).unwrap();

        let records = read_corpus(tmp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pmid, "A");
        assert_eq!(records[0].text(), "alpha beta");
    }

    #[test]
    fn reads_gzipped_jsonl_corpus() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        writeln!(encoder, r#"{{"pmid":"A","title":"alpha","abstract":"beta"}}"#).unwrap();
        encoder.finish().unwrap();

        let records = read_corpus(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pmid, "A");
    }

    #[test]
    fn reads_query_records() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, r#"{{"query_id":"q1","query_text":"cat sat"}}"#).unwrap();
        let queries = read_queries(tmp.path()).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].query_id, "q1");
    }
}
