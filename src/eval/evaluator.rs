use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::corpus::reader::{read_runs, RunRecord};
use crate::core::error::Result;

const CUTOFFS: [usize; 3] = [10, 50, 100];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    #[serde(rename = "F-measure")]
    pub f_measure: f64,
    #[serde(rename = "Average Precision (AP)")]
    pub average_precision: f64,
    #[serde(rename = "Discounted Cumulative Gain (DCG)")]
    pub dcg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub query_file_name: String,
    pub top_10: Metrics,
    pub top_50: Metrics,
    pub top_100: Metrics,
}

impl EvaluationReport {
    /// The `[metadata, results]` two-element shape written to the eval output file.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!([
            {"query_file_name": self.query_file_name},
            {"top_10": self.top_10, "top_50": self.top_50, "top_100": self.top_100},
        ])
    }
}

/// Precision/Recall/F1/AP/DCG at k in {10, 50, 100}, macro-averaged across
/// queries. `gold` and `run` are paired positionally. Precision and Recall
/// share the same denominator, `|gold|` (not `|gold ∩ top_k|`'s usual
/// recall-only denominator), and AP/DCG are computed over each query's full
/// run list regardless of the cutoff — both match `evaluator.py`.
pub fn evaluate(gold: &[RunRecord], run: &[RunRecord], query_file_name: &str) -> Result<EvaluationReport> {
    let mut per_cutoff: Vec<Vec<Metrics>> = vec![Vec::new(); CUTOFFS.len()];

    for (gold_query, run_query) in gold.iter().zip(run.iter()) {
        let gold_set: HashSet<&str> = gold_query.documents_pmid.iter().map(String::as_str).collect();
        let ap = average_precision(&gold_set, &run_query.documents_pmid);
        let dcg = dcg(&gold_set, &run_query.documents_pmid);

        for (cutoff_index, &k) in CUTOFFS.iter().enumerate() {
            let retrieved: HashSet<&str> = run_query.documents_pmid.iter().take(k).map(String::as_str).collect();
            let hits = gold_set.intersection(&retrieved).count() as f64;
            let gold_count = gold_set.len() as f64;

            let precision = if gold_count > 0.0 { hits / gold_count } else { 0.0 };
            let recall = precision;
            let f_measure = if precision + recall > 0.0 { 2.0 * precision * recall / (precision + recall) } else { 0.0 };

            per_cutoff[cutoff_index].push(Metrics { precision, recall, f_measure, average_precision: ap, dcg });
        }
    }

    let averaged: Vec<Metrics> = per_cutoff.iter().map(|metrics| macro_average(metrics)).collect();
    Ok(EvaluationReport {
        query_file_name: query_file_name.to_string(),
        top_10: averaged[0],
        top_50: averaged[1],
        top_100: averaged[2],
    })
}

/// Reads gold and run files (line-delimited JSON, same shape as a run file)
/// and evaluates them, naming the report after the gold file's stem.
pub fn evaluate_files(gold_path: impl AsRef<Path>, run_path: impl AsRef<Path>) -> Result<EvaluationReport> {
    let gold_path = gold_path.as_ref();
    let gold = read_runs(gold_path)?;
    let run = read_runs(run_path.as_ref())?;
    let query_file_name = gold_path.file_stem().and_then(|s| s.to_str()).unwrap_or("query").to_string();
    evaluate(&gold, &run, &query_file_name)
}

fn average_precision(gold: &HashSet<&str>, ranked: &[String]) -> f64 {
    if gold.is_empty() {
        return 0.0;
    }
    let mut relevant_so_far = 0u32;
    let mut sum = 0.0;
    for (i, doc) in ranked.iter().enumerate() {
        if gold.contains(doc.as_str()) {
            relevant_so_far += 1;
            sum += relevant_so_far as f64 / (i + 1) as f64;
        }
    }
    sum / gold.len() as f64
}

fn dcg(gold: &HashSet<&str>, ranked: &[String]) -> f64 {
    ranked
        .iter()
        .enumerate()
        .filter(|(_, doc)| gold.contains(doc.as_str()))
        .map(|(i, _)| 1.0 / ((i + 2) as f64).log2())
        .sum()
}

fn macro_average(metrics: &[Metrics]) -> Metrics {
    if metrics.is_empty() {
        return Metrics::default();
    }
    let n = metrics.len() as f64;
    Metrics {
        precision: metrics.iter().map(|m| m.precision).sum::<f64>() / n,
        recall: metrics.iter().map(|m| m.recall).sum::<f64>() / n,
        f_measure: metrics.iter().map(|m| m.f_measure).sum::<f64>() / n,
        average_precision: metrics.iter().map(|m| m.average_precision).sum::<f64>() / n,
        dcg: metrics.iter().map(|m| m.dcg).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(query_id: &str, documents_pmid: &[&str]) -> RunRecord {
        RunRecord {
            query_id: query_id.to_string(),
            documents_pmid: documents_pmid.iter().map(|s| s.to_string()).collect(),
            scores: Vec::new(),
        }
    }

    #[test]
    fn matches_the_worked_example_at_k10() {
        let gold = vec![record("q1", &["X", "Y", "Z"])];
        let run = vec![record("q1", &["X", "W", "Y", "Z", "P", "Q", "R", "S", "T", "U"])];

        let report = evaluate(&gold, &run, "gold").unwrap();

        assert!((report.top_10.precision - 1.0).abs() < 1e-4);
        assert!((report.top_10.recall - 1.0).abs() < 1e-4);
        assert!((report.top_10.f_measure - 1.0).abs() < 1e-4);
        assert!((report.top_10.average_precision - 0.8056).abs() < 1e-4);
        assert!((report.top_10.dcg - 1.9307).abs() < 1e-4);
    }

    #[test]
    fn ap_and_dcg_ignore_the_cutoff() {
        let gold = vec![record("q1", &["Z"])];
        let mut padding: Vec<&str> = (0..20).map(|_| "noise").collect();
        padding.push("Z");
        let run = vec![record("q1", &padding)];

        let report = evaluate(&gold, &run, "gold").unwrap();
        // Z sits at rank 21, past every cutoff's top_k, but AP/DCG still see it.
        assert!(report.top_10.average_precision > 0.0);
        assert!(report.top_10.dcg > 0.0);
        assert_eq!(report.top_10.precision, 0.0);
    }

    #[test]
    fn empty_gold_set_scores_zero_everywhere() {
        let gold = vec![record("q1", &[])];
        let run = vec![record("q1", &["A", "B"])];
        let report = evaluate(&gold, &run, "gold").unwrap();
        assert_eq!(report.top_10.precision, 0.0);
        assert_eq!(report.top_10.average_precision, 0.0);
    }
}
