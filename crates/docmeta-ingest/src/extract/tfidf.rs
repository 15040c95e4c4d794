//! TF-IDF vector space over a small set of texts.
//!
//! Raw term counts weighted by smoothed idf `ln((1 + n) / (1 + df)) + 1`,
//! each row L2-normalised. Stop words are dropped from the vocabulary.
//! Rows are `BTreeMap`s so dot products sum in a fixed order and repeated
//! runs give bit-identical scores.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::stopwords::is_stop_word;
use super::text::term_tokens;

/// One L2-normalised sparse row, keyed by vocabulary index.
pub type SparseRow = BTreeMap<usize, f64>;

#[derive(Debug, Clone, Default)]
pub struct TfIdfMatrix {
    vocabulary: BTreeMap<String, usize>,
    rows: Vec<SparseRow>,
}

impl TfIdfMatrix {
    /// Fit the vocabulary and idf weights on `docs` and vectorize them.
    pub fn fit_transform(docs: &[&str]) -> Self {
        let tokenized: Vec<Vec<String>> = docs
            .iter()
            .map(|d| {
                term_tokens(d)
                    .into_iter()
                    .filter(|t| !is_stop_word(t))
                    .collect()
            })
            .collect();

        let terms: BTreeSet<&str> = tokenized.iter().flatten().map(String::as_str).collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let distinct: BTreeSet<usize> = tokens.iter().map(|t| vocabulary[t]).collect();
            for idx in distinct {
                df[idx] += 1;
            }
        }

        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: HashMap<usize, usize> = HashMap::new();
                for t in tokens {
                    *counts.entry(vocabulary[t]).or_insert(0) += 1;
                }
                let mut row: SparseRow = counts
                    .into_iter()
                    .map(|(idx, c)| (idx, c as f64 * idf[idx]))
                    .collect();
                normalize(&mut row);
                row
            })
            .collect();

        Self { vocabulary, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn row(&self, i: usize) -> Option<&SparseRow> {
        self.rows.get(i)
    }

    /// Cosine similarity of every row against row `reference`.
    ///
    /// Rows are unit length, so this is a dot product; all-zero rows score 0.
    pub fn similarities_to(&self, reference: usize) -> Vec<f64> {
        let Some(target) = self.rows.get(reference) else {
            return vec![0.0; self.rows.len()];
        };
        self.rows.iter().map(|row| dot(row, target)).collect()
    }
}

fn normalize(row: &mut SparseRow) {
    let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.values_mut().for_each(|v| *v /= norm);
    }
}

fn dot(a: &SparseRow, b: &SparseRow) -> f64 {
    a.iter()
        .filter_map(|(idx, va)| b.get(idx).map(|vb| va * vb))
        .sum()
}
