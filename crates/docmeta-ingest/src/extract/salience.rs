//! Key sentence selection by TF-IDF similarity to the opening sentence.

use super::text::split_sentences;
use super::tfidf::TfIdfMatrix;

/// Default number of key sentences.
pub const DEFAULT_KEY_SENTENCES: usize = 5;

/// Pick up to `limit` key sentences from `text`.
///
/// With `limit` or fewer sentences, all of them come back in text order.
/// Otherwise sentences are ranked by cosine similarity to the first one,
/// highest first, ties going to the earlier sentence.
pub fn key_sentences(text: &str, limit: usize) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.len() <= limit {
        return sentences.into_iter().map(str::to_string).collect();
    }

    let matrix = TfIdfMatrix::fit_transform(&sentences);
    let scores = matrix.similarities_to(0);

    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    ranked
        .into_iter()
        .take(limit)
        .map(|i| sentences[i].to_string())
        .collect()
}
