use crate::error::ThesaurusError;
use crate::model::Model;
use ndarray::{Array2, Axis};
use std::cmp::Ordering;

/// Cosine similarity queries over the vectors of a [`Model`].
pub struct Similarity<'m> {
    model: &'m Model,
    unit: Array2<f32>,
}

impl<'m> Similarity<'m> {

    pub fn new(model: &'m Model) -> Similarity<'m> {

        // need to normalize w so each row has l2 norm 1, a zero row stays zero
        let mut unit = model.vectors().to_owned();
        for mut row in unit.axis_iter_mut(Axis(0)) {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|a| a / norm);
            }
        }

        Self { model, unit }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Cosine similarity between the words at rows `a` and `b`.
    pub fn similarity(&self, a: usize, b: usize) -> f64 {
        self.unit.row(a).dot(&self.unit.row(b)) as f64
    }

    /// The `topn` rows closest to row `index`, best first, never `index` itself.
    ///
    /// `topn` is clamped to the number of other words. Equal scores keep
    /// vocabulary order.
    pub fn most_similar(&self, index: usize, topn: usize) -> Vec<(usize, f64)> {

        // multiply all unit vectors by the query unit vector
        let scores = self.unit.dot(&self.unit.row(index));
        let mut indexed_scores: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .collect();

        let k = topn.min(indexed_scores.len());
        if k == 0 {
            return Vec::new();
        }

        // only the k best need a full ordering
        if k < indexed_scores.len() {
            indexed_scores.select_nth_unstable_by(k - 1, by_rank);
            indexed_scores.truncate(k);
        }
        indexed_scores.sort_by(by_rank);

        indexed_scores
            .into_iter()
            .map(|(i, score)| (i, score as f64))
            .collect()
    }

    pub fn most_similar_word(&self, token: &str, topn: usize) -> Result<Vec<(String, f64)>, ThesaurusError> {

        let index = self
            .model
            .index_of(token)
            .ok_or_else(|| ThesaurusError::UnknownWord(token.to_string()))?;

        let vocab = self.model.vocab();
        Ok(self
            .most_similar(index, topn)
            .into_iter()
            .map(|(i, score)| (vocab[i].to_owned(), score))
            .collect())
    }

}

// descending score, then ascending row
fn by_rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}
