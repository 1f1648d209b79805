use crate::config::Params;
use crate::error::ThesaurusError;
use crate::similarity::Similarity;
use crate::writer::ThesaurusWriter;
use rayon::{prelude::*, ThreadPoolBuilder};
use std::io::Write;

/// Neighbours of the words processed since the last flush, in processing order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ThesaurusBuffer {
    entries: Vec<(String, Vec<(String, f64)>)>,
}

impl ThesaurusBuffer {

    pub fn push(&mut self, word: String, neighbours: Vec<(String, f64)>) {
        self.entries.push((word, neighbours));
    }

    pub fn entries(&self) -> &[(String, Vec<(String, f64)>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildStats {
    pub words: usize,
    pub lines: usize,
    /// number of words written by each flush, the trailing flush included
    pub batches: Vec<usize>,
}

impl BuildStats {
    pub fn flushes(&self) -> usize {
        self.batches.len()
    }
}

pub struct Thesaurus {}

impl Thesaurus {

    /// Queries the `top_k` neighbours of every vocabulary word, in vocabulary
    /// order, and writes them out every `flush_every` words plus once more
    /// after the last word.
    pub fn build<W: Write>(sim: &Similarity, params: &Params, wrt: &mut ThesaurusWriter<W>) -> Result<BuildStats, ThesaurusError> {

        let vocab = sim.model().vocab();
        let threshold = params.flush_threshold();
        let lines_before = wrt.lines();

        // queries of one batch are answered by the pool, results come back in vocabulary order
        let pool = ThreadPoolBuilder::new().num_threads(params.num_threads).build()?;
        let order: Vec<usize> = (0..vocab.len()).collect();

        let mut buffer = ThesaurusBuffer::default();
        let mut batches: Vec<usize> = Vec::new();
        let mut counter: usize = 0;

        for chunk in order.chunks(params.flush_every) {

            let answers: Vec<Vec<(usize, f64)>> = pool.install(|| {
                chunk.par_iter().map(|i| sim.most_similar(*i, params.top_k)).collect()
            });

            for (i, answer) in chunk.iter().zip(answers) {

                let neighbours = answer
                    .into_iter()
                    .map(|(j, score)| (vocab[j].to_owned(), score))
                    .collect();
                buffer.push(vocab[*i].to_owned(), neighbours);

                if counter == threshold {
                    wrt.write_buffer(&buffer)?;
                    batches.push(buffer.len());
                    buffer.clear();
                    counter = 0;
                } else {
                    counter += 1;
                }
            }
        }

        // remainder after the last full batch, possibly empty
        wrt.write_buffer(&buffer)?;
        batches.push(buffer.len());
        buffer.clear();

        Ok(BuildStats {
            words: vocab.len(),
            lines: wrt.lines() - lines_before,
            batches,
        })
    }

}


#[cfg(test)]
mod tests {

    use super::Thesaurus;
    use crate::config::Params;
    use crate::model::Model;
    use crate::similarity::Similarity;
    use crate::writer::ThesaurusWriter;
    use ndarray::{array, Array};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;

    // seeded so a failing case can be replayed
    fn random_model(n: usize, dim: usize) -> Model {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let w = Array::random_using((n, dim), Uniform::new(-1.0f32, 1.0), &mut rng);
        let words = (0..n).map(|i| format!("word{}", i)).collect();
        Model::from_parts(words, w).unwrap()
    }

    fn build_to_string(model: &Model, params: &Params) -> (String, super::BuildStats) {
        let sim = Similarity::new(model);
        let mut wrt = ThesaurusWriter::new(Vec::new());
        let stats = Thesaurus::build(&sim, params, &mut wrt).unwrap();
        let out = String::from_utf8(wrt.close().unwrap()).unwrap();
        (out, stats)
    }

    fn first_column_counts(out: &str) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for line in out.lines() {
            let word = line.split('\t').next().unwrap();
            *counts.entry(word).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn small_vocabulary_clamps_neighbours() {

        let words = vec!["cat".to_string(), "dog".to_string(), "car".to_string()];
        let model = Model::from_parts(words, array![[1.0f32, 0.5, 0.0], [0.9, 0.7, 0.1], [-0.2, 0.1, 1.0]]).unwrap();
        let sim = Similarity::new(&model);
        let (out, stats) = build_to_string(&model, &Params::default());

        assert_eq!(stats.words, 3);
        assert_eq!(stats.lines, 6);
        assert_eq!(stats.batches, vec![3]);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        let expected_words = ["cat", "cat", "dog", "dog", "car", "car"];
        for (line, word) in lines.iter().zip(expected_words) {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[0], word);
            assert_ne!(fields[0], fields[1]);

            let a = model.index_of(fields[0]).unwrap();
            let b = model.index_of(fields[1]).unwrap();
            let score: f64 = fields[2].parse().unwrap();
            assert!((score - sim.similarity(a, b)).abs() < 1e-6);
        }
    }

    #[test]
    fn flushes_on_every_full_batch_and_once_after() {

        let model = random_model(2002, 4);
        let params = Params { top_k: 5, ..Params::default() };
        let (out, stats) = build_to_string(&model, &params);

        // two full batches, then an empty remainder
        assert_eq!(stats.batches, vec![1001, 1001, 0]);
        assert_eq!(stats.flushes(), 3);
        assert_eq!(stats.lines, 2002 * 5);
        assert_eq!(out.lines().count(), 2002 * 5);

        let counts = first_column_counts(&out);
        assert_eq!(counts.len(), 2002);
        assert!(counts.values().all(|c| *c == 5));
    }

    #[test]
    fn partial_batch_goes_to_trailing_flush() {

        let model = random_model(7, 3);
        let params = Params { flush_every: 3, top_k: 200, ..Params::default() };
        let (out, stats) = build_to_string(&model, &params);

        assert_eq!(stats.batches, vec![3, 3, 1]);
        assert_eq!(stats.lines, 7 * 6);

        // rows keep vocabulary order across flushes
        let firsts: Vec<&str> = out.lines().step_by(6).map(|l| l.split('\t').next().unwrap()).collect();
        let vocab: Vec<&str> = model.vocab().iter().map(|w| w.as_str()).collect();
        assert_eq!(firsts, vocab);
    }

    #[test]
    fn output_is_identical_across_runs_and_thread_counts() {

        let model = random_model(300, 8);
        let single = Params { top_k: 20, flush_every: 64, ..Params::default() };
        let pooled = Params { num_threads: 4, ..single.clone() };

        let (first, _) = build_to_string(&model, &single);
        let (second, _) = build_to_string(&model, &single);
        let (threaded, _) = build_to_string(&model, &pooled);

        assert_eq!(first, second);
        assert_eq!(first, threaded);
    }

    #[test]
    fn empty_vocabulary_writes_nothing() {

        let model = Model::from_parts(Vec::new(), ndarray::Array2::zeros((0, 3))).unwrap();
        let (out, stats) = build_to_string(&model, &Params::default());
        assert!(out.is_empty());
        assert_eq!(stats.batches, vec![0]);
    }
}
