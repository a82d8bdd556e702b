//! Paragraph vectors (PV-DBOW) trained with negative sampling.
//!
//! Each training document owns a vector that is trained to predict the words
//! it contains. Unseen texts are vectorized by inference: a fresh document
//! vector is fitted against the frozen output weights.

use std::collections::HashMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::util::persist::{load_object, save_object};
use crate::vectorization::{Vectorizer, simple_preprocess};

/// Training parameters of a [`Doc2VecVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doc2VecConfig {
    /// Dimension of the document vectors
    pub vector_size: usize,
    /// Words seen fewer times are ignored
    pub min_count: usize,
    pub epochs: usize,
    pub seed: u64,
    /// Context window when word vectors are trained alongside documents
    pub window: usize,
    /// Negative samples per positive example
    pub negative: usize,
    /// Initial learning rate, decaying linearly to `min_alpha`
    pub alpha: f32,
    pub min_alpha: f32,
    /// Also train skip-gram word vectors, interleaved with the documents
    pub dbow_words: bool,
}

impl Default for Doc2VecConfig {
    fn default() -> Self {
        Doc2VecConfig {
            vector_size: 100,
            min_count: 5,
            epochs: 20,
            seed: 1,
            window: 5,
            negative: 5,
            alpha: 0.025,
            min_alpha: 0.0001,
            dbow_words: false,
        }
    }
}

/// Parameters of [`Doc2VecVectorizer::vectorize_text`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceParams {
    pub alpha: f32,
    pub steps: usize,
    pub seed: u64,
}

impl Default for InferenceParams {
    fn default() -> Self {
        InferenceParams {
            alpha: 0.025,
            steps: 50,
            seed: 13,
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Doc2Vec model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doc2VecVectorizer {
    config: Doc2VecConfig,
    /// Raw counts of every word seen, kept or not, for vocabulary updates
    counts: HashMap<String, usize>,
    vocabulary: Vec<String>,
    word_index: HashMap<String, usize>,
    /// Cumulative unigram distribution (counts^0.75) for negative sampling
    noise: Vec<f64>,
    doc_vectors: Vec<Vec<f32>>,
    word_vectors: Vec<Vec<f32>>,
    output_weights: Vec<Vec<f32>>,
}

impl Doc2VecVectorizer {
    pub fn new(config: Doc2VecConfig) -> Result<Self> {
        if config.vector_size == 0 {
            return Err(ContextoError::invalid_argument("vector_size must be positive"));
        }
        Ok(Doc2VecVectorizer {
            config,
            counts: HashMap::new(),
            vocabulary: Vec::new(),
            word_index: HashMap::new(),
            noise: Vec::new(),
            doc_vectors: Vec::new(),
            word_vectors: Vec::new(),
            output_weights: Vec::new(),
        })
    }

    /// Restore a model saved with [`Doc2VecVectorizer::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_object(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_object(self, path)
    }

    pub fn config(&self) -> &Doc2VecConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Vectors learned for the training documents, in training order.
    pub fn document_vectors(&self) -> &[Vec<f32>] {
        &self.doc_vectors
    }

    /// Train on `corpus`.
    ///
    /// With `update`, words and documents are added to an already trained
    /// model; otherwise the model is rebuilt from scratch. The trained model
    /// is saved to `output` when given.
    pub fn train(&mut self, corpus: &[&str], update: bool, output: Option<&Path>) -> Result<()> {
        let documents: Vec<Vec<String>> = corpus
            .iter()
            .map(|text| simple_preprocess(text, 2, 15, false))
            .collect();

        if !update || !self.is_trained() {
            let config = self.config.clone();
            *self = Doc2VecVectorizer::new(config)?;
        }
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        self.build_vocabulary(&documents, &mut rng)?;

        let first_doc = self.doc_vectors.len();
        for _ in &documents {
            let vector = self.random_vector(&mut rng);
            self.doc_vectors.push(vector);
        }

        let encoded: Vec<Vec<usize>> = documents.iter().map(|doc| self.encode(doc)).collect();
        let total_steps = (self.config.epochs * encoded.len()).max(1);
        let mut step = 0usize;

        for _ in 0..self.config.epochs {
            for (i, words) in encoded.iter().enumerate() {
                let alpha = self.learning_rate(self.config.alpha, step, total_steps);
                step += 1;

                let mut doc_vector = std::mem::take(&mut self.doc_vectors[first_doc + i]);
                for &word in words {
                    self.train_pair(&mut doc_vector, word, alpha, true, &mut rng);
                }
                self.doc_vectors[first_doc + i] = doc_vector;

                if self.config.dbow_words {
                    self.train_skip_gram(words, alpha, &mut rng);
                }
            }
        }

        log::info!(
            "Trained Doc2Vec on {} documents, {} words, {} epochs",
            documents.len(),
            self.vocabulary.len(),
            self.config.epochs
        );

        if let Some(path) = output {
            self.save(path)?;
        }
        Ok(())
    }

    /// Infer the vector of an unseen text.
    pub fn vectorize_text(&self, text: &str, params: InferenceParams) -> Result<Vec<f32>> {
        if !self.is_trained() {
            return Err(ContextoError::not_fitted("Doc2VecVectorizer"));
        }
        let words = self.encode(&simple_preprocess(text, 2, 15, false));
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut doc_vector = self.random_vector(&mut rng);

        let steps = params.steps.max(1);
        for step in 0..steps {
            let alpha = self.learning_rate(params.alpha, step, steps);
            for &word in &words {
                let mut neu1e = vec![0.0; self.config.vector_size];
                for (target, label) in self.samples(word, &mut rng) {
                    let weights = &self.output_weights[target];
                    let g = (label - sigmoid(dot(&doc_vector, weights))) * alpha;
                    neu1e.iter_mut().zip(weights).for_each(|(e, w)| *e += g * w);
                }
                doc_vector.iter_mut().zip(&neu1e).for_each(|(d, e)| *d += e);
            }
        }
        Ok(doc_vector)
    }

    fn learning_rate(&self, alpha: f32, step: usize, total: usize) -> f32 {
        let progress = step as f32 / total as f32;
        (alpha - (alpha - self.config.min_alpha) * progress).max(self.config.min_alpha)
    }

    fn random_vector(&self, rng: &mut StdRng) -> Vec<f32> {
        let size = self.config.vector_size;
        (0..size)
            .map(|_| (rng.random::<f32>() - 0.5) / size as f32)
            .collect()
    }

    fn encode(&self, words: &[String]) -> Vec<usize> {
        words
            .iter()
            .filter_map(|word| self.word_index.get(word).copied())
            .collect()
    }

    fn build_vocabulary(&mut self, documents: &[Vec<String>], rng: &mut StdRng) -> Result<()> {
        for word in documents.iter().flatten() {
            *self.counts.entry(word.clone()).or_insert(0) += 1;
        }

        let mut new_words: Vec<&String> = self
            .counts
            .iter()
            .filter(|(word, count)| {
                **count >= self.config.min_count && !self.word_index.contains_key(*word)
            })
            .map(|(word, _)| word)
            .collect();
        new_words.sort();
        let new_words: Vec<String> = new_words.into_iter().cloned().collect();

        for word in new_words {
            self.word_index.insert(word.clone(), self.vocabulary.len());
            self.vocabulary.push(word);
            self.output_weights.push(vec![0.0; self.config.vector_size]);
            let vector = self.random_vector(rng);
            self.word_vectors.push(vector);
        }

        if self.vocabulary.is_empty() {
            return Err(ContextoError::vectorization(format!(
                "No word appears at least {} times in the corpus",
                self.config.min_count
            )));
        }

        let mut cumulative = 0.0;
        self.noise = self
            .vocabulary
            .iter()
            .map(|word| {
                cumulative += (self.counts[word] as f64).powf(0.75);
                cumulative
            })
            .collect();
        Ok(())
    }

    fn sample_noise(&self, rng: &mut StdRng) -> usize {
        let total = self.noise.last().copied().unwrap_or(0.0);
        let target = rng.random::<f64>() * total;
        self.noise
            .partition_point(|&c| c <= target)
            .min(self.vocabulary.len() - 1)
    }

    /// The positive example followed by `negative` noise words.
    fn samples(&self, word: usize, rng: &mut StdRng) -> Vec<(usize, f32)> {
        let mut samples = vec![(word, 1.0)];
        for _ in 0..self.config.negative {
            let noise = self.sample_noise(rng);
            if noise != word {
                samples.push((noise, 0.0));
            }
        }
        samples
    }

    /// One negative-sampling update of `input` predicting `word`.
    fn train_pair(&mut self, input: &mut [f32], word: usize, alpha: f32, learn_output: bool, rng: &mut StdRng) {
        let mut neu1e = vec![0.0; self.config.vector_size];
        for (target, label) in self.samples(word, rng) {
            let weights = &mut self.output_weights[target];
            let g = (label - sigmoid(dot(input, weights))) * alpha;
            neu1e.iter_mut().zip(weights.iter()).for_each(|(e, w)| *e += g * w);
            if learn_output {
                weights.iter_mut().zip(input.iter()).for_each(|(w, i)| *w += g * i);
            }
        }
        input.iter_mut().zip(&neu1e).for_each(|(i, e)| *i += e);
    }

    fn train_skip_gram(&mut self, words: &[usize], alpha: f32, rng: &mut StdRng) {
        let window = self.config.window;
        for (pos, &center) in words.iter().enumerate() {
            let start = pos.saturating_sub(window);
            let end = (pos + window + 1).min(words.len());
            for (ctx_pos, &context) in words.iter().enumerate().take(end).skip(start) {
                if ctx_pos == pos {
                    continue;
                }
                let mut input = std::mem::take(&mut self.word_vectors[context]);
                self.train_pair(&mut input, center, alpha, true, rng);
                self.word_vectors[context] = input;
            }
        }
    }
}

impl Vectorizer for Doc2VecVectorizer {
    fn vectorize(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| self.vectorize_text(text, InferenceParams::default()))
            .collect()
    }

    fn name(&self) -> &'static str {
        "doc2vec"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorization::cosine_similarity;
    use tempfile::TempDir;

    fn corpus() -> Vec<&'static str> {
        vec![
            "el perro ladra y el perro corre en el parque",
            "el gato duerme y el gato come en la casa",
            "el perro corre y ladra en el parque grande",
            "el gato come y duerme en la casa grande",
        ]
    }

    fn config() -> Doc2VecConfig {
        Doc2VecConfig {
            vector_size: 16,
            min_count: 1,
            epochs: 50,
            ..Doc2VecConfig::default()
        }
    }

    #[test]
    fn test_train_and_infer() {
        let mut model = Doc2VecVectorizer::new(config()).unwrap();
        model.train(&corpus(), false, None).unwrap();

        assert!(model.is_trained());
        assert_eq!(model.document_vectors().len(), 4);
        assert!(model.vocabulary().contains(&"perro".to_string()));

        let vector = model.vectorize_text("el perro ladra", InferenceParams::default()).unwrap();
        assert_eq!(vector.len(), 16);
        assert!(vector.iter().all(|x| x.is_finite()));

        // Same seed, same vector
        let again = model.vectorize_text("el perro ladra", InferenceParams::default()).unwrap();
        assert_eq!(vector, again);
    }

    #[test]
    fn test_similar_documents_are_closer() {
        let mut model = Doc2VecVectorizer::new(Doc2VecConfig {
            epochs: 200,
            ..config()
        })
        .unwrap();
        model.train(&corpus(), false, None).unwrap();

        let docs = model.document_vectors();
        let same_topic = cosine_similarity(&docs[0], &docs[2]);
        let other_topic = cosine_similarity(&docs[0], &docs[1]);
        assert!(same_topic > other_topic);
    }

    #[test]
    fn test_update_extends_vocabulary() {
        let mut model = Doc2VecVectorizer::new(config()).unwrap();
        model.train(&corpus(), false, None).unwrap();
        let words = model.vocabulary().len();

        model.train(&["el caballo galopa"], true, None).unwrap();
        assert!(model.vocabulary().len() > words);
        assert_eq!(model.document_vectors().len(), 5);

        model.train(&["el caballo galopa"], false, None).unwrap();
        assert_eq!(model.document_vectors().len(), 1);
    }

    #[test]
    fn test_errors() {
        let model = Doc2VecVectorizer::new(config()).unwrap();
        assert!(model.vectorize(&["hola"]).is_err());

        let mut model = Doc2VecVectorizer::new(Doc2VecConfig::default()).unwrap();
        assert!(model.train(&["una sola frase"], false, None).is_err());
        assert!(Doc2VecVectorizer::new(Doc2VecConfig { vector_size: 0, ..config() }).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc2vec.bin");

        let mut model = Doc2VecVectorizer::new(config()).unwrap();
        model.train(&corpus(), false, Some(&path)).unwrap();

        let loaded = Doc2VecVectorizer::load(&path).unwrap();
        let params = InferenceParams::default();
        assert_eq!(
            loaded.vectorize_text("el gato come", params).unwrap(),
            model.vectorize_text("el gato come", params).unwrap()
        );
    }
}
