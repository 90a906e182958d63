use crate::error::EmbeddingError;

const DEFAULT: usize = 128;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

pub const SENTENCE_MODEL_NAME: &str = "all-MiniLM-L6-v2";

pub trait Embedder {
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

pub fn validate_batch(
    vectors: &[Vec<f32>],
    expected_count: usize,
    dimensions: usize,
) -> Result<(), EmbeddingError> {
    if vectors.len() != expected_count {
        return Err(EmbeddingError::CountMismatch {
            expected: expected_count,
            actual: vectors.len(),
        });
    }

    for (row, vector) in vectors.iter().enumerate() {
        if vector.len() != dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimensions,
                actual: vector.len(),
            });
        }

        if let Some(column) = vector.iter().position(|value| !value.is_finite()) {
            return Err(EmbeddingError::NonFinite { row, column });
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl CharacterNgramEmbedder {
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions.max(1)
    }

    fn model_name(&self) -> &str {
        "char-trigram-hashed"
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}

#[cfg(feature = "fastembed")]
pub use sentence::SentenceEmbedder;

#[cfg(feature = "fastembed")]
mod sentence {
    use super::{validate_batch, Embedder, SENTENCE_MODEL_NAME};
    use crate::error::EmbeddingError;
    use fastembed::{EmbeddingModel, ModelTrait, TextEmbedding, TextInitOptions};
    use parking_lot::Mutex;

    pub struct SentenceEmbedder {
        model: Mutex<TextEmbedding>,
        dimensions: usize,
    }

    impl SentenceEmbedder {
        pub fn try_new() -> Result<Self, EmbeddingError> {
            let model_name = EmbeddingModel::AllMiniLML6V2;
            let dimensions = EmbeddingModel::get_model_info(&model_name)
                .ok_or_else(|| backend_error(format!("model metadata missing for {model_name}")))?
                .dim;

            let options = TextInitOptions::new(model_name).with_show_download_progress(false);
            let model = TextEmbedding::try_new(options)
                .map_err(|error| backend_error(error.to_string()))?;

            Ok(Self {
                model: Mutex::new(model),
                dimensions,
            })
        }
    }

    impl Embedder for SentenceEmbedder {
        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn model_name(&self) -> &str {
            SENTENCE_MODEL_NAME
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let vectors = self
                .model
                .lock()
                .embed(texts.to_vec(), None)
                .map_err(|error| backend_error(error.to_string()))?;

            validate_batch(&vectors, texts.len(), self.dimensions)?;
            Ok(vectors)
        }
    }

    fn backend_error(details: String) -> EmbeddingError {
        EmbeddingError::Backend {
            backend: "fastembed".to_string(),
            details,
        }
    }
}
