//! Embedding service trait and implementations.
//!
//! - `OnnxEmbeddingService` loads a sentence-transformer ONNX model (e.g.
//!   all-mpnet-base-v2) via ort and tokenizes with the HuggingFace
//!   tokenizers crate. This is the production embedding backend.
//! - `MockEmbedding` provides deterministic bag-of-tokens vectors for
//!   testing, so related texts overlap and identical texts embed identically.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Arc, Mutex};

use novelty_core::error::NoveltyError;
use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;
use tracing::info;

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors that capture
/// semantic meaning. The same service is used for ingestion and for checks,
/// so a corpus is only ever compared against vectors from one model.
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    ///
    /// Fails with `NoveltyError::Embedding` when the input is empty after
    /// normalization or the underlying model is unavailable.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, NoveltyError>> + Send;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// Because `EmbeddingService::embed` returns `impl Future` it is not
/// object-safe. This trait uses a boxed future instead, allowing
/// `Arc<dyn DynEmbeddingService>` to be stored in structs without generics.
///
/// A blanket implementation is provided so that every `EmbeddingService`
/// automatically implements `DynEmbeddingService`.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, NoveltyError>> + Send + 'a>,
    >;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Blanket impl: any `EmbeddingService` automatically implements `DynEmbeddingService`.
impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, NoveltyError>> + Send + 'a>,
    > {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingService::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// OnnxEmbeddingService - real ONNX Runtime inference
// ---------------------------------------------------------------------------

/// ONNX Runtime-backed embedding service using a sentence-transformer model.
///
/// Expects a model directory containing:
/// - `model.onnx`  — the sentence-transformer ONNX export
/// - `tokenizer.json` — the HuggingFace fast-tokenizer file
///
/// The model should accept `input_ids`, `attention_mask`, and
/// `token_type_ids` as i64 inputs and produce token-level embeddings.
/// Mean pooling (masked) is applied to produce a single vector per input.
///
/// Loading the model is the expensive part, so a deployment constructs one
/// service at startup and shares it via `Arc` across requests.
pub struct OnnxEmbeddingService {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    dimensions: usize,
}

// ort::Session is Send + Sync internally (uses Arc<SharedSessionInner>).
unsafe impl Send for OnnxEmbeddingService {}
unsafe impl Sync for OnnxEmbeddingService {}

impl std::fmt::Debug for OnnxEmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingService")
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OnnxEmbeddingService {
    /// Load a sentence-transformer model from the given directory.
    ///
    /// The directory must contain `model.onnx` and `tokenizer.json`.
    pub fn from_directory(model_dir: &Path) -> Result<Self, NoveltyError> {
        Self::from_files(
            &model_dir.join("model.onnx"),
            &model_dir.join("tokenizer.json"),
        )
    }

    /// Load from explicit model and tokenizer file paths.
    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self, NoveltyError> {
        if !model_path.exists() {
            return Err(NoveltyError::Embedding(format!(
                "ONNX model not found at {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(NoveltyError::Embedding(format!(
                "Tokenizer not found at {}",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| NoveltyError::Embedding(format!("ONNX session builder: {}", e)))?
            .with_intra_threads(1)
            .map_err(|e| NoveltyError::Embedding(format!("ONNX set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| NoveltyError::Embedding(format!("ONNX load model: {}", e)))?;

        // Detect output dimensions from the model output type.
        // Sentence-transformer output is typically [batch, seq_len, hidden_dim].
        let dimensions = session
            .outputs()
            .first()
            .and_then(|out| out.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .map(|d| if d > 0 { d as usize } else { 768 })
            .unwrap_or(768);

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| NoveltyError::Embedding(format!("Failed to load tokenizer: {}", e)))?;

        info!(
            model = %model_path.display(),
            dimensions,
            "Loaded ONNX embedding model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            dimensions,
        })
    }

    /// Tokenize, run inference, and mean-pool the output.
    fn embed_sync(&self, text: &str) -> Result<Vec<f32>, NoveltyError> {
        if text.trim().is_empty() {
            return Err(NoveltyError::Embedding(
                "Cannot embed empty text".to_string(),
            ));
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| NoveltyError::Embedding(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let seq_len = input_ids.len();

        // Create ndarray views with shape [1, seq_len] for batch size 1.
        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| NoveltyError::Embedding(format!("input_ids array: {}", e)))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone())
            .map_err(|e| NoveltyError::Embedding(format!("attention_mask array: {}", e)))?;
        let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| NoveltyError::Embedding(format!("token_type_ids array: {}", e)))?;

        let ids_ref = TensorRef::from_array_view(&ids_array)
            .map_err(|e| NoveltyError::Embedding(format!("TensorRef input_ids: {}", e)))?;
        let mask_ref = TensorRef::from_array_view(&mask_array)
            .map_err(|e| NoveltyError::Embedding(format!("TensorRef attention_mask: {}", e)))?;
        let type_ref = TensorRef::from_array_view(&type_array)
            .map_err(|e| NoveltyError::Embedding(format!("TensorRef token_type_ids: {}", e)))?;

        // Run inference: input_ids, attention_mask, token_type_ids
        let mut session = self
            .session
            .lock()
            .map_err(|e| NoveltyError::Embedding(format!("Session lock poisoned: {}", e)))?;
        let outputs = session
            .run(ort::inputs![ids_ref, mask_ref, type_ref])
            .map_err(|e| NoveltyError::Embedding(format!("ONNX inference failed: {}", e)))?;

        // Extract token embeddings as flat slice: [1, seq_len, hidden_dim].
        // ort 2.0 try_extract_tensor returns (&Shape, &[f32]).
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| NoveltyError::Embedding(format!("Extract embeddings: {}", e)))?;

        let shape_dims: Vec<i64> = shape.iter().copied().collect();
        if shape_dims.len() < 2 {
            return Err(NoveltyError::Embedding(format!(
                "Unexpected output shape: {:?}",
                shape_dims
            )));
        }

        let hidden_dim = *shape_dims.last().unwrap() as usize;

        // Mean pooling over the sequence dimension, masked by attention_mask.
        let mut pooled = vec![0.0f32; hidden_dim];
        let mut count = 0.0f32;

        for (tok_idx, &mask_val) in attention_mask.iter().enumerate() {
            if mask_val > 0 {
                let offset = tok_idx * hidden_dim;
                for dim in 0..hidden_dim {
                    pooled[dim] += data[offset + dim];
                }
                count += 1.0;
            }
        }

        if count > 0.0 {
            for val in &mut pooled {
                *val /= count;
            }
        }

        // L2-normalize the embedding.
        let norm: f32 = pooled.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut pooled {
                *val /= norm;
            }
        }

        Ok(pooled)
    }
}

impl EmbeddingService for OnnxEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, NoveltyError> {
        // ONNX Runtime inference is CPU-bound; run on a blocking thread.
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let dims = self.dimensions;
        let text_owned = text.to_string();

        tokio::task::spawn_blocking(move || {
            let svc = OnnxEmbeddingService {
                session,
                tokenizer,
                dimensions: dims,
            };
            svc.embed_sync(&text_owned)
        })
        .await
        .map_err(|e| NoveltyError::Embedding(format!("Embedding task panicked: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// MockEmbedding - deterministic bag-of-tokens vectors for testing
// ---------------------------------------------------------------------------

/// Mock embedding service that returns deterministic token-bucket vectors.
///
/// Each lowercased alphanumeric token is hashed into a bucket, counted, and
/// the counts are L2-normalized. Identical texts produce identical unit
/// vectors, texts sharing vocabulary have positive cosine similarity, and
/// disjoint texts land near zero. This allows exercising scoring, upsert,
/// and search semantics without a real model.
#[derive(Debug, Clone)]
pub struct MockEmbedding {
    dimensions: usize,
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbedding {
    /// Create a mock service matching the production 768-dim model.
    pub fn new() -> Self {
        Self { dimensions: 768 }
    }

    /// Create a mock service with an explicit vector dimension.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn token_vector(&self, text: &str) -> Vec<f32> {
        let mut result = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            result[bucket] += 1.0;
        }

        // L2-normalize to produce unit vectors (matching OnnxEmbeddingService).
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingService for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, NoveltyError> {
        let vector = self.token_vector(text);
        if vector.iter().all(|v| *v == 0.0) {
            return Err(NoveltyError::Embedding(
                "Cannot embed empty text".to_string(),
            ));
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_mock_embedding_dimension() {
        let service = MockEmbedding::new();
        let vec = service.embed("hello world").await.unwrap();
        assert_eq!(vec.len(), 768);
    }

    #[tokio::test]
    async fn test_mock_embedding_deterministic() {
        let service = MockEmbedding::new();
        let v1 = service.embed("same text").await.unwrap();
        let v2 = service.embed("same text").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_mock_embedding_unit_norm() {
        let service = MockEmbedding::new();
        let vec = service.embed("a unit length embedding vector").await.unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mock_embedding_overlap_scores_higher() {
        let service = MockEmbedding::new();
        let base = service
            .embed("solar panel efficiency coatings")
            .await
            .unwrap();
        let related = service
            .embed("improved solar panel coatings research")
            .await
            .unwrap();
        let unrelated = service
            .embed("submarine cable fault detection methods")
            .await
            .unwrap();

        assert!(cosine(&base, &related) > cosine(&base, &unrelated));
        assert!(cosine(&base, &related) > 0.3);
    }

    #[tokio::test]
    async fn test_mock_embedding_case_insensitive_tokens() {
        let service = MockEmbedding::new();
        let v1 = service.embed("Solar Panel").await.unwrap();
        let v2 = service.embed("solar panel").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_mock_embedding_empty_text() {
        let service = MockEmbedding::new();
        assert!(service.embed("").await.is_err());
        // Punctuation-only input has no tokens after normalization.
        assert!(service.embed("... --- !!!").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_custom_dimensions() {
        let service = MockEmbedding::with_dimensions(32);
        let vec = service.embed("small vector space").await.unwrap();
        assert_eq!(vec.len(), 32);
        assert_eq!(EmbeddingService::dimensions(&service), 32);
    }

    #[tokio::test]
    async fn test_dyn_embedding_service_blanket_impl() {
        let service: Arc<dyn DynEmbeddingService> = Arc::new(MockEmbedding::new());
        let vec = service.embed_boxed("dynamic dispatch input").await.unwrap();
        assert_eq!(vec.len(), service.dimensions());
    }

    #[test]
    fn test_onnx_missing_model() {
        let result = OnnxEmbeddingService::from_directory(Path::new("/nonexistent"));
        assert!(result.is_err());
    }
}
