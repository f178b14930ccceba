//! Embedding functions for item descriptions and query text.
//!
//! Two implementations of the core `Embedder` trait:
//! - `BgeEmbedder`: BGE-M3 (XLM-RoBERTa) via candle, loaded from local
//!   model files.
//! - `HashEmbedder`: deterministic token-bucket embedding, no model files.
//!   Selected with `APP_USE_HASH_EMBEDDINGS=1`; the default for tests and
//!   offline runs, and sufficient for the benchmark's determinism
//!   guarantees.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use shoplens_core::traits::Embedder;

pub const EMBEDDING_DIM: usize = 1024;

pub struct BgeEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl BgeEmbedder {
    pub fn new() -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir()?;
        tracing::info!(dir = %model_dir.display(), "loading BGE-M3 model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!(
                "Failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            )
        })?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        tracing::info!("BGE-M3 model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let max_len = 256usize;
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, max_len, &self.device)?;
        let token_type_ids = Tensor::zeros((1, max_len), DType::I64, &self.device)?;
        let hidden = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = pool::masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != EMBEDDING_DIM {
            anyhow::bail!("unexpected embedding dim {}", emb.len());
        }
        Ok(emb)
    }
}

impl Embedder for BgeEmbedder {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

/// Deterministic embedding: each whitespace token is hashed into a bucket
/// with a seeded xxhash, accumulated, then L2-normalized. Identical text
/// always yields the identical vector.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| Ok(self.embed_text(t))).collect()
    }
}

impl HashEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for (i, token) in text.to_lowercase().split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

pub fn default_embedder() -> Result<Box<dyn Embedder>> {
    let use_hash = std::env::var("APP_USE_HASH_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_hash {
        tracing::info!("using deterministic hash embedder");
        return Ok(Box::new(HashEmbedder::default()));
    }
    Ok(Box::new(BgeEmbedder::new()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let root = Path::new("models/bge-m3");
    if root.exists() {
        return Ok(root.to_path_buf());
    }
    Err(anyhow!("Could not locate BGE-M3 model directory"))
}
