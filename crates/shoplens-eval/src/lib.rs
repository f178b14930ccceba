//! Evaluation engines: LLM-as-judge scoring, the response-synthesizer seam,
//! and the deterministic hallucination detector.

pub mod chat;
pub mod halluc;
pub mod judge;
pub mod synth;

pub use chat::{ChatModel, GenaiModel, ScriptedModel};
pub use halluc::{check_claims, extract_claims, ItemClaim, PRICE_TOLERANCE};
pub use judge::Judge;
pub use synth::{LlmSynthesizer, Synthesizer};
