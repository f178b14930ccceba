use thiserror::Error;

/// Failure taxonomy for the benchmark pipeline.
///
/// Everything except `Validation` is scoped to a single query (or a single
/// path of a single query); `Validation` means the ground-truth dataset
/// itself is malformed and the whole run must abort.
#[derive(Debug, Error)]
pub enum Error {
    #[error("retrieval failure: {0}")]
    Retrieval(String),

    #[error("scrape failure: {0}")]
    Scrape(String),

    #[error("synthesis failure: {0}")]
    Synthesis(String),

    #[error("judge output unparseable: {0}")]
    JudgeParse(String),

    #[error("invalid dataset: {0}")]
    Validation(String),

    #[error("query timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
