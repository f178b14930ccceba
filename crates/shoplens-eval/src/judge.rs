//! LLM-as-judge scoring on fixed rubrics.
//!
//! Two independent calls per path per query: retrieval quality over the
//! ordered item summaries, response quality over the synthesized answer
//! plus the same summaries. Judge output is free-form text carrying one
//! JSON object; parsing failures get exactly one retry with a stricter
//! instruction, after which the metric set is excluded (never defaulted).
//! Scoring is single-shot per query; see DESIGN.md for the median-of-N
//! decision.

use std::sync::Arc;

use shoplens_core::error::{Error, Result};
use shoplens_core::types::{ResponseScores, RetrievalScores};

use crate::chat::ChatModel;

const JUDGE_SYSTEM: &str = "You are an expert evaluator for an e-commerce product search system. Respond with valid JSON only.";

const RETRIEVAL_RUBRIC: &str = r#"Evaluate the RETRIEVAL QUALITY - how relevant are the retrieved products to the user's query?

## User Query
{query}

## Retrieved Products
{products}

## Scoring Criteria (1-5 scale)

1. **RELEVANCE**: How relevant are these products to what the user asked for? (5=perfectly relevant, 1=completely irrelevant)
2. **COVERAGE**: Do the results cover the user's needs? (5=comprehensive, 1=missing key products)
3. **PRECISION**: Are ALL returned products relevant, or are there irrelevant ones? (5=all relevant, 1=mostly irrelevant)

IMPORTANT: If NO products were retrieved, or very few products (0-1), score LOW on all metrics.
A system that fails to find products is NOT performing well, even if it avoids errors.

Respond ONLY with JSON:
{"relevance": <1-5>, "coverage": <1-5>, "precision": <1-5>, "reasoning": "<brief explanation>"}"#;

const RESPONSE_RUBRIC: &str = r#"Evaluate the RESPONSE QUALITY - how good is the assistant's answer?

## User Query
{query}

## System Response
{response}

## Products Used as Context
{products}

## Scoring Criteria (1-5 scale)

1. **ACCURACY**: Does the response accurately reflect the product data? (5=completely accurate, 1=inaccurate)
2. **HALLUCINATION** (5=none, 1=severe): Does it invent facts NOT in the product data?
3. **HELPFULNESS**: How useful is this response for a real shopper? (5=very helpful, 1=not helpful)
4. **COMPLETENESS**: Does it fully answer the user's question? (5=complete, 1=incomplete)

IMPORTANT SCORING RULES:
- If the response says "I don't know", "I can't help", or similar evasive answers, score HELPFULNESS and COMPLETENESS as 1.
- A response that TRIES to help with specific products should score higher than one that refuses to answer.

Respond ONLY with JSON:
{"accuracy": <1-5>, "hallucination": <1-5>, "helpfulness": <1-5>, "completeness": <1-5>, "reasoning": "<brief explanation>"}"#;

const STRICT_RETRY: &str = "\n\nYour previous reply could not be parsed. Respond with exactly one JSON object and nothing else - no prose, no code fences.";

pub struct Judge {
    model: Arc<dyn ChatModel>,
}

impl Judge {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn evaluate_retrieval(
        &self,
        query_text: &str,
        item_summaries: &[String],
    ) -> Result<RetrievalScores> {
        let prompt = RETRIEVAL_RUBRIC
            .replace("{query}", query_text)
            .replace("{products}", &format_products(item_summaries));
        let value = self
            .call_with_retry(&prompt, &["relevance", "coverage", "precision"])
            .await?;
        Ok(RetrievalScores {
            relevance: metric(&value, "relevance")?,
            coverage: metric(&value, "coverage")?,
            precision: metric(&value, "precision")?,
            reasoning: reasoning(&value),
        })
    }

    pub async fn evaluate_response(
        &self,
        query_text: &str,
        answer_text: &str,
        item_summaries: &[String],
    ) -> Result<ResponseScores> {
        let prompt = RESPONSE_RUBRIC
            .replace("{query}", query_text)
            .replace("{response}", answer_text)
            .replace("{products}", &format_products(item_summaries));
        let value = self
            .call_with_retry(
                &prompt,
                &["accuracy", "hallucination", "helpfulness", "completeness"],
            )
            .await?;
        Ok(ResponseScores {
            accuracy: metric(&value, "accuracy")?,
            hallucination: metric(&value, "hallucination")?,
            helpfulness: metric(&value, "helpfulness")?,
            completeness: metric(&value, "completeness")?,
            reasoning: reasoning(&value),
        })
    }

    /// One attempt plus one retry. A transient call failure retries with
    /// the same prompt; a parse failure (no JSON block, or a block missing
    /// a required metric) retries with the stricter instruction appended.
    /// The second failure is final.
    async fn call_with_retry(&self, prompt: &str, required: &[&str]) -> Result<serde_json::Value> {
        let first = self.model.complete(JUDGE_SYSTEM, prompt).await;
        let retry_prompt;
        match first {
            Ok(text) => match parse_score_block(&text, required) {
                Some(value) => return Ok(value),
                None => {
                    tracing::warn!("judge reply unparseable, retrying with strict instruction");
                    retry_prompt = format!("{}{}", prompt, STRICT_RETRY);
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "judge call failed, retrying");
                retry_prompt = prompt.to_string();
            }
        }

        let second = self
            .model
            .complete(JUDGE_SYSTEM, &retry_prompt)
            .await
            .map_err(|e| Error::JudgeParse(format!("judge call failed twice: {}", e)))?;
        parse_score_block(&second, required)
            .ok_or_else(|| Error::JudgeParse("no usable score block in judge reply after retry".into()))
    }
}

fn format_products(summaries: &[String]) -> String {
    if summaries.is_empty() {
        return "No products found".to_string();
    }
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Product {}:\n{}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Pull one numeric metric, clamped into [1,5]. A missing or non-numeric
/// metric means the block was not a valid score set.
fn metric(value: &serde_json::Value, key: &str) -> Result<u8> {
    let raw = value
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| Error::JudgeParse(format!("metric {} missing from judge reply", key)))?;
    Ok(raw.round().clamp(1.0, 5.0) as u8)
}

fn reasoning(value: &serde_json::Value) -> String {
    value
        .get("reasoning")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A JSON block only counts as parsed when every required metric is
/// present and numeric.
fn parse_score_block(text: &str, required: &[&str]) -> Option<serde_json::Value> {
    let value = parse_json_block(text)?;
    for key in required {
        value.get(key)?.as_f64()?;
    }
    Some(value)
}

/// Extract the first JSON object from free-form judge output, tolerating
/// surrounding prose and markdown code fences.
fn parse_json_block(text: &str) -> Option<serde_json::Value> {
    let body = if let Some(fenced) = text.split("```json").nth(1) {
        fenced.split("```").next().unwrap_or(fenced)
    } else if let Some(fenced) = text.split("```").nth(1) {
        fenced
    } else {
        text
    };
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let v = parse_json_block(r#"{"relevance": 4}"#).unwrap();
        assert_eq!(v["relevance"], 4);
    }

    #[test]
    fn parses_json_inside_prose_and_fences() {
        let v = parse_json_block("Sure, here you go:\n```json\n{\"coverage\": 3}\n```").unwrap();
        assert_eq!(v["coverage"], 3);

        let v = parse_json_block("The scores are {\"precision\": 5} as requested.").unwrap();
        assert_eq!(v["precision"], 5);
    }

    #[test]
    fn rejects_text_without_object() {
        assert!(parse_json_block("I cannot evaluate this.").is_none());
    }

    #[test]
    fn metric_clamps_out_of_range_values() {
        let v: serde_json::Value = serde_json::from_str(r#"{"relevance": 9, "coverage": 0.2}"#).unwrap();
        assert_eq!(metric(&v, "relevance").unwrap(), 5);
        assert_eq!(metric(&v, "coverage").unwrap(), 1);
        assert!(metric(&v, "precision").is_err());
    }
}
