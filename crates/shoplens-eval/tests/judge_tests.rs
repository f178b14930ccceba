use std::sync::Arc;

use shoplens_core::error::Error;
use shoplens_eval::{Judge, ScriptedModel};

fn summaries() -> Vec<String> {
    vec!["Peak Ridge Runner is a trail item. Priced at 150.".to_string()]
}

#[tokio::test]
async fn first_reply_with_valid_json_needs_no_retry() {
    let model = ScriptedModel::new(vec![
        r#"{"relevance": 5, "coverage": 4, "precision": 4, "reasoning": "all on target"}"#,
    ]);
    let judge = Judge::new(Arc::new(model));

    let scores = judge
        .evaluate_retrieval("waterproof trail shoes", &summaries())
        .await
        .unwrap();
    assert_eq!(scores.relevance, 5);
    assert_eq!(scores.coverage, 4);
    assert_eq!(scores.reasoning, "all on target");
}

#[tokio::test]
async fn prose_then_json_recovers_on_the_strict_retry() {
    let model = ScriptedModel::new(vec![
        "These products look relevant to me, maybe a 4 out of 5?",
        r#"{"relevance": 4, "coverage": 4, "precision": 3}"#,
    ]);
    let judge = Judge::new(Arc::new(model));

    let scores = judge
        .evaluate_retrieval("waterproof trail shoes", &summaries())
        .await
        .unwrap();
    assert_eq!(scores.relevance, 4);
    assert_eq!(scores.precision, 3);
}

#[tokio::test]
async fn json_missing_a_required_metric_counts_as_a_parse_failure() {
    // First reply parses as JSON but lacks "precision"; the retry carries
    // the complete block.
    let model = ScriptedModel::new(vec![
        r#"{"relevance": 4, "coverage": 4}"#,
        r#"{"relevance": 4, "coverage": 4, "precision": 5}"#,
    ]);
    let judge = Judge::new(Arc::new(model));

    let scores = judge
        .evaluate_retrieval("waterproof trail shoes", &summaries())
        .await
        .unwrap();
    assert_eq!(scores.precision, 5);
}

#[tokio::test]
async fn two_unparseable_replies_are_a_judge_parse_failure() {
    let model = ScriptedModel::new(vec![
        "I would rate these results quite highly.",
        "As discussed, the results are strong.",
    ]);
    let judge = Judge::new(Arc::new(model));

    let err = judge
        .evaluate_retrieval("waterproof trail shoes", &summaries())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::JudgeParse(_)));
}

#[tokio::test]
async fn response_rubric_parses_all_four_metrics() {
    let model = ScriptedModel::new(vec![
        r#"```json
{"accuracy": 4, "hallucination": 5, "helpfulness": 4, "completeness": 3, "reasoning": "faithful"}
```"#,
    ]);
    let judge = Judge::new(Arc::new(model));

    let scores = judge
        .evaluate_response(
            "waterproof trail shoes",
            "The Ridge Runner fits the bill.",
            &summaries(),
        )
        .await
        .unwrap();
    assert_eq!(scores.accuracy, 4);
    assert_eq!(scores.hallucination, 5);
    assert_eq!(scores.helpfulness, 4);
    assert_eq!(scores.completeness, 3);
}
