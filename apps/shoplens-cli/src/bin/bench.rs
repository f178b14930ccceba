use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use shoplens_bench::{BenchmarkHarness, RunOptions};
use shoplens_core::catalog::CatalogStore;
use shoplens_core::config::{expand_path, Config};
use shoplens_core::dataset::QueryDataset;
use shoplens_core::types::{QueryCategory, QueryRecord};
use shoplens_embed::default_embedder;
use shoplens_eval::{GenaiModel, Judge, LlmSynthesizer};
use shoplens_hybrid::HybridRetriever;
use shoplens_keyword::{JsonStorefront, KeywordRetriever};
use shoplens_symbolic::TripleStore;
use shoplens_vector::EmbeddingIndex;

struct Args {
    sample: Option<usize>,
    category: Option<QueryCategory>,
    single_query: Option<String>,
    evaluate: bool,
    keyword: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        sample: None,
        category: None,
        single_query: None,
        evaluate: false,
        keyword: true,
    };
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--sample" => {
                let n = it
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sample needs a number"))?;
                args.sample = Some(n.parse()?);
            }
            "--category" => {
                let name = it
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--category needs a name"))?;
                args.category =
                    Some(serde_json::from_value(serde_json::Value::String(name))?);
            }
            "--query" => {
                args.single_query = Some(
                    it.next()
                        .ok_or_else(|| anyhow::anyhow!("--query needs text"))?,
                );
            }
            "--evaluate" => args.evaluate = true,
            "--no-keyword" => args.keyword = false,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown flag: {}", other),
        }
    }
    Ok(args)
}

fn print_usage() {
    println!("Usage: shoplens-bench [--sample N] [--category NAME] [--query \"text\"]");
    println!("                      [--evaluate] [--no-keyword]");
    println!();
    println!("  --sample N       run only the first N queries");
    println!("  --category NAME  run queries with this category tag");
    println!("  --query TEXT     run a single ad-hoc query");
    println!("  --evaluate       enable LLM dual evaluation (judge)");
    println!("  --no-keyword     skip the keyword baseline path");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = parse_args()?;
    let config = Config::load()?;
    let settings = config.settings()?;

    let catalog = Arc::new(CatalogStore::load(&expand_path(&settings.catalog_path))?);
    println!("Catalog: {} items", catalog.len());

    // A malformed dataset aborts the whole run; only per-query failures
    // are tolerated.
    let queries: Vec<QueryRecord> = if let Some(text) = &args.single_query {
        vec![serde_json::from_value(
            serde_json::json!({"id": "Q001", "text": text}),
        )?]
    } else {
        let dataset = QueryDataset::load(&expand_path(&settings.queries_path))?;
        let mut queries = match args.category {
            Some(category) => dataset
                .in_category(category)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>(),
            None => dataset.queries,
        };
        if let Some(n) = args.sample {
            queries.truncate(n);
        }
        queries
    };
    if queries.is_empty() {
        anyhow::bail!("no queries selected");
    }
    println!("Running {} queries", queries.len());

    let triples = Arc::new(TripleStore::ingest(&catalog));
    let embedder = default_embedder()?;
    let index = EmbeddingIndex::open(&expand_path(&settings.index_dir), "items", embedder).await?;
    index.build(&catalog).await?;
    let hybrid = Arc::new(HybridRetriever::new(
        index,
        triples,
        settings.k_wide,
        settings.result_cap,
    ));

    let chat = Arc::new(GenaiModel::new(&settings.judge_model));
    let synthesizer = Arc::new(LlmSynthesizer::new(chat.clone()));

    let mut harness = BenchmarkHarness::new(catalog.clone(), hybrid, synthesizer).with_options(
        RunOptions {
            concurrency: settings.concurrency,
            query_timeout: Duration::from_secs(settings.query_timeout_secs),
            show_progress: true,
        },
    );
    if args.keyword {
        let storefront = JsonStorefront::new(expand_path(&settings.listings_path));
        harness = harness.with_keyword(Box::new(KeywordRetriever::new(
            Box::new(storefront),
            catalog.clone(),
        )));
    }
    if args.evaluate {
        harness = harness.with_judge(Judge::new(chat.clone()));
        println!("LLM dual evaluation enabled");
    }

    let report = harness.run(&queries).await;
    report.print_summary();

    let results_dir = expand_path(&settings.results_dir);
    let json_path = report.save_json(&results_dir)?;
    let md_path = report.save_markdown(&results_dir)?;
    println!("Results saved to {}", json_path.display());
    println!("Report saved to {}", md_path.display());

    Ok(())
}
