//! Integration tests for the two-stage fact-checking run.
//!
//! These tests drive the whole flow with a mock model client:
//! 1. Load templates and dataset from disk
//! 2. Extract claims per post
//! 3. Verify the flattened claims
//! 4. Assemble and write the report artifact

use std::fs;
use std::path::Path;
use std::time::Duration;

use factcheck::config::REPORTS_FILE;
use factcheck::{
    load_claim_lists, load_dataset, write_reports, Config, MockModelClient, ParsePolicy, Pipeline,
    PipelineError, Stage, TemplateStore, TruthScore,
};
use openai_client::{ChatCompletion, Message, OpenAIError};

const EXTRACTION_TEMPLATE: &str = "EXTRACT: {text}";
const VERIFICATION_TEMPLATE: &str = "VERIFY: {claim} | FROM: {tweet}";

/// Helper to lay out a prompt directory and dataset.
fn setup(dir: &Path, tweets: &[&str]) -> Config {
    let prompts = dir.join("prompts");
    let data = dir.join("data");
    fs::create_dir_all(&prompts).unwrap();
    fs::create_dir_all(&data).unwrap();
    fs::write(prompts.join("extract.txt"), EXTRACTION_TEMPLATE).unwrap();
    fs::write(prompts.join("claim_fact_check.txt"), VERIFICATION_TEMPLATE).unwrap();

    let records: Vec<_> = tweets
        .iter()
        .map(|t| serde_json::json!({"tweet": t, "handle": "@someone"}))
        .collect();
    let dataset = serde_json::json!({"session_id": "test", "tweets": records});
    fs::write(data.join("tweets_v2.json"), dataset.to_string()).unwrap();

    let mut config = Config::default()
        .with_batch_size(2)
        .with_retries(2, Duration::ZERO);
    config.prompt_dir = prompts;
    config.data_dir = data;
    config.output_dir = dir.join("output");
    config
}

/// Mock that extracts claims by tweet and verifies them with citations.
fn scripted_client() -> MockModelClient {
    MockModelClient::new(|model, messages: &[Message]| {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        if let Some(tweet) = last.strip_prefix("EXTRACT: ") {
            let body = match tweet {
                "just vibes" => "[]".to_string(),
                "two facts" => r#"[{"claim": "fact one"}, {"claim": "fact two"}]"#.to_string(),
                other => format!(r#"[{{"claim": "{other}"}}]"#),
            };
            return ChatCompletion::from_content(body);
        }

        assert_eq!(model, "perplexity/sonar-pro");
        let claim = last
            .strip_prefix("VERIFY: ")
            .and_then(|rest| rest.split(" | ").next())
            .unwrap_or("");
        let score = if claim == "fact two" { 1 } else { 3 };
        ChatCompletion::from_content(format!(
            r#"{{"truth_value": {score}, "explanation": "checked {claim}"}}"#
        ))
        .with_citations(["https://a", "https://b", "https://c", "https://d"])
    })
}

async fn run(
    config: &Config,
    client: MockModelClient,
) -> factcheck::Result<Vec<factcheck::Report>> {
    let templates = TemplateStore::new(&config.prompt_dir);
    let dataset = load_dataset(&config.dataset_path())?;
    Pipeline::new(client, config)
        .run(
            &dataset.tweets,
            &templates.load("extract.txt")?,
            &templates.load(&config.verify_template)?,
        )
        .await
}

#[tokio::test]
async fn test_full_run_writes_aligned_reports() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["just vibes", "two facts", "water is wet"]);

    let reports = run(&config, scripted_client()).await.unwrap();

    assert_eq!(
        reports.iter().map(|r| r.claims.len()).collect::<Vec<_>>(),
        vec![0, 2, 1]
    );
    let second = &reports[1];
    assert_eq!(second.source_item.text(), "two facts");
    assert_eq!(second.claims[0].claim.text, "fact one");
    assert_eq!(second.claims[1].verification.truth_score, Some(TruthScore::Low));
    assert_eq!(second.claims[1].verification.explanation, "checked fact two");
    assert_eq!(reports[2].claims[0].verification.citations.len(), 3);

    let out = config.output_path(REPORTS_FILE);
    write_reports(&out, &reports).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written[1]["tweet"], "two facts");
    assert_eq!(written[1]["claims"][1]["truthworthiness"], "low");
    assert_eq!(
        written[2]["claims"][0]["citations"],
        serde_json::json!(["https://a", "https://b", "https://c"])
    );
}

#[tokio::test]
async fn test_system_prompt_precedes_verification_turns() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["water is wet"])
        .with_verify_system_prompt(Some("Cite everything.".into()));
    let client = std::sync::Arc::new(scripted_client());

    let templates = TemplateStore::new(&config.prompt_dir);
    let dataset = load_dataset(&config.dataset_path()).unwrap();
    Pipeline::new(client.clone(), &config)
        .run(
            &dataset.tweets,
            &templates.load("extract.txt").unwrap(),
            &templates.load(&config.verify_template).unwrap(),
        )
        .await
        .unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].conversations[0].len(), 1);
    assert_eq!(
        calls[1].conversations[0],
        vec![
            Message::system("Cite everything."),
            Message::user("VERIFY: water is wet | FROM: water is wet"),
        ]
    );
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["water is wet"]);
    let client = scripted_client().fail_next(vec![
        OpenAIError::Api {
            status: 429,
            message: "rate limited".into(),
        },
        OpenAIError::Network("connection reset".into()),
    ]);

    let reports = run(&config, client).await.unwrap();
    assert_eq!(reports[0].claims.len(), 1);
}

#[tokio::test]
async fn test_terminal_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["water is wet", "two facts"]);
    let client = scripted_client().fail_call(
        1,
        OpenAIError::Api {
            status: 401,
            message: "bad key".into(),
        },
    );

    let err = run(&config, client).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Generation {
            stage: Stage::Verification,
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_run_writes_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["water is wet", "two facts"]);
    // Call 0 is extraction; calls 1 and 2 are the two verification batches.
    let client = scripted_client().fail_call(
        2,
        OpenAIError::Api {
            status: 401,
            message: "bad key".into(),
        },
    );
    let templates = TemplateStore::new(&config.prompt_dir);
    let dataset = load_dataset(&config.dataset_path()).unwrap();
    let out = config.output_path(REPORTS_FILE);

    let err = Pipeline::new(client, &config)
        .run_to_file(
            &dataset.tweets,
            &templates.load("extract.txt").unwrap(),
            &templates.load(&config.verify_template).unwrap(),
            &out,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Generation {
            stage: Stage::Verification,
            ..
        }
    ));
    assert!(!out.exists());
    assert!(!out.with_file_name(format!("{REPORTS_FILE}.tmp")).exists());
}

#[tokio::test]
async fn test_report_artifact_feeds_single_checker() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["just vibes", "two facts", "water is wet"]);
    let templates = TemplateStore::new(&config.prompt_dir);
    let dataset = load_dataset(&config.dataset_path()).unwrap();
    let out = config.output_path(REPORTS_FILE);

    Pipeline::new(scripted_client(), &config)
        .run_to_file(
            &dataset.tweets,
            &templates.load("extract.txt").unwrap(),
            &templates.load(&config.verify_template).unwrap(),
            &out,
        )
        .await
        .unwrap();

    let lists = load_claim_lists(&out).unwrap();
    assert_eq!(
        lists,
        vec![
            vec![],
            vec!["fact one".to_string(), "fact two".to_string()],
            vec!["water is wet".to_string()],
        ]
    );

    let generator = factcheck::BatchedGenerator::new(MockModelClient::with_text(|_| {
        "Confidence Score: 2\nExplanation: Plausible.\nSources:\nNone".into()
    }));
    let checks = factcheck::check_claims(&generator, &config.check_stage(), &lists)
        .await
        .unwrap();
    assert_eq!(
        checks.iter().map(|c| c.claim.as_str()).collect::<Vec<_>>(),
        vec!["fact one", "fact two", "water is wet"]
    );
}

#[tokio::test]
async fn test_strict_parse_failure_names_item() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["water is wet", "garbage"]);
    let client = MockModelClient::with_text(|prompt| {
        if prompt.ends_with("garbage") {
            "Sorry, I can't do that.".into()
        } else {
            r#"[{"claim": "x"}]"#.into()
        }
    });

    let err = run(&config, client).await.unwrap_err();
    match err {
        PipelineError::Parse { stage, index, .. } => {
            assert_eq!(stage, Stage::Extraction);
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_lenient_run_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let config =
        setup(dir.path(), &["water is wet", "garbage"]).with_parse_policy(ParsePolicy::Lenient);
    let client = MockModelClient::with_text(|prompt| {
        if prompt.ends_with("garbage") {
            "Sorry, I can't do that.".into()
        } else if prompt.starts_with("EXTRACT") {
            r#"[{"claim": "x"}]"#.into()
        } else {
            "no verdict here".into()
        }
    });

    let reports = run(&config, client).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].claims.len(), 1);
    assert!(!reports[0].claims[0].verification.is_resolved());
    assert!(reports[1].claims.is_empty());
}

#[tokio::test]
async fn test_missing_template_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &["water is wet"]);
    let templates = TemplateStore::new(&config.prompt_dir);

    assert!(matches!(
        templates.load("claim_extraction_v9.txt"),
        Err(factcheck::TemplateError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_empty_dataset_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &[]);
    let client = std::sync::Arc::new(scripted_client());

    let templates = TemplateStore::new(&config.prompt_dir);
    let reports = Pipeline::new(client.clone(), &config)
        .run(
            &[],
            &templates.load("extract.txt").unwrap(),
            &templates.load(&config.verify_template).unwrap(),
        )
        .await
        .unwrap();

    assert!(reports.is_empty());
    assert!(client.calls().is_empty());
}
