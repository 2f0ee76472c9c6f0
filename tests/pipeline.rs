//! Integration tests for bilingual-digest.
//!
//! Everything except the last test runs against a scripted
//! `CompletionClient`, so no API key or network is needed. The live test is
//! gated behind `E2E_ENABLED`:
//!
//!   E2E_ENABLED=1 OPENAI_API_KEY=sk-... cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use bilingual_digest::{
    run, run_with_client, spawn_run, CompletionClient, CompletionError, DigestConfig, DigestError,
    DigestProgressCallback, DocumentInput, Message, ParagraphRecord, Role, Stage,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replays a fixed list of replies and records every request it receives.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        let replies = replies
            .into_iter()
            .map(|r| match r {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(CompletionError::Upstream(msg.to_string())),
            })
            .collect();
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn call(&self, messages: &[Message]) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Upstream("script exhausted".into())))
    }
}

/// Route library logs to the test harness; `RUST_LOG=debug` shows raw replies.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config_in(dir: &Path) -> DigestConfig {
    DigestConfig::builder()
        .output_dir(dir)
        .build()
        .expect("valid config")
}

fn files_in(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

const GREETING_EN: &str = r#"{"Summary":"A greeting.","Keywords":"hello, world"}"#;
const GREETING_ZH: &str =
    r#"{"Chinese Paragraph":"你好，世界。","Chinese Summary":"问候语。","Chinese Keywords":"你好, 世界"}"#;

// ── End-to-end with a stub client ────────────────────────────────────────────

#[tokio::test]
async fn text_mode_single_paragraph_end_to_end() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![Ok(GREETING_EN), Ok(GREETING_ZH)]);

    let output = run_with_client(
        &DocumentInput::Text("Hello world.".into()),
        &config_in(dir.path()),
        client.clone(),
    )
    .await
    .expect("run should succeed");

    assert_eq!(output.result.records.len(), 1);
    let record = &output.result.records[0];
    assert_eq!(record.original_paragraph_en, "Hello world.");
    assert_eq!(record.summary_en, "A greeting.");
    assert_eq!(record.keywords_en, vec!["hello", "world"]);
    assert_eq!(record.paragraph_zh, "你好，世界。");
    assert_eq!(record.summary_zh, "问候语。");
    assert_eq!(record.keywords_zh, vec!["你好", "世界"]);

    assert_eq!(output.stats.completion_calls, 2);
    assert_eq!(output.stats.degraded_records, 0);

    let text = std::fs::read_to_string(&output.artifacts.translated_text).unwrap();
    assert_eq!(text, "你好，世界。");

    let json = std::fs::read_to_string(&output.artifacts.result_json).unwrap();
    let parsed: Vec<ParagraphRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, output.result.records);

    let name = output
        .artifacts
        .result_json
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(name.starts_with("text_input_") && name.ends_with("_result.json"));
}

#[tokio::test]
async fn second_call_sees_summary_and_keywords() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![Ok(GREETING_EN), Ok(GREETING_ZH)]);

    run_with_client(
        &DocumentInput::Text("  Hello world.  ".into()),
        &config_in(dir.path()),
        client.clone(),
    )
    .await
    .unwrap();

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests.iter() {
        assert_eq!(request.len(), 1);
        assert_eq!(request[0].role, Role::User);
    }
    assert!(requests[0][0].content.contains("Paragraph:\nHello world.\n"));
    assert!(requests[1][0].content.contains(
        "English Paragraph:\nHello world.\n\nEnglish Summary:\nA greeting.\n\nEnglish Keywords:\nhello, world"
    ));
}

#[tokio::test]
async fn order_is_preserved_across_paragraphs() {
    let dir = TempDir::new().unwrap();
    let paragraphs = vec!["P1".to_string(), "P2".to_string(), "P3".to_string()];
    let mut script = Vec::new();
    let zh: Vec<String> = (1..=3)
        .map(|i| format!(r#"{{"Chinese Paragraph":"段{i}","Chinese Summary":"","Chinese Keywords":""}}"#))
        .collect();
    for z in &zh {
        script.push(Ok(r#"{"Summary":"s","Keywords":"k"}"#));
        script.push(Ok(z.as_str()));
    }
    let client = ScriptedClient::new(script);

    let output = run_with_client(
        &DocumentInput::Paragraphs(paragraphs.clone()),
        &config_in(dir.path()),
        client,
    )
    .await
    .unwrap();

    for (i, p) in paragraphs.iter().enumerate() {
        assert_eq!(&output.result.records[i].original_paragraph_en, p);
        assert_eq!(output.result.records[i].paragraph_zh, format!("段{}", i + 1));
        assert_eq!(
            output.result.translated_full_text[i],
            output.result.records[i].paragraph_zh
        );
    }
    let text = std::fs::read_to_string(&output.artifacts.translated_text).unwrap();
    assert_eq!(text, "段1\n\n段2\n\n段3");
}

// ── Partial-failure policy ───────────────────────────────────────────────────

#[tokio::test]
async fn malformed_reply_degrades_but_run_succeeds() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![
        Ok("I'm sorry, here is a summary: ..."),
        Ok(r#"{"Chinese Paragraph":"第一段。","Chinese Summary":"","Chinese Keywords":""}"#),
        Ok(GREETING_EN),
        Ok("not json either"),
    ]);

    let output = run_with_client(
        &DocumentInput::Paragraphs(vec!["First.".into(), "Second.".into()]),
        &config_in(dir.path()),
        client.clone(),
    )
    .await
    .expect("malformed replies must not fail the run");

    assert_eq!(client.request_count(), 4);
    let records = &output.result.records;
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].summary_en, "");
    assert!(records[0].keywords_en.is_empty());
    assert_eq!(records[0].paragraph_zh, "第一段。");

    assert_eq!(records[1].summary_en, "A greeting.");
    assert_eq!(records[1].paragraph_zh, "");
    assert!(records[1].keywords_zh.is_empty());

    assert_eq!(output.stats.degraded_records, 2);
    assert!(output.artifacts.result_json.exists());
}

#[tokio::test]
async fn transport_failure_aborts_run_and_writes_nothing() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("result");
    let client = ScriptedClient::new(vec![
        Ok(GREETING_EN),
        Ok(GREETING_ZH),
        Err("connection reset by peer"),
    ]);

    let err = run_with_client(
        &DocumentInput::Paragraphs(vec!["P1".into(), "P2".into()]),
        &config_in(&out),
        client.clone(),
    )
    .await
    .expect_err("transport failure must fail the run");

    match err {
        DigestError::Completion {
            paragraph,
            stage,
            ref source,
        } => {
            assert_eq!(paragraph, 1);
            assert_eq!(stage, Stage::Summarize);
            assert!(source.to_string().contains("connection reset"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // No further calls after the failure, and no artifact on disk.
    assert_eq!(client.request_count(), 3);
    assert!(files_in(&out).is_empty(), "found {:?}", files_in(&out));
}

#[tokio::test]
async fn translate_failure_is_reported_with_its_stage() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![Ok(GREETING_EN), Err("HTTP 500")]);

    let err = run_with_client(
        &DocumentInput::Text("Hello world.".into()),
        &config_in(dir.path()),
        client,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        DigestError::Completion {
            paragraph: 0,
            stage: Stage::Translate,
            ..
        }
    ));
    assert!(files_in(dir.path()).is_empty());
}

// ── Input errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_text_is_rejected_before_any_call() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![]);

    let err = run_with_client(
        &DocumentInput::Text("   \n".into()),
        &config_in(dir.path()),
        client.clone(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DigestError::EmptyInput));
    assert!(err.is_input_error());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn empty_paragraph_list_is_rejected_before_any_call() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![]);

    let err = run_with_client(
        &DocumentInput::Paragraphs(vec![" ".into()]),
        &config_in(dir.path()),
        client.clone(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DigestError::NoParagraphs { .. }));
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn non_pdf_file_is_rejected_before_any_call() {
    let dir = TempDir::new().unwrap();
    let fake = dir.path().join("paper.pdf");
    std::fs::write(&fake, b"hello, not a pdf").unwrap();
    let client = ScriptedClient::new(vec![]);

    let err = run_with_client(
        &DocumentInput::Pdf { path: fake },
        &config_in(&dir.path().join("out")),
        client.clone(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DigestError::NotAPdf { .. }));
    assert_eq!(client.request_count(), 0);
}

// ── Background submission ────────────────────────────────────────────────────

#[tokio::test]
async fn spawned_run_reports_input_error_through_handle() {
    let dir = TempDir::new().unwrap();
    let handle = spawn_run(DocumentInput::Text(String::new()), config_in(dir.path()));

    let outcome = handle.await.expect("task should not panic");
    assert!(matches!(outcome, Err(DigestError::EmptyInput)));
}

#[tokio::test]
async fn run_with_client_can_be_awaited_from_a_task() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let client = ScriptedClient::new(vec![Ok(GREETING_EN), Ok(GREETING_ZH)]);

    let handle = tokio::spawn(async move {
        run_with_client(&DocumentInput::Text("Hello world.".into()), &config, client).await
    });

    let output = handle.await.unwrap().unwrap();
    assert_eq!(output.stats.paragraphs, 1);
    assert!(output.artifacts.translated_text.exists());
}

// ── Progress callback ────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_events_follow_paragraphs() {
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
        completes: AtomicUsize,
    }

    impl DigestProgressCallback for Recorder {
        fn on_run_start(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }
        fn on_paragraph_start(&self, index: usize, _total: usize) {
            self.events.lock().unwrap().push(format!("para {index}"));
        }
        fn on_paragraph_complete(&self, _index: usize, _total: usize, _record: &ParagraphRecord) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_run_complete(&self, total: usize) {
            self.events.lock().unwrap().push(format!("done {total}"));
        }
    }

    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let config = DigestConfig::builder()
        .output_dir(dir.path())
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let client = ScriptedClient::new(vec![
        Ok(GREETING_EN),
        Ok(GREETING_ZH),
        Ok(GREETING_EN),
        Ok(GREETING_ZH),
    ]);

    run_with_client(
        &DocumentInput::Paragraphs(vec!["A".into(), "B".into()]),
        &config,
        client,
    )
    .await
    .unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start 2", "para 0", "para 1", "done 2"]
    );
    assert_eq!(recorder.completes.load(Ordering::SeqCst), 2);
}

// ── Live LLM (opt-in) ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_text_mode() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    init_logging();

    let dir = TempDir::new().unwrap();
    let output = run(
        &DocumentInput::Text(
            "The Transformer relies entirely on attention mechanisms, dispensing with recurrence."
                .into(),
        ),
        &config_in(dir.path()),
    )
    .await
    .expect("live run should succeed");

    let record = &output.result.records[0];
    println!("{}", serde_json::to_string_pretty(record).unwrap());
    assert!(!record.summary_en.is_empty(), "model returned no summary");
    assert!(!record.paragraph_zh.is_empty(), "model returned no translation");
}
