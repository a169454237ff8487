use gemini_cli::config::Config;
use gemini_cli::engine::{ChatEngine, TurnReply};
use gemini_cli::gemini::{ChatSession, GeminiClient};
use mockito::Matcher;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn engine_for(server_url: &str, working_dir: &TempDir) -> ChatEngine {
    let mut config = Config::default();
    config.gemini.base_url = server_url.to_string();
    // Keep assertions on raw reply text instead of ANSI sequences
    config.preferences.render_markdown = false;

    let client =
        GeminiClient::new(config.clone(), "test-key".to_string()).expect("client builds");
    let session = ChatSession::open(client);
    ChatEngine::new(session, config, working_dir.path().to_path_buf())
}

fn reply_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            }
        }]
    })
    .to_string()
}

#[tokio::test]
async fn write_command_creates_the_exact_file() {
    let server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(&server.url(), &temp);

    let reply = engine
        .process_turn("/write greeting.txt Hello World")
        .await
        .expect("command turn");

    assert!(matches!(reply, TurnReply::CommandOutput(_)));
    let written = fs::read_to_string(temp.path().join("greeting.txt")).unwrap();
    assert_eq!(written, "Hello World");

    // Commands never touch the model, so the session stays empty.
    assert!(engine.session().history().is_empty());
}

#[tokio::test]
async fn help_and_unknown_commands_reply_without_the_model() {
    let server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(&server.url(), &temp);

    match engine.process_turn("/help").await.expect("help turn") {
        TurnReply::CommandOutput(text) => {
            assert!(text.contains("/write"));
            assert!(text.contains("exit"));
        }
        other => panic!("expected command output, got {:?}", other),
    }

    match engine.process_turn("/frobnicate").await.expect("unknown turn") {
        TurnReply::CommandOutput(text) => assert!(text.contains("/frobnicate")),
        other => panic!("expected command output, got {:?}", other),
    }

    match engine.process_turn("/write lonely.txt").await.expect("missing arg") {
        TurnReply::CommandOutput(text) => assert!(text.contains("Usage")),
        other => panic!("expected command output, got {:?}", other),
    }
}

#[tokio::test]
async fn file_creation_turn_saves_the_reply_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(&server.url(), &temp);

    let code = "print('hi')\n";
    server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body(code))
        .create_async()
        .await;

    let reply = engine
        .process_turn("create a python file that prints hi")
        .await
        .expect("file creation turn");

    match reply {
        TurnReply::FileWritten { path, content } => {
            assert_eq!(content, code);
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("python_"));
            assert!(name.ends_with(".py"));
            assert_eq!(fs::read_to_string(&path).unwrap(), code);
        }
        other => panic!("expected a written file, got {:?}", other),
    }
}

#[tokio::test]
async fn chat_turn_returns_the_reply_text() {
    let mut server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(&server.url(), &temp);

    server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("Rust is a systems language."))
        .create_async()
        .await;

    match engine.process_turn("what is rust").await.expect("chat turn") {
        TurnReply::Rendered(text) => assert!(text.contains("Rust is a systems language.")),
        other => panic!("expected rendered chat, got {:?}", other),
    }
    assert_eq!(engine.session().history().len(), 2);
}

#[tokio::test]
async fn failed_model_call_is_recoverable() {
    let mut server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(&server.url(), &temp);

    server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {"code": 500, "message": "backend unavailable", "status": "INTERNAL"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = engine.process_turn("tell me a story").await.expect_err("turn fails");
    assert!(err.to_string().contains("backend unavailable"));
    assert!(engine.session().history().is_empty());

    // The loop carries on: after the failure the next turn works.
    server.reset_async().await;
    server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("Once upon a time."))
        .create_async()
        .await;

    match engine.process_turn("tell me a story").await.expect("retry works") {
        TurnReply::Rendered(text) => assert!(text.contains("Once upon a time.")),
        other => panic!("expected rendered chat, got {:?}", other),
    }
    assert_eq!(engine.session().history().len(), 2);
}

#[tokio::test]
async fn models_command_lists_through_the_client() {
    let mut server = mockito::Server::new_async().await;
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(&server.url(), &temp);

    server
        .mock("GET", "/models")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "models": [
                    {"name": "models/gemini-pro", "displayName": "Gemini Pro"},
                    {"name": "models/embedding-001", "displayName": "Embedding"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    match engine.process_turn("/models gemini").await.expect("models turn") {
        TurnReply::CommandOutput(text) => {
            assert!(text.contains("gemini-pro"));
            assert!(!text.contains("embedding-001"));
        }
        other => panic!("expected command output, got {:?}", other),
    }
}
