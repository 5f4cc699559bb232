use chatdigest_client::{ChatlogClient, WebhookClient};
use chatdigest_core::PipelineError;
use chatdigest_pipeline::{fetch_digest, gather_prompt, post_file, FetchOptions, GatherOptions};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::tempdir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn started() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 16).unwrap().and_hms_opt(22, 31, 12).unwrap()
}

fn chatlog(server: &MockServer) -> ChatlogClient {
    ChatlogClient::new(format!("{}/sse", server.uri()))
}

#[tokio::test]
async fn fetch_filters_then_writes_digest_into_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chatlog"))
        .and(query_param("talker", "27587714869@chatroom"))
        .and(query_param("time", "2025-07-16/20:31~2025-07-16/22:31"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "21:00 wxid_bot: daily report\n21:05 alice: morning\n21:10 wxid_bot: reminder",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let opts = FetchOptions {
        room: "27587714869@chatroom".into(),
        output: Some(dir.path().to_path_buf()),
        hours: 2,
        exclude: "wxid_bot".into(),
    };
    let report = fetch_digest(&chatlog(&server), &opts, started()).await.unwrap();

    assert_eq!(report.output_path, dir.path().join("27587714869_chatroom_chatlog_20250716.md"));
    let doc = std::fs::read_to_string(&report.output_path).unwrap();
    assert!(doc.starts_with("# Chat Log\n\n**Room ID**: 27587714869@chatroom\n"));
    assert!(doc.contains("**Time Range**: 2025-07-16 20:31:00 ~ 2025-07-16 22:31:00\n"));
    assert!(doc.contains("**Lookback**: last 2 hours\n"));
    assert!(doc.contains("**Generated At**: 2025-07-16 22:31:12\n"));
    assert!(doc.ends_with("## Transcript\n\n21:05 alice: morning"));
    assert_eq!(report.bytes, doc.len() as u64);
}

#[tokio::test]
async fn fetch_to_explicit_file_keeps_unfiltered_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chatlog"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a\nb"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let file = dir.path().join("digests/today.md");
    let opts = FetchOptions {
        room: "r@chatroom".into(),
        output: Some(file.clone()),
        hours: 24,
        exclude: String::new(),
    };
    let report = fetch_digest(&chatlog(&server), &opts, started()).await.unwrap();
    assert_eq!(report.output_path, file);
    assert!(std::fs::read_to_string(&file).unwrap().ends_with("## Transcript\n\na\nb"));
}

#[tokio::test]
async fn fetch_with_out_of_range_lookback_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let opts = FetchOptions {
        room: "r@chatroom".into(),
        output: Some(dir.path().to_path_buf()),
        hours: u32::MAX,
        exclude: String::new(),
    };
    let err = fetch_digest(&chatlog(&server), &opts, started()).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidArgument(_)));
}

#[tokio::test]
async fn fetch_service_error_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chatlog"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let opts = FetchOptions {
        room: "r@chatroom".into(),
        output: Some(dir.path().to_path_buf()),
        hours: 24,
        exclude: String::new(),
    };
    let err = fetch_digest(&chatlog(&server), &opts, started()).await.unwrap_err();
    assert!(matches!(err, PipelineError::ExternalToolFailure { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

async fn sessions_server(sessions: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/session"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sessions))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn gather_appends_answering_rooms_to_prompt() {
    let server = sessions_server("s1,s2").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chatlog"))
        .and(query_param("chatroom", "a@chatroom"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_string("msgs a"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chatlog"))
        .and(query_param("chatroom", "b@chatroom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let prompt = dir.path().join("prompt.md");
    std::fs::write(&prompt, "Find trends").unwrap();
    let opts = GatherOptions {
        prompt,
        output: dir.path().join("out/gathered.md"),
        rooms: vec!["a@chatroom".into(), "b@chatroom".into()],
        limit: 50,
    };
    let report = gather_prompt(&chatlog(&server), &opts).await.unwrap();

    assert_eq!(report.rooms, vec!["a@chatroom"]);
    assert_eq!(
        std::fs::read_to_string(&report.output_path).unwrap(),
        "\nFind trends\n\nChat data:\n=== a@chatroom ===\nmsgs a\n\n"
    );
}

#[tokio::test]
async fn gather_without_any_room_data_lists_sessions() {
    let server = sessions_server("alpha@chatroom\nbeta@chatroom").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chatlog"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let prompt = dir.path().join("prompt.md");
    std::fs::write(&prompt, "P").unwrap();
    let output = dir.path().join("gathered.md");
    let opts = GatherOptions {
        prompt,
        output: output.clone(),
        rooms: vec!["x@chatroom".into()],
        limit: 100,
    };
    let err = gather_prompt(&chatlog(&server), &opts).await.unwrap_err();

    assert!(matches!(err, PipelineError::MissingInput(m) if m.contains("beta@chatroom")));
    assert!(!output.exists());
}

#[tokio::test]
async fn gather_missing_prompt_is_missing_input() {
    let server = sessions_server("s").await;
    let dir = tempdir().unwrap();
    let opts = GatherOptions {
        prompt: dir.path().join("nope.md"),
        output: dir.path().join("o.md"),
        rooms: vec!["a@chatroom".into()],
        limit: 100,
    };
    let err = gather_prompt(&chatlog(&server), &opts).await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(m) if m.contains("prompt file")));
}

async fn webhook_replying(body_match: &str, reply: &str) -> (MockServer, WebhookClient) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_string_contains(body_match))
        .respond_with(ResponseTemplate::new(200).set_body_string(reply))
        .expect(1)
        .mount(&server)
        .await;
    let client = WebhookClient::new(format!("{}/send", server.uri())).unwrap();
    (server, client)
}

#[tokio::test]
async fn post_sends_trimmed_file_contents() {
    let (_server, client) = webhook_replying("msg=daily+digest", r#"{"code":200,"msg":"ok"}"#).await;
    let dir = tempdir().unwrap();
    let input = dir.path().join("digest.txt");
    std::fs::write(&input, "\n  daily digest \n\n").unwrap();

    post_file(&client, &input, "g@chatroom").await.unwrap();
}

#[tokio::test]
async fn post_sends_empty_content_anyway() {
    let (_server, client) = webhook_replying("to=g%40chatroom", r#"{"code":200}"#).await;
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    std::fs::write(&input, "  \n").unwrap();

    post_file(&client, &input, "g@chatroom").await.unwrap();
}

#[tokio::test]
async fn post_rejection_is_external_failure() {
    let (_server, client) = webhook_replying("to=", r#"{"code":403,"msg":"not in group"}"#).await;
    let dir = tempdir().unwrap();
    let input = dir.path().join("m.txt");
    std::fs::write(&input, "hi").unwrap();

    let err = post_file(&client, &input, "g@chatroom").await.unwrap_err();
    match err {
        PipelineError::ExternalToolFailure { context, .. } => {
            assert!(context.contains("403"));
            assert!(context.contains("not in group"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn post_missing_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = WebhookClient::new(format!("{}/send", server.uri())).unwrap();
    let dir = tempdir().unwrap();

    let err = post_file(&client, &dir.path().join("nope.txt"), "g@chatroom").await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(_)));
}
