use agent_console_http_backend::catalog::{NewAgent, SemanticQuery};
use agent_console_http_backend::{ConsoleConfigBuilder, HttpBackend};
use agent_console_model::{
    AgentBackend, BackendError, ChatRequest, ErrorKind, ToolCall, ToolOutput,
};
use httpmock::prelude::*;
use serde_json::json;

fn backend_for(server: &MockServer) -> HttpBackend {
    let config = ConsoleConfigBuilder::with_api_token("secret")
        .with_base_url(server.base_url())
        .with_user_email("ops@example.com")
        .build();
    HttpBackend::new(config)
}

#[tokio::test]
async fn test_send_chat() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/agents/chats/send")
                .header("api-token", "secret")
                .json_body(json!({
                    "agent_id": "a1",
                    "user_email": "ops@example.com",
                    "incoming_steps": [{
                        "payload": { "step_type": "human_message", "content": "hi" }
                    }]
                }));
            then.status(200).json_body(json!({
                "agent_response": [
                    { "content": "Let me check" },
                    {
                        "tool_call_id": "t1",
                        "tool_call_name": "lookup",
                        "APIM_VERB": "GET",
                        "APIM_ENDPOINT": "/x"
                    }
                ],
                "chat_id": "c1"
            }));
        })
        .await;

    let backend = backend_for(&server);
    let req = ChatRequest::human_message("a1", None, "hi");
    let resp = backend.send_chat(&req).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resp.chat_id.as_deref(), Some("c1"));
    assert_eq!(resp.segments[0].text(), Some("Let me check"));
    assert_eq!(
        resp.segments[1].tool_call().map(|call| call.name.as_str()),
        Some("lookup")
    );
}

#[tokio::test]
async fn test_send_chat_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/agents/chats/send");
            then.status(502).body("bad gateway");
        })
        .await;

    let backend = backend_for(&server);
    let req = ChatRequest::human_message("a1", None, "hi");
    let err = backend.send_chat(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ErrorResponse);

    let config = ConsoleConfigBuilder::with_api_token("secret")
        .with_base_url("http://127.0.0.1:1")
        .build();
    let err = HttpBackend::new(config).send_chat(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_send_chat_without_agent_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/agents/chats/send");
            then.status(200).json_body(json!({ "chat_id": "c1" }));
        })
        .await;

    let backend = backend_for(&server);
    let req = ChatRequest::human_message("a1", None, "hi");
    let err = backend.send_chat(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[tokio::test]
async fn test_execute_tool() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/tools/execute").json_body(json!({
                "verb": "GET",
                "endpoint": "/x",
                "tool_call_id": "t1",
                "tool_call_name": "lookup",
                "args": { "q": 1 },
                "function_registry_id": "r1"
            }));
            then.status(200)
                .header("content-type", "text/plain")
                .body("42");
        })
        .await;

    let backend = backend_for(&server);
    let call = ToolCall {
        id: "t1".to_owned(),
        name: "lookup".to_owned(),
        verb: "GET".to_owned(),
        endpoint: "/x".to_owned(),
        args: json!({ "q": 1 }),
        function_registry_id: Some("r1".to_owned()),
    };
    let output = backend.execute_tool(&call).await.unwrap();

    mock.assert_async().await;
    assert_eq!(output, ToolOutput(json!("42")));
}

#[tokio::test]
async fn test_catalog() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/agents").json_body(json!({
                "agent_name": "Helper",
                "agent_description": "Helps",
                "agent_instruction": "Be brief"
            }));
            then.status(200).json_body(json!({ "agent_id": "a9" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/agents/chats")
                .query_param("agent_id", "a9");
            then.status(200).json_body(json!({
                "Records": [{ "chat_id": "c1", "Created_at": "2024-05-01" }]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/agents/chats/history")
                .query_param("chat_id", "c1");
            then.status(200).json_body(json!({
                "steps": [
                    {
                        "payload": {
                            "step_type": "user_message",
                            "content": "hi"
                        },
                        "created_at": "2024-05-01T10:00:00Z"
                    },
                    {
                        "payload": {
                            "step_type": "agent_message",
                            "content": "hello"
                        },
                        "created_at": "2024-05-01T10:00:01Z"
                    },
                    {
                        "payload": {
                            "step_type": "tool_execution_response",
                            "content": { "status": "shipped" }
                        },
                        "created_at": "2024-05-01T10:00:02Z"
                    },
                    {
                        "payload": {
                            "step_type": "tool_call",
                            "content": null
                        },
                        "created_at": "2024-05-01T10:00:03Z"
                    }
                ]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/knowledge/documents/semantic").json_body(
                json!({
                    "query": "refunds",
                    "knowledge_base_ids_to_query": ["kb1", "kb2"],
                    "number_of_chunks_to_retrieve": 2
                }),
            );
            then.status(200).json_body(json!({
                "retrieved_chunks": [
                    { "knowledge_base_id": "kb2", "content": "Refunds take 5 days." }
                ]
            }));
        })
        .await;

    let backend = backend_for(&server);

    let agent_id = backend
        .create_agent(&NewAgent {
            name: "Helper".to_owned(),
            description: "Helps".to_owned(),
            instructions: "Be brief".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(agent_id, "a9");

    let chats = backend.list_chats(&agent_id).await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].chat_id, "c1");

    let history = backend.chat_history("c1").await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(history[0].is_user_message());
    assert_eq!(history[1].content.as_deref(), Some("hello"));
    assert_eq!(
        history[2].content.as_deref(),
        Some(r#"{"status":"shipped"}"#)
    );
    assert_eq!(history[3].step_type, "tool_call");
    assert_eq!(history[3].content, None);

    let hits = backend
        .semantic_search(&SemanticQuery {
            query: "refunds".to_owned(),
            knowledge_base_ids: vec!["kb1".to_owned(), "kb2".to_owned()],
            count: 2,
        })
        .await
        .unwrap();
    assert_eq!(hits[0].knowledge_base_id, "kb2");
}
