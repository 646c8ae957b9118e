mod common;

use anyhow::Result;
use common::TestApp;
use serde_json::{json, Value};

async fn chat(app: &TestApp, message: &str, session_id: Option<&str>) -> Result<reqwest::Response> {
    Ok(app
        .client
        .post(app.url("/api/chat"))
        .json(&json!({ "message": message, "session_id": session_id }))
        .send()
        .await?)
}

#[tokio::test]
async fn test_first_turn_allocates_a_session() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = chat(&app, "Hello", None).await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;

    assert_eq!(body["response"], "Hello from the bot");
    let session_id = body["session_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(session_id).is_ok());

    // Missing key behaves like null.
    let body: Value = app
        .client
        .post(app.url("/api/chat"))
        .json(&json!({ "message": "Hi again" }))
        .send()
        .await?
        .json()
        .await?;
    assert_ne!(body["session_id"].as_str().unwrap(), session_id);

    Ok(())
}

#[tokio::test]
async fn test_continuation_echoes_session_and_replays_history() -> Result<()> {
    let app = TestApp::spawn().await?;

    let first: Value = chat(&app, "My name is Aoi", Some("visitor-1")).await?.json().await?;
    assert_eq!(first["session_id"], "visitor-1");

    let second: Value = chat(&app, "What is my name?", Some("visitor-1")).await?.json().await?;
    assert_eq!(second["session_id"], "visitor-1");

    let prompts = app.generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].user.contains("Previous conversation"));
    assert!(prompts[1]
        .user
        .contains("User: My name is Aoi\nAssistant: Hello from the bot"));

    // Another session does not see visitor-1's history.
    chat(&app, "Hello", Some("visitor-2")).await?;
    assert!(!app.generator.prompts()[2].user.contains("Aoi"));

    Ok(())
}

#[tokio::test]
async fn test_history_window_is_five_turns() -> Result<()> {
    let app = TestApp::spawn().await?;

    for i in 1..=7 {
        chat(&app, &format!("message {i}"), Some("long")).await?.error_for_status()?;
    }

    // The seventh prompt replays turns 2..=6 in order and then asks turn 7.
    let last = app.generator.prompts().pop().unwrap();
    assert!(!last.user.contains("User: message 1\n"));
    for i in 2..=6 {
        assert!(last.user.contains(&format!("User: message {i}\n")));
    }
    assert!(last.user.find("message 2").unwrap() < last.user.find("message 6").unwrap());
    assert!(last.user.ends_with("User: message 7\nAssistant:"));

    Ok(())
}

#[tokio::test]
async fn test_active_faqs_are_offered_as_context() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    for (question, answer, active) in [
        ("What are your opening hours?", "Weekdays 9:30-18:00", true),
        ("Do you build websites?", "Yes, over 500 projects", true),
        ("Secret opening hours?", "Hidden", false),
    ] {
        app.client
            .post(app.url("/api/admin/faqs"))
            .bearer_auth(&token)
            .json(&json!({ "question": question, "answer": answer, "is_active": active }))
            .send()
            .await?
            .error_for_status()?;
    }

    let body: Value = chat(&app, "opening hours please", None).await?.json().await?;

    let contexts = body["context_used"].as_array().unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0]["metadata"]["source"], "FAQ");
    assert!(contexts[0]["document"].as_str().unwrap().ends_with("..."));

    let prompt = app.generator.prompts().pop().unwrap();
    assert!(prompt.system.contains("Weekdays 9:30-18:00"));
    assert!(!prompt.system.contains("Hidden"));

    Ok(())
}

#[tokio::test]
async fn test_generator_failure_is_bad_gateway_and_not_recorded() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    app.generator.set_reply(None);

    let response = chat(&app, "Hello", Some("s")).await?;
    assert_eq!(response.status().as_u16(), 502);

    let history: Vec<Value> = app
        .client
        .get(app.url("/api/admin/chat-history"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert!(history.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_blank_message_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = chat(&app, "   ", None).await?;
    assert_eq!(response.status().as_u16(), 400);
    assert!(app.generator.prompts().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_chat_history_is_newest_first_and_filterable() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    chat(&app, "first", Some("a")).await?;
    chat(&app, "second", Some("b")).await?;
    chat(&app, "third", Some("a")).await?;

    let unauthorized = app.client.get(app.url("/api/admin/chat-history")).send().await?;
    assert_eq!(unauthorized.status().as_u16(), 401);

    let all: Vec<Value> = app
        .client
        .get(app.url("/api/admin/chat-history"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let messages: Vec<_> = all.iter().map(|r| r["user_message"].as_str().unwrap()).collect();
    assert_eq!(messages, vec!["third", "second", "first"]);
    assert_eq!(all[0]["bot_response"], "Hello from the bot");
    assert!(all[0]["created_at"].is_string());

    let only_a: Vec<Value> = app
        .client
        .get(app.url("/api/admin/chat-history?session_id=a"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(only_a.len(), 2);
    assert!(only_a.iter().all(|r| r["session_id"] == "a"));

    Ok(())
}

#[tokio::test]
async fn test_long_session_id_is_kept_verbatim() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let session_id = "s".repeat(300);

    let first: Value = chat(&app, "one", Some(&session_id)).await?.json().await?;
    assert_eq!(first["session_id"].as_str().unwrap(), session_id);

    let second = chat(&app, "two", Some(&session_id)).await?;
    assert_eq!(second.status().as_u16(), 200);
    let prompts = app.generator.prompts();
    assert!(prompts.last().unwrap().user.contains("User: one\nAssistant:"));

    let history: Vec<Value> = app
        .client
        .get(app.url("/api/admin/chat-history"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|r| r["session_id"].as_str().unwrap() == session_id));

    Ok(())
}
