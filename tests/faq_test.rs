mod common;

use anyhow::Result;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_faq_crud_flow() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let created: Value = app
        .client
        .post(app.url("/api/admin/faqs"))
        .bearer_auth(&token)
        .json(&json!({
            "question": "What are your opening hours?",
            "answer": "Weekdays 9:30-18:00",
            "category": "General",
            "tags": ["hours"]
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["is_active"], true);
    assert_eq!(created["tags"], json!(["hours"]));

    let updated: Value = app
        .client
        .put(app.url(&format!("/api/admin/faqs/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "answer": "Weekdays 9:30-18:00, closed on holidays", "is_active": false }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(updated["question"], "What are your opening hours?");
    assert_eq!(updated["answer"], "Weekdays 9:30-18:00, closed on holidays");
    assert_eq!(updated["is_active"], false);
    assert_eq!(updated["category"], "General");

    let list: Vec<Value> = app
        .client
        .get(app.url("/api/admin/faqs"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);

    let deleted = app
        .client
        .delete(app.url(&format!("/api/admin/faqs/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(deleted.status().as_u16(), 200);

    // A second delete of the same id fails cleanly.
    let again = app
        .client
        .delete(app.url(&format!("/api/admin/faqs/{id}")))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(again.status().as_u16(), 404);
    let body: Value = again.json().await?;
    assert_eq!(body["detail"], "FAQ not found");

    Ok(())
}

#[tokio::test]
async fn test_empty_category_is_stored_as_null() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let created: Value = app
        .client
        .post(app.url("/api/admin/faqs"))
        .bearer_auth(&token)
        .json(&json!({ "question": "Q1", "answer": "A1", "category": "", "is_active": true }))
        .send()
        .await?
        .json()
        .await?;
    assert!(created["category"].is_null());

    let id = created["id"].as_i64().unwrap();
    let updated: Value = app
        .client
        .put(app.url(&format!("/api/admin/faqs/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "category": "Services" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["category"], "Services");

    let cleared: Value = app
        .client
        .put(app.url(&format!("/api/admin/faqs/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "category": "" }))
        .send()
        .await?
        .json()
        .await?;
    assert!(cleared["category"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_faq_validation_and_missing_ids() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let blank = app
        .client
        .post(app.url("/api/admin/faqs"))
        .bearer_auth(&token)
        .json(&json!({ "question": "  ", "answer": "A" }))
        .send()
        .await?;
    assert_eq!(blank.status().as_u16(), 400);

    let missing = app
        .client
        .put(app.url("/api/admin/faqs/999"))
        .bearer_auth(&token)
        .json(&json!({ "question": "Q" }))
        .send()
        .await?;
    assert_eq!(missing.status().as_u16(), 404);

    Ok(())
}

#[tokio::test]
async fn test_faq_routes_require_a_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let list = app.client.get(app.url("/api/admin/faqs")).send().await?;
    assert_eq!(list.status().as_u16(), 401);

    let create = app
        .client
        .post(app.url("/api/admin/faqs"))
        .json(&json!({ "question": "Q", "answer": "A" }))
        .send()
        .await?;
    assert_eq!(create.status().as_u16(), 401);

    Ok(())
}

#[tokio::test]
async fn test_faq_list_pagination() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    for i in 1..=5 {
        app.client
            .post(app.url("/api/admin/faqs"))
            .bearer_auth(&token)
            .json(&json!({ "question": format!("Q{i}"), "answer": format!("A{i}") }))
            .send()
            .await?
            .error_for_status()?;
    }

    let page: Vec<Value> = app
        .client
        .get(app.url("/api/admin/faqs?skip=1&limit=2"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let questions: Vec<_> = page.iter().map(|f| f["question"].as_str().unwrap()).collect();
    assert_eq!(questions, vec!["Q2", "Q3"]);

    Ok(())
}
