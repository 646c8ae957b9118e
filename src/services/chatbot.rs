use serde_json::json;
use uuid::Uuid;

use crate::db::models::{ChatRecord, ChatRequest, ChatResponse, NewChatRecord, Page};
use crate::db::store::Store;
use crate::errors::{AppError, AppResult};
use crate::services::gemini::Prompt;
use crate::services::knowledge::{self, KnowledgeEntry};
use crate::utils::config::AppState;

/// Number of earlier turns of the same session replayed to the generator.
pub const HISTORY_TURNS: i64 = 5;
/// Number of knowledge entries offered as context.
pub const CONTEXT_RESULTS: usize = 3;

const NO_CONTEXT: &str = "No related information was found.";

const SYSTEM_PROMPT: &str = "You are the official chatbot assistant of Comman Inc.

[Company]
Comman Inc. is an AI adoption partner that strengthens companies through generative AI and branding, \
serving mainly small and medium-sized businesses in and around Tokushima Prefecture.

[Services]
1. Generative AI training
2. Website production
3. System development
4. Branding training
5. Marketing consulting, web and social ad operations, video production, maintenance

[Contact]
Phone: 088-611-2333 (weekdays 9:30-18:00)

[Guidelines]
- Answer politely, in the language the visitor writes in.
- Explain technical terms when needed.
- Base your answer on the reference information below.
- If you are not sure, say that it needs confirmation and suggest contacting the company.";

pub fn build_context(entries: &[KnowledgeEntry]) -> String {
    if entries.is_empty() {
        return NO_CONTEXT.to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "[Reference {}] ({})\n{}",
                i + 1,
                entry.metadata.source,
                entry.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `history` must be in chronological order.
pub fn build_prompt(message: &str, history: &[ChatRecord], entries: &[KnowledgeEntry]) -> Prompt {
    let system = format!(
        "{}\n\n[Reference information]\n{}",
        SYSTEM_PROMPT,
        build_context(entries)
    );

    let conversation = history
        .iter()
        .map(|turn| format!("User: {}\nAssistant: {}", turn.user_message, turn.bot_response))
        .collect::<Vec<_>>()
        .join("\n\n");

    let user = if conversation.is_empty() {
        format!("User: {}\nAssistant:", message)
    } else {
        format!(
            "Previous conversation:\n{}\n\nUser: {}\nAssistant:",
            conversation, message
        )
    };

    Prompt { system, user }
}

/// Loads every active FAQ and document. Each turn re-ranks the whole
/// knowledge base in memory, so cost grows linearly with its size.
async fn knowledge_entries(store: &dyn Store) -> AppResult<Vec<KnowledgeEntry>> {
    let faqs = store.list_active_faqs().await?;
    let documents = store.list_active_documents().await?;

    Ok(faqs
        .iter()
        .map(KnowledgeEntry::from)
        .chain(documents.iter().map(KnowledgeEntry::from))
        .collect())
}

/// Runs one chat turn: resolves the session, gathers history and context,
/// asks the generator and records the exchange.
pub async fn handle_turn(state: &AppState, request: ChatRequest) -> AppResult<ChatResponse> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let session_id = match request.session_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            let id = Uuid::new_v4().to_string();
            tracing::info!("Created new session: {}", id);
            id
        }
    };

    let mut history = state
        .store
        .list_chat_records(Some(&session_id), Page::new(None, Some(HISTORY_TURNS)))
        .await?;
    history.reverse();

    let entries = knowledge::search(
        message,
        knowledge_entries(state.store.as_ref()).await?,
        CONTEXT_RESULTS,
    );
    tracing::info!(
        "Session {}: {} history turns, {} context entries",
        session_id,
        history.len(),
        entries.len()
    );

    let prompt = build_prompt(message, &history, &entries);
    let response = state.generator.generate(&prompt).await?;

    let context_used: Vec<_> = entries.iter().map(KnowledgeEntry::excerpt).collect();
    state
        .store
        .create_chat_record(NewChatRecord {
            session_id: session_id.clone(),
            user_message: message.to_string(),
            bot_response: response.clone(),
            context_used: Some(json!({ "contexts": context_used })),
        })
        .await?;

    Ok(ChatResponse {
        response,
        session_id,
        context_used: Some(context_used),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::KnowledgeMetadata;
    use chrono::Utc;

    fn turn(user: &str, bot: &str) -> ChatRecord {
        ChatRecord {
            id: 1,
            session_id: "s".into(),
            user_message: user.into(),
            bot_response: bot.into(),
            context_used: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_context_uses_placeholder() {
        assert_eq!(build_context(&[]), NO_CONTEXT);
    }

    #[test]
    fn prompt_numbers_references_and_replays_history() {
        let entries = vec![KnowledgeEntry::new(
            "Question: hours\nAnswer: 9:30-18:00",
            "hours\n9:30-18:00",
            KnowledgeMetadata {
                source: "FAQ".into(),
                category: None,
                id: 4,
            },
        )];
        let history = vec![turn("hello", "hi there")];

        let prompt = build_prompt("what are your hours?", &history, &entries);

        assert!(prompt.system.contains("[Reference 1] (FAQ)\nQuestion: hours"));
        assert!(prompt.user.starts_with("Previous conversation:\nUser: hello\nAssistant: hi there"));
        assert!(prompt.user.ends_with("User: what are your hours?\nAssistant:"));
    }

    #[test]
    fn first_turn_has_no_history_block() {
        let prompt = build_prompt("hello", &[], &[]);
        assert_eq!(prompt.user, "User: hello\nAssistant:");
    }
}
