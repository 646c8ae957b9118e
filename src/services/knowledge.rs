//! Context retrieval over the knowledge base.
//!
//! Active FAQs and documents are rendered into plain-text entries and ranked
//! against the visitor's message by shared terms. Terms are lowercase
//! alphanumeric runs; scripts without word spacing are split into character
//! bigrams so that Japanese text still produces overlap.

use std::collections::HashSet;

use crate::db::models::{ContextUsed, Document, Faq, KnowledgeMetadata};

pub const FAQ_SOURCE: &str = "FAQ";
pub const DOCUMENT_SOURCE: &str = "Document";
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    /// Labelled form shown to the generator and recorded as the excerpt.
    pub text: String,
    pub metadata: KnowledgeMetadata,
    /// The entry's own fields without labels; the only text that is ranked.
    search_text: String,
}

impl From<&Faq> for KnowledgeEntry {
    fn from(faq: &Faq) -> Self {
        Self::new(
            format!("Question: {}\nAnswer: {}", faq.question, faq.answer),
            format!("{}\n{}", faq.question, faq.answer),
            KnowledgeMetadata {
                source: FAQ_SOURCE.to_string(),
                category: faq.category.clone(),
                id: faq.id,
            },
        )
    }
}

impl From<&Document> for KnowledgeEntry {
    fn from(document: &Document) -> Self {
        Self::new(
            format!("Title: {}\nContent: {}", document.title, document.content),
            format!("{}\n{}", document.title, document.content),
            KnowledgeMetadata {
                source: DOCUMENT_SOURCE.to_string(),
                category: document.category.clone(),
                id: document.id,
            },
        )
    }
}

impl KnowledgeEntry {
    pub fn new(
        text: impl Into<String>,
        search_text: impl Into<String>,
        metadata: KnowledgeMetadata,
    ) -> Self {
        Self {
            text: text.into(),
            metadata,
            search_text: search_text.into(),
        }
    }

    /// Truncated form recorded alongside each chat turn.
    pub fn excerpt(&self) -> ContextUsed {
        let head: String = self.text.chars().take(EXCERPT_CHARS).collect();
        ContextUsed {
            document: format!("{}...", head),
            metadata: self.metadata.clone(),
        }
    }
}

fn is_spaced(c: char) -> bool {
    c.is_ascii_alphanumeric() || (c.is_alphabetic() && (c as u32) < 0x2E80)
}

fn terms(text: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut word = String::new();
    let mut unspaced: Vec<char> = Vec::new();

    let flush_word = |word: &mut String, out: &mut HashSet<String>| {
        if word.chars().count() > 1 {
            out.insert(std::mem::take(word));
        } else {
            word.clear();
        }
    };
    let flush_unspaced = |run: &mut Vec<char>, out: &mut HashSet<String>| {
        for pair in run.windows(2) {
            out.insert(pair.iter().collect());
        }
        run.clear();
    };

    for c in text.chars() {
        if is_spaced(c) {
            flush_unspaced(&mut unspaced, &mut out);
            word.extend(c.to_lowercase());
        } else if c.is_alphanumeric() {
            flush_word(&mut word, &mut out);
            unspaced.push(c);
        } else {
            flush_word(&mut word, &mut out);
            flush_unspaced(&mut unspaced, &mut out);
        }
    }
    flush_word(&mut word, &mut out);
    flush_unspaced(&mut unspaced, &mut out);
    out
}

/// Returns up to `limit` entries sharing at least one term with `query`,
/// best first. Ties keep the input order.
pub fn search(query: &str, entries: Vec<KnowledgeEntry>, limit: usize) -> Vec<KnowledgeEntry> {
    let query_terms = terms(query);
    if query_terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, KnowledgeEntry)> = entries
        .into_iter()
        .map(|entry| {
            let score = terms(&entry.search_text).intersection(&query_terms).count();
            (score, entry)
        })
        .filter(|(score, _)| *score > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, e)| e).collect()
}
