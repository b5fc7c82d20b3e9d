//! Grounded-answer prompt

use crate::config::AnswerSettings;
use crate::retrieval::RetrievedDocument;

/// Context-only prompt with the two fixed refusal phrases
pub fn grounded_prompt(query: &str, docs: &[RetrievedDocument], answer: &AnswerSettings) -> String {
    let mut prompt = String::new();
    prompt.push_str("Answer the question using only the context below.\n");
    prompt.push_str(&format!(
        "- If the context does not contain the answer, reply exactly: {}\n",
        answer.insufficient_context
    ));
    prompt.push_str(&format!(
        "- If the question is unrelated to the context, reply exactly: {}\n",
        answer.off_topic
    ));
    prompt.push_str(&format!("- Answer in {} only.\n", answer.language));
    prompt.push_str("\nContext:\n");
    for (i, doc) in docs.iter().enumerate() {
        prompt.push_str(&format!("[{}] ({}) {}\n", i + 1, doc.source, doc.content.trim()));
    }
    prompt.push_str(&format!("\nQuestion: {}\n", query.trim()));
    prompt
}
