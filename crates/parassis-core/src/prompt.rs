//! Prompt construction for summaries and page-scoped chat
//!
//! Turns assembled reading context into provider-agnostic instructions. The
//! thread prompt carries the trimmed prior-page context, the effective
//! current content and the analysis directives; the condense prompt is the
//! simpler pre-summarization instruction used when a page exceeds the
//! context budget.

use crate::core_types::{Message, ThreadContext};

/// Ceiling for a pre-summarized page, in characters.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Default output language when the settings store has none recorded.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Instruction used to compress an over-budget page before the main call.
pub fn condense_prompt(content: &str) -> String {
    format!(
        "Summarize the following text in {} characters or less:\n\n{}",
        MAX_SUMMARY_CHARS, content
    )
}

/// Builds the thread-summary instruction. `current` is the effective current
/// content: the page itself, or its pre-summarized form when the page was
/// over budget.
pub fn thread_prompt(ctx: &ThreadContext, current: &str, language: &str, math: bool) -> String {
    let mut prompt = String::new();
    if !ctx.breadcrumb.is_empty() {
        let trail: Vec<&str> = ctx.breadcrumb.iter().map(|(_, text)| text.as_str()).collect();
        prompt.push_str(&format!("Current reading position: {}\n\n", trail.join(" > ")));
    }
    prompt.push_str(&format!(
        "Given the following context from previous pages:\n\n\
         {context}\n\n\
         And the current content:\n\n\
         {current}\n\n\
         Analyze the plot clues in the current content by leveraging relevant references from the previous pages.\n\n\
         - Summarize the current content in the selected language. The language is {language}.\n\
         - Identify the plot clues that appear in both the current content and previous pages.\n\
         - Present the output in an itemized format:\n\
           1. For each plot clue, provide a single sentence summarizing its relevance.\n\
           2. Follow this with an analysis explaining how the plot clue evolves, connects to prior plot, and contributes to the current content.\n\
         - Ensure that connections to previous pages are direct and relevant. Do not introduce unrelated elements or fabricate connections that do not exist.\n\
         - If applicable, highlight how past threads influence or shape the ideas on the current page.\n",
        context = ctx.context,
        current = current,
        language = language,
    ));
    if math {
        prompt.push_str(
            "- Wrap every mathematical expression in inline $...$ or display $$...$$ delimiters.\n",
        );
    }
    prompt
}

/// Builds the message list for an interactive chat turn scoped to the
/// current page: a system message grounding the conversation in the page
/// content, followed by the accumulated history.
pub fn chat_messages(page_content: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(Message::system(format!(
        "You are a reading assistant. The user is currently reading the following page; \
         answer questions grounded in it.\n\n{}",
        page_content
    )));
    messages.extend_from_slice(history);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{PageRecord, Role};

    fn sample_context() -> ThreadContext {
        ThreadContext {
            target: PageRecord {
                id: 4,
                content: "the current page".to_string(),
                heading: 0,
            },
            context: "previous page text".to_string(),
            breadcrumb: vec![(1, "Chapter One".to_string()), (2, "Part A".to_string())],
        }
    }

    #[test]
    fn condense_prompt_names_the_budget() {
        let prompt = condense_prompt("long text");
        assert!(prompt.contains("500 characters or less"));
        assert!(prompt.ends_with("long text"));
    }

    #[test]
    fn thread_prompt_embeds_context_content_and_language() {
        let prompt = thread_prompt(&sample_context(), "the current page", "中文", false);
        assert!(prompt.contains("previous page text"));
        assert!(prompt.contains("the current page"));
        assert!(prompt.contains("The language is 中文"));
        assert!(prompt.contains("Chapter One > Part A"));
        assert!(!prompt.contains("$$"));
    }

    #[test]
    fn thread_prompt_math_directive_is_optional() {
        let with_math = thread_prompt(&sample_context(), "x", "English", true);
        assert!(with_math.contains("$$...$$"));
    }

    #[test]
    fn thread_prompt_omits_empty_breadcrumb() {
        let mut ctx = sample_context();
        ctx.breadcrumb.clear();
        let prompt = thread_prompt(&ctx, "x", "English", false);
        assert!(!prompt.contains("reading position"));
    }

    #[test]
    fn chat_messages_prepend_grounding_system_message() {
        let history = vec![Message::user("who is the narrator?")];
        let messages = chat_messages("page body", &history);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("page body"));
        assert_eq!(messages[1], history[0]);
    }
}
