//! Message assembly for outgoing conversations.
//!
//! A conversation sent to the backend carries the system prompt exactly
//! once. If the caller already supplied a system message (anywhere in the
//! list) it is left alone: nothing is moved, merged, or deduplicated.

use tracing::trace;

use crate::config::system_prompt;
use crate::{Message, MessageRole};

/// Whether any message in `messages` has the system role.
pub fn has_system_message(messages: &[Message]) -> bool {
    messages.iter().any(|m| m.role == MessageRole::System)
}

/// Prepend a system message built from `system_prompt` unless one exists.
pub fn ensure_system_prompt(mut messages: Vec<Message>, system_prompt: &str) -> Vec<Message> {
    if has_system_message(&messages) {
        trace!("caller supplied a system message; leaving conversation as-is");
        return messages;
    }
    messages.insert(0, Message::system(system_prompt));
    messages
}

/// [`ensure_system_prompt`] with the canonical GFM system prompt.
pub fn assemble(messages: Vec<Message>) -> Vec<Message> {
    ensure_system_prompt(messages, system_prompt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::SYSTEM_PROMPT;

    #[test]
    fn injects_system_prompt_at_front() {
        let input = vec![Message::user("hi"), Message::assistant("hello"), Message::user("again")];
        let out = assemble(input.clone());
        assert_eq!(out.len(), input.len() + 1);
        assert_eq!(out[0], Message::system(SYSTEM_PROMPT));
        assert_eq!(&out[1..], &input[..]);
        assert_eq!(out.iter().filter(|m| m.role == MessageRole::System).count(), 1);
    }

    #[test]
    fn empty_conversation_gets_system_prompt_only() {
        let out = assemble(vec![]);
        assert_eq!(out, vec![Message::system(SYSTEM_PROMPT)]);
    }

    #[test]
    fn existing_system_message_left_in_place() {
        let input = vec![
            Message::user("first"),
            Message::system("custom"),
            Message::assistant("ok"),
        ];
        let out = assemble(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn custom_prompt_text_used() {
        let out = ensure_system_prompt(vec![Message::user("q")], "be brief");
        assert_eq!(out[0].content, "be brief");
        assert_eq!(out[0].role, MessageRole::System);
    }
}
