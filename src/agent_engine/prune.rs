use std::collections::HashSet;

use crate::llm::tools::TAKE_SCREENSHOT;
use crate::llm::types::ChatMessage;

/// Index pairs `(tool, user)` where a `take_screenshot` result is directly
/// followed by the user turn carrying the image. Pairs never overlap.
pub fn screenshot_pairs(messages: &[ChatMessage]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i + 1 < messages.len() {
        if messages[i].tool_name() == Some(TAKE_SCREENSHOT) && messages[i + 1].carries_image() {
            pairs.push((i, i + 1));
            i += 2;
        } else {
            i += 1;
        }
    }
    pairs
}

/// Drop every screenshot observation pair except the most recent one,
/// keeping all other turns in order. Returns the number of messages removed.
///
/// Older screenshots are discarded outright; the model only ever sees the
/// latest capture. This bounds request size on long runs.
pub fn prune_stale_screenshots(messages: &mut Vec<ChatMessage>) -> usize {
    let pairs = screenshot_pairs(messages);
    if pairs.len() <= 1 {
        return 0;
    }

    let drop: HashSet<usize> = pairs[..pairs.len() - 1]
        .iter()
        .flat_map(|&(tool, user)| [tool, user])
        .collect();

    let mut idx = 0;
    messages.retain(|_| {
        let keep = !drop.contains(&idx);
        idx += 1;
        keep
    });
    drop.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ContentPart, FunctionCall, ToolCall};

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: "{}".into(),
            },
        }
    }

    /// Assistant request + tool confirmation + image turn, tagged by `n`.
    fn screenshot_round(n: usize) -> Vec<ChatMessage> {
        let c = call(&format!("shot{n}"), TAKE_SCREENSHOT);
        vec![
            ChatMessage::assistant(None, vec![c.clone()]),
            ChatMessage::tool_result(&c, "Screenshot captured."),
            ChatMessage::user_parts(vec![
                ContentPart::text("Current screen:"),
                ContentPart::png_base64(&format!("img{n}")),
            ]),
        ]
    }

    fn action_round(n: usize) -> Vec<ChatMessage> {
        let c = call(&format!("click{n}"), "click_mouse");
        vec![
            ChatMessage::assistant(Some(format!("step {n}")), vec![c.clone()]),
            ChatMessage::tool_result(&c, "Mouse clicked."),
        ]
    }

    fn seed() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("task")]
    }

    #[test]
    fn no_pairs_is_noop() {
        let mut messages = seed();
        messages.extend(action_round(1));
        let before = messages.clone();
        assert_eq!(prune_stale_screenshots(&mut messages), 0);
        assert_eq!(messages, before);
    }

    #[test]
    fn single_pair_is_noop() {
        let mut messages = seed();
        messages.extend(screenshot_round(1));
        messages.extend(action_round(2));
        let before = messages.clone();
        assert_eq!(prune_stale_screenshots(&mut messages), 0);
        assert_eq!(messages, before);
    }

    #[test]
    fn keeps_only_latest_pair_and_preserves_order() {
        let mut messages = seed();
        for n in 0..4 {
            messages.extend(screenshot_round(n));
            messages.extend(action_round(n));
        }
        let before = messages.clone();
        assert_eq!(screenshot_pairs(&messages).len(), 4);

        let removed = prune_stale_screenshots(&mut messages);

        assert_eq!(removed, 2 * 3);
        assert_eq!(messages.len(), before.len() - 6);
        assert_eq!(screenshot_pairs(&messages).len(), 1);

        // The survivors are `before` minus the stale pairs, in the same order.
        let stale: Vec<ChatMessage> = screenshot_pairs(&before)[..3]
            .iter()
            .flat_map(|&(t, u)| [before[t].clone(), before[u].clone()])
            .collect();
        let expected: Vec<ChatMessage> = before
            .iter()
            .filter(|m| !stale.contains(m))
            .cloned()
            .collect();
        assert_eq!(messages, expected);

        // The last pair is intact.
        let (t, u) = screenshot_pairs(&messages)[0];
        assert_eq!(messages[t], before[before.len() - 4]);
        assert_eq!(messages[u], before[before.len() - 3]);
    }

    #[test]
    fn assistant_requests_survive_pruning() {
        let mut messages = seed();
        messages.extend(screenshot_round(1));
        messages.extend(screenshot_round(2));
        prune_stale_screenshots(&mut messages);

        let roles: Vec<&str> = messages.iter().map(ChatMessage::role).collect();
        assert_eq!(roles, ["system", "user", "assistant", "assistant", "tool", "user"]);
    }

    #[test]
    fn screenshot_result_without_image_turn_is_not_a_pair() {
        let c = call("s", TAKE_SCREENSHOT);
        let messages = vec![
            ChatMessage::tool_result(&c, "Screenshot captured."),
            ChatMessage::user("plain text follow-up"),
            ChatMessage::tool_result(&c, "Screenshot captured."),
        ];
        assert!(screenshot_pairs(&messages).is_empty());
    }
}
