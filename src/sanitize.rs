//! Cleanup of agent replies before display.

use std::sync::LazyLock;

use regex::Regex;

static TOOL_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<codebuff_tool_call>.*?</codebuff_tool_call>")
        .expect("tool call pattern should compile")
});

/// Removes every `<codebuff_tool_call>...</codebuff_tool_call>` span and trims
/// surrounding whitespace.
///
/// Spans are matched lazily, so two calls separated by prose keep the prose.
/// An opening tag with no closing tag is left alone.
pub fn strip_tool_calls(reply: &str) -> String {
    TOOL_CALL.replace_all(reply, "").trim().to_string()
}
