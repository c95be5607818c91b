//! Chunk classification.
//!
//! Turns raw terminal payloads into typed [`StreamChunk`]s. The remote
//! program never says "I am done" over the wire, so everything here is
//! pattern matching against a known, versioned vocabulary of escape
//! sequences: spinner glyphs mean thinking, a wrench-prefixed line means a
//! tool invocation, a colored idle prompt means the reply is complete.
//!
//! Each terminal type gets its own [`Ruleset`]. The marker patterns are
//! deliberately kept as data on the ruleset, pinned by fixture tests, so a
//! change in the remote program's output format is a one-line pattern update
//! rather than a rewrite.
//!
//! A [`Classifier`] is owned by exactly one session: it carries the last
//! chunk kind so that a reply fragmented across many small frames keeps
//! classifying as content. Sharing one across sessions would cross-talk
//! that continuity state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::cleaner::clean;
use crate::config::TerminalType;

/// Sentinel tool name when extraction from a tool-use marker fails.
pub const UNKNOWN_TOOL: &str = "unknown";

/// The kind of a classified output chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// The remote program is working; spinner frames are suppressed.
    Thinking,
    /// The remote program announced a tool invocation.
    ToolUse,
    /// Real reply content.
    Content,
    /// The remote program returned to its idle prompt.
    Complete,
    /// Something went wrong; the stream stays alive.
    Error,
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChunkKind::Thinking => "thinking",
            ChunkKind::ToolUse => "tool_use",
            ChunkKind::Content => "content",
            ChunkKind::Complete => "complete",
            ChunkKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// Open key/value metadata attached to a chunk.
pub type Metadata = HashMap<String, Value>;

/// Builders for the per-kind metadata maps.
pub struct MetadataBuilder;

impl MetadataBuilder {
    pub fn for_content(raw_length: usize, content_length: usize, terminal_type: &str) -> Metadata {
        HashMap::from([
            ("raw_length".to_string(), json!(raw_length)),
            ("content_length".to_string(), json!(content_length)),
            ("terminal_type".to_string(), json!(terminal_type)),
        ])
    }

    pub fn for_thinking(raw_length: usize, terminal_type: &str) -> Metadata {
        HashMap::from([
            ("raw_length".to_string(), json!(raw_length)),
            ("terminal_type".to_string(), json!(terminal_type)),
        ])
    }

    pub fn for_tool_use(tool_name: &str, raw_length: usize, terminal_type: &str) -> Metadata {
        HashMap::from([
            ("tool_name".to_string(), json!(tool_name)),
            ("raw_length".to_string(), json!(raw_length)),
            ("terminal_type".to_string(), json!(terminal_type)),
        ])
    }

    pub fn for_complete(
        execution_time: f64,
        command_success: bool,
        terminal_type: &str,
    ) -> Metadata {
        HashMap::from([
            ("execution_time".to_string(), json!(execution_time)),
            ("command_success".to_string(), json!(command_success)),
            ("terminal_type".to_string(), json!(terminal_type)),
        ])
    }

    pub fn for_error(error_message: &str, terminal_type: &str) -> Metadata {
        HashMap::from([
            ("error_message".to_string(), json!(error_message)),
            ("terminal_type".to_string(), json!(terminal_type)),
        ])
    }
}

/// One immutable unit of classified output.
#[derive(Debug, Clone, Serialize)]
pub struct StreamChunk {
    /// Cleaned text; may be empty or whitespace-only, and whitespace is
    /// meaningful.
    pub content: String,
    /// Chunk kind.
    pub kind: ChunkKind,
    /// Per-kind metadata.
    pub metadata: Metadata,
    /// When the chunk was produced.
    pub timestamp: DateTime<Utc>,
}

impl StreamChunk {
    /// Create a chunk stamped with the current time.
    pub fn new(content: impl Into<String>, kind: ChunkKind, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            kind,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Whether a caller would show this chunk to a user.
    pub fn is_user_visible(&self) -> bool {
        matches!(self.kind, ChunkKind::Content | ChunkKind::Error)
    }

    /// Whether this chunk ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ChunkKind::Complete | ChunkKind::Error)
    }

    /// The tool name, for tool-use chunks.
    pub fn tool_name(&self) -> Option<&str> {
        self.metadata.get("tool_name").and_then(Value::as_str)
    }
}

/// Outcome of classifying one payload.
#[derive(Debug)]
pub enum Classified {
    /// A chunk to deliver to the caller.
    Chunk(StreamChunk),
    /// The remote program reached its idle prompt. The executor builds the
    /// final complete chunk itself, with execution metadata.
    Complete,
}

// ---------------------------------------------------------------------------
// Shared patterns
// ---------------------------------------------------------------------------

/// Spinner animation plus its caption, matched on the raw payload.
static THINKING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{2800}-\x{28FF}]|Thinking\.\.\.").expect("valid pattern"));

/// Wrench-prefixed tool announcement, e.g. `🛠️  Using tool: web_search_exa`.
static TOOL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"🛠\x{FE0F}?\s*Using tool:\s*(\S+)?").expect("valid pattern"));

/// `"name"` field inside a structured tool-argument payload.
static JSON_NAME_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""name"\s*:\s*"([^"]+)""#).expect("valid pattern"));

/// Residue left when a CSI sequence is split across frames, e.g. `[2K` or `1A8`.
static CONTROL_RESIDUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[?\d*[A-Z]?$").expect("valid pattern"));

// ---------------------------------------------------------------------------
// Rulesets
// ---------------------------------------------------------------------------

/// Completion markers for the AI assistant: the colored idle prompt.
///
/// The assistant draws its prompt as a green `>` followed by a foreground
/// reset; two reset variants have been observed in the wild. Pinned by
/// fixture tests.
const ASSISTANT_COMPLETION_PATTERNS: &[&str] = &[
    r"\x1b\[32m[\r\n]*>\s*\x1b\[39m",
    r"\x1b\[32m[\r\n]*>\s*\x1b\[0m",
];

static ASSISTANT_COMPLETION: Lazy<Vec<Regex>> = Lazy::new(|| {
    ASSISTANT_COMPLETION_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("valid pattern"))
        .collect()
});

/// Banner phrases the assistant prints at startup; never reply content.
static ASSISTANT_BANNER: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"█\s*(?:Tools|Q responses|Your prompts):",
        r"💡\s*Pro Tips:",
        r"✓\s+\S+\s+loaded",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid pattern"))
    .collect()
});

/// Completion markers for plain shells: OSC 697 shell-integration
/// sequences emitted around each prompt. Matched as raw substrings.
const SHELL_COMPLETION_MARKERS: &[&str] = &[
    "\x1b]697;NewCmd=",
    "\x1b]697;EndPrompt",
    "\x1b]697;StartPrompt",
];

/// Cleaned residue of a fragmented OSC 697 marker.
static SHELL_MARKER_RESIDUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:697;)?(?:NewCmd=|EndPrompt|StartPrompt)").expect("valid pattern")
});

/// The per-terminal-type classification vocabulary.
///
/// One implementation per remote program kind. Keep the patterns on the
/// implementation as data so they can evolve with the remote program.
pub trait Ruleset: Send + Sync {
    /// Tag recorded in chunk metadata.
    fn terminal_type(&self) -> &'static str;

    /// Does the raw payload show a thinking/loading animation?
    fn is_thinking(&self, raw: &str) -> bool;

    /// If the payload announces a tool invocation, the tool's name.
    fn tool_use(&self, raw: &str, cleaned: &str) -> Option<String>;

    /// Does the raw payload contain an idle-prompt completion marker?
    fn is_complete(&self, raw: &str) -> bool;

    /// Is the cleaned payload startup banner noise rather than content?
    fn is_banner_noise(&self, cleaned: &str) -> bool;
}

/// Ruleset for an interactive AI command-line assistant.
#[derive(Debug, Default)]
pub struct AssistantRuleset;

impl Ruleset for AssistantRuleset {
    fn terminal_type(&self) -> &'static str {
        "assistant"
    }

    fn is_thinking(&self, raw: &str) -> bool {
        THINKING.is_match(raw)
    }

    fn tool_use(&self, raw: &str, cleaned: &str) -> Option<String> {
        if let Some(caps) = TOOL_MARKER.captures(raw) {
            let name = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_TOOL.to_string());
            return Some(name);
        }

        // Structured tool arguments: a JSON object carrying both a name and
        // arguments, or a fenced json block. Catches markers that were
        // fragmented across frames.
        let looks_structured = (cleaned.contains("\"name\"") && cleaned.contains("\"arguments\""))
            || cleaned.contains("```json");
        if looks_structured {
            let name = JSON_NAME_FIELD
                .captures(cleaned)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN_TOOL.to_string());
            return Some(name);
        }

        None
    }

    fn is_complete(&self, raw: &str) -> bool {
        ASSISTANT_COMPLETION.iter().any(|p| p.is_match(raw))
    }

    fn is_banner_noise(&self, cleaned: &str) -> bool {
        ASSISTANT_BANNER.iter().any(|p| p.is_match(cleaned))
    }
}

/// Ruleset for a plain shell with shell-integration prompt markers.
#[derive(Debug, Default)]
pub struct ShellRuleset;

impl Ruleset for ShellRuleset {
    fn terminal_type(&self) -> &'static str {
        "shell"
    }

    fn is_thinking(&self, _raw: &str) -> bool {
        false
    }

    fn tool_use(&self, _raw: &str, _cleaned: &str) -> Option<String> {
        None
    }

    fn is_complete(&self, raw: &str) -> bool {
        SHELL_COMPLETION_MARKERS.iter().any(|m| raw.contains(m))
    }

    fn is_banner_noise(&self, cleaned: &str) -> bool {
        SHELL_MARKER_RESIDUE.is_match(cleaned.trim())
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Per-session classifier carrying continuity state.
pub struct Classifier {
    ruleset: Box<dyn Ruleset>,
    last_kind: ChunkKind,
}

impl Classifier {
    /// Create a classifier for the given terminal type.
    pub fn new(terminal_type: TerminalType) -> Self {
        let ruleset: Box<dyn Ruleset> = match terminal_type {
            TerminalType::Shell => Box::new(ShellRuleset),
            TerminalType::Assistant => Box::new(AssistantRuleset),
        };
        Self {
            ruleset,
            last_kind: ChunkKind::Content,
        }
    }

    /// The kind of the last classified payload.
    pub fn last_kind(&self) -> ChunkKind {
        self.last_kind
    }

    /// Reset continuity state between commands.
    pub fn reset(&mut self) {
        self.last_kind = ChunkKind::Content;
    }

    /// Classify one raw payload.
    ///
    /// Ordered, first match wins:
    /// 1. spinner glyphs mean thinking (spinner frames are suppressed);
    /// 2. a tool-use marker, textual or structured JSON;
    /// 3. an idle-prompt completion marker;
    /// 4. non-trivial cleaned content, excluding banner noise;
    /// 5. whitespace after content continues the content;
    /// 6. otherwise nothing - the frame is noise, the last kind stands.
    ///
    /// Markers are matched on the *raw* payload because colored-prompt
    /// sequences do not survive cleaning; content comes from the cleaned one.
    pub fn classify(&mut self, raw: &str) -> Option<Classified> {
        let cleaned = clean(raw);
        let terminal_type = self.ruleset.terminal_type();

        if self.ruleset.is_thinking(raw) {
            self.last_kind = ChunkKind::Thinking;
            return Some(Classified::Chunk(StreamChunk::new(
                "",
                ChunkKind::Thinking,
                MetadataBuilder::for_thinking(raw.len(), terminal_type),
            )));
        }

        if let Some(tool_name) = self.ruleset.tool_use(raw, &cleaned) {
            self.last_kind = ChunkKind::ToolUse;
            return Some(Classified::Chunk(StreamChunk::new(
                "",
                ChunkKind::ToolUse,
                MetadataBuilder::for_tool_use(&tool_name, raw.len(), terminal_type),
            )));
        }

        if self.ruleset.is_complete(raw) {
            self.last_kind = ChunkKind::Complete;
            return Some(Classified::Complete);
        }

        if is_meaningful(&cleaned) && !self.ruleset.is_banner_noise(&cleaned) {
            let content = cleaned.trim().to_string();
            let metadata =
                MetadataBuilder::for_content(raw.len(), content.len(), terminal_type);
            self.last_kind = ChunkKind::Content;
            return Some(Classified::Chunk(StreamChunk::new(
                content,
                ChunkKind::Content,
                metadata,
            )));
        }

        // Continuation: whitespace directly after content belongs to that
        // content, preserved verbatim with no trimming. Non-whitespace text
        // that failed the content test is residue (prompt redraws, split
        // escape sequences) and never rides along as a continuation.
        if self.last_kind == ChunkKind::Content
            && !cleaned.is_empty()
            && cleaned.trim().is_empty()
        {
            let metadata =
                MetadataBuilder::for_content(raw.len(), cleaned.len(), terminal_type);
            return Some(Classified::Chunk(StreamChunk::new(
                cleaned,
                ChunkKind::Content,
                metadata,
            )));
        }

        None
    }
}

/// Non-trivial content test: rejects pure whitespace, pure punctuation,
/// bare prompt strings, and the short alphanumeric residue a fragmented
/// escape sequence leaves behind.
fn is_meaningful(cleaned: &str) -> bool {
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return false;
    }
    if matches!(trimmed, ">" | "$" | "#" | ">>>") {
        return false;
    }
    if trimmed.chars().all(|c| c.is_ascii_punctuation()) {
        return false;
    }
    // short fragments mixing digits and brackets ("78", "1A8", "[2K") are
    // escape-sequence residue; a short word ("pwd", "ls") is real output
    if trimmed.len() <= 3
        && trimmed
            .chars()
            .any(|c| c.is_ascii_digit() || c == '[' || c == ']')
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '[' || c == ']')
    {
        return false;
    }
    if CONTROL_RESIDUE.is_match(trimmed) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant() -> Classifier {
        Classifier::new(TerminalType::Assistant)
    }

    fn shell() -> Classifier {
        Classifier::new(TerminalType::Shell)
    }

    fn expect_chunk(outcome: Option<Classified>) -> StreamChunk {
        match outcome {
            Some(Classified::Chunk(chunk)) => chunk,
            other => panic!("expected a chunk, got {:?}", other),
        }
    }

    #[test]
    fn test_spinner_is_thinking() {
        let mut c = assistant();
        let chunk = expect_chunk(c.classify("⠙ Thinking..."));
        assert_eq!(chunk.kind, ChunkKind::Thinking);
        assert_eq!(chunk.content, "");
        assert_eq!(c.last_kind(), ChunkKind::Thinking);
    }

    #[test]
    fn test_bare_spinner_frame_is_thinking() {
        let mut c = assistant();
        let chunk = expect_chunk(c.classify("\x1b[2K\x1b[1G⠸"));
        assert_eq!(chunk.kind, ChunkKind::Thinking);
    }

    #[test]
    fn test_tool_use_marker_extracts_name() {
        let mut c = assistant();
        let chunk = expect_chunk(c.classify("🛠️  Using tool: web_search_exa"));
        assert_eq!(chunk.kind, ChunkKind::ToolUse);
        assert_eq!(chunk.tool_name(), Some("web_search_exa"));
        assert_eq!(chunk.metadata["terminal_type"], "assistant");
    }

    #[test]
    fn test_tool_use_marker_without_name_falls_back() {
        let mut c = assistant();
        let chunk = expect_chunk(c.classify("🛠️  Using tool: "));
        assert_eq!(chunk.kind, ChunkKind::ToolUse);
        assert_eq!(chunk.tool_name(), Some(UNKNOWN_TOOL));
    }

    #[test]
    fn test_structured_json_tool_arguments() {
        let mut c = assistant();
        let raw = r#"{"name": "aws_cli", "arguments": {"command": "s3 ls"}}"#;
        let chunk = expect_chunk(c.classify(raw));
        assert_eq!(chunk.kind, ChunkKind::ToolUse);
        assert_eq!(chunk.tool_name(), Some("aws_cli"));
    }

    #[test]
    fn test_fenced_json_block_is_tool_use() {
        let mut c = assistant();
        let chunk = expect_chunk(c.classify("```json\n{\"query\": \"rust\"}\n```"));
        assert_eq!(chunk.kind, ChunkKind::ToolUse);
        assert_eq!(chunk.tool_name(), Some(UNKNOWN_TOOL));
    }

    #[test]
    fn test_assistant_green_prompt_is_complete() {
        let mut c = assistant();
        assert!(matches!(
            c.classify("\x1b[32m\r\n> \x1b[39m"),
            Some(Classified::Complete)
        ));
        assert_eq!(c.last_kind(), ChunkKind::Complete);
    }

    #[test]
    fn test_assistant_reset_variant_is_complete() {
        let mut c = assistant();
        assert!(matches!(
            c.classify("\x1b[32m> \x1b[0m"),
            Some(Classified::Complete)
        ));
    }

    #[test]
    fn test_shell_osc697_markers_are_complete() {
        for marker in [
            "\x1b]697;NewCmd=abc\x07",
            "\x1b]697;EndPrompt\x07",
            "\x1b]697;StartPrompt\x07",
        ] {
            let mut c = shell();
            assert!(
                matches!(c.classify(marker), Some(Classified::Complete)),
                "marker {:?} not detected",
                marker
            );
        }
    }

    #[test]
    fn test_shell_ignores_assistant_prompt() {
        let mut c = shell();
        assert!(c.classify("\x1b[32m> \x1b[39m").is_none());
    }

    #[test]
    fn test_prompt_redraw_at_stream_start_is_noise() {
        // a fresh classifier must not emit a bare prompt redraw as content
        for raw in ["\x1b[32m> \x1b[39m", "> ", "$ ", "\x1b[2K[2K"] {
            let mut c = shell();
            assert!(c.classify(raw).is_none(), "leaked {:?} as a chunk", raw);
        }
    }

    #[test]
    fn test_residue_after_content_is_not_continuation() {
        let mut c = shell();
        expect_chunk(c.classify("real output line"));
        // prompt redraws and residue stay noise even mid-content
        assert!(c.classify("> ").is_none());
        assert!(c.classify("[2K").is_none());
        // whitespace still continues the content
        let chunk = expect_chunk(c.classify("\n"));
        assert_eq!(chunk.kind, ChunkKind::Content);
        assert_eq!(chunk.content, "\n");
    }

    #[test]
    fn test_plain_output_is_content() {
        let mut c = shell();
        let chunk = expect_chunk(c.classify("/tmp/x\r\n"));
        assert_eq!(chunk.kind, ChunkKind::Content);
        assert_eq!(chunk.content, "/tmp/x");
        assert_eq!(chunk.metadata["content_length"], 6);
    }

    #[test]
    fn test_whitespace_after_content_continues_content() {
        let mut c = assistant();
        expect_chunk(c.classify("first part of the reply"));
        let chunk = expect_chunk(c.classify(" "));
        assert_eq!(chunk.kind, ChunkKind::Content);
        assert_eq!(chunk.content, " ");
    }

    #[test]
    fn test_bare_prompt_is_not_content() {
        let mut c = shell();
        // no preceding content, a bare prompt is noise
        c.last_kind = ChunkKind::Complete;
        assert!(c.classify(">").is_none());
    }

    #[test]
    fn test_short_word_is_content() {
        let mut c = shell();
        c.last_kind = ChunkKind::Complete;
        let chunk = expect_chunk(c.classify("pwd\r\n"));
        assert_eq!(chunk.kind, ChunkKind::Content);
        assert_eq!(chunk.content, "pwd");
    }

    #[test]
    fn test_control_residue_is_not_content() {
        let mut c = shell();
        c.last_kind = ChunkKind::Complete;
        assert!(c.classify("[2K").is_none());
        assert!(c.classify("1A8").is_none());
    }

    #[test]
    fn test_banner_noise_is_not_content() {
        let mut c = assistant();
        assert!(c.classify("█ Tools: 12 tokens").is_none());
        assert!(c.classify("💡 Pro Tips: use /help").is_none());
        assert!(c.classify("✓ fetch loaded in 0.53 s").is_none());
    }

    #[test]
    fn test_banner_noise_does_not_continue_content() {
        let mut c = assistant();
        expect_chunk(c.classify("real reply text"));
        assert!(c.classify("💡 Pro Tips: /editor").is_none());
    }

    #[test]
    fn test_shell_marker_residue_is_noise() {
        let mut c = shell();
        c.last_kind = ChunkKind::Complete;
        // fragmented OSC 697 marker whose ESC ] pair was cleaned away
        assert!(c.classify("697;EndPrompt").is_none());
    }

    #[test]
    fn test_fallback_retains_last_kind() {
        let mut c = assistant();
        expect_chunk(c.classify("⠙ Thinking..."));
        assert!(c.classify("").is_none());
        assert_eq!(c.last_kind(), ChunkKind::Thinking);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let fixtures = [
            "🛠️  Using tool: web_search_exa",
            "⠙ Thinking...",
            "plain reply text",
            " ",
            "\x1b[32m> \x1b[39m",
        ];
        for raw in fixtures {
            let mut a = assistant();
            let mut b = assistant();
            let ka = a.classify(raw).map(|c| describe(&c));
            let kb = b.classify(raw).map(|c| describe(&c));
            assert_eq!(ka, kb, "nondeterministic for {:?}", raw);
        }

        fn describe(c: &Classified) -> (ChunkKind, String) {
            match c {
                Classified::Chunk(chunk) => (chunk.kind, chunk.content.clone()),
                Classified::Complete => (ChunkKind::Complete, String::new()),
            }
        }
    }

    #[test]
    fn test_reset_clears_continuity() {
        let mut c = assistant();
        expect_chunk(c.classify("⠙ Thinking..."));
        assert_eq!(c.last_kind(), ChunkKind::Thinking);
        c.reset();
        assert_eq!(c.last_kind(), ChunkKind::Content);
    }

    #[test]
    fn test_chunk_kind_display() {
        assert_eq!(ChunkKind::ToolUse.to_string(), "tool_use");
        assert_eq!(ChunkKind::Complete.to_string(), "complete");
    }

    #[test]
    fn test_chunk_serializes_to_api_shape() {
        let chunk = StreamChunk::new(
            "hello",
            ChunkKind::Content,
            MetadataBuilder::for_content(20, 5, "assistant"),
        );
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["content"], "hello");
        assert_eq!(value["kind"], "content");
        assert_eq!(value["metadata"]["raw_length"], 20);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_user_visibility_helpers() {
        let content = StreamChunk::new("x", ChunkKind::Content, Metadata::new());
        let thinking = StreamChunk::new("", ChunkKind::Thinking, Metadata::new());
        let complete = StreamChunk::new("", ChunkKind::Complete, Metadata::new());
        assert!(content.is_user_visible());
        assert!(!thinking.is_user_visible());
        assert!(!content.is_terminal());
        assert!(complete.is_terminal());
    }
}
