//! Escape sequence cleaner.
//!
//! Terminal programs redraw their screen with ANSI escape sequences, spinner
//! animation glyphs, and shell-integration OSC markers. The cleaner strips
//! all of that in a single combined pass, leaving the human-meaningful text.
//!
//! Two properties matter downstream and are pinned by tests:
//!
//! - Cleaning is idempotent: `clean(clean(x)) == clean(x)`.
//! - Cleaning never trims. A payload whose only content is a single space or
//!   newline survives unchanged, because the classifier needs to distinguish
//!   "no content" from "a lone space is real content". Trimming is the
//!   caller's decision.

use once_cell::sync::Lazy;
use regex::Regex;

/// Combined removal pattern, applied in one pass so a sequence removed by an
/// earlier sub-pattern can never expose a partial match to a later one.
///
/// Alternation order matters: a BEL-terminated OSC body must be consumed
/// whole before the two-byte `ESC ]` alternative can eat just its opener.
static CLEANUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        // OSC sequences, ESC ] ... BEL (window title, shell integration)
        r"\x1B\][^\x07]*\x07",
        "|",
        // CSI sequences and two-byte ESC sequences
        r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])",
        "|",
        // cursor save/restore, ESC 7 / ESC 8
        r"\x1B[78]",
        "|",
        // Braille glyph block used for loading-spinner animation
        r"[\x{2800}-\x{28FF}]",
        "|",
        // remaining C0/C1 control characters, keeping \t and \n
        r"[\x00-\x08\x0B-\x1F\x7F-\x9F]",
    ))
    .expect("cleanup pattern is valid")
});

/// Collapse runs of 3+ spaces to a single space.
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" {3,}").expect("valid pattern"));

/// Collapse runs of 3+ newlines to a blank line.
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid pattern"));

/// Strip terminal control sequences from a raw payload.
///
/// Removes CSI and OSC sequences, cursor save/restore, spinner glyphs, and
/// stray control bytes (keeping `\n` and `\t`), then collapses excessive
/// whitespace. Does not trim.
pub fn clean(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let stripped = CLEANUP.replace_all(raw, "");
    let spaced = SPACE_RUNS.replace_all(&stripped, " ");
    NEWLINE_RUNS.replace_all(&spaced, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(clean("hello world"), "hello world");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_removes_csi_color_codes() {
        assert_eq!(clean("\x1b[32mgreen\x1b[39m"), "green");
        assert_eq!(clean("\x1b[1;31mbold red\x1b[0m"), "bold red");
    }

    #[test]
    fn test_removes_cursor_movement() {
        assert_eq!(clean("\x1b[2J\x1b[Htop"), "top");
        assert_eq!(clean("line\x1b[1A\x1b[2K"), "line");
    }

    #[test]
    fn test_removes_osc_sequences() {
        assert_eq!(clean("\x1b]0;window title\x07text"), "text");
        assert_eq!(clean("\x1b]697;NewCmd=abc123\x07"), "");
    }

    #[test]
    fn test_removes_cursor_save_restore() {
        assert_eq!(clean("\x1b7saved\x1b8"), "saved");
    }

    #[test]
    fn test_removes_spinner_glyphs() {
        assert_eq!(clean("⠋⠙⠹ Thinking..."), " Thinking...");
        assert_eq!(clean("⠸⠼⠴⠦⠧⠇⠏"), "");
    }

    #[test]
    fn test_removes_carriage_returns() {
        assert_eq!(clean("pwd\r\n"), "pwd\n");
        assert_eq!(clean("a\rb\rc"), "abc");
    }

    #[test]
    fn test_keeps_newlines_and_tabs() {
        assert_eq!(clean("col1\tcol2\nrow2"), "col1\tcol2\nrow2");
    }

    #[test]
    fn test_collapses_space_runs() {
        assert_eq!(clean("a     b"), "a b");
        // two spaces are below the threshold and survive
        assert_eq!(clean("a  b"), "a  b");
    }

    #[test]
    fn test_collapses_newline_runs() {
        assert_eq!(clean("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_preserves_lone_space() {
        assert_eq!(clean(" "), " ");
    }

    #[test]
    fn test_preserves_lone_newline() {
        assert_eq!(clean("\n"), "\n");
    }

    #[test]
    fn test_no_trimming() {
        assert_eq!(clean("  padded  "), "  padded  ");
        assert_eq!(clean("\ntrailing\n"), "\ntrailing\n");
    }

    #[test]
    fn test_idempotence() {
        let fixtures = [
            "\x1b[32m> \x1b[39mhello",
            "⠋ Thinking...",
            "\x1b]697;EndPrompt\x07$ ",
            "a     b\n\n\n\nc",
            " ",
            "\r\npwd\r\n",
            "plain text with\ttabs",
        ];
        for raw in fixtures {
            let once = clean(raw);
            let twice = clean(&once);
            assert_eq!(twice, once, "clean not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_mixed_real_world_fragment() {
        let raw = "\x1b[?25l\x1b[2K\x1b[1G⠙ Thinking...\x1b[?25h";
        assert_eq!(clean(raw).trim(), "Thinking...");
    }

    #[test]
    fn test_fragmented_osc_opener() {
        // an OSC opener with no terminator in this frame loses only the
        // ESC ] pair, leaving the readable remainder
        assert_eq!(clean("\x1b]697;NewCmd="), "697;NewCmd=");
    }
}
