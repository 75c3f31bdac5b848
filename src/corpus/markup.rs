//! Play-formatting cleanup
//!
//! Project Gutenberg style play texts carry decorative markup and
//! speaker-cue lines ("FAUST (allein).") that must not reach the modeled
//! corpus. Speaker cues are detected while the text still has its line
//! structure and rewritten to a `**Names:` tag; the tag survives
//! whitespace collapsing and is stripped in a second pass.

use once_cell::sync::Lazy;
use regex::Regex;

/// Decorative markup characters used for emphasis in the source texts.
static DECORATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[~_]").unwrap());

/// Em-dash rendered as a double hyphen.
static DOUBLE_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"--").unwrap());

/// Emphasis markup of the form `=word ... word=` (single line).
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\w.*?\w=").unwrap());

/// A speaker-cue line: after a newline, one or more capitalized words,
/// optionally a parenthetical aside, terminated by a period.
static SPEAKER_CUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\n)((?:[A-ZÖÄÜ]\w+ ?)+)( \(.*?\))?\.").unwrap());

/// The tag form emitted by [`tag_speaker_cues`], matched after whitespace
/// collapsing. Only the tag and the names are stripped; a tagged aside
/// stays in the text as narration.
static SPEAKER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([A-ZÖÄÜ]\w+\s?)+:").unwrap());

/// Apply the play-specific cleanup steps in order: strip decoration,
/// collapse double hyphens, remove emphasis markup, tag speaker cues.
///
/// Must run before whitespace collapsing; cue detection needs the
/// newline adjacency.
pub fn tag_speaker_cues(text: &str) -> String {
    let text = DECORATION.replace_all(text, "");
    let text = DOUBLE_HYPHEN.replace_all(&text, "-");
    let text = EMPHASIS.replace_all(&text, "");
    SPEAKER_CUE
        .replace_all(&text, "${1}**${2}:${3}")
        .into_owned()
}

/// Collapse every whitespace run (including newlines) to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WHITESPACE.replace_all(text, " ").into_owned()
}

/// Strip the `**Names:` speaker tags emitted by [`tag_speaker_cues`].
///
/// Idempotent: once stripped, the pattern no longer matches.
pub fn strip_speaker_tags(text: &str) -> String {
    SPEAKER_TAG.replace_all(text, "").into_owned()
}
