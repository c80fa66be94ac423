//! Free-text chat logs to speaker-tagged turns, and back.
//!
//! Input is one message per line in the form `<label>: <text>`. The label is
//! matched case-insensitively; anything that is not recognised as the user is
//! treated as the counterpart, so no labelled line is ever lost. Lines with
//! no label or no text are dropped without error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who said a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// The person asking for help.
    You,
    /// Whoever they are talking to.
    Them,
}

impl Speaker {
    /// Map a transcript label to a speaker.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "you" | "me" => Speaker::You,
            "them" | "her" | "him" | "partner" => Speaker::Them,
            _ => Speaker::Them,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::You => "You",
            Speaker::Them => "Them",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Parse a raw transcript into turns, in input order.
pub fn parse(raw: &str) -> Vec<Turn> {
    raw.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Turn> {
    let line = line.trim();
    let (label, rest) = line.split_once(':')?;
    let label = label.trim();
    let text = rest.trim();
    if label.is_empty() || text.is_empty() {
        return None;
    }
    Some(Turn::new(Speaker::from_label(label), text))
}

/// Render turns back into `Speaker: text` lines.
///
/// Original labels are not kept: `Her: ...` comes back as `Them: ...`.
pub fn render(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.speaker, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(turns: &[Turn]) -> Vec<(Speaker, String)> {
        turns.iter().map(|t| (t.speaker, t.text.clone())).collect()
    }

    #[test]
    fn unlabelled_and_empty_lines_are_dropped() {
        assert!(parse("hello").is_empty());
        assert!(parse("You: ").is_empty());
        assert!(parse(": hi").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn you_line_is_self() {
        let turns = parse("You: hi");
        assert_eq!(pairs(&turns), vec![(Speaker::You, "hi".to_string())]);
    }

    #[test]
    fn unknown_label_defaults_to_counterpart() {
        let turns = parse("Alex: sup");
        assert_eq!(pairs(&turns), vec![(Speaker::Them, "sup".to_string())]);
    }

    #[test]
    fn labels_are_case_insensitive_and_trimmed() {
        let turns = parse("  ME : first\nHER: second\npartner:third");
        assert_eq!(
            pairs(&turns),
            vec![
                (Speaker::You, "first".to_string()),
                (Speaker::Them, "second".to_string()),
                (Speaker::Them, "third".to_string()),
            ]
        );
    }

    #[test]
    fn text_keeps_later_colons() {
        let turns = parse("Them: meet at 10:30?");
        assert_eq!(turns[0].text, "meet at 10:30?");
    }

    #[test]
    fn crlf_input_parses() {
        let turns = parse("You: a\r\nThem: b\r\n");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].text, "b");
    }

    #[test]
    fn render_then_parse_is_stable() {
        let raw = "Her: are you coming?\nnoise line\nMe: yes\nBoss: ok: fine\nYou:   ";
        let first = parse(raw);
        let rendered = render(&first);
        assert_eq!(rendered, "Them: are you coming?\nYou: yes\nThem: ok: fine");
        assert_eq!(pairs(&parse(&rendered)), pairs(&first));
    }

    #[test]
    fn render_empty_is_empty() {
        assert_eq!(render(&[]), "");
    }
}
