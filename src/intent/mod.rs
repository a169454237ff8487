//! Line classification: every input line takes exactly one path
//! through the loop, decided here.

use crate::commands::{self, CommandParse};
use once_cell::sync::Lazy;
use regex::Regex;

/// Classification outcome for one raw input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A `/`-prefixed line, with its parse outcome.
    Command(CommandParse),
    /// A natural-language request to create a file, carrying the
    /// captured file-type token (lowercased).
    FileCreation(String),
    /// Anything else: an ordinary chat turn.
    Chat,
}

const CREATION_KEYWORDS: &[&str] = &["create", "make", "write", "generate"];

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "what's up",
];

// The creation template: (create|make|write|generate) [a|an] [new] <word> file
static CREATION_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:create|make|write|generate)\s+(?:an?\s+)?(?:new\s+)?(\w+)\s+file\b")
        .expect("creation template regex is valid")
});

pub fn classify(line: &str) -> Intent {
    if let Some(parsed) = commands::parse(line) {
        return Intent::Command(parsed);
    }

    match file_creation_type(line) {
        Some(file_type) => Intent::FileCreation(file_type),
        None => Intent::Chat,
    }
}

/// The file-creation decision as one holistic predicate: all named
/// sub-checks must agree, and greeting suppression always wins. A line
/// that carries creation keywords but no extractable file-type token
/// yields `None` and is handled as ordinary chat.
pub fn file_creation_type(line: &str) -> Option<String> {
    if is_greeting(line) {
        return None;
    }
    if !contains_file_word(line) || !contains_creation_keyword(line) {
        return None;
    }
    extract_file_type(line)
}

pub fn contains_file_word(line: &str) -> bool {
    line.to_lowercase().contains("file")
}

pub fn contains_creation_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    CREATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// A line is a greeting when a greeting phrase is the whole line, opens
/// it before a non-alphanumeric boundary ("hello, can you make a file"),
/// or closes it after punctuation ("can you make a file? hey"). A
/// trailing greeting word separated by a bare space is treated as
/// sentence content, not a salutation, so "create a python file that
/// prints hi" still requests a file.
pub fn is_greeting(line: &str) -> bool {
    let trimmed = line.trim().to_lowercase();

    GREETINGS.iter().any(|greeting| {
        if trimmed == *greeting {
            return true;
        }
        if let Some(rest) = trimmed.strip_prefix(greeting) {
            if rest.chars().next().is_some_and(|c| !c.is_alphanumeric()) {
                return true;
            }
        }
        if let Some(rest) = trimmed.strip_suffix(greeting) {
            let rest = rest.trim_end();
            if !rest.is_empty() && rest.chars().last().is_some_and(|c| !c.is_alphanumeric()) {
                return true;
            }
        }
        false
    })
}

/// Capture the `<word>` slot of the creation template, lowercased.
pub fn extract_file_type(line: &str) -> Option<String> {
    CREATION_TEMPLATE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}
