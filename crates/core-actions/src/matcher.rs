//! Boundary-aware trailing-token recognition.

use core_text::char_len;
use regex::Regex;

/// Candidate trigger found at the end of the trailing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerHit {
    pub trigger: String,
    /// Chars to remove ending at the cursor: the trigger plus any terminator
    /// the host already inserted.
    pub delete_len: usize,
    /// Terminator the host already inserted after the trigger.
    pub typed_terminator: Option<char>,
}

#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    prefix: char,
    pattern: Regex,
}

impl TriggerMatcher {
    pub fn new(prefix: char) -> Result<Self, regex::Error> {
        let escaped = regex::escape(prefix.encode_utf8(&mut [0; 4]));
        let pattern = Regex::new(&format!(r"(?:^|\s)({escaped}\S*)$"))?;
        Ok(Self { prefix, pattern })
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Token ending exactly at the end of `trailing`, at the start of the
    /// text or right after whitespace. `foo/invoice` yields nothing.
    pub fn find(&self, trailing: &str) -> Option<TriggerHit> {
        // Only the last whitespace-delimited run can match.
        let from = trailing
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, _)| i);
        let caps = self.pattern.captures(&trailing[from..])?;
        let token = caps.get(1)?.as_str();
        Some(TriggerHit {
            trigger: token.to_string(),
            delete_len: char_len(token),
            typed_terminator: None,
        })
    }

    /// Like [`find`](Self::find) for text whose last char is a whitespace
    /// terminator the host already applied.
    pub fn find_before_terminator(&self, trailing: &str) -> Option<TriggerHit> {
        let (at, terminator) = trailing.char_indices().next_back()?;
        if !terminator.is_whitespace() {
            return None;
        }
        let hit = self.find(&trailing[..at])?;
        Some(TriggerHit {
            delete_len: hit.delete_len + 1,
            typed_terminator: Some(terminator),
            ..hit
        })
    }
}
