//! Recording prompt files
//!
//! A prompt file has one prompt per line: an identifier, a space, and the
//! text the speaker is asked to read.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    /// Line number of the prompt, from 0
    pub index: usize,
    pub content: String,
}

/// Parse a prompt file
pub fn parse_prompt_file(text: &str) -> Vec<Prompt> {
    text.trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(index, line)| {
            let mut words = line.split(' ');
            let id = words.next().unwrap_or_default().to_string();
            let content = words.collect::<Vec<_>>().join(" ");

            Prompt { id, index, content }
        })
        .collect()
}
