//! The word list: an immutable, uppercase membership test loaded once at
//! startup.

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Loads one uppercase word per line; blank lines are skipped and
    /// surrounding whitespace is trimmed, matching the original loader's
    /// forgiving behavior.
    pub fn load_from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::load_from_reader(file)
    }

    pub fn load_from_reader(reader: impl Read) -> std::io::Result<Self> {
        let buffered = BufReader::new(reader);
        let mut words = HashSet::new();
        for line in buffered.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            words.insert(trimmed.to_uppercase());
        }
        Ok(Dictionary { words })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_and_whitespace_are_ignored() {
        let dict = Dictionary::load_from_reader("cat\n\n  dog  \nCAT\n".as_bytes()).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("cat"));
        assert!(dict.contains("DOG"));
    }

    #[test]
    fn membership_is_case_insensitive() {
        let dict = Dictionary::load_from_reader("word\n".as_bytes()).unwrap();
        assert!(dict.contains("WORD"));
        assert!(dict.contains("word"));
    }
}
