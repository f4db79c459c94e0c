//! Raw game extraction from PGN documents.
//!
//! A PGN file holds one or more games: an optional tag-pair block, a blank
//! line, the movetext, then a blank line (or simply the next game's tag
//! block) before the following game. The scanner cuts the document into one
//! raw chunk per game without interpreting movetext.

/// Splits a PGN document into per-game chunks.
pub struct Scanner<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over an in-memory document.
    pub fn new(input: &'a str) -> Self {
        Scanner {
            lines: input.lines().collect(),
            cursor: 0,
        }
    }

    /// Returns true if another game chunk remains.
    pub fn has_next(&self) -> bool {
        self.lines[self.cursor..]
            .iter()
            .any(|line| !line.trim().is_empty())
    }

    /// Returns the next raw game chunk, or `None` at end of input.
    pub fn scan_game(&mut self) -> Option<String> {
        // Skip blank separation
        while self
            .lines
            .get(self.cursor)
            .is_some_and(|line| line.trim().is_empty())
        {
            self.cursor += 1;
        }
        if self.cursor >= self.lines.len() {
            return None;
        }

        let mut chunk: Vec<&str> = Vec::new();
        let mut in_movetext = false;

        while let Some(&line) = self.lines.get(self.cursor) {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if in_movetext {
                    break;
                }
                // Blank line between the tag block and the movetext
                self.cursor += 1;
                continue;
            }

            if trimmed.starts_with('[') && in_movetext {
                // The next game's tag block begins
                break;
            }

            if !trimmed.starts_with('[') {
                in_movetext = true;
            }
            chunk.push(line);
            self.cursor += 1;
        }

        if chunk.is_empty() {
            None
        } else {
            Some(chunk.join("\n"))
        }
    }

    /// Abandons the current position and moves to the next game boundary.
    /// Used to recover after a chunk fails to parse.
    pub fn skip_to_next_game(&mut self) {
        while let Some(&line) = self.lines.get(self.cursor) {
            if line.trim().is_empty() {
                break;
            }
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_game_with_tags() {
        let input = "[Event \"Test\"]\n[Site \"?\"]\n\n1. e4 e5 *\n";
        let mut scanner = Scanner::new(input);
        assert!(scanner.has_next());
        let game = scanner.scan_game().unwrap();
        assert!(game.contains("[Event \"Test\"]"));
        assert!(game.contains("1. e4 e5 *"));
        assert!(!scanner.has_next());
        assert_eq!(scanner.scan_game(), None);
    }

    #[test]
    fn movetext_only() {
        let mut scanner = Scanner::new("1. d4 d5 1/2-1/2");
        let game = scanner.scan_game().unwrap();
        assert_eq!(game, "1. d4 d5 1/2-1/2");
    }

    #[test]
    fn two_games_split_on_blank_lines() {
        let input = "[White \"A\"]\n\n1. e4 *\n\n[White \"B\"]\n\n1. d4 *\n";
        let mut scanner = Scanner::new(input);
        let first = scanner.scan_game().unwrap();
        assert!(first.contains("[White \"A\"]"));
        assert!(first.contains("1. e4 *"));
        let second = scanner.scan_game().unwrap();
        assert!(second.contains("[White \"B\"]"));
        assert!(second.contains("1. d4 *"));
        assert!(!scanner.has_next());
    }

    #[test]
    fn next_header_ends_a_game_without_blank_line() {
        let input = "1. e4 *\n[White \"B\"]\n\n1. d4 *";
        let mut scanner = Scanner::new(input);
        assert_eq!(scanner.scan_game().unwrap(), "1. e4 *");
        let second = scanner.scan_game().unwrap();
        assert!(second.contains("[White \"B\"]"));
    }

    #[test]
    fn multiline_movetext_stays_together() {
        let input = "[Event \"X\"]\n\n1. e4 e5\n2. Nf3 Nc6\n1-0";
        let mut scanner = Scanner::new(input);
        let game = scanner.scan_game().unwrap();
        assert!(game.contains("2. Nf3 Nc6"));
        assert!(game.ends_with("1-0"));
    }

    #[test]
    fn empty_input() {
        let mut scanner = Scanner::new("");
        assert!(!scanner.has_next());
        assert_eq!(scanner.scan_game(), None);

        let mut blank = Scanner::new("\n\n\n");
        assert!(!blank.has_next());
        assert_eq!(blank.scan_game(), None);
    }
}
