//! PGN tokenizer.
//!
//! Turns one raw game chunk into the token stream of [`TokenKind`]. Move
//! words are split into their SAN constituents here, so the parser only
//! deals with structure: `Nbxd2+` becomes `Piece File Capture Square
//! Check`. Castling must be written with letter O; `0-0` is not accepted.

use super::token::{Token, TokenKind};
use super::PgnError;

/// Tokenizes a single game chunk.
pub fn tokenize(input: &str) -> Result<Vec<Token>, PgnError> {
    Tokenizer::new(input).run()
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Tokenizer {
    fn new(input: &str) -> Self {
        Tokenizer {
            chars: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>) {
        self.tokens.push(Token::new(kind, value));
    }

    fn error(&self, message: impl Into<String>) -> PgnError {
        PgnError::Syntax(format!("{} (at offset {})", message.into(), self.pos))
    }

    fn run(mut self) -> Result<Vec<Token>, PgnError> {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.pos += 1;
                }
                '[' => self.tag_pair()?,
                '{' => self.comment()?,
                '(' => {
                    self.pos += 1;
                    self.push(TokenKind::VariationStart, "(");
                }
                ')' => {
                    self.pos += 1;
                    self.push(TokenKind::VariationEnd, ")");
                }
                '$' => self.nag()?,
                '*' => {
                    self.pos += 1;
                    self.push(TokenKind::Result, "*");
                }
                '.' => self.dots(),
                c if c.is_ascii_digit() => self.number_or_result()?,
                c if c.is_ascii_alphabetic() => self.word()?,
                other => return Err(self.error(format!("unexpected character {:?}", other))),
            }
        }
        self.push(TokenKind::Eof, "");
        Ok(self.tokens)
    }

    fn tag_pair(&mut self) -> Result<(), PgnError> {
        self.pos += 1; // [
        self.push(TokenKind::TagStart, "[");
        self.skip_spaces();

        let mut key = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                key.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if key.is_empty() {
            return Err(self.error("expected tag key"));
        }
        self.push(TokenKind::TagKey, key);
        self.skip_spaces();

        if self.bump() != Some('"') {
            return Err(self.error("expected quoted tag value"));
        }
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error("unterminated tag value")),
                },
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated tag value")),
            }
        }
        self.push(TokenKind::TagValue, value);
        self.skip_spaces();

        if self.bump() != Some(']') {
            return Err(self.error("expected closing ] after tag value"));
        }
        self.push(TokenKind::TagEnd, "]");
        Ok(())
    }

    fn comment(&mut self) -> Result<(), PgnError> {
        self.pos += 1; // {
        self.push(TokenKind::CommentStart, "{");
        let mut text = String::new();

        loop {
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    self.flush_comment_text(&mut text);
                    self.push(TokenKind::CommentEnd, "}");
                    return Ok(());
                }
                Some('[') if self.peek_at(1) == Some('%') => {
                    self.flush_comment_text(&mut text);
                    self.command()?;
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated comment")),
            }
        }
    }

    /// Emits accumulated comment text as a trimmed `Comment` token.
    fn flush_comment_text(&mut self, text: &mut String) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let token = trimmed.to_string();
            self.push(TokenKind::Comment, token);
        }
        text.clear();
    }

    fn command(&mut self) -> Result<(), PgnError> {
        self.pos += 2; // [%
        self.push(TokenKind::CommandStart, "[%");

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ']' {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        if name.is_empty() {
            return Err(self.error("expected command name after [%"));
        }
        self.push(TokenKind::CommandName, name);
        self.skip_spaces();

        let mut param = String::new();
        loop {
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    param.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated command")),
            }
        }
        let param = param.trim_end().to_string();
        if !param.is_empty() {
            self.push(TokenKind::CommandParam, param);
        }
        self.push(TokenKind::CommandEnd, "]");
        Ok(())
    }

    fn nag(&mut self) -> Result<(), PgnError> {
        self.pos += 1; // $
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(self.error("expected digits after $"));
        }
        self.push(TokenKind::Nag, format!("${}", digits));
        Ok(())
    }

    fn dots(&mut self) {
        let mut count = 0;
        while self.peek() == Some('.') {
            self.pos += 1;
            count += 1;
        }
        if count >= 3 {
            self.push(TokenKind::Ellipsis, "...");
        } else {
            self.push(TokenKind::Dot, ".");
        }
    }

    fn number_or_result(&mut self) -> Result<(), PgnError> {
        for result in ["1-0", "0-1", "1/2-1/2"] {
            if self.lookahead_matches(result) {
                self.pos += result.chars().count();
                self.push(TokenKind::Result, result);
                return Ok(());
            }
        }

        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::MoveNumber, digits);
        Ok(())
    }

    fn lookahead_matches(&self, literal: &str) -> bool {
        for (offset, expected) in literal.chars().enumerate() {
            if self.peek_at(offset) != Some(expected) {
                return false;
            }
        }
        // The literal must end the word: a digit after "1-0" would make it
        // something else entirely
        !matches!(
            self.peek_at(literal.chars().count()),
            Some(c) if c.is_ascii_alphanumeric()
        )
    }

    fn word(&mut self) -> Result<(), PgnError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '=' | '+' | '#' | '-') {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        self.split_move_word(&word)
    }

    /// Splits one SAN word into its tokens.
    fn split_move_word(&mut self, word: &str) -> Result<(), PgnError> {
        let (body, check) = match word.strip_suffix(['+', '#']) {
            Some(stripped) => (stripped, word.chars().last()),
            None => (word, None),
        };

        match body {
            "O-O" => self.push(TokenKind::KingsideCastle, "O-O"),
            "O-O-O" => self.push(TokenKind::QueensideCastle, "O-O-O"),
            _ => self.split_standard_move(body, word)?,
        }

        if let Some(c) = check {
            self.push(TokenKind::Check, c.to_string());
        }
        Ok(())
    }

    fn split_standard_move(&mut self, body: &str, word: &str) -> Result<(), PgnError> {
        let bad = |this: &Self| this.error(format!("malformed move {:?}", word));

        let (body, promotion) = match body.split_once('=') {
            Some((head, promo)) => {
                if promo.len() != 1 || !"NBRQ".contains(promo) {
                    return Err(bad(self));
                }
                (head, Some(promo.to_string()))
            }
            None => (body, None),
        };

        let mut chars: Vec<char> = body.chars().collect();

        let piece = match chars.first() {
            Some(c) if "NBRQK".contains(*c) => {
                let letter = chars.remove(0);
                Some(letter.to_string())
            }
            _ => None,
        };

        let capture = match chars.iter().position(|&c| c == 'x') {
            Some(idx) => {
                chars.remove(idx);
                // x must sit directly before the destination
                if idx != chars.len().saturating_sub(2) {
                    return Err(bad(self));
                }
                true
            }
            None => false,
        };

        if chars.len() < 2 {
            return Err(bad(self));
        }
        let dest: String = chars[chars.len() - 2..].iter().collect();
        if !is_square(&dest) {
            return Err(bad(self));
        }

        let origin: String = chars[..chars.len() - 2].iter().collect();
        if let Some(p) = &piece {
            self.push(TokenKind::Piece, p.clone());
        }
        match origin.len() {
            0 => {}
            1 => {
                let c = origin.chars().next().unwrap();
                if c.is_ascii_lowercase() && ('a'..='h').contains(&c) {
                    self.push(TokenKind::File, origin);
                } else if ('1'..='8').contains(&c) {
                    self.push(TokenKind::Rank, origin);
                } else {
                    return Err(bad(self));
                }
            }
            2 if is_square(&origin) => {
                self.push(TokenKind::DisambiguationSquare, origin);
            }
            _ => return Err(bad(self)),
        }
        if capture {
            self.push(TokenKind::Capture, "x");
        }
        self.push(TokenKind::Square, dest);
        if let Some(promo) = promotion {
            self.push(TokenKind::Promotion, "=");
            self.push(TokenKind::PromotionPiece, promo);
        }
        Ok(())
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }
}

fn is_square(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1])
}
