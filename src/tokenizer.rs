//! Line and token cursor over the extracted statement text
//!
//! The statement arrives as an ordered list of physical lines. [`TokenStream`]
//! reads it either a line at a time or a whitespace-delimited token at a
//! time, lazily splitting the current line and exhausting its tokens before
//! moving on. The cursor only moves forward: the parser tries alternative
//! layouts on a [`TokenStream::fork`] and adopts it with
//! [`TokenStream::commit`] once a layout matches.

use crate::error::TxfError;

/// Immutable raw line stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText {
    lines: Vec<String>,
}

impl RawText {
    /// Split extracted text into lines
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Build from already split lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of physical lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over trimmed lines
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.trim())
    }

    /// Cursor positioned before the first line
    pub fn stream(&self) -> TokenStream<'_> {
        TokenStream::new(&self.lines)
    }
}

/// A physical line returned by the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    /// Trimmed line content
    pub text: &'a str,
}

/// A whitespace-delimited token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// 1-based line number the token came from
    pub line: usize,
}

/// Forward-only cursor over lines and tokens
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    lines: &'a [String],
    /// Index of the next line to load
    cursor: usize,
    /// Index of the line currently being tokenized
    current: Option<usize>,
    /// Tokens already taken from the current line
    consumed: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            cursor: 0,
            current: None,
            consumed: 0,
        }
    }

    /// 1-based number of the line last loaded (0 before the first one)
    pub fn line_number(&self) -> usize {
        self.cursor
    }

    /// Trimmed content of the line last loaded
    pub fn line_text(&self) -> &'a str {
        self.cursor
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(|l| l.trim())
            .unwrap_or("")
    }

    /// Advance to the next physical line, dropping unread tokens of the current one
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        let idx = self.cursor;
        let text = self.lines.get(idx)?.trim();
        self.cursor += 1;
        self.current = Some(idx);
        self.consumed = 0;
        Some(Line {
            number: idx + 1,
            text,
        })
    }

    /// Make the next non-blank line current without taking any of its tokens.
    ///
    /// Returns `None` at end of input.
    pub fn start_line(&mut self) -> Option<Line<'a>> {
        loop {
            let line = self.next_line()?;
            if !line.text.is_empty() {
                return Some(line);
            }
        }
    }

    /// Next token, pulling in further lines as the current one runs out.
    ///
    /// `None` means there is no more input at all.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            if let Some(token) = self.next_on_line() {
                return Some(token);
            }
            self.next_line()?;
        }
    }

    /// Next token of the current line only; `None` once the line is exhausted
    pub fn next_on_line(&mut self) -> Option<Token<'a>> {
        let idx = self.current?;
        let text = self.lines[idx].split_whitespace().nth(self.consumed)?;
        self.consumed += 1;
        Some(Token {
            text,
            line: idx + 1,
        })
    }

    /// Whether the current line still has unread tokens
    pub fn has_pending(&self) -> bool {
        self.current
            .map(|idx| self.lines[idx].split_whitespace().nth(self.consumed).is_some())
            .unwrap_or(false)
    }

    /// Advance until a line satisfies `pred`; that line is consumed and returned.
    ///
    /// Returns `None` when the input ends first.
    pub fn scan_until<F>(&mut self, mut pred: F) -> Option<Line<'a>>
    where
        F: FnMut(&str) -> bool,
    {
        while let Some(line) = self.next_line() {
            if pred(line.text) {
                self.current = None;
                return Some(line);
            }
        }
        None
    }

    /// Scan forward to the next security identifier line
    pub fn find_identifier(&mut self) -> Option<Line<'a>> {
        self.scan_until(crate::security::is_candidate)
    }

    /// Independent copy of the cursor for speculative parsing
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Adopt the position of a fork that parsed successfully
    pub fn commit(&mut self, fork: TokenStream<'a>) {
        debug_assert!(
            (fork.cursor, fork.consumed) >= (self.cursor, self.consumed),
            "token stream must not rewind"
        );
        *self = fork;
    }

    /// Structural error at the current line
    pub fn error(&self, expected: impl Into<String>) -> TxfError {
        TxfError::Parse {
            line: self.line_number(),
            content: self.line_text().to_string(),
            expected: expected.into(),
        }
    }

    /// Structural error at the line `token` came from
    pub fn error_at(&self, token: &Token<'_>, expected: impl Into<String>) -> TxfError {
        let content = token
            .line
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(|l| l.trim())
            .unwrap_or("");
        TxfError::Parse {
            line: token.line,
            content: content.to_string(),
            expected: expected.into(),
        }
    }

    /// Take a token that must exist, or fail with end-of-input
    pub fn expect_token(&mut self) -> Result<Token<'a>, TxfError> {
        self.next_token().ok_or(TxfError::UnexpectedEof {
            line: self.line_number(),
        })
    }

    /// Take a token of the current line, or fail naming what was expected
    pub fn expect_on_line(&mut self, expected: &str) -> Result<Token<'a>, TxfError> {
        match self.next_on_line() {
            Some(token) => Ok(token),
            None => Err(self.error(expected)),
        }
    }

    /// Fail unless the current line has been fully consumed
    pub fn expect_line_end(&self) -> Result<(), TxfError> {
        if self.has_pending() {
            Err(self.error("end of line"))
        } else {
            Ok(())
        }
    }
}
