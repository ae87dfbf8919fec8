//! Incremental tag scanner over any [`BufRead`] source.
//!
//! The source may hand back as little as one byte per read. Nothing here
//! assumes that a read boundary lines up with a tag or a value: tag text and
//! declared-length values are accumulated across as many reads as it takes.

use std::io::{self, BufRead, ErrorKind};

use thiserror::Error;

use super::element::Element;

/// Wire-syntax faults inside a single `<...>` tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTag {
    /// Declared length is not a non-negative decimal integer.
    #[error("tag <{name}> declares a non-numeric length {text:?}")]
    BadLength {
        /// Lowercased tag name.
        name: String,
        /// Length text as found on the wire.
        text: String,
    },
    /// Type code is longer than one character.
    #[error("tag <{name}> has a multi-character type code {code:?}")]
    TypeCodeTooLong {
        /// Lowercased tag name.
        name: String,
        /// Type code text as found on the wire.
        code: String,
    },
    /// More than two `:` separators.
    #[error("tag <{tag}> has more than two ':' separators")]
    TooManyColons {
        /// Full tag text.
        tag: String,
    },
    /// A length was declared but the name is empty.
    #[error("tag <{tag}> has an empty name")]
    EmptyName {
        /// Full tag text.
        tag: String,
    },
}

/// Failure modes of [`Tokenizer::next_element`].
#[derive(Debug, Error)]
pub enum TokenError {
    /// Underlying source failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    /// Tag text could not be classified.
    #[error(transparent)]
    Malformed(#[from] MalformedTag),
    /// Stream ended inside a tag or a declared-length value.
    #[error("input ended inside a tag or value")]
    Truncated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filler {
    /// Only whitespace since the last line break.
    Lead,
    Slash,
    Comment,
    Text,
}

/// Pull-based element scanner.
pub struct Tokenizer<R> {
    src: R,
    tag: Vec<u8>,
    /// Nothing but whitespace has been consumed since the last line break.
    line_start: bool,
}

impl<R: BufRead> Tokenizer<R> {
    /// Wraps a buffered source.
    pub fn new(src: R) -> Self {
        Self {
            src,
            tag: Vec::with_capacity(32),
            line_start: true,
        }
    }

    /// Returns the wrapped source.
    pub fn into_inner(self) -> R {
        self.src
    }

    /// Skips whitespace and returns the next byte without consuming it.
    ///
    /// `Ok(None)` means the source is exhausted.
    pub fn peek_significant(&mut self) -> Result<Option<u8>, TokenError> {
        loop {
            if !self.fill()? {
                return Ok(None);
            }
            let (skip, next) = {
                let buf = self.src.fill_buf()?;
                let skip = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
                if buf[..skip].iter().any(|&b| b == b'\n' || b == b'\r') {
                    self.line_start = true;
                }
                (skip, buf.get(skip).copied())
            };
            self.src.consume(skip);
            if next.is_some() {
                return Ok(next);
            }
        }
    }

    /// Pulls the next element.
    ///
    /// `Ok(None)` is clean end-of-input: the stream ended while skipping
    /// filler between tags.
    pub fn next_element(&mut self) -> Result<Option<Element>, TokenError> {
        loop {
            if !self.skip_filler()? {
                return Ok(None);
            }
            self.scan_tag()?;
            if self.tag.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return self.classify_and_read().map(Some);
        }
    }

    /// Waits until buffered bytes are available. `false` means end-of-stream.
    fn fill(&mut self) -> io::Result<bool> {
        loop {
            match self.src.fill_buf() {
                Ok(buf) => return Ok(!buf.is_empty()),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// Consumes bytes up to and including the next `<` outside a comment.
    ///
    /// A comment is a line whose first non-blank text is `//`. A `//` after
    /// a tag or value on the same line is plain filler.
    fn skip_filler(&mut self) -> io::Result<bool> {
        let mut state = if self.line_start {
            Filler::Lead
        } else {
            Filler::Text
        };
        loop {
            if !self.fill()? {
                return Ok(false);
            }
            let (used, found) = {
                let buf = self.src.fill_buf()?;
                let mut used = 0;
                let mut found = false;
                for &b in buf {
                    used += 1;
                    state = match (state, b) {
                        (Filler::Comment, b'\n' | b'\r') => Filler::Lead,
                        (Filler::Comment, _) => Filler::Comment,
                        (_, b'<') => {
                            found = true;
                            break;
                        }
                        (_, b'\n' | b'\r') => Filler::Lead,
                        (Filler::Lead, b'/') => Filler::Slash,
                        (Filler::Lead, b) if b.is_ascii_whitespace() => Filler::Lead,
                        (Filler::Slash, b'/') => Filler::Comment,
                        _ => Filler::Text,
                    };
                }
                (used, found)
            };
            self.src.consume(used);
            self.line_start = state == Filler::Lead;
            if found {
                return Ok(true);
            }
        }
    }

    /// Collects tag text up to `>`. A fresh `<` restarts the tag.
    fn scan_tag(&mut self) -> Result<(), TokenError> {
        self.tag.clear();
        loop {
            if !self.fill()? {
                return Err(TokenError::Truncated);
            }
            let (used, closed) = {
                let buf = self.src.fill_buf()?;
                match buf.iter().position(|&b| b == b'>' || b == b'<') {
                    Some(i) if buf[i] == b'<' => {
                        self.tag.clear();
                        (i + 1, false)
                    }
                    Some(i) => {
                        self.tag.extend_from_slice(&buf[..i]);
                        (i + 1, true)
                    }
                    None => {
                        self.tag.extend_from_slice(buf);
                        (buf.len(), false)
                    }
                }
            };
            self.src.consume(used);
            if closed {
                self.line_start = false;
                return Ok(());
            }
        }
    }

    fn classify_and_read(&mut self) -> Result<Element, TokenError> {
        let parts: Vec<&[u8]> = self.tag.split(|&b| b == b':').collect();
        let name = String::from_utf8_lossy(parts[0]).trim().to_ascii_lowercase();

        if parts.len() == 1 {
            return Ok(Element::bare(name));
        }
        if parts.len() > 3 {
            return Err(MalformedTag::TooManyColons {
                tag: String::from_utf8_lossy(&self.tag).into_owned(),
            }
            .into());
        }
        if name.is_empty() {
            return Err(MalformedTag::EmptyName {
                tag: String::from_utf8_lossy(&self.tag).into_owned(),
            }
            .into());
        }

        let len_text = String::from_utf8_lossy(parts[1]);
        let digits = len_text.trim();
        let len = digits
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| digits.parse::<usize>().ok())
            .flatten()
            .ok_or_else(|| MalformedTag::BadLength {
                name: name.clone(),
                text: len_text.clone().into_owned(),
            })?;

        let type_code = match parts.get(2).map(|code| String::from_utf8_lossy(code)) {
            None => None,
            Some(code) => {
                let code = code.trim();
                let mut chars = code.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => None,
                    (Some(c), None) => Some(c.to_ascii_uppercase()),
                    (Some(_), Some(_)) => {
                        return Err(MalformedTag::TypeCodeTooLong {
                            name,
                            code: code.to_string(),
                        }
                        .into());
                    }
                }
            }
        };

        let value = self.read_value(len)?;
        Ok(Element {
            name,
            value: Some(value),
            type_code,
        })
    }

    /// Reads exactly `len` raw bytes, whatever they contain.
    fn read_value(&mut self, len: usize) -> Result<Vec<u8>, TokenError> {
        let mut value = Vec::with_capacity(len.min(64 * 1024));
        while value.len() < len {
            if !self.fill()? {
                return Err(TokenError::Truncated);
            }
            let take = {
                let buf = self.src.fill_buf()?;
                let take = (len - value.len()).min(buf.len());
                value.extend_from_slice(&buf[..take]);
                take
            };
            self.src.consume(take);
        }
        if let Some(&last) = value.last() {
            self.line_start = last == b'\n' || last == b'\r';
        }
        Ok(value)
    }
}
