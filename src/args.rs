//! Launch argument tokenizer.
//!
//! Splits the preset's single `arguments` string into the list of `<arg>`
//! entries written to `meta.xml`. Quoting follows a small shell-like state
//! machine:
//!
//! - unquoted spaces separate arguments;
//! - `"..."` and `'...'` group text, and the other quote kind is literal inside;
//! - a backslash escapes a following space, quote or backslash; before any
//!   other character it is kept as-is together with that character.
//!
//! Empty arguments are never produced: runs of spaces and bare `""` or `''`
//! between separators are dropped rather than passed on as `<arg></arg>`.
//!
//! Tokenizing never fails: an unterminated quote simply runs to the end of
//! the input.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Quote::Double),
            '\'' => Some(Quote::Single),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Tokenizer {
    tokens: Vec<String>,
    current: String,
    quote: Option<Quote>,
    escaping: bool,
}

impl Tokenizer {
    fn feed(&mut self, c: char) {
        match c {
            ' ' => {
                if self.quote.is_some() {
                    if self.escaping {
                        self.current.push('\\');
                        self.escaping = false;
                    }
                    self.current.push(c);
                } else if self.escaping {
                    self.current.push(c);
                    self.escaping = false;
                } else {
                    self.flush();
                }
            }
            '"' | '\'' => {
                let kind = Quote::from_char(c);
                if self.escaping {
                    self.current.push(c);
                    self.escaping = false;
                } else if let Some(open) = self.quote {
                    if Some(open) == kind {
                        self.quote = None;
                    } else {
                        self.current.push(c);
                    }
                } else {
                    self.quote = kind;
                }
            }
            '\\' => {
                if self.escaping {
                    self.current.push(c);
                    self.escaping = false;
                } else {
                    self.escaping = true;
                }
            }
            _ => {
                // Escapes only apply to the characters above.
                if self.escaping {
                    self.current.push('\\');
                    self.escaping = false;
                }
                self.current.push(c);
            }
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.tokens.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<String> {
        if self.escaping {
            self.current.push('\\');
        }
        self.flush();
        self.tokens
    }
}

/// Split a raw argument string into individual arguments.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokenizer = Tokenizer::default();
    for c in raw.chars() {
        tokenizer.feed(c);
    }
    tokenizer.finish()
}
