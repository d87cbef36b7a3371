//! Splitting of an input line into an argument vector.
//!
//! There is no quoting, escaping or substitution: every maximal run of
//! non-delimiter characters is one token, passed through literally.

/// Characters separating tokens: space, tab, carriage return, newline and bell.
pub const TOKEN_DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// Ordered tokens of one input line.
///
/// Tokens are views into the line they were split from, so an
/// `ArgumentVector` cannot outlive that line. The end of the list is signalled
/// by [`ArgumentVector::get`] returning `None`, which no token can be confused
/// with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector<'line> {
    tokens: Vec<&'line str>,
}

impl<'line> ArgumentVector<'line> {
    /// The command token, if the line had any token at all.
    pub fn command(&self) -> Option<&'line str> {
        self.get(0)
    }

    /// Tokens following the command token.
    pub fn args(&self) -> &[&'line str] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<&'line str> {
        self.tokens.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[&'line str] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &'line str> + '_ {
        self.tokens.iter().copied()
    }
}

/// Split `line` into whitespace-delimited tokens.
///
/// Consecutive delimiters collapse, so no token is ever empty. A blank line
/// yields an empty vector.
pub fn split_into_tokens(line: &str) -> ArgumentVector<'_> {
    ArgumentVector {
        tokens: line
            .split(TOKEN_DELIMITERS)
            .filter(|token| !token.is_empty())
            .collect(),
    }
}
