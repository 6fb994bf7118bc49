//! Multi-part object names such as `[dbo].[Orders].[IX_Orders_Date]`

use std::fmt;

use sqlparser::dialect::MsSqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// An ordered list of name parts, outermost first.
///
/// Model names are one part for database-scoped objects (`[alice]`), two parts for
/// schema-scoped objects (`[dbo].[Orders]`) and three or more for sub-objects
/// (`[dbo].[Orders].[Id]`). An empty name is valid; singleton elements such as
/// database options carry no name at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    parts: Vec<String>,
}

impl QualifiedName {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty name.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a name as written in model.xml.
    ///
    /// Uses the sqlparser MsSql tokenizer so bracketed parts may contain dots and
    /// escaped `]]`. Input the tokenizer rejects falls back to a bracket-aware split.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Self::empty();
        }
        parse_tokenized(trimmed).unwrap_or_else(|| Self {
            parts: split_bracketed(trimmed),
        })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The schema qualifier: the first part of a name with at least two parts.
    pub fn schema(&self) -> Option<&str> {
        if self.parts.len() > 1 {
            self.parts.first().map(String::as_str)
        } else {
            None
        }
    }

    /// The innermost part.
    pub fn object_name(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// The name with its innermost part removed, or `None` for names of fewer than two parts.
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.parts.len() < 2 {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", bracket(part))?;
        }
        Ok(())
    }
}

/// Wrap an identifier in brackets, escaping embedded `]`.
pub fn bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

fn parse_tokenized(name: &str) -> Option<QualifiedName> {
    let dialect = MsSqlDialect {};
    let tokens = Tokenizer::new(&dialect, name).tokenize().ok()?;

    let mut parts = Vec::new();
    let mut expect_part = true;
    for token in tokens {
        match token {
            Token::Whitespace(_) => continue,
            Token::Word(word) if expect_part => {
                parts.push(word.value);
                expect_part = false;
            }
            Token::Period if !expect_part => expect_part = true,
            _ => return None,
        }
    }

    if expect_part {
        // Empty input or a trailing period
        return None;
    }
    Some(QualifiedName { parts })
}

fn split_bracketed(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '[' if !in_brackets => in_brackets = true,
            ']' if in_brackets => {
                if chars.peek() == Some(&']') {
                    chars.next();
                    current.push(']');
                } else {
                    in_brackets = false;
                }
            }
            '.' if !in_brackets => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
