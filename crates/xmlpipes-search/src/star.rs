//! Star-query rewriting.
//!
//! Prefix/infix matching on the daemon needs explicit wildcards. A star
//! query wraps every bare token as `*token*`, leaving operator syntax and
//! already-starred tokens alone:
//!
//! | Input | Output |
//! |-------|--------|
//! | `a b*` | `*a* b*` |
//! | `!h` | `!*h*` |
//! | `"i j"` | `"i j"` |
//! | `"m n"/3` | `"m n"/3` |
//! | `@o p` | `@o *p*` |
//!
//! Quoted phrases are never rewritten. A token directly after a proximity
//! (`~`), quorum (`/`), or field (`@`) operator is left as is. The rewrite is
//! idempotent.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use xmlpipes_core::{Error, Result};

/// Token pattern used when no custom pattern is given.
pub const DEFAULT_TOKEN: &str = r"\w+";

#[allow(clippy::expect_used)]
static DEFAULT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile(DEFAULT_TOKEN).expect("default star token pattern compiles")
});

fn compile(token: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#""(?:{token})(?:.*?(?:{token}))?"|(?:{token})"#
    ))
}

/// Compiled token pattern for star rewriting.
#[derive(Debug, Clone)]
pub struct StarPattern {
    token: String,
    regex: Regex,
}

impl StarPattern {
    /// Pattern with a custom token expression, e.g. `[\w@.-]+` to keep
    /// email addresses whole.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `token` is not a valid regex.
    pub fn new(token: &str) -> Result<Self> {
        let regex = compile(token)
            .map_err(|e| Error::config(format!("Invalid star token pattern '{token}': {e}")))?;
        Ok(Self {
            token: token.to_string(),
            regex,
        })
    }

    /// The token expression this pattern was built from.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Rewrite `query`, wrapping each bare token in `*`.
    pub fn apply(&self, query: &str) -> String {
        let mut out = String::with_capacity(query.len() + 8);
        let mut last = 0;
        let mut at = 0;

        while at <= query.len() {
            let Some(found) = self.regex.find_at(query, at) else {
                break;
            };
            let (start, end) = (found.start(), found.end());
            let token = found.as_str();
            let quoted = token.starts_with('"');

            // Bare tokens may not start with an operator character; retry
            // one character further along.
            if !quoted && (token.starts_with('!') || token.starts_with('-')) {
                at = next_boundary(query, start);
                continue;
            }
            if token.is_empty() {
                at = next_boundary(query, start);
                continue;
            }

            out.push_str(&query[last..start]);
            let (pre, post) = (&query[..start], &query[end..]);
            if quoted || follows_operator(pre) || pre.ends_with('*') || post.starts_with('*') {
                out.push_str(token);
            } else {
                out.push('*');
                out.push_str(token);
                out.push('*');
            }
            last = end;
            at = end;
        }

        out.push_str(&query[last..]);
        out
    }
}

impl Default for StarPattern {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            regex: DEFAULT_REGEX.clone(),
        }
    }
}

impl PartialEq for StarPattern {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl fmt::Display for StarPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Star-rewrite `query` with the default token pattern.
pub fn star_query(query: &str) -> String {
    StarPattern::default().apply(query)
}

/// Whether `pre` ends in a field, proximity, or quorum operator that starts
/// a new word.
fn follows_operator(pre: &str) -> bool {
    let mut chars = pre.chars().rev();
    match chars.next() {
        Some('@' | '~' | '/') => chars.next().is_none_or(|c| !is_word(c)),
        _ => false,
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn next_boundary(s: &str, from: usize) -> usize {
    s[from..]
        .chars()
        .next()
        .map_or(s.len() + 1, |c| from + c.len_utf8())
}

// ============================================================================
// Tests
// ============================================================================
