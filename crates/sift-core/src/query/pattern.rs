use std::fmt;

///
/// PatternSegment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PatternSegment {
    Literal(String),
    /// Any run of characters, including none.
    AnyMany,
    /// Exactly one character.
    AnyOne,
}

///
/// Pattern
///
/// Wildcard pattern parsed from user syntax.
///
/// - `*` and `%` match any run of characters
/// - `_` matches one character
/// - a doubled wildcard (`**`, `%%`, `__`) is the literal character
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Pattern {
    segments: Vec<PatternSegment>,
}

impl Pattern {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut pattern = Self::default();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '*' | '%' | '_' if chars.peek() == Some(&c) => {
                    chars.next();
                    pattern.push_literal(c);
                }
                '*' | '%' => pattern.push(PatternSegment::AnyMany),
                '_' => pattern.push(PatternSegment::AnyOne),
                _ => pattern.push_literal(c),
            }
        }

        pattern
    }

    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render as SQL `LIKE` text using `escape` for literal wildcards.
    #[must_use]
    pub fn to_like(&self, escape: char) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PatternSegment::AnyMany => out.push('%'),
                PatternSegment::AnyOne => out.push('_'),
                PatternSegment::Literal(text) => {
                    for c in text.chars() {
                        if c == '%' || c == '_' || c == escape {
                            out.push(escape);
                        }
                        out.push(c);
                    }
                }
            }
        }

        out
    }

    /// Match a whole string against the pattern.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let tokens = self.tokens();
        let chars: Vec<char> = text.chars().collect();

        match_tokens(&tokens, &chars)
    }

    fn push(&mut self, segment: PatternSegment) {
        // consecutive AnyMany are equivalent to one
        if segment == PatternSegment::AnyMany
            && self.segments.last() == Some(&PatternSegment::AnyMany)
        {
            return;
        }
        self.segments.push(segment);
    }

    fn push_literal(&mut self, c: char) {
        if let Some(PatternSegment::Literal(text)) = self.segments.last_mut() {
            text.push(c);
        } else {
            self.segments.push(PatternSegment::Literal(c.to_string()));
        }
    }

    fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for segment in &self.segments {
            match segment {
                PatternSegment::AnyMany => tokens.push(Token::AnyMany),
                PatternSegment::AnyOne => tokens.push(Token::AnyOne),
                PatternSegment::Literal(text) => tokens.extend(text.chars().map(Token::Char)),
            }
        }

        tokens
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                PatternSegment::AnyMany => f.write_str("*")?,
                PatternSegment::AnyOne => f.write_str("_")?,
                PatternSegment::Literal(text) => {
                    for c in text.chars() {
                        if matches!(c, '*' | '%' | '_') {
                            write!(f, "{c}{c}")?;
                        } else {
                            write!(f, "{c}")?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Token {
    Char(char),
    AnyOne,
    AnyMany,
}

// Iterative wildcard match with single-star backtracking.
fn match_tokens(tokens: &[Token], chars: &[char]) -> bool {
    let (mut t, mut c) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while c < chars.len() {
        match tokens.get(t) {
            Some(Token::Char(expected)) if *expected == chars[c] => {
                t += 1;
                c += 1;
            }
            Some(Token::AnyOne) => {
                t += 1;
                c += 1;
            }
            Some(Token::AnyMany) => {
                star = Some((t, c));
                t += 1;
            }
            _ => match star {
                Some((star_t, star_c)) => {
                    t = star_t + 1;
                    c = star_c + 1;
                    star = Some((star_t, star_c + 1));
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|token| matches!(token, Token::AnyMany))
}
