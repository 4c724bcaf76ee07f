//! Splitting license expressions into the atomic names they are built from.
//!
//! This is not an SPDX expression parser: operators and parentheses
//! only mark where one license name ends and the next begins. Free-form names
//! keep their inner spaces, so `BSD License OR GPLv2` yields `BSD License` and
//! `GPLv2`.

/// Tokens produced by [`tokenize`].
#[derive(Debug, PartialEq, Clone)]
enum Token {
    Word(String),
    And,
    Or,
    With,
    LParen,
    RParen,
}

/// One name found in an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A license name to be resolved.
    License(String),
    /// The identifier following `WITH`, e.g. `Classpath-exception-2.0`.
    Exception(String),
}

/// Tokenize an expression into words, operators and parentheses.
///
/// `&`, `&&`, `|` and `||` are accepted as operators and split words even without
/// surrounding spaces. `AND`, `OR` and `WITH` only count in upper case, as SPDX
/// writes them; lower-case `and`/`or` are left to the name they appear in.
fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            '&' | '|' => {
                chars.next();
                // `&&` and `||` are the same operator as the single character
                if chars.peek() == Some(&c) {
                    chars.next();
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '&' | '|') {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                let token = match s.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "WITH" => Token::With,
                    _ => Token::Word(s),
                };
                tokens.push(token);
            }
        }
    }
    tokens
}

/// One piece of a parsed expression: a term or the operator/parenthesis between terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Term(Term),
    And,
    Or,
    With,
    Open,
    Close,
}

/// Parse `expr` into terms and operators, in order of appearance.
///
/// Consecutive words form one term. A term that directly follows `WITH` is an
/// [`Term::Exception`]; every other term is a [`Term::License`]. Any operator or
/// parenthesis ends the `WITH` clause, so `MIT WITH OR GPL` still yields `GPL`
/// as a license.
pub fn parse(expr: &str) -> Vec<Part> {
    let mut out = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut after_with = false;

    let flush = |out: &mut Vec<Part>, words: &mut Vec<String>, after_with: bool| {
        if words.is_empty() {
            return;
        }
        let name = words.join(" ");
        words.clear();
        out.push(Part::Term(if after_with {
            Term::Exception(name)
        } else {
            Term::License(name)
        }));
    };

    for token in tokenize(expr) {
        let part = match token {
            Token::Word(w) => {
                words.push(w);
                continue;
            }
            Token::With => Part::With,
            Token::And => Part::And,
            Token::Or => Part::Or,
            Token::LParen => Part::Open,
            Token::RParen => Part::Close,
        };
        flush(&mut out, &mut words, after_with);
        after_with = part == Part::With;
        out.push(part);
    }
    flush(&mut out, &mut words, after_with);

    out
}

/// Write `parts` back out as one expression, naming each term with `name`.
///
/// Operators come out in SPDX spelling (`AND`, `OR`, `WITH`) whatever symbol
/// they were written with.
pub fn render<F>(parts: &[Part], mut name: F) -> String
where
    F: FnMut(&Term) -> String,
{
    let mut out = String::new();
    for part in parts {
        let piece = match part {
            Part::Term(term) => name(term),
            Part::And => "AND".to_string(),
            Part::Or => "OR".to_string(),
            Part::With => "WITH".to_string(),
            Part::Open => "(".to_string(),
            Part::Close => ")".to_string(),
        };
        if !(out.is_empty() || out.ends_with('(') || *part == Part::Close) {
            out.push(' ');
        }
        out.push_str(&piece);
    }
    out
}
