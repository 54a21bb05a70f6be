//! Source normalisation for JavaScript-flavoured template bodies.
//!
//! Dashboard authors write snippets such as
//! `return states['light.kitchen'].state === 'on'`. Rhai understands almost all
//! of that; this pass rewrites the remaining differences:
//!
//! - `===` and `!==` become `==` and `!=`
//! - single-quoted strings become double-quoted strings
//! - `null` and `undefined` become `()`
//! - `var` becomes `let`
//! - a line break that ends a complete statement gets a `;`
//! - `c ? a : b` becomes `(if c { a } else { b })`
//!
//! Double-quoted strings, backtick strings and comments are copied verbatim.
//! Identifiers directly after a `.` are property names and are never rewritten.
//! The optional-chaining `?.` and coalescing `??` operators are left to Rhai.

/// Rewrite a template body into Rhai source.
pub fn normalize(src: &str) -> String {
    rewrite_ternaries(rewrite_tokens(src))
}

/// Operator, literal and statement-separator rewrites.
fn rewrite_tokens(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;
    // Last significant character emitted outside strings and comments, and
    // the output offset just past it.
    let mut prev: Option<char> = None;
    let mut prev_end = 0;
    // Unclosed brackets. Line breaks only separate statements inside braces.
    let mut open: Vec<char> = Vec::new();

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '`' => {
                i = copy_quoted(&chars, i, c, &mut out);
                prev = Some(c);
                prev_end = out.len();
            }
            '\'' => {
                i = requote(&chars, i, &mut out);
                prev = Some('"');
                prev_end = out.len();
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let end = skip_block_comment(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            '=' | '!' if chars.get(i + 1) == Some(&'=') && chars.get(i + 2) == Some(&'=') => {
                out.push(c);
                out.push('=');
                i += 3;
                prev = Some('=');
                prev_end = out.len();
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if prev == Some('.') {
                    out.push_str(&word);
                } else {
                    match word.as_str() {
                        "null" | "undefined" => out.push_str("()"),
                        "var" => out.push_str("let"),
                        _ => out.push_str(&word),
                    }
                }
                prev = chars.get(i - 1).copied();
                prev_end = out.len();
            }
            '\n' => {
                if ends_statement(prev)
                    && matches!(open.last(), None | Some('{'))
                    && !continues_statement(&chars, i + 1)
                {
                    out.insert(prev_end, ';');
                    prev = Some(';');
                }
                out.push('\n');
                i += 1;
            }
            c => {
                match c {
                    '(' | '[' | '{' => open.push(c),
                    ')' | ']' | '}' => {
                        open.pop();
                    }
                    _ => {}
                }
                out.push(c);
                i += 1;
                if !c.is_whitespace() {
                    prev = Some(c);
                    prev_end = out.len();
                }
            }
        }
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a line ending in `prev` holds a complete statement.
fn ends_statement(prev: Option<char>) -> bool {
    matches!(prev, Some(c) if is_ident_char(c) || matches!(c, ')' | ']' | '}' | '"' | '`'))
}

/// Whether the code after a line break carries on the current statement.
fn continues_statement(chars: &[char], from: usize) -> bool {
    let i = skip_trivia(chars, from);
    let Some(&c) = chars.get(i) else {
        return true;
    };
    match c {
        '!' => chars.get(i + 1) == Some(&'='),
        '.' | '?' | ':' | ')' | ']' | '}' | '(' | '[' | '{' | ',' | '+' | '-' | '*' | '/'
        | '%' | '&' | '|' | '^' | '=' | '<' | '>' => true,
        c if is_ident_start(c) => {
            let end = chars[i..]
                .iter()
                .position(|&c| !is_ident_char(c))
                .map_or(chars.len(), |n| i + n);
            chars[i..end].iter().copied().eq("else".chars())
        }
        _ => false,
    }
}

/// Index of the first character at or after `i` that is not whitespace or
/// part of a comment.
fn skip_trivia(chars: &[char], mut i: usize) -> usize {
    loop {
        match chars.get(i) {
            Some(c) if c.is_whitespace() => i += 1,
            Some('/') if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            Some('/') if chars.get(i + 1) == Some(&'*') => i = skip_block_comment(chars, i),
            _ => return i,
        }
    }
}

/// Index just past the `/* ... */` comment starting at `start`.
fn skip_block_comment(chars: &[char], start: usize) -> usize {
    let mut i = start + 2;
    while i < chars.len() {
        if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}

/// Index just past the string delimited by `quote` starting at `start`.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c == '\\' {
            i = (i + 1).min(chars.len());
        } else if c == quote {
            break;
        }
    }
    i
}

/// Copy a string delimited by `quote` verbatim, returning the index after it.
fn copy_quoted(chars: &[char], start: usize, quote: char, out: &mut String) -> usize {
    let end = skip_quoted(chars, start, quote);
    out.extend(&chars[start..end]);
    end
}

/// Turn a single-quoted string into a double-quoted one, returning the index after it.
fn requote(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '\\' => match chars.get(i) {
                Some('\'') => {
                    out.push('\'');
                    i += 1;
                }
                Some(&next) => {
                    out.push('\\');
                    out.push(next);
                    i += 1;
                }
                None => out.push('\\'),
            },
            '"' => out.push_str("\\\""),
            '\'' => break,
            c => out.push(c),
        }
    }
    out.push('"');
    i
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tok {
    Trivia,
    Str,
    Word,
    Punct(char),
}

#[derive(Clone, Copy, Debug)]
struct Token {
    kind: Tok,
    start: usize,
    end: usize,
}

/// Split already rewritten source into coarse tokens. Punctuation is one
/// token per character.
fn lex(chars: &[char]) -> Vec<Token> {
    let mut toks = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let start = i;
        let c = chars[i];
        let kind = if c.is_whitespace() || (c == '/' && matches!(chars.get(i + 1), Some('/' | '*'))) {
            i = skip_trivia(chars, i).max(i + 1);
            Tok::Trivia
        } else if c == '"' || c == '`' {
            i = skip_quoted(chars, i, c);
            Tok::Str
        } else if is_ident_char(c) {
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            Tok::Word
        } else {
            i += 1;
            Tok::Punct(c)
        };
        toks.push(Token { kind, start, end: i });
    }
    toks
}

/// Rewrite every `c ? a : b` into a Rhai `if` expression. The rightmost `?`
/// goes first so nested conditionals unwind from the inside out.
fn rewrite_ternaries(src: String) -> String {
    let mut chars: Vec<char> = src.chars().collect();
    loop {
        let toks = lex(&chars);
        let Some(q) = (0..toks.len()).rev().find(|&i| is_ternary_mark(&chars, &toks[i])) else {
            break;
        };
        let Some(parts) = ternary_parts(&chars, &toks, q) else {
            break;
        };
        let text = |from: usize, to: usize| -> String { chars[from..to].iter().collect() };
        let replacement = format!(
            "(if {} {{ {} }} else {{ {} }})",
            text(parts.cond.0, parts.cond.1),
            text(parts.then.0, parts.then.1),
            text(parts.other.0, parts.other.1),
        );
        let mut next = chars[..parts.cond.0].to_vec();
        next.extend(replacement.chars());
        next.extend_from_slice(&chars[parts.other.1..]);
        chars = next;
    }
    chars.into_iter().collect()
}

/// Character ranges of the three operands of a conditional expression.
struct TernaryParts {
    cond: (usize, usize),
    then: (usize, usize),
    other: (usize, usize),
}

/// A `?` that is neither `??`, `?.` nor `?[`.
fn is_ternary_mark(chars: &[char], tok: &Token) -> bool {
    tok.kind == Tok::Punct('?')
        && (tok.start == 0 || chars[tok.start - 1] != '?')
        && !matches!(chars.get(tok.start + 1), Some('?' | '.' | '['))
}

/// One half of a `::` path separator.
fn is_path_sep(chars: &[char], tok: &Token) -> bool {
    tok.kind == Tok::Punct(':')
        && ((tok.start > 0 && chars[tok.start - 1] == ':') || chars.get(tok.start + 1) == Some(&':'))
}

/// A plain or compound assignment `=`.
fn is_assignment(chars: &[char], tok: &Token) -> bool {
    tok.kind == Tok::Punct('=')
        && !matches!(chars.get(tok.start + 1), Some('=' | '>'))
        && (tok.start == 0 || !matches!(chars[tok.start - 1], '=' | '!' | '<' | '>'))
}

fn ternary_parts(chars: &[char], toks: &[Token], q: usize) -> Option<TernaryParts> {
    let word = |t: &Token| -> String { chars[t.start..t.end].iter().collect() };

    // Condition: back to the nearest operator that binds looser than `?`.
    let mut depth = 0usize;
    let mut cond_start = None;
    for t in toks[..q].iter().rev() {
        match t.kind {
            Tok::Punct(')' | ']' | '}') => depth += 1,
            Tok::Punct('(' | '[' | '{') if depth == 0 => break,
            Tok::Punct('(' | '[' | '{') => depth -= 1,
            _ if depth > 0 => {}
            Tok::Punct(',' | ';') => break,
            Tok::Punct('?') if is_ternary_mark(chars, t) => break,
            Tok::Punct(':') if !is_path_sep(chars, t) => break,
            Tok::Punct('=') if is_assignment(chars, t) => break,
            Tok::Word if matches!(word(t).as_str(), "return" | "throw" | "let" | "const" | "in") => {
                break;
            }
            _ => {}
        }
        if t.kind != Tok::Trivia {
            cond_start = Some(t.start);
        }
    }
    let cond_end = significant_end(&toks[..q])?;

    // Consequent: up to the matching `:`.
    let mut depth = 0usize;
    let mut colon = None;
    for (i, t) in toks.iter().enumerate().skip(q + 1) {
        match t.kind {
            Tok::Punct('(' | '[' | '{') => depth += 1,
            Tok::Punct(')' | ']' | '}') if depth == 0 => return None,
            Tok::Punct(')' | ']' | '}') => depth -= 1,
            _ if depth > 0 => {}
            Tok::Punct(';') => return None,
            Tok::Punct(':') if !is_path_sep(chars, t) => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    let then = significant_range(&toks[q + 1..colon])?;

    // Alternative: up to the end of the enclosing expression.
    let mut depth = 0usize;
    let mut end = toks.len();
    for (i, t) in toks.iter().enumerate().skip(colon + 1) {
        match t.kind {
            Tok::Punct('(' | '[' | '{') => depth += 1,
            Tok::Punct(')' | ']' | '}') if depth == 0 => {
                end = i;
                break;
            }
            Tok::Punct(')' | ']' | '}') => depth -= 1,
            _ if depth > 0 => {}
            Tok::Punct(',' | ';') => {
                end = i;
                break;
            }
            Tok::Punct(':') if !is_path_sep(chars, t) => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    let other = significant_range(&toks[colon + 1..end])?;

    Some(TernaryParts {
        cond: (cond_start?, cond_end),
        then,
        other,
    })
}

/// Span from the first to the last non-trivia token.
fn significant_range(toks: &[Token]) -> Option<(usize, usize)> {
    let first = toks.iter().find(|t| t.kind != Tok::Trivia)?;
    Some((first.start, significant_end(toks)?))
}

fn significant_end(toks: &[Token]) -> Option<usize> {
    toks.iter().rev().find(|t| t.kind != Tok::Trivia).map(|t| t.end)
}
