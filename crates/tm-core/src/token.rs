//! Token grammar for embedded substitutions.
//!
//! A token is the literal pattern `{{` + content + `}}` where the content is
//! a colon-delimited list: the first segment names the token kind, the rest
//! are positional arguments (`{{table:color:shade}}`). Parsing is purely
//! lexical — what a kind *means* is decided by whoever substitutes it.

/// Opening delimiter of a token.
pub const TOKEN_OPEN: &str = "{{";
/// Closing delimiter of a token.
pub const TOKEN_CLOSE: &str = "}}";

/// One token occurrence found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind — the first colon-delimited segment.
    pub kind: String,
    /// Positional arguments — the remaining segments, possibly empty.
    pub args: Vec<String>,
    /// The full matched text including delimiters, for verbatim pass-through.
    pub raw: String,
}

/// Find every token occurrence in `text`, in order of appearance.
///
/// Matches are shortest-first: the content between `{{` and the nearest
/// following `}}`. Empty content (`{{}}`) is not a token.
pub fn find_tokens(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(TOKEN_OPEN) {
        let after_open = &rest[open + TOKEN_OPEN.len()..];
        let Some(close) = after_open.find(TOKEN_CLOSE) else {
            break;
        };
        let content = &after_open[..close];
        if !content.is_empty() {
            let mut parts = content.split(':');
            let kind = parts.next().unwrap_or_default().to_string();
            let args: Vec<String> = parts.map(str::to_string).collect();
            tokens.push(Token {
                kind,
                args,
                raw: format!("{TOKEN_OPEN}{content}{TOKEN_CLOSE}"),
            });
        }
        rest = &after_open[close + TOKEN_CLOSE.len()..];
    }
    tokens
}

/// Replace each token in `text` with the resolver's output.
///
/// The resolver returns `Ok(Some(replacement))` to substitute a token,
/// `Ok(None)` to leave it verbatim (how unknown kinds pass through), or an
/// error to abort the whole substitution.
pub fn substitute<F, E>(text: &str, mut resolve: F) -> Result<String, E>
where
    F: FnMut(&Token) -> Result<Option<String>, E>,
{
    let tokens = find_tokens(text);
    if tokens.is_empty() {
        return Ok(text.to_string());
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    for token in &tokens {
        let Some(at) = rest.find(&token.raw) else {
            continue;
        };
        out.push_str(&rest[..at]);
        match resolve(token)? {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&token.raw),
        }
        rest = &rest[at + token.raw.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Split a trailing `*N` multiplicity suffix off a token argument.
///
/// `"goblin*3"` becomes `("goblin", 3)`. An argument without a suffix — or
/// with a suffix that is not a positive integer — is returned whole with a
/// multiplicity of 1.
pub fn split_multiplicity(arg: &str) -> (&str, u32) {
    if let Some((name, count)) = arg.rsplit_once('*') {
        match count.parse::<u32>() {
            Ok(n) if n > 0 => return (name, n),
            _ => return (arg, 1),
        }
    }
    (arg, 1)
}
