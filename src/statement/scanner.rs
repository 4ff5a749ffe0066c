/// Placeholder kinds recognised in statement templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `%d`
    Int,
    /// `%f`
    Float,
    /// `%s`
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token<'a> {
    Literal(&'a str),
    /// `%%`, emitted as a single `%`
    Percent,
    Placeholder(PlaceholderKind),
}

/// Split a template into literal runs, escaped percents and placeholders.
///
/// `%%` is consumed as a pair before anything else looks at the following byte, so
/// `%%d` is the literal text `%d` and never a placeholder. Unknown `%x` sequences stay
/// literal.
pub(super) fn tokenize(template: &str) -> Vec<Token<'_>> {
    let bytes = template.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            idx += 1;
            continue;
        }
        let token = match bytes.get(idx + 1) {
            Some(b'%') => Token::Percent,
            Some(b'd') => Token::Placeholder(PlaceholderKind::Int),
            Some(b'f') => Token::Placeholder(PlaceholderKind::Float),
            Some(b's') => Token::Placeholder(PlaceholderKind::Text),
            _ => {
                idx += 1;
                continue;
            }
        };
        if literal_start < idx {
            tokens.push(Token::Literal(&template[literal_start..idx]));
        }
        tokens.push(token);
        idx += 2;
        literal_start = idx;
    }

    if literal_start < bytes.len() {
        tokens.push(Token::Literal(&template[literal_start..]));
    }
    tokens
}
