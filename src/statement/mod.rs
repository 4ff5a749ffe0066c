//! Statement builder: typed `%d` / `%f` / `%s` templates to `?` markers plus an ordered
//! parameter list.

mod scanner;

pub use scanner::PlaceholderKind;
use scanner::{Token, tokenize};

use crate::error::D1MiddlewareError;
use crate::types::RowValues;

/// Build a parameter list from heterogeneous values.
///
/// ```rust
/// use d1_middleware::prelude::*;
///
/// let args = params![7, "ann", 2.5];
/// assert_eq!(args[1], RowValues::Text("ann".into()));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::RowValues>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::RowValues::from($value)),+]
    };
}

/// SQL text with positional `?` markers and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedStatement {
    pub text: String,
    pub parameters: Vec<RowValues>,
}

impl PreparedStatement {
    /// A statement with no parameters, sent as-is.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }
}

impl From<&str> for PreparedStatement {
    fn from(text: &str) -> Self {
        Self::raw(text)
    }
}

impl From<String> for PreparedStatement {
    fn from(text: String) -> Self {
        Self::raw(text)
    }
}

/// Turn a template and its arguments into a [`PreparedStatement`].
///
/// Each placeholder consumes one argument left to right, is replaced by `?`, and pushes the
/// argument coerced to the placeholder's type. `%%` becomes a literal `%`.
///
/// A missing template yields `Ok(None)`. Arguments beyond the last placeholder are ignored.
///
/// # Errors
///
/// Returns `D1MiddlewareError::ParameterCountMismatch` when the template has more
/// placeholders than arguments, and `D1MiddlewareError::ParameterError` when a `%f`
/// argument coerces to infinity or NaN.
///
/// ```rust
/// use d1_middleware::prelude::*;
///
/// let stmt = prepare(
///     Some("SELECT * FROM t WHERE id = %d AND name = %s"),
///     &params![7, "ann"],
/// )?
/// .expect("template given");
/// assert_eq!(stmt.text, "SELECT * FROM t WHERE id = ? AND name = ?");
/// # Ok::<(), D1MiddlewareError>(())
/// ```
pub fn prepare(
    template: Option<&str>,
    args: &[RowValues],
) -> Result<Option<PreparedStatement>, D1MiddlewareError> {
    let Some(template) = template else {
        return Ok(None);
    };

    let tokens = tokenize(template);
    let placeholders = tokens
        .iter()
        .filter(|token| matches!(token, Token::Placeholder(_)))
        .count();
    if placeholders > args.len() {
        return Err(D1MiddlewareError::ParameterCountMismatch {
            placeholders,
            supplied: args.len(),
        });
    }
    if placeholders < args.len() {
        tracing::debug!(
            placeholders,
            supplied = args.len(),
            "ignoring surplus statement arguments"
        );
    }

    let mut text = String::with_capacity(template.len());
    let mut parameters = Vec::with_capacity(placeholders);
    let mut args = args.iter();

    for token in tokens {
        match token {
            Token::Literal(literal) => text.push_str(literal),
            Token::Percent => text.push('%'),
            Token::Placeholder(kind) => {
                // Counted above; the iterator cannot run dry here.
                let Some(arg) = args.next() else {
                    break;
                };
                text.push('?');
                parameters.push(coerce(arg, kind)?);
            }
        }
    }

    Ok(Some(PreparedStatement { text, parameters }))
}

/// Number of placeholders a template will consume.
#[must_use]
pub fn placeholder_count(template: &str) -> usize {
    tokenize(template)
        .iter()
        .filter(|token| matches!(token, Token::Placeholder(_)))
        .count()
}

fn coerce(arg: &RowValues, kind: PlaceholderKind) -> Result<RowValues, D1MiddlewareError> {
    Ok(match kind {
        PlaceholderKind::Int => RowValues::Int(arg.coerce_int()),
        PlaceholderKind::Float => {
            let value = arg.coerce_float();
            // JSON has no encoding for these; serde_json would send null.
            if !value.is_finite() {
                return Err(D1MiddlewareError::ParameterError(format!(
                    "%f argument {arg:?} is not a finite number"
                )));
            }
            RowValues::Float(value)
        }
        PlaceholderKind::Text => RowValues::Text(arg.coerce_text()),
    })
}
