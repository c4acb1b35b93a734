use std::fmt;

use crate::{
    code::{Code, CodeLocation},
    interpreter::lexer::Token,
};

/// Kind of symbol that failed to resolve during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// A variable reference.
    Variable,
    /// A function call.
    Function,
    /// A binary operator.
    BinaryOperator,
    /// A unary operator in prefix position.
    UnaryPrefixOperator,
    /// A unary operator in suffix position.
    UnarySuffixOperator,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Variable => "variable",
            Self::Function => "function",
            Self::BinaryOperator => "binary operator",
            Self::UnaryPrefixOperator => "unary prefix operator",
            Self::UnarySuffixOperator => "unary suffix operator",
        };
        write!(f, "{name}")
    }
}

/// Categorizes a [`CodeError`].
///
/// Some parts of the pipeline raise the [`Generic`](Self::Generic) kind
/// directly for uncategorized failures, such as division by zero inside an
/// operator body.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Uncategorized error from an operator or function body.
    Generic,
    /// Illegal character or malformed literal found by the tokenizer.
    Tokenizer,
    /// The parser hit a token that does not fit the grammar.
    UnexpectedToken {
        /// The token that was found unexpectedly.
        token: Token,
    },
    /// Evaluation referenced a symbol that is not registered.
    UnresolvedReference {
        /// Name of the unresolved reference.
        symbol: String,
        /// What kind of symbol the reference was.
        kind:   SymbolKind,
    },
    /// A function was called with the wrong number of arguments.
    InvalidArity {
        /// Name of the function that raised this error.
        function: String,
        /// Number of arguments the function expects.
        expected: usize,
        /// Number of arguments the function was called with.
        got:      usize,
    },
}

/// An error within an expression, pointing at the code that caused it.
///
/// The formatted message contains the code name, the spanned line and
/// column range, the message, and a preview of the offending code:
///
/// ```text
/// 00c872e7.fxp: 1:21-1:28: The term "an error" is not defined.
/// 1 | The line that caused an error within it.
///   |                      <~~^~~~>
/// ```
#[derive(Debug, Clone)]
pub struct CodeError {
    /// What category of failure this is, with kind-specific details.
    pub kind:     ErrorKind,
    /// Message of the error.
    pub message:  String,
    /// The code that caused the error.
    pub code:     Code,
    /// Location in the code that caused the error.
    pub location: CodeLocation,

    /// The fully formatted report, built once at construction.
    pub formatted_message: String,
}

impl CodeError {
    /// Creates an uncategorized error. This is the constructor to use from
    /// custom operator and function bodies.
    #[must_use]
    pub fn new(message: impl Into<String>, code: &Code, location: CodeLocation) -> Self {
        Self::with_kind(ErrorKind::Generic, message, code, location)
    }

    /// Creates a tokenizer error for an illegal character or malformed
    /// literal.
    #[must_use]
    pub fn tokenizer(message: impl Into<String>, code: &Code, location: CodeLocation) -> Self {
        Self::with_kind(ErrorKind::Tokenizer, message, code, location)
    }

    /// Creates a parse error pointing at the unexpected token.
    #[must_use]
    pub fn unexpected_token(message: impl Into<String>, code: &Code, token: &Token) -> Self {
        Self::with_kind(ErrorKind::UnexpectedToken { token: token.clone() },
                        message,
                        code,
                        token.location)
    }

    /// Creates an evaluation error for a symbol that could not be resolved.
    #[must_use]
    pub fn unresolved_reference(symbol: &str,
                                kind: SymbolKind,
                                code: &Code,
                                location: CodeLocation)
                                -> Self {
        Self::with_kind(ErrorKind::UnresolvedReference { symbol: symbol.to_string(),
                                                         kind },
                        format!("Unresolved reference to {kind} '{symbol}'"),
                        code,
                        location)
    }

    /// Creates an arity error for a function called with the wrong number of
    /// arguments.
    #[must_use]
    pub fn invalid_arity(function: &str,
                         got: usize,
                         expected: usize,
                         code: &Code,
                         location: CodeLocation)
                         -> Self {
        Self::with_kind(ErrorKind::InvalidArity { function: function.to_string(),
                                                  expected,
                                                  got },
                        format!("Function '{function}' requires {expected} arguments, but got {got}"),
                        code,
                        location)
    }

    fn with_kind(kind: ErrorKind,
                 message: impl Into<String>,
                 code: &Code,
                 location: CodeLocation)
                 -> Self {
        let message = message.into();

        let (begin_line, begin_col) = code.get_line_col(location.begin).unwrap_or((1, 0));
        let end_pos = location.begin + location.length.saturating_sub(1);
        let (end_line, end_col) = code.get_line_col(end_pos).unwrap_or((begin_line, begin_col));

        let formatted_message =
            format!("{}: {begin_line}:{begin_col}-{end_line}:{end_col}: {message}\n{}",
                    code.name,
                    location.preview_text(code, 0));

        Self { kind,
               message,
               code: code.clone(),
               location,
               formatted_message }
    }
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted_message)
    }
}

impl std::error::Error for CodeError {}
