use std::fmt;

use logos::Logos;

use crate::{
    code::{Code, CodeLocation},
    error::CodeError,
};

/// Characters that separate digit groups in number literals. They are
/// stripped from the token value before the literal is parsed.
const NUMBER_SEPARATORS: [char; 2] = ['\'', '_'];

/// Raw token classes recognized by the scanner.
///
/// Symbol tokens use maximal munch on purpose: a custom operator like `+++`
/// or `<?` lexes as one token, and the parser matches the whole text against
/// the configured operators rather than splitting it.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0B\x0C]+")]
enum RawToken {
    /// Starts with `a-z`, `A-Z` or `_`, continues with those or `0-9`.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    /// Starts with `0-9`; the body may contain digits, at most one `.`, and
    /// the digit separators `'` and `_` (anywhere but the end).
    #[regex(r"[0-9][0-9._']*")]
    Number,

    /// Longest run of the operator characters `+-*/%^=!~&|<>?:[]`.
    #[regex(r"[+\-*/%^=!~&|<>?:\[\]]+")]
    Symbol,

    /// One of `(`, `)` and `,`, always a single character.
    #[regex(r"[(),]")]
    Punctuation,
}

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A variable or function name.
    Identifier,
    /// A numeric literal.
    Number,
    /// A run of operator characters.
    Symbol,
    /// `(`, `)` or `,`.
    Punctuation,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::Symbol => "symbol",
            Self::Punctuation => "punctuation",
        };
        write!(f, "{name}")
    }
}

/// A single token of an expression. Tokens are immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Classification of the token.
    pub kind:     TokenKind,
    /// Text of the token. For numbers, digit separators are already
    /// stripped.
    pub value:    String,
    /// Location of the token in the source code.
    pub location: CodeLocation,
}

impl Token {
    /// Renders this token for inspection, preview included.
    #[must_use]
    pub fn to_string(&self, code: &Code) -> String {
        format!("Token: Type: {}, Value: {}, Location: {}:{}\n{}",
                self.kind,
                self.value,
                self.location.begin,
                self.location.length,
                self.location.preview_text(code, 0))
    }
}

/// Renders a whole token stream for inspection.
#[must_use]
pub fn tokens_to_string(code: &Code, tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.to_string(code)).collect()
}

/// Tokenizes the given code into a flat token stream.
///
/// Whitespace between tokens is skipped. The tokenizer does not consult any
/// configuration; operator identity is resolved by the parser.
///
/// # Errors
/// Fails with a tokenizer [`CodeError`] on an illegal character, a number
/// with more than one decimal point, or a number ending in a digit
/// separator.
///
/// ## Example
/// ```
/// use flexpr::{tokenize, Code, TokenKind};
///
/// let code = Code::new("1 <?= x");
/// let tokens = tokenize(&code).unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
///
/// // `<?=` stays one symbol token: maximal munch.
/// assert_eq!(kinds,
///            [TokenKind::Number, TokenKind::Symbol, TokenKind::Identifier]);
/// ```
pub fn tokenize(code: &Code) -> Result<Vec<Token>, CodeError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(&code.text);

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let location = CodeLocation { begin:   span.start,
                                      length:  span.end - span.start,
                                      pointer: 0, };

        let Ok(raw) = raw else {
            return Err(CodeError::tokenizer("Invalid character", code, location));
        };

        let (kind, value) = match raw {
            RawToken::Identifier => (TokenKind::Identifier, lexer.slice().to_string()),
            RawToken::Number => (TokenKind::Number, number_value(code, lexer.slice(), location)?),
            RawToken::Symbol => (TokenKind::Symbol, lexer.slice().to_string()),
            RawToken::Punctuation => (TokenKind::Punctuation, lexer.slice().to_string()),
        };

        tokens.push(Token { kind, value, location });
    }

    Ok(tokens)
}

/// Validates a raw number literal and strips its digit separators.
fn number_value(code: &Code, raw: &str, location: CodeLocation) -> Result<String, CodeError> {
    if raw.ends_with(NUMBER_SEPARATORS) {
        return Err(CodeError::tokenizer("Number cannot end with separator characters",
                                        code,
                                        location));
    }

    if raw.chars().filter(|&c| c == '.').count() > 1 {
        return Err(CodeError::tokenizer("Number cannot contain multiple decimal points",
                                        code,
                                        location));
    }

    Ok(raw.chars().filter(|c| !NUMBER_SEPARATORS.contains(c)).collect())
}
