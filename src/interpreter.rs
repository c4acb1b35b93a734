/// Walks the parsed tree and produces a value.
///
/// Evaluation is depth-first and left-to-right. Operator and function
/// callables are resolved at evaluation time against the configuration and
/// context, so a tree parsed under one configuration can fail here when the
/// grammar was mutated in between.
pub mod evaluator;
/// Converts source text into a flat token stream.
///
/// The tokenizer recognizes identifiers, numbers, symbol runs and
/// punctuation. It knows nothing about the configured operators; a symbol
/// token is simply the longest run of operator characters, and the parser
/// matches its text against the configuration.
pub mod lexer;
/// Builds a tree from the token stream.
///
/// The parser is a recursive descent with a table-driven precedence climb:
/// which symbols are operators, how tightly they bind and how they group is
/// read from the configuration at parse time.
pub mod parser;
