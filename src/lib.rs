//! # flexpr
//!
//! flexpr is an embeddable arithmetic expression language for Rust. It
//! parses and evaluates textual expressions against a caller-supplied
//! environment of variables and functions, and the operator set itself is
//! data: hosts can add, remove and re-rank prefix, suffix and binary
//! operators at runtime without touching the parser.
//!
//! ```
//! use flexpr::express;
//!
//! assert_eq!(express("1 + 2 * 3", None, None).unwrap(), 7.0);
//! assert_eq!(express("2 ** 3 ** 2", None, None).unwrap(), 512.0);
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed expressions.
///
/// This module declares the `TreeNode` enum that represents the syntactic
/// structure of an expression as a tree. Trees are built by the parser and
/// walked by the evaluator.
///
/// # Responsibilities
/// - Defines node variants for every expression construct.
/// - Attaches source locations to nodes for error reporting.
/// - Provides an indented debug rendering of whole trees.
pub mod ast;
/// Source code storage and location reporting.
///
/// This module provides the `Code` buffer that pairs expression text with
/// precomputed line offsets and a diagnostic name, and the `CodeLocation`
/// span type with its caret-marked preview rendering.
///
/// # Responsibilities
/// - Translates byte positions into line and column numbers.
/// - Slices text by 1-based line numbers.
/// - Renders multi-line previews with `<~~^~~>` markers for diagnostics.
pub mod code;
/// Runtime-mutable grammar configuration.
///
/// This module defines the operator tables and the binary-operator
/// precedence rows the parser consults, along with the operations to add,
/// remove, look up and re-rank operators.
///
/// # Responsibilities
/// - Stores prefix, suffix and binary operators with their callables.
/// - Maintains the precedence table, tightest row first.
/// - Validates mutations (duplicate symbols, unknown operators, row
///   ranges).
pub mod config;
/// Symbol environment for evaluation.
///
/// This module provides the `Context` mapping names to variable values and
/// functions, with an inheritance chain over parent contexts in which child
/// bindings shadow parents.
///
/// # Responsibilities
/// - Stores and resolves variables and functions.
/// - Walks parent contexts depth-first on lookup misses.
pub mod context;
/// Provides unified error types for the whole pipeline.
///
/// This module defines the diagnostic envelope raised by tokenizing,
/// parsing and evaluating, carrying the offending code and a location so a
/// full report with a preview can be rendered from the error alone, plus
/// the errors for host-side API misuse.
///
/// # Responsibilities
/// - Defines error kinds for all failure modes of the pipeline.
/// - Formats reports as `name: line:col-line:col: message` plus preview.
/// - Integrates with the standard error handling traits.
pub mod error;
/// The expression facade tying everything together.
///
/// This module provides the `Expression` type bundling code, configuration
/// and context with the cached tokens, tree and value, plus the one-shot
/// `express` helper.
///
/// # Responsibilities
/// - Orchestrates tokenize, parse and evaluate phases.
/// - Manages the shared default configuration and lazy context creation.
pub mod expression;
/// The three pipeline stages: lexer, parser and evaluator.
///
/// This module ties together tokenization, parsing and evaluation. The
/// stages only communicate through the data types of the other modules, so
/// each can also be driven separately through the free functions.
///
/// # Responsibilities
/// - Converts text to tokens, tokens to trees, and trees to values.
/// - Resolves operators against the configuration at parse and evaluation
///   time.
pub mod interpreter;

mod builtins;

pub use ast::TreeNode;
pub use code::{Code, CodeLocation};
pub use config::{Associativity, BinaryFn, BinaryOperator, Config, ConfigRef, UnaryFn,
                 UnaryOperator};
pub use context::{Callable, Context, ContextRef};
pub use error::{CodeError, ConfigError, ErrorKind, SymbolKind};
pub use expression::{Expression, default_config, express};
pub use interpreter::{
    lexer::{Token, TokenKind, tokenize, tokens_to_string},
    parser::parse,
};
