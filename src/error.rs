/// Expression diagnostics.
///
/// Defines the diagnostic envelope raised by the tokenizer, parser and
/// evaluator. Every error carries the offending code and a location within
/// it so a complete report, preview included, can be rendered without any
/// extra data.
pub mod code_error;
/// Host-side API errors.
///
/// Contains the errors reported when the host misuses the configuration or
/// code utilities (duplicate operators, unknown symbols, out-of-range
/// precedence levels). These are programmer errors in host code, not
/// expression errors.
pub mod config_error;

pub use code_error::{CodeError, ErrorKind, SymbolKind};
pub use config_error::ConfigError;
