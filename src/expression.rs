use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    ast::TreeNode,
    code::{Code, CodeLocation},
    config::{Config, ConfigRef},
    context::{Context, ContextRef},
    error::CodeError,
    interpreter::{
        lexer::{Token, tokenize},
        parser,
    },
};

thread_local! {
    /// Configuration shared by all expressions that have none attached.
    static DEFAULT_CONFIG: ConfigRef = Rc::new(RefCell::new(Config::default()));
}

/// Returns the shared configuration used by expressions without an explicit
/// one. Mutating it affects every such expression on this thread.
#[must_use]
pub fn default_config() -> ConfigRef {
    DEFAULT_CONFIG.with(Rc::clone)
}

/// An expression: source code, its parsed tree, and its evaluated value.
///
/// The facade bundles a [`Code`], optional shared [`Config`] and
/// [`Context`] handles, and the caches populated by [`parse`](Self::parse)
/// and [`evaluate`](Self::evaluate). It does not track invalidation:
/// call `parse()` again after changing the code or configuration, and
/// `evaluate()` again after changing the context.
///
/// ## Example
/// ```
/// use flexpr::Expression;
///
/// let mut expression = Expression::new("x * 2 + 1");
/// expression.set_variable("x", 4.0);
/// assert_eq!(expression.get_value().unwrap(), 9.0);
///
/// // The cached value sticks until the next evaluate()
/// expression.set_variable("x", 10.0);
/// assert_eq!(expression.get_value().unwrap(), 9.0);
/// expression.evaluate().unwrap();
/// assert_eq!(expression.value, 21.0);
/// ```
#[derive(Debug, Clone)]
pub struct Expression {
    /// Expression source to parse and evaluate. An empty source implies
    /// `0`.
    pub code: Code,

    /// Configuration for the parser and evaluator. The shared default
    /// configuration is used when `None`.
    pub config: Option<ConfigRef>,

    /// The local list of symbols, also linking to inherited contexts.
    /// Created lazily by `evaluate()` and the symbol helpers when absent.
    pub context: Option<ContextRef>,

    /// Cached tokens after parsing, kept for inspection.
    pub tokens: Vec<Token>,

    /// Cached tree after parsing.
    pub tree: Option<TreeNode>,

    /// Cached value after evaluation.
    pub value: f32,
}

impl Expression {
    /// Creates an expression from source text, with no configuration or
    /// context attached.
    #[must_use]
    pub fn new(code: impl Into<Code>) -> Self {
        Self { code:    code.into(),
               config:  None,
               context: None,
               tokens:  Vec::new(),
               tree:    None,
               value:   0.0, }
    }

    /// Tokenizes and parses the expression into the cached tree.
    ///
    /// # Errors
    /// Propagates tokenizer and parser errors unchanged.
    pub fn parse(&mut self) -> Result<(), CodeError> {
        let config = self.config_handle();
        let config = config.borrow();

        self.tokens = tokenize(&self.code)?;
        self.tree = Some(parser::parse(&self.code, &self.tokens, &config)?);
        Ok(())
    }

    /// Evaluates the cached tree into the cached value, creating an empty
    /// context first when none is attached.
    ///
    /// # Errors
    /// Fails with a generic [`CodeError`] when the expression has not been
    /// parsed; otherwise propagates evaluation errors unchanged.
    pub fn evaluate(&mut self) -> Result<(), CodeError> {
        let config = self.config_handle();
        let context = self.context_handle();

        let Some(tree) = &self.tree else {
            return Err(CodeError::new("Expression has not been parsed",
                                      &self.code,
                                      CodeLocation::default()));
        };

        self.value = tree.evaluate(&self.code, &config.borrow(), &context.borrow())?;
        Ok(())
    }

    /// Obtains the value of the expression, running `parse()` and
    /// `evaluate()` once when there is no cached tree yet.
    ///
    /// # Errors
    /// As [`parse`](Self::parse) and [`evaluate`](Self::evaluate).
    pub fn get_value(&mut self) -> Result<f32, CodeError> {
        if self.tree.is_none() {
            self.parse()?;
            self.evaluate()?;
        }

        Ok(self.value)
    }

    /// Sets a variable in this expression's context, creating the context
    /// when absent.
    pub fn set_variable(&mut self, name: impl Into<String>, value: f32) {
        self.context_handle().borrow_mut().set_variable(name, value);
    }

    /// Sets a function in this expression's context, creating the context
    /// when absent.
    pub fn set_function<F>(&mut self, name: impl Into<String>, function: F)
        where F: Fn(&Code, CodeLocation, &[f32]) -> Result<f32, CodeError> + 'static
    {
        self.context_handle().borrow_mut().set_function(name, function);
    }

    /// Inherits a context into this expression's context, creating the
    /// local context when absent.
    pub fn inherit_context(&mut self, parent: ContextRef) {
        self.context_handle().borrow_mut().inherit_context(parent);
    }

    fn config_handle(&self) -> ConfigRef {
        self.config.clone().unwrap_or_else(default_config)
    }

    fn context_handle(&mut self) -> ContextRef {
        if let Some(context) = &self.context {
            return Rc::clone(context);
        }

        let context = Rc::new(RefCell::new(Context::new()));
        self.context = Some(Rc::clone(&context));
        context
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code.text)
    }
}

impl From<&Expression> for f32 {
    /// The cached value; call [`Expression::evaluate`] first.
    fn from(expression: &Expression) -> Self {
        expression.value
    }
}

/// Evaluates an expression with the given configuration and context in one
/// shot.
///
/// # Errors
/// As [`Expression::get_value`].
///
/// ## Example
/// ```
/// use flexpr::express;
///
/// assert_eq!(express("2 * (3 + 4)", None, None).unwrap(), 14.0);
/// ```
pub fn express(text: &str,
               config: Option<ConfigRef>,
               context: Option<ContextRef>)
               -> Result<f32, CodeError> {
    let mut expression = Expression::new(text);
    expression.config = config;
    expression.context = context;
    expression.get_value()
}
