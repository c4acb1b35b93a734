use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    code::{Code, CodeLocation},
    error::CodeError,
};

/// Callable behind a function symbol. Receives the enclosing code and the
/// location of the call site, so arity checks and domain errors can point
/// back at the expression, plus the already-evaluated arguments.
pub type Callable = Rc<dyn Fn(&Code, CodeLocation, &[f32]) -> Result<f32, CodeError>>;

/// Shared handle to a [`Context`]. Contexts are reference-shared so many
/// expressions can observe the same environment, and so contexts can
/// inherit from one another.
pub type ContextRef = Rc<RefCell<Context>>;

/// Symbol environment for expressions.
///
/// A context maps names to variable values and to functions, and may
/// inherit symbols from any number of parent contexts. Lookup is depth-first
/// over the parents in order, and this context's own symbols are prioritized
/// over inherited ones when they conflict.
///
/// ## Example
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use flexpr::Context;
///
/// let parent = Rc::new(RefCell::new(Context::new()));
/// parent.borrow_mut().set_variable("x", 5.0);
///
/// let mut child = Context::new();
/// child.set_variable("x", 10.0); // Shadows the parent's binding
/// child.inherit_context(parent);
///
/// assert_eq!(child.resolve_variable("x"), Some(10.0));
/// ```
#[derive(Default, Clone)]
pub struct Context {
    /// Variables accessible to all expressions using this context.
    pub variables: HashMap<String, f32>,
    /// Functions accessible to all expressions using this context.
    pub functions: HashMap<String, Callable>,
    /// Contexts whose symbols this context inherits, in lookup order.
    pub parents:   Vec<ContextRef>,
}

impl Context {
    /// Creates an empty context with no parents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns or inserts a variable, overriding any existing binding.
    pub fn set_variable(&mut self, name: impl Into<String>, value: f32) {
        self.variables.insert(name.into(), value);
    }

    /// Assigns or inserts a function, overriding any existing binding.
    pub fn set_function<F>(&mut self, name: impl Into<String>, function: F)
        where F: Fn(&Code, CodeLocation, &[f32]) -> Result<f32, CodeError> + 'static
    {
        self.functions.insert(name.into(), Rc::new(function));
    }

    /// Appends a parent context to inherit symbols from.
    pub fn inherit_context(&mut self, parent: ContextRef) {
        self.parents.push(parent);
    }

    /// Gets a variable from this context or its parent contexts,
    /// recursively. Returns `None` when the name is bound nowhere.
    #[must_use]
    pub fn resolve_variable(&self, name: &str) -> Option<f32> {
        if let Some(&value) = self.variables.get(name) {
            return Some(value);
        }

        self.parents
            .iter()
            .find_map(|parent| parent.borrow().resolve_variable(name))
    }

    /// Gets a function from this context or its parent contexts,
    /// recursively. Returns `None` when the name is bound nowhere.
    #[must_use]
    pub fn resolve_function(&self, name: &str) -> Option<Callable> {
        if let Some(function) = self.functions.get(name) {
            return Some(Rc::clone(function));
        }

        self.parents
            .iter()
            .find_map(|parent| parent.borrow().resolve_function(name))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();

        f.debug_struct("Context")
         .field("variables", &self.variables)
         .field("functions", &functions)
         .field("parents", &self.parents.len())
         .finish()
    }
}
