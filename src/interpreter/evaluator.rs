use crate::{
    ast::TreeNode,
    code::Code,
    config::Config,
    context::Context,
    error::{CodeError, SymbolKind},
};

/// Result type used by all evaluation paths.
pub type EvalResult<T> = Result<T, CodeError>;

impl TreeNode {
    /// Evaluates this node (and its children, if any) to a value.
    ///
    /// Operator and function callables are looked up at evaluation time, so
    /// a tree parsed under one configuration raises an unresolved-reference
    /// error here when the operator has been removed since.
    ///
    /// Both operands of a binary operator are evaluated before the operator
    /// fires; the conditional operator is the only construct that skips one
    /// of its subtrees.
    ///
    /// # Errors
    /// - Unresolved-reference [`CodeError`] when a variable, function or
    ///   operator is not registered.
    /// - Any error raised by an operator or function body, passed through
    ///   unchanged.
    pub fn evaluate(&self, code: &Code, config: &Config, context: &Context) -> EvalResult<f32> {
        match self {
            Self::Number { value, .. } => Ok(*value),

            Self::Variable { name, location } => {
                context.resolve_variable(name).ok_or_else(|| {
                    CodeError::unresolved_reference(name, SymbolKind::Variable, code, *location)
                })
            },

            Self::Function { name, args, location } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.evaluate(code, config, context)?);
                }

                let function = context.resolve_function(name).ok_or_else(|| {
                    CodeError::unresolved_reference(name, SymbolKind::Function, code, *location)
                })?;

                function(code, *location, &values)
            },

            Self::Operator { symbol,
                             left,
                             right,
                             location, } => {
                let left_value = match left {
                    Some(node) => Some(node.evaluate(code, config, context)?),
                    None => None,
                };
                let right_value = match right {
                    Some(node) => Some(node.evaluate(code, config, context)?),
                    None => None,
                };

                match (left_value, right_value) {
                    (Some(x), Some(y)) => {
                        let Some(index) = config.find_binary_op(symbol) else {
                            // The configuration was modified after parsing
                            return Err(CodeError::unresolved_reference(
                                symbol,
                                SymbolKind::BinaryOperator,
                                code,
                                *location,
                            ));
                        };

                        (config.binary_ops[index].operate)(code, *location, x, y)
                    },

                    (Some(x), None) => {
                        let Some(index) = config.find_suffix_op(symbol) else {
                            return Err(CodeError::unresolved_reference(
                                symbol,
                                SymbolKind::UnarySuffixOperator,
                                code,
                                *location,
                            ));
                        };

                        (config.suffix_ops[index].operate)(code, *location, x)
                    },

                    (None, Some(y)) => {
                        let Some(index) = config.find_prefix_op(symbol) else {
                            return Err(CodeError::unresolved_reference(
                                symbol,
                                SymbolKind::UnaryPrefixOperator,
                                code,
                                *location,
                            ));
                        };

                        (config.prefix_ops[index].operate)(code, *location, y)
                    },

                    (None, None) => {
                        Err(CodeError::new("No operands for operator was specified",
                                           code,
                                           *location))
                    },
                }
            },

            Self::Conditional { condition,
                                then_branch,
                                else_branch,
                                .. } => {
                // Only the selected branch is evaluated
                if condition.evaluate(code, config, context)? != 0.0 {
                    then_branch.evaluate(code, config, context)
                } else {
                    else_branch.evaluate(code, config, context)
                }
            },
        }
    }
}
