use crate::{
    ast::TreeNode,
    code::{Code, CodeLocation},
    config::{Associativity, Config},
    error::CodeError,
    interpreter::lexer::{Token, TokenKind},
};

/// Result type used by all parsing functions.
pub type ParseResult<T> = Result<T, CodeError>;

/// Parses a token stream into a tree, consulting the configuration for
/// operator identity, precedence and associativity.
///
/// An empty token stream parses to the number `0`, so an empty expression
/// evaluates to zero.
///
/// # Errors
/// Fails with an unexpected-token [`CodeError`] on any grammar violation,
/// including tokens left over after the top-level expression.
///
/// ## Example
/// ```
/// use flexpr::{parse, tokenize, Code, Config, TreeNode};
///
/// let code = Code::new("1 + 2");
/// let tokens = tokenize(&code).unwrap();
/// let tree = parse(&code, &tokens, &Config::default()).unwrap();
///
/// assert!(matches!(tree, TreeNode::Operator { .. }));
/// ```
pub fn parse(code: &Code, tokens: &[Token], config: &Config) -> ParseResult<TreeNode> {
    if tokens.is_empty() {
        return Ok(TreeNode::Number { value:    0.0,
                                     location: CodeLocation::default(), });
    }

    let mut pos = 0;
    let node = parse_all(code, tokens, config, &mut pos)?;

    if pos != tokens.len() {
        return Err(CodeError::unexpected_token("Unexpected tokens after expression",
                                               code,
                                               &tokens[pos]));
    }

    Ok(node)
}

/// Parses a full expression. This is the entry point the sub-expression
/// sites (parentheses, function arguments, conditional branches) recurse
/// into.
///
/// Grammar: `all := conditional`
fn parse_all(code: &Code,
             tokens: &[Token],
             config: &Config,
             pos: &mut usize)
             -> ParseResult<TreeNode> {
    parse_conditional(code, tokens, config, pos)
}

/// Parses the conditional (ternary) operator, which binds below every
/// binary operator and is right-associative.
///
/// Grammar: `conditional := binary ('?' all ':' all)?`
fn parse_conditional(code: &Code,
                     tokens: &[Token],
                     config: &Config,
                     pos: &mut usize)
                     -> ParseResult<TreeNode> {
    // With no precedence rows there are no binary operators to climb
    let condition = if config.precedence_rows.is_empty() {
        parse_primary(code, tokens, config, pos)?
    } else {
        parse_binary(code, tokens, config, pos, config.precedence_rows.len() - 1)?
    };

    let question_mark = match tokens.get(*pos) {
        Some(token) if token.kind == TokenKind::Symbol && token.value == "?" => token,
        _ => return Ok(condition),
    };

    let location = question_mark.location;
    *pos += 1;

    let then_branch = parse_all(code, tokens, config, pos)?;

    if *pos >= tokens.len() || tokens[*pos].value != ":" {
        return Err(CodeError::unexpected_token("Expected ':' in conditional expression",
                                               code,
                                               error_token(tokens, *pos)));
    }
    *pos += 1;

    let else_branch = parse_all(code, tokens, config, pos)?;

    Ok(TreeNode::Conditional { condition: Box::new(condition),
                               then_branch: Box::new(then_branch),
                               else_branch: Box::new(else_branch),
                               location })
}

/// Parses binary operators at the given precedence level.
///
/// The left operand is parsed one level tighter (or as a primary at level
/// zero). While the next token matches an operator of this row, the right
/// operand recurses at the same level for right-associative operators and
/// one level tighter for left-associative ones, which is the standard
/// precedence-climbing rule over a runtime table.
fn parse_binary(code: &Code,
                tokens: &[Token],
                config: &Config,
                pos: &mut usize,
                prec: usize)
                -> ParseResult<TreeNode> {
    let mut left = if prec == 0 {
        parse_primary(code, tokens, config, pos)?
    } else {
        parse_binary(code, tokens, config, pos, prec - 1)?
    };

    let mut matched = true;
    while matched && *pos < tokens.len() {
        matched = false;

        for &index in &config.precedence_rows[prec] {
            let op = &config.binary_ops[index];

            if tokens[*pos].kind != TokenKind::Symbol || tokens[*pos].value != op.symbol {
                continue;
            }

            matched = true;
            let symbol = tokens[*pos].value.clone();
            let location = tokens[*pos].location;
            *pos += 1;

            let right = if prec == 0 {
                parse_primary(code, tokens, config, pos)?
            } else if op.assoc == Associativity::Right {
                parse_binary(code, tokens, config, pos, prec)?
            } else {
                parse_binary(code, tokens, config, pos, prec - 1)?
            };

            left = TreeNode::Operator { symbol,
                                        left: Some(Box::new(left)),
                                        right: Some(Box::new(right)),
                                        location };
            break;
        }
    }

    Ok(left)
}

/// Parses a primary expression: any number of prefix operators, then a
/// number, variable, function call or parenthesized expression, then any
/// number of suffix operators.
///
/// Grammar:
/// ```text
///     primary := prefix_op* core suffix_op*
///     core    := Number | Variable | Function | '(' all ')'
/// ```
fn parse_primary(code: &Code,
                 tokens: &[Token],
                 config: &Config,
                 pos: &mut usize)
                 -> ParseResult<TreeNode> {
    if *pos >= tokens.len() {
        return Err(CodeError::unexpected_token("Unexpected end of expression",
                                               code,
                                               error_token(tokens, *pos)));
    }

    // Prefix operators nest right to left via recursion
    let mut prefix = None;
    if tokens[*pos].kind == TokenKind::Symbol {
        for op in &config.prefix_ops {
            if tokens[*pos].value == op.symbol {
                let symbol = tokens[*pos].value.clone();
                let location = tokens[*pos].location;
                *pos += 1;

                let operand = parse_primary(code, tokens, config, pos)?;
                prefix = Some(TreeNode::Operator { symbol,
                                                   left: None,
                                                   right: Some(Box::new(operand)),
                                                   location });
                break;
            }
        }
    }

    let mut node = match prefix {
        Some(node) => node,
        None => match tokens[*pos].kind {
            TokenKind::Number => parse_number(code, tokens, pos)?,
            TokenKind::Identifier => parse_identifier(code, tokens, config, pos)?,
            TokenKind::Punctuation if tokens[*pos].value == "(" => {
                parse_parenthesis(code, tokens, config, pos)?
            },
            _ => {
                return Err(CodeError::unexpected_token(
                    "Expected number, identifier or punctuation",
                    code,
                    error_token(tokens, *pos),
                ));
            },
        },
    };

    // Suffix operators chain left to right
    let mut more = true;
    while more && *pos < tokens.len() && tokens[*pos].kind == TokenKind::Symbol {
        more = false;

        for op in &config.suffix_ops {
            if tokens[*pos].value == op.symbol {
                let symbol = tokens[*pos].value.clone();
                let location = tokens[*pos].location;
                *pos += 1;

                node = TreeNode::Operator { symbol,
                                            left: Some(Box::new(node)),
                                            right: None,
                                            location };
                more = true;
                break;
            }
        }
    }

    Ok(node)
}

/// Parses a numeric literal.
fn parse_number(code: &Code, tokens: &[Token], pos: &mut usize) -> ParseResult<TreeNode> {
    let token = &tokens[*pos];
    *pos += 1;

    let value = token.value
                     .parse::<f32>()
                     .map_err(|_| CodeError::tokenizer("Malformed number literal", code, token.location))?;

    Ok(TreeNode::Number { value,
                          location: token.location })
}

/// Parses an identifier: a function call when immediately followed by `(`,
/// a variable reference otherwise.
fn parse_identifier(code: &Code,
                    tokens: &[Token],
                    config: &Config,
                    pos: &mut usize)
                    -> ParseResult<TreeNode> {
    let next = tokens.get(*pos + 1);
    if next.is_some_and(|token| token.kind == TokenKind::Punctuation && token.value == "(") {
        return parse_function(code, tokens, config, pos);
    }

    parse_variable(tokens, pos)
}

/// Parses a variable reference.
fn parse_variable(tokens: &[Token], pos: &mut usize) -> ParseResult<TreeNode> {
    let token = &tokens[*pos];
    *pos += 1;

    Ok(TreeNode::Variable { name:     token.value.clone(),
                            location: token.location, })
}

/// Parses a function call with comma-separated argument expressions. An
/// empty argument list is legal.
fn parse_function(code: &Code,
                  tokens: &[Token],
                  config: &Config,
                  pos: &mut usize)
                  -> ParseResult<TreeNode> {
    let name = tokens[*pos].value.clone();
    let location = tokens[*pos].location;

    // The caller verified the '(' after the name
    *pos += 2;

    let mut args = Vec::new();

    if is_punctuation(tokens, *pos, ")") {
        *pos += 1;
        return Ok(TreeNode::Function { name, args, location });
    }

    loop {
        args.push(parse_all(code, tokens, config, pos)?);

        if is_punctuation(tokens, *pos, ",") {
            *pos += 1;
            continue;
        }

        if is_punctuation(tokens, *pos, ")") {
            *pos += 1;
            break;
        }

        return Err(CodeError::unexpected_token("Expected ',' or ')' in function arguments",
                                               code,
                                               error_token(tokens, *pos)));
    }

    Ok(TreeNode::Function { name, args, location })
}

/// Parses a parenthesized sub-expression.
fn parse_parenthesis(code: &Code,
                     tokens: &[Token],
                     config: &Config,
                     pos: &mut usize)
                     -> ParseResult<TreeNode> {
    *pos += 1; // Consume '('

    let node = parse_all(code, tokens, config, pos)?;

    if !is_punctuation(tokens, *pos, ")") {
        return Err(CodeError::unexpected_token("Expected ')'", code, error_token(tokens, *pos)));
    }
    *pos += 1; // Consume ')'

    Ok(node)
}

fn is_punctuation(tokens: &[Token], pos: usize, value: &str) -> bool {
    tokens.get(pos)
          .is_some_and(|token| token.kind == TokenKind::Punctuation && token.value == value)
}

/// The token to blame in an error: the one at `pos`, or the last real token
/// when the stream ended early.
fn error_token(tokens: &[Token], pos: usize) -> &Token {
    if pos >= tokens.len() {
        &tokens[tokens.len() - 1]
    } else {
        &tokens[pos]
    }
}
