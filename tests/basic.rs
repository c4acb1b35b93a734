use std::{cell::RefCell, rc::Rc};

use flexpr::{Config, ConfigRef, Context, ContextRef, Expression, express};

fn cfg() -> ConfigRef {
    Rc::new(RefCell::new(Config::default()))
}

fn ctx() -> ContextRef {
    Rc::new(RefCell::new(Context::new()))
}

fn assert_value(source: &str, expected: f32) {
    let value = express(source, Some(cfg()), None).unwrap_or_else(|e| {
                                                      panic!("'{source}' failed to evaluate:\n{e}")
                                                  });
    assert_eq!(value, expected, "'{source}'");
}

#[test]
fn basic_expression_parsing_and_evaluation() {
    assert_value("1 + 1", 2.0);
    assert_value("2 * (3 + 4)", 14.0);
    assert_value("2 ** 3 + 1", 9.0);
    assert_value("10 // 3 + 2 % 3", 5.0);
    assert_value("-2 %% 5 + 4", 7.0);
    assert_value("5 !! 3 + (4 <? 2)", 4.0);
    assert_value("8 >? 3 - 1", 7.0);
    assert_value("0 ?? 5 * 2", 10.0);
    assert_value("1 ? 10 : 20 + 5", 10.0);
    assert_value("(1 ? 2 : 3) * (4 - 1)", 6.0);
    assert_value("(1 + 2) * 3 - 4 / 5 + 2 ** (1 + 1)", 12.2);
}

#[test]
fn right_associative_exponentiation() {
    assert_value("2 ** 3 ** 2", 512.0);
}

#[test]
fn empty_source_evaluates_to_zero() {
    assert_value("", 0.0);
    assert_value("   ", 0.0);
    assert_value("\n\t", 0.0);
}

#[test]
fn number_literals_with_digit_separators() {
    assert_value("1'000 + 2_000", 3000.0);
    assert_value("1''2", 12.0); // Doubled separators are tolerated
    assert_value("1_0.5", 10.5);
}

#[test]
fn nested_conditional_takes_the_then_branch() {
    assert_value("1 ? 2 : 3 ? 4 : 5", 2.0);
    assert_value("0 ? 2 : 3 ? 4 : 5", 4.0);
}

#[test]
fn basic_expression_with_context() {
    fn eval_with_vars(source: &str, vars: &[(&str, f32)]) -> f32 {
        let mut expression = Expression::new(source);
        expression.config = Some(cfg());
        for &(name, value) in vars {
            expression.set_variable(name, value);
        }
        expression.get_value()
                  .unwrap_or_else(|e| panic!("'{source}' failed to evaluate:\n{e}"))
    }

    assert_eq!(eval_with_vars("x + 1", &[("x", 5.0)]), 6.0);
    assert_eq!(eval_with_vars("y * 2 + 3", &[("y", 4.0)]), 11.0);
    assert_eq!(eval_with_vars("a - b / 2", &[("a", 10.0), ("b", 6.0)]), 7.0);
    assert_eq!(eval_with_vars("(m + n) * 2", &[("m", 2.0), ("n", 3.0)]), 10.0);
    assert_eq!(eval_with_vars("sum + offset", &[("sum", 8.0), ("offset", 2.0)]), 10.0);
    assert_eq!(eval_with_vars("(u - v) ** w", &[("u", 5.0), ("v", 2.0), ("w", 3.0)]), 27.0);
    assert_eq!(eval_with_vars("flag ? a : b", &[("flag", 0.0), ("a", 10.0), ("b", 20.0)]), 20.0);
    assert_eq!(eval_with_vars("flag ? a : b", &[("flag", 1.0), ("a", 10.0), ("b", 20.0)]), 10.0);
    assert_eq!(eval_with_vars("p ?? q", &[("p", 0.0), ("q", 7.0)]), 7.0);
    assert_eq!(eval_with_vars("p ?? q", &[("p", 5.0), ("q", 7.0)]), 5.0);
}

#[test]
fn basic_expression_with_local_functions() {
    let mut expression = Expression::new("double(3) + 1");
    expression.config = Some(cfg());
    expression.set_function("double", |_, _, p| Ok(p[0] * 2.0));
    assert_eq!(expression.get_value().unwrap(), 7.0);

    let mut expression = Expression::new("quadruple(x)");
    expression.config = Some(cfg());
    expression.set_variable("x", 2.0);
    expression.set_function("quadruple", |_, _, p| Ok(p[0] * 4.0));
    assert_eq!(expression.get_value().unwrap(), 8.0);
}

#[test]
fn basic_expression_with_shared_context() {
    let config = cfg();

    let ctx1 = ctx();
    ctx1.borrow_mut().set_variable("a", 1.0);
    ctx1.borrow_mut().set_variable("b", 2.0);
    ctx1.borrow_mut().set_variable("c", 3.0);

    let ctx2 = ctx();
    ctx2.borrow_mut().set_function("inc", |_, _, p| Ok(p[0] + 1.0));
    ctx2.borrow_mut()
        .set_function("square", |_, _, p| Ok(p[0] * p[0]));

    let ctx3 = ctx();
    ctx3.borrow_mut().set_variable("x", 5.0);
    ctx3.borrow_mut().set_variable("y", 10.0);
    ctx3.borrow_mut().set_function("double", |_, _, p| Ok(p[0] * 2.0));

    let eval = |source: &str, context: &ContextRef| {
        express(source, Some(Rc::clone(&config)), Some(Rc::clone(context)))
            .unwrap_or_else(|e| panic!("'{source}' failed to evaluate:\n{e}"))
    };

    assert_eq!(eval("a + b + c", &ctx1), 6.0);
    assert_eq!(eval("a * b - c", &ctx1), -1.0);
    assert_eq!(eval("(a + b) * c", &ctx1), 9.0);
    assert_eq!(eval("inc(5)", &ctx2), 6.0);
    assert_eq!(eval("square(3)", &ctx2), 9.0);
    assert_eq!(eval("inc(square(2))", &ctx2), 5.0);
    assert_eq!(eval("double(x)", &ctx3), 10.0);
    assert_eq!(eval("x + double(y)", &ctx3), 25.0);
    assert_eq!(eval("double(x + y)", &ctx3), 30.0);
}

#[test]
fn conditional_short_circuits_the_untaken_branch() {
    let calls = Rc::new(RefCell::new(0));
    let context = ctx();

    let counter = Rc::clone(&calls);
    context.borrow_mut().set_function("touch", move |_, _, _| {
                            *counter.borrow_mut() += 1;
                            Ok(1.0)
                        });

    let config = cfg();

    let value = express("1 ? 2 : touch()", Some(Rc::clone(&config)), Some(Rc::clone(&context)));
    assert_eq!(value.unwrap(), 2.0);
    assert_eq!(*calls.borrow(), 0);

    let value = express("0 ? touch() : 3", Some(Rc::clone(&config)), Some(Rc::clone(&context)));
    assert_eq!(value.unwrap(), 3.0);
    assert_eq!(*calls.borrow(), 0);

    let value = express("0 ? 2 : touch()", Some(config), Some(context));
    assert_eq!(value.unwrap(), 1.0);
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn boolean_operators_evaluate_both_sides() {
    let calls = Rc::new(RefCell::new(0));
    let context = ctx();

    let counter = Rc::clone(&calls);
    context.borrow_mut().set_function("touch", move |_, _, _| {
                            *counter.borrow_mut() += 1;
                            Ok(1.0)
                        });

    let config = cfg();
    let eval = |source: &str| {
        express(source, Some(Rc::clone(&config)), Some(Rc::clone(&context)))
            .unwrap_or_else(|e| panic!("'{source}' failed to evaluate:\n{e}"))
    };

    // No short-circuit: the right side always fires
    assert_eq!(eval("1 || touch()"), 1.0);
    assert_eq!(*calls.borrow(), 1);

    assert_eq!(eval("0 && touch()"), 0.0);
    assert_eq!(*calls.borrow(), 2);

    assert_eq!(eval("1 ?? touch()"), 1.0);
    assert_eq!(*calls.borrow(), 3);
}

#[test]
fn function_arguments_evaluate_left_to_right() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let context = ctx();

    let log = Rc::clone(&order);
    context.borrow_mut().set_function("mark", move |_, _, p| {
                            log.borrow_mut().push(p[0] as i32);
                            Ok(p[0])
                        });

    let value = express("mark(1) + mark(2) * mark(3)", Some(cfg()), Some(context));
    assert_eq!(value.unwrap(), 7.0);
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}
