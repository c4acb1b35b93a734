use std::{cell::RefCell, rc::Rc};

use flexpr::{Associativity, BinaryOperator, Code, CodeLocation, Config, ConfigError, ConfigRef,
             UnaryOperator, express};

fn cfg() -> ConfigRef {
    Rc::new(RefCell::new(Config::default()))
}

/// Walks the whole precedence table and asserts the expected row layout.
/// Rows listed together share a precedence level.
fn assert_precedence_layout(config: &Config, layout: &[&[&str]]) {
    assert_eq!(config.precedence_rows.len(), layout.len());

    for (row, symbols) in layout.iter().enumerate() {
        for symbol in *symbols {
            assert_eq!(config.precedence_of(symbol).unwrap(),
                       Some(row),
                       "'{symbol}' should sit in precedence row {row}");
        }
        assert_eq!(config.precedence_rows[row].len(), symbols.len());
    }
}

const DEFAULT_LAYOUT: &[&[&str]] = &[
    &["<<", ">>"],
    &["^"],
    &["&", "|"],
    &["!!"],
    &["<?", ">?"],
    &["??"],
    &["**"],
    &["//"],
    &["%", "%%"],
    &["*", "/"],
    &["+", "-"],
    &["==", "!=", "<", ">", "<=", ">="],
    &["&&", "||"],
];

#[test]
fn initial_configuration_state() {
    let config = cfg();
    let config = config.borrow();

    assert_eq!(config.prefix_ops.len(), 6);
    assert_eq!(config.suffix_ops.len(), 1);
    assert_eq!(config.binary_ops.len(), 25);
    assert_eq!(config.precedence_rows.len(), 13);

    for symbol in ["+", "-", "*", "/", "!", "~"] {
        assert!(config.has_prefix_op(symbol), "missing prefix '{symbol}'");
    }

    assert!(config.has_suffix_op("!"));

    for symbol in ["+", "-", "*", "/", "%", "%%", "**", "//", "==", "!=", "<", ">", "<=", ">=",
                   "&&", "||", "&", "|", "^", "<<", ">>", "!!", "??", "<?", ">?"]
    {
        assert!(config.has_binary_op(symbol), "missing binary '{symbol}'");
    }

    assert_precedence_layout(&config, DEFAULT_LAYOUT);

    // Associativity check
    for op in &config.binary_ops {
        let expected = match op.symbol.as_str() {
            "**" | "??" => Associativity::Right,
            _ => Associativity::Left,
        };
        assert_eq!(op.assoc, expected, "'{}'", op.symbol);
    }
}

#[test]
fn errors_when_invalid_operator_is_specified() {
    let config = cfg();
    let mut config = config.borrow_mut();

    // Obtaining an unknown operator
    assert!(matches!(config.get_prefix_op("+++"), Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.get_suffix_op("+++"), Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.get_binary_op("+++"), Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.precedence_of("+++"), Err(ConfigError::InvalidArgument(_))));

    // Adding an already existing operator
    let prefix = config.prefix_ops[0].clone();
    assert!(matches!(config.add_prefix_op(prefix), Err(ConfigError::LogicError(_))));
    let suffix = config.suffix_ops[0].clone();
    assert!(matches!(config.add_suffix_op(suffix), Err(ConfigError::LogicError(_))));
    let binary = config.binary_ops[0].clone();
    assert!(matches!(config.add_binary_op(binary), Err(ConfigError::LogicError(_))));

    // Removing an unknown operator
    assert!(matches!(config.remove_prefix_op("+++"), Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.remove_suffix_op("+++"), Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.remove_binary_op("+++"), Err(ConfigError::InvalidArgument(_))));

    // Precedence assigned to an unknown operator
    assert!(matches!(config.assign_precedence_lowest("+++", true, false),
                     Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.assign_precedence_lowest("+++", false, false),
                     Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.assign_precedence("+++", 0, true, false),
                     Err(ConfigError::InvalidArgument(_))));
    assert!(matches!(config.assign_precedence("+++", 0, false, true),
                     Err(ConfigError::InvalidArgument(_))));

    // Precedence assigned to a valid operator with override disabled
    assert!(matches!(config.assign_precedence_lowest("+", true, false),
                     Err(ConfigError::LogicError(_))));
    assert!(matches!(config.assign_precedence_lowest("+", false, false),
                     Err(ConfigError::LogicError(_))));
    assert!(matches!(config.assign_precedence("+", 0, true, false),
                     Err(ConfigError::LogicError(_))));
    assert!(matches!(config.assign_precedence("+", 0, false, false),
                     Err(ConfigError::LogicError(_))));

    // Precedence unassigned from an unknown operator
    assert!(matches!(config.unassign_precedence("+++"), Err(ConfigError::InvalidArgument(_))));

    // Out-of-range precedence level
    let rows = config.precedence_rows.len();
    assert!(matches!(config.assign_precedence("+", rows, false, true),
                     Err(ConfigError::OutOfRange(_))));
    assert!(matches!(config.assign_precedence("+", rows + 1, true, true),
                     Err(ConfigError::OutOfRange(_))));
}

#[test]
fn custom_unary_prefix_operator() {
    let config = cfg();

    assert!(!config.borrow().has_prefix_op("++"));

    config.borrow_mut()
          .add_prefix_op(UnaryOperator::new("++", |_, _, x| Ok(x + 1.0)))
          .unwrap();

    assert!(config.borrow().has_prefix_op("++"));

    let probe = config.borrow();
    let op = probe.get_prefix_op("++").unwrap();
    assert_eq!((op.operate)(&Code::new(""), CodeLocation::default(), 2.0).unwrap(), 3.0);
    drop(probe);

    assert_eq!(express("++2", Some(Rc::clone(&config)), None).unwrap(), 3.0);

    config.borrow_mut().remove_prefix_op("++").unwrap();
    assert!(!config.borrow().has_prefix_op("++"));
}

#[test]
fn custom_unary_suffix_operator() {
    let config = cfg();

    assert!(!config.borrow().has_suffix_op("--"));

    config.borrow_mut()
          .add_suffix_op(UnaryOperator::new("--", |_, _, x| Ok(x - 1.0)))
          .unwrap();

    assert!(config.borrow().has_suffix_op("--"));

    let probe = config.borrow();
    let op = probe.get_suffix_op("--").unwrap();
    assert_eq!((op.operate)(&Code::new(""), CodeLocation::default(), 2.0).unwrap(), 1.0);
    drop(probe);

    assert_eq!(express("2--", Some(Rc::clone(&config)), None).unwrap(), 1.0);

    config.borrow_mut().remove_suffix_op("--").unwrap();
    assert!(!config.borrow().has_suffix_op("--"));
}

#[test]
fn custom_binary_operator() {
    let config = cfg();

    assert!(!config.borrow().has_binary_op("+++"));

    {
        let mut config = config.borrow_mut();
        config.add_binary_op(BinaryOperator::new("+++", Associativity::Right, |_, _, x, y| {
                  Ok(2.0 * x * y)
              }))
              .unwrap();
        config.assign_precedence_lowest("+++", true, false).unwrap();

        assert!(config.has_binary_op("+++"));
        assert_eq!(config.precedence_of("+++").unwrap(),
                   Some(config.precedence_rows.len() - 1));

        let op = config.get_binary_op("+++").unwrap();
        assert_eq!(op.assoc, Associativity::Right);
        assert_eq!((op.operate)(&Code::new(""), CodeLocation::default(), 2.0, 3.0).unwrap(),
                   12.0);

        // Move it to the first row, joining the operators already there
        config.assign_precedence("+++", 0, false, true).unwrap();
        assert_eq!(config.precedence_of("+++").unwrap(), Some(0));
        assert!(config.precedence_rows[0].len() > 1);

        // Move it to a new second row of its own
        config.assign_precedence("+++", 1, true, true).unwrap();
        assert_eq!(config.precedence_of("+++").unwrap(), Some(1));
        assert_eq!(config.precedence_rows[1].len(), 1);

        // The rest of the table shifted down by one
        assert_precedence_layout(&config,
                                 &[&["<<", ">>"],
                                   &["+++"],
                                   &["^"],
                                   &["&", "|"],
                                   &["!!"],
                                   &["<?", ">?"],
                                   &["??"],
                                   &["**"],
                                   &["//"],
                                   &["%", "%%"],
                                   &["*", "/"],
                                   &["+", "-"],
                                   &["==", "!=", "<", ">", "<=", ">="],
                                   &["&&", "||"]]);
    }

    assert_eq!(express("2+++3", Some(Rc::clone(&config)), None).unwrap(), 12.0);

    // More precedent than `*`: (2+++3) * 4
    assert_eq!(express("2+++3*4", Some(Rc::clone(&config)), None).unwrap(), 48.0);

    // Right associative: 2 +++ (3 +++ 4)
    assert_eq!(express("2+++3+++4", Some(Rc::clone(&config)), None).unwrap(), 96.0);

    {
        let mut config = config.borrow_mut();
        config.unassign_precedence("+++").unwrap();
        config.remove_binary_op("+++").unwrap();
        assert!(!config.has_binary_op("+++"));
    }
}

#[test]
fn removing_a_binary_operator_keeps_the_table_consistent() {
    let config = cfg();
    let mut config = config.borrow_mut();

    config.remove_binary_op("+").unwrap();

    // `-` shared the row; the row survives and every stored index still
    // resolves to the right operator
    assert_eq!(config.precedence_of("-").unwrap(), Some(10));
    assert_eq!(config.binary_ops.len(), 24);
    assert_precedence_layout(&config,
                             &[&["<<", ">>"],
                               &["^"],
                               &["&", "|"],
                               &["!!"],
                               &["<?", ">?"],
                               &["??"],
                               &["**"],
                               &["//"],
                               &["%", "%%"],
                               &["*", "/"],
                               &["-"],
                               &["==", "!=", "<", ">", "<=", ">="],
                               &["&&", "||"]]);

    // Removing the only operator of a row deletes the row
    config.remove_binary_op("^").unwrap();
    assert_eq!(config.precedence_rows.len(), 12);
    assert_eq!(config.precedence_of("<<").unwrap(), Some(0));
    assert_eq!(config.precedence_of("&").unwrap(), Some(1));
}

#[test]
fn unassigned_operators_are_invisible_to_the_parser() {
    let config = cfg();

    config.borrow_mut().unassign_precedence("+").unwrap();

    // `+` is still registered, but the parser no longer matches it
    assert!(config.borrow().has_binary_op("+"));
    assert_eq!(config.borrow().precedence_of("+").unwrap(), None);
    assert!(express("1 + 2", Some(Rc::clone(&config)), None).is_err());
    assert_eq!(express("1 - 2", Some(config), None).unwrap(), -1.0);
}

#[test]
fn empty_precedence_table_parses_primaries_only() {
    let config = Rc::new(RefCell::new(Config::empty()));

    config.borrow_mut()
          .add_prefix_op(UnaryOperator::new("-", |_, _, x| Ok(-x)))
          .unwrap();

    assert_eq!(express("5", Some(Rc::clone(&config)), None).unwrap(), 5.0);
    assert_eq!(express("-5", Some(Rc::clone(&config)), None).unwrap(), -5.0);

    // The ternary still works below an empty table
    assert_eq!(express("1 ? 2 : 3", Some(Rc::clone(&config)), None).unwrap(), 2.0);

    assert!(express("1 + 2", Some(config), None).is_err());
}

#[test]
fn same_symbol_in_multiple_groups() {
    let config = cfg();

    // `!` is both prefix (logical not) and suffix (factorial); `+` is both
    // prefix and binary. Position disambiguates.
    assert_eq!(express("!0 + 4!", Some(Rc::clone(&config)), None).unwrap(), 25.0);
    assert_eq!(express("+5 + 5", Some(config), None).unwrap(), 10.0);
}
