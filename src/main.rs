use std::{
    cell::RefCell,
    fs,
    io::{self, BufRead, Write},
    rc::Rc,
};

use clap::Parser;
use flexpr::{Code, Config, ConfigRef, Context, ContextRef, express, parse, tokenize,
             tokens_to_string};

/// flexpr is an embeddable arithmetic expression language with
/// runtime-customizable operators, variables and functions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells flexpr to read the expression from a file instead of the
    /// command line.
    #[arg(short, long)]
    file: bool,

    /// Expression to evaluate. Starts an interactive session when omitted.
    expression: Option<String>,
}

fn main() {
    let args = Args::parse();

    let config = Rc::new(RefCell::new(Config::default()));
    let context = Rc::new(RefCell::new(Context::new()));
    context.borrow_mut().populate();

    let Some(input) = args.expression else {
        repl(&config, &context);
        return;
    };

    let text = if args.file {
        fs::read_to_string(&input).unwrap_or_else(|_| {
                                      eprintln!("Failed to read the input file '{input}'. \
                                                 Perhaps this file does not exist?");
                                      std::process::exit(1);
                                  })
    } else {
        input
    };

    match express(&text, Some(config), Some(context)) {
        Ok(value) => println!("{value}"),
        Err(e) => {
            eprint!("{e}");
            std::process::exit(1);
        },
    }
}

/// Reads expressions and commands from stdin until `exit` or end of input.
fn repl(config: &ConfigRef, context: &ContextRef) {
    println!("flexpr {} -- type 'help' for available commands", env!("CARGO_PKG_VERSION"));

    let stdin = io::stdin();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {},
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "exit" => break,
            "help" => print_help(),
            "list" => list_symbols(context),
            "var" => define_variable(rest, config, context),
            "undef" => undefine(rest, context),
            "tokens" => show_tokens(rest),
            "ast" => show_tree(rest, config),
            _ => evaluate_line(line, config, context),
        }
    }
}

fn evaluate_line(line: &str, config: &ConfigRef, context: &ContextRef) {
    match express(line, Some(Rc::clone(config)), Some(Rc::clone(context))) {
        Ok(value) => println!("{value}"),
        Err(e) => eprint!("{e}"),
    }
}

/// Handles `var NAME = EXPR`: evaluates the expression and stores the
/// result under the name, visible to every later input.
fn define_variable(rest: &str, config: &ConfigRef, context: &ContextRef) {
    let Some((name, value_text)) = rest.split_once('=') else {
        eprintln!("Usage: var NAME = EXPR");
        return;
    };

    let name = name.trim();
    let value_text = value_text.trim();

    if !is_identifier(name) {
        eprintln!("'{name}' is not a valid variable name");
        return;
    }

    match express(value_text, Some(Rc::clone(config)), Some(Rc::clone(context))) {
        Ok(value) => {
            context.borrow_mut().set_variable(name, value);
            println!("{name} = {value}");
        },
        Err(e) => eprint!("{e}"),
    }
}

/// Handles `undef NAME`: removes a variable or function from the session
/// context.
fn undefine(rest: &str, context: &ContextRef) {
    let name = rest.trim();
    let mut context = context.borrow_mut();

    let removed_variable = context.variables.remove(name).is_some();
    let removed_function = context.functions.remove(name).is_some();

    if !removed_variable && !removed_function {
        eprintln!("'{name}' is not defined");
    }
}

fn list_symbols(context: &ContextRef) {
    let context = context.borrow();

    let mut variables: Vec<(&String, &f32)> = context.variables.iter().collect();
    variables.sort_by_key(|&(name, _)| name);
    for (name, value) in variables {
        println!("var {name} = {value}");
    }

    let mut functions: Vec<&String> = context.functions.keys().collect();
    functions.sort();
    for name in functions {
        println!("fn  {name}(...)");
    }
}

fn show_tokens(rest: &str) {
    let code = Code::new(rest);
    match tokenize(&code) {
        Ok(tokens) => print!("{}", tokens_to_string(&code, &tokens)),
        Err(e) => eprint!("{e}"),
    }
}

fn show_tree(rest: &str, config: &ConfigRef) {
    let code = Code::new(rest);
    match tokenize(&code).and_then(|tokens| parse(&code, &tokens, &config.borrow())) {
        Ok(tree) => print!("{}", tree.to_string(&code, 0)),
        Err(e) => eprint!("{e}"),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    chars.next()
         .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn print_help() {
    println!("Commands:");
    println!("  var NAME = EXPR   Define or update a variable");
    println!("  undef NAME        Remove a variable or function");
    println!("  list              List defined symbols");
    println!("  tokens EXPR       Show the token stream of an expression");
    println!("  ast EXPR          Show the parsed tree of an expression");
    println!("  help              Show this message");
    println!("  exit              Leave the session");
    println!("Anything else is evaluated as an expression.");
}
