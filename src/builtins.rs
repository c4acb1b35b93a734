//! Built-in operator preset and symbol catalog.
//!
//! `Config::default()` installs the standard operator set, and
//! [`Context::populate`] fills a context with commonly used mathematical
//! constants and functions. Neither is hardcoded anywhere else; a host that
//! wants a different language starts from [`Config::empty`] and an
//! unpopulated context.

#![allow(clippy::cast_possible_truncation,
         clippy::cast_precision_loss,
         clippy::cast_sign_loss)]

use std::{
    cell::RefCell,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    code::{Code, CodeLocation},
    config::{Associativity, BinaryOperator, Config, UnaryOperator},
    context::Context,
    error::CodeError,
};

thread_local! {
    /// Generator behind the `rand` builtin, kept reseedable for `srand`.
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_os_rng());
}

/// `1.0` for true, `0.0` for false.
fn truth(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Computes `⌊x⌋!`. Negative values yield `0`, and `0!` and `1!` are `1`.
fn factorial(x: f32) -> f32 {
    if x < 0.0 {
        return 0.0;
    }
    if x == 0.0 || x == 1.0 {
        return 1.0;
    }

    let mut result = 1.0_f32;
    for i in 1..=(x as i32) {
        result *= i as f32;
    }
    result
}

/// Modulo over truncated integers, wrapped into `[0, y)` for negative
/// dividends.
fn wrapping_modulo(x: f32, y: f32) -> f32 {
    let ix = x as i32;
    let iy = y as i32;

    let mut r = ix % iy;
    if r < 0 {
        r += iy;
    }
    r as f32
}

fn gcd(a: i32, b: i32) -> i32 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: i32, b: i32) -> i32 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b) * b).abs()
}

impl Default for Config {
    /// Creates a configuration with the standard operator preset: six
    /// prefix operators, the factorial suffix, and 25 binary operators
    /// across 13 precedence rows.
    fn default() -> Self {
        let prefix_ops = vec![
            UnaryOperator::new("+", |_, _, x| Ok(0.0 + x)),
            UnaryOperator::new("-", |_, _, x| Ok(0.0 - x)),
            UnaryOperator::new("*", |_, _, x| Ok(1.0 * x)),
            UnaryOperator::new("/", |code, location, x| {
                if x == 0.0 {
                    return Err(CodeError::new("Division by zero", code, location));
                }
                Ok(1.0 / x)
            }),
            UnaryOperator::new("!", |_, _, x| Ok(truth(x == 0.0))),
            UnaryOperator::new("~", |_, _, x| Ok(!(x as i32) as f32)),
        ];

        let suffix_ops = vec![UnaryOperator::new("!", |_, _, x| Ok(factorial(x)))];

        let binary_ops = vec![
            BinaryOperator::new("+", Associativity::Left, |_, _, x, y| Ok(x + y)),
            BinaryOperator::new("-", Associativity::Left, |_, _, x, y| Ok(x - y)),
            BinaryOperator::new("*", Associativity::Left, |_, _, x, y| Ok(x * y)),
            BinaryOperator::new("/", Associativity::Left, |code, location, x, y| {
                if y == 0.0 {
                    return Err(CodeError::new("Division by zero", code, location));
                }
                Ok(x / y)
            }),
            BinaryOperator::new("%", Associativity::Left, |code, location, x, y| {
                if y == 0.0 {
                    return Err(CodeError::new("Modulo by zero", code, location));
                }
                Ok(x % y)
            }),
            BinaryOperator::new("%%", Associativity::Left, |code, location, x, y| {
                if y == 0.0 {
                    return Err(CodeError::new("Wrapping modulo by zero", code, location));
                }
                Ok(wrapping_modulo(x, y))
            }),
            BinaryOperator::new("**", Associativity::Right, |_, _, x, y| Ok(x.powf(y))),
            BinaryOperator::new("//", Associativity::Left, |code, location, x, y| {
                if y == 0.0 {
                    return Err(CodeError::new("Flooring division by zero", code, location));
                }
                Ok((x / y).floor())
            }),
            BinaryOperator::new("==", Associativity::Left, |_, _, x, y| Ok(truth(x == y))),
            BinaryOperator::new("!=", Associativity::Left, |_, _, x, y| Ok(truth(x != y))),
            BinaryOperator::new("<", Associativity::Left, |_, _, x, y| Ok(truth(x < y))),
            BinaryOperator::new(">", Associativity::Left, |_, _, x, y| Ok(truth(x > y))),
            BinaryOperator::new("<=", Associativity::Left, |_, _, x, y| Ok(truth(x <= y))),
            BinaryOperator::new(">=", Associativity::Left, |_, _, x, y| Ok(truth(x >= y))),
            BinaryOperator::new("&&", Associativity::Left, |_, _, x, y| {
                Ok(truth(x != 0.0 && y != 0.0))
            }),
            BinaryOperator::new("||", Associativity::Left, |_, _, x, y| {
                Ok(truth(x != 0.0 || y != 0.0))
            }),
            BinaryOperator::new("&", Associativity::Left, |_, _, x, y| {
                Ok(((x as i32) & (y as i32)) as f32)
            }),
            BinaryOperator::new("|", Associativity::Left, |_, _, x, y| {
                Ok(((x as i32) | (y as i32)) as f32)
            }),
            BinaryOperator::new("^", Associativity::Left, |_, _, x, y| {
                Ok(((x as i32) ^ (y as i32)) as f32)
            }),
            BinaryOperator::new("<<", Associativity::Left, |_, _, x, y| {
                Ok((x as i32).wrapping_shl(y as u32) as f32)
            }),
            BinaryOperator::new(">>", Associativity::Left, |_, _, x, y| {
                Ok((x as i32).wrapping_shr(y as u32) as f32)
            }),
            BinaryOperator::new("!!", Associativity::Left, |_, _, x, y| Ok((x - y).abs())),
            BinaryOperator::new("??", Associativity::Right, |_, _, x, y| {
                Ok(if x != 0.0 { x } else { y })
            }),
            BinaryOperator::new("<?", Associativity::Left, |_, _, x, y| Ok(x.min(y))),
            BinaryOperator::new(">?", Associativity::Left, |_, _, x, y| Ok(x.max(y))),
        ];

        // Rows hold indices into `binary_ops` above, tightest first:
        //   [<< >>] [^] [& |] [!!] [<? >?] [??] [**] [//] [% %%] [* /] [+ -]
        //   [== != < > <= >=] [&& ||]
        let precedence_rows = vec![
            vec![19, 20],
            vec![18],
            vec![16, 17],
            vec![21],
            vec![23, 24],
            vec![22],
            vec![6],
            vec![7],
            vec![4, 5],
            vec![2, 3],
            vec![0, 1],
            vec![8, 9, 10, 11, 12, 13],
            vec![14, 15],
        ];

        Self { prefix_ops,
               suffix_ops,
               binary_ops,
               precedence_rows }
    }
}

impl Context {
    /// Populates the context with built-in variables and functions.
    ///
    /// This registers standard mathematical constants such as `pi`, `e` and
    /// `phi`, and over 50 commonly used functions such as `sin()`, `sqrt()`,
    /// `clamp()`, `min()` and `max()`, mostly wrapping the `f32` methods of
    /// the standard library.
    ///
    /// When a symbol already exists with the same name as a populating
    /// symbol, the existing one is overridden. Populate the context before
    /// adding custom symbols.
    pub fn populate(&mut self) {
        self.set_variable("e", std::f32::consts::E);
        self.set_variable("log2e", std::f32::consts::LOG2_E);
        self.set_variable("log10e", std::f32::consts::LOG10_E);
        self.set_variable("pi", std::f32::consts::PI);
        self.set_variable("inv_pi", std::f32::consts::FRAC_1_PI);
        self.set_variable("inv_sqrtpi", std::f32::consts::PI.sqrt().recip());
        self.set_variable("ln2", std::f32::consts::LN_2);
        self.set_variable("ln10", std::f32::consts::LN_10);
        self.set_variable("sqrt2", std::f32::consts::SQRT_2);
        self.set_variable("sqrt3", 3.0_f32.sqrt());
        self.set_variable("inv_sqrt3", 3.0_f32.sqrt().recip());
        self.set_variable("egamma", 0.577_215_7); // Euler-Mascheroni constant
        self.set_variable("phi", 1.618_034); // Golden ratio

        self.register("abs", 1, |p| p[0].abs());
        self.register("acos", 1, |p| p[0].acos());
        self.register("acosh", 1, |p| p[0].acosh());
        self.register("asin", 1, |p| p[0].asin());
        self.register("asinh", 1, |p| p[0].asinh());
        self.register("atan", 1, |p| p[0].atan());
        self.register("atan2", 2, |p| p[0].atan2(p[1]));
        self.register("atanh", 1, |p| p[0].atanh());
        self.register("cbrt", 1, |p| p[0].cbrt());
        self.register("ceil", 1, |p| p[0].ceil());
        self.register("clamp", 3, |p| p[0].max(p[1]).min(p[2]));
        self.register("cos", 1, |p| p[0].cos());
        self.register("cosh", 1, |p| p[0].cosh());
        self.register("dim", 2, |p| libm::fdimf(p[0], p[1]));
        self.register("erf", 1, |p| libm::erff(p[0]));
        self.register("erfc", 1, |p| libm::erfcf(p[0]));
        self.register("exp", 1, |p| p[0].exp());
        self.register("exp2", 1, |p| p[0].exp2());
        self.register("expm1", 1, |p| p[0].exp_m1());
        self.register("fact", 1, |p| factorial(p[0]));
        self.register("floor", 1, |p| p[0].floor());
        self.register("fma", 3, |p| p[0].mul_add(p[1], p[2]));
        self.register("fract", 1, |p| p[0].fract());
        self.register("gcd", 2, |p| {
                gcd(p[0].round() as i32, p[1].round() as i32) as f32
            });
        self.register("hypot", 2, |p| p[0].hypot(p[1]));
        self.register("lcm", 2, |p| {
                lcm(p[0].round() as i32, p[1].round() as i32) as f32
            });
        self.register("lerp", 3, |p| p[0] + p[2] * (p[1] - p[0]));
        self.register("lgamma", 1, |p| libm::lgammaf(p[0]));
        self.register("log", 1, |p| p[0].ln());
        self.register("log10", 1, |p| p[0].log10());
        self.register("log1p", 1, |p| p[0].ln_1p());
        self.register("log2", 1, |p| p[0].log2());
        self.register("midpoint", 2, |p| p[0] + (p[1] - p[0]) / 2.0);
        self.register("mod", 2, |p| p[0] % p[1]);
        self.register("nearbyint", 1, |p| p[0].round_ties_even());
        self.register("pow", 2, |p| p[0].powf(p[1]));
        self.register("remainder", 2, |p| libm::remainderf(p[0], p[1]));
        self.register("rint", 1, |p| p[0].round_ties_even());
        self.register("round", 1, |p| p[0].round());
        self.register("sign", 1, |p| {
                if p[0] > 0.0 {
                    1.0
                } else if p[0] < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            });
        self.register("sin", 1, |p| p[0].sin());
        self.register("sinh", 1, |p| p[0].sinh());
        self.register("sqrt", 1, |p| p[0].sqrt());
        self.register("tan", 1, |p| p[0].tan());
        self.register("tanh", 1, |p| p[0].tanh());
        self.register("tgamma", 1, |p| libm::tgammaf(p[0]));
        self.register("trunc", 1, |p| p[0].trunc());

        self.register_variadic("avg", |p| p.iter().sum::<f32>() / p.len() as f32);
        self.register_variadic("max", |p| p[1..].iter().copied().fold(p[0], f32::max));
        self.register_variadic("min", |p| p[1..].iter().copied().fold(p[0], f32::min));

        self.register("rand", 0, |_| RNG.with(|rng| rng.borrow_mut().random::<f32>()));
        self.register("srand", 1, |p| {
                RNG.with(|rng| *rng.borrow_mut() = StdRng::seed_from_u64(p[0] as u64));
                0.0
            });
        self.register("time", 0, |_| {
                SystemTime::now().duration_since(UNIX_EPOCH)
                                 .unwrap_or_default()
                                 .as_secs_f32()
            });
    }

    /// Registers a fixed-arity builtin, wrapping it with the arity check.
    fn register(&mut self, name: &str, arity: usize, function: impl Fn(&[f32]) -> f32 + 'static) {
        let owned_name = name.to_string();
        self.set_function(name,
                          move |code: &Code, location: CodeLocation, args: &[f32]| {
                              if args.len() != arity {
                                  return Err(CodeError::invalid_arity(&owned_name,
                                                                      args.len(),
                                                                      arity,
                                                                      code,
                                                                      location));
                              }
                              Ok(function(args))
                          });
    }

    /// Registers a builtin taking one or more arguments.
    fn register_variadic(&mut self, name: &str, function: impl Fn(&[f32]) -> f32 + 'static) {
        let owned_name = name.to_string();
        self.set_function(name,
                          move |code: &Code, location: CodeLocation, args: &[f32]| {
                              if args.is_empty() {
                                  return Err(CodeError::invalid_arity(&owned_name,
                                                                      0,
                                                                      1,
                                                                      code,
                                                                      location));
                              }
                              Ok(function(args))
                          });
    }
}
