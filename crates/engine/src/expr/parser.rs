// Expression parser - converts typed calculator input into an AST
// Supports: numbers, constants (PI, E), functions (sin, sqrt, ...),
// operators (+, -, *, /, %, ^), parentheses, unary minus/plus.

/// Expression AST. Function names are kept as strings and resolved at
/// evaluation time, so arity and name errors surface uniformly there.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Function {
        name: String,
        args: Vec<Expr>,
    },
    BinaryOp {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    /// Remainder (the `%` key), same precedence as * and /
    Mod,
    /// Exponentiation (^), right-associative
    Pow,
}

/// Rewrite calculator-only glyphs and strip everything outside the input
/// whitelist `[0-9 + - * / ( ) . ^ % a-z A-Z whitespace]`. Stripping is
/// silent: the keypad can emit characters (e.g. `!`) the grammar does not
/// know, and they simply vanish before tokenization.
pub fn normalize(input: &str) -> String {
    let rewritten = input.replace('π', "PI").replace("√(", "sqrt(");
    rewritten
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.' | '^' | '%')
        })
        .collect()
}

/// Parse a normalized expression string into an AST.
pub fn parse(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("Empty expression".to_string());
    }
    let (expr, pos) = parse_add_sub(&tokens, 0)?;
    if pos != tokens.len() {
        return Err(format!("Unexpected token at position {}", pos));
    }
    Ok(expr)
}

#[derive(Debug, Clone)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => { chars.next(); }
            '+' => { tokens.push(Token::Plus); chars.next(); }
            '-' => { tokens.push(Token::Minus); chars.next(); }
            '*' => { tokens.push(Token::Star); chars.next(); }
            '/' => { tokens.push(Token::Slash); chars.next(); }
            '%' => { tokens.push(Token::Percent); chars.next(); }
            '^' => { tokens.push(Token::Caret); chars.next(); }
            '(' => { tokens.push(Token::LParen); chars.next(); }
            ')' => { tokens.push(Token::RParen); chars.next(); }
            'A'..='Z' | 'a'..='z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphabetic() {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num_str.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| format!("Invalid number: {}", num_str))?;
                tokens.push(Token::Number(num));
            }
            _ => return Err(format!("Unexpected character: {}", c)),
        }
    }

    Ok(tokens)
}

fn parse_add_sub(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Plus => Op::Add,
            Token::Minus => Op::Sub,
            _ => break,
        };
        let (right, new_pos) = parse_mul_div(tokens, pos + 1)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    let (mut left, mut pos) = parse_unary(tokens, pos)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Star => Op::Mul,
            Token::Slash => Op::Div,
            Token::Percent => Op::Mod,
            _ => break,
        };
        let (right, new_pos) = parse_unary(tokens, pos + 1)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

// Unary sign, binding looser than ^ so -2^2 is -(2^2)
fn parse_unary(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    if pos < tokens.len() {
        match &tokens[pos] {
            Token::Plus => return parse_unary(tokens, pos + 1),
            Token::Minus => {
                let (expr, pos) = parse_unary(tokens, pos + 1)?;
                return Ok((
                    Expr::BinaryOp {
                        op: Op::Sub,
                        left: Box::new(Expr::Number(0.0)),
                        right: Box::new(expr),
                    },
                    pos,
                ));
            }
            _ => {}
        }
    }
    parse_power(tokens, pos)
}

// Exponentiation (^) - right-associative, higher precedence than * / %
fn parse_power(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    let (base, pos) = parse_primary(tokens, pos)?;

    if pos < tokens.len() {
        if let Token::Caret = &tokens[pos] {
            // Right-associative: recurse for the exponent, allowing 2^-3
            let (exponent, new_pos) = parse_unary(tokens, pos + 1)?;
            return Ok((
                Expr::BinaryOp {
                    op: Op::Pow,
                    left: Box::new(base),
                    right: Box::new(exponent),
                },
                new_pos,
            ));
        }
    }

    Ok((base, pos))
}

fn parse_primary(tokens: &[Token], pos: usize) -> Result<(Expr, usize), String> {
    if pos >= tokens.len() {
        return Err("Unexpected end of expression".to_string());
    }

    match &tokens[pos] {
        Token::Number(n) => Ok((Expr::Number(*n), pos + 1)),
        Token::Ident(name) => {
            // Function call
            if pos + 1 < tokens.len() {
                if let Token::LParen = &tokens[pos + 1] {
                    let (args, new_pos) = parse_call_args(tokens, pos + 2)?;
                    return Ok((
                        Expr::Function {
                            name: name.clone(),
                            args,
                        },
                        new_pos,
                    ));
                }
            }
            // Bare identifier: must be a known constant
            match name.as_str() {
                "pi" => Ok((Expr::Constant(Constant::Pi), pos + 1)),
                "e" => Ok((Expr::Constant(Constant::E), pos + 1)),
                _ => Err(format!("Unknown identifier: {}", name)),
            }
        }
        Token::LParen => {
            let (expr, pos) = parse_add_sub(tokens, pos + 1)?;
            if pos >= tokens.len() {
                return Err("Missing closing parenthesis".to_string());
            }
            match &tokens[pos] {
                Token::RParen => Ok((expr, pos + 1)),
                _ => Err("Expected closing parenthesis".to_string()),
            }
        }
        _ => Err(format!("Unexpected token at position {}", pos)),
    }
}

fn parse_call_args(tokens: &[Token], pos: usize) -> Result<(Vec<Expr>, usize), String> {
    let mut args = Vec::new();
    let mut pos = pos;

    // Empty call, func()
    if pos < tokens.len() {
        if let Token::RParen = &tokens[pos] {
            return Ok((args, pos + 1));
        }
    }

    loop {
        let (arg, new_pos) = parse_add_sub(tokens, pos)?;
        args.push(arg);
        pos = new_pos;

        if pos >= tokens.len() {
            return Err("Missing closing parenthesis in function call".to_string());
        }

        match &tokens[pos] {
            Token::RParen => return Ok((args, pos + 1)),
            _ => return Err("Expected closing parenthesis".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
        assert_eq!(parse("3.25").unwrap(), Expr::Number(3.25));
    }

    #[test]
    fn test_parse_precedence() {
        // 1+2*3 parses as 1+(2*3)
        let expr = parse("1+2*3").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Add, left, right } => {
                assert_eq!(*left, Expr::Number(1.0));
                assert!(matches!(*right, Expr::BinaryOp { op: Op::Mul, .. }));
            }
            _ => panic!("Expected Add at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_power_right_associative() {
        // 2^3^2 parses as 2^(3^2)
        let expr = parse("2^3^2").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Pow, left, right } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(*right, Expr::BinaryOp { op: Op::Pow, .. }));
            }
            _ => panic!("Expected Pow at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_power_binds_tighter_than_mul() {
        // 2*3^2 parses as 2*(3^2)
        let expr = parse("2*3^2").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Mul, right, .. } => {
                assert!(matches!(*right, Expr::BinaryOp { op: Op::Pow, .. }));
            }
            _ => panic!("Expected Mul at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_mod_same_level_as_div() {
        // 10%3*2 parses left-to-right: (10%3)*2
        let expr = parse("10%3*2").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Mul, left, .. } => {
                assert!(matches!(*left, Expr::BinaryOp { op: Op::Mod, .. }));
            }
            _ => panic!("Expected Mul at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_unary_minus_desugars_to_sub() {
        let expr = parse("-5").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Sub, left, right } => {
                assert_eq!(*left, Expr::Number(0.0));
                assert_eq!(*right, Expr::Number(5.0));
            }
            _ => panic!("Expected Sub (unary minus), got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_unary_plus_is_noop() {
        assert_eq!(parse("+7").unwrap(), Expr::Number(7.0));
    }

    #[test]
    fn test_parse_unary_minus_binds_looser_than_power() {
        // -2^2 parses as -(2^2)
        let expr = parse("-2^2").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Sub, left, right } => {
                assert_eq!(*left, Expr::Number(0.0));
                assert!(matches!(*right, Expr::BinaryOp { op: Op::Pow, .. }));
            }
            _ => panic!("Expected Sub (unary minus) at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_negative_exponent() {
        // 2^-3 parses as 2^(-(3))
        let expr = parse("2^-3").unwrap();
        match expr {
            Expr::BinaryOp { op: Op::Pow, left, right } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(*right, Expr::BinaryOp { op: Op::Sub, .. }));
            }
            _ => panic!("Expected Pow at top, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_function_call() {
        let expr = parse("sin(90)").unwrap();
        match expr {
            Expr::Function { name, args } => {
                assert_eq!(name, "sin");
                assert_eq!(args, vec![Expr::Number(90.0)]);
            }
            _ => panic!("Expected Function, got {:?}", expr),
        }
    }

    #[test]
    fn test_parse_function_names_case_insensitive() {
        let expr = parse("SIN(90)").unwrap();
        assert!(matches!(expr, Expr::Function { ref name, .. } if name == "sin"));
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(parse("PI").unwrap(), Expr::Constant(Constant::Pi));
        assert_eq!(parse("pi").unwrap(), Expr::Constant(Constant::Pi));
        assert_eq!(parse("E").unwrap(), Expr::Constant(Constant::E));
    }

    #[test]
    fn test_parse_nested_parens() {
        assert!(parse("((1+2)*(3+4))").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("2+*3").is_err());
        assert!(parse("(1+2").is_err());
        assert!(parse("1+2)").is_err());
        assert!(parse("foo").is_err());
        assert!(parse("1 2").is_err());
    }

    #[test]
    fn test_normalize_rewrites_glyphs() {
        assert_eq!(normalize("√(9)+π"), "sqrt(9)+PI");
    }

    #[test]
    fn test_normalize_strips_outside_whitelist() {
        assert_eq!(normalize("5!"), "5");
        assert_eq!(normalize("2+$2#"), "2+2");
        assert_eq!(normalize("sin(90)"), "sin(90)");
    }
}
