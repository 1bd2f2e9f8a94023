use std::fmt::Display;

use crate::lexer::Lexer;
use crate::parser::{ParseErrors, Parser};
use crate::token::Token;

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Lexes and parses `input`, failing with every diagnostic the parser
    /// collected.
    pub fn parse(input: &str) -> Result<Self, ParseErrors> {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        parser.into_result(program)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Stmt {
    Let(String, Expr),
    Return(Expr),
    Expression(Expr),
}

impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Stmt::Let(name, value) => write!(f, "let {} = {}", name, value),
            Stmt::Return(value) => write!(f, "return {}", value),
            Stmt::Expression(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expr {
    Identifier(String),
    Integer(i64),
    Str(String),
    Boolean(bool),
    Array(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
    Index(Box<Expr>, Box<Expr>),                 // receiver, index
    Prefix(Token, Box<Expr>),                    // operator, operand
    Infix(Box<Expr>, Token, Box<Expr>),          // left, operator, right
    If(Box<Expr>, BlockStmt, Option<BlockStmt>), // condition, consequence, alternative
    Function(Vec<String>, BlockStmt),            // parameters, body
    Call(Box<Expr>, Vec<Expr>),                  // callee, arguments
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Expr::Identifier(s) => write!(f, "{}", s),
            Expr::Integer(i) => write!(f, "{}", i),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Boolean(b) => write!(f, "{}", b),
            Expr::Array(items) => write!(f, "[{}]", csv_str(items)),
            Expr::Hash(pairs) => {
                let pairs: Vec<String> = pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", csv_str(&pairs))
            }
            Expr::Index(left, idx) => write!(f, "({}[{}])", left, idx),
            Expr::Prefix(op, operand) => write!(f, "({}{})", op, operand),
            Expr::Infix(left, op, right) => write!(f, "({} {} {})", left, op, right),
            Expr::If(condition, consequence, alternative) => {
                write!(f, "if ({}) {}", condition, consequence)?;
                match alternative {
                    Some(alt) => write!(f, " else {}", alt),
                    None => Ok(()),
                }
            }
            Expr::Function(parameters, body) => write!(f, "fn({}) {}", csv_str(parameters), body),
            Expr::Call(callee, args) => write!(f, "{}({})", callee, csv_str(args)),
        }
    }
}

pub fn csv_str<T: Display>(arr: &[T]) -> String {
    arr.iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

impl BlockStmt {
    pub fn new() -> Self {
        Self::default()
    }
}

// rendered so that it parses back to the same block
impl Display for BlockStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{}");
        }
        let statements: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{{ {} }}", statements.join("; "))
    }
}
