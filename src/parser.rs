use crate::ast::{BlockStmt, Expr, Program, Stmt};
use crate::lexer::Lexer;
use crate::token::Token;

use std::fmt::Display;
use std::mem;

use thiserror::Error;

type Result<T> = std::result::Result<T, ParserError>;

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParserError {
    #[error("expected identifier, got {0}")]
    ExpectedIdent(Token),
    #[error("expected next token to be {expected}, got {got}")]
    ExpectedToken { expected: Token, got: Token },
    #[error("no prefix parse function for {0}")]
    NoPrefixParse(Token),
}

/// Every diagnostic collected while parsing one program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErrors(pub Vec<ParserError>);

impl Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "parser has {} errors:", self.0.len())?;
        for error in &self.0 {
            writeln!(f, "\t{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
enum Precedence {
    Lowest,
    Equals,      // ==, !=
    LessGreater, // >, <
    Sum,         // +, -
    Product,     // *, /
    Prefix,      // -x, !x
    Call,        // f(x)
    Index,       // xs[0]
}

impl Precedence {
    fn from_token(t: &Token) -> Precedence {
        match t {
            Token::Eq | Token::NotEq => Precedence::Equals,
            Token::Lt | Token::Gt => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Asterisk | Token::Slash => Precedence::Product,
            Token::LParen => Precedence::Call,
            Token::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParserError>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut p = Self {
            lexer,
            cur_token: Token::Eof,
            peek_token: Token::Eof,
            errors: vec![],
        };

        p.next_token();
        p.next_token();

        p
    }

    fn next_token(&mut self) {
        self.cur_token = mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn expect_peek(&mut self, expected: Token) -> Result<()> {
        if self.peek_token == expected {
            self.next_token();
            Ok(())
        } else {
            Err(ParserError::ExpectedToken {
                expected,
                got: self.peek_token.clone(),
            })
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token == Token::Semicolon {
            self.next_token();
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while self.cur_token != Token::Eof {
            match self.parse_statement() {
                Ok(stmt) => program.statements.push(stmt),
                Err(error) => self.errors.push(error),
            }
            self.next_token();
        }

        program
    }

    pub fn into_result(self, program: Program) -> std::result::Result<Program, ParseErrors> {
        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(ParseErrors(self.errors))
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        match &self.cur_token {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Stmt> {
        // cur_token: Let, peek_token: Ident
        let name = match &self.peek_token {
            Token::Ident(name) => name.clone(),
            t => return Err(ParserError::ExpectedIdent(t.clone())),
        };
        self.next_token();
        self.expect_peek(Token::Assign)?;

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Stmt::Let(name, value))
    }

    fn parse_return_statement(&mut self) -> Result<Stmt> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Stmt::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(Stmt::Expression(expr))
    }

    fn parse_expression(&mut self, prec: Precedence) -> Result<Expr> {
        let mut left = self.parse_prefix()?;

        while self.peek_token != Token::Semicolon && prec < Precedence::from_token(&self.peek_token) {
            let next = Precedence::from_token(&self.peek_token);
            self.next_token();
            left = match next {
                Precedence::Call => Expr::Call(Box::new(left), self.parse_expression_list(Token::RParen)?),
                Precedence::Index => self.parse_index_expression(left)?,
                _ => self.parse_infix_expression(left)?,
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        match &self.cur_token {
            Token::Ident(s) => Ok(Expr::Identifier(s.clone())),
            Token::Int(i) => Ok(Expr::Integer(*i)),
            Token::Str(s) => Ok(Expr::Str(s.clone())),
            Token::True => Ok(Expr::Boolean(true)),
            Token::False => Ok(Expr::Boolean(false)),
            Token::Bang | Token::Minus => {
                let operator = self.cur_token.clone();
                self.next_token();
                let operand = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::Prefix(operator, Box::new(operand)))
            }
            Token::LParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => Ok(Expr::Array(self.parse_expression_list(Token::RBracket)?)),
            Token::LBrace => self.parse_hash_literal(),
            Token::If => self.parse_if_expression(),
            Token::Function => self.parse_function_literal(),
            t => Err(ParserError::NoPrefixParse(t.clone())),
        }
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Result<Expr> {
        let operator = self.cur_token.clone();
        let prec = Precedence::from_token(&operator);
        self.next_token();
        let right = self.parse_expression(prec)?;

        Ok(Expr::Infix(Box::new(left), operator, Box::new(right)))
    }

    fn parse_index_expression(&mut self, left: Expr) -> Result<Expr> {
        // cur_token: LBracket
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RBracket)?;

        Ok(Expr::Index(Box::new(left), Box::new(index)))
    }

    fn parse_expression_list(&mut self, end: Token) -> Result<Vec<Expr>> {
        let mut items = vec![];

        if self.peek_token == end {
            self.next_token();
            return Ok(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_token == Token::Comma {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;

        Ok(items)
    }

    fn parse_hash_literal(&mut self) -> Result<Expr> {
        // cur_token: LBrace
        let mut pairs = vec![];

        while self.peek_token != Token::RBrace {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(Token::Colon)?;

            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek_token != Token::RBrace {
                self.expect_peek(Token::Comma)?;
            }
        }
        self.expect_peek(Token::RBrace)?;

        Ok(Expr::Hash(pairs))
    }

    fn parse_if_expression(&mut self) -> Result<Expr> {
        // cur_token: If
        self.expect_peek(Token::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RParen)?;

        self.expect_peek(Token::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token == Token::Else {
            self.next_token();
            self.expect_peek(Token::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expr::If(Box::new(condition), consequence, alternative))
    }

    fn parse_function_literal(&mut self) -> Result<Expr> {
        // cur_token: Function
        self.expect_peek(Token::LParen)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(Token::LBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expr::Function(parameters, body))
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<String>> {
        let mut parameters = vec![];

        if self.peek_token == Token::RParen {
            self.next_token();
            return Ok(parameters);
        }

        loop {
            self.next_token();
            match &self.cur_token {
                Token::Ident(name) => parameters.push(name.clone()),
                t => return Err(ParserError::ExpectedIdent(t.clone())),
            }
            if self.peek_token != Token::Comma {
                break;
            }
            self.next_token();
        }
        self.expect_peek(Token::RParen)?;

        Ok(parameters)
    }

    fn parse_block_statement(&mut self) -> Result<BlockStmt> {
        // cur_token: LBrace
        let mut block = BlockStmt::new();
        self.next_token();

        while self.cur_token != Token::RBrace {
            if self.cur_token == Token::Eof {
                return Err(ParserError::ExpectedToken {
                    expected: Token::RBrace,
                    got: Token::Eof,
                });
            }
            block.statements.push(self.parse_statement()?);
            self.next_token();
        }

        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Vec<Stmt> {
        match Program::parse(input) {
            Ok(program) => program.statements,
            Err(errors) => panic!("{}: {}", input, errors),
        }
    }

    fn ident(s: &str) -> Expr {
        Expr::Identifier(s.to_string())
    }

    fn infix(left: Expr, op: Token, right: Expr) -> Expr {
        Expr::Infix(Box::new(left), op, Box::new(right))
    }

    #[test]
    fn precedence_order() {
        assert!(Precedence::Lowest < Precedence::Equals);
        assert!(Precedence::Call < Precedence::Index);
    }

    #[test]
    fn let_and_return_statements() {
        let expected = vec![
            Stmt::Let("x".to_string(), Expr::Integer(5)),
            Stmt::Let("y".to_string(), Expr::Boolean(true)),
            Stmt::Let("z".to_string(), ident("y")),
            Stmt::Return(infix(Expr::Integer(2), Token::Plus, Expr::Integer(3))),
        ];

        assert_eq!(parse("let x = 5; let y = true; let z = y; return 2 + 3;"), expected);
    }

    #[test]
    fn literals() {
        let expected = vec![
            Stmt::Expression(Expr::Str("hello world".to_string())),
            Stmt::Expression(Expr::Array(vec![])),
            Stmt::Expression(Expr::Array(vec![
                Expr::Integer(3),
                infix(Expr::Integer(4), Token::Plus, Expr::Integer(5)),
            ])),
            Stmt::Expression(Expr::Hash(vec![])),
            Stmt::Expression(Expr::Hash(vec![
                (Expr::Str("one".to_string()), Expr::Integer(1)),
                (Expr::Boolean(false), ident("two")),
            ])),
        ];

        assert_eq!(
            parse("\"hello world\"; []; [3, 4 + 5]; {}; {\"one\": 1, false: two}"),
            expected
        );
    }

    #[test]
    fn operator_precedence() {
        let tests = vec![
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b - c", "((a + b) - c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
            ),
        ];

        for (input, expected) in tests {
            let program = Program::parse(input).unwrap();
            assert_eq!(program.to_string(), expected, "{}", input);
        }
    }

    #[test]
    fn if_else_expression() {
        let expected = vec![Stmt::Expression(Expr::If(
            Box::new(infix(ident("x"), Token::Lt, ident("y"))),
            BlockStmt {
                statements: vec![Stmt::Expression(ident("x"))],
            },
            Some(BlockStmt {
                statements: vec![Stmt::Expression(ident("y"))],
            }),
        ))];

        assert_eq!(parse("if (x < y) { x } else { y }"), expected);
    }

    #[test]
    fn function_literals_and_calls() {
        let expected = vec![
            Stmt::Expression(Expr::Function(vec![], BlockStmt::new())),
            Stmt::Expression(Expr::Function(
                vec!["x".to_string(), "y".to_string()],
                BlockStmt {
                    statements: vec![Stmt::Expression(infix(ident("x"), Token::Plus, ident("y")))],
                },
            )),
            Stmt::Expression(Expr::Call(
                Box::new(ident("add")),
                vec![
                    Expr::Integer(1),
                    infix(Expr::Integer(2), Token::Asterisk, Expr::Integer(3)),
                ],
            )),
        ];

        assert_eq!(parse("fn() {}; fn(x, y) { x + y; }; add(1, 2 * 3);"), expected);
    }

    #[test]
    fn errors_are_collected() {
        let errors = Program::parse("let = 5; let x 5; fn(1) {}").unwrap_err();

        assert_eq!(errors.0[0], ParserError::ExpectedIdent(Token::Assign));
        assert!(errors.0.contains(&ParserError::ExpectedToken {
            expected: Token::Assign,
            got: Token::Int(5),
        }));
        assert!(errors.0.contains(&ParserError::ExpectedIdent(Token::Int(1))));
    }

    #[test]
    fn illegal_token_is_reported() {
        let errors = Program::parse("1 + @").unwrap_err();

        assert_eq!(errors.0, vec![ParserError::NoPrefixParse(Token::Illegal("@".to_string()))]);
        assert!(errors.to_string().contains("no prefix parse function for @"));
    }

    #[test]
    fn unterminated_blocks_are_reported() {
        let missing_brace = ParserError::ExpectedToken {
            expected: Token::RBrace,
            got: Token::Eof,
        };

        for input in ["fn() { 1", "if (x) { 1", "if (x) { 1 } else { 2", "fn(x) {"] {
            let errors = Program::parse(input).unwrap_err();
            assert_eq!(errors.0, vec![missing_brace.clone()], "{}", input);
        }
    }
}
