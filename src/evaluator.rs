use crate::ast::{BlockStmt, Expr, Program, Stmt};
use crate::object::builtin;
use crate::object::environment::{Environment, MutEnv};
use crate::object::{Function, HashPair, HashPairs, Object, ObjectType, FALSE, NULL, TRUE};
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;
use std::ops::ControlFlow;
use std::rc::Rc;

use thiserror::Error;
use tracing::{trace, warn};

pub type Result<T> = std::result::Result<T, EvalError>;

// A Return produced by an operand ends the enclosing expression as is.
macro_rules! operand {
    ($value:expr) => {
        match $value? {
            ret @ Object::Return(_) => return Ok(ret),
            value => value,
        }
    };
}

/// Runtime failures. `eval` hands these back to the caller as
/// `Object::Error` carrying the message below.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator { operator: Token, operand: ObjectType },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: Token,
        right: ObjectType,
    },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: Token,
        right: ObjectType,
    },
    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(ObjectType),
    #[error("index operator is not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongNumberOfArguments { want: usize, got: usize },
    #[error("argument to `{name}` not supported, got {got}")]
    UnsupportedArgument { name: &'static str, got: ObjectType },
    #[error("argument to `{name}` must be {want}, got {got}")]
    ArgumentMustBe {
        name: &'static str,
        want: ObjectType,
        got: ObjectType,
    },
    #[error("maximum call depth exceeded: {0}")]
    CallDepthExceeded(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nested function calls allowed before evaluation fails.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        // without stacker the WASM stack is the real limit
        let max_call_depth = if cfg!(target_arch = "wasm32") { 200 } else { 10_000 };
        EvalConfig { max_call_depth }
    }
}

/// Evaluates `program` in `env` with the default configuration.
pub fn eval(program: &Program, env: MutEnv) -> Object {
    Evaluator::default().eval(program, env)
}

#[derive(Debug, Default)]
pub struct Evaluator {
    config: EvalConfig,
    depth: usize,
}

impl Evaluator {
    pub fn with_config(config: EvalConfig) -> Self {
        Evaluator { config, depth: 0 }
    }

    /// Runs a whole program. A top-level `return` yields its value and a
    /// runtime error comes back as `Object::Error`.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn eval(&mut self, program: &Program, env: MutEnv) -> Object {
        match self.eval_program(program, &env) {
            Ok(object) => object,
            Err(e) => Object::Error(e.to_string()),
        }
    }

    fn eval_program(&mut self, program: &Program, env: &MutEnv) -> Result<Object> {
        let mut result = NULL;

        for statement in &program.statements {
            result = self.eval_statement(statement, env)?;
            if let Object::Return(value) = result {
                return Ok(*value);
            }
        }

        Ok(result)
    }

    // a Return is passed up unwrapped so the enclosing call sees it
    fn eval_block_statement(&mut self, block: &BlockStmt, env: &MutEnv) -> Result<Object> {
        let mut result = NULL;

        for statement in &block.statements {
            result = self.eval_statement(statement, env)?;
            if let Object::Return(_) = result {
                break;
            }
        }

        Ok(result)
    }

    fn eval_statement(&mut self, statement: &Stmt, env: &MutEnv) -> Result<Object> {
        match statement {
            Stmt::Expression(expression) => self.eval_expression(expression, env),
            Stmt::Return(expression) => {
                let value = operand!(self.eval_expression(expression, env));
                Ok(Object::Return(Box::new(value)))
            }
            Stmt::Let(ident, expression) => {
                let value = operand!(self.eval_expression(expression, env));
                env.borrow_mut().set(ident, value);
                Ok(NULL)
            }
        }
    }

    fn eval_expression(&mut self, expression: &Expr, env: &MutEnv) -> Result<Object> {
        ensure_sufficient_stack(|| self.eval_node(expression, env))
    }

    fn eval_node(&mut self, expression: &Expr, env: &MutEnv) -> Result<Object> {
        match expression {
            Expr::Integer(i) => Ok(Object::Integer(*i)),
            Expr::Boolean(b) => Ok(Object::from_bool(*b)),
            Expr::Str(s) => Ok(Object::Str(s.clone())),
            Expr::Identifier(ident) => eval_identifier(ident, env),
            Expr::Array(items) => match self.eval_expressions(items, env)? {
                ControlFlow::Continue(items) => Ok(Object::Array(items)),
                ControlFlow::Break(ret) => Ok(ret),
            },
            Expr::Hash(pairs) => self.eval_hash_literal(pairs, env),
            Expr::Index(left, index) => {
                let left = operand!(self.eval_expression(left, env));
                let index = operand!(self.eval_expression(index, env));
                eval_index_expression(left, index)
            }
            Expr::Prefix(operator, right) => {
                let right = operand!(self.eval_expression(right, env));
                eval_prefix_expression(operator, right)
            }
            Expr::Infix(left, operator, right) => {
                let left = operand!(self.eval_expression(left, env));
                let right = operand!(self.eval_expression(right, env));
                eval_infix_expression(operator, left, right)
            }
            Expr::If(condition, consequence, alternative) => {
                let condition = operand!(self.eval_expression(condition, env));
                if condition.is_truthy() {
                    self.eval_block_statement(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block_statement(alternative, env)
                } else {
                    Ok(NULL)
                }
            }
            Expr::Function(parameters, body) => Ok(Object::Function(Function {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            })),
            Expr::Call(callee, arguments) => {
                let function = operand!(self.eval_expression(callee, env));
                match self.eval_expressions(arguments, env)? {
                    ControlFlow::Continue(arguments) => self.apply_function(function, arguments),
                    ControlFlow::Break(ret) => Ok(ret),
                }
            }
        }
    }

    // left to right, stopping at the first error or Return
    fn eval_expressions(&mut self, exprs: &[Expr], env: &MutEnv) -> Result<ControlFlow<Object, Vec<Object>>> {
        let mut results = Vec::with_capacity(exprs.len());
        for expr in exprs {
            match self.eval_expression(expr, env)? {
                ret @ Object::Return(_) => return Ok(ControlFlow::Break(ret)),
                value => results.push(value),
            }
        }
        Ok(ControlFlow::Continue(results))
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expr, Expr)], env: &MutEnv) -> Result<Object> {
        let mut map = HashPairs::default();

        for (key, value) in pairs {
            let key = operand!(self.eval_expression(key, env));
            let hash_key = key
                .hash_key()
                .ok_or_else(|| EvalError::UnusableAsHashKey(key.object_type()))?;
            let value = operand!(self.eval_expression(value, env));
            map.insert(hash_key, HashPair { key, value });
        }

        Ok(Object::Hash(map))
    }

    fn apply_function(&mut self, function: Object, args: Vec<Object>) -> Result<Object> {
        match function {
            Object::Function(function) => {
                if self.depth >= self.config.max_call_depth {
                    warn!(max = self.config.max_call_depth, "call depth limit reached");
                    return Err(EvalError::CallDepthExceeded(self.config.max_call_depth));
                }
                let extended_env = extend_function_environment(&function, args)?;
                trace!(parameters = ?function.parameters, depth = self.depth, "applying function");

                self.depth += 1;
                let result = self.eval_block_statement(&function.body, &extended_env);
                self.depth -= 1;

                match result? {
                    Object::Return(value) => Ok(*value),
                    value => Ok(value),
                }
            }
            Object::Builtin(builtin) => {
                trace!(name = builtin.name, args = args.len(), "applying builtin");
                (builtin.func)(args)
            }
            o => Err(EvalError::NotAFunction(o.object_type())),
        }
    }
}

fn extend_function_environment(function: &Function, args: Vec<Object>) -> Result<MutEnv> {
    if function.parameters.len() != args.len() {
        return Err(EvalError::WrongNumberOfArguments {
            want: function.parameters.len(),
            got: args.len(),
        });
    }

    let extended_env = Environment::new_enclosed(Rc::clone(&function.env));
    for (param, arg) in function.parameters.iter().zip(args) {
        extended_env.borrow_mut().set(param, arg);
    }
    Ok(extended_env)
}

fn eval_identifier(ident: &str, env: &MutEnv) -> Result<Object> {
    let bound = env.borrow().get(ident);
    bound
        .or_else(|| builtin::get(ident))
        .ok_or_else(|| EvalError::IdentifierNotFound(ident.to_string()))
}

fn eval_prefix_expression(operator: &Token, operand: Object) -> Result<Object> {
    match (operator, &operand) {
        (Token::Bang, _) => Ok(eval_bang_operator(&operand)),
        (Token::Minus, Object::Integer(i)) => Ok(Object::Integer(i.wrapping_neg())),
        _ => Err(EvalError::UnknownPrefixOperator {
            operator: operator.clone(),
            operand: operand.object_type(),
        }),
    }
}

fn eval_bang_operator(operand: &Object) -> Object {
    match operand {
        Object::Boolean(true) => FALSE,
        Object::Boolean(false) | Object::Null => TRUE,
        _ => FALSE,
    }
}

fn eval_infix_expression(operator: &Token, left: Object, right: Object) -> Result<Object> {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::Boolean(l), Object::Boolean(r)) => eval_boolean_infix_expression(operator, *l, *r),
        (Object::Str(l), Object::Str(r)) if *operator == Token::Plus => Ok(Object::Str(format!("{}{}", l, r))),
        _ if left.object_type() != right.object_type() => Err(EvalError::TypeMismatch {
            left: left.object_type(),
            operator: operator.clone(),
            right: right.object_type(),
        }),
        _ => Err(unknown_infix_operator(left.object_type(), operator)),
    }
}

fn unknown_infix_operator(operand: ObjectType, operator: &Token) -> EvalError {
    EvalError::UnknownInfixOperator {
        left: operand,
        operator: operator.clone(),
        right: operand,
    }
}

// arithmetic wraps on overflow
fn eval_integer_infix_expression(operator: &Token, l: i64, r: i64) -> Result<Object> {
    match operator {
        Token::Plus => Ok(Object::Integer(l.wrapping_add(r))),
        Token::Minus => Ok(Object::Integer(l.wrapping_sub(r))),
        Token::Asterisk => Ok(Object::Integer(l.wrapping_mul(r))),
        Token::Slash if r == 0 => Err(EvalError::DivisionByZero),
        Token::Slash => Ok(Object::Integer(l.wrapping_div(r))),
        Token::Lt => Ok(Object::from_bool(l < r)),
        Token::Gt => Ok(Object::from_bool(l > r)),
        Token::Eq => Ok(Object::from_bool(l == r)),
        Token::NotEq => Ok(Object::from_bool(l != r)),
        _ => Err(unknown_infix_operator(ObjectType::Integer, operator)),
    }
}

fn eval_boolean_infix_expression(operator: &Token, l: bool, r: bool) -> Result<Object> {
    match operator {
        Token::Eq => Ok(Object::from_bool(l == r)),
        Token::NotEq => Ok(Object::from_bool(l != r)),
        _ => Err(unknown_infix_operator(ObjectType::Boolean, operator)),
    }
}

fn eval_index_expression(left: Object, index: Object) -> Result<Object> {
    match (&left, &index) {
        (Object::Array(items), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(NULL)),
        (Object::Hash(pairs), _) => {
            let key = index
                .hash_key()
                .ok_or_else(|| EvalError::UnusableAsHashKey(index.object_type()))?;
            Ok(pairs.get(&key).map(|pair| pair.value.clone()).unwrap_or(NULL))
        }
        _ => Err(EvalError::IndexNotSupported(left.object_type())),
    }
}
