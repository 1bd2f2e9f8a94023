pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
mod stack;
pub mod token;

use object::environment::Environment;

use wasm_bindgen::prelude::*;

/// Evaluates `input` in a fresh environment, returning the rendered result or
/// the parser diagnostics.
#[wasm_bindgen]
pub fn monkey_eval(input: &str) -> String {
    match ast::Program::parse(input) {
        Ok(program) => evaluator::eval(&program, Environment::new()).to_string(),
        Err(errors) => errors.to_string(),
    }
}
