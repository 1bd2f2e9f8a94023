use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{bail, Context};
use clap::Parser;
use monkey::{
    ast::Program,
    evaluator::{EvalConfig, Evaluator},
    object::{environment::Environment, Object},
};

const PROMPT: &str = ">> ";

#[derive(Parser)]
#[command(name = "monkey", about = "The Monkey programming language")]
struct Cli {
    /// Script to evaluate; starts an interactive session when omitted.
    file: Option<PathBuf>,

    /// Nested function calls allowed before evaluation fails.
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = EvalConfig::default();
    if let Some(max_depth) = cli.max_depth {
        config.max_call_depth = max_depth;
    }
    let mut evaluator = Evaluator::with_config(config);

    match cli.file {
        Some(path) => run_file(&path, &mut evaluator),
        None => repl(&mut evaluator),
    }
}

// logging stays off unless RUST_LOG asks for it
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &Path, evaluator: &mut Evaluator) -> anyhow::Result<()> {
    let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let program = match Program::parse(&source) {
        Ok(program) => program,
        Err(errors) => bail!("{}", errors),
    };

    match evaluator.eval(&program, Environment::new()) {
        Object::Error(message) => bail!("{}", message),
        Object::Null => {}
        result => println!("{}", result),
    }
    Ok(())
}

fn repl(evaluator: &mut Evaluator) -> anyhow::Result<()> {
    println!("This is the Monkey programming language!");
    println!("Feel free to type in commands");

    let env = Environment::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            println!();
            return Ok(());
        }

        let program = match Program::parse(&input) {
            Ok(program) => program,
            Err(errors) => {
                eprint!("{}", errors);
                continue;
            }
        };

        match evaluator.eval(&program, Rc::clone(&env)) {
            Object::Null => continue,
            result => println!("{}", result),
        }
    }
}
