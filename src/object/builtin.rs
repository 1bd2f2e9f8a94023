use crate::evaluator::{EvalError, Result};
use crate::object::{Builtin, Object, ObjectType, NULL};

const BUILTINS: [Builtin; 5] = [
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
];

pub fn get(ident: &str) -> Option<Object> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == ident)
        .map(|builtin| Object::Builtin(*builtin))
}

fn assert_n_args(args: &[Object], want: usize) -> Result<()> {
    if args.len() != want {
        return Err(EvalError::WrongNumberOfArguments { want, got: args.len() });
    }
    Ok(())
}

fn array_arg<'a>(name: &'static str, arg: &'a Object) -> Result<&'a [Object]> {
    match arg {
        Object::Array(items) => Ok(items),
        o => Err(EvalError::ArgumentMustBe {
            name,
            want: ObjectType::Array,
            got: o.object_type(),
        }),
    }
}

fn len(args: Vec<Object>) -> Result<Object> {
    assert_n_args(&args, 1)?;

    let n = match &args[0] {
        Object::Str(s) => s.len(),
        Object::Array(items) => items.len(),
        o => {
            return Err(EvalError::UnsupportedArgument {
                name: "len",
                got: o.object_type(),
            })
        }
    };
    Ok(Object::Integer(n as i64))
}

fn first(args: Vec<Object>) -> Result<Object> {
    assert_n_args(&args, 1)?;
    let items = array_arg("first", &args[0])?;
    Ok(items.first().cloned().unwrap_or(NULL))
}

fn last(args: Vec<Object>) -> Result<Object> {
    assert_n_args(&args, 1)?;
    let items = array_arg("last", &args[0])?;
    Ok(items.last().cloned().unwrap_or(NULL))
}

fn rest(args: Vec<Object>) -> Result<Object> {
    assert_n_args(&args, 1)?;
    let items = array_arg("rest", &args[0])?;
    Ok(match items.split_first() {
        Some((_, rest)) => Object::Array(rest.to_vec()),
        None => NULL,
    })
}

// arrays are values, so push returns a new one
fn push(args: Vec<Object>) -> Result<Object> {
    assert_n_args(&args, 2)?;
    let items = array_arg("push", &args[0])?;
    let mut new_items = items.to_vec();
    new_items.push(args[1].clone());
    Ok(Object::Array(new_items))
}
