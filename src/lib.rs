pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod types;

pub use error::{EngineError, ErrorKind, EvalError};
pub use interpreter::{Completion, Interpreter, StatementObserver};
pub use parser::{ParseError, parse};
pub use types::{JsString, JsValue};

/// Parse and execute a script, returning the value of its last statement.
pub fn evaluate_script(source: &str) -> Result<JsValue, EngineError> {
    let program = parse("script", source)?;
    let mut interp = Interpreter::new(&program, None);
    Ok(interp.run(&program)?)
}
