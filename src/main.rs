use clap::Parser;
use es1::{EngineError, Interpreter, parse};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "es1", version, about = "A first-edition JavaScript interpreter in Rust")]
struct Cli {
    /// Script file to execute
    file: Option<PathBuf>,

    /// Evaluate inline source
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,
}

fn run_source(file: &str, source: &str, print_result: bool) -> Result<(), EngineError> {
    let program = parse(file, source)?;
    let mut interp = Interpreter::new(&program, None);
    let result = interp.run(&program)?;
    if print_result {
        println!("{}", interp.format_value(&result));
    }
    Ok(())
}

fn execute_code(file: &str, source: &str, print_result: bool) -> ExitCode {
    match run_source(file, source, print_result) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run_file(path: &Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            return ExitCode::from(1);
        }
    };
    execute_code(&path.display().to_string(), &source, false)
}

fn run_repl() -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("es1 v{}", env!("CARGO_PKG_VERSION"));
    println!("Type statements. Press Ctrl-D to exit.");

    let empty = es1::ast::Program { body: Vec::new() };
    let mut interp = Interpreter::new(&empty, None);

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match parse("repl", trimmed) {
                    Ok(program) => {
                        interp.hoist(&program);
                        match interp.run(&program) {
                            Ok(result) => println!("{}", interp.format_value(&result)),
                            Err(e) => eprintln!("{e}"),
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(e) => {
                eprintln!("Read error: {e}");
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(source) = &cli.eval {
        return execute_code("eval", source, true);
    }
    match &cli.file {
        Some(path) => run_file(path),
        None => run_repl(),
    }
}
