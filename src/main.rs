use anyhow::{Context, Result};
use argh::FromArgs;
use cminus::options::{Options, DEFAULT_MAX_NESTING_DEPTH, DEFAULT_MAX_STACK_DEPTH};
use cminus::semantic::SymbolTable;
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs, Debug)]
/// Front end for the C-minus language: parses and checks a source file.
struct Args {
    /// print the syntax tree after parsing
    #[argh(switch)]
    trace_parse: bool,

    /// print the symbol table after analysis
    #[argh(switch)]
    trace_analyze: bool,

    /// list expected tokens in syntax error messages
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// maximum parser stack depth
    #[argh(option, default = "DEFAULT_MAX_STACK_DEPTH")]
    max_depth: usize,

    /// maximum syntax tree nesting
    #[argh(option, default = "DEFAULT_MAX_NESTING_DEPTH")]
    max_nesting: usize,

    /// source file
    #[argh(positional)]
    source_file: PathBuf,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            trace_parse: self.trace_parse,
            trace_analyze: self.trace_analyze,
            verbose_errors: self.verbose,
            max_stack_depth: self.max_depth,
            max_nesting_depth: self.max_nesting,
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    let options = args.options();

    let file = File::open(&args.source_file)
        .with_context(|| format!("Could not open {}.", args.source_file.display()))?;
    let mut input = String::new();
    BufReader::new(file)
        .read_to_string(&mut input)
        .with_context(|| "Could not read file.".to_string())?;

    let compilation = cminus::compile(&input, &options)?;

    if options.trace_parse {
        if let Some(program) = &compilation.program {
            println!("Syntax tree:\n{}", program);
        }
    }
    for diagnostic in &compilation.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if options.trace_analyze && compilation.program.is_some() {
        println!("Symbol table:\n{}", compilation.table.dump());
    }

    if compilation.failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
