//! Execute handler: wires acquisition, session, transport and normalization.

use std::fs;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::{
    cli::Cli,
    config::Config,
    diagnostics::{self, DiagnosticsSink, MemorySink},
    executor::Executor,
    response::{ExecuteAnonymousResult, UNKNOWN_POSITION},
    session::Session,
    source::{self, Acquisition, Selection},
    transport::HttpTransport,
};

/// Run one anonymous execution end to end. Returns whether the block
/// compiled and ran cleanly; a cancelled acquisition is reported as success
/// with no output, since it is a normal negative outcome.
pub async fn run(args: Cli) -> Result<bool> {
    let cfg = Config::load();

    // The active buffer: a named file, or piped stdin
    let buffer = match &args.file {
        Some(path) => Some(
            fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?,
        ),
        None if !io::stdin().is_terminal() => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Some(buf)
        }
        None => None,
    };

    let selection = match (&buffer, &args.lines) {
        (Some(text), Some(range)) => {
            let (start, end) = parse_lines(range)?;
            match Selection::lines(text, start, end) {
                Some(sel) => Some(sel),
                None => bail!("line range {range} is outside the input"),
            }
        }
        _ => None,
    };

    let payload = match source::acquire(buffer.as_deref(), selection) {
        Acquisition::Cancelled => return Ok(true),
        Acquisition::Continue(payload) => payload,
    };

    let session = Session::from_config(&cfg)?;
    let transport = HttpTransport::from_config(&cfg)?;
    let executor =
        Executor::new(session, transport).with_debug_level(cfg.get("DEBUG_LEVEL"));

    let result = executor.execute(payload.text(), !args.no_debug_log).await?;

    let mut sink = MemorySink::default();
    sink.replace(payload.scratch_path(), diagnostics::from_result(&result));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_human(&result, args.quiet);
    }
    Ok(result.success)
}

fn print_human(result: &ExecuteAnonymousResult, quiet: bool) {
    if !result.compiled {
        println!(
            "{} {}",
            "Compile error".red(),
            format_position(result.line, result.column)
        );
        println!("{}", result.compile_problem);
        return;
    }

    if !result.success {
        println!(
            "{} {}",
            "Exception".red(),
            format_position(result.line, result.column)
        );
        println!("{}", result.exception_message);
        if !result.exception_stack_trace.is_empty() {
            println!("{}", result.exception_stack_trace.yellow());
        }
    } else {
        println!("{}", "Executed successfully.".green());
    }

    if !quiet && !result.logs.is_empty() {
        println!("{}", result.logs);
    }
}

fn format_position(line: i64, column: i64) -> String {
    if line == UNKNOWN_POSITION {
        String::new()
    } else if column == UNKNOWN_POSITION {
        format!("at line {line}")
    } else {
        format!("at line {line}, column {column}")
    }
}

fn parse_lines(range: &str) -> Result<(usize, usize)> {
    let (start, end) = range
        .split_once(':')
        .with_context(|| format!("expected START:END, got '{range}'"))?;
    let start: usize = start
        .trim()
        .parse()
        .with_context(|| format!("invalid start line in '{range}'"))?;
    let end: usize = end
        .trim()
        .parse()
        .with_context(|| format!("invalid end line in '{range}'"))?;
    if start == 0 || end < start {
        bail!("line range must be 1-based and ascending, got '{range}'");
    }
    Ok((start, end))
}
