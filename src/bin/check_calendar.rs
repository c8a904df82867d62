use getopts::Options;
use miette::IntoDiagnostic;
use semester_calendar::error::Error;
use semester_calendar::model::{Document, FieldNaming};
use std::env;
use std::fs;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit status of `--strict` runs that found issues
const STRICT_FAILURE: i32 = 2;

#[derive(Debug, PartialEq)]
struct Args {
    input: String,
    output: Option<String>,
    naming: Option<FieldNaming>,
    strict: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Check(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag("h", "help", "Print this help output");
    opts.optopt(
        "o",
        "output",
        "Write the document back out in canonical form",
        "FILE",
    );
    opts.optopt(
        "n",
        "naming",
        "Date keys of the written file: date-end-date or start-end [Default: as read]",
        "NAMING",
    );
    opts.optflag("s", "strict", "Exit with status 2 when issues were found");
    opts
}

fn usage() -> String {
    let opts = opts();
    opts.usage(&opts.short_usage("check_calendar FILE"))
}

fn parse_args(args: Vec<String>) -> Result<Command, String> {
    let matches = opts().parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Command::Help);
    }

    let naming = matches
        .opt_get::<FieldNaming>("naming")
        .map_err(|err| format!("Provided value for option 'naming' is invalid: {err}"))?;

    let input = matches.free.first().cloned().ok_or_else(usage)?;

    Ok(Command::Check(Args {
        input,
        output: matches.opt_str("output"),
        naming,
        strict: matches.opt_present("strict"),
    }))
}

fn parse(args: Vec<String>) -> Args {
    match parse_args(args) {
        Ok(Command::Check(args)) => args,
        Ok(Command::Help) => {
            println!("{}", usage());
            process::exit(0);
        }
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    }
}

/// Status to exit with after the report, if not success
fn exit_status(args: &Args, issue_count: usize) -> Option<i32> {
    (args.strict && issue_count > 0).then_some(STRICT_FAILURE)
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse(env::args().skip(1).collect());

    let contents = fs::read_to_string(&args.input).map_err(Error::from)?;
    let parsed = Document::from_json_str(&contents)?;
    let document = &parsed.document;
    let read_naming = parsed.naming.unwrap_or_default();

    println!("{}", args.input);
    if let Some(name) = document.semester_name() {
        println!("  semester:   {}", name);
    }
    println!("  categories: {}", document.categories.len());
    println!("  events:     {}", document.events.len());
    println!("  date keys:  {}", read_naming);

    let issues = document.issues();
    if issues.is_empty() {
        println!("  no issues");
    } else {
        println!("  {} issue(s):", issues.len());
        for issue in &issues {
            println!("    - {}", issue);
        }
    }

    if let Some(output) = &args.output {
        let naming = args.naming.unwrap_or(read_naming);
        fs::write(output, document.to_json_pretty(naming)?).into_diagnostic()?;
        info!("Wrote {} with {} date keys", output, naming);
        println!("  written to {} ({})", output, naming);
    }

    if let Some(status) = exit_status(&args, issues.len()) {
        process::exit(status);
    }

    Ok(())
}
