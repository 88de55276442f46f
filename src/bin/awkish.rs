//! CLI tool to run selector rules against input files.
//!
//! Usage:
//!   awkish [OPTIONS] [FILES]...
//!   awkish -r '2:' -p '$1,$3' marks.txt
//!   awkish -F , -r '$2 ~ /^x/' -o out.txt data.csv
//!
//! Without rules every record is printed. With rules, each rule prints the
//! records it matches. Reads stdin when no files are given.

use awkish::{
    AwkError, DEFAULT_FS, DEFAULT_RS, Engine, FieldKey, Mode, Options, Record, Selector,
};
use clap::{Parser, ValueEnum};
use std::cell::Cell;
use std::io::{self, Read};
use std::process;
use std::rc::Rc;
use tracing::{Level, debug};

/// Run awk-style selector rules against input records.
#[derive(Parser)]
#[command(name = "awkish")]
struct Cli {
    /// Input files (stdin when none)
    files: Vec<String>,

    /// Field separator (a regular expression unless --literal)
    #[arg(short = 'F', long, default_value = DEFAULT_FS)]
    field_separator: String,

    /// Treat the field separator as plain text
    #[arg(long)]
    literal: bool,

    /// Record separator (a regular expression)
    #[arg(long, default_value = DEFAULT_RS)]
    rs: String,

    /// Output field separator (\t and \n escapes allowed)
    #[arg(long, default_value = " ")]
    ofs: String,

    /// Output record separator (\t and \n escapes allowed)
    #[arg(long, default_value = "\n")]
    ors: String,

    /// Ignore case in rule patterns
    #[arg(short, long)]
    ignore_case: bool,

    /// Convert numeric fields to numbers
    #[arg(long)]
    autoparse: bool,

    /// Selector such as 3, -2, 2:, 1:10:2, /re/, '$2 ~ /re/', BEGIN or END (repeatable)
    #[arg(short, long = "rule", value_name = "SELECTOR")]
    rules: Vec<String>,

    /// Comma-separated field keys to print instead of the whole record
    #[arg(short, long = "print", value_name = "KEYS")]
    print: Option<String>,

    /// Print the number of matches at the end
    #[arg(short, long)]
    count: bool,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Append to the output file instead of truncating it
    #[arg(short, long, requires = "output")]
    append: bool,

    /// Show run details on stderr (same as --log-level debug)
    #[arg(short, long)]
    verbose: bool,

    /// Log level for stderr diagnostics
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Logs go to stderr so stdout stays clean for records.
fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(Level::from(level))
        .with_writer(io::stderr)
        .init();
}

/// Expand `\t`, `\n` and `\\` in separator arguments.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_keys(keys: &str) -> Vec<FieldKey> {
    keys.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| match k.parse::<usize>() {
            Ok(n) => FieldKey::Nth(n),
            Err(_) => FieldKey::Name(k.to_string()),
        })
        .collect()
}

/// Print the projected keys, or the whole record when there are none.
fn emit(record: &mut Record<'_>, keys: &[FieldKey]) -> awkish::Result<()> {
    if keys.is_empty() {
        return record.print();
    }
    let values = keys
        .iter()
        .map(|key| record.text(key))
        .collect::<awkish::Result<Vec<_>>>()?;
    record.vars_mut().print(values)
}

fn run(cli: Cli) -> awkish::Result<()> {
    let options = Options {
        fs: cli.field_separator.clone(),
        rs: cli.rs.clone(),
        ofs: unescape(&cli.ofs),
        ors: unescape(&cli.ors),
        ignore_case: cli.ignore_case,
        autoparse: cli.autoparse,
    };
    let mut engine = Engine::with_options(options);

    let keys = cli.print.as_deref().map(parse_keys).unwrap_or_default();
    let matches = Rc::new(Cell::new(0usize));

    let selectors = if cli.rules.is_empty() {
        vec![Selector::Every]
    } else {
        // Only the rules print; a "..." rule registered below replaces this.
        engine.register(Selector::Every, |_| Ok(()))?;
        cli.rules
            .iter()
            .map(|text| text.parse::<Selector>())
            .collect::<awkish::Result<Vec<_>>>()?
    };
    for selector in selectors {
        debug!(selector = %selector, "Registering rule");
        let keys = keys.clone();
        let matches = Rc::clone(&matches);
        engine.register(selector, move |record| {
            matches.set(matches.get() + 1);
            emit(record, &keys)
        })?;
    }

    if cli.count {
        let matches = Rc::clone(&matches);
        engine.register(Selector::End, move |record| {
            record.vars_mut().print([matches.get()])
        })?;
    }

    if let Some(path) = &cli.output {
        let mode = if cli.append {
            Mode::Append
        } else {
            Mode::Truncate
        };
        engine.redirect_output(path, mode)?;
    }

    if cli.files.is_empty() {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| AwkError::Io {
                path: "-".into(),
                source: e,
            })?;
        engine
            .vars_mut()
            .set_field_separator(&cli.field_separator, cli.literal);
        engine.run_texts(&[("-", &input)])?;
    } else {
        engine.run(&cli.files, &cli.field_separator, cli.literal)?;
    }

    debug!(
        records = engine.vars().nr,
        matches = matches.get(),
        "Finished"
    );
    engine.reset_output()
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        cli.log_level
    };
    init_logging(level);

    if let Err(e) = run(cli) {
        eprintln!("awkish: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"\t"), "\t");
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"\\"), "\\");
        assert_eq!(unescape(r"\x"), r"\x");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(
            parse_keys("$1, 3,NF"),
            vec![
                FieldKey::Name("$1".to_string()),
                FieldKey::Nth(3),
                FieldKey::Name("NF".to_string())
            ]
        );
        assert!(parse_keys("").is_empty());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "awkish", "-F", ",", "-r", "2:", "-r", "/x/", "-p", "$1", "-c", "in.csv",
        ])
        .unwrap();
        assert_eq!(cli.field_separator, ",");
        assert_eq!(cli.rules, vec!["2:", "/x/"]);
        assert_eq!(cli.print.as_deref(), Some("$1"));
        assert!(cli.count);
        assert_eq!(cli.files, vec!["in.csv"]);
    }

    #[test]
    fn test_append_requires_output() {
        assert!(Cli::try_parse_from(["awkish", "-a", "in.txt"]).is_err());
    }
}
