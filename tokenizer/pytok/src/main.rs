use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use pytok::token_report;
use pytok_lexer::SourceBuffer;
use pytok_service::Service;

#[derive(Debug, Parser)]
#[command(
    name = "pytok",
    version,
    about = "Python tokenizer with buffer transforms and a service mode",
    long_about = "pytok tokenizes Python source text into a stream of lexemes with\n\
        line/column spans, and provides the transforms built on that stream:\n\
        comment stripping, structural-newline scrubbing, corpus rendering, and\n\
        source reconstruction.\n\n\
        EXAMPLES:\n\
        \n  pytok lex script.py                Print the token stream\n\
        \n  pytok lex --json script.py         Print the stream as JSON\n\
        \n  pytok corpus --scrub script.py     One corpus line, newlines scrubbed\n\
        \n  pytok delex script.py              Reconstruct source from tokens\n\
        \n  pytok serve --addr 0.0.0.0:3133    Run the tokenization service\n\
        \n  echo 'x = 1' | pytok lex           Tokenize stdin"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tokenize a Python source file and print the lexeme stream
    Lex(LexArgs),

    /// Tokenize, then reconstruct the source text from the token spans
    Delex(InputArgs),

    /// Render one corpus line from the token stream
    Corpus(CorpusArgs),

    /// Run the request/reply tokenization service
    Serve(ServeArgs),
}

#[derive(Debug, Args, Clone)]
struct LexArgs {
    /// Input Python source file (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Emit the token stream as JSON instead of the text listing
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args, Clone)]
struct InputArgs {
    /// Input Python source file (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct CorpusArgs {
    /// Input Python source file (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Strip comments and structural newlines before rendering
    #[arg(long)]
    scrub: bool,
}

#[derive(Debug, Args, Clone)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:3133")]
    addr: String,
}

fn read_source_from_input(input: &Option<PathBuf>) -> Result<String, String> {
    if let Some(path) = input {
        fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read from stdin: {e}"))?;
        Ok(buf)
    }
}

fn run_lex(source: &str, json: bool) -> i32 {
    let report = token_report(source);
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return 2;
            }
        }
        return if report.errors.is_empty() { 0 } else { 1 };
    }
    if let Some(error) = report.errors.first() {
        eprintln!("error: {error}");
        return 1;
    }
    for token in &report.tokens {
        println!(
            "{}:{}-{}:{}\t{}\t{:?}",
            token.start.0, token.start.1, token.end.0, token.end.1, token.kind, token.text
        );
    }
    0
}

fn run_delex(source: &str) -> i32 {
    match SourceBuffer::from_source(source) {
        Ok(buffer) => {
            print!("{}", buffer.delex());
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_corpus(source: &str, scrub: bool) -> i32 {
    let buffer = match SourceBuffer::from_source(source) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };
    let rendered = if scrub {
        match buffer.scrubbed() {
            Ok(scrubbed) => scrubbed.corpus(),
            Err(e) => {
                eprintln!("error: {e}");
                return 1;
            }
        }
    } else {
        buffer.corpus()
    };
    println!("{rendered}");
    0
}

fn run_serve(addr: &str) -> i32 {
    let service = match Service::bind(addr) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("error: failed to bind '{addr}': {e}");
            return 2;
        }
    };
    match service.run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: service failed: {e}");
            1
        }
    }
}

fn run_cli() -> i32 {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let cmd = cli.command.unwrap_or(Command::Lex(LexArgs {
        input: None,
        json: false,
    }));

    match cmd {
        Command::Lex(args) => {
            let source = match read_source_from_input(&args.input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {e}");
                    return 2;
                }
            };
            run_lex(&source, args.json)
        }
        Command::Delex(args) => {
            let source = match read_source_from_input(&args.input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {e}");
                    return 2;
                }
            };
            run_delex(&source)
        }
        Command::Corpus(args) => {
            let source = match read_source_from_input(&args.input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {e}");
                    return 2;
                }
            };
            run_corpus(&source, args.scrub)
        }
        Command::Serve(args) => run_serve(&args.addr),
    }
}

fn main() {
    std::process::exit(run_cli());
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn lex_parses_with_file_and_json_flag() {
        let cli = Cli::try_parse_from(["pytok", "lex", "--json", "script.py"]).unwrap();
        match cli.command {
            Some(Command::Lex(args)) => {
                assert!(args.json);
                assert_eq!(args.input, Some(PathBuf::from("script.py")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_has_a_default_address() {
        let cli = Cli::try_parse_from(["pytok", "serve"]).unwrap();
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.addr, "127.0.0.1:3133"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbosity_flag_counts() {
        let cli = Cli::try_parse_from(["pytok", "-vv", "lex"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn run_lex_reports_scan_failures_with_exit_one() {
        assert_eq!(run_lex("s = 'open\n", false), 1);
        assert_eq!(run_lex("x = 1\n", false), 0);
    }

    #[test]
    fn corpus_and_delex_on_a_temp_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x = 1 # note\n").unwrap();
        let source = read_source_from_input(&Some(file.path().to_path_buf())).unwrap();
        assert_eq!(run_corpus(&source, true), 0);
        assert_eq!(run_delex(&source), 0);
    }

    #[test]
    fn cli_help_contains_expected_content() {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        cmd.write_long_help(&mut buf).unwrap();
        let help = String::from_utf8(buf).unwrap();
        assert!(help.contains("corpus"));
        assert!(help.contains("serve"));
        assert!(help.contains("stdin"));
    }
}
