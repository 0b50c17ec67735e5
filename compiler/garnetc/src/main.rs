//! Garnet CLI
//!
//! `garnet check` is the syntax checker; `lex` and `parse` dump the token
//! stream and tree for inspecting the front end.

use garnetc::commands;
use garnetc::tracing_setup::init_tracing;
use garnetc::{parse_args, Command};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let code = match invocation.command {
        Command::Help => {
            print_usage();
            0
        }
        Command::Version => {
            println!("garnet {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Command::Lex => commands::lex(&invocation),
        Command::Parse => commands::parse(&invocation),
        Command::Check => commands::check(&invocation),
    };
    std::process::exit(code);
}

fn print_usage() {
    println!("Garnet front end");
    println!();
    println!("Usage: garnet <command> [options] [files...]");
    println!();
    println!("Commands:");
    println!("  check <files...>     Check syntax (files are checked in parallel)");
    println!("  parse <file>         Parse and print the tree");
    println!("  lex <file>           Tokenize and print the tokens");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Options:");
    println!("  -e CODE              Program text instead of a file (repeatable)");
    println!("  -W0, -W1, -W2        Warning level: none, normal, verbose");
    println!("  --max-errors N       Stop reporting after N errors (0 = no limit)");
    println!("  --width N            Truncate excerpt lines to N columns");
    println!("  --color MODE         auto, always, never");
    println!("  --line N             Number of the first line");
    println!("  --file NAME          Name shown in diagnostics");
    println!("  --encoding NAME      Source encoding when none is declared");
    println!("  --frozen-string-literal");
    println!("                       Freeze string literals by default");
    println!("  -                    Read from stdin");
    println!();
    println!("Environment:");
    println!("  RUST_LOG             Tracing filter, e.g. garnet_parse=debug");
    println!("  GARNET_LOG_TREE      Indent tracing output by span");
    println!();
    println!("Examples:");
    println!("  garnet check lib/*.rb");
    println!("  garnet check -W2 -e 'x = 1'");
    println!("  garnet parse --line 10 snippet.rb");
}
