//! `garnet lex`: print the token stream.

use crate::args::Invocation;

use super::{read_input, render, stderr_is_tty};

pub fn lex(invocation: &Invocation) -> i32 {
    let mut code = 0;
    for input in &invocation.inputs {
        let options = invocation.options_for(input);
        let source = match read_input(input) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: {err}");
                code = 1;
                continue;
            }
        };

        let out = garnet_lexer::lex(&source);
        println!("Tokens for '{}' ({} tokens):", options.filename, out.tokens.len());
        for token in &out.tokens {
            println!("  {:>4}:{:<3} {token:?}", token.line, token.column);
        }

        if !out.diagnostics.is_empty() {
            eprint!(
                "{}",
                render(
                    &out.diagnostics,
                    &source,
                    &options,
                    invocation.color,
                    stderr_is_tty()
                )
            );
            if out.diagnostics.iter().any(|d| d.is_error()) {
                code = 1;
            }
        }
    }
    code
}
