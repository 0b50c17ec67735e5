//! `garnet parse`: print the tree.

use crate::args::Invocation;

use super::{read_input, render, stderr_is_tty};

pub fn parse(invocation: &Invocation) -> i32 {
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

        match garnet_parse::parse(&source, &options) {
            Ok(out) => {
                if !out.warnings.is_empty() {
                    let text = render(
                        &out.warnings,
                        &source,
                        &options,
                        invocation.color,
                        stderr_is_tty(),
                    );
                    eprint!("{text}");
                }
                println!("# {} ({})", options.filename, out.encoding);
                println!("{:#?}", out.ast);
            }
            Err(err) => {
                let mut diagnostics = err.warnings().to_vec();
                diagnostics.extend_from_slice(err.diagnostics());
                let text = render(
                    &diagnostics,
                    &source,
                    &options,
                    invocation.color,
                    stderr_is_tty(),
                );
                eprint!("{text}");
                code = 1;
            }
        }
    }
    code
}
