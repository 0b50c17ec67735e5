//! Tracing subscriber for the CLI.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Safe to call multiple times.
///
/// Nothing is installed unless `RUST_LOG` or `GARNET_LOG_TREE` is set.
/// `RUST_LOG=garnet_parse=debug` shows statement entry and recovery;
/// `garnet_lexer=trace` adds mode pushes and heredoc swaps. With
/// `GARNET_LOG_TREE` set, events are indented under their spans.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let tree = std::env::var_os("GARNET_LOG_TREE").is_some();
        if std::env::var("RUST_LOG").is_err() && !tree {
            return;
        }
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let installed = if tree {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init()
        };
        if let Err(err) = installed {
            eprintln!("warning: tracing not installed: {err}");
        }
    });
}
