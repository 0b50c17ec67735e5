//! Command-line parsing.
//!
//! Flags map directly onto [`ParseOptions`] and the emitter's [`ColorMode`];
//! everything that is not a flag is an input path.

use std::path::PathBuf;

use garnet_diagnostic::emitter::ColorMode;
use garnet_lexer_core::Encoding;
use garnet_parse::{ParseOptions, Verbosity};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Lex,
    Parse,
    Check,
    Help,
    Version,
}

/// Where a buffer comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Stdin,
    /// Program text given with `-e`.
    Inline(String),
}

impl Input {
    /// Name shown in diagnostics when `--file` is not given.
    pub fn display_name(&self) -> String {
        match self {
            Input::File(path) => path.display().to_string(),
            Input::Stdin => "-".to_string(),
            Input::Inline(_) => "-e".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub inputs: Vec<Input>,
    pub options: ParseOptions,
    /// `--file` overrides every input's displayed name.
    pub filename: Option<String>,
    pub color: ColorMode,
}

impl Invocation {
    /// Options for one input, with its displayed name filled in.
    pub fn options_for(&self, input: &Input) -> ParseOptions {
        let name = self
            .filename
            .clone()
            .unwrap_or_else(|| input.display_name());
        self.options.clone().with_filename(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' needs a value")]
    MissingValue(String),
    #[error("invalid value '{value}' for '{flag}'")]
    InvalidValue { flag: String, value: String },
    #[error("no input files")]
    NoInput,
}

/// Parse everything after the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation, ArgError> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(bare(Command::Help));
    };
    let command = match command.as_str() {
        "lex" => Command::Lex,
        "parse" => Command::Parse,
        "check" => Command::Check,
        "help" | "--help" | "-h" => return Ok(bare(Command::Help)),
        "version" | "--version" | "-v" => return Ok(bare(Command::Version)),
        other => return Err(ArgError::UnknownCommand(other.to_string())),
    };

    let mut invocation = bare(command);
    let mut inline: Vec<String> = Vec::new();
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| -> Result<String, ArgError> {
            iter.next()
                .cloned()
                .ok_or_else(|| ArgError::MissingValue(flag.to_string()))
        };
        match arg.as_str() {
            "-W0" => invocation.options.verbosity = Verbosity::Silent,
            "-W1" => invocation.options.verbosity = Verbosity::Normal,
            "-W2" | "-W" | "-w" => invocation.options.verbosity = Verbosity::Verbose,
            "-e" => inline.push(value("-e")?),
            "--max-errors" => {
                invocation.options.max_errors = number("--max-errors", &value("--max-errors")?)?;
            }
            "--width" => {
                invocation.options.max_line_width = number("--width", &value("--width")?)?;
            }
            "--line" => invocation.options.first_line = number("--line", &value("--line")?)?,
            "--file" => invocation.filename = Some(value("--file")?),
            "--color" => {
                let raw = value("--color")?;
                invocation.color = ColorMode::from_flag(&raw).ok_or(ArgError::InvalidValue {
                    flag: "--color".to_string(),
                    value: raw,
                })?;
            }
            "--encoding" => {
                let raw = value("--encoding")?;
                invocation.options.default_encoding =
                    Encoding::find(&raw).map_err(|_| ArgError::InvalidValue {
                        flag: "--encoding".to_string(),
                        value: raw,
                    })?;
            }
            "--frozen-string-literal" => invocation.options.frozen_string_literal = true,
            "-" => invocation.inputs.push(Input::Stdin),
            flag if flag.starts_with('-') => {
                return Err(ArgError::UnknownOption(flag.to_string()));
            }
            path => invocation.inputs.push(Input::File(PathBuf::from(path))),
        }
    }

    // Several `-e` arguments form one program, one per line.
    if !inline.is_empty() {
        invocation.inputs.insert(0, Input::Inline(inline.join("\n")));
    }
    if invocation.inputs.is_empty() {
        return Err(ArgError::NoInput);
    }
    Ok(invocation)
}

fn bare(command: Command) -> Invocation {
    Invocation {
        command,
        inputs: Vec::new(),
        options: ParseOptions::default(),
        filename: None,
        color: ColorMode::Auto,
    }
}

fn number<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, ArgError> {
    raw.parse().map_err(|_| ArgError::InvalidValue {
        flag: flag.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests;
