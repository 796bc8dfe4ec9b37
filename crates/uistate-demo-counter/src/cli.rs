#![forbid(unsafe_code)]

//! Command-line argument parsing for the counter demo.
//!
//! Parses args manually (no external dependencies) to keep the binary
//! lean. Supports a scripted mode for non-interactive runs.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
uistate Counter Demo — lifecycle-scoped observation walkthrough

USAGE:
    uistate-demo-counter [OPTIONS]

OPTIONS:
    --initial=N      Starting counter value (default: 8649)
    --prefix=TEXT    Prefix for generated notice lines (default: 'this is a text: ')
    --script=CMDS    Run a semicolon-separated command script and exit
                     (e.g. --script='print;pause;print;resume;quit')
    --help, -h       Show this help message
    --version, -V    Show version

COMMANDS (interactive or scripted):
    print            Increment the counter and emit a one-shot notice
    pause            Move the screen lifecycle to inactive
    resume           Move the screen lifecycle back to active
    recreate         Destroy the lifecycle and attach a fresh one
                     (simulates a configuration change)
    status           Print current counter state
    quit             Exit
";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Starting counter value.
    pub initial: i32,
    /// Prefix for generated notice lines.
    pub prefix: String,
    /// Semicolon-separated command script; `None` means interactive.
    pub script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            initial: 8649,
            prefix: "this is a text: ".into(),
            script: None,
        }
    }
}

impl Opts {
    /// Parse command-line arguments, exiting on `--help`, `--version`,
    /// or malformed input.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1)) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("uistate-demo-counter {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from(args: impl Iterator<Item = String>) -> Result<Self, ParseError> {
        let mut opts = Self::default();
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                _ => {}
            }
            if let Some(value) = arg.strip_prefix("--initial=") {
                opts.initial = value.parse().map_err(|_| ParseError::InvalidValue {
                    flag: "--initial",
                    value: value.to_string(),
                })?;
            } else if let Some(value) = arg.strip_prefix("--prefix=") {
                opts.prefix = value.to_string();
            } else if let Some(value) = arg.strip_prefix("--script=") {
                opts.script = Some(value.to_string());
            } else {
                return Err(ParseError::UnknownArg(arg));
            }
        }
        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Opts, ParseError> {
        Opts::parse_from(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn defaults() {
        let opts = parse(&[]).unwrap();
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.initial, 8649);
        assert!(opts.script.is_none());
    }

    #[test]
    fn initial_and_prefix() {
        let opts = parse(&["--initial=5", "--prefix=hi: "]).unwrap();
        assert_eq!(opts.initial, 5);
        assert_eq!(opts.prefix, "hi: ");
    }

    #[test]
    fn script_mode() {
        let opts = parse(&["--script=print;quit"]).unwrap();
        assert_eq!(opts.script.as_deref(), Some("print;quit"));
    }

    #[test]
    fn invalid_initial_rejected() {
        let err = parse(&["--initial=abc"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                flag: "--initial",
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn unknown_arg_rejected() {
        let err = parse(&["--bogus"]).unwrap_err();
        assert_eq!(err, ParseError::UnknownArg("--bogus".to_string()));
    }

    #[test]
    fn help_and_version_flags() {
        assert_eq!(parse(&["--help"]).unwrap_err(), ParseError::Help);
        assert_eq!(parse(&["-V"]).unwrap_err(), ParseError::Version);
    }
}
