mod cmd;
mod exit;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use msgpatch::{Editor, Limits};

use crate::cmd::Command;
use crate::exit::{CliResult, edit_error, io_error};
use crate::logging::{LogFormat, LogLevel, init_logging};

#[derive(Parser, Debug)]
#[command(name = "msgpatch", version, about = "Field-level edits on MessagePack maps")]
struct Cli {
    /// Maximum container nesting accepted while walking values.
    #[arg(long, value_name = "N", global = true, env = "MSGPATCH_MAX_DEPTH")]
    max_depth: Option<usize>,

    /// JSON file with limits; flags override it.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn limits(&self) -> CliResult<Limits> {
        let mut limits = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|err| io_error(&format!("read {}", path.display()), err))?;
                Limits::from_json(&text).map_err(|err| edit_error("bad config", err))?
            }
            None => Limits::default(),
        };
        if let Some(max_depth) = self.max_depth {
            limits = Limits::new(max_depth).map_err(|err| edit_error("bad --max-depth", err))?;
        }
        Ok(limits)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let result = cli
        .limits()
        .and_then(|limits| cmd::run(cli.command, &Editor::new(limits)));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn parses_locate_subcommand() {
        let cli = Cli::try_parse_from(["msgpatch", "locate", "doc.bin", "name", "--raw"])
            .expect("locate args should parse");

        match cli.command {
            Command::Locate(args) => {
                assert_eq!(args.key, "name");
                assert!(args.raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_replace_with_output() {
        let cli = Cli::try_parse_from([
            "msgpatch",
            "replace",
            "-",
            "score",
            "4.0",
            "-o",
            "out.bin",
        ])
        .expect("replace args should parse");

        match cli.command {
            Command::Replace(args) => {
                assert_eq!(args.input, PathBuf::from("-"));
                assert_eq!(args.json, "4.0");
                assert_eq!(args.output, Some(PathBuf::from("out.bin")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["msgpatch", "keys", "doc.bin", "--max-depth", "8"])
            .expect("global flags should parse");
        assert_eq!(cli.limits().unwrap().max_depth, 8);
    }

    #[test]
    fn zero_depth_is_a_usage_error() {
        let cli = Cli::try_parse_from(["msgpatch", "dump", "doc.bin", "--max-depth", "0"])
            .expect("args should parse");
        assert_eq!(cli.limits().unwrap_err().code, USAGE);
    }

    #[test]
    fn rejects_missing_key() {
        let err = Cli::try_parse_from(["msgpatch", "remove", "doc.bin"])
            .expect_err("missing key should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
