use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use msgpatch::{Editor, EditError, MsgValue, decode_with, encode};

use crate::exit::{CliError, CliResult, FAILURE, SUCCESS, USAGE, edit_error, io_error};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored under a key.
    Locate(LocateArgs),
    /// Swap the value stored under an existing key.
    Replace(WriteArgs),
    /// Append a new key to the map.
    Insert(WriteArgs),
    /// Drop a key from the map.
    Remove(RemoveArgs),
    /// List top-level keys in encoding order.
    Keys(InputArgs),
    /// Print the whole map as JSON.
    Dump(InputArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Encoded map to read (`-` for stdin).
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Encoded map to read (`-` for stdin).
    pub input: PathBuf,
    /// Key to look up.
    pub key: String,
    /// Write the encoded value bytes instead of JSON.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Encoded map to read (`-` for stdin).
    pub input: PathBuf,
    /// Key to write.
    pub key: String,
    /// New value as JSON; it is encoded before splicing.
    pub json: String,
    /// Output file. Default: stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Encoded map to read (`-` for stdin).
    pub input: PathBuf,
    /// Key to drop.
    pub key: String,
    /// Output file. Default: stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

pub fn run(command: Command, editor: &Editor) -> CliResult<i32> {
    match command {
        Command::Locate(args) => locate(args, editor),
        Command::Replace(args) => {
            let value = json_value(&args.json)?;
            let buf = read_input(&args.input)?;
            let out = editor
                .replace(&args.key, &buf, &value)
                .map_err(|err| edit_error("replace failed", err))?;
            write_output(args.output.as_deref(), &out)
        }
        Command::Insert(args) => {
            let value = json_value(&args.json)?;
            let buf = read_input(&args.input)?;
            let out = editor
                .insert(&args.key, &buf, &value)
                .map_err(|err| edit_error("insert failed", err))?;
            write_output(args.output.as_deref(), &out)
        }
        Command::Remove(args) => {
            let buf = read_input(&args.input)?;
            let out = editor
                .remove(&args.key, &buf)
                .map_err(|err| edit_error("remove failed", err))?;
            write_output(args.output.as_deref(), &out)
        }
        Command::Keys(args) => keys(args, editor),
        Command::Dump(args) => {
            let buf = read_input(&args.input)?;
            let value = decode_with(&buf, editor.limits())
                .map_err(|err| edit_error("decode failed", err))?;
            print_json(value)
        }
    }
}

fn locate(args: LocateArgs, editor: &Editor) -> CliResult<i32> {
    let buf = read_input(&args.input)?;
    let raw = editor
        .scan(&args.key, &buf)
        .map_err(|err| edit_error("locate failed", err))?
        .ok_or_else(|| edit_error(&args.key, EditError::FieldNotFound))?;

    tracing::debug!(key = %args.key, len = raw.len(), "located field");
    if args.raw {
        return write_output(None, raw);
    }
    let value = decode_with(raw, editor.limits()).map_err(|err| edit_error("decode failed", err))?;
    print_json(value)
}

fn keys(args: InputArgs, editor: &Editor) -> CliResult<i32> {
    let buf = read_input(&args.input)?;
    let fields = editor
        .fields(&buf)
        .map_err(|err| edit_error("keys failed", err))?;

    let mut stdout = std::io::stdout().lock();
    for field in fields {
        let field = field.map_err(|err| edit_error("keys failed", err))?;
        writeln!(stdout, "{}", field.key).map_err(|err| io_error("write failed", err))?;
    }
    Ok(SUCCESS)
}

/// Parse a JSON argument and encode it as one value.
fn json_value(json: &str) -> CliResult<Vec<u8>> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|err| CliError::new(USAGE, format!("invalid JSON value: {err}")))?;
    Ok(encode(&MsgValue::from(parsed)))
}

pub fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    let mut buf = Vec::new();
    if path == Path::new("-") {
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("read stdin failed", err))?;
    } else {
        buf = fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))?;
    }
    tracing::debug!(path = %path.display(), len = buf.len(), "read input");
    Ok(buf)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> CliResult<i32> {
    match path {
        Some(path) => fs::write(path, bytes)
            .map_err(|err| io_error(&format!("write {}", path.display()), err))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|err| io_error("write failed", err))?;
        }
    }
    Ok(SUCCESS)
}

fn print_json(value: MsgValue) -> CliResult<i32> {
    let json: serde_json::Value = value.into();
    let text = serde_json::to_string_pretty(&json)
        .map_err(|err| CliError::new(FAILURE, format!("JSON output failed: {err}")))?;
    println!("{text}");
    Ok(SUCCESS)
}
