//! Variant text command-line tool for checking, formatting, and transcoding
//! variant text files.
//!
//! Usage: vartext [OPTIONS] [FILE]
//!
//! The input is a record file of `[tag]` sections and `key = value`
//! assignments, or a single value with `--value`. Output is canonical
//! variant text unless `--to` names another format.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use libvartext::tag::write_record;
use libvartext::{
    FileStream, Hooks, ParseContext, ReaderStream, Record, Records, Value, WriteOptions,
};

mod refs;
mod transcode;

use refs::{PathLoader, SymbolicEncoder, SymbolicResolver};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Canonical variant text
    Text,
    Yaml,
    Toml,
}

impl OutputFormat {
    fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Text => None,
            OutputFormat::Yaml => Some("yaml"),
            OutputFormat::Toml => Some("toml"),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "vartext",
    version,
    about = "Check, format, and transcode variant text files"
)]
struct Cli {
    /// Input file; reads stdin when omitted or `-`
    file: Option<PathBuf>,

    /// Parse a single value instead of a record file
    #[arg(long)]
    value: bool,

    /// Read tag bodies as plain section names
    #[arg(long)]
    simple: bool,

    /// Only check that the input parses
    #[arg(long)]
    check: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    to: OutputFormat,

    /// Write output to this file
    #[arg(short, long, conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Write output next to the input, with an extension for the format
    #[arg(short, long)]
    write: bool,

    /// More logging; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

enum Document {
    Value(Value),
    Records(Vec<Record>),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = format!("libvartext={level},vartext={level}");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn input_path(cli: &Cli) -> Option<&Path> {
    cli.file.as_deref().filter(|p| *p != Path::new("-"))
}

fn run(cli: &Cli) -> Result<(), String> {
    let path = input_path(cli);
    let filename = path.and_then(|p| p.file_name()).map(|n| n.to_string_lossy().to_string());
    let base = path
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let document = match path {
        Some(p) => {
            let stream =
                FileStream::open(p).map_err(|e| format!("reading {}: {}", p.display(), e))?;
            read_document(stream, filename.as_deref(), base, cli)?
        }
        None => read_document(ReaderStream::new(io::stdin().lock()), None, base, cli)?,
    };

    if cli.check {
        println!("{}: ok", filename.as_deref().unwrap_or("<stdin>"));
        return Ok(());
    }

    let options = WriteOptions::with_encoder(&SymbolicEncoder);
    let output = match cli.to {
        OutputFormat::Text => render_text(&document, &options),
        OutputFormat::Yaml => transcode::yaml::encode(&document_value(document), &options)
            .map_err(|e| format!("cannot convert to YAML: {}", e))?,
        OutputFormat::Toml => transcode::toml::encode(&document_value(document), &options)
            .map_err(|e| format!("cannot convert to TOML: {}", e))?,
    };
    write_output(&output, cli, path)
}

fn read_document<R: Read>(
    mut stream: ReaderStream<R>,
    filename: Option<&str>,
    base: PathBuf,
    cli: &Cli,
) -> Result<Document, String> {
    let mut loader = PathLoader::new(base);
    let mut resolver = SymbolicResolver;
    let hooks = Hooks::new()
        .with_loader(&mut loader)
        .with_resolver(&mut resolver);

    let parsed = {
        let mut parser = libvartext::Parser::new(&mut stream, ParseContext::new(filename), hooks);
        if cli.value {
            parser
                .parse()
                .and_then(|value| parser.finish().map(|()| Document::Value(value)))
        } else {
            Records::new(&mut parser, cli.simple)
                .collect::<libvartext::Result<Vec<_>>>()
                .map(Document::Records)
        }
    };

    // An I/O failure ends the stream early, which would otherwise look like
    // a truncated document.
    if let Some(err) = stream.take_error() {
        return Err(format!("reading {}: {}", filename.unwrap_or("<stdin>"), err));
    }
    parsed.map_err(|e| e.to_string())
}

fn render_text(document: &Document, options: &WriteOptions<'_>) -> String {
    match document {
        Document::Value(value) => libvartext::writer::to_string(value, options) + "\n",
        Document::Records(records) => {
            let mut out = String::new();
            for record in records {
                // Infallible: writing to a String.
                let _ = write_record(record, &mut out, options);
                out.push('\n');
            }
            out
        }
    }
}

/// Records become `{ "records": [ ... ] }` for formats without sections.
fn document_value(document: Document) -> Value {
    let records = match document {
        Document::Value(value) => return value,
        Document::Records(records) => records,
    };
    let items = records
        .into_iter()
        .map(|record| {
            let mut entry = BTreeMap::new();
            match record {
                Record::Tag(tag) => {
                    let fields = tag
                        .fields
                        .into_iter()
                        .map(|(k, v)| (Value::String(k), v))
                        .collect();
                    entry.insert(Value::from("tag"), Value::String(tag.name));
                    entry.insert(Value::from("fields"), Value::Dictionary(fields));
                }
                Record::Assign { key, value } => {
                    entry.insert(Value::from("key"), Value::String(key));
                    entry.insert(Value::from("value"), value);
                }
            }
            Value::Dictionary(entry)
        })
        .collect();
    let mut root = BTreeMap::new();
    root.insert(Value::from("records"), Value::Array(items));
    Value::Dictionary(root)
}

fn write_output(output: &str, cli: &Cli, input: Option<&Path>) -> Result<(), String> {
    let target = if let Some(path) = &cli.output {
        Some(path.clone())
    } else if cli.write {
        let input = input.ok_or("--write requires an input file")?;
        Some(match cli.to.extension() {
            Some(ext) => input.with_extension(ext),
            None => input.to_path_buf(),
        })
    } else {
        None
    };

    match target {
        Some(path) => {
            log::info!("writing {}", path.display());
            fs::write(&path, output).map_err(|e| format!("writing {}: {}", path.display(), e))
        }
        None => io::stdout()
            .write_all(output.as_bytes())
            .map_err(|e| format!("writing stdout: {}", e)),
    }
}
