// src/main.rs
//
// titlecaser: recase titles and headings in Standard Ebooks XHTML
//
// - Tags are copied verbatim; only the text between them is recased, and the
//   cased characters are spliced back into their original positions.
// - Strings may start or end inside a tag (e.g. `h3>A TITLE</h3`).
// - Work titles (<i epub:type="se:name.…">) are recased again as units of their own.
// - Per line: the text of an epub:type="title"/"subtitle" element, else the content
//   of the first <hN> heading. Headings with "roman" in their attributes are skipped.
// - Titlecasing is delegated to an external program (default: `se titlecase -- TEXT`),
//   or to the builtin small-word titlecaser with --oracle builtin.
//
// Subcommands:
//   string <TEXT>          : recase one string and print it
//   tree <DIR>             : recase matching files below DIR in place
//   file <INPUT> [OUTPUT]  : recase INPUT line by line (default: overwrite input)
//
// Logging goes to stderr; RUST_LOG is honoured, --verbose forces `info`.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

use titlecaser::batch::{
    discover, recase_lines, recase_tree, DEFAULT_EXCLUDES, DEFAULT_EXTENSION,
};
use titlecaser::oracle::{DEFAULT_ARGS, DEFAULT_PROGRAM};
use titlecaser::{
    BuiltinTitlecaser, CaseMode, CommandTitlecaser, Error, Recaser, Result, Titlecaser,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OracleKind {
    /// Run an external titlecasing program
    Command,
    /// Use the builtin titlecaser
    Builtin,
}

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Case to apply
    #[arg(long, value_enum, default_value_t = CaseMode::Title, global = true)]
    case: CaseMode,

    /// Titlecasing backend
    #[arg(long, value_enum, default_value_t = OracleKind::Command, global = true)]
    oracle: OracleKind,

    /// Program run by the command backend
    #[arg(long, env = "TITLECASER_ORACLE", default_value = DEFAULT_PROGRAM, global = true)]
    oracle_command: String,

    /// Argument passed to the program before the text (repeatable) [default: titlecase --]
    #[arg(long = "oracle-arg", allow_hyphen_values = true, global = true)]
    oracle_args: Vec<String>,

    /// Pass the text to the program as its only argument
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "oracle_args", global = true)]
    no_oracle_args: bool,

    /// Seconds to wait for one titlecasing call
    #[arg(long, env = "TITLECASER_TIMEOUT", default_value_t = 30, global = true)]
    timeout: u64,

    /// Log progress
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recase one string and print it
    #[command(name = "string")]
    Text {
        /// Text, possibly with inline markup
        text: String,
    },

    /// Recase titles and headings of every matching file below DIR, in place
    Tree {
        /// Root of the document tree
        dir: PathBuf,

        /// Extension of the files to process
        #[arg(long, default_value = DEFAULT_EXTENSION)]
        extension: String,

        /// File name to leave alone (repeatable), on top of the defaults
        #[arg(long)]
        exclude: Vec<String>,

        /// Do not exclude colophon, imprint, uncopyright, titlepage and toc
        #[arg(long, action = ArgAction::SetTrue)]
        no_default_excludes: bool,
    },

    /// Recase titles and headings of a file, line by line
    File {
        /// Input file
        input: PathBuf,

        /// Output file (default: overwrite input)
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose forces INFO, otherwise RUST_LOG or WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let oracle_args = if cli.no_oracle_args {
        Vec::new()
    } else if cli.oracle_args.is_empty() {
        DEFAULT_ARGS.iter().map(|s| (*s).to_owned()).collect()
    } else {
        cli.oracle_args
    };
    let oracle: Box<dyn Titlecaser> = match cli.oracle {
        OracleKind::Command => Box::new(
            CommandTitlecaser::new(&cli.oracle_command, oracle_args)
                .with_timeout(Duration::from_secs(cli.timeout)),
        ),
        OracleKind::Builtin => Box::new(BuiltinTitlecaser),
    };
    let recaser = Recaser::new(cli.case, oracle.as_ref());

    match run(cli.command, &recaser) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("some units failed, see above");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Run one subcommand. `Ok(false)` means it ran to the end with failed units.
fn run(command: Command, recaser: &Recaser<'_>) -> Result<bool> {
    match command {
        Command::Text { text } => {
            println!("{}", recaser.recase(&text)?);
            Ok(true)
        }
        Command::Tree {
            dir,
            extension,
            mut exclude,
            no_default_excludes,
        } => {
            if !dir.is_dir() {
                let err = std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory");
                return Err(Error::io(dir, err));
            }
            if !no_default_excludes {
                exclude.extend(DEFAULT_EXCLUDES.iter().map(|s| (*s).to_owned()));
            }
            let files = discover(&dir, &extension, &exclude)?;
            Ok(recase_tree(&files, recaser).is_success())
        }
        Command::File { input, output } => {
            let out_path = output.as_ref().unwrap_or(&input);
            Ok(recase_lines(&input, out_path, recaser)?.is_success())
        }
    }
}
