use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process;

use refpack_io::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "refpack", version, about = "Resolve, dereference, and bundle $ref-linked documents")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CircularArg {
    Allow,
    Forbid,
    Ignore,
}

impl From<CircularArg> for CircularPolicy {
    fn from(arg: CircularArg) -> CircularPolicy {
        match arg {
            CircularArg::Allow => CircularPolicy::Allow,
            CircularArg::Forbid => CircularPolicy::Forbid,
            CircularArg::Ignore => CircularPolicy::Ignore,
        }
    }
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Input document path or URL
    input: String,
    /// Collect errors and report them together instead of stopping at the
    /// first one
    #[arg(long)]
    continue_on_error: bool,
    /// Do not follow references outside the input document
    #[arg(long)]
    no_external: bool,
    /// What to do when a circular reference is found
    #[arg(long, value_enum, default_value_t = CircularArg::Allow)]
    circular: CircularArg,
}

impl CommonArgs {
    fn options(&self) -> Options {
        Options::new()
            .continue_on_error(self.continue_on_error)
            .resolve_external(!self.no_external)
            .circular(self.circular.into())
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse the input document and print it as JSON.
    Parse {
        #[command(flatten)]
        common: CommonArgs,
        /// Output minified JSON
        #[arg(long)]
        min: bool,
    },
    /// Load the whole reference graph and print each document's canonical
    /// location, one per line, in discovery order.
    Resolve {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Dereference the input and print the resulting document as JSON.
    ///
    /// Fails on circular inputs (a tree cannot represent a cycle); use
    /// `bundle` for those.
    Dereference {
        #[command(flatten)]
        common: CommonArgs,
        /// Output minified JSON
        #[arg(long)]
        min: bool,
    },
    /// Bundle the whole reference graph into one self-contained document
    /// and print it as JSON.
    Bundle {
        #[command(flatten)]
        common: CommonArgs,
        /// Output minified JSON
        #[arg(long)]
        min: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Parse { common, min } => {
            let value = or_exit(parse(common.input.as_str(), &common.options()).await);
            print_json(&value, min)?;
        }
        Command::Resolve { common } => {
            let refs = or_exit(resolve(common.input.as_str(), &common.options()).await);
            for path in refs.paths(&[]) {
                println!("{path}");
            }
        }
        Command::Dereference { common, min } => {
            let deref = or_exit(dereference(common.input.as_str(), &common.options()).await);
            let value = or_exit(deref.to_value());
            print_json(&value, min)?;
        }
        Command::Bundle { common, min } => {
            let bundled = or_exit(bundle(common.input.as_str(), &common.options()).await);
            print_json(&bundled.value, min)?;
        }
    }

    Ok(())
}

/// Unwrap a resolution result or print the stable error string to stderr
/// and exit 2.
fn or_exit<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            eprintln!("{error}");
            process::exit(2);
        }
    }
}

fn print_json(value: &serde_json::Value, min: bool) -> anyhow::Result<()> {
    let out = if min {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}
