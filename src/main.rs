use bizspec::cli::{self, CliError, Command, CommandOptions, OutputFormat};
use clap::{Parser, Subcommand, ValueEnum};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process,
};

#[derive(Parser)]
#[command(name = "bizspec")]
#[command(about = "BizSpec - business rules with executable test cases")]
#[command(version)]
struct Cli {
    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token table
    Tokens {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the parsed program tree
    Parse {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Apply the rules to every test and print the report
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Keep running other tests when one has a malformed expression
        #[arg(long)]
        keep_going: bool,
    },

    /// Only validate syntax
    Check {
        /// Source file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Print a sample program
    Sample,
}

#[derive(clap::Args)]
struct InputArgs {
    /// Source file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bizspec=debug" } else { "bizspec=warn" };
    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Tokens { input } => run_command(Command::Tokens, input.file, input.format),
        Commands::Parse { input } => run_command(Command::Parse, input.file, input.format),
        Commands::Run { input, keep_going } => {
            run_command(Command::Run { keep_going }, input.file, input.format)
        }
        Commands::Check { file } => run_command(Command::Check, file, Format::Text),
        Commands::Sample => {
            print!("{}", cli::sample_program());
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn read_source(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_command(command: Command, file: Option<PathBuf>, format: Format) -> Result<bool, CliError> {
    let options = CommandOptions {
        command,
        source: read_source(file)?,
        format: format.into(),
    };

    let execution = cli::execute(&options)?;
    print!("{}", execution.output);
    Ok(execution.success)
}
