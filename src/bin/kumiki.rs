use clap::{Parser, Subcommand};
use kumiki::{
    analyzer::error_handling::format_error_context,
    analyzer::parsers::{Calculator, JsonParser, ScalarParser},
    analyzer::PrefixOutcome,
    config::ParseConfig,
    Error,
};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "kumiki.json", global = true)]
    config: PathBuf,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a JSON document and print it normalized
    Json {
        /// Path to the document, `-` for stdin
        #[arg(default_value = "-")]
        file: PathBuf,

        /// Pretty-print the result
        #[arg(short, long)]
        pretty: bool,
    },

    /// Evaluate an arithmetic expression
    Calc {
        expression: String,

        /// Print the stack machine code
        #[arg(long)]
        code: bool,
    },

    /// Resolve a YAML scalar to its type
    Yaml {
        scalar: String,

        /// Indentation of the enclosing block
        #[arg(long, default_value_t = 0)]
        indent: usize,
    },
}

fn load_config(cli: &Cli) -> Result<ParseConfig, Error> {
    let mut config = if cli.config.exists() {
        ParseConfig::from_file(&cli.config)?
    } else {
        ParseConfig::default()
    };
    if cli.verbose {
        config.trace_rules = true;
    }
    debug!("config: {:?}", config);
    Ok(config)
}

fn read_input(file: &Path) -> Result<String, Error> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(file)?)
    }
}

fn print_failure<O>(text: &str, outcome: &PrefixOutcome<O>) {
    let input: Vec<char> = text.chars().collect();
    let rest: String = outcome.remainder(&input).iter().collect();
    println!("-------------------------");
    println!("Parsing failed");
    if let Some(error) = &outcome.error {
        println!("{}", format_error_context(text, error));
    }
    println!("stopped at: \"{}\"", rest);
    println!("-------------------------");
}

fn run(cli: &Cli) -> Result<bool, Error> {
    let config = load_config(cli)?;
    match &cli.command {
        Commands::Json { file, pretty } => {
            let text = read_input(file)?;
            let parser = JsonParser::with_config(config)?;
            match parser.parse(&text)? {
                Some(value) => {
                    let rendered = if *pretty {
                        serde_json::to_string_pretty(&value)?
                    } else {
                        serde_json::to_string(&value)?
                    };
                    println!("{}", rendered);
                    Ok(true)
                }
                None => {
                    print_failure(&text, &parser.prefix_parse(&text)?);
                    Ok(false)
                }
            }
        }
        Commands::Calc { expression, code } => {
            let calc = Calculator::with_config(config)?;
            match calc.parse(expression)? {
                Some(expr) => {
                    if *code {
                        for instruction in kumiki::eval::compile(&expr) {
                            println!("{}", instruction);
                        }
                    }
                    info!("parsed: {}", expr);
                    println!("{} ==> {}", expression, kumiki::eval::evaluate(&expr));
                    Ok(true)
                }
                None => {
                    print_failure(expression, &calc.prefix_parse(expression)?);
                    Ok(false)
                }
            }
        }
        Commands::Yaml { scalar, indent } => {
            let parser = ScalarParser::new(*indent)?;
            match parser.parse(scalar)? {
                Some(value) => {
                    println!("{}: {}", value.type_name(), value);
                    Ok(true)
                }
                None => {
                    print_failure(scalar, &parser.prefix_parse(scalar)?);
                    Ok(false)
                }
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer())
        .init();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
