//! CommonAPI wrapper generator
//!
//! Run with: `commonapi-gen [COMMAND]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info};

use commonapi_gen::{
    Generator, GeneratorResult, check_directory, dump_json,
    logger::{init_logging, level_for_verbosity},
};

#[derive(Parser)]
#[command(name = "commonapi-gen")]
#[command(about = "Generate CommonAPI C++ wrappers from Franca IDL files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate client and service wrappers for every interface of a file
    Generate {
        /// CommonAPI interface file (<path>/<name>.fidl)
        fidl: PathBuf,

        /// Directory the wrappers are written to
        output_dir: PathBuf,

        /// Template for the CommonAPI client wrapper
        #[arg(long, env = "COMMONAPI_CLIENT_TEMPLATE")]
        client_template: Option<PathBuf>,

        /// Template for the CommonAPI service wrapper
        #[arg(long, env = "COMMONAPI_SERVICE_TEMPLATE")]
        service_template: Option<PathBuf>,

        /// Wrapper class name, one per interface in declaration order
        #[arg(long = "wrapper-name")]
        wrapper_names: Vec<String>,
    },

    /// Print the parsed document as JSON
    Dump {
        /// CommonAPI interface file
        fidl: PathBuf,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Cross-check the parser against a construct census for every .fidl
    /// file of a directory
    Check {
        /// Directory with .fidl files
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose));

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> GeneratorResult<ExitCode> {
    match command {
        Commands::Generate {
            fidl,
            output_dir,
            client_template,
            service_template,
            wrapper_names,
        } => {
            let mut generator = Generator::new()
                .input(&fidl)
                .output_dir(&output_dir)
                .wrapper_names(wrapper_names);
            if let Some(path) = client_template {
                generator = generator.client_template(path);
            }
            if let Some(path) = service_template {
                generator = generator.service_template(path);
            }

            let generated = generator.generate()?;
            info!(
                "{}: {} wrappers written to {}",
                fidl.display(),
                generated.len(),
                output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Dump { fidl, pretty } => {
            println!("{}", dump_json(&fidl, pretty)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { dir } => {
            let summary = check_directory(&dir)?;
            let mismatches = summary.mismatches().count();
            info!(
                "{}: {} files checked, {} mismatches, {} failures",
                dir.display(),
                summary.reports.len() + summary.failures.len(),
                mismatches,
                summary.failures.len()
            );
            Ok(if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
