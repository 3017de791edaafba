use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use deskpilot::config::{load_config, save_config, RunConfig};
use deskpilot::errors::PilotResult;
use deskpilot::scenario::load_scenario_file;

#[derive(Parser)]
#[command(author, version, about = "Drive the desktop with a vision model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scenario and print the model's final answer
    Run {
        /// JSON file with a shared system prompt and a list of scenarios
        scenario_file: PathBuf,

        /// Scenario to run, counting from 1
        scenario_num: usize,

        /// Config file (defaults to the usual search locations)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override `agent.max_steps`
        #[arg(long)]
        max_steps: Option<u32>,
    },
    /// Write the default configuration
    InitConfig {
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env is optional.
    let _ = dotenvy::dotenv();
    deskpilot::init_tracing();

    let cli = Cli::parse();
    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> PilotResult<()> {
    match command {
        Command::Run {
            scenario_file,
            scenario_num,
            config,
            max_steps,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(n) = max_steps {
                cfg.agent.max_steps = n;
            }
            let scenario = load_scenario_file(&scenario_file)?.select(scenario_num)?;

            let outcome = deskpilot::run_on_desktop(&cfg, scenario).await?;
            tracing::info!(
                run_id = %outcome.run_id,
                steps = outcome.steps,
                stop = ?outcome.stop,
                screenshots = outcome.screenshots.len(),
                "run finished"
            );
            println!("{}", outcome.answer);
            Ok(())
        }
        Command::InitConfig { path } => save_config(&RunConfig::default(), &path),
    }
}
