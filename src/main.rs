use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xdaq_control::topology::parse_job_assignment;
use xdaq_control::{JobControl, Program};

#[derive(Parser)]
#[command(name = "xdaqctl")]
#[command(about = "Start, stop and query the XDAQ processes described by a topology file")]
struct Cli {
    /// XDAQ topology (configuration) file
    #[arg(short, long, env = "XDAQ_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every context and application in the topology
    List,
    /// Print the state of every application
    States {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Start every context through jobcontrol
    Start,
    /// Kill every context started through jobcontrol
    Kill {
        /// Job id of a running executive as host:port=jid (repeatable)
        #[arg(long = "jid", value_parser = parse_job_assignment)]
        jobs: Vec<(String, u16, i64)>,
    },
    /// Send a SOAP command to all (or the matching) applications
    Send {
        /// Command name, e.g. Configure
        command: String,

        /// Only applications of this class
        #[arg(long = "class")]
        class_name: Option<String>,

        /// Only this instance of the class
        #[arg(long, requires = "class_name")]
        instance: Option<u32>,
    },
}

/// Initialize tracing on stderr so stdout stays clean for tables and JSON.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "xdaq_control=info,xdaqctl=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut program = Program::load(&cli.config, JobControl::from_env())?;
    tracing::debug!(
        "Loaded {} contexts from {}",
        program.contexts().len(),
        cli.config.display()
    );

    match cli.command {
        Commands::List => {
            for context in program.contexts() {
                println!("{}", context);
                for application in context.applications() {
                    println!("    {}", application);
                }
            }
        }
        Commands::States { json } => {
            if json {
                let report = program.states().await;
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                program.print_all_states().await;
            }
        }
        Commands::Start => {
            program.start_all_processes().await?;
            program.print_all_states().await;
        }
        Commands::Kill { jobs } => {
            for (host, port, jid) in jobs {
                if !program.assign_job_id(&host, port, jid) {
                    anyhow::bail!("No context at {}:{} in {}", host, port, cli.config.display());
                }
            }
            let killed = program.kill_all_processes().await?;
            println!(
                "Killed {} of {} contexts",
                killed,
                program.contexts().len()
            );
        }
        Commands::Send {
            command,
            class_name,
            instance,
        } => {
            let responses = match class_name {
                Some(class_name) => {
                    program
                        .send_all_matching_applications_command(&command, &class_name, instance)
                        .await?
                }
                None => program.send_all_command(&command).await?,
            };
            if responses.is_empty() {
                tracing::warn!("No applications matched");
            }
            for response in responses {
                println!("{}", response);
            }
        }
    }

    Ok(())
}
