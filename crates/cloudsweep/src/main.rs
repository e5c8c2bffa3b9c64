mod commands;
mod report;

use clap::{Parser, Subcommand};
use cloudsweep_core::RunFlags;

#[derive(Parser)]
#[command(name = "cloudsweep")]
#[command(about = "Classify and clean up leftover cloud resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean up AWS resources
    Aws {
        /// Compute instances (age and allowlist policy applies)
        #[arg(long)]
        vms: bool,
        /// Unused network interfaces
        #[arg(long)]
        nics: bool,
        /// Unattached volumes
        #[arg(long)]
        discs: bool,
        /// Disassociated public IPs
        #[arg(long)]
        pips: bool,
        /// Cluster-tagged leftovers (not covered by --all)
        #[arg(long)]
        ocps: bool,
        /// Every category except cluster-tagged leftovers
        #[arg(long)]
        all: bool,
        /// Report the classification without touching anything
        #[arg(short = 'd', long)]
        dry_run: bool,
        /// SLA override in minutes for tagged-resource evaluation
        #[arg(long, value_name = "MINUTES")]
        older_than: Option<i64>,
    },
    /// Show the version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    match cli.command {
        Commands::Version => {
            println!("cloudsweep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Aws {
            vms,
            nics,
            discs,
            pips,
            ocps,
            all,
            dry_run,
            older_than,
        } => {
            // Malformed settings abort here, before any region is touched.
            let settings = cloudsweep_config::Settings::load()?;
            let flags = RunFlags {
                vms,
                nics,
                discs,
                pips,
                ocps,
                all,
                dry_run,
                older_than,
            };
            commands::aws::handle(&settings, flags).await
        }
    }
}
