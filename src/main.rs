use std::io;

use clap::{Parser, Subcommand};
use log::{debug, info};

use workload_inspector::config::{init_logging, CliOverrides, EnvironmentConfig};
use workload_inspector::errors::Error;
use workload_inspector::lister::load_client;
use workload_inspector::reporter::{JsonReporter, TableReporter};
use workload_inspector::utils::plural_str;
use workload_inspector::{scan_cluster, KubeLister, LogConfig, OutputFormat, ScanConfig};

/// Kubernetes workload best-practice checker
#[derive(Parser)]
#[command(name = "workload-inspector")]
#[command(author, version, about = "Kubernetes workload checker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check Kubernetes workloads for best practices
    #[command(visible_alias = "bp")]
    BestPractices {
        /// Namespace to check, all namespaces if not set
        #[arg(long, short = 'n', visible_alias = "ns")]
        namespace: Option<String>,

        /// Workload type to check: all, deployment, statefulset or cronjob [default: all]
        #[arg(long, short = 'w')]
        workload_type: Option<String>,

        /// How the pod QoS class is determined: declarative or observed [default: declarative]
        #[arg(long)]
        qos_policy: Option<String>,

        /// Output format: table or json [default: table]
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BestPractices {
            namespace,
            workload_type,
            qos_policy,
            output,
            verbose,
        } => {
            let overrides = CliOverrides {
                namespace,
                workload_type,
                qos_policy,
                output,
                verbose,
            };
            best_practices(overrides).await
        }
    }
}

async fn best_practices(overrides: CliOverrides) -> Result<(), Error> {
    init_logging(&LogConfig::from_verbosity(overrides.verbose));

    let env_config = EnvironmentConfig::from_env()?;
    debug!("Environment config: {:?}", &env_config);
    let config = ScanConfig::resolve(&overrides, &env_config)?;
    info!("Starting with config: {:?}", config);

    let lister = KubeLister::new(load_client().await?);
    let stdout = io::stdout();

    let reported = match config.output {
        OutputFormat::Table => {
            match &config.namespace {
                Some(namespace) => println!("Scanning namespace {} for {} workloads", namespace, config.workload_type),
                None => println!("Scanning all namespaces for {} workloads", config.workload_type),
            }
            let mut reporter = TableReporter::new(stdout.lock());
            scan_cluster(&lister, &config, &mut reporter).await?
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter::new(stdout.lock());
            scan_cluster(&lister, &config, &mut reporter).await?
        }
    };
    info!("Reported {} {}", reported, plural_str(reported, "workloads"));
    Ok(())
}
