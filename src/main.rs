use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ndns::ndn::UdpTransport;
use ndns::{PolicyConfig, ResolutionEngine, ResolverConfig, TrustPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "ndns-dig",
    version,
    about = "Resolve a name through NDNS, verifying every response"
)]
struct Args {
    /// Name to resolve: dotted (www.ucla.edu) or an NDN URI (/edu/ucla/www)
    name: String,

    /// Record type to ask for
    #[arg(default_value = "A")]
    record_type: String,

    /// Trust policy file (TOML)
    #[arg(long, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// Forwarder address
    #[arg(long, value_name = "ADDR")]
    forwarder: Option<SocketAddr>,

    /// Interest lifetime in milliseconds
    #[arg(long, value_name = "MS")]
    lifetime_ms: Option<u64>,

    /// Maximum certificate chain length
    #[arg(long)]
    chain_limit: Option<usize>,

    /// Accept delegations that point outside the current zone
    #[arg(long)]
    no_strict: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ndns={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> ndns::error::Result<()> {
    let mut config = ResolverConfig::from_env()?;
    if let Some(forwarder) = args.forwarder {
        config.forwarder_addr = forwarder;
    }
    if let Some(ms) = args.lifetime_ms {
        config.interest_lifetime = Duration::from_millis(ms);
    }
    if args.chain_limit.is_some() {
        config.chain_limit = args.chain_limit;
    }
    if args.no_strict {
        config.strict_delegation = false;
    }
    if args.policy.is_some() {
        config.policy_file = args.policy;
    }
    config.validate()?;

    let policy_config = match &config.policy_file {
        Some(path) => {
            info!("Loading trust policy from {}", path.display());
            PolicyConfig::load(path)?
        }
        None => {
            warn!("No trust policy file given; no trust anchors are configured");
            PolicyConfig::default()
        }
    };
    let policy = Arc::new(TrustPolicy::from_config(&policy_config, config.chain_limit)?);
    let transport = Arc::new(UdpTransport::new(config.forwarder_addr));
    let engine = ResolutionEngine::new(&config, transport, policy);

    let resolution = engine.resolve(&args.name, &args.record_type).await?;
    println!(";; Data name: {}", resolution.data_name);
    println!(";; Zone: {}", resolution.zone);
    println!(
        ";; Round trips: {}, certificates fetched: {}",
        resolution.round_trips, resolution.verified.certificates_fetched
    );
    print!("{}", resolution.message);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ndns-dig: {}", e);
            ExitCode::FAILURE
        }
    }
}
