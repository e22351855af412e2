use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use stepgate::{Gate, GateConfig, GateError, SimulatedAuthenticator};
use stepgate_challenge::{AuthenticatorStatus, ChallengeOutcome};
use stepgate_core::AuthenticationRequirement;

/// Stepgate: step-up authentication gate
///
/// Decides per access attempt whether to challenge, skip, require setup,
/// or let the caller through.
#[derive(Parser, Debug)]
#[command(name = "stepgate", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// Evaluate access attempts against a simulated authenticator status
    Evaluate {
        /// Authenticator status, e.g. success, none_enrolled, no_hardware
        #[arg(long)]
        status: AuthenticatorStatus,

        /// Override the configured requirement tier
        #[arg(long)]
        tier: Option<AuthenticationRequirement>,

        /// Force the bypass override on
        #[arg(long)]
        bypass: bool,

        /// Number of consecutive attempts
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// Simulate the app leaving the foreground between attempts
        #[arg(long)]
        reset_between: bool,
    },

    /// Run one full access attempt, including the challenge
    Access {
        /// Authenticator status, e.g. success, none_enrolled, no_hardware
        #[arg(long)]
        status: AuthenticatorStatus,

        /// Override the configured requirement tier
        #[arg(long)]
        tier: Option<AuthenticationRequirement>,

        /// Make the challenge fail with CODE:MESSAGE
        #[arg(long, value_parser = parse_failure)]
        fail: Option<FailureSpec>,
    },
}

#[derive(Debug, Clone)]
struct FailureSpec {
    code: i32,
    message: String,
}

fn parse_failure(s: &str) -> Result<FailureSpec, String> {
    let (code, message) = s
        .split_once(':')
        .ok_or_else(|| format!("expected CODE:MESSAGE, got '{}'", s))?;
    let code = code
        .trim()
        .parse()
        .map_err(|_| format!("invalid failure code '{}'", code))?;
    Ok(FailureSpec {
        code,
        message: message.to_string(),
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "stepgate=debug,stepgate_policy=debug,stepgate_challenge=debug,stepgate_core=debug",
        )
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stepgate=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GateConfig, GateError> {
    match path {
        Some(p) => GateConfig::load(p),
        None => GateConfig::load(&GateConfig::default_config_path()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), GateError> {
    match cli.command {
        Commands::Init => cmd_init(cli.config.as_ref()),
        Commands::Evaluate {
            status,
            tier,
            bypass,
            repeat,
            reset_between,
        } => cmd_evaluate(
            cli.config.as_ref(),
            status,
            tier,
            bypass,
            repeat,
            reset_between,
        ),
        Commands::Access { status, tier, fail } => {
            cmd_access(cli.config.as_ref(), status, tier, fail).await
        }
    }
}

fn cmd_init(config_path: Option<&PathBuf>) -> Result<(), GateError> {
    let path = config_path
        .cloned()
        .unwrap_or_else(GateConfig::default_config_path);
    let config = GateConfig::default();
    config.save(&path)?;

    info!(path = %path.display(), "wrote default configuration");
    println!("Stepgate configuration written to {}", path.display());
    Ok(())
}

fn build_gate(
    config_path: Option<&PathBuf>,
    status: AuthenticatorStatus,
    tier: Option<AuthenticationRequirement>,
    bypass: bool,
) -> Result<(Gate, Arc<SimulatedAuthenticator>), GateError> {
    let mut config = load_config(config_path)?;
    if let Some(tier) = tier {
        config.requirement = tier;
    }
    config.bypass |= bypass;

    let authenticator = Arc::new(SimulatedAuthenticator::new(status));
    let gate = Gate::from_config(&config, authenticator.clone())?;
    Ok((gate, authenticator))
}

fn cmd_evaluate(
    config_path: Option<&PathBuf>,
    status: AuthenticatorStatus,
    tier: Option<AuthenticationRequirement>,
    bypass: bool,
    repeat: usize,
    reset_between: bool,
) -> Result<(), GateError> {
    let (gate, _authenticator) = build_gate(config_path, status, tier, bypass)?;
    let bridge = gate.lifecycle_bridge();

    for attempt in 1..=repeat {
        if reset_between && attempt > 1 {
            bridge.on_lost_foreground();
        }
        let decision = gate.decide();
        let line = serde_json::json!({
            "attempt": attempt,
            "decision": decision,
        });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

async fn cmd_access(
    config_path: Option<&PathBuf>,
    status: AuthenticatorStatus,
    tier: Option<AuthenticationRequirement>,
    fail: Option<FailureSpec>,
) -> Result<(), GateError> {
    let (gate, authenticator) = build_gate(config_path, status, tier, false)?;
    if let Some(failure) = fail {
        authenticator.push_outcome(ChallengeOutcome::failure(failure.code, failure.message));
    }

    let outcome = gate.access().await?;
    let report = serde_json::json!({
        "outcome": outcome,
        "granted": outcome.is_granted(),
        "challenges_triggered": authenticator.triggered_count(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
