//! Maintenance-fee agent CLI
//!
//! The `maint` command answers free-text questions about society maintenance
//! payments and can drive the payments service directly.
//!
//! ## Commands
//!
//! - `ask`: plan, execute and explain a free-text request
//! - `status`: look up one flat's payment for a month
//! - `remind`: look up and send a WhatsApp reminder if unpaid
//! - `flats`: list or register flats

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use maint_collab::{FlatRecord, PaymentStore};
use maint_core::{
    current_month_year, remote_generator, AgentConfig, Collaborators, HeuristicGenerator,
    MaintenanceAgent, Orchestrator, Plan, PlanOutcome, TemplateNarrator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "maint")]
#[command(author = "Society Ops")]
#[command(version = maint_core::VERSION)]
#[command(about = "Maintenance-fee assistant for housing societies", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML file with service endpoints
    #[arg(long, global = true, env = "MAINT_CONFIG")]
    config: Option<PathBuf>,

    /// Plan and explain with the built-in keyword generator instead of the LLM
    #[arg(long, global = true)]
    offline_llm: bool,

    /// Use fixed one-line explanations instead of asking the LLM
    #[arg(long, global = true)]
    template_explanations: bool,

    #[command(flatten)]
    endpoints: EndpointArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Per-run endpoint overrides; these win over the config file and environment.
#[derive(Args, Default)]
struct EndpointArgs {
    #[arg(long, global = true)]
    payments_url: Option<String>,

    #[arg(long, global = true)]
    whatsapp_url: Option<String>,

    #[arg(long, global = true)]
    audit_url: Option<String>,

    #[arg(long, global = true)]
    llm_url: Option<String>,

    #[arg(long, global = true)]
    llm_model: Option<String>,
}

impl EndpointArgs {
    fn apply(&self, config: &mut AgentConfig) {
        if let Some(url) = &self.payments_url {
            config.payments.base_url = url.clone();
        }
        if let Some(url) = &self.whatsapp_url {
            config.messaging.base_url = url.clone();
        }
        if let Some(url) = &self.audit_url {
            config.audit.base_url = url.clone();
        }
        if let Some(url) = &self.llm_url {
            config.llm.base_url = url.clone();
        }
        if let Some(model) = &self.llm_model {
            config.llm.model = model.clone();
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the agent in plain language
    Ask {
        /// Only print the explanation, not the plan and results
        #[arg(short, long)]
        quiet: bool,

        /// The request, e.g. "Has C-101 paid for 2025-12?"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show a flat's payment status
    Status {
        /// Flat number, e.g. C-101
        flat_no: String,

        /// Month as YYYY-MM (default: current month)
        #[arg(short, long, value_parser = parse_month)]
        month: Option<String>,
    },

    /// Send a WhatsApp reminder if the flat has not paid
    Remind {
        /// Flat number, e.g. C-101
        flat_no: String,

        /// Month as YYYY-MM (default: current month)
        #[arg(short, long, value_parser = parse_month)]
        month: Option<String>,
    },

    /// Manage registered flats
    Flats {
        #[command(subcommand)]
        action: FlatsAction,
    },
}

#[derive(Subcommand)]
enum FlatsAction {
    /// List registered flats
    List,
    /// Add a flat or replace its contact details
    Add {
        /// Flat number, e.g. D-404
        flat_no: String,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// WhatsApp number (default: the phone number)
        #[arg(long)]
        whatsapp: Option<String>,
    },
}

fn parse_month(value: &str) -> std::result::Result<String, String> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit);
    let month_ok = well_formed && matches!(value[5..].parse::<u8>(), Ok(1..=12));
    if month_ok {
        Ok(value.to_string())
    } else {
        Err(format!("expected YYYY-MM, got {value:?}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    maint_core::telemetry::init_tracing(cli.json, level);

    let config = resolve_config(
        cli.config.as_deref(),
        |key| std::env::var(key).ok(),
        &cli.endpoints,
    )?;
    let collaborators =
        Collaborators::from_config(&config).context("Failed to build service clients")?;
    let orchestrator = Orchestrator::new(
        collaborators.payments.clone(),
        collaborators.messenger.clone(),
        collaborators.audit.clone(),
    );

    match cli.command {
        Commands::Ask { quiet, text } => {
            let agent = build_agent(
                &config,
                &collaborators,
                cli.offline_llm,
                cli.template_explanations,
            )?;
            cmd_ask(&agent, &text.join(" "), quiet).await
        }
        Commands::Status { flat_no, month } => {
            cmd_check(&orchestrator, flat_no, month, false).await
        }
        Commands::Remind { flat_no, month } => {
            cmd_check(&orchestrator, flat_no, month, true).await
        }
        Commands::Flats { action } => match action {
            FlatsAction::List => cmd_flats_list(collaborators.payments.as_ref()).await,
            FlatsAction::Add {
                flat_no,
                owner,
                phone,
                whatsapp,
            } => cmd_flats_add(&orchestrator, flat_no, owner, phone, whatsapp).await,
        },
    }
}

/// Config file (if any), then environment, then command-line flags.
fn resolve_config<F>(path: Option<&Path>, lookup: F, endpoints: &EndpointArgs) -> Result<AgentConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match path {
        Some(path) => AgentConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AgentConfig::default(),
    };
    let mut config = base
        .with_overrides(lookup)
        .context("Invalid environment configuration")?;
    endpoints.apply(&mut config);
    Ok(config)
}

fn build_agent(
    config: &AgentConfig,
    collaborators: &Collaborators,
    offline_llm: bool,
    template_explanations: bool,
) -> Result<MaintenanceAgent> {
    let generator: Arc<dyn maint_collab::TextGenerator> = if offline_llm {
        info!("Using offline keyword generator");
        Arc::new(HeuristicGenerator)
    } else {
        remote_generator(&config.llm).context("Failed to build LLM client")?
    };

    let agent = MaintenanceAgent::new(
        collaborators.payments.clone(),
        collaborators.messenger.clone(),
        collaborators.audit.clone(),
        generator,
    );
    Ok(if template_explanations {
        agent.with_narrator(Arc::new(TemplateNarrator))
    } else {
        agent
    })
}

/// Run a free-text request through the agent
async fn cmd_ask(agent: &MaintenanceAgent, text: &str, quiet: bool) -> Result<()> {
    let response = agent
        .handle_request(text)
        .await
        .context("Request failed")?;

    if let PlanOutcome::Rejected(err) = &response.plan {
        eprintln!("{}", response.explanation);
        eprintln!();
        eprintln!("Planner output:");
        eprintln!("{}", err.raw());
        bail!("No plan for request {}: {}", response.request_id, err);
    }

    println!("{}", response.explanation);
    if !quiet {
        println!();
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

/// Look up a payment and optionally remind
async fn cmd_check(
    orchestrator: &Orchestrator,
    flat_no: String,
    month: Option<String>,
    remind: bool,
) -> Result<()> {
    let month_year = month.unwrap_or_else(current_month_year);
    let plan = if remind {
        Plan::CheckAndRemind {
            flat_no,
            month_year,
        }
    } else {
        Plan::CheckOnly {
            flat_no,
            month_year,
        }
    };

    let bundle = orchestrator.execute(plan).await?;

    println!("{}", TemplateNarrator.summarize(&bundle));
    if let Some(reminder) = &bundle.reminder {
        println!(
            "Reminder {} sent at {}",
            reminder.message_id,
            reminder.sent_at.to_rfc3339()
        );
    }
    if let Some(record) = &bundle.audit {
        println!("Audit log id: {}", record.log_id);
    }
    Ok(())
}

fn format_flat_row(flat: &FlatRecord) -> String {
    format!(
        "{:<8} {:<24} {:<16} {}",
        flat.flat_no,
        flat.owner_name.as_deref().unwrap_or("-"),
        flat.phone_number.as_deref().unwrap_or("-"),
        flat.whatsapp_number.as_deref().unwrap_or("-"),
    )
}

/// List registered flats
async fn cmd_flats_list(payments: &dyn PaymentStore) -> Result<()> {
    let flats = payments.list_flats().await?;

    if flats.is_empty() {
        println!("No flats registered. Add one with 'maint flats add'.");
        return Ok(());
    }

    for flat in &flats {
        println!("{}", format_flat_row(flat));
    }
    Ok(())
}

/// Add or update a flat
async fn cmd_flats_add(
    orchestrator: &Orchestrator,
    flat_no: String,
    owner: Option<String>,
    phone: Option<String>,
    whatsapp: Option<String>,
) -> Result<()> {
    let whatsapp = whatsapp.or_else(|| phone.clone());
    let bundle = orchestrator
        .execute(Plan::AddFlat {
            flat_no,
            owner_name: owner,
            phone_number: phone,
            whatsapp_number: whatsapp,
        })
        .await?;

    let Some(flat) = bundle.flat else {
        bail!("Payments service returned no flat record");
    };
    match flat.flat_id {
        Some(id) => println!("Saved flat {} (id {})", flat.flat_no, id),
        None => println!("Saved flat {}", flat.flat_no),
    }
    Ok(())
}
