//! ResumeForge CLI
//!
//! Command-line interface for ResumeForge - edit a resume and generate
//! content with AI.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use resumeforge_core::{Config, DeviceIdentity, EducationField, ExperienceField, ResumeStore, Workflow};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "resumeforge")]
#[command(about = "ResumeForge - AI-assisted resume builder")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the whole resume
    Show,
    /// Edit personal info
    Personal {
        #[command(subcommand)]
        command: PersonalCommands,
    },
    /// Manage work experience
    #[command(alias = "exp")]
    Experience {
        #[command(subcommand)]
        command: ExperienceCommands,
    },
    /// Manage education
    #[command(alias = "edu")]
    Education {
        #[command(subcommand)]
        command: EducationCommands,
    },
    /// Manage skills
    Skills {
        #[command(subcommand)]
        command: SkillsCommands,
    },
    /// Erase the whole resume
    Reset,
    /// Generate a resume section (experience, summary, skills, improve)
    Generate {
        section: String,
        /// Extra context for the generator (e.g. text to improve)
        #[arg(short, long)]
        context: Option<String>,
        /// Job title (defaults to the resume title)
        #[arg(long)]
        job_title: Option<String>,
        /// Output language (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Generate a cover letter
    CoverLetter {
        /// Company to address
        #[arg(long)]
        company: String,
        /// Job title (defaults to the resume title)
        #[arg(long)]
        job_title: Option<String>,
        /// Output language (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Show remaining generation tokens
    Tokens,
    /// List pricing plans
    Plans,
    /// List purchasable products
    Products,
    /// Buy a plan (starter, pro, unlimited)
    Checkout {
        plan: String,
        /// Print the checkout link instead of opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Device identity
    Device {
        #[command(subcommand)]
        command: Option<DeviceCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PersonalCommands {
    /// Set a field (name, title, email, phone, location, website, summary)
    Set {
        field: String,
        /// New value (opens editor if not provided)
        value: Option<String>,
    },
}

/// Optional field values for a new experience entry
#[derive(Args)]
struct ExperienceFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl ExperienceFields {
    fn into_pairs(self) -> Vec<(ExperienceField, String)> {
        [
            (ExperienceField::Title, self.title),
            (ExperienceField::Company, self.company),
            (ExperienceField::StartDate, self.start_date),
            (ExperienceField::EndDate, self.end_date),
            (ExperienceField::Description, self.description),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Subcommand)]
enum ExperienceCommands {
    /// Add an experience entry
    Add {
        #[command(flatten)]
        fields: ExperienceFields,
    },
    /// Set a field (title, company, startDate, endDate, description)
    Set {
        /// Entry ID (full UUID or prefix)
        id: String,
        field: String,
        /// New value (opens editor if not provided)
        value: Option<String>,
    },
    /// Delete an experience entry
    #[command(alias = "delete")]
    Rm {
        /// Entry ID (full UUID or prefix)
        id: String,
    },
    /// List experience entries
    #[command(alias = "ls")]
    List,
}

/// Optional field values for a new education entry
#[derive(Args)]
struct EducationFields {
    #[arg(long)]
    degree: Option<String>,
    #[arg(long)]
    school: Option<String>,
    #[arg(long)]
    field: Option<String>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    end_date: Option<String>,
}

impl EducationFields {
    fn into_pairs(self) -> Vec<(EducationField, String)> {
        [
            (EducationField::Degree, self.degree),
            (EducationField::School, self.school),
            (EducationField::Field, self.field),
            (EducationField::StartDate, self.start_date),
            (EducationField::EndDate, self.end_date),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Subcommand)]
enum EducationCommands {
    /// Add an education entry
    Add {
        #[command(flatten)]
        fields: EducationFields,
    },
    /// Set a field (degree, school, field, startDate, endDate)
    Set {
        /// Entry ID (full UUID or prefix)
        id: String,
        field: String,
        /// New value (opens editor if not provided)
        value: Option<String>,
    },
    /// Delete an education entry
    #[command(alias = "delete")]
    Rm {
        /// Entry ID (full UUID or prefix)
        id: String,
    },
    /// List education entries
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
enum SkillsCommands {
    /// Replace all skills with a comma-separated list
    Set { skills: String },
    /// List skills
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Clone)]
enum DeviceCommands {
    /// Show the device identifier
    Show,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, app_url, language, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work even when the config file is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config =
        Config::load_with_cli_override(cli.config.as_ref()).context("Failed to load configuration")?;
    init_logging(&config);

    match cli.command {
        Commands::Show => commands::resume::show(&ResumeStore::open(&config), &output),
        Commands::Personal { command } => handle_personal_command(command, &config, &output),
        Commands::Experience { command } => handle_experience_command(command, &config, &output),
        Commands::Education { command } => handle_education_command(command, &config, &output),
        Commands::Skills { command } => handle_skills_command(command, &config, &output),
        Commands::Reset => commands::resume::reset(&mut ResumeStore::open(&config), &output),
        Commands::Device { command } => handle_device_command(command, &config, &output).await,
        Commands::Plans => commands::billing::plans(&output),
        Commands::Config { .. } => unreachable!(), // Handled above
        network => handle_network_command(network, &config, &output).await,
    }
}

fn handle_personal_command(command: PersonalCommands, config: &Config, output: &Output) -> Result<()> {
    let mut store = ResumeStore::open(config);
    match command {
        PersonalCommands::Set { field, value } => {
            commands::resume::personal_set(&mut store, field, value, output)
        }
    }
}

fn handle_experience_command(
    command: ExperienceCommands,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let mut store = ResumeStore::open(config);
    match command {
        ExperienceCommands::Add { fields } => {
            commands::resume::experience_add(&mut store, fields.into_pairs(), output)
        }
        ExperienceCommands::Set { id, field, value } => {
            commands::resume::experience_set(&mut store, id, field, value, output)
        }
        ExperienceCommands::Rm { id } => commands::resume::experience_remove(&mut store, id, output),
        ExperienceCommands::List => commands::resume::experience_list(&store, output),
    }
}

fn handle_education_command(
    command: EducationCommands,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let mut store = ResumeStore::open(config);
    match command {
        EducationCommands::Add { fields } => {
            commands::resume::education_add(&mut store, fields.into_pairs(), output)
        }
        EducationCommands::Set { id, field, value } => {
            commands::resume::education_set(&mut store, id, field, value, output)
        }
        EducationCommands::Rm { id } => commands::resume::education_remove(&mut store, id, output),
        EducationCommands::List => commands::resume::education_list(&store, output),
    }
}

fn handle_skills_command(command: SkillsCommands, config: &Config, output: &Output) -> Result<()> {
    let mut store = ResumeStore::open(config);
    match command {
        SkillsCommands::Set { skills } => commands::resume::skills_set(&mut store, skills, output),
        SkillsCommands::List => commands::resume::skills_list(&store, output),
    }
}

async fn handle_device_command(
    command: Option<DeviceCommands>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let identity = DeviceIdentity::new(config);
    match command {
        Some(DeviceCommands::Show) | None => commands::device::show(&identity, output).await,
    }
}

/// Commands that talk to the API; Ctrl-C cancels them
async fn handle_network_command(command: Commands, config: &Config, output: &Output) -> Result<()> {
    let workflow = Workflow::from_config(config).context("Failed to create HTTP client")?;
    let cancel = cancel_on_ctrl_c();

    match command {
        Commands::Generate {
            section,
            context,
            job_title,
            language,
        } => {
            commands::generate::section(&workflow, section, context, job_title, language, &cancel, output)
                .await
        }
        Commands::CoverLetter {
            company,
            job_title,
            language,
        } => commands::generate::cover_letter(&workflow, company, job_title, language, &cancel, output).await,
        Commands::Tokens => commands::billing::tokens(&workflow, &cancel, output).await,
        Commands::Products => commands::billing::products(&workflow, &cancel, output).await,
        Commands::Checkout { plan, no_open } => {
            commands::billing::checkout(&workflow, plan, no_open, &cancel, output).await
        }
        _ => unreachable!(), // Local commands are dispatched in main
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

/// Open the log file for appending, creating its directory on first use
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

/// Initialize file logging
///
/// Only initializes if RESUMEFORGE_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("RESUMEFORGE_LOG") else {
        return;
    };

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("debug.log"));

    let log_file = match open_log_file(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "resumeforge_core={},resumeforge_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
