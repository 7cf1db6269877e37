use anyhow::Result;
use clap::{Parser, Subcommand};

use ironlady::analytics::events;
use ironlady::cli::{self, Context};
use ironlady::config;
use ironlady::models::{Enrollment, Milestone, Participant, Program, TransformationStory};

#[derive(Debug, Parser)]
#[command(name = "ironlady")]
#[command(about = "Iron Lady leadership program tracker and coaching assistant")]
struct App {
    /// Output format: table (default), json, csv
    #[arg(long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Headline counters, enrollment charts and program performance
    Dashboard,
    /// Manage participants
    Participants {
        #[command(subcommand)]
        action: CrudAction,
    },
    /// Manage programs
    Programs {
        #[command(subcommand)]
        action: CrudAction,
    },
    /// Manage enrollments
    Enrollments {
        #[command(subcommand)]
        action: CrudAction,
    },
    /// Participant milestones
    Milestones {
        #[command(subcommand)]
        action: AppendAction,
    },
    /// Transformation stories
    Stories {
        #[command(subcommand)]
        action: AppendAction,
    },
    /// Record module progress for an enrollment
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
    /// Assignment submissions
    Assignments {
        #[command(subcommand)]
        action: AssignmentAction,
    },
    /// Talk to the coaching assistant (interactive without a message)
    Chat {
        /// Send one message and print the reply
        message: Option<String>,
    },
    /// List the assistant's quick questions
    Questions,
    /// Check config files, both backends and the event log
    Health,
    /// Summarize recorded failure events
    Events {
        /// Only include the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Number of recent events to show
        #[arg(long, default_value = "10")]
        latest: usize,
    },
    /// Manage ironlady configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum CrudAction {
    /// List records
    List {
        /// Query filter, e.g. --filter status=Active
        #[arg(long = "filter", short = 'F')]
        filters: Vec<String>,
    },
    /// Show one record
    Show { id: i64 },
    /// Create a record from key=value fields
    Add {
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
    /// Update a record; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
    /// Delete a record after confirmation
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum AppendAction {
    /// List records
    List {
        #[arg(long = "filter", short = 'F')]
        filters: Vec<String>,
        /// One card per record with the full text
        #[arg(long)]
        cards: bool,
    },
    /// Show one record as a card
    Show { id: i64 },
    /// Create a record from key=value fields
    Add {
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ProgressAction {
    /// Record progress from key=value fields
    Add {
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum AssignmentAction {
    /// Submit an assignment
    Add {
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
    /// Update an assignment (e.g. grade it)
    Edit {
        id: i64,
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.ironlady/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `backend.api_url http://host/api`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    let cfg = config::load();
    events::init(cfg.event_log_path());
    colored::control::set_override(cfg.display.color);

    let ctx = Context::new(cfg, app.format.as_deref());

    match app.command {
        Commands::Dashboard => cli::run_dashboard(&ctx),
        Commands::Participants { action } => run_crud::<Participant>(&ctx, action),
        Commands::Programs { action } => run_crud::<Program>(&ctx, action),
        Commands::Enrollments { action } => run_crud::<Enrollment>(&ctx, action),
        Commands::Milestones { action } => run_append::<Milestone>(&ctx, action),
        Commands::Stories { action } => run_append::<TransformationStory>(&ctx, action),
        Commands::Progress {
            action: ProgressAction::Add { fields },
        } => cli::run_progress_add(&ctx, cli::parse_pairs(&fields)?),
        Commands::Assignments { action } => match action {
            AssignmentAction::Add { fields } => {
                cli::run_assignment_add(&ctx, cli::parse_pairs(&fields)?)
            }
            AssignmentAction::Edit { id, fields } => {
                cli::run_assignment_edit(&ctx, id, cli::parse_pairs(&fields)?)
            }
        },
        Commands::Chat { message } => cli::run_chat(&ctx, message),
        Commands::Questions => cli::run_questions(&ctx),
        Commands::Health => cli::run_health(&ctx),
        Commands::Events { days, latest } => cli::run_events(&ctx, days, latest),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

fn run_crud<T>(ctx: &Context, action: CrudAction) -> Result<()>
where
    T: ironlady::form::HasForm + cli::render::Tabular,
{
    match action {
        CrudAction::List { filters } => cli::run_list::<T>(ctx, cli::parse_pairs(&filters)?),
        CrudAction::Show { id } => cli::run_show::<T>(ctx, id),
        CrudAction::Add { fields } => cli::run_add::<T>(ctx, cli::parse_pairs(&fields)?),
        CrudAction::Edit { id, fields } => cli::run_edit::<T>(ctx, id, cli::parse_pairs(&fields)?),
        CrudAction::Delete { id, yes } => cli::run_delete::<T>(ctx, id, yes),
    }
}

fn run_append<T>(ctx: &Context, action: AppendAction) -> Result<()>
where
    T: ironlady::form::HasForm + cli::render::Tabular + cli::render::Card,
{
    match action {
        AppendAction::List { filters, cards } => {
            let filters = cli::parse_pairs(&filters)?;
            if cards {
                cli::run_card_list::<T>(ctx, filters)
            } else {
                cli::run_list::<T>(ctx, filters)
            }
        }
        AppendAction::Show { id } => cli::run_show_card::<T>(ctx, id),
        AppendAction::Add { fields } => cli::run_add::<T>(ctx, cli::parse_pairs(&fields)?),
    }
}
