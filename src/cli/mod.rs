//! CLI command implementations.
//!
//! - `ironlady dashboard`: counters, charts and program performance
//! - `ironlady participants|programs|enrollments …`: list/show/add/edit/delete
//! - `ironlady milestones|stories …`: list (table or cards)/show/add
//! - `ironlady progress add`, `ironlady assignments add|edit`
//! - `ironlady chat`, `ironlady questions`: coaching assistant
//! - `ironlady health`, `ironlady events`: diagnostics
//! - `ironlady config show|init|set|reset`: configuration management

pub mod prompt;
pub mod render;

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::aggregate::Dashboard;
use crate::analytics::events;
use crate::analytics::reporter::{self, EventReport};
use crate::api::{Backend, Filters, HttpBackend, Resource, endpoints};
use crate::chat::conversation::DEFAULT_QUICK_QUESTIONS;
use crate::chat::{ChatClient, Conversation, Role, SendOutcome};
use crate::config::{self, IronLadyConfig};
use crate::form::{FormData, FormSession, HasForm, SubmitOutcome};
use crate::models::{Enrollment, Entity};
use crate::view::{Confirm, DashboardView, DeleteOutcome, ListView, MutationPolicy, ViewState};
use render::{Card, Tabular};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Resolved settings and transports for one invocation.
pub struct Context {
    pub config: IronLadyConfig,
    pub format: OutputFormat,
    pub backend: HttpBackend,
    pub chat_backend: HttpBackend,
}

impl Context {
    pub fn new(config: IronLadyConfig, format: Option<&str>) -> Self {
        let format = OutputFormat::from_str_opt(Some(format.unwrap_or(&config.display.format)));
        let backend = HttpBackend::new(&config.backend.api_url, config.backend_timeout());
        let chat_backend = HttpBackend::new(&config.chat.url, config.chat_timeout());
        Self {
            config,
            format,
            backend,
            chat_backend,
        }
    }

    fn policy(&self) -> MutationPolicy {
        self.config.backend.mutation_policy
    }

    fn list_view<T: Entity>(&self) -> ListView<'_, T> {
        ListView::new(&self.backend).with_policy(self.policy())
    }
}

/// Parse `key=value` arguments.
pub fn parse_pairs(args: &[String]) -> Result<Filters> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .with_context(|| format!("expected key=value, got '{arg}'"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ironlady dashboard
// ---------------------------------------------------------------------------

pub fn run_dashboard(ctx: &Context) -> Result<()> {
    let mut view = DashboardView::new(&ctx.backend);
    let dashboard = match view.load() {
        ViewState::Loaded(dashboard) => dashboard,
        ViewState::Failed(message) => {
            println!("{} {}", "Could not load the dashboard:".yellow(), message);
            return Ok(());
        }
        ViewState::Loading | ViewState::Empty => return Ok(()),
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(dashboard)?),
        OutputFormat::Csv => render::print_csv(&dashboard.performance),
        OutputFormat::Table => print_dashboard(ctx, dashboard),
    }
    Ok(())
}

fn print_dashboard(ctx: &Context, dashboard: &Dashboard) {
    println!("{}", "Iron Lady Leadership Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));
    render::print_cards(&dashboard.cards);
    println!();

    println!("{}", "Enrollments by Status".bold().cyan());
    render::print_slices(&dashboard.status_slices);
    println!();

    println!("{}", "Enrollments by Program Type".bold().cyan());
    render::print_bars(&dashboard.program_type_series, ctx.config.display.bar_width);
    println!();

    if !dashboard.performance.is_empty() {
        println!("{}", "Average Progress by Program".bold().cyan());
        render::print_progress_bars(&dashboard.performance, ctx.config.display.bar_width);
        println!();
        render::print_tabular(&dashboard.performance);
        println!();
    }

    let recent: Vec<_> = dashboard
        .recent_enrollments
        .iter()
        .take(ctx.config.display.recent_limit)
        .map(Enrollment::cells)
        .collect();
    if !recent.is_empty() {
        render::print_table("Recent Enrollments", &Enrollment::headers(), &recent);
    }
}

// ---------------------------------------------------------------------------
// Entity commands
// ---------------------------------------------------------------------------

/// `list`: one fetch, rendered in the chosen format. A failed fetch prints
/// a warning above an empty table.
pub fn run_list<T: Entity + Tabular>(ctx: &Context, filters: Filters) -> Result<()> {
    let mut view = ctx.list_view::<T>().with_filters(filters);
    view.load();
    print_rows(ctx, view.state())
}

fn print_rows<T: Entity + Tabular>(ctx: &Context, state: &ViewState<Vec<T>>) -> Result<()> {
    if let Some(message) = state.error() {
        eprintln!("{} {}", format!("Could not load {}:", T::RESOURCE).yellow(), message);
    }
    let rows = state.rows();

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => render::print_csv(rows),
        OutputFormat::Table if rows.is_empty() => {
            println!("{}", format!("No {} found.", T::RESOURCE.replace('-', " ")).yellow());
        }
        OutputFormat::Table => render::print_tabular(rows),
    }
    Ok(())
}

/// `show <id>`
pub fn run_show<T: Entity>(ctx: &Context, id: i64) -> Result<()> {
    let entity = Resource::<T>::new(&ctx.backend)
        .get(id)
        .with_context(|| format!("failed to load {} {id}", T::LABEL))?;
    let value = serde_json::to_value(&entity)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        _ => render::print_record(&format!("{} #{id}", capitalize(T::LABEL)), &value),
    }
    Ok(())
}

/// `list --cards`: the table formats are replaced by one card per record.
pub fn run_card_list<T: Entity + Tabular + Card>(ctx: &Context, filters: Filters) -> Result<()> {
    let mut view = ctx.list_view::<T>().with_filters(filters);
    view.load();
    match (ctx.format, view.state().rows()) {
        (OutputFormat::Table, rows) if !rows.is_empty() => {
            render::print_card_list(rows);
            Ok(())
        }
        _ => print_rows(ctx, view.state()),
    }
}

/// `show <id>` for records with long-form text.
pub fn run_show_card<T: Entity + Card>(ctx: &Context, id: i64) -> Result<()> {
    let entity = Resource::<T>::new(&ctx.backend)
        .get(id)
        .with_context(|| format!("failed to load {} {id}", T::LABEL))?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entity)?),
        _ => render::print_card(&entity),
    }
    Ok(())
}

/// `add -f key=value …`
pub fn run_add<T: HasForm + Tabular>(ctx: &Context, fields: Filters) -> Result<()> {
    let mut view = ctx.list_view::<T>();
    if view.policy() == MutationPolicy::Reconcile {
        view.load();
    }

    let mut form = FormSession::<T>::open_create();
    let outcome = form.submit(&mut view, &fields)?;
    report_saved(outcome, T::LABEL);
    print_rows(ctx, view.state())
}

/// `edit <id> -f key=value …`: fields not given keep their current value.
pub fn run_edit<T: HasForm + Tabular>(ctx: &Context, id: i64, fields: Filters) -> Result<()> {
    let mut view = ctx.list_view::<T>();
    let current = view
        .resource()
        .get(id)
        .with_context(|| format!("failed to load {} {id}", T::LABEL))?;
    if view.policy() == MutationPolicy::Reconcile {
        view.load();
    }

    let mut form = FormSession::open_edit(current);
    let outcome = form.submit(&mut view, &fields)?;
    report_saved(outcome, T::LABEL);
    print_rows(ctx, view.state())
}

/// `delete <id>`: asks first unless `yes`.
pub fn run_delete<T: Entity + Tabular>(ctx: &Context, id: i64, yes: bool) -> Result<()> {
    let mut view = ctx.list_view::<T>();
    if view.policy() == MutationPolicy::Reconcile {
        view.load();
    }

    let confirm: &dyn Confirm = if yes {
        &prompt::AssumeYes
    } else {
        &prompt::StdinConfirm
    };

    match view
        .delete(id, confirm)
        .with_context(|| format!("Failed to delete {}", T::LABEL))?
    {
        DeleteOutcome::Declined => {
            println!("{}", "Cancelled.".dimmed());
            Ok(())
        }
        DeleteOutcome::Deleted(_) => {
            println!("{} Deleted {} {id}", "✓".green().bold(), T::LABEL);
            print_rows(ctx, view.state())
        }
    }
}

fn report_saved(outcome: SubmitOutcome, label: &str) {
    let verb = match outcome {
        SubmitOutcome::Created(_) => "Created",
        SubmitOutcome::Updated(_) => "Updated",
    };
    println!("{} {verb} {label}", "✓".green().bold());
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Free-form endpoints
// ---------------------------------------------------------------------------

pub fn run_progress_add(ctx: &Context, fields: Filters) -> Result<()> {
    let data = FormData::from_pairs(&fields);
    let reply = endpoints::record_module_progress(&ctx.backend, &data)
        .context("Failed to record module progress")?;
    println!("{} Module progress recorded", "✓".green().bold());
    print_reply(&reply)
}

pub fn run_assignment_add(ctx: &Context, fields: Filters) -> Result<()> {
    let data = FormData::from_pairs(&fields);
    let reply =
        endpoints::create_assignment(&ctx.backend, &data).context("Failed to save assignment")?;
    println!("{} Created assignment", "✓".green().bold());
    print_reply(&reply)
}

pub fn run_assignment_edit(ctx: &Context, id: i64, fields: Filters) -> Result<()> {
    let data = FormData::from_pairs(&fields);
    let reply = endpoints::update_assignment(&ctx.backend, id, &data)
        .context("Failed to save assignment")?;
    println!("{} Updated assignment {id}", "✓".green().bold());
    print_reply(&reply)
}

fn print_reply(reply: &serde_json::Value) -> Result<()> {
    if !reply.is_null() {
        println!("{}", serde_json::to_string_pretty(reply)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ironlady chat / questions
// ---------------------------------------------------------------------------

/// One-shot when `message` is given, otherwise an interactive session.
pub fn run_chat(ctx: &Context, message: Option<String>) -> Result<()> {
    let client = ChatClient::new(&ctx.chat_backend);
    let mut convo = Conversation::new(&ctx.config.chat.contact_phone);

    if let Some(message) = message {
        convo.send(&client, &message);
        if let Some(reply) = convo.last() {
            println!("{}", reply.content);
        }
        return Ok(());
    }

    println!("{}", "Iron Lady Assistant".bold().red());
    println!("{}", "Elevating Women to the TOP 🚀".dimmed());
    println!();
    print_message(Role::Assistant, &convo.messages()[0].content);

    let mut chips = quick_question_chips(&client);
    print_chips(&chips);

    while let Some(line) = prompt::read_line(&format!("{} ", "you ›".bold())) {
        let input = line.trim();
        if matches!(input, "/quit" | "/exit") {
            break;
        }
        let input = match pick_chip(input, &chips) {
            Some(Ok(chip)) => chip.to_string(),
            Some(Err(n)) => {
                println!("{}", format!("No suggestion #{n}.").dimmed());
                continue;
            }
            None => line.clone(),
        };

        if convo.send(&client, &input) == SendOutcome::Ignored {
            continue;
        }
        if let Some(reply) = convo.last() {
            print_message(reply.role, &reply.content);
        }
        if !convo.suggestions().is_empty() {
            chips = convo.suggestions().to_vec();
            print_chips(&chips);
        }
    }
    Ok(())
}

pub fn run_questions(ctx: &Context) -> Result<()> {
    let client = ChatClient::new(&ctx.chat_backend);
    let questions = client.quick_questions();
    let builtin = questions.is_empty();
    let questions = if builtin {
        DEFAULT_QUICK_QUESTIONS.iter().map(|q| q.to_string()).collect()
    } else {
        questions
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&questions)?),
        _ => {
            println!("{}", "Quick Questions".bold().cyan());
            for (i, q) in questions.iter().enumerate() {
                println!("  {}. {q}", i + 1);
            }
            if builtin {
                println!("  {}", "(built-in; chat server offered none)".dimmed());
            }
        }
    }
    Ok(())
}

/// `#N` picks the Nth suggestion. `Err(N)` when there is no such chip,
/// `None` when the input is ordinary text.
fn pick_chip<'a>(input: &str, chips: &'a [String]) -> Option<Result<&'a str, usize>> {
    let n = input.strip_prefix('#')?.trim().parse::<usize>().ok()?;
    Some(
        n.checked_sub(1)
            .and_then(|i| chips.get(i))
            .map(String::as_str)
            .ok_or(n),
    )
}

fn quick_question_chips(client: &ChatClient<'_>) -> Vec<String> {
    let questions = client.quick_questions();
    if questions.is_empty() {
        DEFAULT_QUICK_QUESTIONS.iter().map(|q| q.to_string()).collect()
    } else {
        questions
    }
}

fn print_chips(chips: &[String]) {
    println!("{}", "Quick questions (type #1, #2, …):".dimmed());
    for (i, chip) in chips.iter().enumerate() {
        println!("  {} {chip}", format!("#{}", i + 1).red());
    }
    println!();
}

fn print_message(role: Role, content: &str) {
    match role {
        Role::Assistant => println!("{} {content}\n", "iron lady ›".red().bold()),
        Role::User => println!("{} {content}\n", "you ›".bold()),
    }
}

// ---------------------------------------------------------------------------
// ironlady health
// ---------------------------------------------------------------------------

/// Check config files, both backends and the event log.
pub fn run_health(ctx: &Context) -> Result<()> {
    println!("{}", "ironlady Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.ironlady/config.toml found"
        } else {
            "not found (run `ironlady config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".ironlady.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item(
        "Mutation policy",
        true,
        &ctx.config.backend.mutation_policy.to_string(),
    );

    let admin = endpoints::dashboard_stats(&ctx.backend);
    print_health_item(
        "Admin backend",
        admin.is_ok(),
        &match &admin {
            Ok(_) => format!("reachable at {}", ctx.backend.base_url()),
            Err(e) => e.to_string(),
        },
    );

    let chat_ok = ChatClient::new(&ctx.chat_backend).is_healthy();
    print_health_item(
        "Chat backend",
        chat_ok,
        &if chat_ok {
            format!("reachable at {}", ctx.chat_backend.base_url())
        } else {
            format!("not reachable at {}", ctx.chat_backend.base_url())
        },
    );

    match ctx.config.event_log_path() {
        Some(path) => {
            let exists = path.exists();
            let detail = if exists {
                format!("{} entries", events::read_events(&path).len())
            } else {
                "no events yet".to_string()
            };
            print_health_item("Event log", true, &detail);
        }
        None => print_health_item("Event log", false, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// ironlady events
// ---------------------------------------------------------------------------

pub fn run_events(ctx: &Context, days: Option<u32>, latest: usize) -> Result<()> {
    let report = reporter::compute_report(days, latest);

    if report.total == 0 {
        println!("{}", "No failure events recorded.".green());
        return Ok(());
    }

    match ctx.format {
        OutputFormat::Json => print_events_json(&report)?,
        OutputFormat::Csv => print_events_csv(&report),
        OutputFormat::Table => print_events_table(&report),
    }
    Ok(())
}

fn print_events_table(report: &EventReport) {
    println!("{}", "Failure Events".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "Total events:".bold(), report.total);
    println!();

    println!("{}", "By Kind".bold().cyan());
    for point in &report.by_kind {
        println!("  {:<24} {:>6}", point.name, point.value);
    }
    println!();

    println!("{}", "By Target".bold().cyan());
    for point in report.by_target.iter().take(10) {
        println!("  {:<32} {:>6}", render::truncate(&point.name, 32), point.value);
    }
    println!();

    println!("{}", "Latest".bold().cyan());
    for event in &report.latest {
        println!(
            "  {} {:<22} {:<24} {}",
            event.timestamp.get(..19).unwrap_or(&event.timestamp).dimmed(),
            event.kind.as_str(),
            render::truncate(&event.target, 24),
            render::truncate(&event.message, 60),
        );
    }
}

fn print_events_json(report: &EventReport) -> Result<()> {
    let value = serde_json::json!({
        "total": report.total,
        "by_kind": report.by_kind,
        "by_target": report.by_target,
        "latest": report.latest,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_events_csv(report: &EventReport) {
    println!("timestamp,kind,target,message");
    for e in &report.latest {
        println!(
            "{},{},{},{}",
            e.timestamp,
            e.kind.as_str(),
            render::csv_escape(&e.target),
            render::csv_escape(&e.message),
        );
    }
}

// ---------------------------------------------------------------------------
// ironlady config show | init | set | reset
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective ironlady Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.ironlady/config.toml", global_exists);
    print_source(".ironlady.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "IRONLADY_* environment variables".dimmed()
    );
    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
