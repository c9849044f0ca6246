//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contenthub_client::{
    ApiClient, CryptoNewsClient, NewsDistributorClient, ProjectStore, StageExecutor,
};
use contenthub_core::content;
use contenthub_core::vocabulary::{
    dedup_vocabulary, filter_vocabulary, group_articles_by_day, parse_selected_date,
};
use contenthub_core::{
    Activity, ActivityReporter, DashboardLister, SaveOutcome, StageOutcome, Workshop,
};
use contenthub_shared::{
    AppConfig, ContentHubError, ProjectId, ProjectOrigin, init_config, load_config,
    resolve_api_root,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContentHub — turn partner articles into translated, share-ready content.
#[derive(Parser)]
#[command(
    name = "contenthub",
    version,
    about = "Create, translate and publish partner content through the ContentHub backend.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Backend origin; overrides the env var and config file.
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Partner content projects.
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// RSS articles and vocabulary extraction.
    News {
        #[command(subcommand)]
        action: NewsAction,
    },

    /// Crypto headline feed.
    Crypto {
        #[command(subcommand)]
        action: CryptoAction,
    },

    /// Check that the backend is reachable.
    Health,

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ProjectsAction {
    /// List all projects with their progress badges.
    List,

    /// Create a project from a URL or from text.
    Create {
        /// Article URL to scrape.
        #[arg(long)]
        url: Option<String>,

        /// Raw text to use as the original content.
        #[arg(long)]
        text: Option<String>,

        /// Read the raw text from a file.
        #[arg(long)]
        text_file: Option<PathBuf>,
    },

    /// Show one project.
    Show {
        id: String,

        /// Print the current text as Markdown.
        #[arg(long)]
        markdown: bool,
    },

    /// Translate the original content.
    Translate {
        id: String,

        /// Extra instructions appended to the default translation prompt.
        #[arg(long)]
        preset: Option<String>,
    },

    /// Generate social media posts.
    Social {
        id: String,

        /// Extra instructions appended to the default social prompt.
        #[arg(long)]
        preset: Option<String>,

        /// Which text to generate from.
        #[arg(long, value_enum, default_value = "current")]
        from: SocialSource,
    },

    /// Replace the translated content with edited text.
    Save {
        id: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        text_file: Option<PathBuf>,
    },

    /// Print the current text as plain text for pasting.
    Copy { id: String },

    /// Delete a project.
    Delete { id: String },
}

/// Input for social generation.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum SocialSource {
    Original,
    Current,
}

#[derive(Subcommand)]
pub(crate) enum NewsAction {
    /// Poll the RSS feed now.
    Refresh,
    /// List days that have articles.
    Dates,
    /// List articles grouped by day.
    Articles {
        /// Only this day (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },
    /// Extract vocabulary from one day's articles (or all).
    Extract {
        /// Day to extract from (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the vocabulary store.
    Vocab {
        /// Only words or definitions containing this term.
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the vocabulary size.
    Count,
    /// Delete every vocabulary entry.
    Reset,
}

#[derive(Subcommand)]
pub(crate) enum CryptoAction {
    /// Print the cached headlines.
    List,
    /// Crawl fresh headlines.
    Crawl,
    /// Delete one headline.
    Delete { id: String },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contenthub=info",
        1 => "contenthub=debug",
        _ => "contenthub=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Loaded config plus a client for the resolved backend.
struct Backend {
    config: AppConfig,
    api: ApiClient,
}

impl Backend {
    fn connect(backend_url: Option<&str>) -> Result<Self> {
        let config = load_config()?;
        let api = ApiClient::from_config(&config, backend_url)?;
        Ok(Self { config, api })
    }

    fn store(&self) -> ProjectStore {
        ProjectStore::new(self.api.clone())
    }

    async fn open(&self, id: &str) -> Result<Workshop> {
        let workshop = Workshop::open(
            self.store(),
            StageExecutor::new(self.api.clone()),
            &ProjectId::from(id),
            Arc::new(CliProgress::new()),
        )
        .await?;
        Ok(workshop)
    }

    /// Preset from the flag, falling back to the configured default.
    fn preset(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.config.workshop.default_custom_preset.clone())
    }
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let backend_url = cli.backend_url.as_deref();
    match cli.command {
        Command::Projects { action } => {
            let backend = Backend::connect(backend_url)?;
            run_projects(&backend, action).await
        }
        Command::News { action } => {
            let backend = Backend::connect(backend_url)?;
            run_news(NewsDistributorClient::new(backend.api), action).await
        }
        Command::Crypto { action } => {
            let backend = Backend::connect(backend_url)?;
            run_crypto(CryptoNewsClient::new(backend.api), action).await
        }
        Command::Health => cmd_health(&Backend::connect(backend_url)?).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(backend_url),
        },
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

async fn run_projects(backend: &Backend, action: ProjectsAction) -> Result<()> {
    match action {
        ProjectsAction::List => cmd_projects_list(backend).await,
        ProjectsAction::Create {
            url,
            text,
            text_file,
        } => {
            let text = text_input(text, text_file.as_deref())?;
            cmd_projects_create(backend, url.as_deref(), text.as_deref()).await
        }
        ProjectsAction::Show { id, markdown } => cmd_projects_show(backend, &id, markdown).await,
        ProjectsAction::Translate { id, preset } => {
            let preset = backend.preset(preset);
            let workshop = backend.open(&id).await?;
            let original = workshop.authoritative().original_content;
            let outcome = workshop.translate(&original, preset.as_deref()).await?;
            print_stage_outcome(outcome);
            println!("{}", workshop.working_text());
            Ok(())
        }
        ProjectsAction::Social { id, preset, from } => {
            let preset = backend.preset(preset);
            let workshop = backend.open(&id).await?;
            let source = match from {
                SocialSource::Original => workshop.authoritative().original_content,
                SocialSource::Current => workshop.working_text(),
            };
            let outcome = workshop.generate_social(&source, preset.as_deref()).await?;
            print_stage_outcome(outcome);
            print_social(&workshop);
            Ok(())
        }
        ProjectsAction::Save {
            id,
            text,
            text_file,
        } => {
            let text = text_input(text, text_file.as_deref())?
                .ok_or_else(|| eyre!("provide the edited text with --text or --text-file"))?;
            let workshop = backend.open(&id).await?;
            workshop.edit(text)?;
            match workshop.save().await? {
                SaveOutcome::Saved => println!("Saved."),
                SaveOutcome::NothingToSave => println!("Text unchanged; nothing to save."),
            }
            Ok(())
        }
        ProjectsAction::Copy { id } => {
            let workshop = backend.open(&id).await?;
            println!("{}", workshop.plain_text());
            Ok(())
        }
        ProjectsAction::Delete { id } => {
            let workshop = backend.open(&id).await;
            // A project that is already gone still counts as deleted.
            let existed = match workshop {
                Ok(workshop) => workshop.delete().await?,
                Err(e) if is_not_found(&e) => false,
                Err(e) => return Err(e),
            };
            if existed {
                println!("Deleted project {id}.");
            } else {
                println!("Project {id} was already deleted.");
            }
            Ok(())
        }
    }
}

fn is_not_found(report: &color_eyre::Report) -> bool {
    report
        .downcast_ref::<ContentHubError>()
        .is_some_and(ContentHubError::is_not_found)
}

/// `--text` wins over `--text-file` only when one is given; both is an error.
fn text_input(text: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    match (text, file) {
        (Some(_), Some(_)) => Err(eyre!("use either --text or --text-file, not both")),
        (Some(text), None) => Ok(Some(text)),
        (None, Some(path)) => {
            let content =
                std::fs::read_to_string(path).map_err(|e| ContentHubError::io(path, e))?;
            Ok(Some(content))
        }
        (None, None) => Ok(None),
    }
}

async fn cmd_projects_list(backend: &Backend) -> Result<()> {
    let entries = DashboardLister::new(backend.store()).load().await?;
    if entries.is_empty() {
        println!("No projects yet. Create one with `contenthub projects create`.");
        return Ok(());
    }

    for entry in &entries {
        let translated = if entry.badges.translated { "T" } else { "-" };
        let social = if entry.badges.social_ready { "S" } else { "-" };
        println!(
            "[{translated}{social}] {}  {}  {}  ({})",
            entry.id,
            entry.created_at.format("%Y-%m-%d"),
            entry.title,
            entry.origin_label
        );
    }
    println!();
    println!("  {} project(s)  T = translated, S = social ready", entries.len());
    Ok(())
}

async fn cmd_projects_create(
    backend: &Backend,
    url: Option<&str>,
    text: Option<&str>,
) -> Result<()> {
    let origin = ProjectOrigin::from_inputs(url, text)?;
    info!(from_url = origin.is_url(), "creating project");

    let workshop = Workshop::create(
        backend.store(),
        StageExecutor::new(backend.api.clone()),
        &origin,
        Arc::new(CliProgress::new()),
    )
    .await?;
    let project = workshop.authoritative();

    println!();
    println!("  Project created!");
    println!("  ID:     {}", project.id);
    println!("  Title:  {}", project.title);
    println!("  Images: {}", project.images.len());
    println!();
    Ok(())
}

async fn cmd_projects_show(backend: &Backend, id: &str, markdown: bool) -> Result<()> {
    let project = backend.store().get(&ProjectId::from(id)).await?;

    if markdown {
        println!("{}", content::to_markdown(project.current_text())?);
        return Ok(());
    }

    println!("  ID:      {}", project.id);
    println!("  Title:   {}", project.title);
    println!(
        "  Source:  {}",
        project.source_url.as_deref().unwrap_or(contenthub_core::dashboard::MANUAL_ENTRY)
    );
    println!("  Created: {}", project.created_at.to_rfc3339());
    if let Some(updated) = project.updated_at {
        println!("  Updated: {}", updated.to_rfc3339());
    }
    for image in &project.images {
        println!("  Image:   {image}");
    }
    println!();
    match &project.translated_content {
        Some(text) => println!("{}", content::to_plain_text(text)),
        None => println!("{}", content::to_plain_text(&project.original_content)),
    }
    if let Some(social) = &project.social_content {
        println!();
        print_social_fields(
            social.facebook.as_deref(),
            social.twitter.as_deref(),
            social.hashtags.as_deref(),
        );
    }
    Ok(())
}

fn print_stage_outcome(outcome: StageOutcome) {
    match outcome {
        StageOutcome::Applied => {}
        StageOutcome::EditPreserved => {
            eprintln!("Note: an unsaved edit is still shown instead of the new translation.")
        }
        StageOutcome::AlreadyRunning => eprintln!("That stage is already running."),
    }
}

fn print_social(workshop: &Workshop) {
    if let Some(social) = workshop.working_social() {
        print_social_fields(
            social.facebook.as_deref(),
            social.twitter.as_deref(),
            social.hashtags.as_deref(),
        );
    }
}

fn print_social_fields(facebook: Option<&str>, twitter: Option<&str>, hashtags: Option<&str>) {
    for (label, value) in [("Facebook", facebook), ("Twitter", twitter), ("Hashtags", hashtags)] {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            println!("--- {label} ---");
            println!("{value}");
        }
    }
}

// ---------------------------------------------------------------------------
// News Distributor
// ---------------------------------------------------------------------------

async fn run_news(client: NewsDistributorClient, action: NewsAction) -> Result<()> {
    match action {
        NewsAction::Refresh => {
            let spinner = spinner("Fetching RSS feed...");
            let report = client.refresh_rss().await;
            spinner.finish_and_clear();
            let report = report?;
            println!(
                "Saved {} new, updated {}; {} articles stored.",
                report.articles_saved, report.articles_updated, report.total_articles
            );
        }
        NewsAction::Dates => {
            for date in client.available_dates().await? {
                println!("{date}");
            }
        }
        NewsAction::Articles { date } => {
            let selected = date.as_deref().map(parse_selected_date).transpose()?;
            let grouped = group_articles_by_day(client.articles().await?);
            for (day, articles) in grouped.newest_first() {
                if selected.is_some_and(|s| s != *day) {
                    continue;
                }
                println!("== {day} ({} articles)", articles.len());
                for article in articles {
                    println!("  {}  {}", article.title, article.link);
                }
            }
            if selected.is_none() && !grouped.undated.is_empty() {
                println!("== undated ({} articles)", grouped.undated.len());
                for article in &grouped.undated {
                    println!("  {}  {}", article.title, article.link);
                }
            }
        }
        NewsAction::Extract { date } => {
            if let Some(date) = date.as_deref() {
                parse_selected_date(date)?;
            }
            let spinner = spinner("Extracting vocabulary...");
            let report = client.auto_extract(date.as_deref()).await;
            spinner.finish_and_clear();
            let report = report?;
            println!(
                "Processed {}/{} articles: {} words extracted, {} new ({} total).",
                report.processed_articles,
                report.total_articles,
                report.total_vocab_extracted,
                report.new_vocab_count,
                report.total_vocab_count
            );
            if !report.output_content.is_empty() {
                println!();
                println!("{}", report.output_content);
            }
        }
        NewsAction::Vocab { search } => {
            let entries = dedup_vocabulary(client.vocabulary().await?);
            let matches = filter_vocabulary(&entries, search.as_deref().unwrap_or_default());
            for entry in &matches {
                match &entry.source_article_title {
                    Some(source) => println!(
                        "{}: {}  ({source})",
                        entry.original_word, entry.vietnamese_definition
                    ),
                    None => println!("{}: {}", entry.original_word, entry.vietnamese_definition),
                }
            }
            println!();
            println!("  {} of {} words", matches.len(), entries.len());
        }
        NewsAction::Count => println!("{}", client.vocabulary_count().await?),
        NewsAction::Reset => {
            let deleted = client.reset_vocabulary().await?;
            println!("Deleted {deleted} vocabulary entries.");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Crypto news
// ---------------------------------------------------------------------------

async fn run_crypto(client: CryptoNewsClient, action: CryptoAction) -> Result<()> {
    let news = match action {
        CryptoAction::List => client.cached().await?,
        CryptoAction::Crawl => {
            let spinner = spinner("Crawling crypto news...");
            let news = client.crawl().await;
            spinner.finish_and_clear();
            news?
        }
        CryptoAction::Delete { id } => {
            client.delete(&id).await?;
            println!("Deleted {id}.");
            return Ok(());
        }
    };

    for item in &news {
        let votes = item.votes_display().unwrap_or_else(|| "0".into());
        let source = item.source.as_deref().unwrap_or("unknown");
        println!("[{votes:>4}] {}  ({source})", item.title);
        println!("       {}  id={}", item.url, item.id);
    }
    println!();
    println!("  {} headline(s)", news.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Misc commands
// ---------------------------------------------------------------------------

async fn cmd_health(backend: &Backend) -> Result<()> {
    let message = backend.api.health().await?;
    println!("{} -> {message}", backend.api.root());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(backend_url: Option<&str>) -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    println!("# resolved API root: {}", resolve_api_root(&config, backend_url)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Workshop notices rendered as one spinner per in-flight action.
struct CliProgress {
    active: Mutex<Vec<(Activity, ProgressBar)>>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            active: Mutex::new(Vec::new()),
        }
    }

    fn take(&self, activity: Activity) -> Option<ProgressBar> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let index = active.iter().position(|(a, _)| *a == activity)?;
        Some(active.swap_remove(index).1)
    }
}

impl ActivityReporter for CliProgress {
    fn started(&self, activity: Activity) {
        let bar = spinner(&format!("{activity}..."));
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((activity, bar));
    }

    fn succeeded(&self, activity: Activity, message: &str) {
        if let Some(bar) = self.take(activity) {
            bar.finish_and_clear();
        }
        eprintln!("✓ {message}");
    }

    fn failed(&self, activity: Activity, error: &ContentHubError) {
        if let Some(bar) = self.take(activity) {
            bar.finish_and_clear();
        }
        eprintln!("✗ {activity} failed: {error}");
    }
}
