use clap::{Parser, Subcommand, ValueEnum};
use memoria::draft::{IdentityField, PageDraft, PageEditor};
use memoria::settings::SettingUpdate;
use memoria::template::{TemplateId, list_templates};
use memoria::{config, output, render, slug};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "memoria")]
#[command(about = "Compose and preview memorial pages")]
#[command(long_about = "\
Compose and preview memorial pages

A page draft is a JSON document holding who the page remembers, its photos
and videos, and its appearance. Drafts start from a template:

  classic   white, serif, timeline
  modern    dark, sans, grid
  minimal   light grey, grid, no dates
  elegant   dark, serif, carousel, no comments

Settings can be changed afterwards with key=value pairs:

  memoria set page.json layout=grid accent_color=#c0392b show_dates=false

Run 'memoria gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    /// Editor preview
    Full,
    /// Compact sidebar preview
    Sidebar,
    /// Standalone public page
    Public,
}

#[derive(Subcommand)]
enum Command {
    /// List the template catalog
    Templates,
    /// Generate a public link slug for a name
    Slug { name: String },
    /// Create a new draft from a template
    New {
        /// Name of the person the page remembers
        #[arg(long)]
        name: String,
        /// Owning user id
        #[arg(long)]
        owner: String,
        #[arg(long, default_value = "classic")]
        template: TemplateId,
        /// Write the draft here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply key=value setting updates to a draft file
    Set {
        draft: PathBuf,
        #[arg(required = true)]
        updates: Vec<String>,
    },
    /// Summarize a draft and report whether it can be published
    Check { draft: PathBuf },
    /// Render a draft to HTML
    Render {
        draft: PathBuf,
        #[arg(long, value_enum, default_value = "full")]
        view: View,
        /// Write the HTML here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(dir) => config::load_config(dir)?,
        None => config::AppConfig::default(),
    };
    init_logging(&app_config.logging.filter);
    debug!(config = ?cli.config, "configuration loaded");

    match cli.command {
        Command::Templates => {
            output::print_templates(list_templates());
        }
        Command::Slug { name } => {
            println!("{}", slug::generate_slug(&name));
        }
        Command::New {
            name,
            owner,
            template,
            out,
        } => {
            let id = uuid::Uuid::new_v4().simple().to_string();
            let mut editor = PageEditor::new(
                PageDraft::from_template(id, owner, template),
                app_config.limits.to_media_limits(),
            );
            editor.set_identity_field(IdentityField::Name(name))?;
            let json = serde_json::to_string_pretty(editor.draft())?;
            write_or_print(out.as_deref(), &json)?;
            info!(page = %editor.draft().id, %template, "draft created");
        }
        Command::Set { draft, updates } => {
            let updates = updates
                .iter()
                .map(|pair| SettingUpdate::parse(pair))
                .collect::<Result<Vec<_>, _>>()?;
            let mut editor = PageEditor::new(
                read_draft(&draft)?,
                app_config.limits.to_media_limits(),
            );
            editor.apply_settings(updates);
            std::fs::write(&draft, serde_json::to_string_pretty(editor.draft())?)?;
            output::print_draft_summary(editor.draft());
        }
        Command::Check { draft } => {
            let draft = read_draft(&draft)?;
            output::print_draft_summary(&draft);
            println!();
            output::print_publish_check(&draft.check_publishable());
        }
        Command::Render { draft, view, out } => {
            let options = &app_config.render;
            let editor = PageEditor::new(
                read_draft(&draft)?,
                app_config.limits.to_media_limits(),
            );
            let model = editor.to_preview_model(options);
            let markup = match view {
                View::Full => render::render_full_preview(&model, options),
                View::Sidebar => render::render_sidebar_preview(&model, options),
                View::Public => render::render_public_page(&model, options),
            };
            write_or_print(out.as_deref(), &markup.into_string())?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the fmt subscriber; `RUST_LOG` wins over the configured filter.
fn init_logging(fallback: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_draft(path: &Path) -> Result<PageDraft, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_or_print(out: Option<&Path>, content: &str) -> std::io::Result<()> {
    match out {
        Some(path) => std::fs::write(path, content),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
