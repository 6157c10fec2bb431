//! Viewfinder CLI
//!
//! Command-line front end for inspecting and editing the filter state.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use viewfinder::filter::pretty_print;
use viewfinder::session::builtin_presets;
use viewfinder::{FilterSession, PropertyKind, RuleOperator, TomlStore};

#[derive(Parser, Debug)]
#[command(name = "viewfinder")]
#[command(author, version, about = "Composable rule-based filtering for photo catalogs")]
struct Cli {
    /// Path to the filter state file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show the current rule set (default)
    Show,

    /// Append a rule for a property (rating, iso, filename, ...)
    Add { property: PropertyKind },

    /// Remove the rule at an index
    Remove { index: usize },

    /// Enable or disable the rule at an index
    Toggle { index: usize },

    /// Set a rule's raw text value
    Text { index: usize, value: String },

    /// Set how a rule combines with the ones before it
    Op {
        index: usize,
        operator: RuleOperator,
    },

    /// Change which property a rule constrains
    Prop {
        index: usize,
        property: PropertyKind,
    },

    /// List past filter states
    History,

    /// Recall a past filter state by its history index
    Recall { index: usize },

    /// Export the current rule set as a preset file
    Export { file: PathBuf },

    /// Import a preset file, replacing the current rule set
    Import { file: PathBuf },

    /// Apply a built-in preset by name (no argument lists them)
    Preset { name: Option<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("VIEWFINDER_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = TomlStore::load(cli.config.as_deref())?;
    let path = store.path().to_path_buf();
    // the session owns a shared handle so we can flush the store afterwards
    let shared = std::rc::Rc::new(std::cell::RefCell::new(store));
    let mut session = FilterSession::open(Box::new(shared.clone()));

    match cli.command {
        None | Some(Commands::Show) => {
            show_rules(&session);
        }
        Some(Commands::Add { property }) => {
            session.manager_mut().append(property)?;
            show_rules(&session);
        }
        Some(Commands::Remove { index }) => {
            require_index(&session, index)?;
            session.manager_mut().remove(index);
            show_rules(&session);
        }
        Some(Commands::Toggle { index }) => {
            require_index(&session, index)?;
            let enabled = session.manager().rule(index).map(|r| r.enabled).unwrap_or(false);
            session.manager_mut().set_enabled(index, !enabled);
            show_rules(&session);
        }
        Some(Commands::Text { index, value }) => {
            require_index(&session, index)?;
            session.manager_mut().set_raw_text(index, &value);
            show_rules(&session);
        }
        Some(Commands::Op { index, operator }) => {
            require_index(&session, index)?;
            session.manager_mut().set_operator(index, operator);
            show_rules(&session);
        }
        Some(Commands::Prop { index, property }) => {
            require_index(&session, index)?;
            session.manager_mut().set_property(index, property);
            show_rules(&session);
        }
        Some(Commands::History) => {
            let entries = session.manager().history().list();
            if entries.is_empty() {
                println!("No filter history yet");
            }
            for (i, summary) in entries {
                println!("  [{}] {}", i, summary);
            }
        }
        Some(Commands::Recall { index }) => {
            if session.manager().history().get(index).is_none() {
                bail!("no history entry at index {}", index);
            }
            session.manager_mut().apply_history(index);
            show_rules(&session);
        }
        Some(Commands::Export { file }) => {
            let record = session.export_preset();
            std::fs::write(&file, &record)
                .with_context(|| format!("Failed to write preset to {}", file.display()))?;
            println!("Exported {} rules to {}", session.manager().nb_rules(), file.display());
        }
        Some(Commands::Import { file }) => {
            let record = std::fs::read(&file)
                .with_context(|| format!("Failed to read preset from {}", file.display()))?;
            session.import_preset(&record)?;
            show_rules(&session);
        }
        Some(Commands::Preset { name: None }) => {
            println!("Built-in presets:");
            for (name, rules) in builtin_presets() {
                println!("  {} ({})", name, pretty_print(&viewfinder::filter::serialize(&rules)));
            }
        }
        Some(Commands::Preset { name: Some(name) }) => {
            if !session.apply_builtin_preset(&name) {
                bail!("unknown preset: {:?} (run `viewfinder preset` to list them)", name);
            }
            show_rules(&session);
        }
    }

    shared.borrow_mut().save()?;
    tracing::debug!("filter state saved to {}", path.display());
    Ok(())
}

fn show_rules(session: &FilterSession) {
    let manager = session.manager();
    if manager.nb_rules() == 0 {
        println!("No rules (showing the whole catalog)");
        return;
    }

    println!("Rules:");
    for (i, rule) in manager.rules().iter().enumerate() {
        let status = if rule.enabled { "✓" } else { "✗" };
        let operator = if i == 0 {
            String::new()
        } else {
            format!("{} ", rule.operator.join_word())
        };
        let text = if rule.raw_text.is_empty() {
            "(any)".to_string()
        } else {
            rule.raw_text.clone()
        };
        println!("  {} [{}] {}{} {}", status, i, operator, rule.property, text);
    }

    let sort = manager.sort();
    println!(
        "Sort: {:?} {}",
        sort.field,
        if sort.descending { "descending" } else { "ascending" }
    );
}

fn require_index(session: &FilterSession, index: usize) -> Result<()> {
    if index >= session.manager().nb_rules() {
        bail!(
            "no rule at index {} ({} rules active)",
            index,
            session.manager().nb_rules()
        );
    }
    Ok(())
}
