use super::script::{parse_script, replay};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use diagrammer_display::{
    get_display_lexemes, get_label_data, DisplayModel, DisplaySettings, LexemeSpan,
};
use diagrammer_editor::{DiagramHistory, DiagramState};
use diagrammer_grammar::{Category, SerialIds};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Sentence text to diagram
    pub text: String,

    /// Edit script (JSON array of commands) to replay over the sentence
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Display category (word, partOfSpeech, phrase, clause)
    #[arg(short, long)]
    pub category: Option<Category>,

    /// Element to show at finer granularity (repeatable)
    #[arg(short, long)]
    pub expand: Vec<String>,

    /// Expand the neighbourhood of this element
    #[arg(short, long)]
    pub focus: Option<String>,

    /// Print labels, lexemes and display model as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let state = DiagramState::from_text(&args.text)?;
    let history = DiagramHistory::with_max_levels(state, config.history_limit);

    let history = match &args.script {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read edit script {}", path.display()))?;
            let commands = parse_script(&source)
                .with_context(|| format!("Invalid edit script {}", path.display()))?;
            info!(commands = commands.len(), "Replaying edit script");
            replay(history, &commands, &mut SerialIds::for_text(&args.text))?
        }
        None => history,
    };

    let state = history.curr_state();
    let category = args.category.unwrap_or(config.default_category);
    let mut settings = match &args.focus {
        Some(focus) => DisplaySettings::focused(state, category, focus)?,
        None => DisplaySettings::new(category),
    };
    settings.expanded.extend(args.expand.iter().cloned());

    let labels = get_label_data(state, &settings)?;
    let lexemes = get_display_lexemes(state, &settings)?;

    if args.json {
        let output = serde_json::json!({
            "labels": labels,
            "lexemes": lexemes,
            "model": DisplayModel::init(state)?,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({} edits)",
        "Diagram".bright_blue().bold(),
        category,
        history.changes().len()
    );

    let line: Vec<String> = lexemes
        .iter()
        .map(|span| match span {
            LexemeSpan::Label { text, .. } => format!("[{}]", text),
            LexemeSpan::Whitespace => " ".to_string(),
        })
        .collect();
    println!("  {}", line.concat());
    println!();

    for label in &labels {
        println!(
            "  {} {} {}",
            "▸".green(),
            format!("{:<24}", label.id).bold(),
            format!("{} \"{}\"", label.element_type, label.text).dimmed()
        );
    }

    let empty = state.get_empty_elements();
    if !empty.is_empty() {
        println!();
        println!("{} empty elements: {}", "⚠️".yellow(), empty.join(", "));
    }

    Ok(())
}
