use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use diagrammer_grammar::{assign_word_ids, get_diagram_seed, scan as scan_words};

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Sentence text to scan
    pub text: String,

    /// Print the words as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn scan(args: ScanArgs) -> Result<()> {
    let words = assign_word_ids(&scan_words(&args.text));
    if words.is_empty() {
        return Err(anyhow!("No words found in {:?}", args.text));
    }

    if args.json {
        let entries: Vec<_> = words
            .iter()
            .map(|(id, lexeme)| serde_json::json!({ "id": id, "lexeme": lexeme }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{} {} words (seed {})",
        "Scanned".bright_blue().bold(),
        words.len(),
        get_diagram_seed(&args.text).dimmed()
    );
    for (index, (id, lexeme)) in words.iter().enumerate() {
        println!("  {:>3}  {} {}", index, format!("{:<16}", id).green(), lexeme);
    }

    Ok(())
}
