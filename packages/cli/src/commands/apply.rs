use super::{emit, open, render, Format};
use crate::config::build_schema;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{CommandOutcome, Editor};
use folio_model::Selection;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document to edit
    pub doc: PathBuf,

    /// JSON array of `{command, args, selection}` steps
    pub script: PathBuf,

    /// Format of the resulting document
    #[arg(short, long, value_enum, default_value = "html")]
    pub to: Format,

    /// Write the resulting document to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Stop at the first rejected command
    #[arg(long)]
    pub strict: bool,
}

/// One scripted command; `selection` is applied before it runs
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    pub command: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub selection: Option<Selection>,
}

pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>> {
    Ok(serde_json::from_str(content)?)
}

pub async fn apply(args: ApplyArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    let schema = build_schema(cwd, config).await?;
    let mut editor = open(schema, &cwd.join(&args.doc))?;

    let script_path = cwd.join(&args.script);
    let content =
        fs::read_to_string(&script_path).with_context(|| format!("Cannot read {}", script_path.display()))?;
    let steps = parse_script(&content).with_context(|| format!("Invalid script in {}", script_path.display()))?;

    let applied = run_script(&mut editor, &steps, args.strict)?;
    eprintln!(
        "{} {}/{} commands applied",
        "✨".green(),
        applied,
        steps.len()
    );
    emit(&render(&editor, args.to)?, args.out.as_deref())
}

/// Run `steps` in order, reporting each outcome on stderr. Returns how many
/// applied.
pub fn run_script(editor: &mut Editor, steps: &[ScriptStep], strict: bool) -> Result<usize> {
    let mut applied = 0;
    for (index, step) in steps.iter().enumerate() {
        if let Some(selection) = &step.selection {
            editor
                .set_selection(selection.clone())
                .with_context(|| format!("Step {} ({})", index + 1, step.command))?;
        }
        let outcome = editor
            .execute(&step.command, &step.args)
            .with_context(|| format!("Step {} ({})", index + 1, step.command))?;

        match outcome {
            CommandOutcome::Applied => {
                applied += 1;
                eprintln!("  {} {}", "✓".green(), step.command);
            }
            CommandOutcome::Rejected(rejection) => {
                eprintln!("  {} {} ({:?})", "✗".yellow(), step.command, rejection);
                if strict {
                    anyhow::bail!("Step {} ({}) was rejected", index + 1, step.command);
                }
            }
        }
    }
    Ok(applied)
}
