use super::{emit, open, render, Format};
use crate::config::build_schema;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Document to convert (`.json` is read as document JSON, anything else as markup)
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub to: Format,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn convert(args: ConvertArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    let schema = build_schema(cwd, config).await?;
    let editor = open(schema, &cwd.join(&args.file))?;
    emit(&render(&editor, args.to)?, args.out.as_deref())
}
