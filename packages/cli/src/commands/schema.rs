use crate::config::build_schema;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Write the summary to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn schema(args: SchemaArgs, cwd: &Path, config: Option<&Path>) -> Result<()> {
    let schema = build_schema(cwd, config).await?;
    let summary = serde_json::to_string_pretty(&schema.summary())?;
    super::emit(&summary, args.out.as_deref())
}
