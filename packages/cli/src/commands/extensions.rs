use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_extensions::Registry;

#[derive(Debug, Args)]
pub struct ExtensionsArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,

    /// Also list each extension's options
    #[arg(short, long)]
    pub options: bool,
}

pub fn extensions(args: ExtensionsArgs) -> Result<()> {
    let registry = Registry::new();
    let summaries: Vec<_> = registry.descriptors().iter().map(|d| d.summary()).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    println!(
        "{}",
        format!("{:<width$}  {:<6}  {}", "NAME", "GROUP", "PACKAGE", width = width).bold()
    );
    for summary in &summaries {
        let loader = if summary.deferred { " (deferred)".dimmed().to_string() } else { String::new() };
        println!(
            "{:<width$}  {:<6}  {}{}",
            summary.name.bright_white(),
            summary.group.to_string().cyan(),
            summary.package,
            loader,
            width = width
        );
        if args.options {
            for option in &summary.options {
                println!("    {} {} = {}", "•".dimmed(), option.field.green(), option.default);
            }
        }
    }
    println!();
    println!("{} extensions", summaries.len());
    Ok(())
}
