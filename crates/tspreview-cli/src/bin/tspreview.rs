use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::IsTerminal;
use std::time::Duration;

use tspreview_cli::{CliArgs, Command, Project, Reporter};

fn to_json(value: &impl Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Only active when TSPREVIEW_LOG or RUST_LOG is set.
    tspreview::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let project = Project::open(&args.project)?;
    let json = args.project.json;
    let mut reporter = Reporter::new(!args.project.no_color && std::io::stdout().is_terminal());

    match args.command {
        Command::Crawl { files } => {
            let set = project.crawl(&files).await?;
            if json {
                println!("{}", to_json(&set)?);
            } else {
                print!("{}", reporter.render_set(&set));
            }
        }
        Command::Props { id } => {
            let report = project.props(&id).await?;
            if json {
                println!("{}", to_json(&report)?);
            } else {
                print!("{}", reporter.render_props(&report));
            }
        }
        Command::Watch { debounce } => {
            project
                .watch(Duration::from_millis(debounce), |set| {
                    if json {
                        // One document per line so consumers can stream.
                        println!(
                            "{}",
                            serde_json::to_string(set).context("failed to serialize output")?
                        );
                    } else {
                        print!("{}", reporter.render_set(set));
                    }
                    Ok(())
                })
                .await?;
        }
    }
    Ok(())
}
