use crate::cli::PrioritizeArgs;
use crate::client::OpenRouterClient;
use crate::collector;
use crate::model::{FeatureList, Framework};
use crate::pipeline::Prioritizer;
use crate::presenter;
use crate::prompt::build_prompt;
use crate::session::{AccessGate, SessionContext};
use anyhow::{Context, Result};
use colored::Colorize;

use super::CommandContext;
use super::utils::{export_path, print_outcome, read_stdin, resolve_secrets, resolve_settings};

pub fn handle_prioritize(ctx: &CommandContext, args: PrioritizeArgs) -> Result<()> {
    let features = collect_features(&args)?;
    collector::ensure_not_empty(&features)?;
    let framework: Framework = args.framework.into();

    if args.dry_run {
        println!("{}", build_prompt(&features, framework));
        return Ok(());
    }

    let settings = resolve_settings(&ctx.config, &args.completion);
    let secrets = resolve_secrets(&args.completion, None);
    let client = OpenRouterClient::new(&settings, secrets.require_api_key()?)?;

    if !args.json {
        eprintln!(
            "{}",
            format!(
                "Getting AI response for {} feature(s) from {}...",
                features.len(),
                client.model()
            )
            .dimmed()
        );
    }

    let prioritizer = Prioritizer::new(client);
    // A CLI invocation is a session of its own, so the trial gate never closes here
    let mut session = SessionContext::new(AccessGate::open());

    let outcome = prioritizer.run(&mut session, &features, framework, None)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    if let Some(output) = args.output {
        let path = export_path(output, &ctx.config, &ctx.cwd);
        if outcome.is_scored() {
            presenter::write_csv(&path, outcome.features())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !args.json {
                println!();
                println!(
                    "{} {} feature(s) to {}",
                    "Exported".green(),
                    outcome.features().len(),
                    path.display()
                );
            }
        } else {
            eprintln!(
                "{}: Nothing to export, the response could not be parsed.",
                "Warning".yellow().bold()
            );
        }
    }

    Ok(())
}

/// `--csv`, then `--file`, then positional arguments, then stdin.
fn collect_features(args: &PrioritizeArgs) -> Result<FeatureList> {
    if let Some(path) = &args.csv {
        return collector::from_csv_path(path)
            .with_context(|| format!("Failed to import features from {}", path.display()));
    }
    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read features from {}", path.display()))?;
        return Ok(collector::from_text(&content));
    }
    if !args.features.is_empty() {
        return Ok(collector::from_text(&args.features.join("\n")));
    }
    Ok(collector::from_text(&read_stdin()?))
}
