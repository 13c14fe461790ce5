use anyhow::{Context, Result};
use clap::Parser;
use class_depend::analyzer::Analyzer;
use class_depend::cli::{Cli, Commands, OutputFormat};
use class_depend::config::{PropertyConfig, resolve_property_config};
use class_depend::constraint::DependencyConstraint;
use class_depend::logging::init_tracing;
use class_depend::parse::ClassFileParser;
use class_depend::pipeline;
use class_depend::report::{json_report, text_report};
use class_depend::scan::FileManager;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<()> {
    let cli = parse_cli()?;
    init_tracing(cli.verbose);

    match cli.command.clone() {
        Commands::Analyze {
            paths,
            components,
            no_inner_classes,
            format,
            output,
            all_cycles,
            constraint,
        } => {
            let config = resolve_property_config(&cli)?;
            let files = file_manager(&paths, &config, no_inner_classes)?;
            let parser = ClassFileParser::new(config.package_filter());

            let mut analyzer = Analyzer::new(config.package_filter());
            analyzer.add_configured_packages(&config.configured_packages()?);
            if let Some(components) = components.as_deref() {
                analyzer.set_components(components);
            }

            let outcome = pipeline::analyze(&files, &parser, &mut analyzer)?;
            let graph = analyzer.into_graph();

            let constraint_matched = match constraint.as_deref() {
                Some(path) => Some(DependencyConstraint::load(path)?.matches(&graph)),
                None => None,
            };

            let content = match format {
                OutputFormat::Text => text_report(&graph, all_cycles),
                OutputFormat::Json => serde_json::to_string_pretty(&json_report(
                    &graph,
                    &outcome,
                    all_cycles,
                    constraint_matched,
                ))?,
            };
            write_output(&content, output.as_deref())?;

            if constraint_matched == Some(false) {
                anyhow::bail!("Dependency constraint not satisfied");
            }
        }
        Commands::Count {
            paths,
            no_inner_classes,
        } => {
            let config = resolve_property_config(&cli)?;
            let files = file_manager(&paths, &config, no_inner_classes)?;
            let result = CountResult {
                roots: paths.iter().map(|p| p.display().to_string()).collect(),
                classes: files.count_classes()?,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Inspect { class_file } => {
            let config = resolve_property_config(&cli)?;
            let parser = ClassFileParser::new(config.package_filter());
            let bytes = std::fs::read(&class_file)
                .with_context(|| format!("Failed to read class file: {}", class_file.display()))?;
            let origin = class_file.display().to_string();
            let parsed = parser
                .parse_named(&origin, &bytes)
                .with_context(|| format!("Failed to decode class file: {origin}"))?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
    }

    Ok(())
}

fn parse_cli() -> Result<Cli> {
    let args: Vec<String> = std::env::args().collect();
    Ok(Cli::parse_from(rewrite_args_for_implicit_analyze(args)))
}

fn rewrite_args_for_implicit_analyze(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["analyze", "count", "inspect", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if a == "--config" {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "analyze".to_string());
        }
    }

    args
}

fn file_manager(paths: &[PathBuf], config: &PropertyConfig, no_inner_classes: bool) -> Result<FileManager> {
    let mut files = FileManager::new();
    files.accept_inner_classes(config.analyze_inner_classes() && !no_inner_classes);
    for path in paths {
        files.add_directory(path)?;
    }
    info!(roots = paths.len(), inner_classes = files.accepts_inner_classes(), "inputs resolved");
    Ok(files)
}

#[derive(Debug, Serialize)]
struct CountResult {
    roots: Vec<String>,
    classes: usize,
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
