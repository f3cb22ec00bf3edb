use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};

use listview::{
    CollationPolicy, ConfigurationError, DirEnvironment, Individual, ObjectProperty,
    PostProcessorRegistry, PropertyListModel,
};

#[derive(Parser)]
#[command(name = "listview")]
#[command(version, about = "Validate and inspect list-view configuration files")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and report defects
    Check {
        /// Path to the list-view config XML file
        file: PathBuf,

        /// Resolve for a collating model (include <collated> fragments)
        #[arg(long)]
        collated: bool,

        /// Resolve in editing mode (drop <critical-data-required> fragments)
        #[arg(long)]
        editing: bool,

        /// Enforce the collation consistency check (implies --collated)
        #[arg(long)]
        check_collation: bool,

        /// Template names the engine can resolve; repeatable.
        /// Without any, every referenced template is assumed to exist.
        #[arg(long = "template")]
        templates: Vec<String>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved queries and template for a config file
    Show {
        /// Path to the list-view config XML file
        file: PathBuf,

        #[arg(long)]
        collated: bool,

        #[arg(long)]
        editing: bool,
    },
}

#[derive(Serialize)]
struct CheckReport {
    file: String,
    used_default: bool,
    template: String,
    select_query: String,
    defects: Vec<DefectReport>,
}

#[derive(Serialize)]
struct DefectReport {
    kind: &'static str,
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            file,
            collated,
            editing,
            check_collation,
            templates,
            json,
        } => cmd_check(
            &file,
            collated || check_collation,
            editing,
            check_collation,
            &templates,
            json,
        ),
        Commands::Show {
            file,
            collated,
            editing,
        } => cmd_show(&file, collated, editing),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "off" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Map one on-disk file into an environment the resolver can use: its parent
/// directory becomes the virtual `/config/` directory.
fn environment_for(
    file: &Path,
    templates: &[String],
) -> Result<(DirEnvironment, ObjectProperty)> {
    let file = file
        .canonicalize()
        .with_context(|| format!("Failed to resolve config file path: {}", file.display()))?;
    let dir = file.parent().context("Config file has no parent directory")?;
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Config file name is not valid UTF-8")?;

    let mut env = DirEnvironment::new(dir);
    if templates.is_empty() {
        env.assume_templates(true);
    } else {
        for template in templates {
            env.add_template(template);
        }
    }

    const PROPERTY_URI: &str = "urn:listview:check";
    env.set_list_view_config_name(PROPERTY_URI, name);
    Ok((env, ObjectProperty::new(PROPERTY_URI)))
}

fn build_model(
    file: &Path,
    collated: bool,
    editing: bool,
    check_collation: bool,
    templates: &[String],
) -> Result<Result<PropertyListModel, ConfigurationError>> {
    let (env, property) = environment_for(file, templates)?;
    let subject = Individual::new("urn:listview:subject");
    let registry = PostProcessorRegistry::new();

    let model = if collated {
        let policy = if check_collation {
            CollationPolicy::Checked
        } else {
            CollationPolicy::Unchecked
        };
        PropertyListModel::collating(&property, &subject, &env, editing, &registry, policy)
    } else {
        PropertyListModel::new(&property, &subject, &env, editing, &registry)
    };
    Ok(model)
}

fn cmd_check(
    file: &Path,
    collated: bool,
    editing: bool,
    check_collation: bool,
    templates: &[String],
    json: bool,
) -> Result<()> {
    let model = match build_model(file, collated, editing, check_collation, templates)? {
        Ok(model) => model,
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "file": file.display().to_string(), "fatal": err.to_string() })
                );
            } else {
                eprintln!("{} {err}", style("fatal:").red().bold());
            }
            std::process::exit(1);
        }
    };

    let defects: Vec<DefectReport> = model
        .defects()
        .iter()
        .map(|d| DefectReport {
            kind: d.kind(),
            message: d.to_string(),
        })
        .collect();
    let clean = defects.is_empty();

    if json {
        let report = CheckReport {
            file: file.display().to_string(),
            used_default: model.has_default_list_view(),
            template: model.template_name().to_string(),
            select_query: model.select_query().to_string(),
            defects,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for defect in &defects {
            println!("{} {}", style("warning:").yellow().bold(), defect.message);
        }
        if clean {
            println!("{} {}", style("ok:").green().bold(), file.display());
        } else if model.has_default_list_view() {
            println!(
                "{} falling back to the default list view",
                style("note:").cyan()
            );
        }
    }

    if !clean {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_show(file: &Path, collated: bool, editing: bool) -> Result<()> {
    let model = match build_model(file, collated, editing, false, &[])? {
        Ok(model) => model,
        Err(err) => {
            eprintln!("{} {err}", style("fatal:").red().bold());
            std::process::exit(1);
        }
    };

    println!("{}", style("select query:").bold());
    println!("  {}", model.select_query());
    if !model.construct_queries().is_empty() {
        println!("{}", style("construct queries:").bold());
        for query in model.construct_queries() {
            println!("  {query}");
        }
    }
    println!("{} {}", style("template:").bold(), model.template_name());
    println!(
        "{} {}",
        style("postprocessor:").bold(),
        model.postprocessor().name()
    );
    for defect in model.defects() {
        eprintln!("{} {defect}", style("warning:").yellow().bold());
    }
    Ok(())
}
