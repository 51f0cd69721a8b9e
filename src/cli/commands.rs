use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use std::path::{Path, PathBuf};

use crate::conditions::{
    print_bool_expr, BoolExpr, CriterionDescr, FileClassRegistry, PrintError, SmInstance,
    StatusManager, CRITERIA,
};
use crate::config::{self, CompiledConfig, PolicyDocument};
use crate::error::ConfigError;
use crate::modules::ModuleRegistry;

use super::exit_codes;
use super::output::{
    self, CheckData, CompileData, CriterionData, FileClassData, OutputMode, PolicyData, RuleData,
    TextData,
};

#[derive(Parser)]
#[command(name = "polcfg")]
#[command(about = "Compile and check filesystem policy rules")]
#[command(version)]
pub struct Cli {
    /// Path to policy document (overrides POLCFG_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a boolean expression and print its canonical form
    Compile {
        /// Expression, e.g. 'size > 1GB and last_access > 30d'
        expression: String,

        /// Status manager the expression is checked against
        #[arg(long)]
        status_manager: Option<String>,

        /// Allowed status values (taken from the policy document when omitted)
        #[arg(long, requires = "status_manager", value_delimiter = ',')]
        status: Vec<String>,

        /// Maximum length of the rendered expression
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Compile a fileclass set expression against the fileclasses of the policy document
    Target {
        /// Expression, e.g. 'logs union (big inter not archived)'
        expression: String,
    },

    /// Check the policy document and report every error
    Check,

    /// List the criteria usable in conditions
    Criteria {
        /// Output one criterion name per line
        #[arg(long, conflicts_with = "format")]
        names: bool,

        /// Custom output format (e.g. '{name}: {type}')
        #[arg(long)]
        format: Option<String>,
    },

    /// Print a documented configuration template for every module
    Template,

    /// Print the default parameter values of every module
    Defaults,
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet, false, false);

    match cli.command {
        Commands::Compile {
            expression,
            status_manager,
            status,
            max_length,
        } => {
            let smi = match status_manager {
                Some(name) if !status.is_empty() => {
                    Some(SmInstance::new(0, StatusManager::new(name, status)))
                }
                Some(name) => Some(status_manager_from_document(config_path, &name)?),
                None => None,
            };

            let expr = match config::compile_condition_text(&expression, smi.as_ref()) {
                Ok(expr) => expr,
                Err(e) => fail_config(output_mode, exit_codes::COMPILE_ERROR, &e),
            };

            let canonical = match max_length {
                Some(limit) => match print_bool_expr(&expr.root, limit) {
                    Ok(text) => text,
                    Err(PrintError::Truncated {
                        partial, needed, ..
                    }) => {
                        eprintln!(
                            "Warning: expression truncated to {} of {} bytes",
                            limit, needed
                        );
                        partial
                    }
                },
                None => expr.to_string(),
            };

            match output_mode {
                OutputMode::Json => output::print_json(&CompileData {
                    expression,
                    canonical,
                    attributes: expr.attr_mask.names(),
                    conditions: expr.root.condition_count(),
                }),
                OutputMode::Quiet => {}
                _ => {
                    println!("{}", canonical);
                    println!("attributes: {}", expr.attr_mask);
                }
            }
            Ok(())
        }

        Commands::Target { expression } => {
            let (_, doc) = load_document(config_path, output_mode);
            let registry = match document_fileclasses(&doc) {
                Ok(registry) => registry,
                Err(errors) => fail(
                    output_mode,
                    exit_codes::CONFIG_ERROR,
                    "invalid fileclass definitions",
                    Vec::new(),
                    errors,
                ),
            };

            let expr = match config::compile_target_text(&expression, &registry) {
                Ok(expr) => expr,
                Err(e) => fail_config(output_mode, exit_codes::COMPILE_ERROR, &e),
            };

            match output_mode {
                OutputMode::Json => output::print_json(&CompileData {
                    expression,
                    canonical: expr.to_string(),
                    attributes: expr.attr_mask.names(),
                    conditions: expr.root.condition_count(),
                }),
                OutputMode::Quiet => {}
                _ => {
                    println!("{}", expr);
                    println!("attributes: {}", expr.attr_mask);
                }
            }
            Ok(())
        }

        Commands::Check => {
            let (path, doc) = load_document(config_path, output_mode);
            let compiled = match doc.compile() {
                Ok(compiled) => compiled,
                Err(errors) => {
                    let message = format!(
                        "{}: {} error(s) in policy document",
                        path.display(),
                        errors.len()
                    );
                    fail(output_mode, exit_codes::CONFIG_ERROR, &message, Vec::new(), errors)
                }
            };

            let data = check_data(&path, &compiled);
            match output_mode {
                OutputMode::Json => output::print_json(&data),
                OutputMode::Quiet => {}
                _ => print_check_summary(&data),
            }
            Ok(())
        }

        Commands::Criteria { names, format } => {
            let list_mode = OutputMode::from_flags(
                cli.json,
                cli.no_json,
                cli.quiet,
                names,
                format.is_some(),
            );
            let rows: Vec<CriterionData> = CRITERIA.iter().map(criterion_data).collect();

            match list_mode {
                OutputMode::Json => output::print_json(&rows),
                OutputMode::Quiet => {}
                OutputMode::Names => {
                    for row in &rows {
                        println!("{}", row.name);
                    }
                }
                OutputMode::Format => {
                    let fmt = format.as_deref().unwrap_or("{name}");
                    for row in &rows {
                        println!("{}", output::format_template(fmt, row));
                    }
                }
                OutputMode::Text => {
                    println!(
                        "{:<16} {:<9} {:<16} CONSTRAINTS",
                        "NAME", "TYPE", "ATTRIBUTES"
                    );
                    for row in &rows {
                        println!(
                            "{:<16} {:<9} {:<16} {}",
                            row.name,
                            row.value_type,
                            row.attributes.join(","),
                            row.constraints.join(",")
                        );
                    }
                }
            }
            Ok(())
        }

        Commands::Template => {
            print_text(output_mode, ModuleRegistry::with_builtin().write_template());
            Ok(())
        }

        Commands::Defaults => {
            print_text(output_mode, ModuleRegistry::with_builtin().write_defaults());
            Ok(())
        }
    }
}

/// report an error in the requested output mode and exit with `code`
fn fail(
    mode: OutputMode,
    code: i32,
    message: &str,
    suggestions: Vec<String>,
    details: Vec<String>,
) -> ! {
    if mode.is_json() {
        if suggestions.is_empty() && details.is_empty() {
            output::print_json_error(code, message);
        } else {
            output::print_json_error_with_data(code, message, suggestions, details);
        }
    } else {
        eprintln!("Error: {}", message);
        for detail in &details {
            eprintln!("  {}", detail);
        }
    }
    std::process::exit(code);
}

fn fail_config(mode: OutputMode, code: i32, err: &ConfigError) -> ! {
    fail(mode, code, &err.to_string(), suggestions_of(err), Vec::new())
}

/// "did you mean" candidates carried by an error or the error it wraps
fn suggestions_of(err: &ConfigError) -> Vec<String> {
    match err {
        ConfigError::UnknownCriterion { suggestion, .. }
        | ConfigError::UndefinedFileClass { suggestion, .. } => {
            suggestion.iter().cloned().collect()
        }
        ConfigError::AtLine { source, .. } | ConfigError::Module { source, .. } => {
            suggestions_of(source)
        }
        _ => Vec::new(),
    }
}

fn load_document(explicit: Option<&Path>, mode: OutputMode) -> (PathBuf, PolicyDocument) {
    let path = match config::get_config_path(explicit) {
        Ok(path) => path,
        Err(e) => fail(mode, exit_codes::CONFIG_NOT_FOUND, &e.to_string(), Vec::new(), Vec::new()),
    };
    if !path.exists() {
        let message = format!("config file not found: {}", path.display());
        fail(mode, exit_codes::CONFIG_NOT_FOUND, &message, Vec::new(), Vec::new());
    }

    match config::load(&path) {
        Ok(doc) => (path, doc),
        Err(e) => fail(mode, exit_codes::CONFIG_ERROR, &format!("{:#}", e), Vec::new(), Vec::new()),
    }
}

fn status_manager_from_document(explicit: Option<&Path>, name: &str) -> Result<SmInstance> {
    let path = config::get_config_path(explicit)?;
    let doc = config::load(&path)?;
    let managers = doc.status_manager_instances()?;

    let known: Vec<&str> = managers.iter().map(|m| m.name()).collect();
    managers
        .iter()
        .find(|m| m.name().eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "{} (defined in {}: {})",
                ConfigError::UnknownStatusManager(name.to_string()),
                path.display(),
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            )
        })
}

fn document_fileclasses(doc: &PolicyDocument) -> std::result::Result<FileClassRegistry, Vec<String>> {
    let mut registry = FileClassRegistry::new();
    let mut errors = Vec::new();

    for (name, text) in &doc.fileclasses {
        let result = config::compile_condition_text(text, None)
            .and_then(|expr| registry.register(name.clone(), expr));
        if let Err(e) = result {
            errors.push(format!("fileclasses.{}: {}", name, e));
        }
    }

    if errors.is_empty() {
        Ok(registry)
    } else {
        Err(errors)
    }
}

fn expr_text(expr: &Option<BoolExpr>) -> Option<String> {
    expr.as_ref().map(|e| e.to_string())
}

fn check_data(path: &Path, compiled: &CompiledConfig) -> CheckData {
    CheckData {
        path: path.display().to_string(),
        status_managers: compiled
            .status_managers
            .iter()
            .map(|m| m.name().to_string())
            .collect(),
        fileclasses: compiled
            .fileclasses
            .iter()
            .map(|fc| FileClassData {
                name: fc.name.clone(),
                definition: fc.definition.to_string(),
                attributes: fc.attr_mask.names(),
            })
            .collect(),
        policies: compiled
            .policies
            .iter()
            .map(|p| PolicyData {
                name: p.name.clone(),
                status_manager: p.status_manager.as_ref().map(|m| m.name().to_string()),
                scope: expr_text(&p.scope),
                rules: p
                    .rules
                    .iter()
                    .map(|r| RuleData {
                        name: r.name.clone(),
                        target: expr_text(&r.target),
                        condition: r.condition.to_string(),
                        attributes: r.attr_mask().names(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn print_check_summary(data: &CheckData) {
    println!("{}: OK", data.path);

    if !data.status_managers.is_empty() {
        println!("status managers: {}", data.status_managers.join(", "));
    }

    println!("fileclasses: {}", data.fileclasses.len());
    for fc in &data.fileclasses {
        println!("  {:<16} {}", fc.name, fc.definition);
    }

    println!("policies: {}", data.policies.len());
    for policy in &data.policies {
        println!("  {} ({} rule(s))", policy.name, policy.rules.len());
        if let Some(scope) = &policy.scope {
            println!("    scope: {}", scope);
        }
        for rule in &policy.rules {
            let target = rule.target.as_deref().unwrap_or("*");
            println!("    {}: {} => {}", rule.name, target, rule.condition);
        }
    }
}

fn criterion_data(descr: &CriterionDescr) -> CriterionData {
    let flags = descr.flags;
    let constraints = [
        (flags.positive, "positive"),
        (flags.not_null, "not_null"),
        (flags.not_empty, "not_empty"),
        (flags.no_slash, "no_slash"),
        (flags.no_wildcards, "no_wildcards"),
        (flags.allow_any_depth, "any_depth"),
        (flags.status, "status"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| name.to_string())
    .collect();

    let name = if flags.xattr {
        format!("{}.<name>", descr.name)
    } else {
        descr.name.to_string()
    };

    CriterionData {
        name,
        value_type: descr.value_type.as_str().to_string(),
        comparable: flags.comparable,
        constraints,
        attributes: descr.attr_mask.names(),
    }
}

fn print_text(mode: OutputMode, text: String) {
    match mode {
        OutputMode::Json => output::print_json(&TextData { text }),
        OutputMode::Quiet => {}
        _ => print!("{}", text),
    }
}
