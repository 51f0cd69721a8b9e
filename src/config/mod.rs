mod schema;

pub use schema::{PolicyDef, PolicyDocument, RuleDef};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::conditions::{
    get_bool_expr, get_set_expr, AttrMask, BoolExpr, FileClassRegistry, SmInstance, StatusManager,
};
use crate::error::ConfigError;
use crate::modules::{ModuleRegistry, MODULE_MASK_ALL};
use crate::syntax::{parse_bool_expr, parse_set_expr, Block, ConfigItem};

const CONFIG_ENV_VAR: &str = "POLCFG_CONFIG";

/// policy document path: explicit path, then `POLCFG_CONFIG`, then
/// `~/.polcfg/policy.json5`
pub fn get_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".polcfg")
        .join("policy.json5"))
}

pub fn load(path: &Path) -> Result<PolicyDocument> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse(content: &str) -> Result<PolicyDocument> {
    let mut doc: PolicyDocument = json5::from_str(content).map_err(|e| anyhow!("{}", e))?;
    doc.source = content.to_string();
    Ok(doc)
}

/// verify a policy document and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    let doc = load(path)?;
    Ok(match doc.compile() {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    })
}

#[derive(Debug)]
pub struct CompiledRule {
    pub name: String,
    /// `None` selects every entry in the policy scope
    pub target: Option<BoolExpr>,
    pub condition: BoolExpr,
}

impl CompiledRule {
    /// attributes needed to evaluate the rule
    pub fn attr_mask(&self) -> AttrMask {
        let target = self.target.as_ref().map(|t| t.attr_mask).unwrap_or_default();
        target | self.condition.attr_mask
    }
}

#[derive(Debug)]
pub struct CompiledPolicy {
    pub name: String,
    pub status_manager: Option<SmInstance>,
    pub scope: Option<BoolExpr>,
    pub rules: Vec<CompiledRule>,
}

#[derive(Debug)]
pub struct CompiledConfig {
    pub status_managers: Vec<SmInstance>,
    pub fileclasses: FileClassRegistry,
    pub policies: Vec<CompiledPolicy>,
    pub modules: ModuleRegistry,
}

/// 1-based line of byte `offset` in `source`
fn line_at(source: &str, offset: usize) -> u32 {
    source[..offset].matches('\n').count() as u32 + 1
}

/// first `needle` at or after byte `from`: its line and the offset just past it
fn locate(source: &str, from: usize, needle: &str) -> Option<(u32, usize)> {
    let start = from + source.get(from..)?.find(needle)?;
    Some((line_at(source, start), start + needle.len()))
}

/// byte offset of `key` written as an object key (`key:`, `"key":` or `'key':`)
fn key_offset(source: &str, key: &str) -> Option<usize> {
    source.match_indices(key).map(|(i, _)| i).find(|&i| {
        let starts_word = source[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        let rest = source[i + key.len()..].trim_start_matches(['"', '\'']);
        starts_word && rest.trim_start().starts_with(':')
    })
}

/// 1-based line of the first occurrence of `needle` in `source`, 0 if absent
fn line_of(source: &str, needle: &str) -> u32 {
    locate(source, 0, needle).map_or(0, |(line, _)| line)
}

fn bool_block(name: &str, text: &str, line: u32) -> Result<ConfigItem, ConfigError> {
    let expr = parse_bool_expr(text, line)?;
    Ok(ConfigItem::Block(
        Block::new(name, line).with_bool_expr(expr, line),
    ))
}

fn set_block(name: &str, text: &str, line: u32) -> Result<ConfigItem, ConfigError> {
    let expr = parse_set_expr(text)?;
    Ok(ConfigItem::Block(Block::new(name, line).with_set_expr(expr, line)))
}

/// compile a standalone boolean expression
pub fn compile_condition_text(
    text: &str,
    smi: Option<&SmInstance>,
) -> Result<BoolExpr, ConfigError> {
    let item = bool_block("condition", text, 1)?;
    get_bool_expr(&item, "condition", smi)
}

/// compile a standalone fileclass set expression against `registry`
pub fn compile_target_text(
    text: &str,
    registry: &FileClassRegistry,
) -> Result<BoolExpr, ConfigError> {
    let item = set_block("target", text, 1)?;
    get_set_expr(&item, "target", registry)
}

impl PolicyDocument {
    fn line_of(&self, needle: &str) -> u32 {
        line_of(&self.source, needle)
    }

    /// line of `needle` at or after `*cursor`, moving the cursor past it
    ///
    /// policies and rules are compiled in document order, so repeated
    /// expressions resolve to their own lines. falls back to the first
    /// occurrence when nothing follows the cursor.
    fn line_after(&self, cursor: &mut usize, needle: &str) -> u32 {
        match locate(&self.source, *cursor, needle) {
            Some((line, end)) => {
                *cursor = end;
                line
            }
            None => self.line_of(needle),
        }
    }

    /// status managers with their index, in name order
    pub fn status_manager_instances(&self) -> Result<Vec<SmInstance>, ConfigError> {
        if self.status_managers.len() > AttrMask::MAX_STATUS_MANAGERS {
            return Err(ConfigError::constraint(format!(
                "too many status managers: {} (max {})",
                self.status_managers.len(),
                AttrMask::MAX_STATUS_MANAGERS
            )));
        }
        Ok(self
            .status_managers
            .iter()
            .enumerate()
            .map(|(index, (name, statuses))| {
                SmInstance::new(index, StatusManager::new(name.clone(), statuses.clone()))
            })
            .collect())
    }

    fn fileclass_registry(&self, errors: &mut Vec<String>) -> FileClassRegistry {
        let mut registry = FileClassRegistry::new();

        for (name, text) in &self.fileclasses {
            let mut at = key_offset(&self.source, name).unwrap_or(0);
            let result = bool_block("definition", text, self.line_after(&mut at, text))
                .and_then(|item| get_bool_expr(&item, "definition", None))
                .and_then(|expr| registry.register(name.clone(), expr));
            if let Err(e) = result {
                errors.push(format!("fileclasses.{}: {}", name, e));
            }
        }

        registry
    }

    fn compile_rule(
        &self,
        rule: &RuleDef,
        registry: &FileClassRegistry,
        smi: Option<&SmInstance>,
        cursor: &mut usize,
    ) -> Result<CompiledRule, ConfigError> {
        let rule_start = *cursor;

        let mut target_end = rule_start;
        let condition_line = self.line_after(cursor, &rule.condition);
        let target = match &rule.target {
            Some(text) => {
                let item = set_block("target", text, self.line_after(&mut target_end, text))?;
                Some(get_set_expr(&item, "target", registry)?)
            }
            None => None,
        };
        *cursor = (*cursor).max(target_end);

        let item = bool_block("condition", &rule.condition, condition_line)?;
        let condition = get_bool_expr(&item, "condition", smi)?;

        Ok(CompiledRule {
            name: rule.name.clone(),
            target,
            condition,
        })
    }

    fn compile_policy(
        &self,
        index: usize,
        policy: &PolicyDef,
        registry: &FileClassRegistry,
        managers: &[SmInstance],
        cursor: &mut usize,
        errors: &mut Vec<String>,
    ) -> Option<CompiledPolicy> {
        let prefix = format!("policies[{}] ({})", index, policy.name);

        let smi = match &policy.status_manager {
            Some(name) => match managers.iter().find(|m| m.name().eq_ignore_ascii_case(name)) {
                Some(smi) => Some(smi.clone()),
                None => {
                    errors.push(format!(
                        "{}: {}",
                        prefix,
                        ConfigError::UnknownStatusManager(name.clone())
                    ));
                    return None;
                }
            },
            None => None,
        };

        let scope = match &policy.scope {
            Some(text) => {
                match bool_block("scope", text, self.line_after(cursor, text))
                    .and_then(|item| get_bool_expr(&item, "scope", smi.as_ref()))
                {
                    Ok(expr) => Some(expr),
                    Err(e) => {
                        errors.push(format!("{}.scope: {}", prefix, e));
                        None
                    }
                }
            }
            None => None,
        };

        let mut rules = Vec::new();
        for (i, rule) in policy.rules.iter().enumerate() {
            match self.compile_rule(rule, registry, smi.as_ref(), cursor) {
                Ok(compiled) => rules.push(compiled),
                Err(e) => errors.push(format!("{}.rules[{}] ({}): {}", prefix, i, rule.name, e)),
            }
        }

        Some(CompiledPolicy {
            name: policy.name.clone(),
            status_manager: smi,
            scope,
            rules,
        })
    }

    fn read_modules(&self, errors: &mut Vec<String>) -> ModuleRegistry {
        let mut modules = ModuleRegistry::with_builtin();

        let mut root = Block::new("root", 0);
        if let Some(trigger) = &self.trigger {
            match Block::from_json("trigger", trigger) {
                Ok(block) => root = root.with_block(block),
                Err(e) => {
                    errors.push(format!("trigger: {}", e));
                    return modules;
                }
            }
        }

        if let Err(e) = modules.read_all(&root, MODULE_MASK_ALL) {
            errors.push(e.to_string());
        }
        modules
    }

    /// compile every part of the document, collecting all errors
    pub fn compile(&self) -> Result<CompiledConfig, Vec<String>> {
        let mut errors = Vec::new();

        let status_managers = self.status_manager_instances().unwrap_or_else(|e| {
            errors.push(format!("status_managers: {}", e));
            Vec::new()
        });
        let fileclasses = self.fileclass_registry(&mut errors);

        let mut cursor = key_offset(&self.source, "policies").unwrap_or(0);
        let policies: Vec<CompiledPolicy> = self
            .policies
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                self.compile_policy(i, p, &fileclasses, &status_managers, &mut cursor, &mut errors)
            })
            .collect();

        let modules = self.read_modules(&mut errors);

        debug!(
            fileclasses = fileclasses.len(),
            errors = errors.len(),
            "compiled policy document"
        );

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(CompiledConfig {
            status_managers,
            fileclasses,
            policies,
            modules,
        })
    }
}
