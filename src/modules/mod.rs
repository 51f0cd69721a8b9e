//! configuration modules
//!
//! each module owns one block of the policy document: it knows its defaults,
//! how to read and reload its parameters, and how to document them.

mod trigger;

pub use trigger::TriggerConfig;

use tracing::{error, info};

use crate::error::{ConfigError, Result};
use crate::params::TemplateWriter;
use crate::syntax::Block;

pub const MODULE_MASK_TRIGGER: u32 = 1 << 0;
pub const MODULE_MASK_ALL: u32 = u32::MAX;

pub trait ConfigModule: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// selection bit for [`ModuleRegistry::read_all`]
    fn mask(&self) -> u32;

    /// read regardless of the requested mask
    fn always(&self) -> bool {
        false
    }

    fn set_defaults(&mut self);

    fn read(&mut self, root: &Block) -> Result<()>;

    /// apply the parameters that can change while running
    fn reload(&mut self, root: &Block) -> Result<()>;

    fn write_template(&self, w: &mut TemplateWriter);

    fn write_defaults(&self, w: &mut TemplateWriter);
}

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn ConfigModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// registry holding every module shipped with the crate
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TriggerConfig::default()));
        registry
    }

    pub fn register(&mut self, module: Box<dyn ConfigModule>) {
        self.modules.push(module);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ConfigModule> {
        self.modules
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .map(|m| &**m)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    fn selected(&mut self, mask: u32) -> impl Iterator<Item = &mut Box<dyn ConfigModule>> + '_ {
        self.modules
            .iter_mut()
            .filter(move |m| m.always() || m.mask() & mask != 0)
    }

    /// set defaults then read every selected module; stops at the first failure
    pub fn read_all(&mut self, root: &Block, mask: u32) -> Result<()> {
        for module in self.selected(mask) {
            module.set_defaults();
            module.read(root).map_err(|e| ConfigError::Module {
                module: module.name().to_string(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    /// reload every selected module
    ///
    /// a failing module is logged and skipped; the last failure is returned
    /// once all modules have been processed.
    pub fn reload_all(&mut self, root: &Block, mask: u32) -> Result<()> {
        let mut last_err = None;

        for module in self.selected(mask) {
            match module.reload(root) {
                Ok(()) => info!(module = module.name(), "configuration reloaded"),
                Err(e) => {
                    error!(module = module.name(), "failed to reload configuration: {}", e);
                    last_err = Some(ConfigError::Module {
                        module: module.name().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// documented template of every module
    pub fn write_template(&self) -> String {
        let mut w = TemplateWriter::new();
        for module in &self.modules {
            w.comment(0, &format!("{} configuration", module.name()));
            w.blank();
            module.write_template(&mut w);
            w.blank();
        }
        w.into_string()
    }

    /// default values of every module
    pub fn write_defaults(&self) -> String {
        let mut w = TemplateWriter::new();
        for module in &self.modules {
            module.write_defaults(&mut w);
            w.blank();
        }
        w.into_string()
    }
}
