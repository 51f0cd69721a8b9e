//! purge trigger parameters
//!
//! ```text
//! trigger {
//!     check_interval     = 5min ;
//!     high_threshold_pct = 90% ;
//!     low_threshold_pct  = 80% ;
//! }
//! ```

use serde::Serialize;
use tracing::{info, warn};

use super::{ConfigModule, MODULE_MASK_TRIGGER};
use crate::error::{ConfigError, Result};
use crate::params::{
    check_unknown_parameters, read_scalar_params, ParamFlags, ParamTarget, ScalarParam,
    TemplateWriter,
};
use crate::syntax::Block;
use crate::units::{format_duration, format_size, MINUTE};

const TRIGGER_BLOCK: &str = "trigger";

const ALLOWED: [&str; 8] = [
    "check_interval",
    "high_threshold_pct",
    "low_threshold_pct",
    "max_action_count",
    "max_action_volume",
    "alert_mail",
    "notify",
    "report_file",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerConfig {
    /// seconds between two usage checks
    pub check_interval: i64,
    pub high_threshold_pct: f64,
    pub low_threshold_pct: f64,
    /// 0 means unlimited
    pub max_action_count: i64,
    /// bytes, 0 means unlimited
    pub max_action_volume: i64,
    pub alert_mail: String,
    pub notify: bool,
    pub report_file: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            check_interval: 5 * MINUTE,
            high_threshold_pct: 90.0,
            low_threshold_pct: 80.0,
            max_action_count: 0,
            max_action_volume: 0,
            alert_mail: String::new(),
            notify: false,
            report_file: "stderr".to_string(),
        }
    }
}

impl TriggerConfig {
    /// parse the `trigger` block of `root`; a missing block gives the defaults
    pub fn from_block(root: &Block) -> Result<Self> {
        let mut config = Self::default();
        let Some(block) = root.block(TRIGGER_BLOCK) else {
            return Ok(config);
        };

        let pct = ParamFlags::NONE.allow_pct_sign().positive();
        read_scalar_params(
            block,
            TRIGGER_BLOCK,
            [
                ScalarParam::new(
                    "check_interval",
                    ParamFlags::NONE.positive().not_null(),
                    ParamTarget::Duration(&mut config.check_interval),
                ),
                ScalarParam::new(
                    "high_threshold_pct",
                    pct,
                    ParamTarget::Float(&mut config.high_threshold_pct),
                ),
                ScalarParam::new(
                    "low_threshold_pct",
                    pct,
                    ParamTarget::Float(&mut config.low_threshold_pct),
                ),
                ScalarParam::new(
                    "max_action_count",
                    ParamFlags::NONE.positive(),
                    ParamTarget::Int64(&mut config.max_action_count),
                ),
                ScalarParam::new(
                    "max_action_volume",
                    ParamFlags::NONE.positive(),
                    ParamTarget::Size(&mut config.max_action_volume),
                ),
                ScalarParam::new(
                    "alert_mail",
                    ParamFlags::NONE.mail(),
                    ParamTarget::String(&mut config.alert_mail),
                ),
                ScalarParam::new("notify", ParamFlags::NONE, ParamTarget::Bool(&mut config.notify)),
                ScalarParam::new(
                    "report_file",
                    ParamFlags::NONE.absolute_path().stdio_allowed(),
                    ParamTarget::String(&mut config.report_file),
                ),
            ],
        )?;

        check_unknown_parameters(block, TRIGGER_BLOCK, &ALLOWED);
        config.validate(block.line)?;
        Ok(config)
    }

    fn validate(&self, line: u32) -> Result<()> {
        for (name, value) in [
            ("high_threshold_pct", self.high_threshold_pct),
            ("low_threshold_pct", self.low_threshold_pct),
        ] {
            if value > 100.0 {
                return Err(ConfigError::constraint(format!(
                    "'{}::{}' must not exceed 100%, line {}.",
                    TRIGGER_BLOCK, name, line
                )));
            }
        }
        if self.low_threshold_pct > self.high_threshold_pct {
            return Err(ConfigError::constraint(format!(
                "'{}::low_threshold_pct' ({:.2}%) must not exceed high_threshold_pct ({:.2}%), line {}.",
                TRIGGER_BLOCK, self.low_threshold_pct, self.high_threshold_pct, line
            )));
        }
        Ok(())
    }
}

fn format_pct(value: f64) -> String {
    format!("{}%", value)
}

impl ConfigModule for TriggerConfig {
    fn name(&self) -> &'static str {
        TRIGGER_BLOCK
    }

    fn mask(&self) -> u32 {
        MODULE_MASK_TRIGGER
    }

    fn set_defaults(&mut self) {
        *self = Self::default();
    }

    fn read(&mut self, root: &Block) -> Result<()> {
        *self = Self::from_block(root)?;
        Ok(())
    }

    fn reload(&mut self, root: &Block) -> Result<()> {
        let new = Self::from_block(root)?;

        if new.check_interval != self.check_interval {
            info!(
                "{}::check_interval updated: {} -> {}",
                TRIGGER_BLOCK,
                format_duration(self.check_interval),
                format_duration(new.check_interval)
            );
            self.check_interval = new.check_interval;
        }
        if new.high_threshold_pct != self.high_threshold_pct {
            info!(
                "{}::high_threshold_pct updated: {} -> {}",
                TRIGGER_BLOCK,
                format_pct(self.high_threshold_pct),
                format_pct(new.high_threshold_pct)
            );
            self.high_threshold_pct = new.high_threshold_pct;
        }
        if new.low_threshold_pct != self.low_threshold_pct {
            info!(
                "{}::low_threshold_pct updated: {} -> {}",
                TRIGGER_BLOCK,
                format_pct(self.low_threshold_pct),
                format_pct(new.low_threshold_pct)
            );
            self.low_threshold_pct = new.low_threshold_pct;
        }

        let fixed = [
            ("max_action_count", new.max_action_count != self.max_action_count),
            ("max_action_volume", new.max_action_volume != self.max_action_volume),
            ("alert_mail", new.alert_mail != self.alert_mail),
            ("notify", new.notify != self.notify),
            ("report_file", new.report_file != self.report_file),
        ];
        for (name, changed) in fixed {
            if changed {
                warn!(
                    "{}::{} changed in config file, but cannot be modified dynamically",
                    TRIGGER_BLOCK, name
                );
            }
        }
        Ok(())
    }

    fn write_template(&self, w: &mut TemplateWriter) {
        w.begin_block(0, TRIGGER_BLOCK, None);
        w.comment(1, "interval between two checks of filesystem usage");
        w.param(1, "check_interval", "5min");
        w.blank();
        w.comment(1, "start purging above this usage, stop below the low threshold");
        w.param(1, "high_threshold_pct", "90%");
        w.param(1, "low_threshold_pct", "80%");
        w.blank();
        w.comment(1, "limits per run (0 = unlimited); k, M, G, T suffixes are allowed");
        w.param(1, "max_action_count", "100k");
        w.param(1, "max_action_volume", "10TB");
        w.blank();
        w.comment(1, "who to notify when the high threshold is reached");
        w.param(1, "alert_mail", "root@localhost");
        w.param(1, "notify", "yes");
        w.comment(1, "absolute path, or stdout/stderr/syslog");
        w.param(1, "report_file", "/var/log/polcfg/report.log");
        w.end_block(0);
    }

    fn write_defaults(&self, w: &mut TemplateWriter) {
        let d = Self::default();
        w.begin_block(0, TRIGGER_BLOCK, None);
        w.param(1, "check_interval", &format_duration(d.check_interval));
        w.param(1, "high_threshold_pct", &format_pct(d.high_threshold_pct));
        w.param(1, "low_threshold_pct", &format_pct(d.low_threshold_pct));
        w.param(1, "max_action_count", &d.max_action_count.to_string());
        w.param(1, "max_action_volume", &format_size(d.max_action_volume));
        w.param(1, "alert_mail", "(none)");
        w.param(1, "notify", if d.notify { "yes" } else { "no" });
        w.param(1, "report_file", &d.report_file);
        w.end_block(0);
    }
}
