use std::collections::HashMap;
use std::sync::LazyLock;

use scanplan_error::{DbError, Result};

use crate::arrays::scalar::ScalarValue;
use crate::explain::explainable::ExplainConfig;

/// Configuration for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub debug_print_bindings: bool,
    pub verbose_explain: bool,
    pub verify_plan_serialization: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            debug_print_bindings: false,
            verbose_explain: false,
            verify_plan_serialization: false,
        }
    }
}

impl SessionConfig {
    pub fn set_from_scalar(&mut self, name: &str, value: &ScalarValue) -> Result<()> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        (func.set)(value, self)
    }

    pub fn get_as_scalar(&self, name: &str) -> Result<ScalarValue> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| DbError::new(format!("Missing setting for '{name}'")))?;

        Ok((func.get)(self))
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();
        let scalar = def_conf.get_as_scalar(name)?;
        self.set_from_scalar(name, &scalar)
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Explain config derived from this session.
    pub fn explain_config(&self) -> ExplainConfig {
        ExplainConfig {
            verbose: self.verbose_explain,
            print_bindings: self.debug_print_bindings,
        }
    }
}

struct SettingFunctions {
    set: fn(scalar: &ScalarValue, conf: &mut SessionConfig) -> Result<()>,
    get: fn(conf: &SessionConfig) -> ScalarValue,
}

impl SettingFunctions {
    const fn new<S: SessionSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_scalar as _,
            get: S::get_as_scalar as _,
        }
    }
}

fn insert_setting<S: SessionSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<DebugPrintBindings>(&mut map);
    insert_setting::<VerboseExplain>(&mut map);
    insert_setting::<VerifyPlanSerialization>(&mut map);

    map
});

pub trait SessionSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut SessionConfig) -> Result<()>;
    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue;
}

pub struct DebugPrintBindings;

impl SessionSetting for DebugPrintBindings {
    const NAME: &'static str = "debug_print_bindings";
    const DESCRIPTION: &'static str = "Append table indexes to operator names in plan output";

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        conf.debug_print_bindings = scalar.try_as_bool()?;
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        conf.debug_print_bindings.into()
    }
}

pub struct VerboseExplain;

impl SessionSetting for VerboseExplain {
    const NAME: &'static str = "verbose_explain";
    const DESCRIPTION: &'static str = "Include column ids and table refs in explain output";

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        conf.verbose_explain = scalar.try_as_bool()?;
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        conf.verbose_explain.into()
    }
}

pub struct VerifyPlanSerialization;

impl SessionSetting for VerifyPlanSerialization {
    const NAME: &'static str = "verify_plan_serialization";
    const DESCRIPTION: &'static str =
        "Decode every serialized plan and check its output types match the original";

    fn set_from_scalar(scalar: &ScalarValue, conf: &mut SessionConfig) -> Result<()> {
        conf.verify_plan_serialization = scalar.try_as_bool()?;
        Ok(())
    }

    fn get_as_scalar(conf: &SessionConfig) -> ScalarValue {
        conf.verify_plan_serialization.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_reset() {
        let mut conf = SessionConfig::default();
        conf.set_from_scalar("debug_print_bindings", &ScalarValue::Boolean(true))
            .unwrap();
        assert!(conf.debug_print_bindings);
        assert_eq!(
            ScalarValue::Boolean(true),
            conf.get_as_scalar("debug_print_bindings").unwrap()
        );
        assert!(conf.explain_config().print_bindings);

        conf.reset("debug_print_bindings").unwrap();
        assert!(!conf.debug_print_bindings);
    }

    #[test]
    fn unknown_setting() {
        let mut conf = SessionConfig::default();
        assert!(conf.set_from_scalar("nope", &ScalarValue::Boolean(true)).is_err());
        assert!(conf.get_as_scalar("nope").is_err());
    }

    #[test]
    fn wrong_value_type() {
        let mut conf = SessionConfig::default();
        assert!(
            conf.set_from_scalar("verbose_explain", &ScalarValue::from("yes"))
                .is_err()
        );
    }
}
