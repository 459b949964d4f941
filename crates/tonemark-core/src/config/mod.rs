use crate::{Error, Result};
use serde_json::{Map, Value};
use std::sync::OnceLock;

static DEFAULT_SITE_CONFIG: OnceLock<TonemarkConfig> = OnceLock::new();

/// Built-in defaults: the fallback font stack, the lookup-service href markers and the probe
/// settings.
pub fn default_site_config() -> TonemarkConfig {
    DEFAULT_SITE_CONFIG
        .get_or_init(|| {
            let json_text = include_str!("default_config.json");
            let value: Value =
                serde_json::from_str(json_text).expect("bundled default config JSON is valid");
            TonemarkConfig::from_value(value)
        })
        .clone()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TonemarkConfig(Value);

impl Default for TonemarkConfig {
    fn default() -> Self {
        default_site_config()
    }
}

impl TonemarkConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses user JSON and deep-merges it over the site defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(Error::InvalidConfigJson {
                message: "top-level value must be an object".to_string(),
            });
        }
        let mut config = default_site_config();
        config.deep_merge(&value);
        Ok(config)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.lookup(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    /// Like [`Self::get_str`], but distinguishes "absent" from "present with the wrong type".
    pub fn require_str(&self, dotted_path: &str) -> Result<&str> {
        match self.lookup(dotted_path) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(Error::InvalidConfig {
                path: dotted_path.to_string(),
                message: format!("expected a string, found {other}"),
            }),
            None => Err(Error::InvalidConfig {
                path: dotted_path.to_string(),
                message: "missing".to_string(),
            }),
        }
    }

    pub fn require_f64(&self, dotted_path: &str) -> Result<f64> {
        match self.lookup(dotted_path) {
            Some(v) => v.as_f64().ok_or_else(|| Error::InvalidConfig {
                path: dotted_path.to_string(),
                message: format!("expected a number, found {v}"),
            }),
            None => Err(Error::InvalidConfig {
                path: dotted_path.to_string(),
                message: "missing".to_string(),
            }),
        }
    }

    pub fn require_bool(&self, dotted_path: &str) -> Result<bool> {
        match self.lookup(dotted_path) {
            Some(v) => v.as_bool().ok_or_else(|| Error::InvalidConfig {
                path: dotted_path.to_string(),
                message: format!("expected a boolean, found {v}"),
            }),
            None => Err(Error::InvalidConfig {
                path: dotted_path.to_string(),
                message: "missing".to_string(),
            }),
        }
    }

    /// Writes `value` at `dotted_path`, creating intermediate objects and replacing any
    /// non-object value found on the way (the root included).
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let mut slot = &mut self.0;
        for key in dotted_path.split('.') {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            slot = &mut slot[key];
        }
        *slot = value;
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    if let (Value::Object(base_map), Value::Object(in_map)) = (&mut *base, incoming) {
        for (key, in_value) in in_map {
            // A missing key starts as `null`, which the recursion overwrites.
            deep_merge_value(base_map.entry(key.as_str()).or_insert(Value::Null), in_value);
        }
        return;
    }
    *base = incoming.clone();
}
