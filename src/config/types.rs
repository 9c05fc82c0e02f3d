use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Globals
// ---------------------------------------------------------------------------

/// A single templating global: a string, a number or a boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GlobalValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

/// Ordered key/value globals. Insertion order follows layer order.
pub type GlobalMap = IndexMap<String, GlobalValue>;

impl GlobalValue {
    /// Infer a typed value from a raw `KEY=VALUE` right-hand side.
    ///
    /// `true`/`false` become booleans, anything that parses as a JSON number
    /// becomes a number, everything else stays a string.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => match serde_json::from_str::<serde_json::Number>(raw) {
                Ok(n) => Self::Number(n),
                Err(_) => Self::String(raw.to_owned()),
            },
        }
    }
}

impl From<&str> for GlobalValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for GlobalValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for GlobalValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for GlobalValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl fmt::Display for GlobalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatePointer {
    pub id: String,
    pub target: String,
}

impl TemplatePointer {
    pub fn new(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Manifest shape
// ---------------------------------------------------------------------------

/// The subset of `package.json` we care about. Everything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PackageManifest {
    #[serde(default)]
    pub backstage: Option<BackstageSection>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BackstageSection {
    #[serde(default)]
    pub new: Option<NewSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NewSection {
    #[serde(default)]
    pub templates: Option<Vec<TemplatePointer>>,
    #[serde(default)]
    pub globals: Option<GlobalMap>,
}

// ---------------------------------------------------------------------------
// Loader input / output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LoadConfigOptions {
    /// Manifest to read. Defaults to `package.json` in the working directory.
    pub package_path: Option<PathBuf>,
    /// Highest-precedence globals, typically from the command line.
    pub global_overrides: GlobalMap,
}

/// Normalized templating configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConfig {
    pub is_using_default_templates: bool,
    pub template_pointers: Vec<TemplatePointer>,
    pub globals: GlobalMap,
}
