use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use crate::config::defaults;
use crate::config::schema::manifest_schema;
use crate::config::types::{GlobalMap, LoadConfigOptions, NewConfig, NewSection, PackageManifest};
use crate::error::{ConfigError, ConfigValidationError};

/// Manifest consulted when no explicit path is given.
pub const DEFAULT_PACKAGE_PATH: &str = "package.json";

/// Load the templating configuration from a package manifest.
///
/// Globals are layered lowest to highest: built-in defaults, then
/// `backstage.new.globals` from the manifest, then `options.global_overrides`.
/// A missing `templates` list falls back to the built-in templates.
pub async fn load_config(options: LoadConfigOptions) -> Result<NewConfig, ConfigError> {
    let path = options
        .package_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_PATH));

    tracing::debug!("config: reading {}", path.display());
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::FileAccess {
            path: path.clone(),
            source,
        })?;

    let new_section = parse_manifest(&path, &contents)?;

    let (is_using_default_templates, template_pointers) = match new_section.templates {
        Some(templates) => (false, templates),
        None => (true, defaults::templates()),
    };

    let globals = merge_globals([
        defaults::globals(),
        new_section.globals.unwrap_or_default(),
        options.global_overrides,
    ]);

    tracing::debug!(
        "config: {} template(s){}, {} global(s)",
        template_pointers.len(),
        if is_using_default_templates {
            " (defaults)"
        } else {
            ""
        },
        globals.len()
    );

    Ok(NewConfig {
        is_using_default_templates,
        template_pointers,
        globals,
    })
}

/// Parse and validate the manifest, returning its `backstage.new` block.
fn parse_manifest(path: &Path, contents: &str) -> Result<NewSection, ConfigError> {
    let raw: JsonValue = serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;

    manifest_schema()
        .validate(&raw)
        .map_err(|violations| ConfigValidationError {
            path: path.to_owned(),
            violations,
        })?;

    // The schema has already accepted the shape, so this only fails on
    // inputs the schema and the serde types disagree about.
    let manifest: PackageManifest =
        serde_json::from_value(raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

    Ok(manifest
        .backstage
        .and_then(|backstage| backstage.new)
        .unwrap_or_default())
}

/// Overlay global layers in order. Later layers win on key collision while
/// keys keep the position of their first appearance.
fn merge_globals<const N: usize>(layers: [GlobalMap; N]) -> GlobalMap {
    let mut merged = GlobalMap::new();
    for layer in layers {
        merged.extend(layer);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::GlobalValue;

    #[test]
    fn merge_globals_later_layers_win() {
        let merged = merge_globals([
            defaults::globals(),
            GlobalMap::from([("baseVersion".to_owned(), GlobalValue::from("0.2.0"))]),
            GlobalMap::from([("private".to_owned(), GlobalValue::Bool(false))]),
        ]);
        assert_eq!(
            merged,
            GlobalMap::from([
                ("license".to_owned(), GlobalValue::from("Apache-2.0")),
                ("baseVersion".to_owned(), GlobalValue::from("0.2.0")),
                ("private".to_owned(), GlobalValue::Bool(false)),
            ])
        );
    }

    #[test]
    fn merge_globals_keeps_first_position() {
        let merged = merge_globals([
            GlobalMap::from([
                ("a".to_owned(), GlobalValue::from(1)),
                ("b".to_owned(), GlobalValue::from(2)),
            ]),
            GlobalMap::from([
                ("c".to_owned(), GlobalValue::from(3)),
                ("a".to_owned(), GlobalValue::from(4)),
            ]),
        ]);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(merged["a"], GlobalValue::from(4));
    }

    #[test]
    fn parse_manifest_without_backstage_block() {
        let section = parse_manifest(Path::new("package.json"), r#"{"name": "x"}"#).unwrap();
        assert!(section.templates.is_none());
        assert!(section.globals.is_none());
    }

    #[test]
    fn parse_manifest_rejects_invalid_json() {
        let err = parse_manifest(Path::new("package.json"), "{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
