use crate::config::types::{GlobalMap, GlobalValue, TemplatePointer};

/// Built-in template ids paired with their target, in presentation order.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("frontend-plugin", "@backstage/cli/templates/frontend-plugin"),
    ("backend-plugin", "@backstage/cli/templates/backend-plugin"),
    (
        "backend-plugin-module",
        "@backstage/cli/templates/backend-plugin-module",
    ),
    ("plugin-web-library", "@backstage/cli/templates/plugin-web-library"),
    ("plugin-node-library", "@backstage/cli/templates/plugin-node-library"),
    (
        "plugin-common-library",
        "@backstage/cli/templates/plugin-common-library",
    ),
    ("web-library", "@backstage/cli/templates/web-library"),
    ("node-library", "@backstage/cli/templates/node-library"),
    (
        "scaffolder-backend-module",
        "@backstage/cli/templates/scaffolder-backend-module",
    ),
];

/// Template pointers used when the manifest declares none.
pub fn templates() -> Vec<TemplatePointer> {
    BUILTIN_TEMPLATES
        .iter()
        .map(|(id, target)| TemplatePointer::new(*id, *target))
        .collect()
}

/// Lowest-precedence globals.
pub fn globals() -> GlobalMap {
    GlobalMap::from([
        ("license".to_owned(), GlobalValue::from("Apache-2.0")),
        ("baseVersion".to_owned(), GlobalValue::from("0.1.0")),
        ("private".to_owned(), GlobalValue::Bool(true)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_template_ids_are_unique() {
        let templates = templates();
        let mut ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BUILTIN_TEMPLATES.len());
    }

    #[test]
    fn default_globals_order() {
        let keys: Vec<String> = globals().into_keys().collect();
        assert_eq!(keys, ["license", "baseVersion", "private"]);
    }
}
