//! Naming and filtering policy for one describe run.
use serde::Deserialize;

use crate::model::TypeId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DescribeOptions {
    /// Namespace prefixes whose types are opaque: named, never described.
    pub opaque_namespaces: Vec<String>,
    /// Types under `prefix` are named `name_prefix + simple_name`.
    pub namespace_renames: Vec<NamespaceRename>,
    /// The group whose sole presence in a `groups` attribute is a no-op.
    pub default_group: TypeId,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRename {
    pub prefix: String,
    pub name_prefix: String,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            opaque_namespaces: vec!["java.".to_owned(), "javax.".to_owned()],
            namespace_renames: vec![NamespaceRename {
                prefix: "java.sql.".to_owned(),
                name_prefix: "Sql".to_owned(),
            }],
            default_group: TypeId::from("javax.validation.groups.Default"),
        }
    }
}

impl DescribeOptions {
    pub fn is_opaque(&self, id: &TypeId) -> bool {
        self.opaque_namespaces.iter().any(|p| id.starts_with_namespace(p))
    }

    pub fn rename_for(&self, id: &TypeId) -> Option<&NamespaceRename> {
        self.namespace_renames.iter().find(|r| id.starts_with_namespace(&r.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_keep_defaults() {
        let opts: DescribeOptions = serde_json::from_str(r#"{"opaqueNamespaces": ["org.lib."]}"#).unwrap();
        assert!(opts.is_opaque(&TypeId::from("org.lib.Thing")));
        assert!(!opts.is_opaque(&TypeId::from("java.lang.String")));
        assert_eq!(opts.default_group, TypeId::from("javax.validation.groups.Default"));
        assert!(opts.rename_for(&TypeId::from("java.sql.Timestamp")).is_some());
    }
}
