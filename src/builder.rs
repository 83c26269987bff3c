//! Key tree builder
//!
//! Walks the `children` maps of a JSON document and flattens them into an
//! ordered list of keys. The list is a pre-order traversal: every key is
//! followed by its own descendants before its next sibling, which is also the
//! order the keys are written in.
//!
//! Each builder owns its [`OrderCounter`], so two builds never share ordering
//! state.

use std::path::Path;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::{RegError, Result};
use crate::key::{OrderCounter, ParentKey, RegKey, RootKey};
use crate::paths::resolve_path;
use crate::variables::Variables;

/// Builds [`RegKey`]s from JSON node maps
pub struct KeyTreeBuilder<'a> {
    variables: &'a Variables,
    base_dir: &'a Path,
    counter: OrderCounter,
}

impl<'a> KeyTreeBuilder<'a> {
    /// `base_dir` is the directory relative icon paths resolve against
    pub fn new(variables: &'a Variables, base_dir: &'a Path) -> Self {
        Self {
            variables,
            base_dir,
            counter: OrderCounter::new(),
        }
    }

    /// Build the whole tree once per root, concatenated in root order
    pub fn build_roots(
        &mut self,
        nodes: &Map<String, Value>,
        roots: &[Rc<RootKey>],
    ) -> Result<Vec<Rc<RegKey>>> {
        let mut keys = Vec::new();
        for root in roots {
            tracing::debug!(root = %root.key_path(), "Building key tree");
            keys.extend(self.build_keys(nodes, &ParentKey::Root(root.clone()))?);
        }
        Ok(keys)
    }

    /// Process `nodes` recursively, returning the keys in pre-order
    pub fn build_keys(
        &mut self,
        nodes: &Map<String, Value>,
        parent: &ParentKey,
    ) -> Result<Vec<Rc<RegKey>>> {
        let mut keys = Vec::new();

        for (node_name, node) in nodes {
            let fields = node.as_object().ok_or_else(|| RegError::InvalidField {
                node: node_name.clone(),
                field: node_name.clone(),
                expected: "an object",
            })?;

            let display_name = required_str(node_name, fields, "name")?;
            // Empty icon or command count as not set
            let icon = optional_str(node_name, fields, "icon")?.filter(|icon| !icon.is_empty());
            let command =
                optional_str(node_name, fields, "command")?.filter(|command| !command.is_empty());
            let children = optional_object(node_name, fields, "children")?;

            if children.is_some() && command.is_some() {
                return Err(RegError::ConflictingFields {
                    node: node_name.clone(),
                });
            }

            let icon = match icon {
                Some(raw) => Some(resolve_path(&self.variables.resolve(raw)?, self.base_dir)?),
                None => None,
            };
            let command = match command {
                Some(raw) => Some(self.variables.resolve(raw)?),
                None => None,
            };

            let order_index = self.counter.next_for(parent);
            let mut key = RegKey::new(node_name, display_name, parent.clone(), order_index);
            if let Some(icon) = icon {
                key = key.with_icon(icon);
            }
            if let Some(command) = command {
                key = key.with_command(command);
            }

            let key = Rc::new(key);
            tracing::debug!(key = %key.key_path(), "Built key");
            keys.push(key.clone());

            if let Some(children) = children {
                keys.extend(self.build_keys(children, &ParentKey::Key(key))?);
            }
        }

        Ok(keys)
    }
}

fn required_str<'v>(node: &str, fields: &'v Map<String, Value>, field: &str) -> Result<&'v str> {
    optional_str(node, fields, field)?.ok_or_else(|| RegError::MissingField {
        node: node.to_string(),
        field: field.to_string(),
    })
}

fn optional_str<'v>(
    node: &str,
    fields: &'v Map<String, Value>,
    field: &str,
) -> Result<Option<&'v str>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(RegError::InvalidField {
            node: node.to_string(),
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn optional_object<'v>(
    node: &str,
    fields: &'v Map<String, Value>,
    field: &str,
) -> Result<Option<&'v Map<String, Value>>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(RegError::InvalidField {
            node: node.to_string(),
            field: field.to_string(),
            expected: "an object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {:?}", other),
        }
    }

    fn root(path: &str) -> ParentKey {
        ParentKey::Root(Rc::new(RootKey::new(path)))
    }

    fn sample_tree() -> Map<String, Value> {
        nodes(json!({
            "baguette": {
                "name": "Baguette",
                "children": {
                    "baguette_01": {
                        "name": "Baguette 01",
                        "children": {
                            "eat": { "name": "Eat", "command": "app.exe eat" },
                            "destroy": { "name": "Destroy", "command": "app.exe destroy" }
                        }
                    },
                    "slice": { "name": "Slice", "command": "app.exe slice" }
                }
            },
            "fromage": {
                "name": "Fromage",
                "children": {
                    "buy": { "name": "Buy", "command": "app.exe buy" }
                }
            }
        }))
    }

    #[test]
    fn test_pre_order_and_names() {
        let variables = Variables::new();
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&sample_tree(), &root(r"HKCR\.exr")).unwrap();

        let names: Vec<&str> = keys.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec!["baguette", "001baguette_01", "002eat", "003destroy", "004slice", "fromage", "001buy"]
        );
        assert_eq!(
            keys[2].key_path().to_string(),
            r"HKCR\.exr\shell\baguette\shell\001baguette_01\shell\002eat"
        );
    }

    #[test]
    fn test_order_indices() {
        let variables = Variables::new();
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&sample_tree(), &root(r"HKCR\.exr")).unwrap();

        let indices: Vec<Option<u32>> = keys.iter().map(|k| k.order_index()).collect();
        assert_eq!(
            indices,
            vec![None, Some(1), Some(2), Some(3), Some(4), None, Some(1)]
        );
    }

    #[test]
    fn test_multiple_roots_copy_the_tree() {
        let variables = Variables::new();
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let roots = vec![
            Rc::new(RootKey::new(r"HKCR\.exr")),
            Rc::new(RootKey::new(r"HKCR\.png")),
        ];
        let keys = builder.build_roots(&sample_tree(), &roots).unwrap();

        assert_eq!(keys.len(), 14);
        assert!(keys[..7].iter().all(|k| k.key_path().to_string().starts_with(r"HKCR\.exr\")));
        assert!(keys[7..].iter().all(|k| k.key_path().to_string().starts_with(r"HKCR\.png\")));
        let first: Vec<&str> = keys[..7].iter().map(|k| k.name()).collect();
        let second: Vec<&str> = keys[7..].iter().map(|k| k.name()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_variables_in_icon_and_command() {
        let variables: Variables = [("logo", r"C:\icons\x.ico"), ("app", "E:/app/app.exe")]
            .into_iter()
            .collect();
        let tree = nodes(json!({
            "menu": { "name": "Menu", "icon": "@logo", "command": "@app \"%1\"" }
        }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&tree, &root("HKCR")).unwrap();

        assert_eq!(keys[0].icon(), Some(r"C:\icons\x.ico"));
        assert_eq!(keys[0].command(), Some("E:/app/app.exe \"%1\""));
    }

    #[test]
    fn test_relative_icon_uses_base_dir() {
        let variables = Variables::new();
        let tree = nodes(json!({ "menu": { "name": "Menu", "icon": "./icons/f.ico" } }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/data/menus"));
        let keys = builder.build_keys(&tree, &root("HKCR")).unwrap();

        assert_eq!(keys[0].icon(), Some("/data/menus/icons/f.ico"));
    }

    #[test]
    fn test_conflicting_fields() {
        let variables = Variables::new();
        let tree = nodes(json!({
            "ok": { "name": "Ok", "command": "ok.exe" },
            "bad": {
                "name": "Bad",
                "command": "bad.exe",
                "children": { "x": { "name": "X", "command": "x.exe" } }
            }
        }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));

        match builder.build_keys(&tree, &root("HKCR")) {
            Err(RegError::ConflictingFields { node }) => assert_eq!(node, "bad"),
            other => panic!("Expected ConflictingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_display_name() {
        let variables = Variables::new();
        let tree = nodes(json!({
            "parent": { "name": "Parent", "children": { "child": { "command": "x.exe" } } }
        }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));

        match builder.build_keys(&tree, &root("HKCR")) {
            Err(RegError::MissingField { node, field }) => {
                assert_eq!(node, "child");
                assert_eq!(field, "name");
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_field_types() {
        let variables = Variables::new();
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));

        let tree = nodes(json!({ "a": { "name": 3 } }));
        assert!(matches!(
            builder.build_keys(&tree, &root("HKCR")),
            Err(RegError::InvalidField { expected: "a string", .. })
        ));

        let tree = nodes(json!({ "a": { "name": "A", "children": ["x"] } }));
        assert!(matches!(
            builder.build_keys(&tree, &root("HKCR")),
            Err(RegError::InvalidField { expected: "an object", .. })
        ));

        let tree = nodes(json!({ "a": "A" }));
        assert!(matches!(
            builder.build_keys(&tree, &root("HKCR")),
            Err(RegError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_unresolved_variable_aborts_build() {
        let variables = Variables::new();
        let tree = nodes(json!({ "a": { "name": "A", "icon": "@missing" } }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));

        assert!(matches!(
            builder.build_keys(&tree, &root("HKCR")),
            Err(RegError::UnresolvedVariable { .. })
        ));
    }

    #[test]
    fn test_null_fields_are_absent() {
        let variables = Variables::new();
        let tree = nodes(json!({
            "a": { "name": "A", "icon": null, "command": "run.exe", "children": null }
        }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&tree, &root("HKCR")).unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].icon(), None);
        assert_eq!(keys[0].command(), Some("run.exe"));
    }

    #[test]
    fn test_empty_command_is_placeholder() {
        let variables = Variables::new();
        let tree = nodes(json!({ "a": { "name": "A", "command": "" } }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&tree, &root(r"HKCR\.exr")).unwrap();

        assert_eq!(keys[0].command(), None);
        let rendered = keys[0].render();
        assert!(rendered.contains("\"subCommands\"=\"\"\n"));
        assert!(!rendered.contains("\\command]"));
    }

    #[test]
    fn test_empty_command_with_children_is_not_a_conflict() {
        let variables = Variables::new();
        let tree = nodes(json!({
            "a": {
                "name": "A",
                "command": "",
                "children": { "b": { "name": "B", "command": "run.exe" } }
            }
        }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&tree, &root("HKCR")).unwrap();

        let names: Vec<&str> = keys.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["a", "001b"]);
        assert_eq!(keys[0].command(), None);
    }

    #[test]
    fn test_empty_icon_is_skipped() {
        let variables = Variables::new();
        let tree = nodes(json!({ "a": { "name": "A", "icon": "", "command": "run.exe" } }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));
        let keys = builder.build_keys(&tree, &root("HKCR")).unwrap();

        assert_eq!(keys[0].icon(), None);
        assert!(!keys[0].render().contains("\"icon\""));
    }

    #[test]
    fn test_icon_empty_after_expansion_fails() {
        let variables: Variables = [("blank", "\"\"")].into_iter().collect();
        let tree = nodes(json!({ "a": { "name": "A", "icon": "@blank" } }));
        let mut builder = KeyTreeBuilder::new(&variables, Path::new("/tmp"));

        assert!(matches!(
            builder.build_keys(&tree, &root("HKCR")),
            Err(RegError::InvalidPath(_))
        ));
    }
}
