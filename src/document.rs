//! JSON document loading
//!
//! ## Document format
//! ```json
//! {
//!   "path": "HKEY_CLASSES_ROOT\\SystemFileAssociations\\.exr",
//!   "variables": {
//!     "strings": { "app": "\\\"E:/app/app.exe\\\"" },
//!     "paths": { "logo": "./icons/logo.ico" }
//!   },
//!   "children": {
//!     "baguette": {
//!       "name": "Baguette",
//!       "icon": "@logo",
//!       "children": {
//!         "eat": { "name": "Eat", "command": "@app \\\"%1\\\" eat" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! `path` may also be an array, in which case the whole `children` tree is
//! generated once per root path.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use crate::builder::KeyTreeBuilder;
use crate::error::{RegError, Result};
use crate::key::RootKey;
use crate::paths::resolve_path;
use crate::regfile::RegFile;
use crate::variables::Variables;

/// Name used in errors raised on top-level fields
const DOCUMENT_NODE: &str = "<document>";

/// The `variables` block of a document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariablesBlock {
    /// Used as-is
    #[serde(default)]
    pub strings: BTreeMap<String, String>,

    /// May reference string variables, then resolved to absolute paths
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

impl VariablesBlock {
    /// Build the substitution mapping, resolving path variables against `base_dir`
    pub fn into_variables(self, base_dir: &Path) -> Result<Variables> {
        let strings: Variables = self.strings.into_iter().collect();
        let mut variables = strings.clone();

        for (name, raw) in self.paths {
            let resolved = resolve_path(&strings.resolve(&raw)?, base_dir)?;
            tracing::debug!(variable = %name, path = %resolved, "Resolved path variable");
            variables.insert(name, resolved);
        }

        Ok(variables)
    }
}

/// Read the root key declarations of a document
pub fn root_keys(document: &Value) -> Result<Vec<Rc<RootKey>>> {
    let declared = document.get("path").ok_or_else(|| RegError::MissingField {
        node: DOCUMENT_NODE.to_string(),
        field: "path".to_string(),
    })?;

    let paths: Vec<&str> = match declared {
        Value::String(path) => vec![path.as_str()],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| RegError::UnsupportedRootPath(format!("array containing {}", json_type_name(item))))
            })
            .collect::<Result<_>>()?,
        other => return Err(RegError::UnsupportedRootPath(json_type_name(other).to_string())),
    };

    if paths.is_empty() {
        return Err(RegError::UnsupportedRootPath("an empty array".to_string()));
    }

    paths
        .into_iter()
        .map(|path| {
            let root = RootKey::new(path);
            if root.key_path().is_empty() {
                return Err(RegError::UnsupportedRootPath(format!("empty path \"{}\"", path)));
            }
            Ok(Rc::new(root))
        })
        .collect()
}

/// Build a RegFile from an already parsed document
pub fn regfile_from_value(document: &Value, base_dir: &Path) -> Result<RegFile> {
    let roots = root_keys(document)?;

    let variables = match document.get("variables") {
        None | Some(Value::Null) => Variables::new(),
        Some(block) => VariablesBlock::deserialize(block)?.into_variables(base_dir)?,
    };

    let children = match document.get("children") {
        Some(Value::Object(children)) => children,
        Some(_) => {
            return Err(RegError::InvalidField {
                node: DOCUMENT_NODE.to_string(),
                field: "children".to_string(),
                expected: "an object",
            })
        }
        None => {
            return Err(RegError::MissingField {
                node: DOCUMENT_NODE.to_string(),
                field: "children".to_string(),
            })
        }
    };

    let mut builder = KeyTreeBuilder::new(&variables, base_dir);
    let keys = builder.build_roots(children, &roots)?;

    let mut regfile = RegFile::new();
    for key in keys {
        regfile.add_key(key);
    }
    Ok(regfile)
}

/// Build a RegFile from JSON text, relative paths resolving against `base_dir`
pub fn regfile_from_str(json: &str, base_dir: &Path) -> Result<RegFile> {
    let document: Value = serde_json::from_str(json)?;
    regfile_from_value(&document, base_dir)
}

/// Build a RegFile from a JSON file. Relative paths inside the document resolve
/// against the file's directory.
pub fn regfile_from_json(json_path: &Path) -> Result<RegFile> {
    let json_path = std::path::absolute(json_path)?;
    let base_dir = json_path.parent().map(Path::to_path_buf).unwrap_or_default();

    tracing::debug!("Reading <{}>", json_path.display());
    let json = fs::read_to_string(&json_path)?;
    regfile_from_str(&json, &base_dir)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
