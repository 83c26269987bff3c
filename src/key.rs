//! Registry key model
//!
//! A generated file is a flat, ordered list of [`RegKey`]s. Each key points
//! back at its parent through [`ParentKey`], which is either the declared
//! [`RootKey`] or another `RegKey`. Full registry paths are computed on demand
//! by walking those back-references.
//!
//! ```text
//! HKEY_CLASSES_ROOT\SystemFileAssociations\.exr      <- RootKey
//! └── shell\baguette                                 <- root-attached RegKey
//!     └── shell\001baguette_01                       <- nested RegKey
//!         ├── shell\002eat
//!         └── shell\003destroy
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Registry path as a sequence of segments, displayed joined by `\`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// Parse a declared path, accepting both `\` and `/` as separators
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(['\\', '/'])
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Return a new path with `segment` appended
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\\"))
    }
}

/// Top-level registry location the generated keys are attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootKey {
    path: KeyPath,
}

impl RootKey {
    pub fn new(path: &str) -> Self {
        Self {
            path: KeyPath::parse(path),
        }
    }

    pub fn key_path(&self) -> KeyPath {
        self.path.clone()
    }
}

/// The owner a key hangs from
#[derive(Debug, Clone)]
pub enum ParentKey {
    Root(Rc<RootKey>),
    Key(Rc<RegKey>),
}

impl ParentKey {
    pub fn key_path(&self) -> KeyPath {
        match self {
            ParentKey::Root(root) => root.key_path(),
            ParentKey::Key(key) => key.key_path(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ParentKey::Root(_))
    }
}

impl From<Rc<RootKey>> for ParentKey {
    fn from(root: Rc<RootKey>) -> Self {
        ParentKey::Root(root)
    }
}

impl From<Rc<RegKey>> for ParentKey {
    fn from(key: Rc<RegKey>) -> Self {
        ParentKey::Key(key)
    }
}

/// Order index counter for one build pass.
///
/// A root-attached key resets the counter and carries no index. Every other key
/// increments it and takes the new value, so indices only grow until the next
/// root-attached key.
#[derive(Debug, Default)]
pub struct OrderCounter {
    current: u32,
}

impl OrderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for a key about to be created under `parent`
    pub fn next_for(&mut self, parent: &ParentKey) -> Option<u32> {
        if parent.is_root() {
            self.current = 0;
            None
        } else {
            self.current += 1;
            Some(self.current)
        }
    }
}

/// A single context menu entry
#[derive(Debug)]
pub struct RegKey {
    name: String,
    display_name: String,
    icon: Option<String>,
    command: Option<String>,
    order_index: Option<u32>,
    parent: ParentKey,
    removing: Cell<bool>,
}

impl RegKey {
    /// Create a key without icon nor command.
    ///
    /// With an `order_index` the key name becomes the index zero-padded to
    /// three digits followed by `node_name`.
    pub fn new(
        node_name: &str,
        display_name: impl Into<String>,
        parent: ParentKey,
        order_index: Option<u32>,
    ) -> Self {
        let name = match order_index {
            Some(index) => format!("{:03}{}", index, node_name),
            None => node_name.to_string(),
        };
        Self {
            name,
            display_name: display_name.into(),
            icon: None,
            command: None,
            order_index,
            parent,
            removing: Cell::new(false),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn order_index(&self) -> Option<u32> {
        self.order_index
    }

    pub fn parent(&self) -> &ParentKey {
        &self.parent
    }

    pub fn is_removing(&self) -> bool {
        self.removing.get()
    }

    /// Configure if the key should be added or removed from the registry
    pub fn set_removing(&self, removing: bool) {
        self.removing.set(removing);
    }

    /// Full registry path: parent path, then `shell`, then this key's name
    pub fn key_path(&self) -> KeyPath {
        self.parent.key_path().join("shell").join(self.name.as_str())
    }

    /// Render this key as a `.reg` block.
    ///
    /// A key without command is a parent for sub-entries and gets the
    /// `subCommands` marker instead of a `command` subkey.
    pub fn render(&self) -> String {
        let remove_prefix = if self.is_removing() { "-" } else { "" };
        let key_path = self.key_path();

        let mut output = String::new();
        output.push_str(&format!("[{}{}]\n", remove_prefix, key_path));
        output.push_str(&format!("\"MUIVerb\"=\"{}\"\n", self.display_name));

        if let Some(ref icon) = self.icon {
            output.push_str(&format!("\"icon\"=\"{}\"\n", escape_reg_string(icon)));
        }

        match self.command {
            Some(ref command) => {
                output.push_str(&format!("[{}{}]\n", remove_prefix, key_path.join("command")));
                output.push_str(&format!("@=\"{}\"\n", command));
            }
            None => output.push_str("\"subCommands\"=\"\"\n"),
        }

        output
    }
}

impl fmt::Display for RegKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Escape a value for a quoted `.reg` string. Control characters are escaped
/// so the value always stays on one line.
pub fn escape_reg_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\x{:02x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}
