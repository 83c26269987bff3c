//! `.reg` file assembly and output

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{RegError, Result};
use crate::key::RegKey;

/// First line of every generated file
pub const FORMAT_HEADER: &str = "Windows Registry Editor Version 5.00";

/// Version embedded in the generation banner
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Line terminator used when rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

/// A .reg file generated from scratch
#[derive(Debug, Default)]
pub struct RegFile {
    comments_header: Vec<String>,
    keys: Vec<Rc<RegKey>>,
    line_ending: LineEnding,
}

impl RegFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Append a key. Keys are rendered in insertion order.
    pub fn add_key(&mut self, key: Rc<RegKey>) {
        self.keys.push(key);
    }

    /// Add a message to the comment block in the header of the file
    pub fn insert_header_comment(&mut self, comment: impl Into<String>) {
        self.comments_header.push(comment.into());
    }

    /// Configure if the keys should be added or removed from the registry
    pub fn set_removing(&self, removing: bool) {
        for key in &self.keys {
            key.set_removing(removing);
        }
    }

    pub fn keys(&self) -> &[Rc<RegKey>] {
        &self.keys
    }

    pub fn header_comments(&self) -> &[String] {
        &self.comments_header
    }

    /// Full text of the file
    pub fn content(&self) -> String {
        let mut content = String::new();
        content.push_str(FORMAT_HEADER);
        content.push_str("\n\n");
        content.push_str(&format!(
            "; File auto generated from regcreator v{}.\n",
            TOOL_VERSION
        ));
        for comment in &self.comments_header {
            content.push_str(&format!("; {}\n", comment));
        }
        content.push('\n');

        for key in &self.keys {
            content.push_str(&key.render());
            content.push('\n');
        }

        match self.line_ending {
            LineEnding::Lf => content,
            LineEnding::Crlf => content.replace('\n', "\r\n"),
        }
    }

    /// Write the file to `export_path`, which should carry the .reg extension
    pub fn write_to(&self, export_path: &Path) -> Result<()> {
        tracing::info!("About to write <{}> to disk ...", export_path.display());
        fs::write(export_path, self.content())?;

        if !export_path.exists() {
            return Err(RegError::WriteVerificationFailed(export_path.to_path_buf()));
        }
        tracing::debug!(keys = self.keys.len(), "Wrote <{}>", export_path.display());
        Ok(())
    }
}

/// Path of the removal twin: `menu.reg` with suffix `-remove` gives `menu-remove.reg`
pub fn remove_file_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(file_name)
}
