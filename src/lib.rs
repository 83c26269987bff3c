//! regcreator
//!
//! Generates Windows Registry `.reg` files that install (and remove) nested
//! context-menu entries, from a declarative JSON description of the menu tree.
//!
//! ## Features
//!
//! - **Nested menus**: any depth of sub-menus, rendered with `subCommands`
//! - **Declaration order**: sibling keys are index-prefixed so the registry
//!   shows them in the order they were written
//! - **Variables**: `@name` references to string and path variables
//! - **Removal twin**: the same tree rendered as `[-...]` deletion sections
//!
//! ## Pipeline
//!
//! ```text
//! menu.json ──► document ──► KeyTreeBuilder ──► RegFile ──► menu.reg
//!                  │              │                 │
//!              Variables     resolve_path      set_removing(true)
//!                                                   └──► menu-remove.reg
//! ```
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> regcreator::Result<()> {
//! let regfile = regcreator::regfile_from_json(Path::new("menu.json"))?;
//! regfile.write_to(Path::new("menu.reg"))?;
//!
//! regfile.set_removing(true);
//! regfile.write_to(&regcreator::remove_file_path(Path::new("menu.reg"), "-remove"))?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod key;
pub mod paths;
pub mod regfile;
pub mod variables;

pub use builder::KeyTreeBuilder;
pub use config::RegConfig;
pub use document::{regfile_from_json, regfile_from_str, regfile_from_value, VariablesBlock};
pub use error::{RegError, Result};
pub use key::{KeyPath, OrderCounter, ParentKey, RegKey, RootKey};
pub use paths::{resolve_path, resolve_path_with};
pub use regfile::{remove_file_path, LineEnding, RegFile};
pub use variables::{resolve_variables, Variables};
