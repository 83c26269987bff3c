//! Path resolution for icons and path variables
//!
//! Resolution never touches the filesystem and never changes the working
//! directory: relative paths are joined onto an explicit base directory
//! (the directory of the JSON document) and lexically normalized.
//!
//! Windows-style absolute paths (`C:\...`, `C:/...`, `\\server\share`) are
//! recognized on every host, since the generated file targets the Windows
//! registry. They keep `\` as separator once normalized.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{RegError, Result};

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"%(?P<win>[A-Za-z_][A-Za-z0-9_()]*)%|\$\{(?P<braced>[A-Za-z_][A-Za-z0-9_]*)\}|\$(?P<bare>[A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("environment variable pattern is valid")
    })
}

/// Resolve `raw` against `base_dir` using the process environment
pub fn resolve_path(raw: &str, base_dir: &Path) -> Result<String> {
    resolve_path_with(raw, base_dir, |name| std::env::var(name).ok())
}

/// Resolve `raw` against `base_dir`, looking environment variables up with `lookup`
pub fn resolve_path_with<F>(raw: &str, base_dir: &Path, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let expanded = expand_env(strip_quotes(raw.trim()), lookup);
    if expanded.is_empty() {
        return Err(RegError::InvalidPath(format!("\"{}\" resolves to an empty path", raw)));
    }

    if is_windows_absolute(&expanded) {
        return Ok(normalize_windows(&expanded));
    }

    let path = Path::new(&expanded);
    if path.is_absolute() {
        return Ok(normalize_native(path).to_string_lossy().into_owned());
    }

    let base = base_dir.to_string_lossy();
    if is_windows_absolute(&base) {
        return Ok(normalize_windows(&format!("{}\\{}", base, expanded)));
    }

    Ok(normalize_native(&base_dir.join(path)).to_string_lossy().into_owned())
}

/// Expand `%VAR%`, `${VAR}` and `$VAR`. Unknown variables are left untouched.
pub fn expand_env<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !input.contains('%') && !input.contains('$') {
        return input.to_string();
    }

    env_pattern()
        .replace_all(input, |caps: &Captures| {
            let name = caps
                .name("win")
                .or_else(|| caps.name("braced"))
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str())
                .unwrap_or_default();
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Strip one layer of matching surrounding quotes
fn strip_quotes(input: &str) -> &str {
    for quote in ['"', '\''] {
        if input.len() >= 2 && input.starts_with(quote) && input.ends_with(quote) {
            return &input[1..input.len() - 1];
        }
    }
    input
}

fn is_windows_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    drive || path.starts_with(r"\\")
}

fn normalize_windows(path: &str) -> String {
    // UNC paths keep their server and share segments
    let (prefix, rest, min_parts) = match path.strip_prefix(r"\\") {
        Some(rest) => (r"\\", rest, 2),
        None => (&path[..2], &path[2..], 0),
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split(['\\', '/']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.len() > min_parts {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    if min_parts == 0 {
        format!("{}\\{}", prefix, parts.join("\\"))
    } else {
        format!("{}{}", prefix, parts.join("\\"))
    }
}

fn normalize_native(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
