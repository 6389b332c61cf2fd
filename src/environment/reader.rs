//! PATH and PATHEXT interpretation

use crate::platform::Platform;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Extensions tried on Windows when PATHEXT is not set
pub const DEFAULT_PATHEXT: &[&str] = &[".COM", ".EXE", ".BAT", ".CMD"];

const HOME_TOKEN: &str = "$HOME";

/// Read access to environment variables and the user's home directory
pub trait EnvSource: Send + Sync {
    /// Look up a variable, `None` when unset
    fn var(&self, key: &str) -> Option<String>;

    /// The current user's home directory
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The live process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// A fixed environment snapshot
///
/// Useful for embedding callers that resolve against a child process
/// environment rather than their own.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the home directory used for `~` and `$HOME` expansion
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}

/// Provider of the PATH directory list and executable extension list
pub trait PathSource: Send + Sync {
    /// Ordered PATH directories, `None` when PATH is unset
    fn directories(&self) -> Option<Vec<PathBuf>>;

    /// Ordered executable suffixes; exactly `[""]` off Windows
    fn extensions(&self) -> Vec<String>;
}

/// Parses PATH and PATHEXT from an environment source
#[derive(Clone)]
pub struct PathEnvironmentReader {
    env: Arc<dyn EnvSource>,
    platform: Platform,
}

impl PathEnvironmentReader {
    /// Reader over the live process environment for the host platform
    pub fn new() -> Self {
        Self::with_env(Arc::new(ProcessEnv), Platform::detect())
    }

    /// Reader over an explicit environment and platform
    pub fn with_env(env: Arc<dyn EnvSource>, platform: Platform) -> Self {
        Self { env, platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Normalize a single raw PATH entry
    ///
    /// Returns `None` for entries that are empty once trimmed.
    pub fn normalize_entry(&self, raw: &str) -> Option<PathBuf> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let expanded = self.expand_tokens(trimmed);
        let mut entry = expanded.trim().trim_matches('"').trim().to_string();

        if let Some(home) = self.env.home_dir() {
            let home = home.to_string_lossy();
            entry = expand_tilde(&entry, &home, self.platform);
            entry = replace_ignore_ascii_case(&entry, HOME_TOKEN, &home);
        }

        let entry = self.trim_trailing_separators(&entry);
        if entry.trim().is_empty() {
            return None;
        }
        Some(PathBuf::from(entry))
    }

    /// Expand `%VAR%` on Windows, `$VAR` and `${VAR}` elsewhere.
    /// Unknown variables are left untouched.
    fn expand_tokens(&self, input: &str) -> String {
        if self.platform.is_windows() {
            expand_percent_tokens(input, |name| self.env.var(name))
        } else {
            expand_dollar_tokens(input, |name| self.env.var(name))
        }
    }

    fn trim_trailing_separators(&self, entry: &str) -> String {
        let separators = self.platform.directory_separators();
        let trimmed = entry.trim_end_matches(separators);

        if trimmed.is_empty() {
            // Entry was the filesystem root itself
            return entry.chars().take(1).collect();
        }
        if self.platform.is_windows() && trimmed.ends_with(':') {
            return format!("{}\\", trimmed);
        }
        trimmed.to_string()
    }
}

impl Default for PathEnvironmentReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PathSource for PathEnvironmentReader {
    fn directories(&self) -> Option<Vec<PathBuf>> {
        let raw = self.env.var("PATH")?;
        let separator = self.platform.path_list_separator();

        let dirs: Vec<PathBuf> = raw
            .split(separator)
            .filter_map(|entry| self.normalize_entry(entry))
            .collect();

        debug!("Parsed {} PATH directories", dirs.len());
        Some(dirs)
    }

    fn extensions(&self) -> Vec<String> {
        if !self.platform.is_windows() {
            return vec![String::new()];
        }

        let parsed = self
            .env
            .var("PATHEXT")
            .map(|raw| parse_pathext(&raw, self.platform.path_list_separator()))
            .unwrap_or_default();

        if parsed.is_empty() {
            debug!("PATHEXT unset or empty, using default extensions");
            return DEFAULT_PATHEXT.iter().map(|s| s.to_string()).collect();
        }
        parsed
    }
}

/// Split PATHEXT into dot-prefixed, case-insensitively unique extensions
fn parse_pathext(raw: &str, separator: char) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut extensions = Vec::new();

    for part in raw.split(separator) {
        let ext = part.trim().trim_matches('"').trim();
        if ext.is_empty() {
            continue;
        }
        let ext = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };

        let folded = ext.to_ascii_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            extensions.push(ext);
        }
    }

    extensions
}

fn expand_tilde(entry: &str, home: &str, platform: Platform) -> String {
    match entry.strip_prefix('~') {
        Some("") => home.to_string(),
        Some(rest) if rest.starts_with(platform.directory_separators()) => {
            format!("{}{}", home, rest)
        }
        _ => entry.to_string(),
    }
}

fn replace_ignore_ascii_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let needle_lower = needle.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(&needle_lower) {
        let start = cursor + found;
        out.push_str(&haystack[cursor..start]);
        out.push_str(replacement);
        cursor = start + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

fn expand_percent_tokens(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_dollar_tokens(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let (name, consumed, braced) = if let Some(inner) = after.strip_prefix('{') {
            match inner.find('}') {
                Some(end) => (&inner[..end], end + 2, true),
                None => ("", 0, false),
            }
        } else {
            let len = after
                .char_indices()
                .find(|(_, c)| !is_var_char(*c))
                .map(|(i, _)| i)
                .unwrap_or(after.len());
            (&after[..len], len, false)
        };

        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            out.push('$');
            rest = after;
            continue;
        }

        match lookup(name) {
            Some(value) => out.push_str(&value),
            None if braced => {
                out.push_str("${");
                out.push_str(name);
                out.push('}');
            }
            None => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(env: StaticEnv, platform: Platform) -> PathEnvironmentReader {
        PathEnvironmentReader::with_env(Arc::new(env), platform)
    }

    #[test]
    fn unix_path_is_split_and_normalized() {
        let env = StaticEnv::new()
            .with_home("/home/ada")
            .with_var("PATH", " /usr/bin/ :\"/opt/tools\"::~/bin:$HOME/.cargo/bin:   ");
        let dirs = reader(env, Platform::Linux).directories().unwrap();

        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/usr/bin"),
                PathBuf::from("/opt/tools"),
                PathBuf::from("/home/ada/bin"),
                PathBuf::from("/home/ada/.cargo/bin"),
            ]
        );
    }

    #[test]
    fn home_token_is_case_insensitive() {
        let env = StaticEnv::new()
            .with_home("/home/ada")
            .with_var("PATH", "$home/tools");
        let dirs = reader(env, Platform::MacOS).directories().unwrap();
        assert_eq!(dirs, vec![PathBuf::from("/home/ada/tools")]);
    }

    #[test]
    fn unset_path_is_absent() {
        let dirs = reader(StaticEnv::new(), Platform::Linux).directories();
        assert!(dirs.is_none());
    }

    #[test]
    fn root_entry_survives_trimming() {
        let env = StaticEnv::new().with_var("PATH", "/:/usr/bin");
        let dirs = reader(env, Platform::Linux).directories().unwrap();
        assert_eq!(dirs[0], PathBuf::from("/"));
    }

    #[test]
    fn environment_tokens_expand() {
        let env = StaticEnv::new()
            .with_var("TOOLS", "/srv/tools")
            .with_var("PATH", "$TOOLS/bin:${TOOLS}/sbin:$UNKNOWN/bin");
        let dirs = reader(env, Platform::Linux).directories().unwrap();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/srv/tools/bin"),
                PathBuf::from("/srv/tools/sbin"),
                PathBuf::from("$UNKNOWN/bin"),
            ]
        );
    }

    #[test]
    fn windows_path_uses_semicolons_and_percent_tokens() {
        let env = StaticEnv::new()
            .with_var("SystemRoot", "C:\\Windows")
            .with_var("PATH", "%SystemRoot%\\System32\\;C:\\;;C:\\Tools/");
        let dirs = reader(env, Platform::Windows).directories().unwrap();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("C:\\Windows\\System32"),
                PathBuf::from("C:\\"),
                PathBuf::from("C:\\Tools"),
            ]
        );
    }

    #[test]
    fn non_windows_extensions_are_single_empty_suffix() {
        let env = StaticEnv::new().with_var("PATHEXT", ".EXE;.BAT");
        assert_eq!(reader(env, Platform::Linux).extensions(), vec![String::new()]);
    }

    #[test]
    fn pathext_is_normalized_and_deduplicated() {
        let env = StaticEnv::new().with_var("PATHEXT", ".COM;exe; \".Bat\" ;.EXE;.cmd");
        let exts = reader(env, Platform::Windows).extensions();
        assert_eq!(exts, vec![".COM", ".exe", ".Bat", ".cmd"]);
    }

    #[test]
    fn pathext_defaults_when_unset() {
        let exts = reader(StaticEnv::new(), Platform::Windows).extensions();
        assert_eq!(exts, vec![".COM", ".EXE", ".BAT", ".CMD"]);
    }

    #[test]
    fn tilde_only_expands_at_segment_start() {
        assert_eq!(expand_tilde("~", "/h", Platform::Linux), "/h");
        assert_eq!(expand_tilde("~/bin", "/h", Platform::Linux), "/h/bin");
        assert_eq!(expand_tilde("~bob/bin", "/h", Platform::Linux), "~bob/bin");
    }

    #[test]
    fn percent_expansion_leaves_unknown_and_lone_percent() {
        let out = expand_percent_tokens("100%\\%NOPE%\\x", |_| None);
        assert_eq!(out, "100%\\%NOPE%\\x");
    }
}
