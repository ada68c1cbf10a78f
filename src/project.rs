use anyhow::{Context as _, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Name of the optional override file at the project root.
pub const OVERRIDE_FILE: &str = ".wakatime-project";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub branch: Option<String>,
}

impl Project {
    pub fn named(name: impl Into<String>) -> Self {
        Project {
            name: name.into(),
            branch: None,
        }
    }

    /// Reads the override file under `root`, falling back to `default_name`
    /// when it is absent, unreadable or has an empty first line.
    pub fn resolve(root: &Path, default_name: &str) -> Self {
        match read_override(root) {
            Ok(Some(content)) => Self::parse(&content, default_name),
            Ok(None) => Self::named(default_name),
            Err(e) => {
                tracing::warn!("{:#}, using default project name", e);
                Self::named(default_name)
            }
        }
    }

    fn parse(content: &str, default_name: &str) -> Self {
        let mut lines = content.trim_start_matches('\u{feff}').lines().map(str::trim);

        let name = match lines.next() {
            Some(n) if !n.is_empty() => n.to_owned(),
            _ => default_name.to_owned(),
        };
        let branch = lines.next().filter(|b| !b.is_empty()).map(str::to_owned);

        Project { name, branch }
    }
}

fn read_override(root: &Path) -> Result<Option<String>> {
    let path = root.join(OVERRIDE_FILE);

    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read \"{}\"", path.display())),
    }
}
