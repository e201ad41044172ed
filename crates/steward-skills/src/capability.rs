//! Capability definition files.

use crate::error::{CapabilityError, CapabilityResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use steward_core::frontmatter;

/// A capability definition loaded from `skills/<name>.md`.
///
/// The file is plain Markdown instructions, optionally preceded by a
/// frontmatter block:
///
/// ```text
/// ---
/// name: triage-inbox
/// description: Draft a plan for a staged record
/// allowed-tools: Read Write
/// ---
/// ## Instructions
/// ...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Declared name, or the file stem
    pub name: String,
    /// Optional one-line description
    pub description: Option<String>,
    /// Instruction payload sent to the external program
    pub instructions: String,
    /// Operations this capability asks for, if it narrows the default
    pub allowed_tools: Option<Vec<String>>,
    /// Definition file
    pub path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "allowed-tools")]
    allowed_tools: Option<ToolList>,
}

/// `allowed-tools` may be a space/comma separated string or a YAML list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToolList {
    Line(String),
    List(Vec<String>),
}

impl ToolList {
    fn into_vec(self) -> Vec<String> {
        match self {
            ToolList::Line(line) => line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            ToolList::List(tools) => tools,
        }
    }
}

impl Capability {
    /// Read and parse a definition file.
    pub fn load(path: &Path) -> CapabilityResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CapabilityError::Definition {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse definition content read from `path`.
    pub fn parse(content: &str, path: &Path) -> CapabilityResult<Self> {
        let (meta, body) = match frontmatter::split(content) {
            Some((yaml, body)) if yaml.trim().is_empty() => (Frontmatter::default(), body),
            Some((yaml, body)) => {
                let meta = serde_yaml::from_str(yaml).map_err(|source| {
                    CapabilityError::InvalidDefinition {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                (meta, body)
            }
            None => (Frontmatter::default(), content),
        };

        let name = meta.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Ok(Self {
            name,
            description: meta.description,
            instructions: body.trim().to_string(),
            allowed_tools: meta.allowed_tools.map(ToolList::into_vec),
            path: path.to_path_buf(),
        })
    }

    /// Definition file name, as shown in requests and dry-run messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    /// The configured allow-list, narrowed by what this capability declares.
    ///
    /// A capability can only drop operations, never add ones the
    /// configuration does not permit.
    pub fn permitted_tools(&self, configured: &[String]) -> Vec<String> {
        match &self.allowed_tools {
            None => configured.to_vec(),
            Some(declared) => configured
                .iter()
                .filter(|tool| declared.contains(tool))
                .cloned()
                .collect(),
        }
    }
}
