//! Request assembly.

use crate::capability::Capability;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Build the single textual request for a capability call.
///
/// Context files that do not exist are skipped silently; unreadable ones
/// are skipped with a warning.
pub fn build_request(capability: &Capability, context: &[PathBuf], vault_root: &Path) -> String {
    let mut request = String::new();
    let _ = writeln!(request, "Follow the capability instructions below precisely.\n");
    let _ = writeln!(request, "--- Capability: {} ---", capability.file_name());
    let _ = writeln!(request, "{}", capability.instructions);

    for path in context {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let _ = write!(request, "\n--- Context: {name} ---\n{content}");
                if !content.ends_with('\n') {
                    request.push('\n');
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Skipping missing context file {}", path.display());
            }
            Err(e) => warn!("Skipping unreadable context file {}: {}", path.display(), e),
        }
    }

    let _ = write!(
        request,
        "\nExecute the capability now. Work within the vault at: {}\n",
        vault_root.display()
    );
    request
}
