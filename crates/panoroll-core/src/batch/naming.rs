//! Output file naming and what to do when the destination already exists.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Behaviour when a job's output path is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Write `destination/<original name>`, replacing any existing file.
    #[default]
    Overwrite,
    /// Write `destination/<original name>`, but fail the job if it exists.
    Fail,
    /// Write `destination/<stem>_rotated_<angle>deg.<ext>` so results never
    /// share a name with their source.
    Suffix,
}

/// File name a job's result is written under, or `None` if the source path
/// has no file name component.
pub fn output_file_name(
    source: &Path,
    angle_degrees: f64,
    policy: CollisionPolicy,
) -> Option<OsString> {
    let file_name = source.file_name()?;
    match policy {
        CollisionPolicy::Overwrite | CollisionPolicy::Fail => Some(file_name.to_os_string()),
        CollisionPolicy::Suffix => {
            let mut name = source.file_stem()?.to_os_string();
            name.push(format!("_rotated_{angle_degrees:.1}deg"));
            if let Some(ext) = source.extension() {
                name.push(".");
                name.push(ext);
            }
            Some(name)
        }
    }
}

/// Full output path for a source file in `destination_dir`.
pub fn output_path(
    source: &Path,
    angle_degrees: f64,
    destination_dir: &Path,
    policy: CollisionPolicy,
) -> Option<PathBuf> {
    output_file_name(source, angle_degrees, policy).map(|name| destination_dir.join(name))
}
