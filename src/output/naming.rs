use anyhow::{bail, Result};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Suffix appended to enhanced outputs
pub const ENHANCE_SUFFIX: &str = "_CK_Enhance";

/// Drop the last extension of a file name: `"song.mp3"` -> `"song"`.
///
/// Names without a dot, or whose only dot is leading, are returned as is.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(index) => &name[..index],
    }
}

/// Output stem for an enhanced copy of `original`
pub fn enhanced_name(original: &str) -> String {
    format!("{}{}", strip_extension(original), ENHANCE_SUFFIX)
}

/// Append `.ext` unless `name` already ends with it (case-insensitive)
pub fn with_extension(name: &str, ext: &str) -> String {
    let dotted = format!(".{}", ext);
    if name.to_lowercase().ends_with(&dotted.to_lowercase()) {
        name.to_string()
    } else {
        format!("{}{}", name, dotted)
    }
}

/// Where an output would land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Nothing at the path yet
    Fresh(PathBuf),
    /// A file with this name already exists; overwriting needs confirmation
    Duplicate(PathBuf),
}

impl Target {
    pub fn path(&self) -> &Path {
        match self {
            Target::Fresh(path) | Target::Duplicate(path) => path,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Target::Duplicate(_))
    }
}

/// True when `name` is one plain file name with no directory parts
fn is_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part == OsStr::new(name),
        _ => false,
    }
}

/// Check `dir/name.ext` for an existing file.
///
/// `name` must be a single file name; separators, `.` and `..` are refused
/// so the output always lands directly in `dir`.
pub fn resolve_target(dir: &Path, name: &str, ext: &str) -> Result<Target> {
    let file = with_extension(name, ext);
    if !is_file_name(name) || !is_file_name(&file) {
        bail!("Invalid output name: {:?}", name);
    }

    let path = dir.join(file);
    Ok(if path.is_file() {
        Target::Duplicate(path)
    } else {
        Target::Fresh(path)
    })
}
