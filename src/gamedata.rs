//! Two-root gamedata search path.
//!
//! A mod usually ships only the files it changes, so every lookup tries the
//! mod's gamedata (`main`) before the base game's (`alt`).

use std::path::{Component, Path, PathBuf};

use crate::error::ParseError;

/// The main and (optional) alternative gamedata roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gamedata {
    main: PathBuf,
    alt: Option<PathBuf>,
}

impl Gamedata {
    /// Both roots are made absolute and normalized.
    pub fn new(main: impl Into<PathBuf>, alt: Option<PathBuf>) -> Self {
        Self {
            main: absolutize(&main.into()),
            alt: alt.map(|p| absolutize(&p)),
        }
    }

    pub fn main(&self) -> &Path {
        &self.main
    }

    pub fn alt(&self) -> Option<&Path> {
        self.alt.as_deref()
    }

    /// Find a gamedata-relative file, main root first.
    pub fn locate(&self, relative: &str) -> Result<PathBuf, ParseError> {
        let relative = PathBuf::from(convert_separators(relative));
        let candidate = normalize(&self.main.join(&relative));
        if candidate.is_file() {
            return Ok(candidate);
        }
        if let Some(alt) = &self.alt {
            let candidate = normalize(&alt.join(&relative));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(ParseError::GamedataFileNotFound { path: relative })
    }

    /// Resolve `#include "target"` found in `including_file`.
    ///
    /// An include written inside the alt root is looked up in the main root
    /// first, so mod overrides apply to transitively included files too.
    pub fn resolve_include(
        &self,
        including_file: &Path,
        target: &str,
    ) -> Result<PathBuf, ParseError> {
        let mut base = parent_dir(including_file);
        if let Some(alt) = &self.alt {
            if let Ok(rest) = base.strip_prefix(alt) {
                base = self.main.join(rest);
            }
        }

        let mut resolved = normalize(&base.join(convert_separators(target)));
        if !resolved.is_file() {
            if let (Some(alt), Ok(rest)) = (&self.alt, resolved.strip_prefix(&self.main)) {
                resolved = alt.join(rest);
            }
        }
        if resolved.is_file() {
            return Ok(resolved);
        }

        match self.relative_to_root(&resolved) {
            Some(path) => Err(ParseError::GamedataIncludeNotFound { path }),
            None => Err(ParseError::IncludeNotFound { path: resolved }),
        }
    }

    fn relative_to_root(&self, path: &Path) -> Option<PathBuf> {
        std::iter::once(&self.main)
            .chain(self.alt.as_ref())
            .find_map(|root| path.strip_prefix(root).ok())
            .map(Path::to_path_buf)
    }
}

/// Resolve an include without gamedata roots: relative to the including file.
pub fn resolve_plain_include(including_file: &Path, target: &str) -> Result<PathBuf, ParseError> {
    let resolved = normalize(&parent_dir(including_file).join(convert_separators(target)));
    if resolved.is_file() {
        Ok(resolved)
    } else {
        Err(ParseError::IncludeNotFound { path: resolved })
    }
}

fn parent_dir(file: &Path) -> PathBuf {
    absolutize(file.parent().unwrap_or_else(|| Path::new("")))
}

/// Engine paths use `\`; convert them where the host does not.
#[cfg(not(windows))]
pub fn convert_separators(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(windows)]
pub fn convert_separators(path: &str) -> String {
    path.to_string()
}

/// Make a path absolute against the working directory, then normalize it.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

/// Lexically remove `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
