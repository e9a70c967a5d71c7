//! Lexical path resolution confined to the virtual root.
//!
//! Every client-supplied path reference goes through [`resolve`], which
//! returns an absolute path guaranteed to sit under the root. Handlers never
//! compare prefixes themselves. Resolution is purely lexical: symbolic links
//! are not chased.

use std::path::{Component, Path, PathBuf};

/// The outcome of resolving a client path reference.
///
/// `path` is always under the root. `escaped` records that the reference
/// tried to traverse above the root and was re-anchored; `CWD` uses this to
/// clamp the working directory instead of following the re-anchored path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolved {
    pub path: PathBuf,
    pub escaped: bool,
}

/// Resolves `reference` against `cwd`, confining the result to `root`.
///
/// Absolute references are anchored at the root (the client's `/` is the
/// root). Relative references are joined to `cwd`. If the cleaned result
/// falls outside the root, the reference is reinterpreted as absolute and
/// anchored at the root, so `..`-escapes behave as if rooted at virtual `/`.
pub fn resolve(root: &Path, cwd: &Path, reference: &str) -> Resolved {
    let cleaned = clean_path(Path::new(reference));
    let joined = if cleaned.is_absolute() {
        rebase(root, &cleaned)
    } else {
        cwd.join(&cleaned)
    };

    let candidate = clean_path(&joined);
    if candidate.starts_with(root) {
        return Resolved {
            path: candidate,
            escaped: false,
        };
    }

    let anchored = clean_path(&Path::new("/").join(&cleaned));
    Resolved {
        path: rebase(root, &anchored),
        escaped: true,
    }
}

/// The cleaned form of a client reference, used verbatim in reply texts.
pub fn clean_reference(reference: &str) -> String {
    clean_path(Path::new(reference)).display().to_string()
}

/// The client-visible form of an absolute path: `root` stripped as a path
/// prefix, with the root itself displayed as `/`.
pub fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
        Ok(rel) => format!("/{}", rel.display()),
        Err(_) => "/".to_string(),
    }
}

/// Lexically cleans a path: collapses `.`, applies `..`, drops duplicate
/// separators. Leading `..` components of a relative path are kept; `..`
/// never climbs above `/` in an absolute path. An empty result becomes `.`.
fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    let mut cleaned = PathBuf::new();
    for part in parts {
        cleaned.push(part.as_os_str());
    }
    cleaned
}

fn rebase(root: &Path, absolute: &Path) -> PathBuf {
    match absolute.strip_prefix("/") {
        Ok(rel) if rel.as_os_str().is_empty() => root.to_path_buf(),
        Ok(rel) => root.join(rel),
        Err(_) => root.join(absolute),
    }
}
