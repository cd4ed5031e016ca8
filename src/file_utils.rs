use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::DocumentError;

// @module: File and directory utilities for locale-parallel document trees

/// Extensions treated as HTML documents
const DOCUMENT_EXTENSIONS: &[&str] = &["html", "htm"];

/// Where a missing target document's skeleton comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The target document already exists
    Existing,
    /// Copied from another document in the target directory
    Sibling(PathBuf),
    /// Copied from the source document itself
    Source,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Check whether a path has an HTML extension
    pub fn is_document(path: &Path) -> bool {
        path.extension()
            .map(|ext| DOCUMENT_EXTENSIONS.iter().any(|known| ext.to_string_lossy().eq_ignore_ascii_case(known)))
            .unwrap_or(false)
    }

    /// Find HTML documents below a directory, sorted by path
    pub fn find_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_document(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Source documents by convention: everything under `<root>/<source>/<scope>`
    ///
    /// A missing directory yields no documents rather than an error.
    pub fn find_source_documents(root: &Path, source_locale: &str, scope: Option<&str>) -> Result<Vec<PathBuf>> {
        let mut dir = root.join(source_locale);
        if let Some(scope) = scope.filter(|s| !s.is_empty()) {
            dir = dir.join(scope);
        }

        if !Self::dir_exists(&dir) {
            debug!("Source directory {:?} does not exist", dir);
            return Ok(Vec::new());
        }

        Self::find_documents(&dir)
    }

    /// Expand explicit inputs: files, directories and glob patterns
    ///
    /// Supported wildcards are `*` and `?` within one path component and `**`
    /// across components. Results are deduplicated and sorted.
    pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for input in inputs {
            if has_wildcards(input) {
                let pattern = glob_to_regex(input)?;
                let base = glob_base(input);
                if !base.exists() {
                    continue;
                }
                for entry in WalkDir::new(&base).follow_links(true) {
                    let entry = entry.context("Failed to read directory entry")?;
                    let path = entry.path();
                    if path.is_file() && Self::is_document(path) && pattern.is_match(&path.to_string_lossy()) {
                        result.push(path.to_path_buf());
                    }
                }
            } else {
                let path = PathBuf::from(input);
                if Self::dir_exists(&path) {
                    result.extend(Self::find_documents(&path)?);
                } else if Self::file_exists(&path) {
                    result.push(path);
                } else {
                    debug!("Input {:?} does not exist", path);
                }
            }
        }

        result.sort();
        result.dedup();
        Ok(result)
    }

    /// Path of the target-locale counterpart of a source document
    ///
    /// `<root>/<source>/a/b.html` maps to `<root>/<target>/a/b.html`. Paths
    /// are compared as given first and canonicalized second.
    pub fn target_path(
        source_document: &Path,
        root: &Path,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<PathBuf, DocumentError> {
        let source_root = root.join(source_locale);

        if let Ok(relative) = source_document.strip_prefix(&source_root) {
            return Ok(root.join(target_locale).join(relative));
        }

        let outside = || DocumentError::OutsideSourceTree {
            path: source_document.to_path_buf(),
            root: source_root.clone(),
        };

        let canonical_document = source_document.canonicalize().map_err(|_| outside())?;
        let canonical_root = root.canonicalize().map_err(|_| outside())?;
        let relative = canonical_document
            .strip_prefix(canonical_root.join(source_locale))
            .map_err(|_| outside())?;

        Ok(canonical_root.join(target_locale).join(relative))
    }

    /// Decide where a target document's skeleton comes from, without touching disk
    ///
    /// An existing target wins, then the first other document of the target
    /// directory in path order, then the source document itself.
    pub fn template_for(target: &Path) -> TemplateSource {
        if Self::file_exists(target) {
            return TemplateSource::Existing;
        }

        let Some(dir) = target.parent() else {
            return TemplateSource::Source;
        };

        let Ok(entries) = fs::read_dir(dir) else {
            return TemplateSource::Source;
        };

        let mut siblings: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && Self::is_document(path) && path != target)
            .collect();
        siblings.sort();

        siblings
            .into_iter()
            .next()
            .map(TemplateSource::Sibling)
            .unwrap_or(TemplateSource::Source)
    }

    /// Make sure a target document exists, copying a skeleton if needed
    pub fn ensure_target_document(target: &Path, source_document: &Path) -> Result<TemplateSource, DocumentError> {
        let template = Self::template_for(target);
        if template == TemplateSource::Existing {
            return Ok(template);
        }

        let from = match &template {
            TemplateSource::Sibling(sibling) => sibling.as_path(),
            _ => source_document,
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| DocumentError::io(parent, e))?;
        }
        fs::copy(from, target).map_err(|e| DocumentError::io(target, e))?;
        debug!("Bootstrapped {:?} from {:?}", target, from);

        Ok(template)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(|c: char| c == '*' || c == '?')
}

/// Longest leading directory of a pattern without wildcards
fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component {
            if has_wildcards(&part.to_string_lossy()) {
                break;
            }
        }
        base.push(component.as_os_str());
    }

    if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base
    }
}

/// Translate a glob into an anchored regex over the path string
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    let mut chars = pattern.chars().peekable();

    // Walked paths of a relative pattern may carry a leading "./"
    if !pattern.starts_with('/') && !pattern.starts_with("./") {
        regex.push_str(r"(?:\./)?");
    }

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            },
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }

    regex.push('$');
    Regex::new(&regex).with_context(|| format!("Invalid input pattern: {}", pattern))
}
