//! Template Cache Module
//!
//! Maps template names to their HTML, read from a directory at startup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::TEMPLATE_FILES;

// == Template Cache ==
/// Read-mostly mapping from template name to HTML content.
#[derive(Debug)]
pub struct TemplateCache {
    /// Directory the files are read from
    dir: PathBuf,
    /// Logical name and file name of every template
    files: Vec<(String, String)>,
    /// Loaded contents; a file that failed to load maps to ""
    templates: RwLock<HashMap<String, String>>,
}

impl TemplateCache {
    // == Constructor ==
    /// Loads the standard certificate templates from `dir`.
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let files = TEMPLATE_FILES
            .iter()
            .map(|(name, file)| (name.to_string(), file.to_string()))
            .collect();
        Self::with_files(dir, files)
    }

    /// Loads an explicit set of `(name, file name)` pairs from `dir`.
    pub fn with_files(dir: impl Into<PathBuf>, files: Vec<(String, String)>) -> Self {
        let dir = dir.into();
        let templates = read_all(&dir, &files);
        Self {
            dir,
            files,
            templates: RwLock::new(templates),
        }
    }

    /// Builds a cache from in-memory contents without touching disk.
    pub fn from_contents<I, K, V>(contents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let templates: HashMap<String, String> = contents
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            dir: PathBuf::new(),
            files: Vec::new(),
            templates: RwLock::new(templates),
        }
    }

    // == Get ==
    /// Returns a template's content, or None for an unknown name.
    pub fn get(&self, name: &str) -> Option<String> {
        self.templates.read().get(name).cloned()
    }

    /// Returns the names of all loaded templates, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of loaded templates, including ones that failed to read.
    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    /// Returns true if no templates are loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    // == Reload ==
    /// Re-reads every template file and replaces the whole mapping.
    ///
    /// Returns the number of templates afterwards.
    pub fn reload(&self) -> usize {
        let templates = read_all(&self.dir, &self.files);
        let count = templates.len();
        *self.templates.write() = templates;
        count
    }
}

fn read_all(dir: &Path, files: &[(String, String)]) -> HashMap<String, String> {
    let mut templates = HashMap::with_capacity(files.len());

    for (name, file) in files {
        let path = dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => {
                info!("Loaded template: {} from {}", name, file);
                content
            }
            Err(err) => {
                warn!(
                    "Error loading template {} from {}: {}",
                    name,
                    path.display(),
                    err
                );
                String::new()
            }
        };
        templates.insert(name.clone(), content);
    }

    info!("Loaded {} templates", templates.len());
    templates
}
