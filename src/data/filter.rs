use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::loader::{parse_columns, save_ascii};
use super::model::Curve;

/// System under which filters registered without one are filed.
pub const UNKNOWN_SYSTEM: &str = "Unknown_system";

// ---------------------------------------------------------------------------
// Filter library: name → response-curve file, grouped by photometric system
// ---------------------------------------------------------------------------

/// A directory tree of bandpass response files.
///
/// Every file is a filter named by its stem; the name of its parent directory
/// is the photometric system it belongs to:
///
/// ```text
/// filters/
///   Bessell/  U.dat B.dat V.dat R.dat I.dat
///   Gaia/     G.dat
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterLibrary {
    root: Option<PathBuf>,
    /// filter name → file path.
    filters: BTreeMap<String, PathBuf>,
    /// system name → filter names.
    systems: BTreeMap<String, BTreeSet<String>>,
}

impl FilterLibrary {
    /// A library with no root and no filters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `root` recursively.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut library = FilterLibrary {
            root: Some(root.to_path_buf()),
            ..Default::default()
        };
        library.rescan()?;
        Ok(library)
    }

    /// Rebuild the index from the root directory.
    pub fn rescan(&mut self) -> Result<()> {
        self.filters.clear();
        self.systems.clear();
        let Some(root) = self.root.clone() else {
            return Ok(());
        };
        self.walk(&root)
            .with_context(|| format!("scanning filter library {}", root.display()))?;
        log::info!(
            "Filter library {}: {} filters in {} systems",
            root.display(),
            self.filters.len(),
            self.systems.len()
        );
        Ok(())
    }

    fn walk(&mut self, dir: &Path) -> Result<()> {
        let mut entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading directory {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()?;
        // Deterministic order when two systems carry the same filter name.
        entries.sort_by_key(|e| e.file_name());

        let system = dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path)?;
                continue;
            }
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if let Some(previous) = self.filters.insert(name.clone(), path.clone()) {
                log::warn!(
                    "Filter '{name}' in {} shadows {}",
                    path.display(),
                    previous.display()
                );
            }
            self.systems.entry(system.clone()).or_default().insert(name);
        }
        Ok(())
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path of the response file for a filter name.
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.filters.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// All filter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Filter names grouped by photometric system.
    pub fn systems(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.systems
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Copy a two-column response file into the library.
    ///
    /// `name` defaults to the file stem, `system` to [`UNKNOWN_SYSTEM`].
    /// A filter that already exists under that name is never overwritten.
    /// Returns the path of the stored file.
    pub fn add_filter(
        &mut self,
        file: &Path,
        name: Option<&str>,
        system: Option<&str>,
    ) -> Result<PathBuf> {
        let Some(root) = self.root.clone() else {
            bail!("filter library has no root directory");
        };

        let text = std::fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let (wavelength, response) = parse_columns(&text)
            .with_context(|| format!("{} is not a (wavelength, response) file", file.display()))?;
        let curve = Curve::from_unsorted(wavelength, response)?;

        let name = match name {
            Some(n) => n.to_string(),
            None => file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .with_context(|| format!("cannot derive a filter name from {}", file.display()))?,
        };
        let system = system.unwrap_or(UNKNOWN_SYSTEM);

        let system_dir = root.join(system);
        let target = system_dir.join(format!("{name}.dat"));
        if self.contains(&name) || target.exists() {
            log::warn!("Filter {name} not added: a filter with this name already exists");
            bail!("a filter named '{name}' already exists in the library");
        }

        std::fs::create_dir_all(&system_dir)
            .with_context(|| format!("creating {}", system_dir.display()))?;
        save_ascii(&target, &curve)?;
        log::info!("Filter {name} added to filter library under {system}");

        self.rescan()?;
        Ok(target)
    }
}
