//! Loading formulas from disk and grouping them into batches.

use crate::sat::batch::{BatchBuilder, IncidenceBatch};
use crate::sat::cnf::Cnf;
use crate::sat::dimacs::parse_file;
use crate::sat::error::Result;
use crate::sat::log_targets;
use std::path::{Path, PathBuf};

/// An incidence batch together with the names of its formulas, in order.
#[derive(Debug, Clone)]
pub struct NamedBatch {
    /// Formula names, one per formula in batch order.
    pub names: Vec<String>,
    /// The packed formulas.
    pub incidence: IncidenceBatch,
}

impl NamedBatch {
    /// # Errors
    ///
    /// Anything [`BatchBuilder::build`] rejects.
    pub fn from_formulas(formulas: Vec<(String, Cnf)>) -> Result<Self> {
        let mut builder = BatchBuilder::new();
        let mut names = Vec::with_capacity(formulas.len());
        for (name, cnf) in formulas {
            builder.push(&cnf);
            names.push(name);
        }
        Ok(Self {
            names,
            incidence: builder.build()?,
        })
    }

    /// Number of formulas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the batch holds no formulas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The `.cnf` files under a directory, in a stable order.
#[derive(Debug, Clone)]
pub struct FormulaSet {
    root: PathBuf,
    paths: Vec<PathBuf>,
}

impl FormulaSet {
    /// Walks `root` recursively and keeps every `.cnf` file, sorted by path.
    /// A single file may also be given as `root`. With `sample_size`, only the
    /// first `n` files are kept.
    ///
    /// # Errors
    ///
    /// [`EvalError::Io`](crate::sat::error::EvalError::Io) if the directory
    /// cannot be walked.
    pub fn discover(root: &Path, sample_size: Option<usize>) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if path.extension().is_none_or(|ext| ext != "cnf") {
                log::warn!(
                    target: log_targets::LOADER,
                    "skipping non-CNF file: {}",
                    path.display()
                );
                continue;
            }
            paths.push(path.to_path_buf());
        }
        paths.sort();

        if let Some(n) = sample_size {
            paths.truncate(n);
        }

        log::info!(
            target: log_targets::LOADER,
            "found {} formulas under {}",
            paths.len(),
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            paths,
        })
    }

    /// Number of discovered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no file was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Discovered files in evaluation order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Name a formula is known by: its path relative to the root, or the file
    /// name when the root is the file itself.
    #[must_use]
    pub fn name_of(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
            _ => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        }
    }

    /// Parses and packs formulas lazily, `batch_size` at a time. A batch
    /// size of zero is treated as one.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Result<NamedBatch>> + '_ {
        self.paths.chunks(batch_size.max(1)).map(move |chunk| {
            let formulas = chunk
                .iter()
                .map(|path| Ok((self.name_of(path), parse_file(path)?)))
                .collect::<Result<Vec<_>>>()?;
            NamedBatch::from_formulas(formulas)
        })
    }
}
