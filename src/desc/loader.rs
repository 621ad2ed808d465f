// src/desc/loader.rs

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use tracing::warn;

use crate::desc::model::DescFile;
use crate::errors::{GenError, Result};
use crate::path::SourceFile;

/// Outcome of one parse, shared by every caller that asked for the file.
type ParseOutcome = std::result::Result<Arc<DescFile>, String>;

enum FileSlot {
    /// Some thread is parsing the file; wait on the condvar.
    Parsing,
    Ready(ParseOutcome),
}

/// Thread-safe parse-once cache of description files.
///
/// The first caller to ask for a file parses it; concurrent callers for the
/// same file block until that parse finishes and then observe its result,
/// including a parse failure. The parser is invoked at most once per
/// distinct file across a run.
pub struct InputFileCache {
    files: Mutex<HashMap<SourceFile, FileSlot>>,
    ready: Condvar,
}

impl InputFileCache {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            ready: Condvar::new(),
        }
    }

    /// Parsed tree for `file`, parsing it on this thread if no other thread
    /// has done so or is doing so.
    pub fn get_or_parse(&self, source_root: &Path, file: &SourceFile) -> Result<Arc<DescFile>> {
        {
            let mut files = self.lock_files();
            loop {
                match files.get(file) {
                    None => {
                        files.insert(file.clone(), FileSlot::Parsing);
                        break;
                    }
                    Some(FileSlot::Parsing) => {
                        files = match self.ready.wait(files) {
                            Ok(guard) => guard,
                            Err(poisoned) => {
                                warn!(
                                    "input file cache poisoned while waiting for a parse; \
                                     continuing with cached state"
                                );
                                poisoned.into_inner()
                            }
                        };
                    }
                    Some(FileSlot::Ready(outcome)) => return Self::unpack(file, outcome.clone()),
                }
            }
        }

        // This thread owns the parse. No lock is held while reading disk.
        let outcome = parse_file(source_root, file);

        let mut files = self.lock_files();
        files.insert(file.clone(), FileSlot::Ready(outcome.clone()));
        self.ready.notify_all();
        drop(files);

        Self::unpack(file, outcome)
    }

    /// Number of distinct description files consumed so far, parse failures
    /// included. Reported in the final statistics line.
    pub fn input_file_count(&self) -> usize {
        self.lock_files().len()
    }

    /// Entries are inserted whole, so the map stays consistent even if a
    /// panicking thread poisoned the lock; recover and keep going.
    fn lock_files(&self) -> MutexGuard<'_, HashMap<SourceFile, FileSlot>> {
        match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("input file cache poisoned; continuing with cached state");
                poisoned.into_inner()
            }
        }
    }

    fn unpack(file: &SourceFile, outcome: ParseOutcome) -> Result<Arc<DescFile>> {
        outcome.map_err(|message| GenError::Parse {
            file: file.to_string(),
            message,
        })
    }
}

impl Default for InputFileCache {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_file(source_root: &Path, file: &SourceFile) -> ParseOutcome {
    let disk_path = file.to_disk_path(source_root);
    let contents = fs::read_to_string(&disk_path)
        .map_err(|e| format!("reading {}: {e}", disk_path.display()))?;
    let desc: DescFile = toml::from_str(&contents).map_err(|e| e.to_string())?;
    Ok(Arc::new(desc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn concurrent_misses_parse_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("BUILD.toml"),
            "[target.a]\ntype = \"group\"\n",
        )
        .unwrap();

        let cache = Arc::new(InputFileCache::new());
        let file = SourceFile::resolve("//BUILD.toml", "").unwrap();
        let successes = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let cache = Arc::clone(&cache);
                let file = file.clone();
                let successes = Arc::clone(&successes);
                let root = dir.path().to_path_buf();
                scope.spawn(move || {
                    if cache.get_or_parse(&root, &file).is_ok() {
                        successes.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(successes.load(Ordering::SeqCst), 8);
        assert_eq!(cache.input_file_count(), 1);
    }

    #[test]
    fn parse_failure_is_shared() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("BUILD.toml"), "not [valid toml").unwrap();

        let cache = InputFileCache::new();
        let file = SourceFile::resolve("//BUILD.toml", "").unwrap();

        assert!(cache.get_or_parse(dir.path(), &file).is_err());
        assert!(cache.get_or_parse(dir.path(), &file).is_err());
        assert_eq!(cache.input_file_count(), 1);
    }
}
