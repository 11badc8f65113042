//! Dictionary loading
//!
//! Builds one filter per dictionary source in parallel and only yields a
//! registry once every source has loaded. The first failure aborts loading;
//! loaders still running see the abort and stop between lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::FilterConfig;
use crate::domain::BloomFilter;
use crate::error::FilterError;
use crate::registry::FilterRegistry;

/// Result of loading a single dictionary source
#[derive(Debug)]
pub struct LoadOutcome {
    /// Filter name derived from the source path
    pub name: String,
    /// The loaded filter, or why loading failed
    pub result: Result<BloomFilter, FilterError>,
}

/// Abort signal shared by the loaders of one `load_all` call
#[derive(Clone, Debug, Default)]
pub struct LoadCancel(Arc<AtomicBool>);

impl LoadCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancels the loaders when collection ends, however it ends
struct AbortOnDrop(LoadCancel);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Derive a filter name from a dictionary path
///
/// The name is the file's base name with the directory stripped; the
/// extension is kept (`/data/animals.txt` → `animals.txt`).
pub fn filter_name(path: &Path) -> Result<String, FilterError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| FilterError::InvalidSource {
            path: path.display().to_string(),
        })
}

/// Stream newline-delimited keywords from `reader` into `filter`
///
/// Lines have no length limit. A trailing `\n` and then a trailing `\r` are
/// stripped; no empty keyword is produced after a final newline. Returns the
/// number of keywords inserted, or `Interrupted` once `cancel` fires.
pub fn read_keywords<R: BufRead>(
    mut reader: R,
    filter: &mut BloomFilter,
    cancel: &LoadCancel,
) -> io::Result<usize> {
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "loading aborted"));
        }

        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(count);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        filter.insert(&line);
        count += 1;
    }
}

/// Load a single dictionary source into a new filter
///
/// This is blocking file I/O; call it from a blocking context. The filter is
/// only allocated once the source is open.
pub fn load_source(path: &Path, config: &FilterConfig, cancel: &LoadCancel) -> LoadOutcome {
    let name = match filter_name(path) {
        Ok(name) => name,
        Err(e) => {
            return LoadOutcome {
                name: path.display().to_string(),
                result: Err(e),
            }
        }
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            return LoadOutcome {
                result: Err(FilterError::SourceOpen {
                    name: name.clone(),
                    source,
                }),
                name,
            }
        }
    };

    let mut filter = BloomFilter::new(config.size_bits, config.hash_count);

    let result = match read_keywords(BufReader::new(file), &mut filter, cancel) {
        Ok(count) => {
            debug!(filter = %name, keywords = count, "Dictionary read");
            Ok(filter)
        }
        Err(source) => Err(FilterError::SourceRead {
            name: name.clone(),
            source,
        }),
    };

    LoadOutcome { name, result }
}

/// Load every dictionary source in parallel and build the registry
///
/// Exactly one result is collected per source, in completion order. The
/// first error is returned and no registry is produced.
pub async fn load_all(
    sources: &[PathBuf],
    config: &FilterConfig,
) -> Result<FilterRegistry, FilterError> {
    load_all_with(sources, config, load_source).await
}

/// `load_all` with a custom single-source loader
pub async fn load_all_with<L>(
    sources: &[PathBuf],
    config: &FilterConfig,
    loader: L,
) -> Result<FilterRegistry, FilterError>
where
    L: Fn(&Path, &FilterConfig, &LoadCancel) -> LoadOutcome + Clone + Send + 'static,
{
    config.validate()?;

    if sources.is_empty() {
        return Err(FilterError::NoSources);
    }

    let mut names = Vec::with_capacity(sources.len());
    for source in sources {
        let name = filter_name(source)?;
        if names.contains(&name) {
            return Err(FilterError::DuplicateFilter { name });
        }
        names.push(name);
    }

    info!(
        sources = ?names,
        size_bits = config.size_bits,
        hash_count = config.hash_count,
        "Loading bloom filter dictionaries"
    );

    match config.load_timeout {
        Some(limit) => tokio::time::timeout(limit, collect(sources, config, loader))
            .await
            .map_err(|_| {
                error!(limit = ?limit, "Bloom filter loading timed out");
                FilterError::LoadTimeout { limit }
            })?,
        None => collect(sources, config, loader).await,
    }
}

/// Fan out one blocking loader per source and join exactly N outcomes
async fn collect<L>(
    sources: &[PathBuf],
    config: &FilterConfig,
    loader: L,
) -> Result<FilterRegistry, FilterError>
where
    L: Fn(&Path, &FilterConfig, &LoadCancel) -> LoadOutcome + Clone + Send + 'static,
{
    let expected = sources.len();
    let (tx, mut rx) = mpsc::channel::<LoadOutcome>(expected);
    let cancel = LoadCancel::new();
    let _abort = AbortOnDrop(cancel.clone());

    for source in sources {
        let tx = tx.clone();
        let source = source.clone();
        let config = config.clone();
        let cancel = cancel.clone();
        let loader = loader.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = loader(&source, &config, &cancel);
            // Receiver is gone only if loading was already aborted
            let _ = tx.blocking_send(outcome);
        });
    }
    drop(tx);

    let mut loaded = Vec::with_capacity(expected);
    while loaded.len() < expected {
        let Some(outcome) = rx.recv().await else {
            error!(expected, received = loaded.len(), "Loader exited without reporting");
            return Err(FilterError::LoaderLost {
                expected,
                received: loaded.len(),
            });
        };

        match outcome.result {
            Ok(filter) => {
                info!(
                    filter = %outcome.name,
                    keywords = filter.elements_inserted(),
                    bits_set = filter.bits_set(),
                    estimated_fpr = filter.false_positive_rate(),
                    "Bloom filter loaded"
                );
                loaded.push((outcome.name, filter));
            }
            Err(e) => {
                error!(filter = %outcome.name, error = %e, "Bloom filter init failed");
                return Err(e);
            }
        }
    }

    info!(filters = loaded.len(), "All bloom filters loaded");
    FilterRegistry::from_filters(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::time::Duration;
    use tempfile::TempDir;

    fn small_config() -> FilterConfig {
        FilterConfig::new(1 << 16, 5)
    }

    fn write_dict(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_filter_name_strips_directory() {
        assert_eq!(
            filter_name(Path::new("/data/dicts/animals.txt")).unwrap(),
            "animals.txt"
        );
        assert_eq!(filter_name(Path::new("mid")).unwrap(), "mid");
    }

    #[test]
    fn test_filter_name_rejects_pathless_source() {
        assert!(matches!(
            filter_name(Path::new("/")),
            Err(FilterError::InvalidSource { .. })
        ));
        assert!(filter_name(Path::new("..")).is_err());
    }

    #[test]
    fn test_read_keywords_line_handling() {
        let mut filter = BloomFilter::new(1 << 16, 5);
        let input = Cursor::new(b"cat\r\ndog\n\nbird".to_vec());

        let count = read_keywords(input, &mut filter, &LoadCancel::new()).unwrap();

        assert_eq!(count, 4, "cat, dog, empty line, bird");
        assert!(filter.contains(b"cat"));
        assert!(filter.contains(b"dog"));
        assert!(filter.contains(b"bird"));
        assert!(filter.contains(b""));
        assert!(!filter.contains(b"cat\r"));
    }

    #[test]
    fn test_read_keywords_no_token_after_final_newline() {
        let mut filter = BloomFilter::new(1 << 16, 5);

        let count = read_keywords(
            Cursor::new(b"cat\ndog\n".to_vec()),
            &mut filter,
            &LoadCancel::new(),
        )
        .unwrap();

        assert_eq!(count, 2);
        assert!(!filter.contains(b""));
    }

    #[test]
    fn test_read_keywords_long_line() {
        let mut filter = BloomFilter::new(1 << 16, 5);
        let long = "x".repeat(200_000);

        let count = read_keywords(
            Cursor::new(format!("{long}\nshort\n")),
            &mut filter,
            &LoadCancel::new(),
        )
        .unwrap();

        assert_eq!(count, 2);
        assert!(filter.contains(long.as_bytes()));
    }

    #[test]
    fn test_read_keywords_non_utf8() {
        let mut filter = BloomFilter::new(1 << 16, 5);

        let count = read_keywords(
            Cursor::new(vec![0xff, 0xfe, b'\n']),
            &mut filter,
            &LoadCancel::new(),
        )
        .unwrap();

        assert_eq!(count, 1);
        assert!(filter.contains(&[0xff, 0xfe]));
    }

    #[test]
    fn test_load_source_missing_file() {
        let dir = TempDir::new().unwrap();
        let outcome = load_source(
            &dir.path().join("missing.txt"),
            &small_config(),
            &LoadCancel::new(),
        );

        assert_eq!(outcome.name, "missing.txt");
        assert!(matches!(outcome.result, Err(FilterError::SourceOpen { .. })));
    }

    #[test]
    fn test_load_source_directory_fails_on_read() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("subdir");
        std::fs::create_dir(&sub).unwrap();

        let outcome = load_source(&sub, &small_config(), &LoadCancel::new());

        assert_eq!(outcome.name, "subdir");
        assert!(outcome.result.is_err());
    }

    #[tokio::test]
    async fn test_load_all_populates_every_source_once() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            write_dict(&dir, "animals.txt", "cat\ndog\n"),
            write_dict(&dir, "colors.txt", "red\ngreen\nblue\n"),
            write_dict(&dir, "empty", ""),
        ];

        let registry = load_all(&sources, &small_config()).await.unwrap();

        assert_eq!(
            registry.names(),
            vec!["animals.txt", "colors.txt", "empty"]
        );
        assert_eq!(registry.test("animals.txt", b"cat"), Some(true));
        assert_eq!(registry.test("animals.txt", b"fox"), Some(false));
        assert_eq!(registry.test("colors.txt", b"green"), Some(true));
        assert_eq!(registry.test("zoo", b"cat"), None);
        assert_eq!(registry.test("empty", b""), Some(false));
    }

    #[tokio::test]
    async fn test_load_all_fails_if_any_source_unreadable() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            write_dict(&dir, "animals.txt", "cat\ndog\n"),
            dir.path().join("missing.txt"),
        ];

        let err = load_all(&sources, &small_config()).await.unwrap_err();

        assert!(matches!(err, FilterError::SourceOpen { ref name, .. } if name == "missing.txt"));
    }

    #[tokio::test]
    async fn test_load_all_rejects_duplicate_names() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir(&a).unwrap();
        std::fs::create_dir(&b).unwrap();
        std::fs::write(a.join("words"), "x\n").unwrap();
        std::fs::write(b.join("words"), "y\n").unwrap();

        let err = load_all(&[a.join("words"), b.join("words")], &small_config())
            .await
            .unwrap_err();

        assert!(matches!(err, FilterError::DuplicateFilter { ref name } if name == "words"));
    }

    #[tokio::test]
    async fn test_load_all_rejects_empty_source_list() {
        let err = load_all(&[], &small_config()).await.unwrap_err();
        assert!(matches!(err, FilterError::NoSources));
    }

    #[tokio::test]
    async fn test_load_all_validates_config() {
        let dir = TempDir::new().unwrap();
        let sources = vec![write_dict(&dir, "animals.txt", "cat\n")];

        let err = load_all(&sources, &FilterConfig::new(0, 5)).await.unwrap_err();
        assert!(matches!(err, FilterError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_load_all_with_generous_timeout() {
        let dir = TempDir::new().unwrap();
        let sources = vec![write_dict(&dir, "animals.txt", "cat\n")];
        let config = small_config().with_load_timeout(Duration::from_secs(30));

        let registry = load_all(&sources, &config).await.unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_read_keywords_stops_when_cancelled() {
        let mut filter = BloomFilter::new(1 << 16, 5);
        let cancel = LoadCancel::new();
        cancel.cancel();

        let err = read_keywords(Cursor::new(b"cat\n".to_vec()), &mut filter, &cancel).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert!(!filter.contains(b"cat"));
    }

    #[tokio::test]
    async fn test_load_all_reports_lost_loader() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            write_dict(&dir, "animals.txt", "cat\n"),
            write_dict(&dir, "broken.txt", "dog\n"),
        ];

        let err = load_all_with(&sources, &small_config(), |path, config, cancel| {
            if path.ends_with("broken.txt") {
                panic!("loader died");
            }
            load_source(path, config, cancel)
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            FilterError::LoaderLost {
                expected: 2,
                received: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_load_all_first_error_aborts_other_loaders() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            write_dict(&dir, "animals.txt", "cat\n"),
            dir.path().join("missing.txt"),
        ];
        let (seen_tx, seen_rx) = std::sync::mpsc::channel::<LoadCancel>();
        let seen_tx = std::sync::Arc::new(std::sync::Mutex::new(seen_tx));

        let err = load_all_with(&sources, &small_config(), move |path, config, cancel| {
            if path.ends_with("animals.txt") {
                let _ = seen_tx.lock().unwrap().send(cancel.clone());
            }
            load_source(path, config, cancel)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, FilterError::SourceOpen { .. }));
        let cancel = seen_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(cancel.is_cancelled(), "surviving loaders must see the abort");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_all_times_out_on_stalled_source() {
        let dir = TempDir::new().unwrap();
        let fifo = dir.path().join("stalled");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        let limit = Duration::from_millis(300);
        let config = small_config().with_load_timeout(limit);

        let err = load_all(&[fifo.clone()], &config).await.unwrap_err();
        assert!(matches!(err, FilterError::LoadTimeout { limit: l } if l == limit));

        // Pair the loader parked in open(); it then sees the abort and exits
        drop(
            std::fs::OpenOptions::new()
                .write(true)
                .open(&fifo)
                .unwrap(),
        );
    }
}
