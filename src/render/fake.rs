//! Test renderer that never spawns a process.

use super::Renderer;
use crate::error::ConvertError;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Treats the source file as already-rendered HTML.
///
/// A file containing `FAIL` produces a converter failure.
#[derive(Default)]
pub struct Passthrough {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    /// Held after the file is read, before returning
    delay: Duration,
}

impl Passthrough {
    /// A renderer whose conversions take at least `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most conversions ever running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn convert(path: &Path) -> Result<String, ConvertError> {
        let html = fs::read_to_string(path).map_err(|source| ConvertError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        if html.contains("FAIL") {
            return Err(ConvertError::Failed {
                path: path.to_path_buf(),
                stderr: "syntax error".into(),
            });
        }
        Ok(html)
    }
}

impl Renderer for Passthrough {
    fn render(&self, path: &Path) -> Result<String, ConvertError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        // Content is read before the call is counted.
        let result = Self::convert(path);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Rewrite a file and push its mtime forward so the change is visible
/// even on coarse-grained filesystems.
pub fn touch(path: &Path, html: &str) {
    let before = fs::metadata(path).unwrap().modified().unwrap();
    fs::write(path, html).unwrap();
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(before + Duration::from_secs(2))
        .unwrap();
}
