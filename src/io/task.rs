//! Background loading with progress events.
//!
//! A [`LoadTask`] reads a geometry file in fixed-size chunks, reporting bytes
//! read as it goes, then parses the whole image. It can run on the calling
//! thread with [`LoadTask::run`] or on a rayon pool with [`LoadTask::spawn`],
//! in which case the outcome arrives as [`LoadEvent`]s on a [`LoadHandle`].
//!
//! # Example
//!
//! ```no_run
//! use triplanar::io::task::LoadTask;
//!
//! let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
//! let handle = LoadTask::new("toilet.glb").spawn(&pool);
//!
//! let geometries = handle
//!     .wait(|loaded, total| println!("{} / {} bytes", loaded, total))
//!     .unwrap();
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use crate::algo::Progress;
use crate::error::{GeometryError, Result};
use crate::geometry::Geometry;

use super::{from_bytes, Format};

/// Default number of bytes read between progress reports.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// One notification from a spawned [`LoadTask`].
///
/// Any number of `Progress` events is followed by exactly one `Loaded` or
/// `Failed`.
#[derive(Debug)]
pub enum LoadEvent {
    /// Bytes read so far out of the file size.
    Progress {
        /// Bytes read.
        loaded: usize,
        /// File size in bytes.
        total: usize,
    },
    /// The file was read and parsed.
    Loaded(Vec<Geometry>),
    /// Reading or parsing failed.
    Failed(GeometryError),
}

/// A pending load of one geometry file.
#[derive(Debug, Clone)]
pub struct LoadTask {
    path: PathBuf,
    chunk_size: usize,
}

impl LoadTask {
    /// Create a task for `path`. The format is taken from its extension.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the number of bytes read between progress reports (at least 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The file this task loads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load on the calling thread.
    ///
    /// `progress` receives `(bytes_read, file_size, message)`. Unsupported
    /// extensions are rejected before the file is opened.
    pub fn run(self, progress: &Progress) -> Result<Vec<Geometry>> {
        let format = Format::require(&self.path)?;
        let message = format!("Loading {}", self.path.display());

        let mut file = File::open(&self.path)?;
        let total = file.metadata()?.len() as usize;
        let mut bytes = Vec::with_capacity(total);
        let mut chunk = vec![0u8; self.chunk_size];

        progress.report(0, total, &message);
        loop {
            match file.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    bytes.extend_from_slice(&chunk[..n]);
                    progress.report(bytes.len().min(total), total, &message);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        progress.finish(total, &message);

        from_bytes(format, &bytes, &self.path)
    }

    /// Load on `pool`, returning a handle that receives the events.
    pub fn spawn(self, pool: &rayon::ThreadPool) -> LoadHandle {
        let (sender, receiver) = mpsc::channel();
        let path = self.path.clone();

        pool.spawn(move || {
            let progress_sender = sender.clone();
            let progress = Progress::new(move |loaded, total, _| {
                // The receiver may already be gone; the load finishes regardless.
                let _ = progress_sender.send(LoadEvent::Progress { loaded, total });
            });

            let event = match self.run(&progress) {
                Ok(geometries) => LoadEvent::Loaded(geometries),
                Err(e) => {
                    log::error!("{}", e);
                    LoadEvent::Failed(e)
                }
            };
            let _ = sender.send(event);
        });

        LoadHandle { receiver, path }
    }
}

/// Receiving end of a spawned [`LoadTask`].
#[derive(Debug)]
pub struct LoadHandle {
    receiver: Receiver<LoadEvent>,
    path: PathBuf,
}

impl LoadHandle {
    /// The file being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the next event if one is ready.
    pub fn try_event(&self) -> Option<LoadEvent> {
        self.receiver.try_recv().ok()
    }

    /// Block on events until the task is done.
    pub fn events(&self) -> impl Iterator<Item = LoadEvent> + '_ {
        self.receiver.iter()
    }

    /// Block until the task finishes, forwarding progress to `on_progress`.
    pub fn wait<F>(self, mut on_progress: F) -> Result<Vec<Geometry>>
    where
        F: FnMut(usize, usize),
    {
        for event in self.receiver.iter() {
            match event {
                LoadEvent::Progress { loaded, total } => on_progress(loaded, total),
                LoadEvent::Loaded(geometries) => return Ok(geometries),
                LoadEvent::Failed(e) => return Err(e),
            }
        }
        Err(GeometryError::load(
            self.path,
            "loader stopped without a result",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const TRIANGLE_OBJ: &str = "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn write_obj(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, TRIANGLE_OBJ).unwrap();
        path
    }

    fn pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap()
    }

    #[test]
    fn test_run_reports_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(&dir);

        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        let geometries = LoadTask::new(&path)
            .with_chunk_size(8)
            .run(&progress)
            .unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].name(), Some("tri"));

        let reports = reports.lock().unwrap();
        let total = TRIANGLE_OBJ.len();
        assert_eq!(reports.first(), Some(&(0, total)));
        assert_eq!(reports.last(), Some(&(total, total)));
        assert!(reports.len() > total / 8);
        assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_unsupported_format_checked_first() {
        let result = LoadTask::new("does/not/exist.ply").run(&Progress::none());
        assert!(matches!(
            result,
            Err(GeometryError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_chunk_size_minimum() {
        let task = LoadTask::new("a.obj").with_chunk_size(0);
        assert_eq!(task.chunk_size, 1);
        assert_eq!(task.path(), Path::new("a.obj"));
    }

    #[test]
    fn test_spawn_and_wait() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(&dir);

        let handle = LoadTask::new(&path).spawn(&pool());
        assert_eq!(handle.path(), path.as_path());

        let mut last = None;
        let geometries = handle
            .wait(|loaded, total| last = Some((loaded, total)))
            .unwrap();
        assert_eq!(geometries[0].vertex_count(), 3);
        let total = TRIANGLE_OBJ.len();
        assert_eq!(last, Some((total, total)));
    }

    #[test]
    fn test_spawn_failure_event() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.obj");

        let handle = LoadTask::new(&missing).spawn(&pool());
        let events: Vec<LoadEvent> = handle.events().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoadEvent::Failed(GeometryError::Io(_))));
    }

    #[test]
    fn test_events_end_with_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_obj(&dir);

        let handle = LoadTask::new(&path).with_chunk_size(4).spawn(&pool());
        let events: Vec<LoadEvent> = handle.events().collect();
        assert!(matches!(events.last(), Some(LoadEvent::Loaded(_))));
        assert!(events[..events.len() - 1]
            .iter()
            .all(|e| matches!(e, LoadEvent::Progress { .. })));
        assert!(handle.try_event().is_none());
    }
}
