use crate::reader::SOURCE_EXTENSION;
use limn_core::{Error, FileUri};
use log::warn;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};

/// What happened to a watched file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

#[derive(Clone, Debug)]
pub struct ChangeEvent {
    pub uri: FileUri,
    pub kind: ChangeKind,
}

/// Watches a project's source directories for filesystem changes and
/// buffers them for the host to drain on its own schedule.
///
/// Only project directories are watched; dependency source is read-only
/// and never reparsed once solved.
pub struct SourceWatcher {
    // Held only to keep the underlying OS watch alive; never read again.
    _watcher: RecommendedWatcher,
    receiver: Receiver<ChangeEvent>,
}

impl SourceWatcher {
    pub fn new(root: &Path, source_directories: &[String]) -> Result<SourceWatcher, Error> {
        let (tx, rx) = channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(error) => {
                    warn!("source watch error: {}", error);
                    return;
                }
            };

            let kind = match event.kind {
                EventKind::Create(_) => ChangeKind::Created,
                EventKind::Modify(_) => ChangeKind::Modified,
                EventKind::Remove(_) => ChangeKind::Removed,
                _ => return,
            };

            for path in event.paths {
                if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
                    continue;
                }
                let Some(uri) = FileUri::from_path(&path) else {
                    warn!("could not build a file uri for {}", path.display());
                    continue;
                };
                let _ = tx.send(ChangeEvent { uri, kind });
            }
        })
        .map_err(to_io_error)?;

        for relative in source_directories {
            let dir = root.join(relative);
            watcher
                .watch(&dir, RecursiveMode::Recursive)
                .map_err(to_io_error)?;
        }

        Ok(SourceWatcher {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Drain every change event queued since the last call, without
    /// blocking. The host is expected to apply these one at a time.
    pub fn poll(&self) -> Vec<ChangeEvent> {
        self.receiver.try_iter().collect()
    }
}

fn to_io_error(error: notify::Error) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::Other, error))
}
