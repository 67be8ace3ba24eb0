//! Linux inotify notification channel.

use crate::config::WatchEvents;
use crate::error::{Error, Result};
use inotify::{Inotify, WatchMask};
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use tracing::info;

impl WatchEvents {
    /// inotify mask registered for this selection.
    pub fn mask(self) -> WatchMask {
        match self {
            WatchEvents::CloseWrite => WatchMask::CLOSE_WRITE,
            WatchEvents::Close => WatchMask::CLOSE,
        }
    }
}

/// An inotify instance watching exactly one directory.
///
/// Reading yields the raw packed notification records for
/// [`NotificationDecoder`](crate::NotificationDecoder). The descriptor is
/// closed when the channel is dropped.
#[derive(Debug)]
pub struct NotifyChannel {
    file: File,
    dir: PathBuf,
}

impl NotifyChannel {
    /// Open an inotify instance and watch `dir` for `events`.
    pub fn open(dir: impl Into<PathBuf>, events: WatchEvents) -> Result<Self> {
        let dir = dir.into();
        let inotify = Inotify::init()?;
        let wd = inotify
            .watches()
            .add(&dir, events.mask())
            .map_err(|source| Error::Watch {
                path: dir.clone(),
                source,
            })?;

        info!(dir = %dir.display(), ?wd, ?events, "watching directory");
        let file = File::from(OwnedFd::from(inotify));
        Ok(Self { file, dir })
    }

    /// Watched directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Read for NotifyChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
