// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for incremental rebuilds.
//!
//! - Debounced file change events (250ms)
//! - Only files with the template extension are reported
//! - Recursive directory watching

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebouncedEvent, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Watches a directory for changes to template files.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Starts watching `path` recursively.
    ///
    /// `on_change` runs on the watcher thread with the deduplicated paths
    /// of changed files whose extension is `extension`.
    pub fn new<F>(path: &Path, extension: &str, on_change: F) -> anyhow::Result<Self>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let extension = extension.to_string();

        let mut debouncer = new_debouncer(
            Duration::from_millis(250),
            None,
            move |result: Result<Vec<DebouncedEvent>, Vec<notify::Error>>| match result {
                Ok(events) => {
                    let changed = matching_paths(&events, &extension);
                    if !changed.is_empty() {
                        on_change(changed);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        warn!(%error, "file watcher error");
                    }
                }
            },
        )?;

        debouncer.watch(path, RecursiveMode::Recursive)?;

        Ok(Self { _debouncer: debouncer })
    }
}

fn matching_paths(events: &[DebouncedEvent], extension: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = events
        .iter()
        .flat_map(|event| event.paths.iter())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(extension))
        .cloned()
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{Event, EventKind, ModifyKind};
    use std::time::Instant;

    fn event(paths: &[&str]) -> DebouncedEvent {
        let mut event = Event::new(EventKind::Modify(ModifyKind::Any));
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        DebouncedEvent::new(event, Instant::now())
    }

    #[test]
    fn filters_by_extension_and_dedups() {
        let events = vec![
            event(&["src/App.html", "src/notes.txt"]),
            event(&["src/App.html"]),
            event(&["src/list/Item.html"]),
        ];
        assert_eq!(
            matching_paths(&events, "html"),
            vec![PathBuf::from("src/App.html"), PathBuf::from("src/list/Item.html")]
        );
        assert!(matching_paths(&events, "mosaic").is_empty());
    }
}
