use anyhow::Result;
use crossbeam_channel::Sender;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use crate::store::{Incoming, JsonFileSource, RecordSource};

const SETTLE: Duration = Duration::from_millis(200);

fn touches(event: &notify::Event, file_name: Option<&OsStr>) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    );
    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| file_name.is_none() || p.file_name() == file_name)
}

pub fn load_once(source: &dyn RecordSource, tx: &Sender<Incoming>) -> bool {
    let origin = source.describe();
    let msg = match source.fetch() {
        Ok(records) => {
            tracing::info!(origin = %origin, records = records.len(), "records loaded");
            Incoming::loaded(origin, records)
        }
        Err(err) => {
            tracing::warn!(origin = %origin, "record load failed: {err:#}");
            Incoming::error(origin, format!("{err:#}"))
        }
    };
    tx.send(msg).is_ok()
}

pub fn spawn_reader(source: Box<dyn RecordSource>, watch: Option<JsonFileSource>, tx: Sender<Incoming>) {
    std::thread::spawn(move || {
        if !load_once(source.as_ref(), &tx) {
            return;
        }
        let Some(file) = watch else {
            return;
        };
        if let Err(err) = watch_file(&file, &tx) {
            tracing::warn!(path = %file.path().display(), "record watcher stopped: {err:#}");
            let _ = tx.send(Incoming::error(file.describe(), format!("{err:#}")));
        }
    });
}

fn watch_file(file: &JsonFileSource, tx: &Sender<Incoming>) -> Result<()> {
    let (raw_tx, raw_rx) = crossbeam_channel::unbounded::<notify::Event>();
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: std::result::Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = raw_tx.send(event);
            }
        },
        notify::Config::default(),
    )?;

    // editors often replace the file, so watch its directory
    let dir = file
        .path()
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    let name = file.path().file_name();
    tracing::debug!(path = %file.path().display(), "watching records");

    while let Ok(event) = raw_rx.recv() {
        if !touches(&event, name) {
            continue;
        }
        // coalesce bursts from a single save
        while raw_rx.recv_timeout(SETTLE).is_ok() {}
        if !load_once(file, tx) {
            break;
        }
    }
    Ok(())
}
