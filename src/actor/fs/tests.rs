use std::path::PathBuf;
use std::time::Duration;

use super::debouncer::{Debouncer, is_temp_file};
use super::types::ChangeKind;

const WINDOW: Duration = Duration::from_millis(300);

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(WINDOW);
    assert!(!debouncer.is_ready());
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_event_kinds_recorded() {
    let mut debouncer = Debouncer::new(WINDOW);

    debouncer.add_event(&make_event(vec!["/kiln-watch/a.sass"], create_kind()));
    debouncer.add_event(&make_event(vec!["/kiln-watch/b.js"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/kiln-watch/c.pug"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(debouncer.changes[&PathBuf::from("/kiln-watch/a.sass")], ChangeKind::Created);
    assert_eq!(debouncer.changes[&PathBuf::from("/kiln-watch/b.js")], ChangeKind::Modified);
    assert_eq!(debouncer.changes[&PathBuf::from("/kiln-watch/c.pug")], ChangeKind::Removed);
}

#[test]
fn test_metadata_only_ignored() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.png"], metadata_kind()));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_files_ignored() {
    assert!(is_temp_file(std::path::Path::new("/src/.index.js.swp")));
    assert!(is_temp_file(std::path::Path::new("/src/main.sass~")));
    assert!(is_temp_file(std::path::Path::new("/src/a.tmp")));
    assert!(!is_temp_file(std::path::Path::new("/src/assets/js/index.js")));

    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js.swp"], modify_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_create_then_remove_discards() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/kiln-watch/new.png"], create_kind()));
    debouncer.add_event(&make_event(vec!["/kiln-watch/new.png"], remove_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_remove_then_create_restores() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js"], create_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/kiln-watch/a.js")], ChangeKind::Created);
}

#[test]
fn test_modify_then_remove_upgrades() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js"], remove_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/kiln-watch/a.js")], ChangeKind::Removed);
}

#[test]
fn test_ready_after_window() {
    let mut debouncer = Debouncer::new(Duration::from_millis(10));
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js"], modify_kind()));
    assert!(!debouncer.is_ready());

    std::thread::sleep(Duration::from_millis(20));
    let batch = debouncer.take_if_ready().expect("batch ready");
    assert_eq!(batch.len(), 1);
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_sleep_duration_within_window() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.add_event(&make_event(vec!["/kiln-watch/a.js"], modify_kind()));
    let dur = debouncer.sleep_duration();
    assert!(dur <= WINDOW);
    assert!(dur >= Duration::from_millis(1));
}

#[cfg(unix)]
#[test]
fn test_symlinked_root_routes_events() {
    use crate::config::KilnConfig;
    use crate::core::AssetClass;
    use crate::paths::PathTable;
    use crate::task::WatchTable;
    use std::fs;

    let temp = tempfile::TempDir::new().unwrap();
    let real = temp.path().join("real");
    fs::create_dir_all(real.join("src/assets/js")).unwrap();
    fs::create_dir_all(real.join("src/assets/sass")).unwrap();
    fs::write(real.join("src/assets/js/index.js"), "").unwrap();
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let mut config = KilnConfig::default();
    config.set_root(&link);
    let table = WatchTable::standard(&PathTable::from_config(&config).unwrap());

    // the watcher may report either spelling of the same file
    let mut debouncer = Debouncer::new(WINDOW);
    let via_link = link.join("src/assets/js/index.js");
    let via_real = real.join("src/assets/sass/gone.scss");
    debouncer.add_event(&make_event(vec![via_link.to_str().unwrap()], modify_kind()));
    debouncer.add_event(&make_event(vec![via_real.to_str().unwrap()], remove_kind()));

    let mut paths: Vec<PathBuf> = debouncer.changes.keys().cloned().collect();
    paths.sort();
    assert_eq!(
        table.triggered(&paths),
        vec![AssetClass::Styles, AssetClass::Scripts]
    );
}
