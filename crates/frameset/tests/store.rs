//! Store behaviour against real directories and concurrent readers.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use frameset::{
    DirSource, MemorySource, RenderConfig, RenderError, SourceError, TemplateSource, TemplateStore,
};
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_dir_store_renders_nested_templates() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pages/index.html", "Hi {{ name }}");
    write(temp.path(), "layouts/base.html", "<body>{{ Content }}</body>");
    write(temp.path(), "notes.txt", "not a template");

    let store = TemplateStore::builder(DirSource::new(temp.path()))
        .frame("layouts/base")
        .build()
        .unwrap();

    let mut inv = store.invocation();
    inv.set("name", "there");
    assert_eq!(inv.render("pages/index").unwrap(), "<body>Hi there</body>");
    assert!(!store.snapshot().contains("notes.txt"));
}

#[test]
fn test_rebuild_picks_up_changes() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.html", "old");

    let store = TemplateStore::new(DirSource::new(temp.path())).unwrap();
    assert_eq!(store.invocation().render("index.html").unwrap(), "old");

    write(temp.path(), "index.html", "new");
    write(temp.path(), "added.html", "added");

    // Nothing changes until the rebuild is published.
    assert_eq!(store.invocation().render("index.html").unwrap(), "old");
    assert!(store.lookup("added.html").is_none());

    store.rebuild().unwrap();
    assert_eq!(store.invocation().render("index.html").unwrap(), "new");
    assert_eq!(store.invocation().render("added").unwrap(), "added");
}

#[test]
fn test_rebuild_skips_newly_broken_template() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.html", "index");
    write(temp.path(), "other.html", "other");

    let store = TemplateStore::new(DirSource::new(temp.path())).unwrap();
    write(temp.path(), "other.html", "{% if %}");
    store.rebuild().unwrap();

    let set = store.snapshot();
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["index.html"]);
    assert_eq!(set.skipped().len(), 1);
    assert_eq!(set.skipped()[0].path, "other.html");
    assert!(store
        .invocation()
        .render("other.html")
        .unwrap_err()
        .is_not_found());
    assert_eq!(store.invocation().render("index.html").unwrap(), "index");
}

#[test]
fn test_failed_rebuild_keeps_current_set() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("templates");
    write(&root, "index.html", "still here");

    let store = TemplateStore::new(DirSource::new(&root)).unwrap();
    fs::remove_dir_all(&root).unwrap();

    let err = store.rebuild().unwrap_err();
    assert!(matches!(
        err,
        RenderError::Source(SourceError::RootNotFound { .. })
    ));
    assert_eq!(store.invocation().render("index.html").unwrap(), "still here");
}

#[test]
fn test_missing_root_fails_construction() {
    let err = TemplateStore::new(DirSource::new("/no/such/templates")).unwrap_err();
    assert!(matches!(err, RenderError::Source(_)));
}

#[test]
fn test_store_from_yaml_config() {
    let source = MemorySource::new()
        .with("index.tmpl", "{{ title }}")
        .with("shell.tmpl", "{{ site }}|{{ Content }}")
        .with("ignored.html", "ignored");
    let config = RenderConfig::from_yaml(
        r#"
extensions: [".tmpl"]
frames:
  - name: shell.tmpl
    args:
      site: Example
"#,
    )
    .unwrap();

    let store = TemplateStore::builder(source)
        .with_config(config)
        .build()
        .unwrap();

    let mut inv = store.invocation();
    inv.set("title", "Home");
    assert_eq!(inv.render("index").unwrap(), "Example|Home");
    assert!(store.lookup("ignored.html").is_none());
}

/// A source whose contents the test can replace between rebuilds.
#[derive(Clone, Default)]
struct SharedSource {
    files: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SharedSource {
    fn replace(&self, files: &[(&str, String)]) {
        let mut guard = self.files.write().unwrap();
        guard.clear();
        for (name, content) in files {
            guard.insert(name.to_string(), content.clone());
        }
    }
}

impl TemplateSource for SharedSource {
    fn entries(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.files.read().unwrap().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<String, SourceError> {
        self.files
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NoSuchEntry {
                name: name.to_string(),
            })
    }
}

fn generation(n: usize) -> Vec<(&'static str, String)> {
    vec![
        ("content.html", format!("c{n}")),
        ("frame.html", format!("f{n}[{{{{ Content }}}}]")),
    ]
}

#[test]
fn test_concurrent_renders_never_mix_generations() {
    let source = SharedSource::default();
    source.replace(&generation(0));
    let store = TemplateStore::builder(source.clone())
        .frame("frame.html")
        .build()
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_version = 0;
                let mut renders = 0;
                while !done.load(Ordering::Acquire) || renders == 0 {
                    let out = store.invocation().render("content.html").unwrap();
                    // "f<n>[c<n>]": frame and content from the same generation
                    let (frame, rest) = out.split_once('[').unwrap();
                    let content = rest.trim_end_matches(']');
                    assert_eq!(&frame[1..], &content[1..], "mixed output {out}");

                    let version = store.snapshot().version();
                    assert!(version >= last_version);
                    last_version = version;
                    renders += 1;
                }
            })
        })
        .collect();

    for n in 1..=50 {
        source.replace(&generation(n));
        store.rebuild().unwrap();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.invocation().render("content").unwrap(), "f50[c50]");
}

/// A source whose next read, once armed, blocks until the test releases it
/// and then returns outdated text.
#[derive(Clone, Default)]
struct GatedSource {
    gate: Arc<Mutex<Option<(Sender<()>, Receiver<()>)>>>,
}

impl GatedSource {
    /// Arms the gate. Returns (entered, release): `entered` fires when the
    /// blocked read starts, sending on `release` lets it finish.
    fn arm(&self) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some((entered_tx, release_rx));
        (entered_rx, release_tx)
    }
}

impl TemplateSource for GatedSource {
    fn entries(&self) -> Result<Vec<String>, SourceError> {
        Ok(vec!["index.html".to_string()])
    }

    fn read(&self, _name: &str) -> Result<String, SourceError> {
        let gate = self.gate.lock().unwrap().take();
        match gate {
            Some((entered, release)) => {
                entered.send(()).unwrap();
                release.recv().unwrap();
                Ok("stale".to_string())
            }
            None => Ok("fresh".to_string()),
        }
    }
}

#[test]
fn test_overtaken_rebuild_does_not_publish_older_set() {
    let source = GatedSource::default();
    let store = TemplateStore::new(source.clone()).unwrap();
    let (entered, release) = source.arm();

    let slow = {
        let store = store.clone();
        thread::spawn(move || store.rebuild().unwrap())
    };
    entered.recv().unwrap();

    // Starts after the slow rebuild, finishes before it.
    let fast_version = store.rebuild().unwrap();
    assert_eq!(store.invocation().render("index.html").unwrap(), "fresh");

    release.send(()).unwrap();
    let slow_result = slow.join().unwrap();

    assert!(fast_version > 2);
    assert_eq!(slow_result, fast_version);
    assert_eq!(store.snapshot().version(), fast_version);
    assert_eq!(store.invocation().render("index.html").unwrap(), "fresh");
}
