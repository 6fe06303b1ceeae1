//! Integration tests for the file collection and pipeline.

use std::fs;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::tempdir;

use distmpl_core::{
    BuildFile, BuildPipeline, BuildPlugin, CoreError, FileCollection, InMemoryCollection, Phase,
};

/// Plugin that records every phase call into a shared log.
struct Recorder {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail_on: Option<Phase>,
}

impl Recorder {
    fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            fail_on: None,
        }
    }

    fn record(&self, phase: Phase) -> anyhow::Result<()> {
        self.log.lock().push(format!("{}:{}", self.name, phase));
        if self.fail_on == Some(phase) {
            anyhow::bail!("{} refused to {}", self.name, phase);
        }
        Ok(())
    }
}

impl BuildPlugin for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn gather(&mut self, files: &mut dyn FileCollection) -> anyhow::Result<()> {
        files.add(BuildFile::shared(format!("{}.txt", self.name), "", self.name.clone()));
        self.record(Phase::Gather)
    }

    fn munge(&mut self, _files: &mut dyn FileCollection) -> anyhow::Result<()> {
        self.record(Phase::Munge)
    }

    fn prune(&mut self, _files: &mut dyn FileCollection) -> anyhow::Result<()> {
        self.record(Phase::Prune)
    }
}

#[test]
fn test_pipeline_runs_phases_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut pipeline = BuildPipeline::new();
    pipeline.register(Box::new(Recorder::new("a", &log)));
    pipeline.register(Box::new(Recorder::new("b", &log)));

    let mut files = InMemoryCollection::new();
    pipeline.run(&mut files).unwrap();

    assert_eq!(
        *log.lock(),
        vec!["a:gather", "b:gather", "a:munge", "b:munge", "a:prune", "b:prune"]
    );
    assert_eq!(files.names(), vec!["a.txt", "b.txt"]);
    assert_eq!(pipeline.plugin_names(), vec!["a", "b"]);
}

#[test]
fn test_pipeline_stops_on_first_failure() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut failing = Recorder::new("a", &log);
    failing.fail_on = Some(Phase::Munge);

    let mut pipeline = BuildPipeline::new();
    pipeline.register(Box::new(failing));
    pipeline.register(Box::new(Recorder::new("b", &log)));

    let mut files = InMemoryCollection::new();
    let err = pipeline.run(&mut files).unwrap_err();

    match err {
        CoreError::PhaseFailed { plugin, phase, .. } => {
            assert_eq!(plugin, "a");
            assert_eq!(phase, Phase::Munge);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*log.lock(), vec!["a:gather", "b:gather", "a:munge"]);
}

#[test]
fn test_load_dir_and_write_to() {
    let source = tempdir().unwrap();
    fs::create_dir_all(source.path().join("lib/Foo")).unwrap();
    fs::create_dir_all(source.path().join(".git")).unwrap();
    fs::write(source.path().join("README.tt"), "Hello").unwrap();
    fs::write(source.path().join("lib/Foo/Bar.pm"), "package Foo::Bar;").unwrap();
    fs::write(source.path().join(".git/HEAD"), "ref").unwrap();
    fs::write(source.path().join("logo.png"), [0xff, 0xfe, 0x00]).unwrap();

    let files = InMemoryCollection::load_dir(source.path(), &[".git/**".to_string()]).unwrap();
    assert_eq!(files.names(), vec!["README.tt", "lib/Foo/Bar.pm"]);
    assert_eq!(files.find_by_name("README.tt").unwrap().added_by(), "disk");

    let target = tempdir().unwrap();
    files.write_to(target.path().join("build")).unwrap();

    let written = fs::read_to_string(target.path().join("build/lib/Foo/Bar.pm")).unwrap();
    assert_eq!(written, "package Foo::Bar;");
    assert!(!target.path().join("build/.git").exists());
}
