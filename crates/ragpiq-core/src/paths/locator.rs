//! Worker launch resolution.
//!
//! Turns a [`Worker`] into the concrete program, arguments and environment
//! used to spawn it. Resolution is pure: nothing here touches the
//! filesystem, so a returned path may not exist. The spawner checks that.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::platform::{BuildMode, Platform};
use crate::domain::Worker;
use crate::ports::WorkerResolver;

/// Fully resolved spawn contract for one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Executable to run (interpreter or native binary).
    pub program: PathBuf,
    /// Ordered arguments, string values only.
    pub args: Vec<OsString>,
    /// Complete environment for the child.
    pub env: BTreeMap<OsString, OsString>,
    /// Script the program runs, checked for existence before spawning.
    pub entrypoint: Option<PathBuf>,
}

impl LaunchSpec {
    /// A spec for `program` that inherits this process's environment.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: std::env::vars_os().collect(),
            entrypoint: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_entrypoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.entrypoint = Some(path.into());
        self
    }

    /// Human-readable command line for logs.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Where the interpreter and worker scripts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Source checkout root, used in development mode.
    pub dev_root: PathBuf,
    /// Bundled resources directory, used in packaged mode.
    pub resource_dir: PathBuf,
}

impl InstallLayout {
    pub fn new(dev_root: impl Into<PathBuf>, resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_root: dev_root.into(),
            resource_dir: resource_dir.into(),
        }
    }

    fn python_root(&self, mode: BuildMode) -> PathBuf {
        match mode {
            BuildMode::Development => self.dev_root.join("portable-python"),
            BuildMode::Packaged => self.resource_dir.join("python"),
        }
    }

    /// Bundled interpreter for `platform`, or `python3` from `PATH` where
    /// no interpreter is bundled.
    pub fn python_path(&self, mode: BuildMode, platform: Platform) -> PathBuf {
        let root = self.python_root(mode);
        match platform {
            Platform::MacOs => root
                .join("mac")
                .join("Library")
                .join("Frameworks")
                .join("3.13")
                .join("bin")
                .join("python3"),
            Platform::Windows => root.join("win").join("python.exe"),
            Platform::Linux | Platform::Other => PathBuf::from("python3"),
        }
    }

    pub fn script_path(&self, mode: BuildMode, worker: Worker) -> PathBuf {
        let root = match mode {
            BuildMode::Development => &self.dev_root,
            BuildMode::Packaged => &self.resource_dir,
        };
        root.join("scripts").join(worker.script_file())
    }
}

/// Resolves workers for one build mode, platform and install layout.
#[derive(Debug, Clone)]
pub struct WorkerLocator {
    mode: BuildMode,
    platform: Platform,
    layout: InstallLayout,
    python_override: Option<PathBuf>,
}

impl WorkerLocator {
    pub const fn new(mode: BuildMode, platform: Platform, layout: InstallLayout) -> Self {
        Self {
            mode,
            platform,
            layout,
            python_override: None,
        }
    }

    /// Use this interpreter instead of the bundled one.
    #[must_use]
    pub fn with_python_override(mut self, python: Option<PathBuf>) -> Self {
        self.python_override = python;
        self
    }

    pub const fn mode(&self) -> BuildMode {
        self.mode
    }

    pub const fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Resolve `worker` against an explicit parent environment.
    pub fn locate_with_env<I>(&self, worker: Worker, args: &[String], base_env: I) -> LaunchSpec
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let program = self
            .python_override
            .clone()
            .unwrap_or_else(|| self.layout.python_path(self.mode, self.platform));
        let script = self.layout.script_path(self.mode, worker);

        let mut env: BTreeMap<OsString, OsString> = base_env.into_iter().collect();
        if self.mode == BuildMode::Packaged {
            if let Some(var) = self.platform.library_path_var() {
                prepend_search_path(&mut env, var, &self.layout.resource_dir);
            }
        }

        LaunchSpec {
            program,
            args: std::iter::once(script.clone().into_os_string())
                .chain(args.iter().map(OsString::from))
                .collect(),
            env,
            entrypoint: Some(script),
        }
    }
}

impl WorkerResolver for WorkerLocator {
    fn resolve(&self, worker: Worker, args: &[String]) -> LaunchSpec {
        self.locate_with_env(worker, args, std::env::vars_os())
    }
}

/// Prepend `dir` to the search-path variable `var`, keeping inherited entries.
fn prepend_search_path(env: &mut BTreeMap<OsString, OsString>, var: &str, dir: &Path) {
    let key = OsString::from(var);
    let mut entries = vec![dir.to_path_buf()];
    if let Some(existing) = env.get(&key) {
        entries.extend(std::env::split_paths(existing).filter(|p| p.as_os_str() != OsStr::new("")));
    }

    match std::env::join_paths(entries) {
        Ok(joined) => {
            env.insert(key, joined);
        }
        Err(e) => warn!(var, error = %e, "Cannot extend library search path; keeping inherited value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> InstallLayout {
        InstallLayout::new("/src/ragpiq-link", "/Applications/Ragpiq Link.app/Contents/Resources")
    }

    fn env(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn packaged_mac_uses_bundled_framework_python() {
        let locator = WorkerLocator::new(BuildMode::Packaged, Platform::MacOs, layout());
        let spec = locator.locate_with_env(Worker::PrinterWatcher, &[], env(&[]));

        assert_eq!(
            spec.program,
            PathBuf::from("/Applications/Ragpiq Link.app/Contents/Resources/python/mac/Library/Frameworks/3.13/bin/python3")
        );
        assert_eq!(
            spec.entrypoint,
            Some(PathBuf::from(
                "/Applications/Ragpiq Link.app/Contents/Resources/scripts/detect_printer.py"
            ))
        );
    }

    #[cfg(unix)]
    #[test]
    fn development_windows_uses_portable_python() {
        let locator = WorkerLocator::new(BuildMode::Development, Platform::Windows, layout());
        let spec = locator.locate_with_env(Worker::LabelPrint, &[], env(&[]));

        assert_eq!(
            spec.program,
            PathBuf::from("/src/ragpiq-link/portable-python/win/python.exe")
        );
        assert_eq!(
            spec.args[0],
            OsString::from("/src/ragpiq-link/scripts/label_print.py")
        );
    }

    #[test]
    fn linux_falls_back_to_path_python() {
        let locator = WorkerLocator::new(BuildMode::Development, Platform::Linux, layout());
        let spec = locator.locate_with_env(Worker::CameraWatcher, &[], env(&[]));
        assert_eq!(spec.program, PathBuf::from("python3"));
    }

    #[test]
    fn job_args_follow_the_script_in_order() {
        let locator = WorkerLocator::new(BuildMode::Development, Platform::Linux, layout());
        let args = vec!["QR".to_string(), "BAR".to_string(), "today".to_string()];
        let spec = locator.locate_with_env(Worker::LabelPrint, &args, env(&[]));

        let tail: Vec<_> = spec.args[1..].iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(tail, vec!["QR", "BAR", "today"]);
    }

    #[test]
    fn python_override_wins() {
        let locator = WorkerLocator::new(BuildMode::Packaged, Platform::MacOs, layout())
            .with_python_override(Some(PathBuf::from("/opt/py/bin/python3")));
        let spec = locator.locate_with_env(Worker::PrinterWatcher, &[], env(&[]));
        assert_eq!(spec.program, PathBuf::from("/opt/py/bin/python3"));
    }

    #[test]
    fn environment_is_inherited_unchanged_in_development() {
        let locator = WorkerLocator::new(BuildMode::Development, Platform::MacOs, layout());
        let base = env(&[("HOME", "/Users/op"), ("DYLD_LIBRARY_PATH", "/usr/local/lib")]);
        let spec = locator.locate_with_env(Worker::PrinterWatcher, &[], base.clone());

        let expected: BTreeMap<_, _> = base.into_iter().collect();
        assert_eq!(spec.env, expected);
    }

    #[cfg(unix)]
    #[test]
    fn packaged_mac_prepends_resources_to_loader_path() {
        let locator = WorkerLocator::new(BuildMode::Packaged, Platform::MacOs, layout());
        let base = env(&[("HOME", "/Users/op"), ("DYLD_LIBRARY_PATH", "/usr/local/lib")]);
        let spec = locator.locate_with_env(Worker::PrinterWatcher, &[], base);

        assert_eq!(spec.env[&OsString::from("HOME")], OsString::from("/Users/op"));
        assert_eq!(
            spec.env[&OsString::from("DYLD_LIBRARY_PATH")],
            OsString::from("/Applications/Ragpiq Link.app/Contents/Resources:/usr/local/lib")
        );
    }

    #[test]
    fn packaged_mac_adds_loader_path_when_absent() {
        let locator = WorkerLocator::new(BuildMode::Packaged, Platform::MacOs, layout());
        let spec = locator.locate_with_env(Worker::PrinterWatcher, &[], env(&[("PATH", "/usr/bin")]));

        assert_eq!(spec.env.len(), 2);
        assert_eq!(
            spec.env[&OsString::from("DYLD_LIBRARY_PATH")],
            OsString::from("/Applications/Ragpiq Link.app/Contents/Resources")
        );
    }

    #[test]
    fn display_command_joins_program_and_args() {
        let spec = LaunchSpec::new("/bin/echo").arg("hello").arg("world");
        assert_eq!(spec.display_command(), "/bin/echo hello world");
    }
}
