//! Task graph and execution.
//!
//! Every task runs at most once per invocation, after all of its
//! dependencies. A failed task skips everything that depends on it; tasks on
//! unrelated branches still run.

use crate::archive::{ArchiveResult, assemble_module_jar, assemble_sources_jar};
use crate::configure::ModuleConfig;
use crate::descriptor;
use crate::error::{ModuleError, ModuleResult};
use crate::installer;
use crate::project::Layout;
use crate::settings::ModuleSettings;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Registered tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskName {
    Clean,
    ProcessResources,
    Classes,
    GenerateModuleXml,
    Jar,
    SourcesJar,
    Install,
}

/// What a successful task produced.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    /// Generated output directories that were removed.
    Cleaned(Vec<PathBuf>),

    /// Resources copied into the processed resources directory.
    ResourcesProcessed { dir: PathBuf, file_count: usize },

    /// Compiled output directory is in place.
    Classes(PathBuf),

    /// Descriptor written.
    Descriptor(PathBuf),

    /// Archive assembled.
    Archive(ArchiveResult),

    /// Archives copied to the installation.
    Installed(Vec<PathBuf>),
}

/// Outcome of one planned task.
#[derive(Debug)]
pub enum TaskOutcome {
    Succeeded(TaskOutput),
    Failed(ModuleError),
    Skipped { failed_dependency: TaskName },
}

/// A task and its outcome.
#[derive(Debug)]
pub struct TaskReport {
    pub task: TaskName,
    pub outcome: TaskOutcome,
}

/// Outcomes of a whole run, in execution order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub tasks: Vec<TaskReport>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl TaskName {
    /// All tasks in listing order.
    pub const ALL: [TaskName; 7] = [
        TaskName::Clean,
        TaskName::ProcessResources,
        TaskName::Classes,
        TaskName::GenerateModuleXml,
        TaskName::Jar,
        TaskName::SourcesJar,
        TaskName::Install,
    ];

    /// Task name as used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::Clean => "clean",
            TaskName::ProcessResources => "processResources",
            TaskName::Classes => "classes",
            TaskName::GenerateModuleXml => "generateModuleXml",
            TaskName::Jar => "jar",
            TaskName::SourcesJar => "sourcesJar",
            TaskName::Install => "install",
        }
    }

    /// One-line description.
    pub fn description(&self) -> &'static str {
        match self {
            TaskName::Clean => "Delete generated resources and archives",
            TaskName::ProcessResources => "Copy resources into the build directory",
            TaskName::Classes => "Prepare compiled output",
            TaskName::GenerateModuleXml => "Generate META-INF/module.xml",
            TaskName::Jar => "Assemble the module jar",
            TaskName::SourcesJar => "Assemble the sources jar",
            TaskName::Install => "Copy archives into $niagara_home/modules",
        }
    }

    /// Direct dependencies under the given settings.
    pub fn dependencies(&self, settings: &ModuleSettings) -> Vec<TaskName> {
        match self {
            TaskName::Clean | TaskName::ProcessResources | TaskName::SourcesJar => Vec::new(),
            TaskName::Classes => vec![TaskName::ProcessResources],
            TaskName::GenerateModuleXml => vec![TaskName::Classes],
            TaskName::Jar => vec![TaskName::GenerateModuleXml],
            TaskName::Install if settings.install_sources => {
                vec![TaskName::Jar, TaskName::SourcesJar]
            }
            TaskName::Install => vec![TaskName::Jar],
        }
    }
}

impl BuildReport {
    /// True if every planned task succeeded.
    pub fn is_success(&self) -> bool {
        self.tasks
            .iter()
            .all(|r| matches!(r.outcome, TaskOutcome::Succeeded(_)))
    }

    /// Tasks that failed themselves (not skipped ones).
    pub fn failed(&self) -> Vec<TaskName> {
        self.tasks
            .iter()
            .filter(|r| matches!(r.outcome, TaskOutcome::Failed(_)))
            .map(|r| r.task)
            .collect()
    }

    /// Outcome of a task, if it was planned.
    pub fn outcome(&self, task: TaskName) -> Option<&TaskOutcome> {
        self.tasks.iter().find(|r| r.task == task).map(|r| &r.outcome)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Order the requested tasks and their dependencies, each once.
///
/// `clean` always runs first when requested.
pub fn plan(requested: &[TaskName], settings: &ModuleSettings) -> Vec<TaskName> {
    fn visit(
        task: TaskName,
        settings: &ModuleSettings,
        seen: &mut HashSet<TaskName>,
        order: &mut Vec<TaskName>,
    ) {
        if !seen.insert(task) {
            return;
        }
        for dep in task.dependencies(settings) {
            visit(dep, settings, seen, order);
        }
        order.push(task);
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    if requested.contains(&TaskName::Clean) {
        visit(TaskName::Clean, settings, &mut seen, &mut order);
    }
    for task in requested {
        visit(*task, settings, &mut seen, &mut order);
    }
    order
}

/// Execute a plan.
pub fn execute(plan: &[TaskName], config: &ModuleConfig) -> BuildReport {
    execute_with(plan, config, |_| {})
}

/// Execute a plan, reporting each task as it finishes.
pub fn execute_with<F>(plan: &[TaskName], config: &ModuleConfig, mut on_report: F) -> BuildReport
where
    F: FnMut(&TaskReport),
{
    let mut report = BuildReport::default();
    let mut broken: HashSet<TaskName> = HashSet::new();

    for task in plan {
        let blocked = task
            .dependencies(&config.settings)
            .into_iter()
            .find(|dep| broken.contains(dep));

        let outcome = match blocked {
            Some(failed_dependency) => {
                tracing::debug!("{} skipped: {} did not succeed", task, failed_dependency);
                TaskOutcome::Skipped { failed_dependency }
            }
            None => {
                tracing::debug!("running {}", task);
                match run_task(*task, config) {
                    Ok(output) => TaskOutcome::Succeeded(output),
                    Err(e) => {
                        tracing::error!("{} failed: {}", task, e);
                        TaskOutcome::Failed(e)
                    }
                }
            }
        };

        if !matches!(outcome, TaskOutcome::Succeeded(_)) {
            broken.insert(*task);
        }

        let task_report = TaskReport {
            task: *task,
            outcome,
        };
        on_report(&task_report);
        report.tasks.push(task_report);
    }

    report
}

/// Run a single task, assuming its dependencies have run.
pub fn run_task(task: TaskName, config: &ModuleConfig) -> ModuleResult<TaskOutput> {
    let layout = &config.project.layout;
    match task {
        TaskName::Clean => {
            let mut removed = Vec::new();
            for dir in [&layout.processed_resources_dir, &layout.libs_dir] {
                if is_protected(dir, layout) {
                    tracing::warn!(
                        "not removing {}: it holds compiled output or sources",
                        dir.display()
                    );
                    continue;
                }
                if dir.exists() {
                    std::fs::remove_dir_all(dir)?;
                    removed.push(dir.clone());
                }
            }
            Ok(TaskOutput::Cleaned(removed))
        }
        TaskName::ProcessResources => {
            let target = &layout.processed_resources_dir;
            if is_protected(target, layout) {
                return Err(ModuleError::Config(format!(
                    "processed resources directory {} overlaps compiled output or sources",
                    target.display()
                )));
            }

            // Drop resources deleted since the last run.
            if target.exists() {
                std::fs::remove_dir_all(target)?;
            }
            let file_count = copy_tree(&layout.resources_dir, target)?;
            Ok(TaskOutput::ResourcesProcessed {
                dir: layout.processed_resources_dir.clone(),
                file_count,
            })
        }
        TaskName::Classes => {
            std::fs::create_dir_all(&layout.classes_dir)?;
            if std::fs::read_dir(&layout.classes_dir)?.next().is_none() {
                tracing::warn!(
                    "compiled output {} is empty; the module jar will contain no classes",
                    layout.classes_dir.display()
                );
            }
            Ok(TaskOutput::Classes(layout.classes_dir.clone()))
        }
        TaskName::GenerateModuleXml => {
            let path = descriptor::generate(&config.descriptor, &config.descriptor_metadata())?;
            Ok(TaskOutput::Descriptor(path))
        }
        TaskName::Jar => {
            let result = assemble_module_jar(&config.jar, &config.descriptor, &config.resolver)?;
            Ok(TaskOutput::Archive(result))
        }
        TaskName::SourcesJar => Ok(TaskOutput::Archive(assemble_sources_jar(
            &config.sources_jar,
        )?)),
        TaskName::Install => {
            let installed = installer::install(&config.install_spec())?;
            Ok(TaskOutput::Installed(installed))
        }
    }
}

/// True if removing `dir` would delete compiled output or sources.
fn is_protected(dir: &Path, layout: &Layout) -> bool {
    [&layout.classes_dir, &layout.resources_dir]
        .into_iter()
        .chain(&layout.source_dirs)
        .any(|p| p.starts_with(dir))
}

/// Copy every file below `from` into `to`, returning the number of files copied.
fn copy_tree(from: &Path, to: &Path) -> ModuleResult<usize> {
    std::fs::create_dir_all(to)?;
    if !from.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry?;
        let target = to.join(entry.path().strip_prefix(from)?);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        TaskName::ALL
            .into_iter()
            .find(|t| t.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| ModuleError::UnknownTask(s.to_string()))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configure::Configuration;
    use crate::constants::BUILD_FILE;
    use crate::env::InstallRoot;
    use std::fs::File;
    use std::io::{Read, Write};
    use tempfile::TempDir;
    use zip::ZipArchive;
    use zip::write::SimpleFileOptions;

    const BUILD: &str = r#"
[project]
name = "demo"
group = "acme"
version = "2.3.1"

[dependencies]
uberjar = ["first"]
"#;

    fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn read_entry(path: &Path, name: &str) -> Option<Vec<u8>> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).ok()?;
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        Some(content)
    }

    /// A project with one class file and two merge candidates in `libs/`.
    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(BUILD_FILE), BUILD).unwrap();

        let classes = dir.path().join("build/classes/com/acme");
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(classes.join("Point.class"), b"\xca\xfe").unwrap();

        let resources = dir.path().join("src/main/resources");
        std::fs::create_dir_all(&resources).unwrap();
        std::fs::write(resources.join("lexicon.properties"), "a=b").unwrap();

        let libs = dir.path().join("libs");
        std::fs::create_dir_all(&libs).unwrap();
        write_jar(&libs.join("first.jar"), &[("META-INF/x.txt", "first")]);
        write_jar(
            &libs.join("second.jar"),
            &[("META-INF/x.txt", "second"), ("late/Late.class", "late")],
        );
        dir
    }

    fn configure(dir: &Path, root: InstallRoot, extra: &[&str]) -> ModuleConfig {
        let mut configuration = Configuration::load(dir, root).unwrap();
        for declaration in extra {
            configuration.add_dependency(declaration).unwrap();
        }
        configuration.finalize().unwrap()
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("jar".parse::<TaskName>().unwrap(), TaskName::Jar);
        assert_eq!(
            "generateModuleXml".parse::<TaskName>().unwrap(),
            TaskName::GenerateModuleXml
        );
        assert_eq!(
            "sources-jar".parse::<TaskName>().unwrap(),
            TaskName::SourcesJar
        );
        assert!(matches!(
            "deploy".parse::<TaskName>(),
            Err(ModuleError::UnknownTask(_))
        ));
    }

    #[test]
    fn test_plan_jar() {
        let plan = plan(&[TaskName::Jar], &ModuleSettings::default());
        assert_eq!(
            plan,
            vec![
                TaskName::ProcessResources,
                TaskName::Classes,
                TaskName::GenerateModuleXml,
                TaskName::Jar
            ]
        );
    }

    #[test]
    fn test_plan_install_sources() {
        let without = plan(&[TaskName::Install], &ModuleSettings::default());
        assert!(!without.contains(&TaskName::SourcesJar));
        assert_eq!(without.last(), Some(&TaskName::Install));

        let settings = ModuleSettings {
            install_sources: true,
            ..Default::default()
        };
        let with = plan(&[TaskName::Install], &settings);
        assert!(with.contains(&TaskName::SourcesJar));
        assert_eq!(with.last(), Some(&TaskName::Install));
        assert_eq!(with.len(), 6);
    }

    #[test]
    fn test_plan_clean_first_and_deduplicated() {
        let plan = plan(
            &[TaskName::Jar, TaskName::Clean, TaskName::Jar],
            &ModuleSettings::default(),
        );
        assert_eq!(plan.first(), Some(&TaskName::Clean));
        assert_eq!(plan.iter().filter(|t| **t == TaskName::Jar).count(), 1);
    }

    #[test]
    fn test_install_end_to_end_with_late_uberjar_member() {
        let dir = project();
        let home = TempDir::new().unwrap();
        let config = configure(
            dir.path(),
            InstallRoot::Resolved(home.path().to_path_buf()),
            &["uberjar=second"],
        );

        let plan = plan(&[TaskName::Install], &config.settings);
        let report = execute(&plan, &config);
        assert!(report.is_success(), "{:?}", report);

        let jar = config.jar.output_path();
        assert!(jar.ends_with("build/libs/demo.jar"));
        assert_eq!(read_entry(&jar, "META-INF/x.txt").unwrap(), b"first");
        assert_eq!(read_entry(&jar, "late/Late.class").unwrap(), b"late");
        assert_eq!(read_entry(&jar, "com/acme/Point.class").unwrap(), b"\xca\xfe");
        assert_eq!(read_entry(&jar, "lexicon.properties").unwrap(), b"a=b");
        let module_xml = String::from_utf8(read_entry(&jar, "META-INF/module.xml").unwrap()).unwrap();
        assert!(module_xml.contains("vendorVersion=\"2.3.1\""));

        match report.outcome(TaskName::Jar) {
            Some(TaskOutcome::Succeeded(TaskOutput::Archive(result))) => {
                assert_eq!(result.collisions.len(), 1);
                assert_eq!(result.collisions[0].path, "META-INF/x.txt");
            }
            other => panic!("unexpected jar outcome: {:?}", other),
        }

        let installed: Vec<_> = std::fs::read_dir(home.path().join("modules"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(installed, vec![std::ffi::OsString::from("demo.jar")]);
    }

    #[test]
    fn test_install_sources_copies_two_archives() {
        let dir = project();
        let home = TempDir::new().unwrap();
        let mut configuration =
            Configuration::load(dir.path(), InstallRoot::Resolved(home.path().to_path_buf()))
                .unwrap();
        configuration.settings_mut().install_sources = true;
        let config = configuration.finalize().unwrap();

        let report = execute(&plan(&[TaskName::Install], &config.settings), &config);
        match report.outcome(TaskName::Install) {
            Some(TaskOutcome::Succeeded(TaskOutput::Installed(paths))) => {
                assert_eq!(paths.len(), 2);
            }
            other => panic!("unexpected install outcome: {:?}", other),
        }
        assert!(home.path().join("modules/demo-sources.jar").is_file());
    }

    #[test]
    fn test_missing_home_fails_only_install() {
        let dir = project();
        let config = configure(
            dir.path(),
            InstallRoot::Unset {
                diagnostic: "niagara_home env variable not defined".into(),
            },
            &[],
        );

        let report = execute(&plan(&[TaskName::Install], &config.settings), &config);
        assert!(!report.is_success());
        assert_eq!(report.failed(), vec![TaskName::Install]);
        assert!(matches!(
            report.outcome(TaskName::Install),
            Some(TaskOutcome::Failed(ModuleError::MissingDestination { .. }))
        ));
        assert!(config.jar.output_path().is_file());
    }

    #[test]
    fn test_failure_skips_dependents_only() {
        let dir = project();
        let home = TempDir::new().unwrap();
        let mut configuration =
            Configuration::load(dir.path(), InstallRoot::Resolved(home.path().to_path_buf()))
                .unwrap();
        configuration.add_dependency("uberjar=missing:1.0").unwrap();
        configuration.settings_mut().install_sources = true;
        let config = configuration.finalize().unwrap();

        let mut seen = Vec::new();
        let report = execute_with(
            &plan(&[TaskName::Install], &config.settings),
            &config,
            |r| seen.push(r.task),
        );

        assert!(matches!(
            report.outcome(TaskName::Jar),
            Some(TaskOutcome::Failed(ModuleError::DependencyResolution { .. }))
        ));
        assert!(matches!(
            report.outcome(TaskName::SourcesJar),
            Some(TaskOutcome::Succeeded(_))
        ));
        assert!(matches!(
            report.outcome(TaskName::Install),
            Some(TaskOutcome::Skipped {
                failed_dependency: TaskName::Jar
            })
        ));
        assert_eq!(report.failed(), vec![TaskName::Jar]);
        assert_eq!(seen.len(), report.tasks.len());
        assert!(!home.path().join("modules").exists());
    }

    #[test]
    fn test_clean_removes_only_generated_output() {
        let dir = project();
        let config = configure(
            dir.path(),
            InstallRoot::Unset {
                diagnostic: "unset".into(),
            },
            &[],
        );
        assert!(execute(&plan(&[TaskName::Jar], &config.settings), &config).is_success());

        let report = execute(&plan(&[TaskName::Clean], &config.settings), &config);
        match report.outcome(TaskName::Clean) {
            Some(TaskOutcome::Succeeded(TaskOutput::Cleaned(removed))) => {
                assert_eq!(removed.len(), 2);
            }
            other => panic!("unexpected clean outcome: {:?}", other),
        }
        assert!(!dir.path().join("build/libs").exists());
        assert!(!dir.path().join("build/resources/main").exists());
        assert!(dir.path().join("build/classes/com/acme/Point.class").is_file());
        assert!(dir.path().join("libs/first.jar").is_file());
    }

    #[test]
    fn test_clean_then_jar_keeps_classes() {
        let dir = project();
        let config = configure(
            dir.path(),
            InstallRoot::Unset {
                diagnostic: "unset".into(),
            },
            &[],
        );

        let report = execute(
            &plan(&[TaskName::Clean, TaskName::Jar], &config.settings),
            &config,
        );
        assert!(report.is_success(), "{:?}", report);

        let jar = config.jar.output_path();
        assert_eq!(read_entry(&jar, "com/acme/Point.class").unwrap(), b"\xca\xfe");
        assert!(read_entry(&jar, "META-INF/module.xml").is_some());
    }

    #[test]
    fn test_removed_resources_are_not_packaged() {
        let dir = project();
        let config = configure(
            dir.path(),
            InstallRoot::Unset {
                diagnostic: "unset".into(),
            },
            &[],
        );
        let processed = dir.path().join("build/resources/main");

        run_task(TaskName::ProcessResources, &config).unwrap();
        assert!(processed.join("lexicon.properties").is_file());

        std::fs::remove_file(dir.path().join("src/main/resources/lexicon.properties")).unwrap();
        assert!(execute(&plan(&[TaskName::Jar], &config.settings), &config).is_success());

        assert!(!processed.join("lexicon.properties").exists());
        assert!(read_entry(&config.jar.output_path(), "lexicon.properties").is_none());
    }

    #[test]
    fn test_overlapping_layout_never_deletes_sources() {
        let dir = project();
        let build = format!(
            "{}\n[layout]\nprocessed_resources_dir = \"src/main/resources\"\n",
            BUILD
        );
        std::fs::write(dir.path().join(BUILD_FILE), build).unwrap();
        let config = configure(
            dir.path(),
            InstallRoot::Unset {
                diagnostic: "unset".into(),
            },
            &[],
        );

        assert!(matches!(
            run_task(TaskName::ProcessResources, &config),
            Err(ModuleError::Config(_))
        ));
        match run_task(TaskName::Clean, &config).unwrap() {
            TaskOutput::Cleaned(removed) => {
                assert!(!removed.contains(&dir.path().join("src/main/resources")))
            }
            other => panic!("unexpected clean output: {:?}", other),
        }
        assert!(dir.path().join("src/main/resources/lexicon.properties").is_file());
    }
}
