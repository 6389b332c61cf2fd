//! Integration tests for whatexec

/// Writes a minimal ELF header with the execute bits set
#[cfg(unix)]
fn write_elf(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, [0x7f, b'E', b'L', b'F', 2, 1, 1, 0, 0, 0, 0, 0]).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary isolated from the user's configuration
    fn whatexec(config_dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("whatexec");
        cmd.env_remove("WHATEXEC_CONFIG")
            .arg("--config")
            .arg(config_dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("whatexec")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("locate executables"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("whatexec")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("whatexec"));
    }

    #[test]
    fn config_path_follows_flag() {
        let temp = TempDir::new().unwrap();
        whatexec(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        whatexec(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[search]"))
            .stdout(predicate::str::contains("depth = \"all\""));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        whatexec(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());
    }

    #[test]
    fn broken_config_reported_but_init_force_recovers() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[search]\ndepth = \"sideways\"").unwrap();

        whatexec(&temp)
            .args(["find", "sh", "--no-fallback"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));

        whatexec(&temp)
            .args(["config", "init", "--force"])
            .assert()
            .success();

        whatexec(&temp).args(["config", "show"]).assert().success();
    }

    #[test]
    fn find_missing_name_fails() {
        let temp = TempDir::new().unwrap();
        whatexec(&temp)
            .env("PATH", temp.path())
            .args(["find", "definitely-not-a-tool", "--no-fallback"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Could not resolve executable(s): definitely-not-a-tool",
            ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn find_resolves_through_path() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        super::write_elf(&bin.join("mytool"));

        whatexec(&temp)
            .env("PATH", &bin)
            .args(["find", "mytool", "--no-fallback", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                bin.join("mytool").display().to_string(),
            ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn find_reports_every_missing_name_in_json() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        super::write_elf(&bin.join("mytool"));

        whatexec(&temp)
            .env("PATH", &bin)
            .args(["find", "mytool", "nope-one", "nope-two", "--no-fallback", "-f", "json"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("\"source\": \"path\""))
            .stderr(predicate::str::contains("nope-one, nope-two"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn search_in_directory() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("tree");
        super::write_elf(&tree.join("a").join("b").join("deep-tool"));

        whatexec(&temp)
            .arg("search")
            .arg("deep-tool")
            .arg("--dir")
            .arg(&tree)
            .args(["-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("deep-tool"));

        whatexec(&temp)
            .arg("search")
            .arg("deep-tool")
            .arg("--dir")
            .arg(&tree)
            .args(["--depth", "top"])
            .assert()
            .failure();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn list_directory_plain() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("tree");
        super::write_elf(&tree.join("one"));
        std::fs::write(tree.join("notes.txt"), "text").unwrap();

        whatexec(&temp)
            .arg("list")
            .arg(&tree)
            .args(["-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("one"))
            .stdout(predicate::str::contains("notes.txt").not());
    }

    #[test]
    fn list_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        whatexec(&temp)
            .arg("list")
            .arg(temp.path().join("absent"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Directory not found"));
    }

    #[cfg(unix)]
    #[test]
    fn path_json_lists_directories() {
        let temp = TempDir::new().unwrap();
        whatexec(&temp)
            .env("PATH", "/usr/local/bin::/usr/bin")
            .args(["path", "-f", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/usr/local/bin"))
            .stdout(predicate::str::contains("\"extensions\""));
    }

    #[test]
    fn drives_runs() {
        // Drive enumeration depends on the host, but must not fail
        let temp = TempDir::new().unwrap();
        whatexec(&temp).args(["drives", "--all"]).assert().success();
    }

    #[test]
    fn completions_generate() {
        cargo_bin_cmd!("whatexec")
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("whatexec"));
    }
}

#[cfg(unix)]
mod resolution_tests {
    use super::write_elf;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;
    use whatexec::detect::ExecutableDetector;
    use whatexec::engine::{ResolutionEngine, ResolutionSource, ResolveRequest};
    use whatexec::environment::{PathEnvironmentReader, StaticEnv};
    use whatexec::platform::Platform;
    use whatexec::rank::{CandidateRanker, SpecialFolders};
    use whatexec::resolve::PathResolver;
    use whatexec::search::{Drive, DriveEnumerator, DriveFilter, DriveKind, FilesystemSearcher};
    use whatexec::WhatExecError;

    struct FakeDrives(Vec<PathBuf>);

    impl DriveEnumerator for FakeDrives {
        fn drives(&self) -> Vec<Drive> {
            self.0
                .iter()
                .map(|root| Drive {
                    root: root.clone(),
                    name: "fixture".into(),
                    kind: DriveKind::Fixed,
                    file_system: "ext4".into(),
                    total_space: 1 << 30,
                    available_space: 1 << 20,
                })
                .collect()
        }
    }

    fn engine(path: &str, drives: Vec<PathBuf>, folders: SpecialFolders) -> ResolutionEngine {
        let detector = Arc::new(ExecutableDetector::for_platform(Platform::Linux).unwrap());
        let env = StaticEnv::new().with_var("PATH", path);
        let reader = PathEnvironmentReader::with_env(Arc::new(env), Platform::Linux);
        ResolutionEngine::new(
            PathResolver::new(Arc::new(reader), Arc::clone(&detector)),
            FilesystemSearcher::new(
                Arc::new(FakeDrives(drives)),
                // Temp directories live under an excluded pseudo mount
                DriveFilter::new(Platform::Linux).without_mount_exclusions(),
                detector,
                Arc::new(CandidateRanker::new(folders, Platform::Linux)),
            ),
        )
    }

    #[tokio::test]
    async fn earlier_path_directory_wins() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        write_elf(&first.join("tool"));
        write_elf(&second.join("tool"));

        let path = format!("{}:{}", first.display(), second.display());
        let engine = engine(&path, vec![], SpecialFolders::default());

        let found = engine.find("tool", &CancellationToken::new()).await.unwrap();
        assert_eq!(found.path, first.join("tool"));

        let all = engine
            .find_all_instances("tool", &CancellationToken::new())
            .await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].path, second.join("tool"));
    }

    #[tokio::test]
    async fn fallback_prefers_programs_folder() {
        let temp = TempDir::new().unwrap();
        let drive = temp.path().join("drive");
        let programs = drive.join("Programs");
        write_elf(&drive.join("scratch").join("app"));
        write_elf(&programs.join("app"));

        let folders = SpecialFolders {
            programs: vec![programs.clone()],
            ..Default::default()
        };
        let empty_path = temp.path().join("empty");
        std::fs::create_dir(&empty_path).unwrap();
        let engine = engine(&empty_path.display().to_string(), vec![drive], folders);

        let outcome = engine
            .resolve(&ResolveRequest::new(["app"]), &CancellationToken::new())
            .await;
        let result = outcome.get("app").unwrap();
        assert_eq!(result.source, Some(ResolutionSource::Filesystem));
        assert_eq!(result.best(), Some(&programs.join("app")));
    }

    #[tokio::test]
    async fn unresolved_names_are_reported_together() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        write_elf(&bin.join("present"));
        let engine = engine(&bin.display().to_string(), vec![], SpecialFolders::default());

        let outcome = engine
            .find_many(&["present", "missing-a", "missing-b"], &CancellationToken::new())
            .await;
        assert_eq!(outcome.unresolved_names(), vec!["missing-a", "missing-b"]);
        assert_eq!(
            outcome.get("present").unwrap().source,
            Some(ResolutionSource::Path)
        );

        let err = outcome.into_required().unwrap_err();
        assert!(matches!(err, WhatExecError::NotFound { ref names } if names.len() == 2));
    }

    #[test]
    fn blocking_entry_point() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        write_elf(&bin.join("tool"));
        let engine = engine(&bin.display().to_string(), vec![], SpecialFolders::default());

        let found = whatexec::blocking::find(&engine, "tool").unwrap();
        assert_eq!(found.map(|r| r.path), Some(bin.join("tool")));
    }
}

#[cfg(target_os = "linux")]
mod environment_tests {
    use serial_test::serial;
    use std::ffi::OsString;
    use whatexec::environment::{PathEnvironmentReader, PathSource};

    struct RestorePath(Option<OsString>);

    impl Drop for RestorePath {
        fn drop(&mut self) {
            match self.0.take() {
                Some(value) => std::env::set_var("PATH", value),
                None => std::env::remove_var("PATH"),
            }
        }
    }

    #[test]
    #[serial]
    fn process_path_is_parsed_in_order() {
        let _restore = RestorePath(std::env::var_os("PATH"));
        std::env::set_var("PATH", " /opt/tools/ ::/usr/bin");

        let reader = PathEnvironmentReader::new();
        assert_eq!(
            reader.directories().unwrap(),
            vec![
                std::path::PathBuf::from("/opt/tools"),
                std::path::PathBuf::from("/usr/bin")
            ]
        );
        assert_eq!(reader.extensions(), vec![String::new()]);
    }

    #[test]
    #[serial]
    fn unset_process_path_is_none() {
        let _restore = RestorePath(std::env::var_os("PATH"));
        std::env::remove_var("PATH");

        assert!(PathEnvironmentReader::new().directories().is_none());
    }
}
