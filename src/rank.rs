//! Directory-priority ranking of candidate executables
//!
//! When one name matches several files the one living in a well-known
//! install location should win over a stray copy on the desktop or in a
//! scratch directory. Lower scores are preferred:
//!
//! | Score | Location |
//! |-------|----------|
//! | 0 | user programs folder |
//! | 1 | Windows system directory (Windows only) |
//! | 2 | application data, or the OS system directories (non-Windows) |
//! | 3 | administrative tools (Windows only) |
//! | 4 | desktop |
//! | 10 | anything else |

use crate::platform::Platform;
use std::path::{Path, PathBuf};

pub const SCORE_PROGRAMS: u8 = 0;
pub const SCORE_WINDOWS: u8 = 1;
pub const SCORE_APP_DATA: u8 = 2;
pub const SCORE_ADMIN_TOOLS: u8 = 3;
pub const SCORE_DESKTOP: u8 = 4;
pub const SCORE_DEFAULT: u8 = 10;

/// Well-known folders used by the ranking rules
#[derive(Debug, Clone, Default)]
pub struct SpecialFolders {
    pub programs: Vec<PathBuf>,
    pub windows: Option<PathBuf>,
    pub app_data: Vec<PathBuf>,
    pub system: Vec<PathBuf>,
    pub admin_tools: Option<PathBuf>,
    pub desktop: Option<PathBuf>,
}

impl SpecialFolders {
    /// Folders of the current user on `platform`
    pub fn detect(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Self::detect_windows(),
            Platform::MacOS | Platform::Ios => Self::detect_macos(),
            _ => Self::detect_unix(),
        }
    }

    fn detect_windows() -> Self {
        let programs = dirs::data_dir()
            .map(|d| d.join("Microsoft").join("Windows").join("Start Menu").join("Programs"));
        let windows = std::env::var_os("SystemRoot")
            .or_else(|| std::env::var_os("WINDIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("C:\\Windows"));
        let app_data = dirs::data_dir()
            .into_iter()
            .chain(std::env::var_os("ProgramData").map(PathBuf::from))
            .collect();

        Self {
            admin_tools: programs.as_ref().map(|p| p.join("Administrative Tools")),
            programs: programs.into_iter().collect(),
            system: vec![windows.join("System32")],
            windows: Some(windows),
            app_data,
            desktop: dirs::desktop_dir(),
        }
    }

    fn detect_macos() -> Self {
        let mut programs = vec![PathBuf::from("/Applications")];
        programs.extend(dirs::home_dir().map(|h| h.join("Applications")));

        let mut app_data: Vec<PathBuf> = dirs::config_dir().into_iter().collect();
        app_data.push(PathBuf::from("/Library/Application Support"));

        Self {
            programs,
            windows: None,
            app_data,
            system: ["/System", "/usr", "/bin", "/sbin"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            admin_tools: None,
            desktop: dirs::desktop_dir(),
        }
    }

    fn detect_unix() -> Self {
        let app_data = dirs::config_dir()
            .into_iter()
            .chain(dirs::data_dir())
            .chain(std::iter::once(PathBuf::from("/usr/share")))
            .collect();

        Self {
            programs: dirs::executable_dir().into_iter().collect(),
            windows: None,
            app_data,
            system: ["/usr", "/bin", "/sbin", "/lib"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            admin_tools: None,
            desktop: dirs::desktop_dir(),
        }
    }
}

/// Orders candidate files by directory priority
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    folders: SpecialFolders,
    platform: Platform,
}

impl CandidateRanker {
    /// Ranker for the current user and host platform
    pub fn detect() -> Self {
        let platform = Platform::detect();
        Self::new(SpecialFolders::detect(platform), platform)
    }

    pub fn new(folders: SpecialFolders, platform: Platform) -> Self {
        Self { folders, platform }
    }

    /// Priority score of a file, lower is better
    ///
    /// Paths are split with the ranker's platform rules, not the host's.
    pub fn score(&self, file: &Path) -> u8 {
        let mut dir = self.components(file);
        if dir.len() > 1 {
            dir.pop();
        }
        let windows = self.platform.is_windows();
        let under = |root: &Path| self.is_under(&dir, root);

        if self.folders.programs.iter().any(|p| under(p)) {
            return SCORE_PROGRAMS;
        }
        if windows && self.folders.windows.as_deref().is_some_and(under) {
            return SCORE_WINDOWS;
        }
        if self.folders.app_data.iter().any(|p| under(p)) {
            return SCORE_APP_DATA;
        }
        if !windows && self.folders.system.iter().any(|p| under(p)) {
            return SCORE_APP_DATA;
        }
        if windows && self.folders.admin_tools.as_deref().is_some_and(under) {
            return SCORE_ADMIN_TOOLS;
        }
        if self.folders.desktop.as_deref().is_some_and(under) {
            return SCORE_DESKTOP;
        }
        SCORE_DEFAULT
    }

    /// Stable sort ascending by score
    pub fn rank(&self, files: Vec<PathBuf>) -> Vec<PathBuf> {
        let mut scored: Vec<(u8, PathBuf)> =
            files.into_iter().map(|f| (self.score(&f), f)).collect();
        scored.sort_by_key(|(score, _)| *score);
        scored.into_iter().map(|(_, f)| f).collect()
    }

    fn is_under(&self, dir: &[String], root: &Path) -> bool {
        if root.as_os_str().is_empty() {
            return false;
        }
        let root = self.components(root);
        dir.len() >= root.len()
            && dir
                .iter()
                .zip(&root)
                .all(|(a, b)| self.platform.names_equal(a, b))
    }

    /// Split on the platform's separators. A leading separator yields an
    /// empty first component so rooted and relative paths never match.
    fn components(&self, path: &Path) -> Vec<String> {
        let text = path.to_string_lossy();
        let mut parts = text.split(self.platform.directory_separators());
        let first = parts.next().unwrap_or_default().to_string();
        std::iter::once(first)
            .chain(parts.filter(|p| !p.is_empty()).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix_folders() -> SpecialFolders {
        SpecialFolders {
            programs: vec![PathBuf::from("/home/ada/.local/bin")],
            windows: None,
            app_data: vec![PathBuf::from("/home/ada/.config")],
            system: vec![PathBuf::from("/usr"), PathBuf::from("/bin")],
            admin_tools: None,
            desktop: Some(PathBuf::from("/home/ada/Desktop")),
        }
    }

    fn unix_ranker() -> CandidateRanker {
        CandidateRanker::new(unix_folders(), Platform::Linux)
    }

    #[test]
    fn unix_scores() {
        let ranker = unix_ranker();
        assert_eq!(ranker.score(Path::new("/home/ada/.local/bin/git")), 0);
        assert_eq!(ranker.score(Path::new("/home/ada/.config/app/tool")), 2);
        assert_eq!(ranker.score(Path::new("/usr/bin/git")), 2);
        assert_eq!(ranker.score(Path::new("/home/ada/Desktop/git")), 4);
        assert_eq!(ranker.score(Path::new("/tmp/git")), 10);
    }

    #[test]
    fn prefix_match_is_component_wise() {
        let ranker = unix_ranker();
        assert_eq!(ranker.score(Path::new("/usrlocal/git")), 10);
        assert_eq!(ranker.score(Path::new("/binaries/git")), 10);
    }

    #[test]
    fn programs_first_regardless_of_input_order() {
        let ranker = unix_ranker();
        let programs = PathBuf::from("/home/ada/.local/bin/tool");
        let desktop = PathBuf::from("/home/ada/Desktop/tool");
        let temp = PathBuf::from("/tmp/tool");

        let orders = [
            vec![temp.clone(), desktop.clone(), programs.clone()],
            vec![desktop.clone(), programs.clone(), temp.clone()],
            vec![programs.clone(), temp.clone(), desktop.clone()],
        ];
        for order in orders {
            let ranked = ranker.rank(order);
            assert_eq!(ranked, vec![programs.clone(), desktop.clone(), temp.clone()]);
        }
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let ranker = unix_ranker();
        let a = PathBuf::from("/opt/a/tool");
        let b = PathBuf::from("/srv/b/tool");
        assert_eq!(ranker.rank(vec![b.clone(), a.clone()]), vec![b, a]);
    }

    #[test]
    fn windows_rules_are_case_insensitive() {
        let folders = SpecialFolders {
            programs: vec![PathBuf::from(
                "C:\\Users\\ada\\AppData\\Roaming\\Microsoft\\Windows\\Start Menu\\Programs",
            )],
            windows: Some(PathBuf::from("C:\\Windows")),
            app_data: vec![PathBuf::from("C:\\ProgramData")],
            system: vec![PathBuf::from("C:\\Windows\\System32")],
            admin_tools: Some(PathBuf::from("C:\\Admin Tools")),
            desktop: Some(PathBuf::from("C:\\Users\\ada\\Desktop")),
        };
        let ranker = CandidateRanker::new(folders, Platform::Windows);

        assert_eq!(ranker.score(Path::new("c:\\windows\\system32\\cmd.exe")), 1);
        assert_eq!(ranker.score(Path::new("C:\\PROGRAMDATA\\tool\\x.exe")), 2);
        assert_eq!(ranker.score(Path::new("C:\\Admin Tools\\x.exe")), 3);
        assert_eq!(ranker.score(Path::new("C:\\users\\ada\\desktop\\x.exe")), 4);
        assert_eq!(ranker.score(Path::new("D:\\x.exe")), 10);
        assert_eq!(
            ranker.score(Path::new(
                "c:/users/ada/appdata/roaming/microsoft/windows/start menu/programs/x.exe"
            )),
            0
        );
    }

    #[test]
    fn windows_prefix_match_is_component_wise() {
        let folders = SpecialFolders {
            windows: Some(PathBuf::from("C:\\Windows")),
            ..SpecialFolders::default()
        };
        let ranker = CandidateRanker::new(folders, Platform::Windows);
        assert_eq!(ranker.score(Path::new("C:\\WindowsApps\\x.exe")), 10);
        assert_eq!(ranker.score(Path::new("C:\\Windows\\x.exe")), 1);
    }

    #[test]
    fn system_rule_only_applies_off_windows() {
        let folders = SpecialFolders {
            system: vec![PathBuf::from("/usr")],
            ..SpecialFolders::default()
        };
        let windows = CandidateRanker::new(folders.clone(), Platform::Windows);
        let linux = CandidateRanker::new(folders, Platform::Linux);
        assert_eq!(windows.score(Path::new("/usr/bin/tool")), 10);
        assert_eq!(linux.score(Path::new("/usr/bin/tool")), 2);
    }
}
