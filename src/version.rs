//! # Gem Version Detection and Synchronization
//!
//! Submodules that ship as Ruby gems keep their version in a discrete
//! `version.rb` file (`VERSION = "1.2.3"`). This module finds that file,
//! reads the version, and can rewrite it so that every submodule agrees.
//!
//! ## Detection
//!
//! [`detect_version`] requires, in order:
//!
//! 1.  A `.submoduler.ini` in the submodule directory.
//! 2.  A `*.gemspec` at the submodule root. The gem name comes from
//!     `spec.name = "..."`, falling back to the gemspec's file stem.
//! 3.  A `version.rb` under `lib/` (any depth), or at the root.
//!
//! A missing piece is not an error; it is recorded on the returned
//! [`VersionInfo`] so the `version` command can show it in its table.
//!
//! ## Synchronization
//!
//! When more than one distinct version is found, [`check_mismatch`] reports
//! the highest one. The `version --sync` command bumps its patch component
//! with [`increment_patch`] and rewrites every differing `version.rb` with
//! [`synchronize`].

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use semver::Version;
use serde::Serialize;

use crate::defaults::SUBMODULER_INI_FILENAME;
use crate::error::{Error, Result};

const GEM_NAME_PATTERN: &str = r#"spec\.name\s*=\s*["']([^"']+)["']"#;
const VERSION_PATTERN: &str = r#"VERSION\s*=\s*["']([^"']+)["']"#;

/// Version files searched for, relative to the submodule, in priority order.
const VERSION_FILE_PATTERNS: &[&str] = &["lib/**/version.rb", "version.rb"];

/// What was found about one submodule's gem version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub submodule_name: String,
    pub gem_name: Option<String>,
    pub version: Option<String>,
    pub gemspec_path: Option<PathBuf>,
    pub version_file_path: Option<PathBuf>,
    /// Why no version could be determined.
    pub error: Option<String>,
}

impl VersionInfo {
    fn failed(submodule_name: &str, error: impl Into<String>) -> Self {
        Self {
            submodule_name: submodule_name.to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Two or more submodules disagree on the version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionMismatch {
    pub highest_version: String,
    /// Each distinct version with the submodules that carry it, in
    /// discovery order.
    pub groups: Vec<(String, Vec<String>)>,
}

/// The result of rewriting one submodule's version file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub submodule_name: String,
    pub old_version: Option<String>,
    pub new_version: String,
    pub error: Option<String>,
}

impl SyncResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Detect the gem name and version of the submodule checked out at `dir`.
pub fn detect_version(dir: &Path, submodule_name: &str) -> VersionInfo {
    if !dir.join(SUBMODULER_INI_FILENAME).exists() {
        return VersionInfo::failed(submodule_name, "Missing .submoduler.ini file");
    }

    match detect_gem(dir, submodule_name) {
        Ok(info) => info,
        Err(e) => VersionInfo::failed(submodule_name, format!("Error: {}", e)),
    }
}

fn detect_gem(dir: &Path, submodule_name: &str) -> Result<VersionInfo> {
    let Some(gemspec_path) = first_match(dir, "*.gemspec")? else {
        return Ok(VersionInfo::failed(submodule_name, "No gemspec found"));
    };
    let gem_name = gem_name(&gemspec_path)?;

    let mut version_file = None;
    for pattern in VERSION_FILE_PATTERNS {
        version_file = first_match(dir, pattern)?;
        if version_file.is_some() {
            break;
        }
    }

    let Some(version_file_path) = version_file else {
        return Ok(VersionInfo {
            submodule_name: submodule_name.to_string(),
            gem_name: Some(gem_name),
            gemspec_path: Some(gemspec_path),
            error: Some("No discrete version.rb file found".to_string()),
            ..Default::default()
        });
    };

    let content = fs::read_to_string(&version_file_path)
        .map_err(|e| Error::file_read(&version_file_path, &e))?;
    let version = extract_version(&content)?;
    let error = version
        .is_none()
        .then(|| "Could not extract version from version.rb".to_string());

    Ok(VersionInfo {
        submodule_name: submodule_name.to_string(),
        gem_name: Some(gem_name),
        version,
        gemspec_path: Some(gemspec_path),
        version_file_path: Some(version_file_path),
        error,
    })
}

fn first_match(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let full = format!("{}/{}", glob::Pattern::escape(&dir.to_string_lossy()), pattern);
    for path in glob::glob(&full)? {
        let path = path?;
        if path.is_file() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn gem_name(gemspec_path: &Path) -> Result<String> {
    let content =
        fs::read_to_string(gemspec_path).map_err(|e| Error::file_read(gemspec_path, &e))?;
    let regex = Regex::new(GEM_NAME_PATTERN)?;
    if let Some(caps) = regex.captures(&content) {
        return Ok(caps[1].to_string());
    }
    Ok(gemspec_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default())
}

/// The first `VERSION = "..."` assignment in `content`.
pub fn extract_version(content: &str) -> Result<Option<String>> {
    let regex = Regex::new(VERSION_PATTERN)?;
    Ok(regex.captures(content).map(|caps| caps[1].to_string()))
}

/// Parse a gem version leniently.
///
/// Full semver strings parse as-is. Otherwise the string needs at least
/// `major.minor`; a missing patch is zero, and each component takes its
/// leading digits (`"1.2.3a"` is `1.2.3`).
///
/// ```
/// use submoduler::version::parse_version;
///
/// assert_eq!(parse_version("1.4").unwrap().to_string(), "1.4.0");
/// assert!(parse_version("7").is_err());
/// ```
pub fn parse_version(version: &str) -> Result<Version> {
    let version = version.trim();
    if let Ok(parsed) = Version::parse(version) {
        return Ok(parsed);
    }

    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() < 2 {
        return Err(Error::Version {
            version: version.to_string(),
        });
    }

    Ok(Version::new(
        leading_number(parts[0]),
        leading_number(parts[1]),
        parts.get(2).map_or(0, |p| leading_number(p)),
    ))
}

fn leading_number(part: &str) -> u64 {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// `major.minor.(patch + 1)`, dropping any pre-release or build suffix.
pub fn increment_patch(version: &str) -> Result<String> {
    let parsed = parse_version(version)?;
    let patch = parsed.patch.checked_add(1).ok_or_else(|| Error::Version {
        version: version.to_string(),
    })?;
    Ok(format!("{}.{}.{}", parsed.major, parsed.minor, patch))
}

/// Report disagreement between submodule versions.
///
/// Returns `None` when fewer than two distinct versions were detected.
/// Versions that cannot be parsed rank as `0.0.0` when picking the highest.
pub fn check_mismatch(infos: &[VersionInfo]) -> Option<VersionMismatch> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for info in infos {
        let Some(version) = &info.version else {
            continue;
        };
        match groups.iter_mut().find(|(v, _)| v == version) {
            Some((_, names)) => names.push(info.submodule_name.clone()),
            None => groups.push((version.clone(), vec![info.submodule_name.clone()])),
        }
    }

    if groups.len() <= 1 {
        return None;
    }

    let highest_version = groups
        .iter()
        .map(|(v, _)| v)
        .max_by_key(|v| parse_version(v).unwrap_or_else(|_| Version::new(0, 0, 0)))?
        .clone();

    Some(VersionMismatch {
        highest_version,
        groups,
    })
}

/// Rewrite `VERSION = "<old>"` to `new_version` in the info's version file.
pub fn update_version_file(info: &VersionInfo, new_version: &str) -> Result<()> {
    let (Some(path), Some(old)) = (&info.version_file_path, &info.version) else {
        return Ok(());
    };

    let content = fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    let pattern = Regex::new(&format!(
        r#"(VERSION\s*=\s*["']){}(["'])"#,
        regex::escape(old)
    ))?;
    let updated = pattern.replace_all(&content, format!("${{1}}{}${{2}}", new_version));
    fs::write(path, updated.as_bytes())?;
    Ok(())
}

/// Move every submodule with a version file to `new_version`.
///
/// Submodules already at the target, or without a version file, are left
/// alone and produce no result.
pub fn synchronize(infos: &[VersionInfo], new_version: &str) -> Vec<SyncResult> {
    infos
        .iter()
        .filter(|info| info.version_file_path.is_some())
        .filter(|info| info.version.as_deref() != Some(new_version))
        .map(|info| SyncResult {
            submodule_name: info.submodule_name.clone(),
            old_version: info.version.clone(),
            new_version: new_version.to_string(),
            error: update_version_file(info, new_version)
                .err()
                .map(|e| e.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gem(root: &Path, name: &str, version: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(dir.join(format!("lib/{}", name))).unwrap();
        fs::write(dir.join(SUBMODULER_INI_FILENAME), "[default]\n").unwrap();
        fs::write(
            dir.join(format!("{}.gemspec", name)),
            format!("Gem::Specification.new do |spec|\n  spec.name = \"{}-gem\"\nend\n", name),
        )
        .unwrap();
        fs::write(
            dir.join(format!("lib/{}/version.rb", name)),
            format!("module X\n  VERSION = \"{}\"\nend\n", version),
        )
        .unwrap();
        dir
    }

    fn info(name: &str, version: Option<&str>) -> VersionInfo {
        VersionInfo {
            submodule_name: name.to_string(),
            version: version.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_version() {
        let temp = TempDir::new().unwrap();
        let dir = gem(temp.path(), "core", "1.2.3");

        let info = detect_version(&dir, "core");
        assert_eq!(info.error, None);
        assert_eq!(info.gem_name.as_deref(), Some("core-gem"));
        assert_eq!(info.version.as_deref(), Some("1.2.3"));
        assert!(info
            .version_file_path
            .unwrap()
            .ends_with("lib/core/version.rb"));
    }

    #[test]
    fn test_detect_requires_ini() {
        let temp = TempDir::new().unwrap();
        let info = detect_version(temp.path(), "core");
        assert_eq!(info.error.as_deref(), Some("Missing .submoduler.ini file"));
    }

    #[test]
    fn test_detect_missing_gemspec() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SUBMODULER_INI_FILENAME), "").unwrap();
        let info = detect_version(temp.path(), "core");
        assert_eq!(info.error.as_deref(), Some("No gemspec found"));
    }

    #[test]
    fn test_detect_missing_version_file_keeps_gem_name() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SUBMODULER_INI_FILENAME), "").unwrap();
        fs::write(temp.path().join("thing.gemspec"), "# no name here").unwrap();

        let info = detect_version(temp.path(), "core");
        assert_eq!(info.gem_name.as_deref(), Some("thing"));
        assert_eq!(
            info.error.as_deref(),
            Some("No discrete version.rb file found")
        );
    }

    #[test]
    fn test_detect_root_version_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SUBMODULER_INI_FILENAME), "").unwrap();
        fs::write(temp.path().join("thing.gemspec"), "").unwrap();
        fs::write(temp.path().join("version.rb"), "VERSION = '0.4'").unwrap();

        let info = detect_version(temp.path(), "core");
        assert_eq!(info.version.as_deref(), Some("0.4"));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(parse_version("2.0.1.beta").unwrap(), Version::new(2, 0, 1));
        assert!(parse_version("").is_err());
        assert!(matches!(parse_version("abc"), Err(Error::Version { .. })));
    }

    #[test]
    fn test_increment_patch() {
        assert_eq!(increment_patch("0.1.9").unwrap(), "0.1.10");
        assert_eq!(increment_patch("1.2").unwrap(), "1.2.1");
        assert!(increment_patch("x").is_err());
    }

    #[test]
    fn test_increment_patch_at_u64_max_is_an_error() {
        let version = format!("1.2.{}", u64::MAX);
        assert!(matches!(
            increment_patch(&version),
            Err(Error::Version { version: v }) if v == version
        ));
    }

    #[test]
    fn test_check_mismatch_groups() {
        let infos = vec![
            info("a", Some("0.1.0")),
            info("b", Some("0.10.0")),
            info("c", Some("0.1.0")),
            info("d", None),
        ];
        let mismatch = check_mismatch(&infos).unwrap();
        assert_eq!(mismatch.highest_version, "0.10.0");
        assert_eq!(
            mismatch.groups,
            vec![
                ("0.1.0".to_string(), vec!["a".to_string(), "c".to_string()]),
                ("0.10.0".to_string(), vec!["b".to_string()]),
            ]
        );
    }

    #[test]
    fn test_no_mismatch_when_versions_agree() {
        let infos = vec![info("a", Some("1.0.0")), info("b", Some("1.0.0"))];
        assert!(check_mismatch(&infos).is_none());
        assert!(check_mismatch(&[]).is_none());
    }

    #[test]
    fn test_synchronize_rewrites_differing_files() {
        let temp = TempDir::new().unwrap();
        let a = gem(temp.path(), "a", "1.0.0");
        let b = gem(temp.path(), "b", "1.1.0");
        let infos = vec![detect_version(&a, "a"), detect_version(&b, "b")];

        let results = synchronize(&infos, "1.1.0");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].submodule_name, "a");
        assert!(results[0].success());

        let content = fs::read_to_string(a.join("lib/a/version.rb")).unwrap();
        assert!(content.contains("VERSION = \"1.1.0\""));
        assert_eq!(detect_version(&a, "a").version.as_deref(), Some("1.1.0"));
    }
}
