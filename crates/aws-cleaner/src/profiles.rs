//! Named AWS profile discovery
//!
//! Reads section headers from the shared credentials and config files to
//! offer profile names in the selector. Only names are read; credential
//! resolution itself stays with `aws-config`.
//!
//! Section rules follow the SDK's profile file parser:
//! - credentials file: `[name]`
//! - config file: `[default]` or `[profile name]`; other prefixed sections
//!   (`[sso-session x]`, `[services x]`) are not profiles

use directories::BaseDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";
const CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";
const PROFILE_PREFIX: &str = "profile";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFileKind {
    Credentials,
    Config,
}

/// Locations of the two shared files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFiles {
    pub credentials: PathBuf,
    pub config: PathBuf,
}

impl ProfileFiles {
    /// `~/.aws/credentials` and `~/.aws/config`, unless overridden by
    /// `AWS_SHARED_CREDENTIALS_FILE` / `AWS_CONFIG_FILE`.
    pub fn from_env() -> Result<Self, ProfileError> {
        let credentials = std::env::var_os(CREDENTIALS_FILE_ENV).map(PathBuf::from);
        let config = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);

        let aws_dir = || -> Result<PathBuf, ProfileError> {
            let dirs = BaseDirs::new().ok_or(ProfileError::NoHomeDir)?;
            Ok(dirs.home_dir().join(".aws"))
        };

        Ok(Self {
            credentials: match credentials {
                Some(path) => path,
                None => aws_dir()?.join("credentials"),
            },
            config: match config {
                Some(path) => path,
                None => aws_dir()?.join("config"),
            },
        })
    }

    /// Profile names from both files, credentials first, in file order
    /// without duplicates. Missing files contribute nothing.
    pub fn profile_names(&self) -> Result<Vec<String>, ProfileError> {
        let mut names = Vec::new();
        for (path, kind) in [
            (&self.credentials, ProfileFileKind::Credentials),
            (&self.config, ProfileFileKind::Config),
        ] {
            let Some(contents) = read_optional(path)? else {
                debug!(path = %path.display(), "Profile file not present");
                continue;
            };
            for name in parse_profile_names(&contents, kind) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        if names.is_empty() {
            warn!(
                "No AWS profiles found in {} or {}",
                self.credentials.display(),
                self.config.display()
            );
        }
        Ok(names)
    }
}

/// Profile names available on this machine.
pub fn list_profiles() -> Result<Vec<String>, ProfileError> {
    ProfileFiles::from_env()?.profile_names()
}

fn read_optional(path: &Path) -> Result<Option<String>, ProfileError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ProfileError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Profile names declared by section headers in one file.
pub fn parse_profile_names(contents: &str, kind: ProfileFileKind) -> Vec<String> {
    contents
        .lines()
        .filter_map(section_header)
        .filter_map(|header| profile_name(header, kind))
        .map(str::to_string)
        .collect()
}

/// The text between `[` and `]` on a header line, if it is one
fn section_header(line: &str) -> Option<&str> {
    let line = line.trim();
    let inner = line.strip_prefix('[')?;
    let end = inner.find(']')?;
    // Anything after the bracket must be a comment
    let rest = inner[end + 1..].trim_start();
    if !(rest.is_empty() || rest.starts_with('#') || rest.starts_with(';')) {
        return None;
    }
    Some(inner[..end].trim())
}

fn profile_name(header: &str, kind: ProfileFileKind) -> Option<&str> {
    if header.is_empty() {
        return None;
    }
    match (kind, header.split_once(char::is_whitespace)) {
        (ProfileFileKind::Credentials, None) => Some(header),
        (ProfileFileKind::Credentials, Some(_)) => None,
        (ProfileFileKind::Config, None) => (header == "default").then_some(header),
        (ProfileFileKind::Config, Some((prefix, name))) => {
            let name = name.trim();
            (prefix == PROFILE_PREFIX && !name.is_empty()).then_some(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CREDENTIALS: &str = "\
[default]
aws_access_key_id = AKIA0
aws_secret_access_key = x

# [commented]
[sandbox] ; personal account
aws_access_key_id = AKIA1
[profile not-in-credentials]
";

    const CONFIG: &str = "\
[default]
region = us-east-1
[profile sandbox]
region = eu-west-1
[profile   staging  ]
sso_session = corp
[sso-session corp]
sso_region = us-east-1
[bare]
";

    #[test]
    fn credentials_sections_are_profiles() {
        assert_eq!(
            parse_profile_names(CREDENTIALS, ProfileFileKind::Credentials),
            vec!["default", "sandbox"]
        );
    }

    #[test]
    fn config_needs_profile_prefix() {
        assert_eq!(
            parse_profile_names(CONFIG, ProfileFileKind::Config),
            vec!["default", "sandbox", "staging"]
        );
    }

    #[test]
    fn header_parsing_edge_cases() {
        assert_eq!(section_header("  [a]  "), Some("a"));
        assert_eq!(section_header("[a] # note"), Some("a"));
        assert_eq!(section_header("[a] trailing"), None);
        assert_eq!(section_header("key = [a]"), None);
        assert_eq!(section_header("[unterminated"), None);
    }

    #[test]
    fn files_merge_in_order_without_duplicates() {
        let dir = TempDir::new().unwrap();
        let files = ProfileFiles {
            credentials: dir.path().join("credentials"),
            config: dir.path().join("config"),
        };
        fs::write(&files.credentials, CREDENTIALS).unwrap();
        fs::write(&files.config, CONFIG).unwrap();

        assert_eq!(
            files.profile_names().unwrap(),
            vec!["default", "sandbox", "staging"]
        );
    }

    #[test]
    fn missing_files_yield_no_profiles() {
        let dir = TempDir::new().unwrap();
        let files = ProfileFiles {
            credentials: dir.path().join("nope"),
            config: dir.path().join("also-nope"),
        };
        assert!(files.profile_names().unwrap().is_empty());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a file
        let files = ProfileFiles {
            credentials: dir.path().to_path_buf(),
            config: dir.path().join("config"),
        };
        assert!(matches!(
            files.profile_names(),
            Err(ProfileError::Read { .. })
        ));
    }
}
