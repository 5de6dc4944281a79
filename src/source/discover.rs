//! Locating session logs on disk.
//!
//! Claude Code stores one JSONL file per session under
//! `~/.claude/projects/<mangled project path>/`, where the mangled name is the
//! absolute project path with every `/` replaced by `-`.

use crate::model::error::InputError;
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// `~/.claude/projects`, if a home directory is known.
pub fn default_projects_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".claude").join("projects"))
}

/// Directory name Claude Code uses for a project path.
pub fn mangle_project_path(path: &Path) -> String {
    path.to_string_lossy().replace('/', "-")
}

/// `project` with symlinks resolved, or as given if it cannot be resolved.
fn resolve_project_path(project: &Path) -> PathBuf {
    fs::canonicalize(project).unwrap_or_else(|_| project.to_path_buf())
}

/// Path prefix matching the files inside `project`, with a trailing `/`.
pub fn project_path_prefix(project: &Path) -> String {
    let resolved = resolve_project_path(project);
    let mut prefix = resolved
        .to_string_lossy()
        .trim_end_matches('/')
        .to_string();
    prefix.push('/');
    prefix
}

/// All `*.jsonl` files directly inside `dir`, oldest first by modification
/// time (ties broken by path).
pub fn discover_session_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !dir.is_dir() {
        return Err(InputError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let pattern = format!("{}/*.jsonl", Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern).map_err(|e| InputError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for path in paths {
        let path = path.map_err(|e| InputError::Io(e.into()))?;
        let modified = fs::metadata(&path)?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((modified, path));
    }
    files.sort();

    debug!("Found {} session files in {}", files.len(), dir.display());
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Session log directory for `project` under `projects_root`.
///
/// Tries the mangled path first, then any project directory whose logs record
/// the same working directory.
///
/// # Errors
///
/// Returns `InputError::ProjectNotFound` listing the known projects when no
/// directory matches.
pub fn find_project_log_dir(project: &Path, projects_root: &Path) -> Result<PathBuf, InputError> {
    let resolved = resolve_project_path(project);
    let expected = projects_root.join(mangle_project_path(&resolved));
    if expected.is_dir() {
        return Ok(expected);
    }

    let mut available = Vec::new();
    for dir in project_dirs(projects_root) {
        match read_project_cwd(&dir) {
            Some(cwd) if Path::new(&cwd) == resolved => return Ok(dir),
            Some(cwd) => available.push(cwd),
            None => available.push(
                dir.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        }
    }

    let available = if available.is_empty() {
        String::new()
    } else {
        format!("\n\nAvailable projects:\n  {}", available.join("\n  "))
    };
    Err(InputError::ProjectNotFound {
        path: resolved,
        expected,
        available,
    })
}

fn project_dirs(projects_root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(projects_root) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

#[derive(Deserialize)]
struct CwdProbe {
    #[serde(default)]
    cwd: Option<String>,
}

/// First non-empty `cwd` recorded in any session file of a project directory.
fn read_project_cwd(dir: &Path) -> Option<String> {
    let files = discover_session_files(dir).ok()?;
    files.iter().find_map(|path| {
        let file = fs::File::open(path).ok()?;
        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<CwdProbe>(&line).ok())
            .find_map(|probe| probe.cwd.filter(|cwd| !cwd.is_empty()))
    })
}
