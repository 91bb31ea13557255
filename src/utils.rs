//! Utility functions for remote URLs and paths

use std::path::{Path, PathBuf};

/// Check if a remote is a local filesystem path (not a remote URL)
///
/// Returns true for:
/// - Absolute paths on Unix: /path/to/repo
/// - Absolute paths on Windows: C:\path\to\repo or C:/path/to/repo
/// - Relative paths: ./path or ../path
/// - UNC paths on Windows: \\server\share
/// - file:// URLs
///
/// Returns false for:
/// - SSH URLs: git@github.com:user/repo.git
/// - HTTPS URLs: <https://github.com/user/repo.git>
pub fn is_local_path(path: &str) -> bool {
  let p = Path::new(path);

  if path.starts_with("file://") {
    return true;
  }

  // Check for relative paths
  if path.starts_with("./") || path.starts_with("../") {
    return true;
  }

  // Check for Windows drive letter (C:\ or C:/)
  // Must check before URL check since Windows paths contain ':'
  if path.len() >= 3 {
    let bytes = path.as_bytes();
    if bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/') {
      return true;
    }
  }

  // Check for Windows UNC paths (\\server\share)
  if path.starts_with("\\\\") {
    return true;
  }

  // Check for Unix absolute paths (/path/to/repo)
  // Important: Check this BEFORE is_absolute() because on Windows,
  // Path::is_absolute() returns false for Unix-style paths
  if path.starts_with('/') && !path.contains("://") && !path.contains('@') {
    return true;
  }

  if p.is_absolute() {
    return true;
  }

  // Anything else (URLs, scp-style SSH, bare names) is treated as remote
  false
}

/// Embed a token into an https remote URL for pushing
///
/// Non-https remotes (local paths, SSH) are returned unchanged; they
/// authenticate some other way.
pub fn authenticated_remote(remote: &str, token: &str) -> String {
  match remote.strip_prefix("https://") {
    Some(rest) => {
      // Drop credentials already present in the URL
      let host_and_path = match rest.split_once('@') {
        Some((userinfo, tail)) if !userinfo.contains('/') => tail,
        _ => rest,
      };
      format!("https://x-access-token:{}@{}", token, host_and_path)
    }
    None => remote.to_string(),
  }
}

/// Hide credentials embedded in a remote URL for logging
pub fn redact_remote(remote: &str) -> String {
  if let Some((scheme, rest)) = remote.split_once("://")
    && let Some((userinfo, tail)) = rest.split_once('@')
    && !userinfo.contains('/')
  {
    return format!("{}://***@{}", scheme, tail);
  }
  remote.to_string()
}

/// Whether pushing to `remote` requires the token
pub fn needs_token(remote: &str) -> bool {
  remote.starts_with("https://") || remote.starts_with("http://")
}

/// Resolve `program` the way `Command::new` would from `cwd`
///
/// Names containing a path separator are taken relative to `cwd`; bare
/// names are searched on PATH.
pub fn find_program(program: &str, cwd: &Path) -> Option<PathBuf> {
  if program.contains('/') || program.contains('\\') {
    let path = cwd.join(program);
    return path.is_file().then_some(path);
  }

  let path_var = std::env::var_os("PATH")?;
  std::env::split_paths(&path_var)
    .map(|dir| dir.join(program))
    .find(|candidate| candidate.is_file())
}
