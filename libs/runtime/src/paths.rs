use anyhow::{Context, Result};
use std::path::PathBuf;

/// Resolve the server home directory into an absolute path.
///
/// An explicit value wins when given; a leading `~` expands to the user's
/// home directory. With no explicit value the platform default is used:
/// `%APPDATA%\<subdir>` on Windows, `$HOME/<subdir>` elsewhere.
pub fn resolve_home_dir(explicit: Option<String>, subdir: &str, create: bool) -> Result<PathBuf> {
    let resolved = match explicit {
        Some(raw) => expand_user_path(&raw)?,
        None => platform_home()?.join(subdir),
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("current working directory is unavailable")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("failed to create home dir {}", absolute.display()))?;
    }

    Ok(absolute)
}

fn expand_user_path(raw: &str) -> Result<PathBuf> {
    if let Some(rest) = raw.strip_prefix('~') {
        let home = platform_home()?;
        let rest = rest.trim_start_matches(['/', '\\']);
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw))
}

#[cfg(target_os = "windows")]
fn platform_home() -> Result<PathBuf> {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .context("APPDATA is not set")
}

#[cfg(not(target_os = "windows"))]
fn platform_home() -> Result<PathBuf> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .context("HOME is not set")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_absolute_path_is_kept() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("explicit");
        let resolved =
            resolve_home_dir(Some(dir.to_string_lossy().to_string()), ".petcare", true).unwrap();
        assert_eq!(resolved, dir);
        assert!(dir.exists());
    }

    #[test]
    fn tilde_expands_to_home() {
        let tmp = tempdir().unwrap();
        #[cfg(target_os = "windows")]
        std::env::set_var("APPDATA", tmp.path());
        #[cfg(not(target_os = "windows"))]
        std::env::set_var("HOME", tmp.path());

        let resolved = resolve_home_dir(Some("~/nested/dir".to_string()), ".petcare", false).unwrap();
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("nested/dir"));
    }

    #[test]
    fn missing_value_falls_back_to_platform_default() {
        let tmp = tempdir().unwrap();
        #[cfg(target_os = "windows")]
        std::env::set_var("APPDATA", tmp.path());
        #[cfg(not(target_os = "windows"))]
        std::env::set_var("HOME", tmp.path());

        let resolved = resolve_home_dir(None, ".petcare", true).unwrap();
        assert!(resolved.ends_with(".petcare"));
        assert!(resolved.exists());
    }
}
