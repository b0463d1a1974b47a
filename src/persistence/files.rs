use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the data directory, both local and under the home directory
pub const DATA_DIR_NAME: &str = ".naughtya";

/// Get the data directory - checks for a local .naughtya first, then falls back to ~/.naughtya
pub fn get_data_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_data_dir(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DATA_DIR_NAME))
}

/// Find a local data directory by walking up the directory tree
pub fn find_local_data_dir(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        let candidate = current.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Ensure the data directory exists
pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = get_data_dir()?;
    ensure_dir(&dir)?;
    Ok(dir)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Initialize a local data directory inside `parent`
pub fn init_local_data_dir(parent: &Path) -> Result<PathBuf> {
    let data_dir = parent.join(DATA_DIR_NAME);
    if data_dir.exists() {
        anyhow::bail!("Data directory already exists: {}", data_dir.display());
    }
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;
    Ok(data_dir)
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;
    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;
    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

/// Read file content, return empty string if file doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        atomic_write(&test_file, "Hello, world!").unwrap();
        assert_eq!(read_file(&test_file).unwrap(), "Hello, world!");

        atomic_write(&test_file, "replaced").unwrap();
        assert_eq!(read_file(&test_file).unwrap(), "replaced");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let content = read_file(temp_dir.path().join("nonexistent.txt")).unwrap();
        assert_eq!(content, "");
    }

    #[test]
    fn test_find_local_data_dir_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_local_data_dir(&nested).filter(|d| d.starts_with(root)), None);

        let data_dir = init_local_data_dir(root).unwrap();
        assert_eq!(find_local_data_dir(&nested), Some(data_dir));
    }

    #[test]
    fn test_init_twice_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        init_local_data_dir(temp_dir.path()).unwrap();
        assert!(init_local_data_dir(temp_dir.path()).is_err());
    }
}
