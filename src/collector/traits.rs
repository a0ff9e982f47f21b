//! Filesystem abstraction so collectors can run against `/proc` in
//! production and against fixtures in tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only filesystem surface used by every collector.
pub trait FileSystem {
    /// Reads the entire file into a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns true if the path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists directory entry names (final component only, no paths).
    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Resolves a symlink target.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Passthrough to the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }
}

/// Feeds a file to `handler` one line at a time. The handler returns
/// `false` to stop before the end of the file.
///
/// Open and read failures propagate; a handler stop is not an error.
pub fn read_lines<F, H>(fs: &F, path: &Path, mut handler: H) -> io::Result<()>
where
    F: FileSystem,
    H: FnMut(&str) -> bool,
{
    let content = fs.read_to_string(path)?;
    for line in content.lines() {
        if !handler(line) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn read_lines_visits_every_line() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/fake", "one\ntwo\nthree\n");
        let mut seen = Vec::new();
        read_lines(&fs, Path::new("/proc/fake"), |line| {
            seen.push(line.to_string());
            true
        })
        .unwrap();
        assert_eq!(seen, ["one", "two", "three"]);
    }

    #[test]
    fn read_lines_stops_when_handler_says_so() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/fake", "one\ntwo\nthree\n");
        let mut seen = 0;
        read_lines(&fs, Path::new("/proc/fake"), |_| {
            seen += 1;
            seen < 2
        })
        .unwrap();
        assert_eq!(seen, 2);
    }

    #[test]
    fn read_lines_propagates_open_failure() {
        let fs = MockFs::new();
        assert!(read_lines(&fs, Path::new("/proc/missing"), |_| true).is_err());
    }
}
