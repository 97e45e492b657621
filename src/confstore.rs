use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfStoreError {
    #[error("could not read {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}")]
    Write { path: PathBuf, source: io::Error },
}

/// One physical line of the config file, kept with its original terminator.
/// Untouched lines are written back from `raw` verbatim, so comments,
/// blanks, unknown keys, and CRLF endings all survive a patch run
/// byte-identically.
#[derive(Debug, Clone)]
struct Line {
    raw: String,
}

impl Line {
    /// Key of a `key=value` line, anchored at the line start. Comment lines
    /// and lines without `=` have no key.
    fn key(&self) -> Option<&str> {
        let content = self.raw.trim_end_matches(['\n', '\r']);
        if content.starts_with('#') {
            return None;
        }
        match content.split_once('=') {
            Some((key, _)) if !key.is_empty() => Some(key),
            _ => None,
        }
    }

    fn terminator(&self) -> &str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else if self.raw.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }
}

/// Ordered view of a `batocera.conf`-style file. Patch operations touch
/// only the lines they match; everything else round-trips exactly.
#[derive(Debug)]
pub struct ConfStore {
    path: PathBuf,
    lines: Vec<Line>,
}

impl ConfStore {
    /// Load the file, or `None` if it does not exist (the caller decides
    /// whether that is a warning or an error).
    pub fn load(path: &Path) -> Result<Option<Self>, ConfStoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfStoreError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let lines = text
            .split_inclusive('\n')
            .map(|raw| Line {
                raw: raw.to_string(),
            })
            .collect();

        Ok(Some(Self {
            path: path.to_path_buf(),
            lines,
        }))
    }

    /// Replace the value of the line whose key is exactly `key`. Returns
    /// false (and changes nothing) when no such line exists: the file never
    /// gains keys it did not already carry.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        for line in &mut self.lines {
            if line.key() == Some(key) {
                let term = line.terminator().to_string();
                line.raw = format!("{}={}{}", key, value, term);
                return true;
            }
        }
        false
    }

    /// Remove every line whose key starts with `prefix`; returns how many
    /// lines were dropped.
    pub fn delete_prefix(&mut self, prefix: &str) -> usize {
        let before = self.lines.len();
        self.lines
            .retain(|line| !line.key().is_some_and(|k| k.starts_with(prefix)));
        before - self.lines.len()
    }

    pub fn save(&self) -> Result<(), ConfStoreError> {
        let text: String = self.lines.iter().map(|l| l.raw.as_str()).collect();
        fs::write(&self.path, text).map_err(|e| ConfStoreError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# batocera.conf
system.hostname=BATOCERA

xbox.emulator=cxbxr
xbox.core=cxbxr
xbox.cxbxr_fullscreen=1
xbox.cxbxr_resolution=1280x720
xbox.cxbxr_vsync=0
kodi.enabled=1
";

    fn store_from(contents: &str) -> (tempfile::TempDir, ConfStore) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batocera.conf");
        fs::write(&path, contents).unwrap();
        let store = ConfStore::load(&path).unwrap().unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        assert!(ConfStore::load(&dir.path().join("nope.conf"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn set_replaces_only_the_matching_line() {
        let (_dir, mut store) = store_from(SAMPLE);
        assert!(store.set("xbox.emulator", "xemu"));
        store.save().unwrap();

        let written = fs::read_to_string(&store.path).unwrap();
        assert_eq!(
            written,
            SAMPLE.replace("xbox.emulator=cxbxr", "xbox.emulator=xemu")
        );
    }

    #[test]
    fn set_does_not_append_missing_keys() {
        let (_dir, mut store) = store_from(SAMPLE);
        assert!(!store.set("xbox.nonexistent", "1"));
        store.save().unwrap();
        assert_eq!(fs::read_to_string(&store.path).unwrap(), SAMPLE);
    }

    #[test]
    fn set_ignores_commented_lines() {
        let (_dir, mut store) = store_from("# xbox.emulator=old\nxbox.emulator=cxbxr\n");
        assert!(store.set("xbox.emulator", "xemu"));
        store.save().unwrap();
        assert_eq!(
            fs::read_to_string(&store.path).unwrap(),
            "# xbox.emulator=old\nxbox.emulator=xemu\n"
        );
    }

    #[test]
    fn delete_prefix_removes_exactly_the_family() {
        let (_dir, mut store) = store_from(SAMPLE);
        assert_eq!(store.delete_prefix("xbox.cxbxr_"), 3);
        store.save().unwrap();

        let written = fs::read_to_string(&store.path).unwrap();
        let expected = "\
# batocera.conf
system.hostname=BATOCERA

xbox.emulator=cxbxr
xbox.core=cxbxr
kodi.enabled=1
";
        assert_eq!(written, expected);
    }

    #[test]
    fn untouched_files_round_trip_byte_identically() {
        let odd = "# comment\r\nweird  spacing = kept\nxbox.emulator=cxbxr\nno-newline-at-eof=1";
        let (_dir, mut store) = store_from(odd);
        assert_eq!(store.delete_prefix("totally.absent"), 0);
        store.save().unwrap();
        assert_eq!(fs::read_to_string(&store.path).unwrap(), odd);
    }

    #[test]
    fn set_preserves_crlf_terminator() {
        let (_dir, mut store) = store_from("xbox.emulator=cxbxr\r\nxbox.core=cxbxr\r\n");
        assert!(store.set("xbox.emulator", "xemu"));
        store.save().unwrap();
        assert_eq!(
            fs::read_to_string(&store.path).unwrap(),
            "xbox.emulator=xemu\r\nxbox.core=cxbxr\r\n"
        );
    }
}
