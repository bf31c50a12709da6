use std::collections::HashMap;

use crate::error::DirectoryError;

/// Reference set of internal extensions and the user ids they belong to.
pub const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("7773", "AD"),
    ("7789", "PF"),
    ("7725", "CB"),
    ("7729", "SM"),
    ("7768", "CM"),
    ("7722", "FF"),
    ("7783", "TM"),
    ("7769", "PB"),
    ("7721", "KS"),
    ("7787", "DK"),
    ("7776", "DH"),
    ("7779", "FM"),
    ("7784", "MV"),
];

/// Hard allow-list of extension -> user id. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExtensionDirectory {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ExtensionDirectory {
    /// Entries keep their given order; a repeated extension keeps its last user.
    pub fn new<I, K, V>(entries: I) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut dir = ExtensionDirectory {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (ext, user) in entries {
            let ext: String = ext.into();
            let user: String = user.into();
            if ext.len() != 4 || !ext.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DirectoryError::BadExtension(ext));
            }
            if user.trim().is_empty() {
                return Err(DirectoryError::EmptyUser(ext));
            }
            match dir.index.get(&ext) {
                Some(&pos) => dir.entries[pos].1 = user,
                None => {
                    dir.index.insert(ext.clone(), dir.entries.len());
                    dir.entries.push((ext, user));
                }
            }
        }
        Ok(dir)
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN_ENTRIES
            .iter()
            .map(|(ext, user)| (ext.to_string(), user.to_string()));
        ExtensionDirectory {
            index: entries
                .clone()
                .enumerate()
                .map(|(i, (ext, _))| (ext, i))
                .collect(),
            entries: entries.collect(),
        }
    }

    pub fn user(&self, extension: &str) -> Option<&str> {
        self.index
            .get(extension)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.index.contains_key(extension)
    }

    /// User ids in directory order, without duplicates.
    pub fn users(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for (_, user) in &self.entries {
            if !seen.contains(&user.as_str()) {
                seen.push(user.as_str());
            }
        }
        seen
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(e, u)| (e.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExtensionDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Keep only rows whose extension is in the directory and attach the user.
/// Misses are dropped silently; the caller only sees the shrunken batch.
pub fn resolve<T>(
    directory: &ExtensionDirectory,
    rows: Vec<T>,
    extension_of: impl Fn(&T) -> Option<&str>,
) -> Vec<(String, T)> {
    rows.into_iter()
        .filter_map(|row| {
            let user = directory.user(extension_of(&row)?)?.to_string();
            Some((user, row))
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_reference_entries() {
        let dir = ExtensionDirectory::builtin();
        assert_eq!(dir.len(), 13);
        assert_eq!(dir.user("7773"), Some("AD"));
        assert_eq!(dir.user("7789"), Some("PF"));
        assert_eq!(dir.user("7784"), Some("MV"));
        assert_eq!(dir.user("9999"), None);
        assert_eq!(dir.users().first(), Some(&"AD"));
    }

    #[test]
    fn rejects_bad_extensions() {
        assert_eq!(
            ExtensionDirectory::new([("777", "AD")]).unwrap_err(),
            DirectoryError::BadExtension("777".into())
        );
        assert_eq!(
            ExtensionDirectory::new([("77a3", "AD")]).unwrap_err(),
            DirectoryError::BadExtension("77a3".into())
        );
        assert_eq!(
            ExtensionDirectory::new([("7773", " ")]).unwrap_err(),
            DirectoryError::EmptyUser("7773".into())
        );
    }

    #[test]
    fn two_directories_side_by_side() {
        let old = ExtensionDirectory::new([("7773", "AD")]).unwrap();
        let new = ExtensionDirectory::new([("7773", "AD"), ("7784", "MV")]).unwrap();
        assert!(!old.contains("7784"));
        assert!(new.contains("7784"));
    }

    #[test]
    fn resolve_is_a_hard_filter() {
        let dir = ExtensionDirectory::builtin();
        let rows = vec![Some("7773"), Some("9999"), None, Some("7721")];
        let kept = resolve(&dir, rows, |r| *r);
        let users: Vec<_> = kept.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(users, vec!["AD", "KS"]);
    }

    #[test]
    fn duplicate_extension_keeps_last_user() {
        let dir = ExtensionDirectory::new([("7773", "AD"), ("7773", "XX")]).unwrap();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.user("7773"), Some("XX"));
    }
}
