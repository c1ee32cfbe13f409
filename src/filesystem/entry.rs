use std::time::SystemTime;

use derive_more::Display;

use crate::tree::Named;

/// A single directory or file stored in the filesystem tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EntryKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File(FileData),
}

/// Payload of a file entry. `size` always equals the byte length of `contents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    contents: String,
    size: u64,
    last_modified: SystemTime,
}

impl FileData {
    pub fn new(contents: impl Into<String>) -> Self {
        let contents = contents.into();
        Self {
            size: contents.len() as u64,
            contents,
            last_modified: SystemTime::now(),
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    pub fn overwrite(&mut self, contents: &str) {
        self.contents = contents.to_string();
        self.touch();
    }

    pub fn append(&mut self, contents: &str) {
        self.contents.push_str(contents);
        self.touch();
    }

    fn touch(&mut self) {
        self.size = self.contents.len() as u64;
        self.last_modified = SystemTime::now();
    }
}

impl Entry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn file(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File(FileData::new(contents)),
        }
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File(_))
    }

    pub fn file_data(&self) -> Option<&FileData> {
        match &self.kind {
            EntryKind::File(data) => Some(data),
            EntryKind::Directory => None,
        }
    }

    pub fn file_data_mut(&mut self) -> Option<&mut FileData> {
        match &mut self.kind {
            EntryKind::File(data) => Some(data),
            EntryKind::Directory => None,
        }
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Same kind of entry, ignoring any file payload.
    pub fn same_kind(&self, other: &Entry) -> bool {
        self.is_dir() == other.is_dir()
    }
}

impl Named for Entry {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn new_file_size_counts_bytes() {
        let data = FileData::new("héllo");
        assert_eq!(data.size(), 6);
        assert_eq!(data.contents(), "héllo");
    }

    #[test]
    fn overwrite_replaces_contents_and_size() {
        let mut data = FileData::new("a longer text");
        data.overwrite("short");
        assert_eq!(data.contents(), "short");
        assert_eq!(data.size(), 5);
    }

    #[test]
    fn append_recomputes_size_and_refreshes_timestamp() {
        let mut data = FileData::new("hello");
        let before = data.last_modified();
        thread::sleep(Duration::from_millis(10));
        data.append(" world");
        assert_eq!(data.contents(), "hello world");
        assert_eq!(data.size(), 11);
        assert!(data.last_modified() > before);
    }

    #[test]
    fn kinds_are_displayed_by_name() {
        assert_eq!(Entry::directory("d").kind().to_string(), "directory");
        assert_eq!(Entry::file("f", "").kind().to_string(), "file");
    }

    #[test]
    fn directory_has_no_file_payload() {
        let mut dir = Entry::directory("d");
        assert!(dir.is_dir());
        assert!(dir.file_data().is_none());
        assert!(dir.file_data_mut().is_none());
        assert!(!dir.same_kind(&Entry::file("f", "")));
        assert!(dir.same_kind(&Entry::directory("other")));
    }
}
