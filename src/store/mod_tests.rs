//! Tests for byte stores.

use std::io::ErrorKind;

use tempfile::TempDir;

use super::mock::MemoryByteStore;
use super::*;

mod fs_store {
    use super::*;

    #[test]
    fn missing_file_does_not_exist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        assert!(!FsByteStore.exists(&path));
        let err = FsByteStore.read_all(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        assert!(!FsByteStore.exists(dir.path()));
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        FsByteStore.write_all(&path, b"port = 1\n").unwrap();

        assert!(FsByteStore.exists(&path));
        assert_eq!(FsByteStore.read_all(&path).unwrap(), b"port = 1\n");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.json");

        FsByteStore.write_all(&path, b"{}").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn overwrite_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        FsByteStore.write_all(&path, b"{\"a\": 1, \"long\": true}").unwrap();
        FsByteStore.write_all(&path, b"{}").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        FsByteStore.write_all(&path, b"{}").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["config.json"]);
    }
}

mod memory_store {
    use super::*;

    #[test]
    fn counts_writes_but_not_seeds() {
        let store = MemoryByteStore::new();
        store.insert("a.json", "{}");

        store.write_all(Path::new("b.json"), b"{}").unwrap();

        assert_eq!(store.write_count(), 1);
        assert!(store.exists(Path::new("a.json")));
        assert_eq!(store.text("b.json").as_deref(), Some("{}"));
    }

    #[test]
    fn failed_writes_leave_contents_untouched() {
        let store = MemoryByteStore::new();
        store.insert("a.json", "{}");
        store.fail_writes();

        let err = store.write_all(Path::new("a.json"), b"[]").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(store.text("a.json").as_deref(), Some("{}"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn clones_share_files() {
        let store = MemoryByteStore::new();
        let handle = store.clone();

        store.write_all(Path::new("x"), b"1").unwrap();

        assert_eq!(handle.text("x").as_deref(), Some("1"));
        assert_eq!(handle.write_count(), 1);
    }
}
