use pkgsync_fs::{Error, NormalizedPath, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("Packages/manifest.json"));

    io::write_atomic(&path, b"{}").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("manifest.json");
    fs::write(&file_path, "original").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("manifest.json"));

    io::write_atomic(&path, b"a").unwrap();
    io::write_atomic(&path, b"b").unwrap();

    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["manifest.json".to_string()]);
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = NormalizedPath::new("/nonexistent/manifest.json");
    let result = io::read_text(&path);
    assert!(matches!(result, Err(Error::Io { .. })));
}

#[test]
fn test_copy_tree_mirrors_directory() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("a.txt"), "a").unwrap();
    fs::write(src.join("nested/b.txt"), "b").unwrap();

    let dst = temp.path().join("out/demo");
    let copied = io::copy_tree(&NormalizedPath::new(&src), &NormalizedPath::new(&dst)).unwrap();

    assert_eq!(copied, 2);
    assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
    assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "b");
    assert!(src.join("a.txt").exists(), "copy must not remove the source");
}

#[test]
fn test_copy_tree_single_file() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("payload.txt");
    fs::write(&src, "data").unwrap();
    let dst = temp.path().join("deep/target.txt");

    io::copy_tree(&NormalizedPath::new(&src), &NormalizedPath::new(&dst)).unwrap();

    assert_eq!(fs::read_to_string(dst).unwrap(), "data");
}

#[test]
fn test_copy_tree_missing_source() {
    let temp = TempDir::new().unwrap();
    let err = io::copy_tree(
        &NormalizedPath::new(temp.path().join("missing")),
        &NormalizedPath::new(temp.path().join("out")),
    )
    .unwrap_err();
    assert!(matches!(err, Error::SourceMissing { .. }));
}

#[test]
fn test_move_dir_replaces_existing_destination() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("Assets/com.acme");
    let dst = temp.path().join("Packages/com.acme");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("package.json"), "{\"name\":\"new\"}").unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(dst.join("stale.txt"), "old").unwrap();

    io::move_dir(&NormalizedPath::new(&src), &NormalizedPath::new(&dst)).unwrap();

    assert!(!src.exists());
    assert!(dst.join("package.json").exists());
    assert!(!dst.join("stale.txt").exists());
}

#[test]
fn test_find_dirs_containing_skips_nested_matches() {
    let temp = TempDir::new().unwrap();
    let assets = temp.path().join("Assets");
    for dir in ["b.pkg", "a.pkg", "a.pkg/inner", "plain"] {
        fs::create_dir_all(assets.join(dir)).unwrap();
    }
    fs::write(assets.join("a.pkg/package.json"), "{}").unwrap();
    fs::write(assets.join("a.pkg/inner/package.json"), "{}").unwrap();
    fs::write(assets.join("b.pkg/package.json"), "{}").unwrap();
    fs::write(assets.join("plain/readme.txt"), "").unwrap();

    let found = io::find_dirs_containing(&NormalizedPath::new(&assets), "package.json").unwrap();
    let names: Vec<_> = found.iter().filter_map(|p| p.file_name()).collect();

    assert_eq!(names, vec!["a.pkg", "b.pkg"]);
}

#[test]
fn test_find_dirs_containing_missing_root() {
    let temp = TempDir::new().unwrap();
    let found =
        io::find_dirs_containing(&NormalizedPath::new(temp.path().join("Assets")), "package.json").unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_file_lock_excludes_other_holders_until_dropped() {
    use fs2::FileExt;

    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("Packages/manifest.json"));

    let lock = io::FileLock::acquire(&path).unwrap();
    assert_eq!(lock.lock_path(), temp.path().join("Packages/manifest.json.lock"));

    let other = fs::OpenOptions::new().write(true).open(lock.lock_path()).unwrap();
    assert!(other.try_lock_exclusive().is_err());

    drop(lock);
    assert!(other.try_lock_exclusive().is_ok());
    FileExt::unlock(&other).unwrap();
}

#[test]
fn test_create_and_remove_dir_all() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("Packages/com.new/Tests/Editor"));

    io::create_dir_all(&path).unwrap();
    assert!(path.is_dir());

    let package = NormalizedPath::new(temp.path().join("Packages/com.new"));
    io::remove_dir_all(&package).unwrap();
    assert!(!package.exists());
    io::remove_dir_all(&package).unwrap();
}
