use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "terrain_prettifier_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn backup_path_inserts_suffix_before_extension() {
    assert_eq!(
        backup_path(Path::new("terrain/height.raw")),
        PathBuf::from("terrain/height_Backup.raw")
    );
    assert_eq!(
        backup_path(Path::new("terrain/height")),
        PathBuf::from("terrain/height_Backup")
    );
}

#[test]
fn backup_then_restore_recovers_original_bytes() {
    let dir = temp_dir("backup_restore");
    let path = dir.join("height.png");
    std::fs::write(&path, b"original").unwrap();

    assert!(!has_backup(&path));
    assert!(ensure_backup(&path).unwrap());
    assert!(has_backup(&path));

    std::fs::write(&path, b"modified").unwrap();
    // An existing backup is kept.
    assert!(!ensure_backup(&path).unwrap());

    assert!(restore(&path).unwrap());
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn explicit_backup_overwrites() {
    let dir = temp_dir("backup_overwrite");
    let path = dir.join("sat.jpg");
    std::fs::write(&path, b"one").unwrap();
    backup(&path).unwrap();
    std::fs::write(&path, b"two").unwrap();
    let dst = backup(&path).unwrap();
    assert_eq!(std::fs::read(dst).unwrap(), b"two");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn restore_without_backup_is_a_no_op() {
    let dir = temp_dir("restore_missing");
    let path = dir.join("h.png");
    std::fs::write(&path, b"data").unwrap();
    assert!(!restore(&path).unwrap());
    assert_eq!(std::fs::read(&path).unwrap(), b"data");
    let _ = std::fs::remove_dir_all(&dir);
}
