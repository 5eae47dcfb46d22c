use std::io::Write;

use ingest_fs::{Listing, create_unique, list_names, remove_dir_all, unique_path};
use tempfile::tempdir;

#[test]
fn test_allocation_keeps_every_content() {
    let dir = tempdir().unwrap();

    for body in ["first", "second", "third"] {
        let (_, mut file) = create_unique(dir.path(), "page.html").unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    assert_eq!(
        list_names(dir.path(), Listing::All).unwrap(),
        ["page.html", "page_1.html", "page_2.html"]
    );
    assert_eq!(std::fs::read_to_string(dir.path().join("page.html")).unwrap(), "first");
    assert_eq!(std::fs::read_to_string(dir.path().join("page_1.html")).unwrap(), "second");
    assert_eq!(std::fs::read_to_string(dir.path().join("page_2.html")).unwrap(), "third");
}

#[test]
fn test_unique_path_does_not_create() {
    let dir = tempdir().unwrap();
    let path = unique_path(dir.path(), "later.txt");
    assert!(!path.exists());
    assert!(list_names(dir.path(), Listing::All).unwrap().is_empty());
}

#[test]
fn test_remove_dir_all_cascades() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("proj");
    std::fs::create_dir(&project).unwrap();
    std::fs::write(project.join("a"), "a").unwrap();
    std::fs::write(project.join("b"), "b").unwrap();

    remove_dir_all(&project).unwrap();

    assert!(!project.exists());
    assert!(remove_dir_all(&project).unwrap_err().is_not_found());
}
