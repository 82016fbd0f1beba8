//! Real git repositories served over `file://`

use git2::{Repository, Signature};
use gctl::domain::entities::Project;
use std::path::Path;

/// Create a bare-bones repository with one commit at `root/<namespace>.git`
///
/// Returns the project describing it; clone with base URL
/// [`file_base_url`] of the same `root`.
pub fn remote_repository(root: &Path, id: u64, namespace: &str) -> Project {
    let path = root.join(format!("{namespace}.git"));
    std::fs::create_dir_all(&path).unwrap();
    let repo = Repository::init(&path).unwrap();

    std::fs::write(path.join("README.md"), format!("# {namespace}\n")).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("README.md")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("gctl", "gctl@example.com").unwrap();
    repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
        .unwrap();

    Project::new(id, namespace)
}

pub fn file_base_url(root: &Path) -> String {
    format!("file://{}", root.display())
}
