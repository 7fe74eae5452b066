use std::path::Path;

/// Filesystem operations needed outside the pure core.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
