use crate::error::AppError;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside `dir` (not recursive), sorted by file name.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Not a directory: {}", dir.display()),
        )));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let ft = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        let path = entry.path();
        if ft.is_file() && is_image_file(&path) {
            images.push(path);
        }
    }

    images.sort_by_key(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()));
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("dal.JPG")));
        assert!(is_image_file(Path::new("/tmp/x/samosa.webp")));
        assert!(!is_image_file(Path::new("dishes.csv")));
        assert!(!is_image_file(Path::new("noext")));
    }

    #[test]
    fn test_list_image_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "A.jpg", "notes.txt", "c.jpeg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = list_image_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.jpg", "b.png", "c.jpeg"]);
    }

    #[test]
    fn test_list_missing_dir_fails() {
        assert!(list_image_files(Path::new("/nonexistent/photos")).is_err());
    }
}
