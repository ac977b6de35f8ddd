// THEORY:
// Image sources are the bridge between the outside world and the engine. The
// estimator never touches the filesystem; it only sees `(identifier, Image)`
// pairs handed over by something implementing `ImageSource`. Two sources ship
// with the crate:
// - `MemorySource`: pairs the caller already holds (tests, embedding).
// - `DirectorySource`: every image file in one directory, decoded with the
//   `image` crate and converted to 8-bit RGB. Symlinks are followed.
//   Identifiers are file names (escaped when not valid UTF-8) and the corpus
//   comes back sorted by identifier so that runs are reproducible regardless of
//   the order the OS lists the directory.

pub mod image_helper {
    use crate::core_modules::image_cloud::image_cloud::Image;
    use crate::error::SourceError;
    use log::{debug, info, warn};
    use std::ffi::OsStr;
    use std::fs;
    use std::path::{Path, PathBuf};

    const SUPPORTED_EXTENSIONS: [&str; 8] =
        ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

    /// Supplies a named corpus of images.
    pub trait ImageSource {
        /// Loads every image in the corpus.
        ///
        /// # Errors
        ///
        /// Each source decides what counts as a failure to load.
        fn load(&self) -> Result<Vec<(String, Image)>, SourceError>;
    }

    /// A corpus already held in memory.
    #[derive(Debug, Clone, Default)]
    pub struct MemorySource {
        images: Vec<(String, Image)>,
    }

    impl MemorySource {
        pub fn new(images: Vec<(String, Image)>) -> Self {
            Self { images }
        }

        pub fn push(&mut self, identifier: impl Into<String>, image: Image) {
            self.images.push((identifier.into(), image));
        }
    }

    impl ImageSource for MemorySource {
        fn load(&self) -> Result<Vec<(String, Image)>, SourceError> {
            Ok(self.images.clone())
        }
    }

    /// Every image file directly inside one directory.
    #[derive(Debug, Clone)]
    pub struct DirectorySource {
        root: PathBuf,
        skip_undecodable: bool,
    }

    impl DirectorySource {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self {
                root: root.into(),
                skip_undecodable: true,
            }
        }

        /// Whether files that fail to decode are skipped with a warning (the
        /// default) or fail the whole load.
        pub fn skip_undecodable(mut self, skip: bool) -> Self {
            self.skip_undecodable = skip;
            self
        }

        fn is_supported(path: &Path) -> bool {
            path.extension()
                .and_then(|extension| extension.to_str())
                .map(|extension| {
                    let extension = extension.to_ascii_lowercase();
                    SUPPORTED_EXTENSIONS.contains(&extension.as_str())
                })
                .unwrap_or(false)
        }

        /// The file name itself when it is valid UTF-8. Otherwise the escaped
        /// form (`photo\xFF.png`), which keeps distinct names distinct where a
        /// lossy conversion would map them onto the same identifier.
        fn identifier(file_name: &OsStr) -> String {
            match file_name.to_str() {
                Some(name) => name.to_string(),
                None => {
                    let escaped = format!("{file_name:?}");
                    let escaped = escaped.trim_matches('"').to_string();
                    warn!("file name {escaped} is not valid UTF-8, using its escaped form");
                    escaped
                }
            }
        }

        fn io_error(path: &Path, source: std::io::Error) -> SourceError {
            SourceError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    }

    impl ImageSource for DirectorySource {
        fn load(&self) -> Result<Vec<(String, Image)>, SourceError> {
            let metadata = fs::metadata(&self.root).map_err(|e| Self::io_error(&self.root, e))?;
            if !metadata.is_dir() {
                return Err(SourceError::NotADirectory(self.root.display().to_string()));
            }

            let mut corpus = Vec::new();
            for entry in fs::read_dir(&self.root).map_err(|e| Self::io_error(&self.root, e))? {
                let entry = entry.map_err(|e| Self::io_error(&self.root, e))?;
                let path = entry.path();
                if !Self::is_supported(&path) {
                    debug!("skipping {}", path.display());
                    continue;
                }
                // Follows symlinks, so a linked image counts as a file.
                let metadata = match fs::metadata(&path) {
                    Ok(metadata) => metadata,
                    Err(source) if self.skip_undecodable => {
                        warn!("skipping {}: {source}", path.display());
                        continue;
                    }
                    Err(source) => return Err(Self::io_error(&path, source)),
                };
                if !metadata.is_file() {
                    warn!("skipping {}: not a regular file", path.display());
                    continue;
                }

                let decoded = match image::open(&path) {
                    Ok(decoded) => decoded,
                    Err(source) if self.skip_undecodable => {
                        warn!("skipping {}: {source}", path.display());
                        continue;
                    }
                    Err(source) => {
                        return Err(SourceError::Decode {
                            path: path.display().to_string(),
                            source,
                        });
                    }
                };

                let identifier = Self::identifier(&entry.file_name());
                corpus.push((identifier, Image::from(&decoded.to_rgb8())));
            }

            corpus.sort_by(|(a, _), (b, _)| a.cmp(b));
            info!("loaded {} images from {}", corpus.len(), self.root.display());
            Ok(corpus)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::image_cloud::image_cloud::Image;
    use crate::error::SourceError;
    use image::ImageEncoder;
    use std::path::{Path, PathBuf};

    fn save(path: &Path, width: u32, height: u32, buffer: &[u8]) {
        let output = std::fs::File::create(path).expect("Error Creating File.");
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder
            .write_image(buffer, width, height, image::ExtendedColorType::Rgb8)
            .expect("Error Saving File.");
    }

    /// A temp directory removed on drop, including when the test panics.
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("pixel_pi_{name}_{}", std::process::id()));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).expect("Error Creating Directory.");
            Self(dir)
        }

        fn path(&self) -> &Path {
            &self.0
        }

        fn join(&self, name: &str) -> PathBuf {
            self.0.join(name)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn memory_source_returns_its_pairs() {
        let mut source = MemorySource::default();
        source.push("black", Image::from_rgb_bytes(&[0, 0, 0]).unwrap());
        let corpus = source.load().unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].0, "black");
    }

    #[test]
    fn directory_source_loads_sorted_images() {
        let dir = ScratchDir::new("sorted");
        save(&dir.join("white.png"), 2, 1, &[255u8; 6]);
        save(&dir.join("black.png"), 1, 1, &[0u8; 3]);
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let corpus = DirectorySource::new(dir.path()).load().unwrap();
        let identifiers: Vec<&str> = corpus.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(identifiers, ["black.png", "white.png"]);
        assert_eq!(corpus[1].1.len(), 2);
    }

    #[test]
    fn undecodable_file_is_skipped_or_fails() {
        let dir = ScratchDir::new("undecodable");
        save(&dir.join("good.png"), 1, 1, &[10, 20, 30]);
        std::fs::write(dir.join("broken.png"), b"definitely not a png").unwrap();

        let corpus = DirectorySource::new(dir.path()).load().unwrap();
        assert_eq!(corpus.len(), 1);

        let strict = DirectorySource::new(dir.path()).skip_undecodable(false).load();
        assert!(matches!(strict, Err(SourceError::Decode { .. })));
    }

    #[test]
    fn file_root_is_not_a_directory() {
        let dir = ScratchDir::new("file_root");
        let file = dir.join("single.png");
        save(&file, 1, 1, &[0, 0, 0]);

        let result = DirectorySource::new(&file).load();
        assert!(matches!(result, Err(SourceError::NotADirectory(_))));
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let path = {
            let dir = ScratchDir::new("drop");
            save(&dir.join("left_behind.png"), 1, 1, &[0, 0, 0]);
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_loaded() {
        let images = ScratchDir::new("link_target");
        save(&images.join("real.png"), 1, 1, &[255, 255, 255]);

        let corpus_dir = ScratchDir::new("link_corpus");
        std::os::unix::fs::symlink(images.join("real.png"), corpus_dir.join("linked.png")).unwrap();
        std::os::unix::fs::symlink(images.join("missing.png"), corpus_dir.join("dangling.png"))
            .unwrap();

        let corpus = DirectorySource::new(corpus_dir.path()).load().unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].0, "linked.png");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_keep_distinct_identifiers() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = ScratchDir::new("non_utf8");
        save(&dir.path().join(OsStr::from_bytes(b"photo\xff.png")), 1, 1, &[0, 0, 0]);
        save(&dir.path().join(OsStr::from_bytes(b"photo\xfe.png")), 1, 1, &[0, 0, 0]);

        let corpus = DirectorySource::new(dir.path()).load().unwrap();
        assert_eq!(corpus.len(), 2);
        assert_ne!(corpus[0].0, corpus[1].0);
        assert!(corpus.iter().all(|(id, _)| id.starts_with("photo") && id.ends_with(".png")));
    }
}
