use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Writes finished documents into the output directory without ever
/// overwriting an existing file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    output_directory: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Stores `content` as `filename`, creating the output directory when
    /// needed. Taken names get a `_2`, `_3`, ... suffix before the extension.
    pub fn store(&self, content: &[u8], filename: &str) -> Result<PathBuf, StorageError> {
        self.ensure_directory()?;

        let (base, ext) = split_extension(filename);

        for counter in 1..=MAX_NAME_ATTEMPTS {
            let candidate = if counter == 1 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };
            let path = self.output_directory.join(&candidate);

            // create_new is the atomic check-and-create (O_CREAT | O_EXCL)
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(content).and_then(|_| file.sync_all()) {
                        drop(file);
                        let _ = std::fs::remove_file(&path);
                        return Err(StorageError::WriteFile { path, source: e });
                    }
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::WriteFile { path, source: e }),
            }
        }

        Err(StorageError::NamesExhausted(self.output_directory.join(filename)))
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        if !self.output_directory.is_dir() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| {
                StorageError::OutputDirectory {
                    path: self.output_directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], Some(&filename[pos..])),
        _ => (filename, None),
    }
}
