use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::ZipArchive;

use crate::error::EtlError;

pub const INSTANCE_ARCHIVE: &str = "brewery_instance.zip";
pub const REFERENCE_DIR: &str = "reference";

pub fn extract_instance(dataset_dir: &Path) -> Result<PathBuf, EtlError> {
    let archive_path = dataset_dir.join(INSTANCE_ARCHIVE);
    let count = extract_zip(&archive_path, dataset_dir)?;
    info!(archive = %archive_path.display(), entries = count, "extracted instance archive");
    Ok(dataset_dir.join(REFERENCE_DIR))
}

pub fn extract_zip(zip_path: &Path, target_dir: &Path) -> Result<usize, EtlError> {
    if !zip_path.is_file() {
        return Err(EtlError::MissingArchive(zip_path.to_path_buf()));
    }
    let archive_err = |message: String| EtlError::Archive {
        path: zip_path.to_path_buf(),
        message,
    };

    let file = fs::File::open(zip_path)
        .map_err(|err| EtlError::Filesystem(format!("open zip {}: {err}", zip_path.display())))?;
    let mut archive = ZipArchive::new(file).map_err(|err| archive_err(err.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| archive_err(err.to_string()))?;
        let entry_path = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => {
                return Err(archive_err(format!(
                    "entry {} escapes the target directory",
                    entry.name()
                )));
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&entry_path).map_err(|err| EtlError::Filesystem(err.to_string()))?;
            continue;
        }

        if let Some(parent) = entry_path.parent() {
            fs::create_dir_all(parent).map_err(|err| EtlError::Filesystem(err.to_string()))?;
        }
        let mut outfile =
            fs::File::create(&entry_path).map_err(|err| EtlError::Filesystem(err.to_string()))?;
        io::copy(&mut entry, &mut outfile).map_err(|err| archive_err(err.to_string()))?;
    }
    Ok(archive.len())
}
