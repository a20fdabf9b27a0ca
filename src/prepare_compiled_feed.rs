use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use rkyv::rancor;

use crate::compile_feed::{compile_feed, CompiledFeed};
use crate::load_gtfs::load_gtfs_tables;
use crate::memory_mapped_rkyv::MemoryMappedRkyv;

pub const COMPILED_FILE_NAME: &str = "compiled_feed_rkyv.bin";

/// Loads and compiles the feed in `gtfs_folder_path` and writes the archive to
/// `output_path`, or next to the feed when no path is given.
pub async fn prepare_compiled_feed(
    gtfs_folder_path: &Path,
    output_path: Option<&Path>,
) -> Result<PathBuf> {
    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| gtfs_folder_path.join(COMPILED_FILE_NAME));
    let tables = load_gtfs_tables(gtfs_folder_path)?;
    let feed = compile_feed(&tables)?;
    write_compiled_feed(&feed, &output_path)?;
    Ok(output_path)
}

/// Writes next to the target first and renames, so a failed run never leaves
/// a partial archive behind.
pub fn write_compiled_feed(feed: &CompiledFeed, output_path: &Path) -> Result<()> {
    log::info!("Serializing data.");
    let buffer = rkyv::to_bytes::<rancor::Error>(feed)?;

    let mut temporary_path = output_path.as_os_str().to_owned();
    temporary_path.push(".tmp");
    let temporary_path = PathBuf::from(temporary_path);

    log::info!("Writing data to {:?}", output_path);
    if let Err(err) = write_and_rename(&buffer, &temporary_path, output_path) {
        let _ = std::fs::remove_file(&temporary_path);
        return Err(err.into());
    }
    Ok(())
}

fn write_and_rename(buffer: &[u8], temporary_path: &Path, output_path: &Path) -> std::io::Result<()> {
    let mut file = std::fs::File::create(temporary_path)?;
    file.write_all(buffer)?;
    file.sync_all()?;
    std::fs::rename(temporary_path, output_path)
}

pub async fn load_compiled_feed(path: &Path) -> Result<CompiledFeed> {
    log::info!("Loading compiled feed from {:?}", path);
    // Safety: the archive is only read while this function runs.
    let mapped = unsafe { MemoryMappedRkyv::<CompiledFeed>::open(path)? };
    let feed = rkyv::deserialize::<CompiledFeed, rancor::Error>(mapped.archived()?)?;
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_write_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file onto a non-empty directory fails.
        let output_path = dir.path().join(COMPILED_FILE_NAME);
        std::fs::create_dir(&output_path).unwrap();
        std::fs::write(output_path.join("occupied"), b"x").unwrap();

        assert!(write_compiled_feed(&CompiledFeed::default(), &output_path).is_err());
        assert!(!dir
            .path()
            .join(format!("{}.tmp", COMPILED_FILE_NAME))
            .exists());
    }
}
