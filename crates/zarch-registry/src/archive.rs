//! Archive construction and extraction (tar + gzip).
//!
//! Archives root every entry under a synthetic top-level directory named
//! after the package, so extraction into a project directory yields
//! `<project>/<package>/...`. `.git` and `node_modules` subtrees are
//! pruned during construction.
//!
//! Extraction rejects entries that resolve outside the destination root.
//! There is no rollback: entries already extracted stay on disk when a
//! later entry fails.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, EntryType};

use crate::error::{RegistryError, Result};

/// Directory names whose entire subtree is skipped during construction.
const PRUNED_DIRS: &[&str] = &[".git", "node_modules"];

/// Build a compressed tar archive of `source_root` at `out_path`.
///
/// Every entry's path is `top_level_name/<path relative to source_root>`,
/// with the original file mode bits preserved. File contents are streamed,
/// not buffered whole. `out_path` may live inside `source_root`; the
/// archive never packages itself. A partially written archive is not
/// cleaned up on failure; that is the caller's responsibility.
pub fn create_archive(source_root: &Path, top_level_name: &str, out_path: &Path) -> Result<()> {
    let file = std::fs::File::create(out_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    append_dir_entries(
        &mut builder,
        source_root,
        source_root,
        Path::new(top_level_name),
        out_path,
    )?;

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}

fn append_dir_entries<W: Write>(
    builder: &mut Builder<W>,
    source_root: &Path,
    dir: &Path,
    top_level: &Path,
    out_path: &Path,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path == out_path {
            continue;
        }
        // file_type() does not follow symlinks; links and other node
        // types are not packaged.
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        }
        let rel = path
            .strip_prefix(source_root)
            .expect("walked path is under source root");
        let archive_path = top_level.join(rel);

        if file_type.is_dir() {
            let name = entry.file_name();
            if PRUNED_DIRS.iter().any(|p| name == *p) {
                continue;
            }
            builder.append_dir(&archive_path, &path)?;
            append_dir_entries(builder, source_root, &path, top_level, out_path)?;
        } else if file_type.is_file() {
            builder.append_path_with_name(&path, &archive_path)?;
        }
    }
    Ok(())
}

/// Extract a gzip-compressed tar archive into `destination_root`.
///
/// Directory entries are created with all missing ancestors; regular-file
/// entries get their ancestors created, then the file is written with the
/// entry's recorded mode. Unsupported entry types (symlinks, devices) are
/// silently skipped. Entries whose name escapes the destination via `..`
/// segments or an absolute path fail with
/// [`RegistryError::UnsafeArchivePath`].
pub fn extract_archive(archive_path: &Path, destination_root: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        let target = resolve_entry_path(destination_root, &entry_path)?;

        match entry.header().entry_type() {
            EntryType::Directory => {
                std::fs::create_dir_all(&target)?;
            }
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mode = entry.header().mode()?;
                let mut file = std::fs::File::create(&target)?;
                std::io::copy(&mut entry, &mut file)?;
                set_mode(&target, mode)?;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Join an entry name onto the destination, rejecting any name that would
/// resolve outside it.
fn resolve_entry_path(destination_root: &Path, entry_path: &Path) -> Result<PathBuf> {
    let mut target = destination_root.to_path_buf();
    for component in entry_path.components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::CurDir => {}
            _ => {
                return Err(RegistryError::UnsafeArchivePath {
                    entry: entry_path.display().to_string(),
                })
            }
        }
    }
    Ok(target)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
