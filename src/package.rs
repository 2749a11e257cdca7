//! Build-tree assembly: asset copying and the final zip archive.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Recursively copy the pack's `assets/` into the build tree. A missing
/// source directory is fine; the pack simply has no assets.
pub fn copy_assets(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        log::info!("no assets at {}", src.display());
        return Ok(());
    }
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating {}", dst.display()))?;
    for entry in std::fs::read_dir(src)
        .with_context(|| format!("reading {}", src.display()))?
        .flatten()
    {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if from.is_dir() {
            copy_assets(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)
                .with_context(|| format!("copying {}", from.display()))?;
        }
    }
    Ok(())
}

/// Zip the build folder. Entry names are relative to `dir` with forward
/// slashes, so the archive unpacks identically everywhere.
pub fn make_zip(dir: &Path, zip_path: &Path) -> Result<()> {
    let file = std::fs::File::create(zip_path)
        .with_context(|| format!("creating {}", zip_path.display()))?;
    let mut writer = ZipWriter::new(file);
    add_files(&mut writer, dir, dir)?;
    writer.finish().context("finalizing archive")?;
    Ok(())
}

fn add_files(writer: &mut ZipWriter<std::fs::File>, root: &Path, dir: &Path) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .flatten()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            add_files(writer, root, &path)?;
            continue;
        }
        let name = path
            .strip_prefix(root)
            .expect("walked file is under the archive root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let bytes = std::fs::read(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        writer
            .start_file(name, SimpleFileOptions::default())
            .context("starting archive entry")?;
        writer.write_all(&bytes).context("writing archive entry")?;
    }
    Ok(())
}
