//! Compiles `.rtrl` trail sources into binary `.trl` assets.

use std::path::Path;

use waymark_common::fs::files_by_extension;

use crate::trl::lines_to_trl_bytes;

/// Text trail sources awaiting compilation.
pub const COMPILED_ASSETS_DIR: &str = "compiled_assets";
/// Where compiled trails land, mirroring the source layout.
pub const ASSETS_DIR: &str = "assets";

pub const RTRL_EXTENSION: &str = ".rtrl";
pub const TRL_EXTENSION: &str = ".trl";

/// Compile every `.rtrl` under `<pack_root>/compiled_assets` into a `.trl`
/// at the mirrored path under `<pack_root>/assets`.
///
/// Outputs newer than their source are left alone. A malformed source is
/// logged and skipped; the rest of the pack still compiles.
pub fn compile_resources(pack_root: &Path) -> std::io::Result<()> {
    let src_root = pack_root.join(COMPILED_ASSETS_DIR);
    let dst_root = pack_root.join(ASSETS_DIR);

    for src in files_by_extension(&src_root, &[RTRL_EXTENSION]) {
        let relative = src
            .strip_prefix(&src_root)
            .expect("walked file is under its root");
        let dst = dst_root.join(swap_extension(relative, RTRL_EXTENSION, TRL_EXTENSION));

        if up_to_date(&src, &dst) {
            log::debug!("{} is up to date", dst.display());
            continue;
        }

        let text = match std::fs::read_to_string(&src) {
            Ok(text) => text,
            Err(err) => {
                log::error!("error compiling resource {}: {err}", src.display());
                continue;
            }
        };
        let lines: Vec<&str> = text.lines().collect();
        let bytes = match lines_to_trl_bytes(&lines) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("error compiling resource {}: {err}", src.display());
                continue;
            }
        };

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Err(err) = std::fs::write(&dst, bytes) {
            log::error!("error saving compiled resource {}: {err}", dst.display());
        }
    }
    Ok(())
}

/// Replace a known suffix; used instead of `set_extension` so dotted stems
/// survive untouched.
pub fn swap_extension(path: &Path, from: &str, to: &str) -> std::path::PathBuf {
    let s = path.to_string_lossy();
    match s.strip_suffix(from) {
        Some(stem) => std::path::PathBuf::from(format!("{stem}{to}")),
        None => path.to_path_buf(),
    }
}

fn up_to_date(src: &Path, dst: &Path) -> bool {
    let (Ok(src_meta), Ok(dst_meta)) = (std::fs::metadata(src), std::fs::metadata(dst)) else {
        return false;
    };
    match (src_meta.modified(), dst_meta.modified()) {
        (Ok(s), Ok(d)) => d > s,
        _ => false,
    }
}
