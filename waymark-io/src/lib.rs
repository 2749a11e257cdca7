//! Binary trail formats and resource compilation.

pub mod compile;
pub mod trl;

pub use compile::{
    compile_resources, swap_extension, ASSETS_DIR, COMPILED_ASSETS_DIR, RTRL_EXTENSION,
    TRL_EXTENSION,
};
pub use trl::{lines_to_trl_bytes, points_to_trl_bytes, trl_bytes_to_lines, TrlError};
