use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use waymark::{autotrail, categories, maps, package};

const BUILD_DIR: &str = "build";

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Compiles a marker pack into an overlay archive", long_about = None)]
struct Cli {
    /// Marker pack source directory
    #[arg(short = 's', long = "source", default_value = "ShellshotMarkerPack")]
    source: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let pack_root = cli.source.as_path();
    let package_name = pack_root
        .file_name()
        .and_then(|n| n.to_str())
        .context("source directory has no name")?;

    let build_path = Path::new(BUILD_DIR);
    let build_folder = build_path.join(package_name);
    if build_path.exists() {
        std::fs::remove_dir_all(build_path).context("clearing build directory")?;
    }
    std::fs::create_dir_all(&build_folder).context("creating build directory")?;

    println!("Compiling categories...");
    let (categories, warnings) =
        categories::compile(&pack_root.join("categories"), pack_root)?;
    for warning in &warnings {
        log::warn!("{warning}");
    }

    println!("Compiling maps...");
    let (maps, warnings) = maps::compile(&categories, &pack_root.join("maps"), pack_root);
    for warning in &warnings {
        log::warn!("{warning}");
    }

    println!("Compiling trails...");
    waymark_io::compile_resources(pack_root).context("compiling trail resources")?;
    autotrail::compile_auto_trails(pack_root);

    println!("Assembling build tree...");
    package::copy_assets(&pack_root.join("assets"), &build_folder.join("assets"))?;
    categories::save(&categories, &build_folder)?;
    maps::save(&maps, &build_folder)?;

    let zip_path = build_path.join(format!("{package_name}.zip"));
    package::make_zip(&build_folder, &zip_path)?;
    println!(
        "Packaged {} maps, {} categories -> {}",
        maps.len(),
        categories.len(),
        zip_path.display()
    );
    Ok(())
}
