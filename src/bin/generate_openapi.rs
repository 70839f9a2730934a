//! Writes the performance API document to `dist/swagger/performance.yaml`.
//!
//! An optional first argument overrides the output directory.

use std::error::Error;
use std::path::PathBuf;
use std::{env, fs};

use embed_messaging::openapi::performance::performance_document;

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dist/swagger"));
    fs::create_dir_all(&out_dir)?;

    let out_path = out_dir.join("performance.yaml");
    fs::write(&out_path, performance_document().to_yaml()?)?;
    eprintln!("wrote {}", out_path.display());
    Ok(())
}
