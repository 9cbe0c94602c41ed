//! Generate command implementation

use std::path::Path;

use colored::Colorize;
use pxe_core::{Manifest, ScriptKind, generate_scripts};

use crate::error::Result;

/// Run the generate command
pub fn run_generate(manifest: &Manifest, boot_ip: &str, gen_dir: &Path, scripts: &str) -> Result<()> {
    let kinds = ScriptKind::parse_list(scripts)?;
    std::fs::create_dir_all(gen_dir)?;

    let generated = generate_scripts(manifest, boot_ip, gen_dir, &kinds)?;
    for path in &generated {
        println!("{} {}", "+".green(), path.display());
    }
    println!("{} files generated in {}", generated.len(), gen_dir.display().to_string().bold());
    Ok(())
}
