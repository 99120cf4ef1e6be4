use anyhow::Result;
use opscope_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("Already initialized: {}", config_path.display());
        return Ok(());
    }

    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();

    io::ensure_dir(&paths::opscope_dir(root))?;
    Config::new(&name).save(root)?;

    println!("Initialized opscope project '{name}'");
    println!("  config: {}", config_path.display());
    Ok(())
}
