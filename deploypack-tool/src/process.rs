use anyhow::Result;
use deploypack_lib::{Config, PackPolicy};
use std::path::Path;
use tracing::info;

use crate::{
    fs_utils::{encode_size, list_source_files, total_size},
    packaging::{FileEntry, create_zip_sync, prepare_entries},
};

/// Packages the configured source directory, or only reports the plan on a dry run.
pub fn run(config: &Config) -> Result<()> {
    let policy = PackPolicy::default();
    let source = Path::new(config.source_dir());
    let output = Path::new(config.output_path());

    let files = list_source_files(source, &policy)?;
    let entries = prepare_entries(source, files, &policy)?;

    if config.dry == Some(true) {
        return print_plan(config, &entries);
    }

    let written = create_zip_sync(&entries, output)?;
    info!("wrote {} entries from {}", written, source.display());
    println!("Created {}", output.display());

    Ok(())
}

fn print_plan(config: &Config, entries: &[FileEntry]) -> Result<()> {
    println!("--- DRY RUN ---");
    println!("{}", serde_yaml::to_string(config)?);
    for fe in entries {
        println!(
            "  {} -> {} [{}]",
            fe.path.display(),
            fe.name_in_archive,
            fe.kind.label()
        );
    }

    let paths: Vec<_> = entries.iter().map(|fe| fe.path.clone()).collect();
    println!("Total files: {}", entries.len());
    println!("Total size: {}", encode_size(total_size(&paths)?));
    println!("Output: {}", config.output_path());
    Ok(())
}
