//! Script to write the ABI of a built-in contract class into the artifacts directory

use std::{fs, path::Path};

use contracts_core::contracts::ClassRegistry;
use contracts_utils::client::ContractSource;
use eyre::{eyre, Result};
use tracing::info;

use crate::cli::DumpAbiArgs;

/// Writes the ABI to `<artifacts>/abis/<Contract>.json`
pub fn dump_abi(args: DumpAbiArgs, artifacts_path: &Path) -> Result<()> {
    let name = args.contract.name();
    let registry = ClassRegistry::mystis()?;
    let abi = registry.get_by_name(name)?.abi().to_json_pretty()?;

    let path = ContractSource::new(name, artifacts_path).abi_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| eyre!("Error creating {}: {}", dir.display(), e))?;
    }
    fs::write(&path, abi).map_err(|e| eyre!("Error writing {}: {}", path.display(), e))?;

    info!("Wrote {name} ABI to {}", path.display());
    Ok(())
}
