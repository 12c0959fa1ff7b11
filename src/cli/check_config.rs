use crate::config::RuntimeConfig;
use crate::error::Result;

/// Run the check-config subcommand
pub fn check_config(path: &std::path::Path) -> Result<()> {
    let config = RuntimeConfig::load_from_file(path)?;
    println!(
        "{}: track_allocated_objects={}, leak_policy={:?}",
        path.display(),
        config.track_allocated_objects,
        config.leak_policy
    );
    Ok(())
}
