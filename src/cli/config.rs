use std::path::Path;

use crate::error::{Result, TimesheetError};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn run(config: Option<&Path>, path_only: bool, init: bool, force: bool) -> Result<()> {
    let path = config.map(Path::to_path_buf).unwrap_or_else(settings_path);

    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    if init {
        if path.exists() && !force {
            return Err(TimesheetError::Settings(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        save_settings(&Settings::default(), &path)?;
        println!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let settings = load_settings(Some(&path))?;
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("defaults ({} not found)", path.display())
    };
    println!("Settings: {source}");
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        run(Some(&path), false, true, false).unwrap();
        assert!(path.exists());
        assert!(run(Some(&path), false, true, false).is_err());
        run(Some(&path), false, true, true).unwrap();
    }
}
