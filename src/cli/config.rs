use crate::error::{CheckoutError, Result};
use crate::settings::{load_settings, save_settings, settings_file_exists, settings_path, Settings};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| CheckoutError::Settings(e.to_string()))?;
    println!("{json}");
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", settings_path().display());
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    if settings_file_exists() && !force {
        return Err(CheckoutError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            settings_path().display()
        )));
    }
    save_settings(&Settings::default())?;
    println!("Wrote default settings to {}", settings_path().display());
    Ok(())
}
