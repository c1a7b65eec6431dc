//! `alterego init`: first-time setup.

use alterego_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("AlterEgo Setup");
    println!("==============\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete it and re-run init.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set `api_key` (or export ALTEREGO_API_KEY)");
    println!("  2. Fill in [persona] and [profile]: name, summary_path, resume_path, github_username");
    println!("  3. Optional: set PUSHOVER_TOKEN and PUSHOVER_USER for notifications");
    println!("  4. Run: alterego chat\n");

    Ok(())
}
