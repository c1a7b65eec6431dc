//! `alterego tools`: list the tool catalogue.

use alterego_core::Notifier;
use std::sync::Arc;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let notifier: Arc<dyn Notifier> = alterego_notify::build_from_config(&config.notify);
    let registry = alterego_tools::default_registry(notifier.clone());

    println!("Notifier: {}\n", notifier.name());
    for def in registry.definitions() {
        println!("{}", def.name);
        println!("  {}", def.description);
        println!(
            "  parameters: {}\n",
            serde_json::to_string(&def.parameters)?
        );
    }

    Ok(())
}
