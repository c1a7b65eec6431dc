//! `alterego serve`: start the HTTP gateway.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;
    super::require_api_key(&config)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("AlterEgo Gateway");
    println!("   Persona:   {}", config.persona.name);
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);

    alterego_gateway::start(config).await?;

    Ok(())
}
