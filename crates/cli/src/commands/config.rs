//! `init` and `validate`: server configuration files.

use std::path::Path;

use anyhow::{Context, Result};

use formmailer_core::config::AppConfig;

use crate::style;

const CONFIG_HEADER: &str = "# formmailer configuration
#
# Every value can be overridden by an environment variable (PORT,
# SMTP_HOST, SMTP_PORT, EMAIL_USER, ...). The SMTP password is never
# stored here: set the variable named by smtp.password_env.

";

/// Render the default configuration as commented TOML.
pub fn default_config_toml() -> Result<String> {
    let body = toml::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    Ok(format!("{CONFIG_HEADER}{body}"))
}

/// Write a default configuration file.
pub fn run_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, default_config_toml()?).context("failed to write config file")?;

    println!(
        "{}",
        style::success(&format!("Default configuration written to {}", output.display()))
    );
    println!();
    println!("Next steps:");
    println!("  1. Edit the [smtp] section with your mail server details");
    println!("  2. Export the password variable (EMAIL_PASSWORD by default)");
    println!("  3. Validate with: formmailer validate --config {}", output.display());
    println!("  4. Start the server: formmailer-daemon --config {}", output.display());

    Ok(())
}

/// Load a configuration file with environment overrides and report on it.
pub fn run_validate(path: &Path) -> Result<()> {
    println!("Validating configuration: {}", path.display());
    println!();

    let mut config = AppConfig::load_from_file(path).context("failed to parse configuration")?;
    println!("  {}", style::success("TOML structure is valid"));

    config
        .apply_env_overrides()
        .context("invalid environment override")?;
    println!("  {}", style::success("Environment overrides applied"));

    if let Err(e) = config.validate() {
        println!("  {}", style::error(&format!("Validation error: {}", e)));
        anyhow::bail!("configuration validation failed");
    }
    println!("  {}", style::success("All fields are valid"));

    println!();
    println!("Configuration summary:");
    println!("  Listen        : {}", config.server.listen_addr());
    println!("  Static dir    : {}", config.server.static_dir.display());
    println!("  SMTP server   : {}:{} ({})", config.smtp.host, config.smtp.port, config.smtp.effective_tls());
    println!("  SMTP user     : {}", config.smtp.username);
    println!(
        "  SMTP password : {} (${})",
        style::secret_state(config.smtp.password.is_some()),
        config.smtp.password_env
    );
    println!("  From name     : {}", config.mail.from_name);
    println!("  Reference     : {}-YYYYMMDD-XXXXXX", config.mail.reference_prefix);

    if config.smtp.password.is_none() {
        println!();
        println!(
            "  {}",
            style::warn("the server will start but refuse submissions until the password is set")
        );
    }

    Ok(())
}
