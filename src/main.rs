use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spacelock::{Error, Result, SecretKey, SignedToken, Token};

mod cli;

use cli::{format_timestamp, resolve_selector, resolve_window, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Keygen { out } => keygen_command(&out),

        Commands::Sign {
            key,
            user,
            from,
            until,
            hours,
        } => sign_command(&key, &user, from.as_deref(), until.as_deref(), hours),

        Commands::Decode { token, key } => decode_command(&token, key.as_deref()),

        Commands::Send {
            token,
            device_name,
            accept_all: _,
            selector,
            service,
            characteristic,
            binary,
            config,
        } => {
            let selector = resolve_selector(selector.as_deref(), device_name.as_deref())?;
            send_command(
                &token,
                selector,
                service,
                characteristic,
                binary,
                config.as_deref(),
            )
            .await
        }
    }
}

fn keygen_command(out: &Path) -> Result<()> {
    if out.exists() {
        return Err(Error::Key(format!(
            "refusing to overwrite existing key file {}",
            out.display()
        )));
    }
    let key = SecretKey::generate();
    key.store(out)?;
    println!("wrote new lock secret to {}", out.display());
    Ok(())
}

fn sign_command(
    key_path: &Path,
    user: &str,
    from: Option<&str>,
    until: Option<&str>,
    hours: u64,
) -> Result<()> {
    let key = SecretKey::load(key_path)?;
    let (valid_from, valid_until) = resolve_window(from, until, hours)?;
    let token = Token::new(valid_from, valid_until, user)?;
    let signed = token.sign(&key);

    info!(
        "signed token for {} ({} - {})",
        user,
        format_timestamp(valid_from),
        format_timestamp(valid_until)
    );
    println!("{}", signed.to_base64());
    Ok(())
}

fn decode_command(armored: &str, key_path: Option<&Path>) -> Result<()> {
    let signed = SignedToken::from_base64(armored)?;
    let token = signed.token();

    println!("MAC:         {}", hex::encode(signed.mac()));
    println!(
        "valid from:  {} [{}]",
        format_timestamp(token.valid_from),
        token.valid_from
    );
    println!(
        "valid until: {} [{}]",
        format_timestamp(token.valid_until),
        token.valid_until
    );
    println!("user id:     {}", token.user_id);

    if let Some(path) = key_path {
        let key = SecretKey::load(path)?;
        signed.verify(&key)?;
        println!("MAC verified OK");
    }
    Ok(())
}

#[cfg(feature = "bluetooth")]
async fn send_command(
    token_text: &str,
    selector: spacelock::DeviceSelector,
    service: spacelock::ServiceId,
    characteristic: spacelock::CharacteristicId,
    binary: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    use spacelock::{
        deliver_with, BtleplugTransport, DeliveryConfig, DeliveryRequest, TokenPayload,
    };

    let config = match config_path {
        Some(path) => DeliveryConfig::load(path)?,
        None => DeliveryConfig::default(),
    };

    // The firmware base64-decodes what it receives, so the armored text is
    // written as-is unless --binary asks for the raw record
    let payload = if binary {
        TokenPayload::Base64(token_text.to_string())
    } else {
        TokenPayload::Ascii(token_text.to_string())
    };

    let mut transport = BtleplugTransport::new(config.clone()).await?;
    let request = DeliveryRequest::new(selector, service, characteristic, payload);
    let receipt = deliver_with(&mut transport, request, &config).await?;

    println!(
        "delivered {} bytes to {} ({})",
        receipt.bytes_written,
        receipt.device.id(),
        receipt.device.name().unwrap_or("unnamed")
    );
    Ok(())
}

#[cfg(not(feature = "bluetooth"))]
async fn send_command(
    _token_text: &str,
    _selector: spacelock::DeviceSelector,
    _service: spacelock::ServiceId,
    _characteristic: spacelock::CharacteristicId,
    _binary: bool,
    _config_path: Option<&Path>,
) -> Result<()> {
    Err(Error::Config(
        "this build has no Bluetooth support; rebuild with --features bluetooth".to_string(),
    ))
}
