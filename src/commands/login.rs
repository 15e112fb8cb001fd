use crate::cli::LoginArgs;
use crate::config::Credentials;
use crate::error::JdError::Validation;
use crate::session::{Connector, Session, close};
use anyhow::{Context, Result};
use console::Term;
use log::info;
use std::io::{self, BufRead, Write};

pub async fn run<C, W>(args: LoginArgs, session: &Session<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    W: Write,
{
    let mail = prompt_email(&mut io::stdin().lock(), out)?;

    write!(out, "Enter password: ")?;
    out.flush()?;
    let password = Term::stdout()
        .read_secure_line()
        .context("Failed to read password")?;
    writeln!(out)?;

    let credentials = Credentials {
        mail,
        password: password.trim().to_string(),
        device: args.device.filter(|device| !device.is_empty()),
    };
    login(credentials, session, out).await
}

fn prompt_email<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    write!(out, "Enter username/email: ")?;
    out.flush()?;
    let mut mail = String::new();
    input
        .read_line(&mut mail)
        .context("Failed to read username")?;
    Ok(mail.trim().to_string())
}

/// Validates the credentials with a connect/disconnect round-trip, then stores them
///
/// # Errors
///
/// Returns an error if:
/// - Email or password is empty
/// - The account cannot be connected
/// - The config file cannot be written
pub async fn login<C, W>(credentials: Credentials, session: &Session<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    W: Write,
{
    if credentials.mail.is_empty() || credentials.password.is_empty() {
        return Err(Validation("email and password are required".into()).into());
    }

    let mut client = session.connect(&credentials).await?;
    close(&mut client).await;
    info!("Credentials for {} verified", credentials.mail);

    session.store().save(&credentials)?;
    writeln!(
        out,
        "Credentials saved to {}",
        session.store().path().display()
    )?;
    Ok(())
}
