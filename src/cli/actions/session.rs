use super::{
    context::{Runtime, describe, failure, report},
    profile::fill_address,
};
use crate::{
    auth::{Session, types::SignUpRequest},
    cli::{commands::profile, globals::GlobalArgs},
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

#[derive(Debug)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub login: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct SignUpArgs {
    pub globals: GlobalArgs,
    pub login: String,
    pub password: SecretString,
    pub profile: profile::Options,
}

#[derive(Debug)]
pub struct OAuthArgs {
    pub globals: GlobalArgs,
    pub token: SecretString,
}

/// Restores the stored session and prints it.
/// # Errors
/// Returns an error if the runtime cannot be built.
pub async fn status(globals: GlobalArgs) -> Result<()> {
    let runtime = Runtime::new(&globals)?;
    let step = runtime.session.bootstrap().await;
    report(&step);

    if let Some(identity) = step.session.identity() {
        let roles: Vec<&str> = identity.claims.roles.iter().collect();
        println!("roles: {}", roles.join(", "));
        println!("origin: {:?}", identity.origin);
    }
    Ok(())
}

/// # Errors
/// Returns the sign-in notice when the backend rejects the credentials or the
/// session cannot be established.
pub async fn login(args: LoginArgs) -> Result<()> {
    let runtime = Runtime::new(&args.globals)?;
    let step = runtime
        .session
        .sign_in(&args.login, args.password.expose_secret())
        .await
        .map_err(|err| failure(&err))?;
    report(&step);
    Ok(())
}

/// # Errors
/// Returns an error for an unknown CEP or when account creation fails.
pub async fn signup(args: SignUpArgs) -> Result<()> {
    let runtime = Runtime::new(&args.globals)?;
    let mut input = args.profile.to_input();
    fill_address(&runtime, &mut input).await?;

    let request = SignUpRequest {
        login: args.login,
        password: args.password.expose_secret().to_string(),
        profile: input,
    };
    let step = runtime
        .session
        .sign_up(&request)
        .await
        .map_err(|err| failure(&err))?;
    report(&step);
    Ok(())
}

/// # Errors
/// Returns the OAuth notice when the provider or the exchange fails.
pub async fn oauth(args: OAuthArgs) -> Result<()> {
    let runtime = Runtime::new(&args.globals)?;
    let step = runtime
        .session
        .sign_in_with_provider(&args.token)
        .await
        .map_err(|err| failure(&err))?;
    report(&step);
    if matches!(step.session, Session::AuthenticatedPending { .. }) {
        println!("run `vozcidada complete-profile` to finish creating your account");
    }
    Ok(())
}

/// # Errors
/// Returns an error if the runtime cannot be built.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    let runtime = Runtime::new(globals)?;
    let step = runtime.session.sign_out();
    info!(store = %globals.store_path.display(), "credentials removed");
    println!("{}", describe(&step.session));
    Ok(())
}
