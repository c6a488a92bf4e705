use super::context::{Runtime, failure, report};
use crate::{
    auth::types::CitizenProfileInput,
    cli::{commands::profile, globals::GlobalArgs},
    client::AppError,
};
use anyhow::{Result, anyhow, bail};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub profile: profile::Options,
}

/// Fills blank address fields from the postal-code service. An unknown or
/// malformed CEP is an error; an unreachable service only leaves the fields
/// as given.
///
/// # Errors
/// Returns an error when the CEP is malformed or unknown.
pub async fn fill_address(runtime: &Runtime, input: &mut CitizenProfileInput) -> Result<()> {
    let complete = [&input.rua, &input.bairro, &input.cidade, &input.uf]
        .iter()
        .all(|field| !field.trim().is_empty());
    if complete || input.cep.trim().is_empty() {
        return Ok(());
    }

    match runtime.postal().lookup(&input.cep).await {
        Ok(Some(address)) => {
            debug!(cep = %input.cep, "address filled from postal lookup");
            let fills = [
                (&mut input.rua, address.logradouro),
                (&mut input.bairro, address.bairro),
                (&mut input.cidade, address.localidade),
                (&mut input.uf, address.uf),
            ];
            for (field, value) in fills {
                if field.trim().is_empty() {
                    *field = value;
                }
            }
            Ok(())
        }
        Ok(None) => bail!("CEP {} not found", input.cep),
        Err(AppError::Config(message)) => Err(anyhow!(message)),
        Err(err) => {
            warn!(error = %err, "postal lookup failed, keeping address as given");
            Ok(())
        }
    }
}

/// # Errors
/// Returns an error when no completion is pending or provisioning fails.
pub async fn complete(args: Args) -> Result<()> {
    let runtime = Runtime::new(&args.globals)?;
    runtime.session.bootstrap().await;

    let mut input = args.profile.to_input();
    fill_address(&runtime, &mut input).await?;

    let step = runtime
        .session
        .complete_profile(&input)
        .await
        .map_err(|err| failure(&err))?;
    report(&step);
    Ok(())
}

/// # Errors
/// Returns an error unless signed in as a citizen, or when the update fails.
pub async fn update(args: Args) -> Result<()> {
    if args.profile.is_empty() {
        bail!("nothing to update: pass at least one profile field");
    }

    let runtime = Runtime::new(&args.globals)?;
    let step = runtime.session.bootstrap().await;
    let current = step
        .session
        .citizen()
        .ok_or_else(|| anyhow!("sign in as a citizen to update the profile"))?;

    let updated = args.profile.apply_to(current);
    let step = runtime
        .session
        .update_profile(&updated)
        .await
        .map_err(|err| failure(&err))?;
    report(&step);
    Ok(())
}
