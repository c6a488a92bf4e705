//! Session driver. `AuthContext` owns the authoritative [`Session`], runs the
//! async steps (sign-in, resolution, provisioning) around the pure transitions in
//! [`super::machine`], and publishes every committed state on a watch channel.
//!
//! An operation claims a generation ticket once it has something to write:
//! bootstrap when it starts, sign-in once the backend has issued credentials.
//! Claiming supersedes whatever claimed before, so a backend call that fails
//! leaves an in-flight bootstrap free to settle. Commits and credential writes
//! happen under one lock and only while the ticket is still current, so a
//! result that arrives after sign-out (or after a newer sign-in) is dropped
//! with [`AuthError::Superseded`] instead of reviving a stale session. A
//! sign-out also cancels operations that have not claimed a ticket yet.

use super::{
    claims::{self, Claims},
    client::AuthApi,
    error::{AuthError, DecodeError},
    guards::{self, GuardDecision},
    machine::{self, Effect, Event, Identity, ResolveFailure, Session, SessionOrigin, Step},
    oauth::{IdentityProvider, OAuthBridge},
    resolver::{IdentityResolver, ResolveTarget},
    store::{CredentialPair, CredentialStore, unix_now},
    types::{CitizenProfile, CitizenProfileInput, LoginRequest, RegisterRequest, SignUpRequest},
};
use crate::{
    client::{AppConfig, AppError},
    routes::{Navigator, Route},
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Role requested for self-service accounts.
const SIGN_UP_ROLE: &str = "USER";

#[derive(Clone, Copy, Debug)]
struct CredentialTtls {
    access: Duration,
    refresh: Duration,
    oauth_marker: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Ticket(u64);

/// Sign-out count seen when an operation started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry(u64);

#[derive(Debug, Default)]
struct Generations {
    current: u64,
    sign_outs: u64,
}

struct Inner<A, R, P> {
    api: Arc<A>,
    resolver: R,
    bridge: OAuthBridge<P, A>,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    ttls: CredentialTtls,
    generations: Mutex<Generations>,
    session: watch::Sender<Session>,
}

/// Shared handle to the session. Cloning is cheap and every clone drives the
/// same state.
pub struct AuthContext<A, R, P> {
    inner: Arc<Inner<A, R, P>>,
}

impl<A, R, P> Clone for AuthContext<A, R, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AuthApi, R: IdentityResolver, P: IdentityProvider> AuthContext<A, R, P> {
    /// Creates a context in `Loading` with the store not yet read. Call
    /// [`Self::bootstrap`] once before rendering anything guarded.
    pub fn new(
        api: Arc<A>,
        resolver: R,
        provider: P,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        config: &AppConfig,
    ) -> Self {
        let (session, _) = watch::channel(Session::default());
        let bridge = OAuthBridge::new(provider, Arc::clone(&api));
        Self {
            inner: Arc::new(Inner {
                api,
                resolver,
                bridge,
                store,
                navigator,
                ttls: CredentialTtls {
                    access: config.access_ttl(),
                    refresh: config.refresh_ttl(),
                    oauth_marker: config.oauth_marker_ttl(),
                },
                generations: Mutex::new(Generations::default()),
                session,
            }),
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    /// Receiver that observes every committed session.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    /// Evaluates the guard for `route` against the current session.
    #[must_use]
    pub fn guard(&self, route: Route) -> GuardDecision {
        guards::evaluate(&self.session(), route)
    }

    /// Restores the session from stored credentials. Never fails: problems
    /// end in `Anonymous`, and only a stored-but-unusable token redirects.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Step {
        let ticket = self.begin();
        let Some(pair) = self.inner.store.get() else {
            return self
                .commit(ticket, Event::NoCredentials)
                .unwrap_or_else(|_| Step::unchanged(&self.session()));
        };

        let origin = if self.inner.store.is_oauth() {
            SessionOrigin::OAuth
        } else {
            SessionOrigin::Native
        };

        match self.settle(ticket, &pair.access_token, origin, None).await {
            Ok(step) => step,
            Err(err) => {
                debug!(error = %err, "stored credentials did not restore a session");
                Step::unchanged(&self.session())
            }
        }
    }

    /// Native sign-in.
    ///
    /// # Errors
    /// `SignIn` when the backend rejects the credentials (the session is left
    /// untouched), `Decode` or `Unavailable` when the issued token cannot be
    /// turned into a session (the session ends `Anonymous`).
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<Step, AuthError> {
        let request = LoginRequest {
            login: login.trim().to_string(),
            password: password.to_string(),
        };
        if request.login.is_empty() || request.password.is_empty() {
            return Err(AuthError::SignIn(AppError::Config(
                "login and password are required".to_string(),
            )));
        }

        let entry = self.enter();
        let pair = self
            .inner
            .api
            .login(&request)
            .await
            .map_err(AuthError::SignIn)?;
        let ticket = self.persist(entry, &pair, SessionOrigin::Native)?;
        self.settle(ticket, &pair.access_token, SessionOrigin::Native, None)
            .await
    }

    /// Registers a citizen account, signs in and creates the profile.
    ///
    /// A failed profile creation is not fatal: the account exists, so the
    /// session lands in `AuthenticatedPending` and the user finishes through
    /// profile completion.
    ///
    /// # Errors
    /// `SignUp` when validation, registration or the follow-up login fails.
    #[instrument(skip_all, fields(login = %request.login))]
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Step, AuthError> {
        let login = request.login.trim();
        if login.is_empty() || request.password.is_empty() {
            return Err(AuthError::SignUp(AppError::Config(
                "login and password are required".to_string(),
            )));
        }
        let missing = request.profile.missing_fields();
        if !missing.is_empty() {
            return Err(AuthError::SignUp(AppError::Config(format!(
                "missing profile fields: {}",
                missing.join(", ")
            ))));
        }

        let entry = self.enter();
        self.inner
            .api
            .register(&RegisterRequest {
                login: login.to_string(),
                password: request.password.clone(),
                role: SIGN_UP_ROLE.to_string(),
            })
            .await
            .map_err(AuthError::SignUp)?;

        let pair = self
            .inner
            .api
            .login(&LoginRequest {
                login: login.to_string(),
                password: request.password.clone(),
            })
            .await
            .map_err(AuthError::SignUp)?;
        let ticket = self.persist(entry, &pair, SessionOrigin::Native)?;

        let created = match self.inner.api.create_citizen(&request.profile).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(error = %err, "citizen profile creation failed after sign-up");
                None
            }
        };

        self.settle(ticket, &pair.access_token, SessionOrigin::Native, created)
            .await
    }

    /// Signs in with a Google access token.
    ///
    /// # Errors
    /// `OAuth` when the provider or the backend exchange fails; the session is
    /// left untouched.
    #[instrument(skip_all)]
    pub async fn sign_in_with_provider(
        &self,
        provider_token: &SecretString,
    ) -> Result<Step, AuthError> {
        let entry = self.enter();
        let pair = self.inner.bridge.exchange_identity(provider_token).await?;
        let ticket = self.persist(entry, &pair, SessionOrigin::OAuth)?;
        self.settle(ticket, &pair.access_token, SessionOrigin::OAuth, None)
            .await
    }

    /// Completes a pending account: creates the profile, upgrades the account
    /// status, stores the re-issued credentials and resolves the new session.
    ///
    /// # Errors
    /// `InvalidState` outside `AuthenticatedPending` or for staff accounts,
    /// which are provisioned by the backend; `Provisioning` when a backend call
    /// fails or the upgraded credentials are still pending.
    #[instrument(skip_all)]
    pub async fn complete_profile(&self, input: &CitizenProfileInput) -> Result<Step, AuthError> {
        let Session::AuthenticatedPending { identity } = self.session() else {
            return Err(AuthError::InvalidState("no profile completion is pending"));
        };
        if identity.claims.roles.is_admin() {
            return Err(AuthError::InvalidState(
                "staff accounts cannot complete a citizen profile",
            ));
        }

        let entry = self.enter();
        let provisioned = self
            .inner
            .bridge
            .complete_oauth_provisioning(input)
            .await
            .map_err(|err| AuthError::Provisioning(err.to_string()))?;
        let ticket = self.persist(entry, &provisioned.credentials, identity.origin)?;

        let step = self
            .settle(
                ticket,
                &provisioned.credentials.access_token,
                identity.origin,
                Some(provisioned.profile),
            )
            .await?;
        if step.session.citizen().is_none() {
            return Err(AuthError::Provisioning(
                "account is still awaiting activation".to_string(),
            ));
        }
        Ok(step)
    }

    /// Saves an edited citizen profile and replaces the in-memory one with the
    /// backend's response.
    ///
    /// # Errors
    /// `InvalidState` unless signed in as a citizen; `Provisioning` when the
    /// backend rejects the update.
    #[instrument(skip_all, fields(id = profile.id))]
    pub async fn update_profile(&self, profile: &CitizenProfile) -> Result<Step, AuthError> {
        if self.session().citizen().is_none() {
            return Err(AuthError::InvalidState("not signed in as a citizen"));
        }

        let entry = self.enter();
        let updated = self
            .inner
            .api
            .update_citizen(profile)
            .await
            .map_err(|err| AuthError::Provisioning(err.to_string()))?;
        let ticket = self.claim(entry)?;
        self.commit(ticket, Event::ProfileUpdated(updated))
    }

    /// Ends the session from any state. Idempotent; invalidates every
    /// in-flight operation.
    #[instrument(skip(self))]
    pub fn sign_out(&self) -> Step {
        let mut generations = self.lock();
        generations.current += 1;
        generations.sign_outs += 1;
        self.transition(Event::SignedOut)
    }

    fn lock(&self) -> MutexGuard<'_, Generations> {
        self.inner
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Notes the sign-out count without superseding anything.
    fn enter(&self) -> Entry {
        Entry(self.lock().sign_outs)
    }

    /// Supersedes every earlier ticket.
    fn begin(&self) -> Ticket {
        Self::advance(&mut self.lock())
    }

    fn advance(generations: &mut Generations) -> Ticket {
        generations.current += 1;
        Ticket(generations.current)
    }

    /// Takes a ticket for an operation that started at `entry`, unless the
    /// user signed out since.
    fn claim_locked(generations: &mut Generations, entry: Entry) -> Result<Ticket, AuthError> {
        if generations.sign_outs == entry.0 {
            Ok(Self::advance(generations))
        } else {
            debug!("signed out while waiting on the backend");
            Err(AuthError::Superseded)
        }
    }

    fn claim(&self, entry: Entry) -> Result<Ticket, AuthError> {
        Self::claim_locked(&mut self.lock(), entry)
    }

    fn check(generations: &Generations, ticket: Ticket) -> Result<(), AuthError> {
        if generations.current == ticket.0 {
            Ok(())
        } else {
            debug!(
                ticket = ticket.0,
                current = generations.current,
                "discarding stale session result"
            );
            Err(AuthError::Superseded)
        }
    }

    fn commit(&self, ticket: Ticket, event: Event) -> Result<Step, AuthError> {
        let generations = self.lock();
        Self::check(&generations, ticket)?;
        Ok(self.transition(event))
    }

    /// Applies `event`; the caller holds the generation lock.
    fn transition(&self, event: Event) -> Step {
        let current = self.inner.session.borrow().clone();
        let step = machine::step(&current, event);

        if step.effect == Some(Effect::ClearCredentials) {
            if let Err(err) = self.inner.store.clear() {
                error!(error = %err, "failed to clear stored credentials");
            }
        }

        if step.session != current {
            info!(
                status = %step.session.status(),
                redirect = step.redirect.map(Route::path),
                "session transition"
            );
        }
        self.inner.session.send_replace(step.session.clone());

        if let Some(route) = step.redirect {
            self.inner.navigator.navigate(route);
        }
        step
    }

    /// Claims a ticket for `entry` and stores `pair` under it.
    fn persist(
        &self,
        entry: Entry,
        pair: &CredentialPair,
        origin: SessionOrigin,
    ) -> Result<Ticket, AuthError> {
        let mut generations = self.lock();
        let ticket = Self::claim_locked(&mut generations, entry)?;

        let ttls = self.inner.ttls;
        let stored = match origin {
            SessionOrigin::Native => self.inner.store.set(pair, ttls.access, ttls.refresh),
            SessionOrigin::OAuth => {
                self.inner
                    .store
                    .set_oauth(pair, ttls.access, ttls.refresh, ttls.oauth_marker)
            }
        };
        if let Err(err) = stored {
            // The claim superseded any resolution in flight; settle it.
            let loading = self.inner.session.borrow().is_loading();
            if loading {
                self.transition(Event::SignedOut);
            }
            return Err(err.into());
        }
        Ok(ticket)
    }

    /// Decodes `access_token`, commits the identity and, for native accounts,
    /// resolves the profile. `fallback` stands in for a citizen profile the
    /// backend has just created but cannot serve yet.
    async fn settle(
        &self,
        ticket: Ticket,
        access_token: &SecretString,
        origin: SessionOrigin,
        fallback: Option<CitizenProfile>,
    ) -> Result<Step, AuthError> {
        let claims = match decode_current(access_token) {
            Ok(claims) => claims,
            Err(err) => {
                warn!(error = %err, "access token rejected");
                self.commit(ticket, Event::DecodeFailed)?;
                return Err(err.into());
            }
        };

        let step = self.commit(ticket, Event::Decoded(Identity { claims, origin }))?;
        let Some(Effect::Resolve(target)) = &step.effect else {
            return Ok(step);
        };
        debug!(subject = target.subject_id(), "resolving profile");

        let event = self.resolve(target, fallback).await;
        let unavailable = event == Event::ResolveFailed(ResolveFailure::Unavailable);
        let step = self.commit(ticket, event)?;
        if unavailable {
            return Err(AuthError::Unavailable);
        }
        Ok(step)
    }

    async fn resolve(&self, target: &ResolveTarget, fallback: Option<CitizenProfile>) -> Event {
        match target {
            ResolveTarget::Citizen { subject_id } => {
                match self.inner.resolver.resolve_citizen(subject_id).await {
                    Ok(profile) => Event::CitizenResolved(profile),
                    Err(err) => match fallback {
                        Some(profile) => {
                            debug!(error = %err, "using freshly created profile");
                            Event::CitizenResolved(profile)
                        }
                        None => {
                            warn!(error = %err, "citizen profile resolution failed");
                            Event::ResolveFailed(ResolveFailure::from(&err))
                        }
                    },
                }
            }
            ResolveTarget::Admin { subject_id } => {
                match self.inner.resolver.resolve_admin(subject_id).await {
                    Ok(profile) => Event::AdminResolved(profile),
                    Err(err) => {
                        warn!(error = %err, "staff profile resolution failed");
                        Event::ResolveFailed(ResolveFailure::from(&err))
                    }
                }
            }
        }
    }
}

fn decode_current(access_token: &SecretString) -> Result<Claims, DecodeError> {
    let claims = claims::decode(access_token.expose_secret())?;
    if claims.is_expired(unix_now()) {
        return Err(DecodeError::Expired);
    }
    Ok(claims)
}
