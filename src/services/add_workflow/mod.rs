//! Adding one video to the Watch Later playlist.
//!
//! A run walks `NEED_ACCOUNT -> NEED_PERMISSION -> NEED_TOKEN -> NEED_PLAYLIST_ID
//! -> INSERTING` and ends in an [`AddOutcome`]. Whenever the user has to decide
//! something the run suspends; the caller answers through
//! [`AddWorkflow::resume`] and the run continues in the same stage.

mod pending;
mod state;

use std::sync::Arc;

pub use pending::{discard_pending, load_pending, save_pending};
pub use state::{AddOutcome, Awaiting, Resolution, Stage, Step, Suspension, WorkflowState};

use crate::google_rs::auth::SCOPE_YOUTUBE;
use crate::ports::accounts::{ACCOUNT_TYPE_GOOGLE, AccountStore, PermissionGate, Token, TokenError};
use crate::ports::preferences::{PREF_KEY_DEFAULT_ACCOUNT_NAME, PreferenceStore};
use crate::ports::youtube::YoutubeApi;
use crate::youtube_rs::errors::ErrorKind;

/// Reserved id of the signed in user's Watch Later playlist.
pub const WATCH_LATER_PLAYLIST_ID: &str = "WL";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Answer belongs to run {got}, the workflow is at run {current}")]
    StaleRun { current: u64, got: u64 },
    #[error("The workflow is not waiting for input")]
    NotSuspended,
    #[error("The workflow is waiting for a different answer")]
    UnexpectedResolution,
    #[error("Account {0} was not offered")]
    UnknownAccount(String),
}

pub struct AddWorkflow<A, P, Y, S>
where
    A: AccountStore,
    P: PermissionGate,
    Y: YoutubeApi,
    S: PreferenceStore,
{
    accounts: A,
    permission: P,
    youtube: Y,
    preferences: Arc<S>,
}

impl<A, P, Y, S> AddWorkflow<A, P, Y, S>
where
    A: AccountStore,
    P: PermissionGate,
    Y: YoutubeApi,
    S: PreferenceStore,
{
    pub fn new(accounts: A, permission: P, youtube: Y, preferences: Arc<S>) -> Self {
        Self {
            accounts,
            permission,
            youtube,
            preferences,
        }
    }

    /// Drive the run until it finishes or needs the caller.
    ///
    /// Only one request is in flight at a time. Dropping the returned future
    /// leaves `state` at the last completed stage.
    pub async fn advance(&self, state: &mut WorkflowState) -> Step {
        loop {
            if let Some(suspension) = &state.pending {
                return Step::Awaiting(Awaiting {
                    run: state.run,
                    suspension: suspension.clone(),
                });
            }

            tracing::debug!(run = state.run, stage = ?state.stage, "Add workflow step");
            match state.stage.clone() {
                Stage::Done(outcome) => return Step::Done(outcome),
                Stage::NeedAccount => self.select_account(state),
                Stage::NeedPermission => self.check_permission(state),
                Stage::NeedToken => self.acquire_token(state).await,
                Stage::NeedPlaylistId => self.find_playlist(state).await,
                Stage::Inserting => self.insert(state).await,
            }
        }
    }

    /// Answer the pending suspension of run `run` and keep going.
    pub async fn resume(
        &self,
        state: &mut WorkflowState,
        run: u64,
        resolution: Resolution,
    ) -> Result<Step, WorkflowError> {
        if run != state.run {
            return Err(WorkflowError::StaleRun {
                current: state.run,
                got: run,
            });
        }

        match (state.pending.take(), resolution) {
            (None, _) => return Err(WorkflowError::NotSuspended),
            (
                Some(Suspension::ChooseAccount { accounts }),
                Resolution::AccountChosen { account, remember },
            ) => {
                if !accounts.contains(&account) {
                    let name = account.name.clone();
                    state.pending = Some(Suspension::ChooseAccount { accounts });
                    return Err(WorkflowError::UnknownAccount(name));
                }
                if remember {
                    if let Err(error) = self
                        .preferences
                        .put(PREF_KEY_DEFAULT_ACCOUNT_NAME, &account.name)
                    {
                        tracing::warn!("Failed to remember default account: {:?}", error);
                    }
                }
                state.select(account);
            }
            (Some(Suspension::GrantPermission), Resolution::Permission { granted }) => {
                if let Err(error) = self.permission.record(granted) {
                    tracing::warn!("Failed to remember account permission: {:?}", error);
                }
                if granted {
                    state.stage = Stage::NeedToken;
                } else {
                    self.finish(state, AddOutcome::error(ErrorKind::PermissionRequiredAccounts));
                }
            }
            (Some(pending), _) => {
                state.pending = Some(pending);
                return Err(WorkflowError::UnexpectedResolution);
            }
        }

        Ok(self.advance(state).await)
    }

    fn finish(&self, state: &mut WorkflowState, outcome: AddOutcome) {
        match &outcome {
            AddOutcome::Error { error } => {
                tracing::warn!(run = state.run, "Adding {} failed: {:?}", state.video_id, error)
            }
            AddOutcome::NeedsIntent { intent } => {
                tracing::info!(run = state.run, "Account {} needs consent", intent.account)
            }
            AddOutcome::Success { title, .. } => {
                tracing::info!(run = state.run, "Added {} ({})", state.video_id, title)
            }
        }
        state.finish(outcome);
    }

    fn select_account(&self, state: &mut WorkflowState) {
        let accounts = self.accounts.list_accounts(ACCOUNT_TYPE_GOOGLE);
        if accounts.is_empty() {
            self.finish(state, AddOutcome::error(ErrorKind::NoAccount));
            return;
        }

        if let Some(current) = state.account.clone() {
            if accounts.contains(&current) {
                state.select(current);
                return;
            }
            tracing::info!("Account {} is no longer available", current.name);
            state.account = None;
        }

        if let [only] = accounts.as_slice() {
            state.select(only.clone());
            return;
        }

        if let Some(default_name) = self.preferences.get(PREF_KEY_DEFAULT_ACCOUNT_NAME) {
            if let Some(default) = accounts.iter().find(|account| account.name == default_name) {
                state.select(default.clone());
                return;
            }
            // default account not available any more
            if let Err(error) = self.preferences.clear(PREF_KEY_DEFAULT_ACCOUNT_NAME) {
                tracing::warn!("Failed to clear stale default account: {:?}", error);
            }
        }

        state.pending = Some(Suspension::ChooseAccount { accounts });
    }

    fn check_permission(&self, state: &mut WorkflowState) {
        if !self.permission.is_required() || self.permission.has_permission() {
            state.stage = Stage::NeedToken;
        } else {
            state.pending = Some(Suspension::GrantPermission);
        }
    }

    async fn acquire_token(&self, state: &mut WorkflowState) {
        let Some(account) = state.account.clone() else {
            state.stage = Stage::NeedAccount;
            return;
        };
        if state.token.is_some() {
            state.stage = Stage::NeedPlaylistId;
            return;
        }

        match self.accounts.get_token(&account, SCOPE_YOUTUBE).await {
            Ok(token) => {
                state.token = Some(token);
                state.stage = Stage::NeedPlaylistId;
            }
            Err(TokenError::Cancelled) => {
                self.finish(state, AddOutcome::error(ErrorKind::NeedAccess))
            }
            Err(TokenError::Io(reason)) => {
                tracing::debug!("Token request failed: {}", reason);
                self.finish(state, AddOutcome::error(ErrorKind::Network))
            }
            Err(TokenError::ConsentRequired(intent)) => {
                self.finish(state, AddOutcome::NeedsIntent { intent })
            }
            Err(TokenError::Other(reason)) => {
                tracing::debug!("Token request failed: {}", reason);
                self.finish(state, AddOutcome::error(ErrorKind::Other))
            }
        }
    }

    async fn find_playlist(&self, state: &mut WorkflowState) {
        if state.playlist_id.is_some() {
            state.stage = Stage::Inserting;
            return;
        }
        let Some(token) = state.token.clone() else {
            state.stage = Stage::NeedToken;
            return;
        };

        let channels = match self.youtube.list_my_channels(&token).await {
            Ok(channels) => channels,
            Err(error) => return self.on_api_error(state, &token, error).await,
        };

        let Some(channel) = channels.first() else {
            self.finish(state, AddOutcome::error(ErrorKind::AccountHasNoChannel));
            return;
        };

        state.playlist_id = Some(
            channel
                .watch_later_playlist_id()
                .unwrap_or(WATCH_LATER_PLAYLIST_ID)
                .to_string(),
        );
        state.channel_title = channel
            .title()
            .map(str::to_string)
            .or_else(|| state.account.as_ref().map(|account| account.name.clone()));
        state.stage = Stage::Inserting;
    }

    async fn insert(&self, state: &mut WorkflowState) {
        let Some(token) = state.token.clone() else {
            state.stage = Stage::NeedToken;
            return;
        };
        let Some(playlist_id) = state.playlist_id.clone() else {
            state.stage = Stage::NeedPlaylistId;
            return;
        };

        match self
            .youtube
            .insert_playlist_item(&token, &playlist_id, &state.video_id)
            .await
        {
            Ok(item) => self.finish(
                state,
                AddOutcome::Success {
                    title: item.title,
                    description: item.description,
                },
            ),
            Err(error) => self.on_api_error(state, &token, error).await,
        }
    }

    /// A rejected token gets replaced once per run, after that the user has to
    /// grant access again.
    async fn on_api_error(&self, state: &mut WorkflowState, token: &Token, error: ErrorKind) {
        if error != ErrorKind::InvalidToken {
            self.finish(state, AddOutcome::error(error));
            return;
        }
        if state.token_retried {
            self.finish(state, AddOutcome::error(ErrorKind::NeedAccess));
            return;
        }

        tracing::info!(run = state.run, "Access token rejected, requesting a new one");
        let account_type = state
            .account
            .as_ref()
            .map(|account| account.account_type.clone())
            .unwrap_or_else(|| ACCOUNT_TYPE_GOOGLE.to_string());
        self.accounts.invalidate_token(&account_type, token).await;

        state.token_retried = true;
        state.token = None;
        state.stage = Stage::NeedToken;
    }
}
