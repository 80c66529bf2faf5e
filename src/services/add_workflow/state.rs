use serde::{Deserialize, Serialize};

use crate::ports::accounts::{Account, ConsentIntent, Token};
use crate::youtube_rs::errors::ErrorKind;
use crate::youtube_rs::video_id::VideoId;

/// Terminal result of one add run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddOutcome {
    Success { title: String, description: String },
    Error { error: ErrorKind },
    /// The user has to visit the consent page before the video can be added.
    NeedsIntent { intent: ConsentIntent },
}

impl AddOutcome {
    pub fn error(error: ErrorKind) -> Self {
        Self::Error { error }
    }
}

/// Where a run currently is. Stages are attempted in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    NeedAccount,
    NeedPermission,
    NeedToken,
    NeedPlaylistId,
    Inserting,
    Done(AddOutcome),
}

/// Input only the caller can provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "awaiting", rename_all = "snake_case")]
pub enum Suspension {
    ChooseAccount { accounts: Vec<Account> },
    GrantPermission,
}

/// Answer to a [`Suspension`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    AccountChosen { account: Account, remember: bool },
    Permission { granted: bool },
}

/// A suspension tagged with the run it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Awaiting {
    pub run: u64,
    pub suspension: Suspension,
}

/// What [`super::AddWorkflow::advance`] reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done(AddOutcome),
    Awaiting(Awaiting),
}

/// Everything a run has resolved so far. Can be stored and restored verbatim,
/// except for the token which is never written out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub(super) run: u64,
    pub(super) stage: Stage,
    pub(super) video_id: VideoId,
    pub(super) account: Option<Account>,
    #[serde(skip)]
    pub(super) token: Option<Token>,
    pub(super) playlist_id: Option<String>,
    pub(super) channel_title: Option<String>,
    pub(super) token_retried: bool,
    pub(super) pending: Option<Suspension>,
}

impl WorkflowState {
    pub fn new(video_id: VideoId) -> Self {
        Self {
            run: 0,
            stage: Stage::NeedAccount,
            video_id,
            account: None,
            token: None,
            playlist_id: None,
            channel_title: None,
            token_retried: false,
            pending: None,
        }
    }

    /// Start with an account already picked, e.g. from the command line.
    pub fn with_account(video_id: VideoId, account: Account) -> Self {
        Self {
            account: Some(account),
            ..Self::new(video_id)
        }
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn channel_title(&self) -> Option<&str> {
        self.channel_title.as_deref()
    }

    pub fn pending(&self) -> Option<&Suspension> {
        self.pending.as_ref()
    }

    /// Start a new run from the first stage, keeping whatever was resolved.
    pub fn retry(&mut self) {
        self.run += 1;
        self.stage = Stage::NeedAccount;
        self.token_retried = false;
        self.pending = None;
    }

    /// Give up on the current run. Answers to its suspensions are refused.
    pub fn abandon(&mut self) {
        self.run += 1;
        self.pending = None;
    }

    pub(super) fn select(&mut self, account: Account) {
        if self.account.as_ref() != Some(&account) {
            self.token = None;
            self.playlist_id = None;
            self.channel_title = None;
        }
        self.account = Some(account);
        self.stage = Stage::NeedPermission;
    }

    pub(super) fn finish(&mut self, outcome: AddOutcome) {
        self.pending = None;
        self.stage = Stage::Done(outcome);
    }
}
