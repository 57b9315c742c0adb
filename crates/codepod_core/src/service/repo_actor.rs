//! Per-repository actor.
//!
//! # Responsibility
//! - Own exactly one `RepoRecord` and serve every operation on it.
//! - Seed the record lazily on the first operation that needs it.
//! - Persist the whole record before a mutation returns.
//!
//! # Invariants
//! - At most one worker thread per key drains a FIFO job channel, so
//!   operations on the same key never interleave and run in arrival order.
//! - A worker idle for `idle_timeout` retires and drops its cached record;
//!   the next operation starts a fresh worker that reloads from storage.
//! - Mutations work on a copy; the cached record is replaced only after the
//!   save succeeded. A failed operation leaves memory and storage unchanged.
//! - Author resolution happens before the record is touched.

use crate::model::comment::Comment;
use crate::model::commit::Commit;
use crate::model::file::FileContent;
use crate::model::issue::{Issue, IssueId};
use crate::model::key::RepoKey;
use crate::model::now_epoch_ms;
use crate::model::record::RepoRecord;
use crate::model::tree::FileNode;
use crate::model::user::User;
use crate::repo::record_repo::{RecordRepository, RepoError};
use crate::users::UserDirectory;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::{Duration, Instant};

pub type ActorResult<T> = Result<T, ActorError>;

/// Typed failure returned by repository actor operations.
#[derive(Debug)]
pub enum ActorError {
    /// Supplied author id does not resolve to a known user.
    AuthorNotFound(String),
    IssueNotFound(IssueId),
    /// Target path is not one of the record's files.
    FileNotFound(String),
    /// Loading, seeding or saving the record failed.
    Store(RepoError),
    /// The actor's worker thread is gone.
    Unavailable(RepoKey),
    /// The actor's worker thread could not be started.
    Spawn(std::io::Error),
}

impl ActorError {
    /// Stable machine-readable code used in logs and façade responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthorNotFound(_) => "author_not_found",
            Self::IssueNotFound(_) => "issue_not_found",
            Self::FileNotFound(_) => "file_not_found",
            Self::Store(_) => "store_failed",
            Self::Unavailable(_) => "actor_unavailable",
            Self::Spawn(_) => "actor_spawn_failed",
        }
    }
}

impl Display for ActorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorNotFound(id) => write!(f, "author not found: {id}"),
            Self::IssueNotFound(id) => write!(f, "issue not found: {id}"),
            Self::FileNotFound(path) => write!(f, "file not found: {path}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Unavailable(key) => write!(f, "repository actor unavailable: {key}"),
            Self::Spawn(err) => write!(f, "failed to start repository actor: {err}"),
        }
    }
}

impl Error for ActorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ActorError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

type Job = Box<dyn FnOnce(&mut RepoActorState) + Send>;

/// How long a worker waits for a job before it retires.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Dependencies an actor is started with.
#[derive(Clone)]
pub(crate) struct ActorDeps {
    pub store: Arc<dyn RecordRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub seed: fn() -> RepoRecord,
    pub idle_timeout: Duration,
}

/// State owned by one actor's worker thread.
struct RepoActorState {
    key: RepoKey,
    deps: ActorDeps,
    /// `None` until the first operation loads or seeds the record.
    record: Option<RepoRecord>,
}

impl RepoActorState {
    fn run(&mut self, job: Job) {
        if catch_unwind(AssertUnwindSafe(|| job(self))).is_err() {
            // The cached copy may be stale relative to storage; reload lazily.
            self.record = None;
            error!(
                "event=actor_job module=actor status=error repo={} error_code=job_panicked",
                self.key
            );
        }
    }

    fn record(&mut self) -> ActorResult<&RepoRecord> {
        let record = match self.record.take() {
            Some(record) => record,
            None => {
                self.deps
                    .store
                    .load_or_seed(&self.key, &self.deps.seed)?
                    .record
            }
        };
        Ok(self.record.insert(record))
    }

    /// Persists `next` and makes it the cached record.
    fn commit(&mut self, next: RepoRecord) -> ActorResult<()> {
        self.deps.store.save(&self.key, &next)?;
        self.record = Some(next);
        Ok(())
    }

    fn resolve_author(&self, author_id: &str) -> ActorResult<User> {
        self.deps
            .users
            .resolve(author_id)
            .ok_or_else(|| ActorError::AuthorNotFound(author_id.to_string()))
    }

    fn exhausted(&self, what: &str) -> ActorError {
        ActorError::Store(RepoError::InvalidData(format!(
            "{what} exhausted in `{}`",
            self.key
        )))
    }

    fn get_issues(&mut self) -> ActorResult<Vec<Issue>> {
        Ok(self.record()?.issues.clone())
    }

    fn get_issue(&mut self, issue_id: IssueId) -> ActorResult<Option<Issue>> {
        Ok(self.record()?.issue(issue_id).cloned())
    }

    fn get_comments(&mut self, issue_id: IssueId) -> ActorResult<Vec<Comment>> {
        Ok(self.record()?.comments(issue_id).to_vec())
    }

    fn create_issue(&mut self, title: String, body: String, author_id: &str) -> ActorResult<Issue> {
        let author = self.resolve_author(author_id)?;
        let mut next = self.record()?.clone();

        let issue_id = next
            .next_issue_id()
            .ok_or_else(|| self.exhausted("issue ids"))?;
        let issue = Issue::open(issue_id, title, body, author, now_epoch_ms());
        next.push_issue(issue.clone());
        self.commit(next)?;

        info!(
            "event=issue_create module=actor status=ok repo={} issue_id={} issue_status={} author_id={}",
            self.key,
            issue.id,
            issue.status.as_str(),
            issue.author.id
        );
        Ok(issue)
    }

    fn add_comment(
        &mut self,
        issue_id: IssueId,
        body: String,
        author_id: &str,
    ) -> ActorResult<Comment> {
        let author = self.resolve_author(author_id)?;
        let mut next = self.record()?.clone();

        let sequence = next
            .next_comment_sequence(issue_id)
            .ok_or_else(|| self.exhausted("comment sequence"))?;
        let comment = Comment::new(issue_id, sequence, author, body, now_epoch_ms());
        if !next.push_comment(issue_id, comment.clone()) {
            return Err(ActorError::IssueNotFound(issue_id));
        }
        self.commit(next)?;

        info!(
            "event=comment_add module=actor status=ok repo={} issue_id={} comment_id={}",
            self.key, issue_id, comment.id
        );
        Ok(comment)
    }

    fn get_file_content(&mut self, path: &str) -> ActorResult<Option<FileContent>> {
        Ok(self.record()?.file(path).cloned())
    }

    fn list_file_paths(&mut self) -> ActorResult<Vec<String>> {
        Ok(self.record()?.file_paths())
    }

    fn get_file_tree(&mut self) -> ActorResult<Vec<FileNode>> {
        Ok(self.record()?.file_tree())
    }

    fn update_file_content(
        &mut self,
        path: &str,
        content: String,
        message: String,
        author_id: &str,
    ) -> ActorResult<Commit> {
        let author = self.resolve_author(author_id)?;
        let mut next = self.record()?.clone();

        if !next.overwrite_file(path, content) {
            return Err(ActorError::FileNotFound(path.to_string()));
        }
        let commit = Commit::new(message, author, now_epoch_ms());
        next.push_commit(commit.clone());
        self.commit(next)?;

        info!(
            "event=file_update module=actor status=ok repo={} path={} commit_id={}",
            self.key, path, commit.id
        );
        Ok(commit)
    }

    fn get_commits(&mut self) -> ActorResult<Vec<Commit>> {
        Ok(self.record()?.commits.clone())
    }
}

/// Mailbox for one repository key.
///
/// Outlives the worker behind it: a retired worker leaves `sender` empty and
/// the next dispatch starts a new one.
pub(crate) struct ActorSlot {
    key: RepoKey,
    deps: ActorDeps,
    /// Held while sending, and by a worker while it retires.
    sender: Mutex<Option<Sender<Job>>>,
}

impl ActorSlot {
    pub(crate) fn new(key: RepoKey, deps: ActorDeps) -> Arc<Self> {
        Arc::new(Self {
            key,
            deps,
            sender: Mutex::new(None),
        })
    }

    /// `true` while a worker is attached.
    pub(crate) fn is_running(&self) -> bool {
        self.sender().is_some()
    }

    /// Starts a worker unless one is attached.
    pub(crate) fn ensure_running(self: &Arc<Self>) -> ActorResult<()> {
        let mut sender = self.sender();
        if sender.is_none() {
            *sender = Some(self.start_worker()?);
        }
        Ok(())
    }

    fn dispatch(self: &Arc<Self>, job: Job) -> ActorResult<()> {
        let mut sender = self.sender();
        let job = match sender.as_ref() {
            Some(tx) => match tx.send(job) {
                Ok(()) => return Ok(()),
                Err(SendError(job)) => job,
            },
            None => job,
        };

        let tx = self.start_worker()?;
        tx.send(job)
            .map_err(|_| ActorError::Unavailable(self.key.clone()))?;
        *sender = Some(tx);
        Ok(())
    }

    fn start_worker(self: &Arc<Self>) -> ActorResult<Sender<Job>> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let state = RepoActorState {
            key: self.key.clone(),
            deps: self.deps.clone(),
            record: None,
        };
        let slot = Arc::downgrade(self);
        let idle_timeout = self.deps.idle_timeout;

        thread::Builder::new()
            .name(format!("repo-actor:{}", self.key))
            .spawn(move || run_actor(state, receiver, slot, idle_timeout))
            .map_err(|err| {
                error!(
                    "event=actor_spawn module=actor status=error repo={} error={}",
                    self.key, err
                );
                ActorError::Spawn(err)
            })?;

        info!("event=actor_spawn module=actor status=ok repo={}", self.key);
        Ok(sender)
    }

    fn sender(&self) -> MutexGuard<'_, Option<Sender<Job>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle to one repository actor.
///
/// Every method enqueues one job and blocks until the actor replied.
#[derive(Clone)]
pub struct RepoHandle {
    slot: Arc<ActorSlot>,
}

impl RepoHandle {
    pub(crate) fn new(slot: Arc<ActorSlot>) -> Self {
        Self { slot }
    }

    pub fn key(&self) -> &RepoKey {
        &self.slot.key
    }

    /// Current issues, most-recent first.
    pub fn get_issues(&self) -> ActorResult<Vec<Issue>> {
        self.call("get_issues", |state| state.get_issues())
    }

    pub fn get_issue(&self, issue_id: IssueId) -> ActorResult<Option<Issue>> {
        self.call("get_issue", move |state| state.get_issue(issue_id))
    }

    /// Comments of one issue in insertion order; `[]` for unknown issues.
    pub fn get_comments(&self, issue_id: IssueId) -> ActorResult<Vec<Comment>> {
        self.call("get_comments", move |state| state.get_comments(issue_id))
    }

    /// Opens a new issue at the head of the issue list.
    ///
    /// # Errors
    /// - `AuthorNotFound` when `author_id` does not resolve.
    /// - `Store(InvalidData)` when no issue id is left.
    pub fn create_issue(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        author_id: impl Into<String>,
    ) -> ActorResult<Issue> {
        let (title, body, author_id) = (title.into(), body.into(), author_id.into());
        self.call("create_issue", move |state| {
            state.create_issue(title, body, &author_id)
        })
    }

    /// Appends a comment and refreshes the issue's `comments_count`.
    ///
    /// # Errors
    /// - `AuthorNotFound` when `author_id` does not resolve (checked first).
    /// - `IssueNotFound` when no issue has `issue_id`.
    /// - `Store(InvalidData)` when the issue's comment sequence is exhausted.
    pub fn add_comment(
        &self,
        issue_id: IssueId,
        body: impl Into<String>,
        author_id: impl Into<String>,
    ) -> ActorResult<Comment> {
        let (body, author_id) = (body.into(), author_id.into());
        self.call("add_comment", move |state| {
            state.add_comment(issue_id, body, &author_id)
        })
    }

    pub fn get_file_content(&self, path: impl Into<String>) -> ActorResult<Option<FileContent>> {
        let path = path.into();
        self.call("get_file_content", move |state| state.get_file_content(&path))
    }

    /// Seeded file paths in lexicographic order.
    pub fn list_file_paths(&self) -> ActorResult<Vec<String>> {
        self.call("list_file_paths", |state| state.list_file_paths())
    }

    /// File paths nested by directory.
    pub fn get_file_tree(&self) -> ActorResult<Vec<FileNode>> {
        self.call("get_file_tree", |state| state.get_file_tree())
    }

    /// Overwrites an existing file and records one commit at the head.
    ///
    /// # Errors
    /// - `AuthorNotFound` when `author_id` does not resolve (checked first).
    /// - `FileNotFound` when `path` is not an existing file.
    pub fn update_file_content(
        &self,
        path: impl Into<String>,
        content: impl Into<String>,
        message: impl Into<String>,
        author_id: impl Into<String>,
    ) -> ActorResult<Commit> {
        let (path, content, message, author_id) =
            (path.into(), content.into(), message.into(), author_id.into());
        self.call("update_file_content", move |state| {
            state.update_file_content(&path, content, message, &author_id)
        })
    }

    /// Commit history, most-recent first.
    pub fn get_commits(&self) -> ActorResult<Vec<Commit>> {
        self.call("get_commits", |state| state.get_commits())
    }

    fn call<T: Send + 'static>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut RepoActorState) -> ActorResult<T> + Send + 'static,
    ) -> ActorResult<T> {
        let started_at = Instant::now();
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        let job: Job = Box::new(move |state| {
            let _ = reply_tx.send(f(state));
        });

        let result = self.slot.dispatch(job).and_then(|()| {
            reply_rx
                .recv()
                .unwrap_or_else(|_| Err(ActorError::Unavailable(self.key().clone())))
        });

        match &result {
            Ok(_) => debug!(
                "event=actor_op module=actor status=ok repo={} op={} duration_ms={}",
                self.key(),
                op,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=actor_op module=actor status=error repo={} op={} duration_ms={} error_code={}",
                self.key(),
                op,
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }
}

fn run_actor(
    mut state: RepoActorState,
    receiver: Receiver<Job>,
    slot: Weak<ActorSlot>,
    idle_timeout: Duration,
) {
    let reason = loop {
        let job = match receiver.recv_timeout(idle_timeout) {
            Ok(job) => job,
            Err(RecvTimeoutError::Disconnected) => break "disconnected",
            Err(RecvTimeoutError::Timeout) => match retire_or_take(&slot, &receiver) {
                Some(job) => job,
                None => break "idle",
            },
        };
        state.run(job);
    };
    info!(
        "event=actor_stop module=actor status=ok repo={} reason={}",
        state.key, reason
    );
}

/// Detaches the worker from its slot, unless a job arrived meanwhile.
///
/// Senders hold the slot lock while sending, so once the lock is taken and
/// the queue is empty no job can reach this receiver any more.
fn retire_or_take(slot: &Weak<ActorSlot>, receiver: &Receiver<Job>) -> Option<Job> {
    let slot = slot.upgrade()?;
    let mut sender = slot.sender();
    match receiver.try_recv() {
        Ok(job) => Some(job),
        Err(_) => {
            *sender = None;
            None
        }
    }
}
