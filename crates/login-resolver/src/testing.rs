//! Hand-rolled backend double for the crate's unit tests.

use crate::backend::{AppUser, AuthBackend, BackendError, ExternalSession, NewUser, Provider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// Scripted [`AuthBackend`] with call counters.
///
/// Probe responses are consumed from a queue; once the queue runs dry the
/// configured fallback (default [`BackendError::SessionAbsent`]) repeats
/// forever. Users live in an in-memory vec so materializer tests can check
/// lookup-before-create behavior.
pub struct ScriptedBackend {
    sessions: Mutex<VecDeque<Result<ExternalSession, BackendError>>>,
    fallback: Mutex<Result<ExternalSession, BackendError>>,
    hang_when_exhausted: AtomicBool,
    users: Mutex<Vec<AppUser>>,
    probe_count: AtomicU32,
    find_count: AtomicU32,
    create_count: AtomicU32,
    begin_count: AtomicU32,
    fail_begin: Mutex<Option<BackendError>>,
    fail_find: Mutex<Option<BackendError>>,
    fail_create: Mutex<Option<BackendError>>,
    opened_urls: Mutex<Vec<(Provider, String, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Err(BackendError::SessionAbsent)),
            hang_when_exhausted: AtomicBool::new(false),
            users: Mutex::new(Vec::new()),
            probe_count: AtomicU32::new(0),
            find_count: AtomicU32::new(0),
            create_count: AtomicU32::new(0),
            begin_count: AtomicU32::new(0),
            fail_begin: Mutex::new(None),
            fail_find: Mutex::new(None),
            fail_create: Mutex::new(None),
            opened_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn session(account_id: &str) -> ExternalSession {
        ExternalSession {
            account_id: account_id.to_string(),
            email: format!("{account_id}@example.com"),
            name: Some(format!("User {account_id}")),
            avatar_url: None,
        }
    }

    pub fn push_session(&self, session: ExternalSession) {
        self.sessions.lock().unwrap().push_back(Ok(session));
    }

    pub fn push_session_ok(&self, account_id: &str) {
        self.push_session(Self::session(account_id));
    }

    pub fn push_session_err(&self, err: BackendError) {
        self.sessions.lock().unwrap().push_back(Err(err));
    }

    /// Response repeated once the scripted queue is exhausted.
    pub fn always_session_err(&self, err: BackendError) {
        *self.fallback.lock().unwrap() = Err(err);
    }

    /// Once the scripted queue is exhausted, probes pend forever instead of
    /// returning. Models a network call that never resolves.
    pub fn hang_when_exhausted(&self) {
        self.hang_when_exhausted.store(true, Ordering::SeqCst);
    }

    pub fn seed_user(&self, user: AppUser) {
        self.users.lock().unwrap().push(user);
    }

    pub fn fail_begin_with(&self, err: BackendError) {
        *self.fail_begin.lock().unwrap() = Some(err);
    }

    pub fn fail_find_with(&self, err: BackendError) {
        *self.fail_find.lock().unwrap() = Some(err);
    }

    pub fn fail_create_with(&self, err: BackendError) {
        *self.fail_create.lock().unwrap() = Some(err);
    }

    pub fn probe_calls(&self) -> u32 {
        self.probe_count.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> u32 {
        self.find_count.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_count.load(Ordering::SeqCst)
    }

    pub fn begin_calls(&self) -> u32 {
        self.begin_count.load(Ordering::SeqCst)
    }

    pub fn opened_urls(&self) -> Vec<(Provider, String, String)> {
        self.opened_urls.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<AppUser> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for ScriptedBackend {
    async fn begin_oauth(
        &self,
        provider: Provider,
        success_url: &str,
        failure_url: &str,
    ) -> Result<(), BackendError> {
        self.begin_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_begin.lock().unwrap().clone() {
            return Err(err);
        }
        self.opened_urls.lock().unwrap().push((
            provider,
            success_url.to_string(),
            failure_url.to_string(),
        ));
        Ok(())
    }

    async fn get_active_session(&self) -> Result<ExternalSession, BackendError> {
        self.probe_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.sessions.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => {
                if self.hang_when_exhausted.load(Ordering::SeqCst) {
                    std::future::pending::<()>().await;
                }
                self.fallback.lock().unwrap().clone()
            }
        }
    }

    async fn find_user_by_account_id(
        &self,
        account_id: &str,
    ) -> Result<Option<AppUser>, BackendError> {
        self.find_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_find.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.account_id == account_id)
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<AppUser, BackendError> {
        let ordinal = self.create_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.fail_create.lock().unwrap().clone() {
            return Err(err);
        }
        let user = AppUser {
            id: format!("u{ordinal}"),
            account_id: new_user.account_id,
            email: new_user.email,
            username: new_user.username,
            avatar: new_user.avatar,
            provider: Some(new_user.provider),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}
