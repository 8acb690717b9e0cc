//! In-memory collaborator doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use cloakflow_models::{
    Graph, Job, JobExecution, Profile, Proxy, Session, SessionStatus, UpdateEvent, Workflow,
};
use cloakflow_traits::{
    ArtifactStore, BrowserAutomation, BrowserPage, CredentialDecryptor, EngineError, EventChannel,
    ExecutionStore, FingerprintScriptProvider, JobStore, LaunchConfig, NewJob, NewSession,
    ProfileStore, ProxyStore, Result, SessionStore, WorkflowStore,
};

// ── Browser doubles ──────────────────────────────────────────────────

/// Scripted page: records every primitive call, optionally fails navigation
/// to one URL or waits on one selector forever (simulated by erroring).
pub struct MockPage {
    log: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    fail_navigation: Option<String>,
    fail_selector: Option<String>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            fail_navigation: None,
            fail_selector: None,
        }
    }

    pub fn fail_navigation_to(mut self, url: &str) -> Self {
        self.fail_navigation = Some(url.to_string());
        self
    }

    pub fn fail_selector(mut self, selector: &str) -> Self {
        self.fail_selector = Some(selector.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn close_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<String> {
        if self.fail_navigation.as_deref() == Some(url) {
            return Err(EngineError::action(format!("navigation to {url} failed")));
        }
        self.record(format!("navigate {url}"));
        Ok(url.to_string())
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> Result<()> {
        if self.fail_selector.as_deref() == Some(selector) {
            return Err(EngineError::action(format!(
                "selector {selector} never appeared"
            )));
        }
        self.record(format!("wait {selector}"));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.record(format!("click {selector}"));
        Ok(())
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        self.record(format!("fill {selector}={text}"));
        Ok(())
    }

    async fn screenshot(&mut self, path: Option<&str>) -> Result<Vec<u8>> {
        self.record(match path {
            Some(path) => format!("screenshot {path}"),
            None => "screenshot".to_string(),
        });
        Ok(vec![0u8; 128])
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.record("close".to_string());
        Ok(())
    }
}

/// Browser capability double: hands out `MockPage`s and keeps the launch
/// configs plus each page's log and close flag for later assertions.
#[derive(Default)]
pub struct MockBrowser {
    pub launches: Mutex<Vec<LaunchConfig>>,
    pub page_logs: Mutex<Vec<Arc<Mutex<Vec<String>>>>>,
    pub close_flags: Mutex<Vec<Arc<AtomicBool>>>,
    fail_navigation: Mutex<Option<String>>,
    refuse_launch: AtomicBool,
}

impl MockBrowser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_navigation_to(&self, url: &str) {
        *self.fail_navigation.lock().unwrap() = Some(url.to_string());
    }

    pub fn refuse_launch(&self) {
        self.refuse_launch.store(true, Ordering::SeqCst);
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    pub fn last_launch(&self) -> LaunchConfig {
        self.launches.lock().unwrap().last().cloned().unwrap()
    }

    pub fn page_calls(&self, launch: usize) -> Vec<String> {
        self.page_logs.lock().unwrap()[launch].lock().unwrap().clone()
    }

    pub fn page_closed(&self, launch: usize) -> bool {
        self.close_flags.lock().unwrap()[launch].load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserAutomation for MockBrowser {
    async fn launch(&self, config: LaunchConfig) -> Result<Box<dyn BrowserPage>> {
        if self.refuse_launch.load(Ordering::SeqCst) {
            return Err(EngineError::action("browser refused to launch"));
        }

        let mut page = MockPage::new();
        if let Some(url) = self.fail_navigation.lock().unwrap().clone() {
            page = page.fail_navigation_to(&url);
        }

        self.launches.lock().unwrap().push(config);
        self.page_logs.lock().unwrap().push(page.log.clone());
        self.close_flags.lock().unwrap().push(page.closed.clone());
        Ok(Box::new(page))
    }
}

// ── Script / credential doubles ──────────────────────────────────────

pub struct StaticScripts;

impl FingerprintScriptProvider for StaticScripts {
    fn base_patch(&self) -> String {
        "// base fingerprint patch".to_string()
    }

    fn audio_spoof(&self) -> String {
        "// audio spoof".to_string()
    }

    fn build_injection(&self, fingerprint: &Value) -> String {
        format!("// injection {fingerprint}")
    }
}

/// Decrypts `enc:<plain>` ciphertexts; anything else fails.
pub struct PrefixDecryptor;

impl CredentialDecryptor for PrefixDecryptor {
    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        ciphertext
            .strip_prefix("enc:")
            .map(String::from)
            .ok_or_else(|| EngineError::validation("unrecognized ciphertext"))
    }
}

// ── Event channel double ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingChannel {
    events: Mutex<Vec<UpdateEvent>>,
    fail: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<UpdateEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }
}

#[async_trait]
impl EventChannel for RecordingChannel {
    async fn send(&self, event: UpdateEvent) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::action("channel down"));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

// ── In-memory datastore ──────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    profiles: HashMap<i64, Profile>,
    proxies: HashMap<i64, Proxy>,
    sessions: HashMap<i64, Session>,
    jobs: HashMap<i64, Job>,
    executions: HashMap<i64, JobExecution>,
    workflows: HashMap<i64, Workflow>,
    screenshots: Vec<(i64, usize)>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(state: &mut StoreState) -> i64 {
        state.next_id += 1;
        state.next_id
    }

    pub fn add_profile(&self, user_agent: Option<&str>, fingerprint: Option<Value>) -> Profile {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let profile = Profile {
            id,
            name: format!("profile-{id}"),
            user_agent: user_agent.map(String::from),
            fingerprint,
            created_at: Utc::now(),
        };
        state.profiles.insert(id, profile.clone());
        profile
    }

    pub fn add_proxy(&self, active: bool, password_encrypted: Option<&str>) -> Proxy {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let proxy = Proxy {
            id,
            host: "10.0.0.1".to_string(),
            port: 1080,
            username: Some("user".to_string()),
            password_encrypted: password_encrypted.map(String::from),
            proxy_type: "socks5".to_string(),
            active,
            created_at: Utc::now(),
        };
        state.proxies.insert(id, proxy.clone());
        proxy
    }

    pub fn add_session(
        &self,
        profile_id: i64,
        proxy_id: Option<i64>,
        status: SessionStatus,
    ) -> Session {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let mut session = Session::new(id, profile_id, proxy_id);
        session.status = status;
        state.sessions.insert(id, session.clone());
        session
    }

    pub fn add_job(&self, job_type: &str, payload: Value) -> Job {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let job = Job::new(id, job_type, payload);
        state.jobs.insert(id, job.clone());
        job
    }

    pub fn add_execution(&self, job_id: i64, profile_id: i64) -> JobExecution {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let execution = JobExecution::new(id, job_id, profile_id);
        state.executions.insert(id, execution.clone());
        execution
    }

    pub fn add_workflow(&self, graph: Graph) -> Workflow {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let workflow = Workflow {
            id,
            name: format!("workflow-{id}"),
            graph,
            created_at: Utc::now(),
        };
        state.workflows.insert(id, workflow.clone());
        workflow
    }

    pub fn session(&self, id: i64) -> Option<Session> {
        self.state.lock().unwrap().sessions.get(&id).cloned()
    }

    pub fn job(&self, id: i64) -> Option<Job> {
        self.state.lock().unwrap().jobs.get(&id).cloned()
    }

    pub fn execution(&self, id: i64) -> Option<JobExecution> {
        self.state.lock().unwrap().executions.get(&id).cloned()
    }

    pub fn screenshot_count(&self) -> usize {
        self.state.lock().unwrap().screenshots.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, id: i64) -> Result<Option<Profile>> {
        Ok(self.state.lock().unwrap().profiles.get(&id).cloned())
    }
}

#[async_trait]
impl ProxyStore for InMemoryStore {
    async fn get_proxy(&self, id: i64) -> Result<Option<Proxy>> {
        Ok(self.state.lock().unwrap().proxies.get(&id).cloned())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_session(&self, request: NewSession) -> Result<Session> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let mut session = Session::new(id, request.profile_id, request.proxy_id);
        if let Some(status) = request.status {
            session.status = status;
        }
        if let Some(meta) = request.meta {
            session.meta = meta;
        }
        state.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: i64) -> Result<Option<Session>> {
        Ok(self.state.lock().unwrap().sessions.get(&id).cloned())
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn find_running_session(&self, profile_id: i64) -> Result<Option<Session>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .sessions
            .values()
            .find(|s| s.profile_id == profile_id && s.is_running())
            .cloned())
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn create_job(&self, request: NewJob) -> Result<Job> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let mut job = Job::new(id, request.job_type, request.payload);
        job.scheduled_at = request.scheduled_at;
        state.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn get_job(&self, id: i64) -> Result<Option<Job>> {
        Ok(self.state.lock().unwrap().jobs.get(&id).cloned())
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        self.state.lock().unwrap().jobs.insert(job.id, job.clone());
        Ok(())
    }
}

#[async_trait]
impl ExecutionStore for InMemoryStore {
    async fn create_execution(&self, job_id: i64, profile_id: i64) -> Result<JobExecution> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let execution = JobExecution::new(id, job_id, profile_id);
        state.executions.insert(id, execution.clone());
        Ok(execution)
    }

    async fn get_execution(&self, id: i64) -> Result<Option<JobExecution>> {
        Ok(self.state.lock().unwrap().executions.get(&id).cloned())
    }

    async fn update_execution(&self, execution: &JobExecution) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .executions
            .insert(execution.id, execution.clone());
        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for InMemoryStore {
    async fn get_workflow(&self, id: i64) -> Result<Option<Workflow>> {
        Ok(self.state.lock().unwrap().workflows.get(&id).cloned())
    }
}

#[async_trait]
impl ArtifactStore for InMemoryStore {
    async fn save_screenshot(&self, execution_id: i64, bytes: &[u8]) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.screenshots.push((execution_id, bytes.len()));
        Ok(format!("screenshots/{execution_id}.png"))
    }
}

// ── Wired-up harness ─────────────────────────────────────────────────

pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub browser: Arc<MockBrowser>,
    pub events: Arc<RecordingChannel>,
    pub ctx: crate::handlers::RunContext,
}

/// A run context over fresh in-memory doubles.
pub fn harness() -> TestHarness {
    let store = InMemoryStore::new();
    let browser = MockBrowser::new();
    let events = RecordingChannel::new();

    let ctx = crate::handlers::RunContext {
        store: store.clone(),
        browser: browser.clone(),
        scripts: Arc::new(StaticScripts),
        decryptor: Arc::new(PrefixDecryptor),
        events: events.clone(),
    };

    TestHarness {
        store,
        browser,
        events,
        ctx,
    }
}
