//! Scriptable in-memory client for tests
//!
//! Clones share state, so a test can keep one handle while the code under
//! test owns another, then script replies and inspect the recorded calls.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{ApiError, AuthenticationResult, DeviceClient, DeviceIdentity, RawPositionInfo, Result};

/// Kind of failure a scripted call should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Connection,
    Request,
}

impl MockFailure {
    fn to_error(self, call: &str) -> ApiError {
        match self {
            MockFailure::Connection => ApiError::Connection(format!("{call}: connection refused")),
            MockFailure::Request => ApiError::Request(format!("{call}: HTTP 500")),
        }
    }
}

struct MockState {
    identity: DeviceIdentity,
    discovered: DeviceIdentity,
    register_result: AuthenticationResult,
    accepted_pin: Option<String>,
    status: std::result::Result<String, MockFailure>,
    queued_statuses: VecDeque<std::result::Result<String, MockFailure>>,
    position: std::result::Result<Option<RawPositionInfo>, MockFailure>,
    probe: std::result::Result<(), MockFailure>,
    init_failure: Option<MockFailure>,
    action_failure: Option<MockFailure>,
    calls: Vec<String>,
}

/// Mock device client with scripted replies and a call log
#[derive(Clone)]
pub struct MockDeviceClient {
    state: Arc<Mutex<MockState>>,
}

impl MockDeviceClient {
    /// A reachable, idle player at `host` that discovers a small command set
    pub fn new(host: &str) -> Self {
        let identity = DeviceIdentity::new(host);
        let mut discovered = identity.clone();
        discovered.mac = Some("AA:BB:CC:DD:EE:FF".to_string());
        discovered.nickname = "Sony UBP-X800".to_string();
        discovered.client_id = "bluray-sdk:test".to_string();
        discovered.commands = ["Power", "Play", "Pause", "Stop", "Next", "Prev", "Home", "Eject"]
            .into_iter()
            .map(String::from)
            .collect::<BTreeSet<_>>();

        Self {
            state: Arc::new(Mutex::new(MockState {
                identity,
                discovered,
                register_result: AuthenticationResult::Success,
                accepted_pin: None,
                status: Ok("IDLE".to_string()),
                queued_statuses: VecDeque::new(),
                position: Ok(None),
                probe: Ok(()),
                init_failure: None,
                action_failure: None,
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: impl Into<String>) {
        self.lock().calls.push(call.into());
    }

    fn action(&self, call: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(call.to_string());
        match state.action_failure {
            Some(failure) => Err(failure.to_error(call)),
            None => Ok(()),
        }
    }

    pub fn set_register_result(&self, result: AuthenticationResult) {
        self.lock().register_result = result;
    }

    pub fn set_accepted_pin(&self, pin: &str) {
        self.lock().accepted_pin = Some(pin.to_string());
    }

    /// Status returned once the queued statuses are used up
    pub fn set_status(&self, status: &str) {
        self.lock().status = Ok(status.to_string());
    }

    pub fn set_status_failure(&self, failure: MockFailure) {
        self.lock().status = Err(failure);
    }

    /// Statuses returned by the next calls, one per call
    pub fn queue_statuses(&self, statuses: &[&str]) {
        let mut state = self.lock();
        state
            .queued_statuses
            .extend(statuses.iter().map(|s| Ok(s.to_string())));
    }

    pub fn set_position(&self, position: Option<RawPositionInfo>) {
        self.lock().position = Ok(position);
    }

    pub fn set_position_failure(&self, failure: MockFailure) {
        self.lock().position = Err(failure);
    }

    pub fn set_probe(&self, result: std::result::Result<(), MockFailure>) {
        self.lock().probe = result;
    }

    pub fn set_init_failure(&self, failure: Option<MockFailure>) {
        self.lock().init_failure = failure;
    }

    pub fn set_action_failure(&self, failure: Option<MockFailure>) {
        self.lock().action_failure = failure;
    }

    /// Identity applied by a successful `init_device`
    pub fn set_discovered_identity(&self, identity: DeviceIdentity) {
        self.lock().discovered = identity;
    }

    /// All calls recorded so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls whose name equals `call`
    pub fn call_count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl DeviceClient for MockDeviceClient {
    fn register(&self) -> AuthenticationResult {
        let mut state = self.lock();
        state.calls.push("register".to_string());
        if state.register_result == AuthenticationResult::Success {
            state.identity.mac = state.discovered.mac.clone();
        }
        state.register_result
    }

    fn send_authentication(&self, pin: &str) -> Result<bool> {
        let mut state = self.lock();
        state.calls.push("send_authentication".to_string());
        let accepted = state.accepted_pin.as_deref() == Some(pin);
        if accepted {
            state.identity.pin = Some(pin.to_string());
            state.identity.mac = state.discovered.mac.clone();
        }
        Ok(accepted)
    }

    fn send_command(&self, name: &str) -> Result<()> {
        self.action(&format!("send_command:{name}"))
    }

    fn power(&self, on: bool) -> Result<()> {
        self.action(&format!("power:{on}"))
    }

    fn play(&self) -> Result<()> {
        self.action("play")
    }

    fn pause(&self) -> Result<()> {
        self.action("pause")
    }

    fn stop(&self) -> Result<()> {
        self.action("stop")
    }

    fn next(&self) -> Result<()> {
        self.action("next")
    }

    fn prev(&self) -> Result<()> {
        self.action("prev")
    }

    fn playing_status(&self) -> Result<String> {
        let mut state = self.lock();
        state.calls.push("playing_status".to_string());
        let reply = match state.queued_statuses.pop_front() {
            Some(reply) => reply,
            None => state.status.clone(),
        };
        reply.map_err(|failure| failure.to_error("playing_status"))
    }

    fn position_info(&self) -> Result<Option<RawPositionInfo>> {
        let mut state = self.lock();
        state.calls.push("position_info".to_string());
        state
            .position
            .clone()
            .map_err(|failure| failure.to_error("position_info"))
    }

    fn probe(&self) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("probe".to_string());
        state.probe.map_err(|failure| failure.to_error("probe"))
    }

    fn init_device(&self) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("init_device".to_string());
        if let Some(failure) = state.init_failure {
            return Err(failure.to_error("init_device"));
        }
        let pin = state.identity.pin.clone();
        state.identity = DeviceIdentity {
            pin,
            ..state.discovered.clone()
        };
        Ok(())
    }

    fn identity(&self) -> DeviceIdentity {
        self.lock().identity.clone()
    }

    fn load_from_identity_blob(&self, blob: &serde_json::Value) -> Result<Self> {
        self.record("load_from_identity_blob");
        let identity: DeviceIdentity = serde_json::from_value(blob.clone())?;
        self.lock().identity = identity;
        Ok(self.clone())
    }
}
