//! Recording rendering backend shared by the unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hashbrown::HashMap;

use crate::client::{ClientId, Frame};
use crate::render::{RenderError, RenderHost, RendererHandle, RenderingService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    Create(ClientId),
    Attach(ClientId),
    Detach(ClientId),
    SetLine { client: ClientId, index: usize, text: String },
    SetTitle { client: ClientId, text: String },
    Release(ClientId),
    Close,
}

/// How handles created by a [`RecordingService`] react to line pushes.
#[derive(Debug, Clone, Copy, Default)]
pub enum LineBehavior {
    #[default]
    Record,
    /// Sleep before recording, to keep a tick in flight
    Slow(Duration),
    Panic,
}

#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RenderLog {
    fn push(&self, call: RenderCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, predicate: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    /// `(index, text)` of every line pushed to `client`, in order.
    pub fn lines_for(&self, client: &str) -> Vec<(usize, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::SetLine { client: c, index, text } if c.as_str() == client => {
                    Some((index, text))
                }
                _ => None,
            })
            .collect()
    }

    pub fn titles_for(&self, client: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::SetTitle { client: c, text } if c.as_str() == client => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn attaches(&self, client: &str) -> usize {
        self.count(|c| matches!(c, RenderCall::Attach(id) if id.as_str() == client))
    }

    pub fn detaches(&self, client: &str) -> usize {
        self.count(|c| matches!(c, RenderCall::Detach(id) if id.as_str() == client))
    }

    pub fn releases(&self, client: &str) -> usize {
        self.count(|c| matches!(c, RenderCall::Release(id) if id.as_str() == client))
    }
}

pub struct RecordingHandle {
    client: ClientId,
    log: RenderLog,
    closed: Arc<AtomicBool>,
    behavior: LineBehavior,
}

impl RendererHandle for RecordingHandle {
    fn attach(&self, client: &ClientId) {
        self.log.push(RenderCall::Attach(client.clone()));
    }

    fn detach(&self, client: &ClientId) {
        self.log.push(RenderCall::Detach(client.clone()));
    }

    fn set_line(&self, index: usize, text: &Frame) {
        match self.behavior {
            LineBehavior::Record => {}
            LineBehavior::Slow(delay) => std::thread::sleep(delay),
            LineBehavior::Panic => panic!("renderer exploded"),
        }
        self.log.push(RenderCall::SetLine {
            client: self.client.clone(),
            index,
            text: text.text().to_string(),
        });
    }

    fn set_title(&self, text: &Frame) {
        self.log.push(RenderCall::SetTitle {
            client: self.client.clone(),
            text: text.text().to_string(),
        });
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.log.push(RenderCall::Release(self.client.clone()));
    }
}

#[derive(Default)]
pub struct RecordingService {
    pub log: RenderLog,
    behavior: LineBehavior,
    closed_flags: Mutex<HashMap<ClientId, Arc<AtomicBool>>>,
}

impl RecordingService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_behavior(behavior: LineBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            ..Self::default()
        })
    }

    /// Simulate the host closing a client's overlay behind our back.
    pub fn close_externally(&self, client: &str) {
        if let Some(flag) = self.closed_flags.lock().unwrap().get(&ClientId::from(client)) {
            flag.store(true, Ordering::SeqCst);
        }
    }

    /// Build a handle directly, bypassing `create_handle` bookkeeping.
    pub fn handle(&self, client: &str) -> Box<dyn RendererHandle> {
        self.create_handle(&ClientId::from(client))
    }
}

impl RenderingService for RecordingService {
    fn create_handle(&self, client: &ClientId) -> Box<dyn RendererHandle> {
        let closed = Arc::new(AtomicBool::new(false));
        self.closed_flags
            .lock()
            .unwrap()
            .insert(client.clone(), Arc::clone(&closed));
        self.log.push(RenderCall::Create(client.clone()));
        Box::new(RecordingHandle {
            client: client.clone(),
            log: self.log.clone(),
            closed,
            behavior: self.behavior,
        })
    }

    fn close(&self) {
        self.log.push(RenderCall::Close);
    }
}

/// Host that either hands out a shared [`RecordingService`] or reports
/// that no packet adapter exists.
pub struct RecordingHost {
    pub service: Option<Arc<RecordingService>>,
}

impl RecordingHost {
    pub fn new(service: Arc<RecordingService>) -> Self {
        Self {
            service: Some(service),
        }
    }

    pub fn without_adapter() -> Self {
        Self { service: None }
    }
}

impl RenderHost for RecordingHost {
    fn open_rendering_service(&self) -> Result<Arc<dyn RenderingService>, RenderError> {
        match &self.service {
            Some(service) => Ok(Arc::clone(service) as Arc<dyn RenderingService>),
            None => Err(RenderError::NoPacketAdapter),
        }
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}
