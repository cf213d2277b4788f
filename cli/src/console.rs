//! Console rendering backend
//!
//! Stands in for the host's packet library: each client's overlay is kept in
//! memory and every update is logged, so `show` can print what the client
//! would currently see.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use scoreboard_core::{
    ClientId, Frame, RenderError, RenderHost, RendererHandle, RenderingService,
};
use tracing::{debug, info};

/// What one client currently has on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub title: String,
    pub lines: Vec<String>,
    pub attached: bool,
    /// Handle that owns this board
    generation: u64,
}

type Boards = Arc<Mutex<HashMap<ClientId, Board>>>;

fn lock(boards: &Boards) -> MutexGuard<'_, HashMap<ClientId, Board>> {
    boards.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

pub struct ConsoleHandle {
    client: ClientId,
    generation: u64,
    boards: Boards,
}

impl ConsoleHandle {
    fn update(&self, apply: impl FnOnce(&mut Board)) {
        if let Some(board) = lock(&self.boards)
            .get_mut(&self.client)
            .filter(|board| board.generation == self.generation)
        {
            apply(board);
        }
    }
}

impl RendererHandle for ConsoleHandle {
    fn attach(&self, client: &ClientId) {
        self.update(|board| board.attached = true);
        info!(client = %client, "Overlay attached");
    }

    fn detach(&self, client: &ClientId) {
        self.update(|board| board.attached = false);
        info!(client = %client, "Overlay detached");
    }

    fn set_line(&self, index: usize, text: &Frame) {
        self.update(|board| {
            if board.lines.len() <= index {
                board.lines.resize(index + 1, String::new());
            }
            board.lines[index] = text.text().to_string();
        });
        debug!(client = %self.client, index, text = %text, "Line updated");
    }

    fn set_title(&self, text: &Frame) {
        self.update(|board| board.title = text.text().to_string());
        debug!(client = %self.client, title = %text, "Title updated");
    }

    fn is_closed(&self) -> bool {
        lock(&self.boards)
            .get(&self.client)
            .is_none_or(|board| board.generation != self.generation)
    }

    fn release(&self) {
        let mut boards = lock(&self.boards);
        // A newer handle may own the board by now
        if boards
            .get(&self.client)
            .is_some_and(|board| board.generation == self.generation)
        {
            boards.remove(&self.client);
        }
        info!(client = %self.client, "Overlay released");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service / Host
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ConsoleService {
    boards: Boards,
    generations: AtomicU64,
}

impl ConsoleService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn board(&self, client: &ClientId) -> Option<Board> {
        lock(&self.boards).get(client).cloned()
    }

    /// Drop a client's overlay from the host side, as a lost connection would.
    pub fn close_externally(&self, client: &ClientId) -> bool {
        lock(&self.boards).remove(client).is_some()
    }
}

impl RenderingService for ConsoleService {
    fn create_handle(&self, client: &ClientId) -> Box<dyn RendererHandle> {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        lock(&self.boards).insert(
            client.clone(),
            Board {
                generation,
                ..Board::default()
            },
        );
        Box::new(ConsoleHandle {
            client: client.clone(),
            generation,
            boards: Arc::clone(&self.boards),
        })
    }

    fn close(&self) {
        let open = {
            let mut boards = lock(&self.boards);
            let open = boards.len();
            boards.clear();
            open
        };
        info!(open, "Rendering session closed");
    }
}

/// The simulated host; `adapter: false` behaves like a server without a
/// compatible packet library.
pub struct ConsoleHost {
    pub service: Arc<ConsoleService>,
    pub adapter: bool,
}

impl RenderHost for ConsoleHost {
    fn open_rendering_service(&self) -> Result<Arc<dyn RenderingService>, RenderError> {
        if !self.adapter {
            return Err(RenderError::NoPacketAdapter);
        }
        Ok(Arc::clone(&self.service) as Arc<dyn RenderingService>)
    }
}
