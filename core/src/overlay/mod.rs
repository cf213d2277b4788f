//! Overlay instances and the repository that owns them
//!
//! ```text
//!   lifecycle (create / toggle / delete)      rotation workers (ticks)
//!                 │                                    │
//!                 ▼                                    ▼
//!        ┌──────────────────────────────────────────────────┐
//!        │ OverlayRepository  RwLock<ClientId → Arc<Instance>> │
//!        └──────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//!          OverlayInstance  Mutex<{ visibility, released }>
//!                                 │
//!                                 ▼
//!                          RendererHandle
//! ```

mod instance;
mod repository;

#[cfg(test)]
mod repository_tests;

pub use instance::OverlayInstance;
pub use repository::OverlayRepository;
