//! Asset descriptors, lifecycle states and decoded payloads
//!
//! The engine tracks every asset it has ever been asked about through a small
//! state machine; the decoded result of a successful load is a [`Payload`].

use std::fmt;

/// Fallback size charged against the cache budget when a payload carries no
/// byte buffer of its own (references, unknown shapes).
pub const DEFAULT_PAYLOAD_SIZE: usize = 1024;

/// The broad content category of an asset, as reported by the storage API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Models3d,
    Textures,
    Audio,
    Other,
}

impl AssetCategory {
    /// Parse the storage API's category strings. Unknown strings map to
    /// `Other`, matching how the directory tree treats unclassified files.
    pub fn parse(s: &str) -> Self {
        match s {
            "3d-models" => Self::Models3d,
            "textures" => Self::Textures,
            "audio" => Self::Audio,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Models3d => "3d-models",
            Self::Textures => "textures",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes an asset to be loaded. Owned by the caller and immutable for the
/// duration of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Unique id; also the cache key.
    pub id: String,
    pub category: AssetCategory,
    /// Path relative to the project's asset root.
    pub path: String,
    /// Lowercase file extension without the dot.
    pub extension: String,
    /// Size hint from the directory listing, if known.
    pub size: Option<u64>,
}

impl AssetDescriptor {
    pub fn new(
        id: impl Into<String>,
        category: AssetCategory,
        path: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            path: path.into(),
            extension: extension.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Load priority. Lower discriminant = served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
    /// Only serviced while the user is idle.
    Idle = 4,
}

impl Priority {
    /// All levels in service order.
    pub const LEVELS: [Priority; 5] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Idle,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Lifecycle state of an asset, keyed by asset id inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    /// Never requested, or explicitly reset.
    Unloaded,
    /// Waiting in one of the priority queues.
    Queued,
    /// A concurrency slot is held and a loader is running.
    Loading,
    /// Decoded payload is available in the cache.
    Loaded,
    /// The last load attempt failed; terminal until explicitly re-queued.
    Error,
    /// Present in the cache from an earlier session of interest.
    Cached,
}

impl AssetState {
    /// States under which a new enqueue request is rejected as a no-op.
    pub fn rejects_enqueue(&self) -> bool {
        matches!(self, Self::Queued | Self::Loading | Self::Loaded)
    }
}

/// A decoded RGBA8 texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decoded in-memory result of a load, stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw bytes (models, audio; decoding deferred to the renderer).
    Bytes(Vec<u8>),
    /// Decoded GPU-friendly bitmap.
    Bitmap(Texture),
    /// Small generic asset fully materialized in memory.
    Blob(Vec<u8>),
    /// Text payload.
    Text(String),
    /// Large generic asset left un-buffered; holds only its URL.
    Reference { url: String },
}

impl Payload {
    /// Estimated byte footprint charged against the cache budget.
    ///
    /// Byte buffers count their length, strings count two bytes per unit,
    /// everything else is charged the fixed [`DEFAULT_PAYLOAD_SIZE`].
    pub fn estimated_size(&self) -> usize {
        match self {
            Payload::Bytes(b) => b.len(),
            Payload::Bitmap(t) => t.data.len(),
            Payload::Blob(b) => b.len(),
            Payload::Text(s) => s.len() * 2,
            Payload::Reference { .. } => DEFAULT_PAYLOAD_SIZE,
        }
    }

    /// Free any revocable resource before the owning cache entry is dropped.
    /// Eviction must call this so no disposable handle is orphaned.
    pub fn release(&mut self) {
        match self {
            Payload::Bytes(b) | Payload::Blob(b) => b.clear(),
            Payload::Bitmap(t) => t.data.clear(),
            Payload::Text(s) => s.clear(),
            Payload::Reference { url } => {
                log::trace!("releasing reference payload for {url}");
                url.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_roundtrip() {
        for s in ["3d-models", "textures", "audio", "other"] {
            assert_eq!(AssetCategory::parse(s).as_str(), s);
        }
        assert_eq!(AssetCategory::parse("weird"), AssetCategory::Other);
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::Critical < Priority::High);
        assert!(Priority::Low < Priority::Idle);
        assert_eq!(Priority::Idle.index(), 4);
    }

    #[test]
    fn test_state_rejects_enqueue() {
        assert!(AssetState::Queued.rejects_enqueue());
        assert!(AssetState::Loading.rejects_enqueue());
        assert!(AssetState::Loaded.rejects_enqueue());
        assert!(!AssetState::Unloaded.rejects_enqueue());
        assert!(!AssetState::Error.rejects_enqueue());
        assert!(!AssetState::Cached.rejects_enqueue());
    }

    #[test]
    fn test_estimated_sizes() {
        assert_eq!(Payload::Bytes(vec![0; 10]).estimated_size(), 10);
        assert_eq!(Payload::Blob(vec![0; 7]).estimated_size(), 7);
        assert_eq!(Payload::Text("abcd".into()).estimated_size(), 8);
        assert_eq!(
            Payload::Reference { url: "u".into() }.estimated_size(),
            DEFAULT_PAYLOAD_SIZE
        );
        let tex = Texture {
            width: 2,
            height: 2,
            data: vec![0; 16],
        };
        assert_eq!(Payload::Bitmap(tex).estimated_size(), 16);
    }

    #[test]
    fn test_release_clears_buffers() {
        let mut p = Payload::Bytes(vec![1, 2, 3]);
        p.release();
        assert_eq!(p.estimated_size(), 0);
    }
}
