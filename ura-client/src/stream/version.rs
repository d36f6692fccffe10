//! Session-scoped schema version tracking.

/// Latest schema version announced on a stream.
///
/// Owned by the read task. A fresh resolver is created for every session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaResolver {
    current: Option<String>,
}

impl SchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a version marker. Later markers replace earlier ones.
    pub fn observe(&mut self, version: String) {
        self.current = Some(version);
    }

    /// The version hint for the next decode.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Consume the resolver, returning the last announced version.
    pub fn into_current(self) -> Option<String> {
        self.current
    }
}
