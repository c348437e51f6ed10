use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Read model for patient/provider identity. Display fields only; the
/// core never writes these records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyProfile {
    pub id: Uuid,
    pub display_name: String,
    pub contact_email: Option<String>,
}

/// Lookup seam to whatever the host uses for identity.
#[async_trait]
pub trait DirectoryReader: Send + Sync {
    async fn profile(&self, id: Uuid) -> Option<PartyProfile>;
}

/// Map-backed directory for the demo host and tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<Uuid, PartyProfile>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, profile: PartyProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl DirectoryReader for InMemoryDirectory {
    async fn profile(&self, id: Uuid) -> Option<PartyProfile> {
        self.profiles.read().await.get(&id).cloned()
    }
}
