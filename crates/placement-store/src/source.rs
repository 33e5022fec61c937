//! Async read interfaces consumed by the scan runner.

use async_trait::async_trait;

use placement_core::result::AppResult;
use placement_core::types::{DocumentId, LocationId};
use placement_entity::access::DocumentAccessProfile;
use placement_entity::location::{CandidateConstraints, Location};

/// Read access to storage locations.
///
/// Implementations may be backed by a remote store; callers wrap every
/// call in a deadline.
#[async_trait]
pub trait LocationSource: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch one location.
    async fn location(&self, id: LocationId) -> AppResult<Location>;

    /// Enumerate locations matching the constraints, ordered by id.
    async fn candidates(&self, constraints: &CandidateConstraints) -> AppResult<Vec<Location>>;

    /// Whether `id` is `root` or lies beneath it.
    async fn is_within(&self, id: LocationId, root: LocationId) -> AppResult<bool>;
}

/// Read access to document access profiles.
#[async_trait]
pub trait AccessSource: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch one document's profile.
    async fn profile(&self, id: DocumentId) -> AppResult<DocumentAccessProfile>;

    /// All known documents, ordered by id.
    async fn document_ids(&self) -> AppResult<Vec<DocumentId>>;
}
