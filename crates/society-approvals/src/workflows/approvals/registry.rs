use super::domain::{
    Application, ApplicationId, ApplicationKind, ApprovalStatus, Society, SocietyId,
};

/// Result of a committed write: the stored application and, when the write
/// carried one, the stored society.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub application: Application,
    pub society: Option<Society>,
}

/// Durable store for applications and permanent society records.
///
/// Implementations must make [`Registry::commit`] atomic: the application
/// write and the optional society write land together or not at all.
pub trait Registry: Send + Sync {
    fn get(
        &self,
        kind: ApplicationKind,
        id: ApplicationId,
    ) -> Result<Option<Application>, RegistryError>;

    /// Store a new application, assigning a fresh id within its kind.
    fn insert(&self, application: Application) -> Result<Application, RegistryError>;

    /// Persist `application` and an optional society create/update as one unit.
    ///
    /// Fails with [`RegistryError::Conflict`] when the stored application's
    /// version no longer matches `application.version`, or when an updated
    /// society's stored version no longer matches `society.version`. A society
    /// carrying `SocietyId::UNASSIGNED` is created; any other id is updated in
    /// place.
    fn commit(
        &self,
        application: Application,
        society: Option<Society>,
    ) -> Result<Committed, RegistryError>;

    /// Upsert by id. An unknown id is stored as given (`ApplicationId::UNASSIGNED`
    /// draws a fresh one); a known id is overwritten under the same version
    /// check as [`Registry::commit`].
    fn save(&self, application: Application) -> Result<Application, RegistryError>;

    fn find_by_status(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
    ) -> Result<Vec<Application>, RegistryError>;

    fn find_by_status_and_faculty(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
        faculty: &str,
    ) -> Result<Vec<Application>, RegistryError>;

    fn find_all(&self, kind: ApplicationKind) -> Result<Vec<Application>, RegistryError>;

    fn find_society_by_name(&self, name: &str) -> Result<Option<Society>, RegistryError>;

    fn find_society(&self, id: SocietyId) -> Result<Option<Society>, RegistryError> {
        Ok(self
            .societies()?
            .into_iter()
            .find(|society| society.id == id))
    }

    fn save_society(&self, society: Society) -> Result<Society, RegistryError>;

    fn societies(&self) -> Result<Vec<Society>, RegistryError>;
}

/// Error enumeration for registry failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("record was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("a society named '{0}' already exists")]
    DuplicateSocietyName(String),
    #[error("no society named '{0}' is registered")]
    UnknownSociety(String),
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}
