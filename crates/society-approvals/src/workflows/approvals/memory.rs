//! Process-local collaborators backing the HTTP service, the CLI demo, and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::audit::{AuditEntry, AuditError, AuditFilter, AuditLog};
use super::domain::{
    Application, ApplicationId, ApplicationKind, ApprovalStatus, Society, SocietyId,
};
use super::notifier::{Notification, Notifier, NotifyError};
use super::registry::{Committed, Registry, RegistryError};

#[derive(Debug, Default)]
struct RegistryState {
    applications: BTreeMap<(ApplicationKind, ApplicationId), Application>,
    sequences: HashMap<ApplicationKind, u64>,
    societies: BTreeMap<SocietyId, Society>,
    society_sequence: u64,
}

impl RegistryState {
    fn society_named(&self, name: &str) -> Option<&Society> {
        self.societies.values().find(|society| society.name == name)
    }

    fn store_society(&mut self, mut society: Society) -> Result<Society, RegistryError> {
        if society.id == SocietyId::UNASSIGNED {
            if self.society_named(&society.name).is_some() {
                return Err(RegistryError::DuplicateSocietyName(society.name));
            }
            self.society_sequence += 1;
            society.id = SocietyId(self.society_sequence);
            society.version = 0;
        } else {
            let stored_version = self
                .societies
                .get(&society.id)
                .map(|stored| stored.version)
                .ok_or_else(|| RegistryError::UnknownSociety(society.name.clone()))?;
            if stored_version != society.version {
                return Err(RegistryError::Conflict);
            }
            if let Some(other) = self.society_named(&society.name) {
                if other.id != society.id {
                    return Err(RegistryError::DuplicateSocietyName(society.name));
                }
            }
            society.version += 1;
        }
        self.societies.insert(society.id, society.clone());
        Ok(society)
    }
}

/// Registry holding every record behind one lock, which makes `commit` atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl InMemoryRegistry {
    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>, RegistryError> {
        self.state
            .lock()
            .map_err(|_| RegistryError::Unavailable("registry lock poisoned".to_string()))
    }

    fn select<F>(&self, kind: ApplicationKind, predicate: F) -> Result<Vec<Application>, RegistryError>
    where
        F: Fn(&Application) -> bool,
    {
        let guard = self.lock()?;
        Ok(guard
            .applications
            .range((kind, ApplicationId(u64::MIN))..=(kind, ApplicationId(u64::MAX)))
            .map(|(_, application)| application)
            .filter(|application| predicate(application))
            .cloned()
            .collect())
    }
}

impl Registry for InMemoryRegistry {
    fn get(
        &self,
        kind: ApplicationKind,
        id: ApplicationId,
    ) -> Result<Option<Application>, RegistryError> {
        let guard = self.lock()?;
        Ok(guard.applications.get(&(kind, id)).cloned())
    }

    fn insert(&self, mut application: Application) -> Result<Application, RegistryError> {
        let mut guard = self.lock()?;
        let kind = application.kind();
        let sequence = guard.sequences.entry(kind).or_insert(0);
        *sequence += 1;
        application.id = ApplicationId(*sequence);
        application.version = 0;
        guard
            .applications
            .insert((kind, application.id), application.clone());
        Ok(application)
    }

    fn save(&self, mut application: Application) -> Result<Application, RegistryError> {
        if application.id == ApplicationId::UNASSIGNED {
            return self.insert(application);
        }

        let mut guard = self.lock()?;
        let key = (application.kind(), application.id);
        let stored_version = guard.applications.get(&key).map(|stored| stored.version);
        match stored_version {
            Some(stored_version) if stored_version != application.version => {
                return Err(RegistryError::Conflict)
            }
            Some(_) => application.version += 1,
            None => {
                // Keep later inserts from reusing an id stored out of sequence.
                let sequence = guard.sequences.entry(key.0).or_insert(0);
                *sequence = (*sequence).max(application.id.0);
                application.version = 0;
            }
        }
        guard.applications.insert(key, application.clone());
        Ok(application)
    }

    fn commit(
        &self,
        mut application: Application,
        society: Option<Society>,
    ) -> Result<Committed, RegistryError> {
        let mut guard = self.lock()?;
        let key = (application.kind(), application.id);
        let stored_version = guard
            .applications
            .get(&key)
            .map(|stored| stored.version)
            .ok_or(RegistryError::NotFound)?;
        if stored_version != application.version {
            return Err(RegistryError::Conflict);
        }

        // Society first: if it fails nothing has been written yet.
        let society = society
            .map(|society| guard.store_society(society))
            .transpose()?;

        application.version += 1;
        guard.applications.insert(key, application.clone());
        Ok(Committed {
            application,
            society,
        })
    }

    fn find_by_status(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
    ) -> Result<Vec<Application>, RegistryError> {
        self.select(kind, |application| application.status == status)
    }

    fn find_by_status_and_faculty(
        &self,
        kind: ApplicationKind,
        status: ApprovalStatus,
        faculty: &str,
    ) -> Result<Vec<Application>, RegistryError> {
        self.select(kind, |application| {
            application.status == status && application.faculty() == Some(faculty)
        })
    }

    fn find_all(&self, kind: ApplicationKind) -> Result<Vec<Application>, RegistryError> {
        self.select(kind, |_| true)
    }

    fn find_society_by_name(&self, name: &str) -> Result<Option<Society>, RegistryError> {
        let guard = self.lock()?;
        Ok(guard.society_named(name).cloned())
    }

    fn find_society(&self, id: SocietyId) -> Result<Option<Society>, RegistryError> {
        let guard = self.lock()?;
        Ok(guard.societies.get(&id).cloned())
    }

    fn save_society(&self, society: Society) -> Result<Society, RegistryError> {
        let mut guard = self.lock()?;
        guard.store_society(society)
    }

    fn societies(&self) -> Result<Vec<Society>, RegistryError> {
        let guard = self.lock()?;
        Ok(guard.societies.values().cloned().collect())
    }
}

/// Notifier that keeps every message for later inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Transport("recorder lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AuditLog for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .map_err(|_| AuditError::Unavailable("audit lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }

    fn entries(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, AuditError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| AuditError::Unavailable("audit lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }
}
