//! Writes a finally-approved application into the permanent society registry.

use chrono::{DateTime, Datelike, Utc};

use super::domain::{
    Application, ApplicationPayload, RegistrationDetails, RenewalDetails, Society, SocietyId,
    SocietyStatus,
};
use super::error::WorkflowError;
use super::registry::Registry;

/// Society write that must accompany `application`'s final approval, if any.
///
/// Only reads the registry; the returned record is persisted together with the
/// application by `Registry::commit`.
pub(crate) fn prepare<R>(
    registry: &R,
    application: &Application,
    now: DateTime<Utc>,
) -> Result<Option<Society>, WorkflowError>
where
    R: Registry + ?Sized,
{
    match &application.payload {
        ApplicationPayload::Registration(details) => {
            if registry
                .find_society_by_name(&details.society_name)?
                .is_some()
            {
                return Err(WorkflowError::DuplicateSociety(
                    details.society_name.clone(),
                ));
            }
            Ok(Some(register(application, details, now)))
        }
        ApplicationPayload::Renewal(details) => {
            let society = registry
                .find_society_by_name(&details.society_name)?
                .ok_or_else(|| WorkflowError::SocietyNotFound(details.society_name.clone()))?;
            Ok(Some(renew(society, details, application.year, now)))
        }
        ApplicationPayload::EventPermission(_) => Ok(None),
    }
}

fn register(application: &Application, details: &RegistrationDetails, now: DateTime<Utc>) -> Society {
    Society {
        id: SocietyId::UNASSIGNED,
        name: details.society_name.clone(),
        aims: details.aims.clone(),
        faculty: application.faculty().unwrap_or_default().to_string(),
        status: SocietyStatus::Active,
        bank: details.bank.clone(),
        website: None,
        agm_date: details.agm_date,
        senior_treasurer: details.senior_treasurer.clone(),
        officers: details.officers.clone(),
        registered_on: now.date_naive(),
        year: now.year(),
        last_renewal_year: None,
        created_at: now,
        updated_at: now,
        version: 0,
    }
}

/// Refresh the mutable fields; identity and creation metadata stay put.
fn renew(mut society: Society, details: &RenewalDetails, year: i32, now: DateTime<Utc>) -> Society {
    society.bank = details.bank.clone();
    society.website = details.website.clone();
    society.agm_date = details.agm_date.or(society.agm_date);
    society.senior_treasurer = details.senior_treasurer.clone();
    society.officers = details.officers.clone();
    society.last_renewal_year = Some(year);
    society.updated_at = now;
    society
}
