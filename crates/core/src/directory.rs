//! Paginated, searchable view over the patients registered at one event.
//!
//! The full list is held in memory and filtered on every query change; pages are index
//! slices over the filtered list.

use crate::backend::{Backend, RequestScope};
use crate::error::IntakeResult;
use crate::patient::Patient;
use intake_types::EventId;

pub const PAGE_SIZE: usize = 20;

#[derive(Clone, Debug)]
pub struct PatientDirectory {
    patients: Vec<Patient>,
    loaded_for: Option<EventId>,
    query: String,
    page: usize,
}

impl Default for PatientDirectory {
    fn default() -> Self {
        Self {
            patients: Vec::new(),
            loaded_for: None,
            query: String::new(),
            page: 1,
        }
    }
}

impl PatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patients(patients: Vec<Patient>) -> Self {
        let mut directory = Self::new();
        directory.replace_patients(patients);
        directory
    }

    /// Fetches the event's full patient list, replacing whatever was held.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or [`crate::IntakeError::Cancelled`] if the scope was torn
    /// down. The previously held list is kept in both cases.
    pub async fn load<B: Backend>(
        &mut self,
        backend: &B,
        scope: &RequestScope,
        event_id: &EventId,
    ) -> IntakeResult<usize> {
        let patients = scope.run(backend.list_patients(event_id)).await??;
        tracing::debug!(event_id = %event_id, count = patients.len(), "patient list loaded");
        self.replace_patients(patients);
        self.loaded_for = Some(event_id.clone());
        Ok(self.patients.len())
    }

    /// Loads only when the event differs from the one already loaded.
    pub async fn ensure_loaded<B: Backend>(
        &mut self,
        backend: &B,
        scope: &RequestScope,
        event_id: &EventId,
    ) -> IntakeResult<usize> {
        if self.loaded_for.as_ref() == Some(event_id) {
            return Ok(self.patients.len());
        }
        self.load(backend, scope, event_id).await
    }

    pub fn replace_patients(&mut self, patients: Vec<Patient>) {
        self.patients = patients;
        self.page = 1;
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn loaded_for(&self) -> Option<&EventId> {
        self.loaded_for.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Patients matching the current query, in their original order.
    pub fn filtered(&self) -> Vec<&Patient> {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return self.patients.iter().collect();
        }
        self.patients
            .iter()
            .filter(|p| matches_query(p, &needle))
            .collect()
    }

    /// `ceil(filtered / PAGE_SIZE)`; zero when nothing matches.
    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(PAGE_SIZE)
    }

    /// One-based.
    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn page_items(&self) -> Vec<&Patient> {
        let start = (self.page - 1) * PAGE_SIZE;
        self.filtered()
            .into_iter()
            .skip(start)
            .take(PAGE_SIZE)
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `page`, clamped to the available range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn find_by_id_number(&self, id_number: &str) -> Option<&Patient> {
        let id_number = id_number.trim();
        self.patients
            .iter()
            .find(|p| p.personal_info.id_number.trim() == id_number)
    }
}

fn matches_query(patient: &Patient, needle: &str) -> bool {
    let info = &patient.personal_info;
    info.full_name.to_lowercase().contains(needle)
        || info.surname.to_lowercase().contains(needle)
        || info.id_number.contains(needle)
        || info.email.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_patient, FakeBackend};

    fn patients(n: usize) -> Vec<Patient> {
        (0..n)
            .map(|i| sample_patient(&format!("Patient{i}"), "Mokoena", &format!("9{i:012}")))
            .collect()
    }

    #[test]
    fn exact_id_number_filter_returns_one_patient() {
        let mut directory = PatientDirectory::from_patients(vec![
            sample_patient("Thandi", "Nkosi", "9001015800087"),
            sample_patient("SIPHO", "MOKOENA", "8802025800081"),
            sample_patient("lerato", "dube", "9203035800083"),
        ]);

        directory.set_query("8802025800081");
        let found = directory.filtered();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].personal_info.full_name, "SIPHO");

        directory.set_query("");
        let names: Vec<_> = directory
            .filtered()
            .iter()
            .map(|p| p.personal_info.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Thandi", "SIPHO", "lerato"]);
    }

    #[test]
    fn filter_is_case_insensitive_across_name_and_email() {
        let mut directory = PatientDirectory::from_patients(vec![
            sample_patient("Thandi", "Nkosi", "9001015800087"),
            sample_patient("Sipho", "Mokoena", "8802025800081"),
        ]);

        directory.set_query("NKOSI");
        assert_eq!(directory.filtered().len(), 1);

        directory.set_query("sipho@EXAMPLE");
        assert_eq!(directory.filtered().len(), 1);

        directory.set_query("nobody");
        assert!(directory.filtered().is_empty());
        assert_eq!(directory.total_pages(), 0);
        assert!(directory.page_items().is_empty());
    }

    #[test]
    fn page_count_and_last_page_size() {
        for (n, pages, last) in [(0, 0, 0), (1, 1, 1), (20, 1, 20), (21, 2, 1), (45, 3, 5)] {
            let mut directory = PatientDirectory::from_patients(patients(n));
            assert_eq!(directory.total_pages(), pages, "pages for {n}");

            directory.go_to_page(pages);
            assert_eq!(directory.page_items().len(), last, "last page for {n}");
        }
    }

    #[test]
    fn navigation_stops_at_the_edges() {
        let mut directory = PatientDirectory::from_patients(patients(45));
        assert!(!directory.has_previous());
        assert!(!directory.previous_page());

        assert!(directory.next_page());
        assert!(directory.next_page());
        assert_eq!(directory.current_page(), 3);
        assert!(!directory.has_next());
        assert!(!directory.next_page());
        assert_eq!(
            directory.page_items()[0].personal_info.full_name,
            "Patient40"
        );
    }

    #[test]
    fn query_and_data_changes_reset_to_first_page() {
        let mut directory = PatientDirectory::from_patients(patients(45));
        directory.go_to_page(3);
        directory.set_query("patient");
        assert_eq!(directory.current_page(), 1);

        directory.go_to_page(2);
        directory.replace_patients(patients(30));
        assert_eq!(directory.current_page(), 1);
    }

    #[tokio::test]
    async fn loads_once_per_event() {
        let backend = FakeBackend::default().with_patients(patients(3));
        let scope = RequestScope::new();
        let event = EventId::new("evt-1").unwrap();
        let mut directory = PatientDirectory::new();

        assert_eq!(directory.ensure_loaded(&backend, &scope, &event).await.unwrap(), 3);
        assert_eq!(directory.ensure_loaded(&backend, &scope, &event).await.unwrap(), 3);
        assert_eq!(backend.patient_fetches(), 1);
        assert_eq!(directory.loaded_for(), Some(&event));

        directory.load(&backend, &scope, &event).await.unwrap();
        assert_eq!(backend.patient_fetches(), 2);
    }

    #[test]
    fn finds_patient_by_id_number() {
        let directory = PatientDirectory::from_patients(patients(3));
        let found = directory.find_by_id_number(" 9000000000001 ").expect("present");
        assert_eq!(found.personal_info.full_name, "Patient1");
        assert!(directory.find_by_id_number("123").is_none());
    }
}
