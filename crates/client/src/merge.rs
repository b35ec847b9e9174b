//! Duplicate pet merge: search by name, pick the record to keep and the one
//! to retire, then hand both to the service's single merge call.

use vetclinic_core::models::pet::Pet;

use crate::{
    gateway::{PetFilter, PetMergeService},
    notification::Notification,
};

pub const MERGED_MESSAGE: &str = "Pets merged successfully";

pub struct PetMergeFlow<P: PetMergeService> {
    service: P,
    term: String,
    results: Vec<Pet>,
    keep: Option<Pet>,
    remove: Option<Pet>,
    notification: Option<Notification>,
}

impl<P: PetMergeService> PetMergeFlow<P> {
    pub fn new(service: P) -> Self {
        Self {
            service,
            term: String::new(),
            results: Vec::new(),
            keep: None,
            remove: None,
            notification: None,
        }
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn results(&self) -> &[Pet] {
        &self.results
    }

    pub fn keep(&self) -> Option<&Pet> {
        self.keep.as_ref()
    }

    pub fn remove(&self) -> Option<&Pet> {
        self.remove.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Runs the search for the current term. Returns the number of pets found.
    pub async fn search(&mut self) -> usize {
        let term = self.term.trim().to_string();
        if term.is_empty() {
            self.notification = Some(Notification::error("Enter a pet name to search"));
            return 0;
        }

        match self.service.list(&PetFilter::SimilarTo(term)).await {
            Ok(pets) => {
                self.results = pets.into_iter().flatten().collect();
                match self.results.len() {
                    0 => {
                        self.notification =
                            Some(Notification::info("No pets found with that name"));
                    }
                    1 => {
                        self.notification = Some(Notification::info(
                            "Only one pet found. At least two are needed to merge.",
                        ));
                    }
                    _ => {}
                }
            }
            Err(failure) => {
                tracing::error!("Error searching pets: {}", failure);
                self.results.clear();
                self.notification = Some(Notification::error(format!(
                    "Error searching pets: {}",
                    failure.message
                )));
            }
        }
        self.results.len()
    }

    fn find(&self, pet_id: i64) -> Option<Pet> {
        self.results.iter().find(|p| p.id == Some(pet_id)).cloned()
    }

    /// Marks a search result as the record that survives the merge.
    pub fn choose_keep(&mut self, pet_id: i64) -> bool {
        self.keep = self.find(pet_id);
        self.keep.is_some()
    }

    /// Marks a search result as the record that is retired by the merge.
    pub fn choose_remove(&mut self, pet_id: i64) -> bool {
        self.remove = self.find(pet_id);
        self.remove.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.keep = None;
        self.remove = None;
    }

    pub fn can_merge(&self) -> bool {
        match (&self.keep, &self.remove) {
            (Some(keep), Some(remove)) => keep.id.is_some() && keep.id != remove.id,
            _ => false,
        }
    }

    /// Merges the chosen pair. `None` when the selection does not allow it.
    pub async fn merge(&mut self) -> Option<Pet> {
        if !self.can_merge() {
            return None;
        }
        let keep_id = self.keep.as_ref()?.id?;
        let remove_id = self.remove.as_ref()?.id?;

        match self.service.merge(keep_id, remove_id).await {
            Ok(merged) => {
                tracing::info!("Merged pet {} into {}", remove_id, keep_id);
                self.clear_selection();
                self.search().await;
                self.notification = Some(Notification::success(MERGED_MESSAGE));
                Some(merged)
            }
            Err(failure) => {
                tracing::error!("Error merging pets: {}", failure);
                self.notification = Some(Notification::error(format!(
                    "Error merging pets: {}",
                    failure.message
                )));
                None
            }
        }
    }
}
