//! Create, edit and details modals for a single appointment.
//!
//! A modal reports how it closed through its return values: a successful
//! submit yields [`SubmitOutcome::Saved`] and leaves the modal closed, a
//! cancel yields `false`. The calendar controller reacts to both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use vetclinic_core::{
    errors::Failure,
    models::{
        appointment::{
            default_appointment_length, Appointment, AppointmentStatus, ClearableField,
            CreateAppointmentRequest, GuestClientInfo, ServiceType, UpdateAppointmentRequest, MAX_NOTES_LENGTH,
            MAX_REASON_LENGTH,
        },
        client::SelectedClient,
        employee::SelectedEmployee,
        pet::{Pet, SelectedPet},
    },
};

use crate::gateway::{EntityService, ListService, PetFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open { dirty: bool, error: Option<String> },
    Submitting,
}

impl ModalState {
    fn pristine() -> Self {
        ModalState::Open {
            dirty: false,
            error: None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ModalState::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Start,
    End,
    ServiceType,
    Reason,
    Notes,
}

/// Inline validation messages keyed by the field they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }
}

/// Editable fields of an appointment; anything a user may leave blank is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub service_type: Option<ServiceType>,
    pub status: Option<AppointmentStatus>,
    pub reason: String,
    pub notes: String,
    pub client_id: Option<i64>,
    pub pet_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub guest_client: Option<GuestClientInfo>,
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl AppointmentForm {
    /// A blank form starting at `start` and lasting the default length.
    pub fn starting_at(start: Option<DateTime<Utc>>) -> Self {
        Self {
            start,
            end: start.map(|s| s + default_appointment_length()),
            ..Self::default()
        }
    }

    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            start: Some(appointment.start),
            end: Some(appointment.end),
            service_type: Some(appointment.service_type),
            status: Some(appointment.status),
            reason: appointment.reason.clone().unwrap_or_default(),
            notes: appointment.notes.clone().unwrap_or_default(),
            client_id: appointment.client_id,
            pet_id: appointment.pet_id,
            employee_id: appointment.employee_id,
            guest_client: appointment.guest_client.clone(),
        }
    }

    /// Required fields and the cheap rules the service would reject anyway.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if self.start.is_none() {
            errors.insert(FormField::Start, "Start time is required");
        }
        if self.end.is_none() {
            errors.insert(FormField::End, "End time is required");
        }
        if self.service_type.is_none() {
            errors.insert(FormField::ServiceType, "Service type is required");
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                errors.insert(FormField::End, "End time must not be before start time");
            }
        }
        if self.reason.trim().chars().count() > MAX_REASON_LENGTH {
            errors.insert(
                FormField::Reason,
                format!("Reason cannot exceed {MAX_REASON_LENGTH} characters"),
            );
        }
        if self.notes.trim().chars().count() > MAX_NOTES_LENGTH {
            errors.insert(
                FormField::Notes,
                format!("Notes cannot exceed {MAX_NOTES_LENGTH} characters"),
            );
        }
        errors
    }

    pub fn create_request(&self) -> Result<CreateAppointmentRequest, FieldErrors> {
        let errors = self.validate();
        let (Some(start), Some(end), Some(service_type)) =
            (self.start, self.end, self.service_type)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateAppointmentRequest {
            start,
            end,
            service_type,
            status: self.status,
            reason: non_blank(&self.reason),
            notes: non_blank(&self.notes),
            client_id: self.client_id,
            pet_id: self.pet_id,
            employee_id: self.employee_id,
            guest_client: self.guest_client.clone(),
        })
    }

    /// Only the fields that differ from `original`. Optional fields the user
    /// emptied are listed in `clear`.
    pub fn patch_against(
        &self,
        original: &Appointment,
    ) -> Result<UpdateAppointmentRequest, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        fn changed<T: PartialEq + Clone>(new: &Option<T>, old: &Option<T>) -> Option<T> {
            match new {
                Some(value) if new != old => Some(value.clone()),
                _ => None,
            }
        }

        let reason = non_blank(&self.reason);
        let notes = non_blank(&self.notes);
        let clear = [
            (ClearableField::Reason, reason.is_none() && original.reason.is_some()),
            (ClearableField::Notes, notes.is_none() && original.notes.is_some()),
            (
                ClearableField::Client,
                self.client_id.is_none() && original.client_id.is_some(),
            ),
            (
                ClearableField::Pet,
                self.pet_id.is_none() && original.pet_id.is_some(),
            ),
            (
                ClearableField::Employee,
                self.employee_id.is_none() && original.employee_id.is_some(),
            ),
            (
                ClearableField::GuestClient,
                self.guest_client.is_none() && original.guest_client.is_some(),
            ),
        ]
        .into_iter()
        .filter_map(|(field, emptied)| emptied.then_some(field))
        .collect();

        Ok(UpdateAppointmentRequest {
            start: changed(&self.start, &Some(original.start)),
            end: changed(&self.end, &Some(original.end)),
            service_type: changed(&self.service_type, &Some(original.service_type)),
            status: changed(&self.status, &Some(original.status)),
            reason: changed(&reason, &original.reason),
            notes: changed(&notes, &original.notes),
            client_id: changed(&self.client_id, &original.client_id),
            pet_id: changed(&self.pet_id, &original.pet_id),
            employee_id: changed(&self.employee_id, &original.employee_id),
            guest_client: changed(&self.guest_client, &original.guest_client),
            clear,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The modal closed after the service accepted the change.
    Saved(Appointment),
    /// The service refused; the modal stays open with the error.
    Failed(Failure),
    /// The edit form matched the record; the modal closed without a call.
    Unchanged,
    /// Submit on a modal that is not open.
    Ignored,
}

/// Client, pet and employee choices shown as read-only labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub client: Option<SelectedClient>,
    pub pet: Option<SelectedPet>,
    pub employee: Option<SelectedEmployee>,
    /// Pets of the selected client, offered by the pet picker.
    pub pet_options: Vec<Pet>,
}

impl Selections {
    pub fn client_label(&self) -> String {
        self.client.as_ref().map(SelectedClient::label).unwrap_or_default()
    }

    pub fn pet_label(&self) -> String {
        self.pet.as_ref().map(SelectedPet::label).unwrap_or_default()
    }

    pub fn employee_label(&self) -> String {
        self.employee
            .as_ref()
            .map(SelectedEmployee::label)
            .unwrap_or_default()
    }
}

/// State shared by the create and edit modals.
#[derive(Debug, Clone, PartialEq)]
struct FormModal {
    state: ModalState,
    form: AppointmentForm,
    errors: FieldErrors,
    selections: Selections,
}

impl FormModal {
    fn closed() -> Self {
        Self {
            state: ModalState::Closed,
            form: AppointmentForm::default(),
            errors: FieldErrors::default(),
            selections: Selections::default(),
        }
    }

    fn open(&mut self, form: AppointmentForm, selections: Selections) {
        self.state = ModalState::pristine();
        self.form = form;
        self.errors = FieldErrors::default();
        self.selections = selections;
    }

    fn touch(&mut self) {
        if let ModalState::Open { dirty, .. } = &mut self.state {
            *dirty = true;
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut AppointmentForm)) {
        if !self.state.is_open() {
            return;
        }
        change(&mut self.form);
        self.touch();
    }

    async fn select_client<P>(&mut self, client: SelectedClient, pets: &P) -> Result<(), Failure>
    where
        P: ListService<Record = Pet, Filter = PetFilter>,
    {
        if !self.state.is_open() {
            return Ok(());
        }
        self.form.client_id = Some(client.id);
        self.form.pet_id = None;
        self.selections.pet = None;
        self.selections.pet_options.clear();
        let client_id = client.id;
        self.selections.client = Some(client);
        self.touch();

        let options = pets.list(&PetFilter::Owner(client_id)).await?;
        self.selections.pet_options = options.into_iter().flatten().collect();
        Ok(())
    }

    fn select_pet(&mut self, pet: SelectedPet) {
        if !self.state.is_open() {
            return;
        }
        self.form.pet_id = Some(pet.id);
        self.selections.pet = Some(pet);
        self.touch();
    }

    fn select_employee(&mut self, employee: SelectedEmployee) {
        if !self.state.is_open() {
            return;
        }
        self.form.employee_id = Some(employee.id);
        self.selections.employee = Some(employee);
        self.touch();
    }

    fn clear_client(&mut self) {
        if !self.state.is_open() {
            return;
        }
        self.form.client_id = None;
        self.form.pet_id = None;
        self.selections.client = None;
        self.selections.pet = None;
        self.selections.pet_options.clear();
        self.touch();
    }

    fn clear_pet(&mut self) {
        if !self.state.is_open() {
            return;
        }
        self.form.pet_id = None;
        self.selections.pet = None;
        self.touch();
    }

    fn clear_employee(&mut self) {
        if !self.state.is_open() {
            return;
        }
        self.form.employee_id = None;
        self.selections.employee = None;
        self.touch();
    }

    fn accepts_submit(&self) -> bool {
        matches!(self.state, ModalState::Open { .. })
    }

    fn begin_submit(&mut self) {
        self.errors = FieldErrors::default();
        self.state = ModalState::Submitting;
    }

    fn finish_submit(&mut self, result: Result<Appointment, Failure>) -> SubmitOutcome {
        match result {
            Ok(saved) => {
                self.state = ModalState::Closed;
                SubmitOutcome::Saved(saved)
            }
            Err(failure) => {
                tracing::warn!("Appointment submit failed: {}", failure);
                self.state = ModalState::Open {
                    dirty: true,
                    error: Some(failure.message.clone()),
                };
                SubmitOutcome::Failed(failure)
            }
        }
    }

    fn reject(&mut self, errors: FieldErrors) -> SubmitOutcome {
        self.errors = errors.clone();
        self.touch();
        SubmitOutcome::Invalid(errors)
    }

    fn cancel(&mut self) -> bool {
        self.state = ModalState::Closed;
        false
    }
}

macro_rules! form_modal_accessors {
    () => {
        pub fn state(&self) -> &ModalState {
            &self.inner.state
        }

        pub fn is_open(&self) -> bool {
            self.inner.state.is_open()
        }

        pub fn form(&self) -> &AppointmentForm {
            &self.inner.form
        }

        pub fn errors(&self) -> &FieldErrors {
            &self.inner.errors
        }

        pub fn selections(&self) -> &Selections {
            &self.inner.selections
        }

        /// Applies a user edit to the form; the modal becomes dirty.
        pub fn edit(&mut self, change: impl FnOnce(&mut AppointmentForm)) {
            self.inner.edit(change)
        }

        /// Stores the client, forgets any chosen pet and loads the client's pets.
        pub async fn select_client<P>(
            &mut self,
            client: SelectedClient,
            pets: &P,
        ) -> Result<(), Failure>
        where
            P: ListService<Record = Pet, Filter = PetFilter>,
        {
            self.inner.select_client(client, pets).await
        }

        pub fn select_pet(&mut self, pet: SelectedPet) {
            self.inner.select_pet(pet)
        }

        pub fn select_employee(&mut self, employee: SelectedEmployee) {
            self.inner.select_employee(employee)
        }

        /// Removes the client together with its pet.
        pub fn clear_client(&mut self) {
            self.inner.clear_client()
        }

        pub fn clear_pet(&mut self) {
            self.inner.clear_pet()
        }

        pub fn clear_employee(&mut self) {
            self.inner.clear_employee()
        }

        /// Closes without saving. Always reports `false`.
        pub fn cancel(&mut self) -> bool {
            self.inner.cancel()
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateAppointmentModal {
    inner: FormModal,
}

impl Default for CreateAppointmentModal {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateAppointmentModal {
    pub fn new() -> Self {
        Self {
            inner: FormModal::closed(),
        }
    }

    /// Opens a pristine form; a clicked instant becomes the start.
    pub fn open(&mut self, start: Option<DateTime<Utc>>) {
        self.inner
            .open(AppointmentForm::starting_at(start), Selections::default());
    }

    form_modal_accessors!();

    pub async fn submit<S>(&mut self, service: &S) -> SubmitOutcome
    where
        S: EntityService<Record = Appointment, Draft = CreateAppointmentRequest>,
    {
        if !self.inner.accepts_submit() {
            return SubmitOutcome::Ignored;
        }
        let request = match self.inner.form.create_request() {
            Ok(request) => request,
            Err(errors) => return self.inner.reject(errors),
        };
        self.inner.begin_submit();
        let result = service.create(request).await;
        self.inner.finish_submit(result)
    }
}

/// Splits a joined display name back into first and last name.
fn split_name(name: String) -> (String, String) {
    match name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (name, String::new()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditAppointmentModal {
    inner: FormModal,
    original: Option<Appointment>,
}

impl Default for EditAppointmentModal {
    fn default() -> Self {
        Self::new()
    }
}

impl EditAppointmentModal {
    pub fn new() -> Self {
        Self {
            inner: FormModal::closed(),
            original: None,
        }
    }

    /// Opens seeded from `appointment`. Records without an id cannot be
    /// edited and leave the modal closed.
    pub fn open(&mut self, appointment: Appointment) -> bool {
        if appointment.id.is_none() {
            tracing::warn!("Refusing to edit an appointment without an id");
            return false;
        }

        let selections = Selections {
            client: appointment.client_id.map(|id| {
                let name = appointment.client_name.clone().unwrap_or_default();
                let (first_name, last_name) = split_name(name);
                SelectedClient {
                    id,
                    first_name,
                    last_name,
                }
            }),
            pet: appointment.pet_id.map(|id| SelectedPet {
                id,
                name: appointment.pet_name.clone().unwrap_or_default(),
                breed: appointment.pet_breed.clone(),
            }),
            employee: appointment.employee_id.map(|id| {
                let name = appointment.employee_name.clone().unwrap_or_default();
                let (first_name, last_name) = split_name(name);
                SelectedEmployee {
                    id,
                    first_name,
                    last_name,
                }
            }),
            pet_options: Vec::new(),
        };
        self.inner
            .open(AppointmentForm::from_appointment(&appointment), selections);
        self.original = Some(appointment);
        true
    }

    pub fn original(&self) -> Option<&Appointment> {
        self.original.as_ref()
    }

    form_modal_accessors!();

    /// Sends only the changed fields.
    pub async fn submit<S>(&mut self, service: &S) -> SubmitOutcome
    where
        S: EntityService<Record = Appointment, Patch = UpdateAppointmentRequest>,
    {
        if !self.inner.accepts_submit() {
            return SubmitOutcome::Ignored;
        }
        let Some((id, original)) = self
            .original
            .as_ref()
            .and_then(|original| Some((original.id?, original)))
        else {
            return SubmitOutcome::Ignored;
        };
        let patch = match self.inner.form.patch_against(original) {
            Ok(patch) => patch,
            Err(errors) => return self.inner.reject(errors),
        };
        if patch.is_empty() {
            self.inner.cancel();
            return SubmitOutcome::Unchanged;
        }

        self.inner.begin_submit();
        let result = service.update(id, patch).await;
        self.inner.finish_submit(result)
    }
}

/// Read-only view of one appointment with edit and delete affordances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsModal {
    appointment: Option<Appointment>,
}

impl DetailsModal {
    pub fn open(&mut self, appointment: Appointment) {
        self.appointment = Some(appointment);
    }

    pub fn is_open(&self) -> bool {
        self.appointment.is_some()
    }

    pub fn appointment(&self) -> Option<&Appointment> {
        self.appointment.as_ref()
    }

    pub fn close(&mut self) {
        self.appointment = None;
    }

    /// Closes and hands the record over for editing.
    pub fn request_edit(&mut self) -> Option<Appointment> {
        self.appointment.take()
    }

    /// Closes the modal. No mutation is issued.
    pub fn request_delete(&mut self) {
        if let Some(appointment) = self.appointment.take() {
            tracing::warn!(
                "Delete requested for appointment {:?}; closing without deleting",
                appointment.id
            );
        }
    }
}
