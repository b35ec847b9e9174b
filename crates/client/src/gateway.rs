//! Adapters over the clinic REST service.
//!
//! Every call returns `Result<_, Failure>`; transport errors, error statuses
//! and unreadable bodies are all normalized into a [`Failure`] before they
//! reach callers.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Deserialize};
use vetclinic_core::{
    errors::{Failure, FailureKind},
    models::{
        appointment::{Appointment, CreateAppointmentRequest, UpdateAppointmentRequest},
        calendar::{iso_instant, DateRange},
        client::Client,
        employee::Employee,
        pet::{MergePetsRequest, Pet},
        waiting_room::{
            AddToWaitingRoomRequest, CancelEntryRequest, Priority, UpdatePriorityRequest,
            WaitingRoomEntry, WaitingRoomStats,
        },
    },
};

/// Read side of a remote entity collection. Lists may contain `None`
/// entries; consumers drop them.
#[async_trait]
pub trait ListService: Send + Sync {
    type Record: Clone + Send + Sync + 'static;
    type Filter: Send + Sync;

    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Option<Self::Record>>, Failure>;
}

/// A remote collection that also accepts mutations.
#[async_trait]
pub trait EntityService: ListService {
    type Draft: Send + 'static;
    type Patch: Send + 'static;

    async fn create(&self, draft: Self::Draft) -> Result<Self::Record, Failure>;

    /// Partial update; fields absent from `patch` are left unchanged.
    async fn update(&self, id: i64, patch: Self::Patch) -> Result<Self::Record, Failure>;

    async fn delete(&self, id: i64) -> Result<(), Failure>;
}

/// Pet operations used by the duplicate-merge flow.
#[async_trait]
pub trait PetMergeService: ListService<Record = Pet, Filter = PetFilter> {
    async fn merge(&self, keep_pet_id: i64, remove_pet_id: i64) -> Result<Pet, Failure>;
}

/// The walk-in queue. Listing returns the entries still waiting or in
/// consultation, in serving order.
#[async_trait]
pub trait QueueService: ListService<Record = WaitingRoomEntry, Filter = ()> {
    async fn add(&self, request: AddToWaitingRoomRequest) -> Result<WaitingRoomEntry, Failure>;

    async fn start_consultation(&self, id: i64) -> Result<WaitingRoomEntry, Failure>;

    async fn complete_consultation(&self, id: i64) -> Result<WaitingRoomEntry, Failure>;

    async fn cancel(&self, id: i64, reason: String) -> Result<WaitingRoomEntry, Failure>;

    async fn update_priority(
        &self,
        id: i64,
        priority: Priority,
    ) -> Result<WaitingRoomEntry, Failure>;

    async fn stats(&self) -> Result<WaitingRoomStats, Failure>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetFilter {
    /// Active pets of one client.
    Owner(i64),
    /// Active pets whose name contains the term.
    SimilarTo(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Shared HTTP plumbing for the entity adapters.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, Failure> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request to clinic service failed: {}", e);
            Failure::new(FailureKind::Transport, e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => body.error,
            Err(_) if !text.trim().is_empty() => text,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        tracing::debug!("Clinic service answered {}: {}", status, message);

        Err(Failure::new(FailureKind::from_status(status.as_u16()), message))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Failure> {
        let response = self.execute(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Failure::new(FailureKind::Transport, e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("Unreadable response from clinic service: {}", e);
            Failure::new(FailureKind::Decode, e.to_string())
        })
    }

    async fn send_only(&self, request: RequestBuilder) -> Result<(), Failure> {
        self.execute(request).await.map(|_| ())
    }
}

#[derive(Debug, Clone)]
pub struct AppointmentService {
    http: HttpGateway,
}

impl AppointmentService {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }

    pub async fn get(&self, id: i64) -> Result<Appointment, Failure> {
        let url = self.http.url(&format!("/api/appointments/{}", id));
        self.http.fetch(self.http.client.get(url)).await
    }
}

#[async_trait]
impl ListService for AppointmentService {
    type Record = Appointment;
    type Filter = DateRange;

    async fn list(&self, range: &DateRange) -> Result<Vec<Option<Appointment>>, Failure> {
        let (start, end) = (iso_instant(range.start), iso_instant(range.end));
        tracing::debug!("Fetching appointments between {} and {}", start, end);

        let request = self
            .http
            .client
            .get(self.http.url("/api/appointments"))
            .query(&[("start", start), ("end", end)]);
        self.http.fetch(request).await
    }
}

#[async_trait]
impl EntityService for AppointmentService {
    type Draft = CreateAppointmentRequest;
    type Patch = UpdateAppointmentRequest;

    async fn create(&self, draft: CreateAppointmentRequest) -> Result<Appointment, Failure> {
        let request = self
            .http
            .client
            .post(self.http.url("/api/appointments"))
            .json(&draft);
        self.http.fetch(request).await
    }

    async fn update(
        &self,
        id: i64,
        patch: UpdateAppointmentRequest,
    ) -> Result<Appointment, Failure> {
        let request = self
            .http
            .client
            .patch(self.http.url(&format!("/api/appointments/{}", id)))
            .json(&patch);
        self.http.fetch(request).await
    }

    async fn delete(&self, id: i64) -> Result<(), Failure> {
        let request = self
            .http
            .client
            .delete(self.http.url(&format!("/api/appointments/{}", id)));
        self.http.send_only(request).await
    }
}

#[derive(Debug, Clone)]
pub struct ClientService {
    http: HttpGateway,
}

impl ClientService {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ListService for ClientService {
    type Record = Client;
    /// Optional search term.
    type Filter = Option<String>;

    async fn list(&self, search: &Option<String>) -> Result<Vec<Option<Client>>, Failure> {
        let mut request = self.http.client.get(self.http.url("/api/clients"));
        if let Some(term) = search.as_deref().filter(|t| !t.trim().is_empty()) {
            request = request.query(&[("search", term)]);
        }
        self.http.fetch(request).await
    }
}

#[derive(Debug, Clone)]
pub struct PetService {
    http: HttpGateway,
}

impl PetService {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ListService for PetService {
    type Record = Pet;
    type Filter = PetFilter;

    async fn list(&self, filter: &PetFilter) -> Result<Vec<Option<Pet>>, Failure> {
        let request = match filter {
            PetFilter::Owner(client_id) => self
                .http
                .client
                .get(self.http.url(&format!("/api/clients/{}/pets", client_id))),
            PetFilter::SimilarTo(name) => self
                .http
                .client
                .get(self.http.url("/api/pets/similar"))
                .query(&[("name", name.as_str())]),
        };
        self.http.fetch(request).await
    }
}

#[async_trait]
impl PetMergeService for PetService {
    async fn merge(&self, keep_pet_id: i64, remove_pet_id: i64) -> Result<Pet, Failure> {
        let body = MergePetsRequest {
            keep_pet_id,
            remove_pet_id,
        };
        let request = self
            .http
            .client
            .post(self.http.url("/api/pets/merge"))
            .json(&body);
        self.http.fetch(request).await
    }
}

#[derive(Debug, Clone)]
pub struct EmployeeService {
    http: HttpGateway,
}

impl EmployeeService {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ListService for EmployeeService {
    type Record = Employee;
    type Filter = ();

    async fn list(&self, _filter: &()) -> Result<Vec<Option<Employee>>, Failure> {
        let request = self.http.client.get(self.http.url("/api/employees"));
        self.http.fetch(request).await
    }
}

#[derive(Debug, Clone)]
pub struct WaitingRoomService {
    http: HttpGateway,
}

impl WaitingRoomService {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }

    async fn post_action(&self, id: i64, action: &str) -> Result<WaitingRoomEntry, Failure> {
        let url = self.http.url(&format!("/api/waiting-room/{}/{}", id, action));
        self.http.fetch(self.http.client.post(url)).await
    }
}

#[async_trait]
impl ListService for WaitingRoomService {
    type Record = WaitingRoomEntry;
    type Filter = ();

    async fn list(&self, _filter: &()) -> Result<Vec<Option<WaitingRoomEntry>>, Failure> {
        let request = self.http.client.get(self.http.url("/api/waiting-room"));
        self.http.fetch(request).await
    }
}

#[async_trait]
impl QueueService for WaitingRoomService {
    async fn add(&self, request: AddToWaitingRoomRequest) -> Result<WaitingRoomEntry, Failure> {
        let request = self
            .http
            .client
            .post(self.http.url("/api/waiting-room"))
            .json(&request);
        self.http.fetch(request).await
    }

    async fn start_consultation(&self, id: i64) -> Result<WaitingRoomEntry, Failure> {
        self.post_action(id, "start").await
    }

    async fn complete_consultation(&self, id: i64) -> Result<WaitingRoomEntry, Failure> {
        self.post_action(id, "complete").await
    }

    async fn cancel(&self, id: i64, reason: String) -> Result<WaitingRoomEntry, Failure> {
        let request = self
            .http
            .client
            .post(self.http.url(&format!("/api/waiting-room/{}/cancel", id)))
            .json(&CancelEntryRequest { reason });
        self.http.fetch(request).await
    }

    async fn update_priority(
        &self,
        id: i64,
        priority: Priority,
    ) -> Result<WaitingRoomEntry, Failure> {
        let request = self
            .http
            .client
            .put(self.http.url(&format!("/api/waiting-room/{}/priority", id)))
            .json(&UpdatePriorityRequest { priority });
        self.http.fetch(request).await
    }

    async fn stats(&self) -> Result<WaitingRoomStats, Failure> {
        let request = self.http.client.get(self.http.url("/api/waiting-room/stats"));
        self.http.fetch(request).await
    }
}
