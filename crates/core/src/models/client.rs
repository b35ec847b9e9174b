use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn selection(&self) -> Option<SelectedClient> {
        Some(SelectedClient {
            id: self.id?,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        })
    }
}

/// Client chosen in a selection dialog; only what the form needs to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedClient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl SelectedClient {
    pub fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
