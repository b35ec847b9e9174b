use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum PetType {
        Dog => ("DOG", "Dog"),
        Cat => ("CAT", "Cat"),
        Bird => ("BIRD", "Bird"),
        Rabbit => ("RABBIT", "Rabbit"),
        Hamster => ("HAMSTER", "Hamster"),
        Reptile => ("REPTILE", "Reptile"),
        Other => ("OTHER", "Other"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Option<i64>,
    pub name: String,
    pub pet_type: PetType,
    pub breed: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub owner_ids: Vec<i64>,
}

fn default_active() -> bool {
    true
}

/// Pet chosen in a selection dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPet {
    pub id: i64,
    pub name: String,
    pub breed: Option<String>,
}

impl SelectedPet {
    pub fn label(&self) -> String {
        match self.breed.as_deref().filter(|b| !b.is_empty()) {
            Some(breed) => format!("{} ({})", self.name, breed),
            None => self.name.clone(),
        }
    }
}

impl Pet {
    pub fn selection(&self) -> Option<SelectedPet> {
        Some(SelectedPet {
            id: self.id?,
            name: self.name.clone(),
            breed: self.breed.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePetsRequest {
    pub keep_pet_id: i64,
    pub remove_pet_id: i64,
}
