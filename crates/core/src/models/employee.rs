use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum EmployeeRole {
        ClinicManager => ("CLINIC_MANAGER", "Clinic manager"),
        Receptionist => ("RECEPTIONIST", "Receptionist"),
        Administrative => ("ADMINISTRATIVE", "Administrative"),
        Veterinarian => ("VETERINARIAN", "Veterinarian"),
        Groomer => ("GROOMER", "Groomer"),
        KennelAssistant => ("KENNEL_ASSISTANT", "Kennel assistant"),
        LabTechnician => ("LAB_TECHNICIAN", "Lab technician"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub role: EmployeeRole,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn selection(&self) -> Option<SelectedEmployee> {
        Some(SelectedEmployee {
            id: self.id?,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedEmployee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl SelectedEmployee {
    pub fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
