/// A row of the `client_phone` table
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub client_phone_id: i32,
    pub client_id: i32,
    pub phone: String,
}

/// Per-phone result of a bulk insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneOutcome {
    Inserted { client_phone_id: i32, phone: String },
    /// The number failed the format constraint and was rolled back on its own
    Rejected {
        phone: String,
        constraint: String,
        reason: String,
    },
    /// The insert failed for another reason and was rolled back on its own
    Failed { phone: String, error: String },
}

impl PhoneOutcome {
    pub fn phone(&self) -> &str {
        match self {
            PhoneOutcome::Inserted { phone, .. }
            | PhoneOutcome::Rejected { phone, .. }
            | PhoneOutcome::Failed { phone, .. } => phone,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, PhoneOutcome::Inserted { .. })
    }
}
