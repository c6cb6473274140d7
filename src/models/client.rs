/// A row of the `client` table
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub client_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// A client joined with its phones aggregated into one string
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    pub client_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    /// `"phone1, phone2, ..."`, absent when the client has no phones
    pub phones: Option<String>,
}

impl ClientSummary {
    pub const PHONE_SEPARATOR: &'static str = ", ";

    /// Split the aggregate back into individual numbers
    pub fn phone_list(&self) -> Vec<&str> {
        match self.phones.as_deref() {
            Some(phones) if !phones.is_empty() => phones.split(Self::PHONE_SEPARATOR).collect(),
            _ => Vec::new(),
        }
    }
}

/// Result of adding a client: its id plus what happened to each phone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub client_id: i32,
    pub phones: Vec<super::PhoneOutcome>,
}

impl NewClient {
    pub fn inserted_phones(&self) -> impl Iterator<Item = &super::PhoneOutcome> {
        self.phones.iter().filter(|outcome| outcome.is_inserted())
    }

    /// Phones that did not go in, rejected by the format check or failed otherwise
    pub fn rejected_phones(&self) -> impl Iterator<Item = &super::PhoneOutcome> {
        self.phones.iter().filter(|outcome| !outcome.is_inserted())
    }
}
