use std::fmt;
use std::str::FromStr;

use crate::error::RepositoryError;

/// Fields a client can be looked up by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Name,
    Surname,
    Email,
    Phone,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Name,
        SearchField::Surname,
        SearchField::Email,
        SearchField::Phone,
    ];

    /// Public search key
    pub fn key(self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Surname => "surname",
            SearchField::Email => "email",
            SearchField::Phone => "phone",
        }
    }

    /// Qualified column in `client c LEFT JOIN client_phone cp`
    pub fn column(self) -> &'static str {
        match self {
            SearchField::Name => "c.first_name",
            SearchField::Surname => "c.last_name",
            SearchField::Email => "c.email",
            SearchField::Phone => "cp.phone",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" | "имя" => Some(SearchField::Name),
            "surname" | "фамилия" => Some(SearchField::Surname),
            "email" => Some(SearchField::Email),
            "phone" | "телефон" => Some(SearchField::Phone),
            _ => None,
        }
    }
}

impl FromStr for SearchField {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::from_key(&s.trim().to_lowercase())
            .ok_or_else(|| RepositoryError::InvalidField(s.to_string()))
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
