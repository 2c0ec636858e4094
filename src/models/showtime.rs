use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theatre {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: String,
    pub image: String,
    pub is_active: bool,
    /// Theatres without a gateway run in demo mode and cannot take payment.
    pub has_payment_gateway: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub description: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    pub id: String,
    pub movie_id: String,
    pub theatre_id: String,
    pub screen: String,
    pub time: String,
    pub date: String,
}
