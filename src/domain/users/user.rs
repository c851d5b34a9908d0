use serde::Deserialize;

use crate::domain::documents::channels::ChannelSet;

/// Gateway user as configured in the users file.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAccount {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub channels: ChannelSet,
}
