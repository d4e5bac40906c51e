use serde::{Deserialize, Serialize};

/// Value of the `Authorization` header sent to the Spotify API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHeader {
    pub scheme: String,
    pub token: String,
}

impl AuthHeader {
    pub fn value(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
}

impl From<TokenResponse> for AuthHeader {
    fn from(res: TokenResponse) -> Self {
        Self {
            scheme: res.token_type,
            token: res.access_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    pub uri: String,
    /// Whether the user has loaded this playlist. Always false; rotation ignores it.
    #[serde(default)]
    pub loaded: bool,
}

impl PlaylistEntry {
    pub fn new(id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            loaded: false,
        }
    }
}

/// One page of playlists in API response order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPage {
    entries: Vec<PlaylistEntry>,
}

impl PlaylistPage {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }
}

impl FromIterator<PlaylistEntry> for PlaylistPage {
    fn from_iter<I: IntoIterator<Item = PlaylistEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
impl PlaylistPage {
    pub fn mock(ids: &[&str]) -> Self {
        ids.iter()
            .map(|id| PlaylistEntry::new(*id, format!("spotify:playlist:{}", id)))
            .collect()
    }
}
