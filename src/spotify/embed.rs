pub const SPOTIFY_EMBED_BASE: &str = "https://open.spotify.com/embed";

/// Player URL for a playlist URI such as `spotify:playlist:37i9dQZF1DX4sWSpwq3LiO`.
pub fn embed_url(uri: &str, theme: &str) -> String {
    format!(
        "{}?uri={}&theme={}",
        SPOTIFY_EMBED_BASE,
        uri.replace(':', "%3A"),
        urlencoding::encode(theme)
    )
}
