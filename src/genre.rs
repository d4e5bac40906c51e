use strsim::jaro_winkler;

const FUZZY_THRESHOLD: f64 = 0.85;

/// A Spotify browse category offered as a genre choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub id: &'static str,
    pub name: &'static str,
}

pub const GENRES: &[Genre] = &[
    Genre { id: "pop", name: "Pop" },
    Genre { id: "hiphop", name: "Hip-Hop" },
    Genre { id: "rock", name: "Rock" },
    Genre { id: "jazz", name: "Jazz" },
    Genre { id: "chill", name: "Chill" },
    Genre { id: "indie_alt", name: "Indie" },
    Genre { id: "edm_dance", name: "Electronic/Dance" },
    Genre { id: "rnb", name: "R&B" },
    Genre { id: "soul", name: "Soul" },
    Genre { id: "blues", name: "Blues" },
    Genre { id: "funk", name: "Funk" },
    Genre { id: "country", name: "Country" },
    Genre { id: "classical", name: "Classical" },
    Genre { id: "latin", name: "Latin" },
    Genre { id: "reggae", name: "Reggae" },
    Genre { id: "punk", name: "Punk" },
    Genre { id: "metal", name: "Metal" },
    Genre { id: "folk_americana", name: "Folk & Acoustic" },
    Genre { id: "focus", name: "Focus" },
    Genre { id: "sleep", name: "Sleep" },
    Genre { id: "party", name: "Party" },
    Genre { id: "workout", name: "Workout" },
    Genre { id: "romance", name: "Romance" },
];

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Spotify category ids are lowercase ASCII words joined by underscores.
fn is_category_id(input: &str) -> bool {
    !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Find the catalogue genre for user input: exact on id or name, ignoring
/// case and punctuation, then the closest Jaro-Winkler match above 0.85.
///
/// Input already shaped like a category id only matches exactly, so real
/// categories outside the catalogue (`kpop`, `metalcore`) are left alone.
/// Fuzzy candidates must share the first letter of the input.
pub fn resolve_genre(input: &str) -> Option<&'static Genre> {
    let key = normalize(input);
    if key.is_empty() {
        return None;
    }

    if let Some(genre) = GENRES
        .iter()
        .find(|g| normalize(g.id) == key || normalize(g.name) == key)
    {
        return Some(genre);
    }

    if is_category_id(input.trim()) {
        return None;
    }

    let mut best: Option<&'static Genre> = None;
    let mut best_score = 0.0;

    for genre in GENRES {
        let name = normalize(genre.name);
        if name.chars().next() != key.chars().next() {
            continue;
        }

        let score = jaro_winkler(&key, &name);
        if score >= FUZZY_THRESHOLD && score > best_score {
            best_score = score;
            best = Some(genre);
        }
    }

    best
}

/// Category id to query for the input. Unknown genres pass through trimmed
/// and lowercased so any Spotify category can still be requested.
pub fn normalize_genre(input: &str) -> String {
    match resolve_genre(input) {
        Some(genre) => genre.id.to_string(),
        None => input.trim().to_lowercase(),
    }
}
