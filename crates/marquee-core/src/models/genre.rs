/// Sentinel genre option that defers to a free-text value.
pub const OTHER_GENRE: &str = "Other";

/// Genres offered by the admin form, in display order. `Other` is last.
pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Horror",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    OTHER_GENRE,
];

/// Genre selection as made on the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Genre {
    #[default]
    Unset,
    Listed(String),
    /// The `Other` option together with its free-text companion field.
    Other(String),
}

impl Genre {
    /// Build from the selector value and the free-text field.
    pub fn from_form(selected: &str, custom: &str) -> Self {
        let selected = selected.trim();
        if selected.is_empty() {
            Self::Unset
        } else if selected.eq_ignore_ascii_case(OTHER_GENRE) {
            Self::Other(custom.trim().to_string())
        } else {
            Self::Listed(selected.to_string())
        }
    }

    /// The value to store, if any. `Other` with a blank companion stores nothing.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::Listed(g) => Some(g.clone()),
            Self::Other(custom) if custom.is_empty() => None,
            Self::Other(custom) => Some(custom.clone()),
        }
    }
}
