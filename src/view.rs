use crate::catalog::MovieRecord;

/// Genre buttons offered in the header, in display order.
pub const GENRE_BUTTONS: [&str; 5] = ["All", "Action", "Drama", "Adventure", "Animation"];

/// Genre selection. `All` lets every record through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Genre(String),
}

impl GenreFilter {
    pub fn from_button(label: &str) -> Self {
        if label == "All" {
            GenreFilter::All
        } else {
            GenreFilter::Genre(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GenreFilter::All => "All",
            GenreFilter::Genre(genre) => genre,
        }
    }

    /// Position in [`GENRE_BUTTONS`], if this is one of the buttons.
    pub fn button_index(&self) -> Option<usize> {
        GENRE_BUTTONS.iter().position(|b| *b == self.label())
    }

    /// Exact, case-sensitive match on the primary genre.
    pub fn matches(&self, record: &MovieRecord) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Genre(genre) => record.genre == *genre,
        }
    }
}

/// Case-insensitive substring match on title or description.
pub fn matches_search(record: &MovieRecord, text: &str) -> bool {
    let query = text.to_lowercase();
    record.title.to_lowercase().contains(&query)
        || record.description.to_lowercase().contains(&query)
}

/// Which input last changed the visible subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTrigger {
    #[default]
    Genre,
    Search,
}

/// Transient genre + search selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub genre: GenreFilter,
    pub search: String,
    pub last_trigger: FilterTrigger,
    /// AND both predicates instead of honoring only the last trigger.
    pub compose: bool,
}

impl FilterState {
    pub fn new(compose: bool) -> Self {
        Self {
            compose,
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &MovieRecord) -> bool {
        if self.compose {
            return self.genre.matches(record) && matches_search(record, &self.search);
        }
        match self.last_trigger {
            FilterTrigger::Genre => self.genre.matches(record),
            FilterTrigger::Search => matches_search(record, &self.search),
        }
    }

    /// What the "no results" placeholder names.
    pub fn label(&self) -> String {
        let search_active = !self.search.is_empty()
            && (self.compose || self.last_trigger == FilterTrigger::Search);
        let genre_active = self.compose || self.last_trigger == FilterTrigger::Genre;

        match (genre_active && self.genre != GenreFilter::All, search_active) {
            (true, true) => format!("{} + {}", self.genre.label(), self.search),
            (false, true) => self.search.clone(),
            _ => self.genre.label().to_string(),
        }
    }
}

/// The visible part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visible {
    /// Indices into the catalog, in catalog order.
    Cards(Vec<usize>),
    NoResults { label: String },
}

impl Visible {
    pub fn indices(&self) -> &[usize] {
        match self {
            Visible::Cards(indices) => indices.as_slice(),
            Visible::NoResults { .. } => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices().is_empty()
    }
}

/// Compute the visible subset for a catalog and filter.
pub fn render(catalog: &[MovieRecord], filter: &FilterState) -> Visible {
    let indices: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        Visible::NoResults {
            label: filter.label(),
        }
    } else {
        Visible::Cards(indices)
    }
}
