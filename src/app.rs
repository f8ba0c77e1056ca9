use crate::catalog::{LoadError, LookupFailure, MovieRecord};
use crate::prefs::{PreferenceStore, THEME_KEY};
use crate::theme::Theme;
use crate::view::{self, FilterState, FilterTrigger, GENRE_BUTTONS, GenreFilter, Visible};

/// Which view is currently active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Grid,
    Detail,
}

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Progress of the catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading {
        batches_done: usize,
        total_batches: usize,
    },
    Loaded,
    LoadFailed(String),
}

/// Messages sent from the loader task to the UI loop.
#[derive(Debug)]
pub enum LoadEvent {
    /// Accumulated catalog after a batch.
    Progress(Vec<MovieRecord>),
    Finished {
        failures: Vec<LookupFailure>,
        error: Option<LoadError>,
    },
}

pub const CARD_WIDTH: u16 = 30;
pub const CARD_HEIGHT: u16 = 6;

/// Number of card columns that fit in `width`.
pub fn columns_for_width(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub show_help: bool,
    pub input_mode: InputMode,

    pub catalog: Vec<MovieRecord>,
    pub filter: FilterState,
    pub visible: Visible,

    // Grid state
    pub selected: usize, // Index within visible
    pub columns: usize,

    pub detail: Option<MovieRecord>,

    pub load_state: LoadState,
    pub failed_titles: Vec<String>,

    pub theme: Theme,
    prefs: Box<dyn PreferenceStore>,

    pub status_msg: String,
}

impl App {
    /// Build the app and apply the persisted theme.
    pub fn new(prefs: Box<dyn PreferenceStore>, compose_filters: bool) -> Self {
        let theme = Theme::from_stored(prefs.get(THEME_KEY).as_deref());
        let filter = FilterState::new(compose_filters);
        let visible = view::render(&[], &filter);

        Self {
            should_quit: false,
            view: View::Grid,
            show_help: false,
            input_mode: InputMode::Normal,

            catalog: Vec::new(),
            filter,
            visible,

            selected: 0,
            columns: 1,

            detail: None,

            load_state: LoadState::Idle,
            failed_titles: Vec::new(),

            theme,
            prefs,

            status_msg: String::new(),
        }
    }

    pub fn start_loading(&mut self, total_batches: usize) {
        self.load_state = LoadState::Loading {
            batches_done: 0,
            total_batches,
        };
        self.status_msg = "Loading movies...".to_string();
    }

    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(catalog) => self.apply_progress(catalog),
            LoadEvent::Finished { failures, error } => self.finish_load(failures, error),
        }
    }

    /// Replace the catalog with the loader's latest accumulated snapshot.
    pub fn apply_progress(&mut self, catalog: Vec<MovieRecord>) {
        if let LoadState::LoadFailed(_) = self.load_state {
            return;
        }
        self.catalog = catalog;
        if let LoadState::Loading {
            batches_done,
            total_batches,
        } = &mut self.load_state
        {
            *batches_done += 1;
            self.status_msg = format!(
                "Loading movies... batch {}/{} ({} movies)",
                batches_done,
                total_batches,
                self.catalog.len()
            );
        }
        self.refresh();
    }

    pub fn finish_load(&mut self, failures: Vec<LookupFailure>, error: Option<LoadError>) {
        self.failed_titles = failures.into_iter().map(|f| f.title).collect();

        match error {
            Some(error) => {
                log::error!("Catalog load failed: {}", error);
                self.load_state = LoadState::LoadFailed(error.user_message());
                self.catalog.clear();
                self.detail = None;
                self.view = View::Grid;
                self.input_mode = InputMode::Normal;
                self.refresh();
                self.status_msg = error.to_string();
            }
            None => {
                self.load_state = LoadState::Loaded;
                self.status_msg = if self.failed_titles.is_empty() {
                    format!("{} movies loaded", self.catalog.len())
                } else {
                    format!(
                        "{} movies loaded, {} unavailable",
                        self.catalog.len(),
                        self.failed_titles.len()
                    )
                };
            }
        }
    }

    /// True before the first batch has come back.
    pub fn awaiting_first_batch(&self) -> bool {
        match self.load_state {
            LoadState::Idle => true,
            LoadState::Loading { batches_done, .. } => batches_done == 0,
            _ => false,
        }
    }

    /// Search, filter and selection need a catalog that did not fail to load.
    pub fn accepts_catalog_input(&self) -> bool {
        !matches!(self.load_state, LoadState::LoadFailed(_))
    }

    /// Recompute the visible subset and keep the selection inside it.
    pub fn refresh(&mut self) {
        self.visible = view::render(&self.catalog, &self.filter);
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    pub fn select_genre(&mut self, genre: GenreFilter) {
        if !self.accepts_catalog_input() {
            return;
        }
        self.filter.genre = genre;
        self.filter.last_trigger = FilterTrigger::Genre;
        self.selected = 0;
        self.refresh();
    }

    pub fn select_genre_button(&mut self, index: usize) {
        if let Some(label) = GENRE_BUTTONS.get(index) {
            self.select_genre(GenreFilter::from_button(label));
        }
    }

    pub fn cycle_genre(&mut self, forward: bool) {
        let len = GENRE_BUTTONS.len();
        let current = self.filter.genre.button_index().unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.select_genre_button(next);
    }

    pub fn set_search(&mut self, text: String) {
        if !self.accepts_catalog_input() {
            return;
        }
        self.filter.search = text;
        self.filter.last_trigger = FilterTrigger::Search;
        self.selected = 0;
        self.refresh();
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut text = self.filter.search.clone();
        text.push(c);
        self.set_search(text);
    }

    pub fn pop_search_char(&mut self) {
        // Nothing to delete: keep whichever filter is active.
        if self.filter.search.is_empty() {
            return;
        }
        let mut text = self.filter.search.clone();
        text.pop();
        self.set_search(text);
    }

    pub fn start_search(&mut self) {
        if self.accepts_catalog_input() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn selected_record(&self) -> Option<&MovieRecord> {
        self.visible
            .indices()
            .get(self.selected)
            .and_then(|&i| self.catalog.get(i))
    }

    /// Open the detail popup for a record.
    pub fn select_record(&mut self, record: MovieRecord) {
        self.detail = Some(record);
        self.view = View::Detail;
    }

    pub fn open_selected(&mut self) {
        if !self.accepts_catalog_input() {
            return;
        }
        if let Some(record) = self.selected_record().cloned() {
            self.select_record(record);
        }
    }

    pub fn dismiss_detail(&mut self) {
        self.detail = None;
        self.view = View::Grid;
    }

    /// Flip the theme and persist it. The new theme applies even if saving fails.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        match self.prefs.set(THEME_KEY, self.theme.as_str()) {
            Ok(()) => {
                self.status_msg = format!("Switched to {} mode", self.theme.as_str());
            }
            Err(e) => {
                log::warn!("Could not persist theme: {}", e);
                self.status_msg = e.user_message();
            }
        }
    }

    pub fn update_columns(&mut self, width: u16) {
        self.columns = columns_for_width(width);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if self.selected + self.columns < self.visible.len() {
            self.selected += self.columns;
        }
    }

    pub fn select_up(&mut self) {
        if self.selected >= self.columns {
            self.selected -= self.columns;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }
}
