use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const CELLS_PER_PAGE: usize = 24;
pub const ROWS: usize = 4;
pub const COLUMNS_PER_ROW: usize = CELLS_PER_PAGE / ROWS;

const _: () = assert!(CELLS_PER_PAGE % ROWS == 0, "grid rows must divide the page");

/// One media outlet in the catalog. `alt` doubles as the media name that
/// subscriptions are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridImage {
    pub id: u32,
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridInfo {
    pub images: Vec<GridImage>,
    pub page: usize,
    pub is_hover: bool,
    pub hover_index: usize,
}

impl GridInfo {
    /// Image shown in `cell` on the current page, if the catalog reaches that far.
    pub fn image_at(&self, cell: usize) -> Option<&GridImage> {
        if cell >= CELLS_PER_PAGE {
            return None;
        }
        let index = self.first_index()?.checked_add(cell)?;
        self.images.get(index)
    }

    /// Slice of the catalog mapped onto the current page. Empty past the end.
    pub fn current_page(&self) -> &[GridImage] {
        let len = self.images.len();
        let first = self.first_index().map_or(len, |first| first.min(len));
        let last = first.saturating_add(CELLS_PER_PAGE).min(len);
        &self.images[first..last]
    }

    fn first_index(&self) -> Option<usize> {
        self.page.checked_mul(CELLS_PER_PAGE)
    }

    pub fn page_count(&self) -> usize {
        self.images.len().div_ceil(CELLS_PER_PAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub grid: GridInfo,
    pub subscriptions: BTreeSet<String>,
    pub catalog: CatalogStatus,
}

impl AppState {
    pub fn with_subscriptions<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subscriptions: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.subscriptions.contains(name)
    }

    /// Media under the pointer, if hovering a populated cell.
    pub fn hovered_media(&self) -> Option<&GridImage> {
        if !self.grid.is_hover {
            return None;
        }
        self.grid.image_at(self.grid.hover_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    InitGridImages { images: Vec<GridImage> },
    TurnOnSubscriptionCover { hovered_cell_index: usize },
    TurnOffSubscriptionCover,
    CatalogFailed { reason: String },
    SetPage { page: usize },
    Subscribe { name: String },
    Unsubscribe { name: String },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::InitGridImages { .. } => "initGridImages",
            Action::TurnOnSubscriptionCover { .. } => "turnOnSubscriptionCover",
            Action::TurnOffSubscriptionCover => "turnOffSubscriptionCover",
            Action::CatalogFailed { .. } => "catalogFailed",
            Action::SetPage { .. } => "setPage",
            Action::Subscribe { .. } => "subscribe",
            Action::Unsubscribe { .. } => "unsubscribe",
        }
    }
}

pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::InitGridImages { images } => {
            state.grid.images = images;
            state.catalog = CatalogStatus::Loaded;
        }
        Action::TurnOnSubscriptionCover { hovered_cell_index } => {
            state.grid.is_hover = true;
            state.grid.hover_index = hovered_cell_index;
        }
        Action::TurnOffSubscriptionCover => {
            state.grid.is_hover = false;
        }
        Action::CatalogFailed { reason } => {
            state.catalog = CatalogStatus::Failed(reason);
        }
        Action::SetPage { page } => {
            state.grid.page = page;
        }
        Action::Subscribe { name } => {
            state.subscriptions.insert(name);
        }
        Action::Unsubscribe { name } => {
            state.subscriptions.remove(&name);
        }
    }
}
