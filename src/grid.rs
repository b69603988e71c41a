use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::data::ImageSource;
use crate::dispatcher::{Dispatcher, Subscription};
use crate::loader::{ImageLoader, LoaderOptions};
use crate::overlay::SubscriptionOverlay;
use crate::state::{Action, AppState, CatalogStatus, GridImage, GridInfo, CELLS_PER_PAGE, COLUMNS_PER_ROW};

/// What a cell's logo node currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaLogo {
    pub src: String,
    pub alt: String,
    pub id: Option<u32>,
}

impl MediaLogo {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.src.is_empty() && self.alt.is_empty()
    }
}

impl From<&GridImage> for MediaLogo {
    fn from(image: &GridImage) -> Self {
        Self {
            src: image.src.clone(),
            alt: image.alt.clone(),
            id: Some(image.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CellNode {
    index: usize,
    logo: MediaLogo,
    holds_overlay: bool,
}

impl CellNode {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn logo(&self) -> &MediaLogo {
        &self.logo
    }

    pub fn holds_overlay(&self) -> bool {
        self.holds_overlay
    }
}

/// What happens to cells past the end of a short page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleCells {
    #[default]
    Clear,
    Keep,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GridOptions {
    pub stale_cells: StaleCells,
    pub loader: LoaderOptions,
}

/// Resolved element under the pointer, inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Cell(usize),
    Overlay,
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Over(PointerTarget),
    Leave,
}

/// Which axes an `update_view` call re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rendered {
    pub overlay: bool,
    pub content: bool,
}

impl Rendered {
    pub fn any(&self) -> bool {
        self.overlay || self.content
    }
}

pub struct GridView {
    cells: Vec<CellNode>,
    overlay: SubscriptionOverlay,
    overlay_owner: Option<usize>,
    props: AppState,
    stale_cells: StaleCells,
    mutations: u64,
}

impl GridView {
    /// Builds the blank grid and renders `initial` onto it.
    pub fn new(initial: &AppState, stale_cells: StaleCells) -> Self {
        let cells = (0..CELLS_PER_PAGE)
            .map(|index| CellNode {
                index,
                logo: MediaLogo::default(),
                holds_overlay: false,
            })
            .collect();
        let mut view = Self {
            cells,
            overlay: SubscriptionOverlay::new(),
            overlay_owner: None,
            props: AppState::default(),
            stale_cells,
            mutations: 0,
        };
        view.update_view(initial);
        view
    }

    pub fn cells(&self) -> &[CellNode] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&CellNode> {
        self.cells.get(index)
    }

    /// Cells grouped row-major into rows of `COLUMNS_PER_ROW`.
    pub fn rows(&self) -> impl Iterator<Item = &[CellNode]> {
        self.cells.chunks(COLUMNS_PER_ROW)
    }

    pub fn overlay(&self) -> &SubscriptionOverlay {
        &self.overlay
    }

    pub fn overlay_owner(&self) -> Option<usize> {
        self.overlay_owner
    }

    /// Total number of writes made to cells and the overlay since construction.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// The last state this view rendered.
    pub fn snapshot(&self) -> &AppState {
        &self.props
    }

    pub fn update_view(&mut self, state: &AppState) -> Rendered {
        let prev = &self.props;
        let rendered = Rendered {
            overlay: prev.grid.is_hover != state.grid.is_hover
                || prev.grid.hover_index != state.grid.hover_index
                || prev.subscriptions != state.subscriptions,
            content: prev.grid.page != state.grid.page
                || prev.grid.images.len() != state.grid.images.len(),
        };

        if rendered.overlay {
            debug!(
                hover = state.grid.is_hover,
                index = state.grid.hover_index,
                "render subscription overlay"
            );
            self.render_subscription_cover(state);
        }
        if rendered.content {
            debug!(
                page = state.grid.page,
                images = state.grid.images.len(),
                "render page"
            );
            self.render_current_page(&state.grid);
        }

        self.props = state.clone();
        rendered
    }

    /// Turns a pointer event into the action it should dispatch, if any.
    /// Events over the overlay or between cells dispatch nothing.
    pub fn translate(&self, event: PointerEvent) -> Option<Action> {
        match event {
            PointerEvent::Over(PointerTarget::Cell(index)) if index < self.cells.len() => {
                Some(Action::TurnOnSubscriptionCover {
                    hovered_cell_index: index,
                })
            }
            PointerEvent::Over(_) => None,
            PointerEvent::Leave => Some(Action::TurnOffSubscriptionCover),
        }
    }

    fn render_subscription_cover(&mut self, state: &AppState) {
        let grid = &state.grid;
        for index in 0..self.cells.len() {
            if grid.is_hover && grid.hover_index == index {
                // A hovered cell with nothing in it shows no overlay.
                if let Some(media) = grid.image_at(index) {
                    let subscribed = state.is_subscribed(&media.alt);
                    if self.overlay.update_view(&media.alt, subscribed) {
                        self.mutations += 1;
                    }
                    self.attach_overlay(index);
                    continue;
                }
            }
            if self.cells[index].holds_overlay {
                self.detach_overlay(index);
            }
        }
    }

    fn attach_overlay(&mut self, index: usize) {
        if self.overlay_owner == Some(index) {
            return;
        }
        if let Some(cell) = self
            .overlay_owner
            .and_then(|previous| self.cells.get_mut(previous))
        {
            cell.holds_overlay = false;
        }
        let Some(cell) = self.cells.get_mut(index) else {
            self.overlay_owner = None;
            return;
        };
        cell.holds_overlay = true;
        self.overlay_owner = Some(index);
        self.mutations += 1;
    }

    fn detach_overlay(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.holds_overlay = false;
        }
        if self.overlay_owner == Some(index) {
            self.overlay_owner = None;
        }
        self.mutations += 1;
    }

    fn render_current_page(&mut self, grid: &GridInfo) {
        let page = grid.current_page();
        for (cell, image) in self.cells.iter_mut().zip(page) {
            cell.logo = MediaLogo::from(image);
            self.mutations += 1;
        }

        if self.stale_cells == StaleCells::Clear {
            for cell in self.cells.iter_mut().skip(page.len()) {
                if !cell.logo.is_empty() {
                    cell.logo = MediaLogo::default();
                    self.mutations += 1;
                }
            }
        }
    }
}

/// A `GridView` mounted on a dispatcher: it re-renders on every dispatch
/// until the handle is dropped, and owns the catalog loader.
pub struct GridHandle {
    view: Arc<Mutex<GridView>>,
    dispatcher: Dispatcher,
    loader: ImageLoader,
    _subscription: Subscription,
}

impl GridHandle {
    pub fn mount(
        dispatcher: &Dispatcher,
        source: Arc<dyn ImageSource>,
        options: GridOptions,
    ) -> Self {
        let view = Arc::new(Mutex::new(GridView::new(
            &dispatcher.state(),
            options.stale_cells,
        )));
        let loader = ImageLoader::spawn(source, options.loader);

        let listener_view = view.clone();
        let subscription = dispatcher.subscribe(move |state| {
            listener_view.lock().update_view(state);
        });

        Self {
            view,
            dispatcher: dispatcher.clone(),
            loader,
            _subscription: subscription,
        }
    }

    pub fn view(&self) -> MutexGuard<'_, GridView> {
        self.view.lock()
    }

    /// Translates and dispatches a pointer event. Returns whether anything
    /// was dispatched.
    pub fn handle_pointer(&self, event: PointerEvent) -> bool {
        let action = self.view.lock().translate(event);
        match action {
            Some(action) => {
                self.dispatcher.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Dispatches the loader's result if it has arrived.
    pub fn poll_images(&mut self) -> bool {
        match self.loader.try_complete() {
            Some(action) => {
                self.dispatcher.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Blocks up to `timeout` for the loader, then dispatches its result.
    pub fn wait_for_images(&mut self, timeout: Duration) -> bool {
        match self.loader.wait(timeout) {
            Some(action) => {
                self.dispatcher.dispatch(action);
                true
            }
            None => false,
        }
    }

    pub fn catalog_status(&self) -> CatalogStatus {
        self.view.lock().snapshot().catalog.clone()
    }
}
