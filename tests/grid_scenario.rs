use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use newsstand_grid::data::ImageSource;
use newsstand_grid::dispatcher::Dispatcher;
use newsstand_grid::grid::{GridHandle, GridOptions, PointerEvent, PointerTarget};
use newsstand_grid::state::{Action, AppState, CatalogStatus, GridImage, CELLS_PER_PAGE};
use parking_lot::Mutex;

const WAIT: Duration = Duration::from_secs(5);

struct ThirtyOutlets;

impl ImageSource for ThirtyOutlets {
    fn load_images(&self) -> Result<Vec<GridImage>> {
        let mut images = vec![GridImage {
            id: 1,
            src: "a.png".into(),
            alt: "A".into(),
        }];
        images.extend((2..=30).map(|id| GridImage {
            id,
            src: "z.png".into(),
            alt: format!("Z{id}"),
        }));
        Ok(images)
    }
}

struct Offline;

impl ImageSource for Offline {
    fn load_images(&self) -> Result<Vec<GridImage>> {
        Err(anyhow!("connection refused"))
    }
}

fn sorted_ids(images: &[GridImage]) -> Vec<u32> {
    let mut ids: Vec<u32> = images.iter().map(|img| img.id).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn loads_shuffled_catalog_and_pages_through_it() {
    let dispatcher = Dispatcher::new(AppState::default());
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let sink = dispatched.clone();
    let _probe = dispatcher.subscribe(move |state| sink.lock().push(state.grid.images.clone()));

    let mut grid = GridHandle::mount(&dispatcher, Arc::new(ThirtyOutlets), GridOptions::default());
    assert!(grid.view().cells().iter().all(|cell| cell.logo().is_empty()));
    assert_eq!(grid.catalog_status(), CatalogStatus::Loading);

    assert!(grid.wait_for_images(WAIT));
    assert_eq!(grid.catalog_status(), CatalogStatus::Loaded);

    let images = dispatcher.state().grid.images;
    assert_eq!(sorted_ids(&images), (1..=30).collect::<Vec<_>>());
    assert_eq!(dispatched.lock().len(), 1);
    assert_eq!(dispatched.lock()[0], images);

    {
        let view = grid.view();
        for (j, cell) in view.cells().iter().enumerate() {
            assert_eq!(cell.logo().id, Some(images[j].id));
        }
        let shown: Vec<_> = view.cells().iter().filter_map(|c| c.logo().id).collect();
        for hidden in &images[CELLS_PER_PAGE..] {
            assert!(!shown.contains(&hidden.id));
        }
    }

    dispatcher.dispatch(Action::SetPage { page: 1 });
    let view = grid.view();
    for (j, image) in images[CELLS_PER_PAGE..].iter().enumerate() {
        assert_eq!(view.cell(j).unwrap().logo().alt, image.alt);
    }
}

#[test]
fn pointer_events_round_trip_through_dispatcher() {
    let dispatcher = Dispatcher::new(AppState::with_subscriptions(["A"]));
    let mut grid = GridHandle::mount(&dispatcher, Arc::new(ThirtyOutlets), GridOptions::default());
    assert!(grid.wait_for_images(WAIT));

    let images = dispatcher.state().grid.images;
    let a_cell = images.iter().position(|img| img.alt == "A").unwrap() % CELLS_PER_PAGE;
    let page = images.iter().position(|img| img.alt == "A").unwrap() / CELLS_PER_PAGE;
    dispatcher.dispatch(Action::SetPage { page });

    assert!(grid.handle_pointer(PointerEvent::Over(PointerTarget::Cell(a_cell))));
    {
        let view = grid.view();
        assert_eq!(view.overlay_owner(), Some(a_cell));
        assert_eq!(view.overlay().media_name(), "A");
        assert!(view.overlay().is_subscribed());
    }

    assert!(!grid.handle_pointer(PointerEvent::Over(PointerTarget::Overlay)));
    assert_eq!(grid.view().overlay_owner(), Some(a_cell));

    dispatcher.dispatch(Action::Unsubscribe { name: "A".into() });
    assert!(!grid.view().overlay().is_subscribed());

    assert!(grid.handle_pointer(PointerEvent::Leave));
    assert_eq!(grid.view().overlay_owner(), None);
    assert!(grid.view().cells().iter().all(|cell| !cell.holds_overlay()));
}

#[test]
fn sibling_mutations_reach_the_grid() {
    let dispatcher = Dispatcher::new(AppState::default());
    let mut grid = GridHandle::mount(&dispatcher, Arc::new(ThirtyOutlets), GridOptions::default());
    assert!(grid.wait_for_images(WAIT));

    dispatcher.dispatch(Action::TurnOnSubscriptionCover {
        hovered_cell_index: 0,
    });
    let name = grid.view().overlay().media_name().to_string();
    assert!(!grid.view().overlay().is_subscribed());

    let sibling = dispatcher.clone();
    sibling.dispatch(Action::Subscribe { name });
    assert!(grid.view().overlay().is_subscribed());
}

#[test]
fn failed_source_leaves_grid_empty() {
    let dispatcher = Dispatcher::new(AppState::default());
    let mut grid = GridHandle::mount(&dispatcher, Arc::new(Offline), GridOptions::default());
    assert!(grid.wait_for_images(WAIT));

    match dispatcher.state().catalog {
        CatalogStatus::Failed(reason) => assert!(reason.contains("connection refused")),
        other => panic!("unexpected status {other:?}"),
    }
    assert!(grid.view().cells().iter().all(|cell| cell.logo().is_empty()));
    assert!(!grid.poll_images());
}

#[test]
fn dropping_the_handle_unsubscribes() {
    let dispatcher = Dispatcher::new(AppState::default());
    let grid = GridHandle::mount(&dispatcher, Arc::new(ThirtyOutlets), GridOptions::default());
    assert_eq!(dispatcher.listener_count(), 1);
    drop(grid);
    assert_eq!(dispatcher.listener_count(), 0);
    dispatcher.dispatch(Action::TurnOffSubscriptionCover);
}
