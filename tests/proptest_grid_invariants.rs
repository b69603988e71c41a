//! Property tests for the shuffle and the grid's render invariants:
//!
//! 1. Shuffling preserves length and multiset.
//! 2. The overlay sits in at most one cell after any action sequence.
//! 3. Visible cells always mirror the current page slice.
//! 4. Re-rendering an identical state writes nothing.

use newsstand_grid::data::shuffled;
use newsstand_grid::grid::{GridView, StaleCells};
use newsstand_grid::state::{reduce, Action, AppState, GridImage, CELLS_PER_PAGE};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn catalog(len: usize) -> Vec<GridImage> {
    (0..len as u32)
        .map(|id| GridImage {
            id,
            src: format!("{id}.png"),
            alt: format!("M{id}"),
        })
        .collect()
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..30).prop_map(|i| Action::TurnOnSubscriptionCover {
            hovered_cell_index: i
        }),
        Just(Action::TurnOffSubscriptionCover),
        (0usize..4).prop_map(|page| Action::SetPage { page }),
        (0usize..60).prop_map(|i| Action::Subscribe {
            name: format!("M{i}")
        }),
        (0usize..60).prop_map(|i| Action::Unsubscribe {
            name: format!("M{i}")
        }),
    ]
}

proptest! {
    #[test]
    fn shuffle_preserves_multiset(items in proptest::collection::vec(0u8..8, 0..64), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = shuffled(&items, &mut rng);
        prop_assert_eq!(out.len(), items.len());
        let mut a = items.clone();
        let mut b = out;
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn overlay_exclusive_and_pages_consistent(
        len in 0usize..80,
        actions in proptest::collection::vec(action_strategy(), 0..40),
    ) {
        let mut state = AppState::default();
        let mut view = GridView::new(&state, StaleCells::Clear);
        reduce(&mut state, Action::InitGridImages { images: catalog(len) });
        view.update_view(&state);

        for action in actions {
            reduce(&mut state, action);
            view.update_view(&state);

            let holders: Vec<_> = view.cells().iter().filter(|c| c.holds_overlay()).collect();
            prop_assert!(holders.len() <= 1);
            prop_assert_eq!(holders.first().map(|c| c.index()), view.overlay_owner());
            if !state.grid.is_hover {
                prop_assert!(holders.is_empty());
            }

            let page = state.grid.current_page();
            for j in 0..CELLS_PER_PAGE {
                let logo = view.cell(j).unwrap().logo();
                match page.get(j) {
                    Some(image) => prop_assert_eq!(logo.id, Some(image.id)),
                    None => prop_assert!(logo.is_empty()),
                }
            }

            let before = view.mutation_count();
            let rendered = view.update_view(&state);
            prop_assert!(!rendered.any());
            prop_assert_eq!(view.mutation_count(), before);
        }
    }
}
