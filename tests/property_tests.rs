//! Property tests for dealing and the round controller.

use proptest::prelude::*;

use flip_match::round::pair_counts;
use flip_match::{
    deal, CardFace, CardId, ConfigError, Difficulty, Driver, GameConfig, GameRng, GridSize, Outcome,
    Session, DEFAULT_FACE_POOL,
};

#[derive(Clone, Debug)]
enum Action {
    Click(u16),
    Advance(u64),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u16..32).prop_map(Action::Click),
        (0u64..1500).prop_map(Action::Advance),
    ]
}

fn even_grid() -> impl Strategy<Value = GridSize> {
    (1u16..=6, 1u16..=6)
        .prop_filter("even total", |(c, r)| (c * r) % 2 == 0)
        .prop_map(|(c, r)| GridSize::new(c, r))
}

proptest! {
    #[test]
    fn prop_deal_pairs_every_key(grid in even_grid(), seed in any::<u64>()) {
        let cards = deal(grid, DEFAULT_FACE_POOL, &GameRng::new(seed)).unwrap();
        let counts = pair_counts(&cards);

        prop_assert_eq!(cards.len(), grid.total());
        prop_assert_eq!(counts.len(), grid.total() / 2);
        prop_assert!(counts.values().all(|&n| n == 2));
        prop_assert!(cards.iter().all(|c| c.face == CardFace::FaceDown));
    }

    #[test]
    fn prop_odd_grids_rejected(c in 1u16..=9, r in 1u16..=9) {
        prop_assume!((c * r) % 2 == 1);
        let result = Session::start(GameConfig::new().with_grid(GridSize::new(c, r)), 0);
        let is_odd_count = matches!(result, Err(ConfigError::OddCardCount { .. }));
        prop_assert!(is_odd_count);
    }

    #[test]
    fn prop_round_invariants(
        level in 0usize..4,
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..200),
    ) {
        let config = GameConfig::new()
            .with_difficulty(Difficulty::ALL[level])
            .with_seed(seed);
        let mut driver = Driver::new(config).unwrap();

        for action in actions {
            match action {
                Action::Click(id) => {
                    let card = CardId::new(id);
                    let before = driver.session().round().clone();
                    let revealed = before
                        .card(card)
                        .is_some_and(|c| c.face != CardFace::FaceDown);

                    let outcome = driver.click(card);

                    if revealed {
                        // Clicking a face-up or matched card changes nothing.
                        prop_assert!(!outcome.is_applied());
                        prop_assert_eq!(driver.session().round(), &before);
                    }
                    if let Outcome::Applied = outcome {
                        prop_assert_eq!(driver.session().round().clicks(), before.clicks() + 1);
                    } else {
                        prop_assert_eq!(driver.session().round().clicks(), before.clicks());
                    }
                }
                Action::Advance(ms) => driver.advance(ms),
            }

            let round = driver.session().round();
            prop_assert!(round.face_up_count() <= 2);
            prop_assert!(round.matched_pairs() * 2 <= round.cards().len() as u32);
            let matched = round.cards().iter().filter(|c| c.is_matched()).count() as u32;
            prop_assert_eq!(matched, round.matched_pairs() * 2);
        }
    }
}
