use antpath_core::{
    ActionCatalog, GameField, ObstacleSet, Position, Settings, Verdict, check, check_answer,
    field::FieldError,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

const STEP_RIGHT: (i32, i32) = (1, 0);
const STEP_LEFT: (i32, i32) = (-1, 0);
const STEP_DOWN: (i32, i32) = (0, 1);

fn field(width: i32, height: i32, start: (i32, i32), end: (i32, i32)) -> GameField {
    GameField::new(width, height, start.into(), end.into()).unwrap()
}

fn random_field(rng: &mut StdRng) -> (GameField, ObstacleSet) {
    let width = rng.random_range(1..=8);
    let height = rng.random_range(1..=8);
    let start = Position::new(rng.random_range(1..=width), rng.random_range(1..=height));
    let end = Position::new(rng.random_range(1..=width), rng.random_range(1..=height));
    let field = GameField::new(width, height, start, end).unwrap();
    let obstacles = (0..rng.random_range(0..6))
        .map(|_| Position::new(rng.random_range(1..=width), rng.random_range(1..=height)))
        .filter(|&p| p != start)
        .collect();
    (field, obstacles)
}

fn random_actions(rng: &mut StdRng) -> Vec<(i32, i32)> {
    (0..rng.random_range(0..12))
        .map(|_| (rng.random_range(-2..=2), rng.random_range(-2..=2)))
        .collect()
}

/// Independent walk used to cross-check verdicts: returns every landed cell.
fn landed_cells(start: Position, actions: &[(i32, i32)]) -> Vec<Position> {
    actions
        .iter()
        .scan(start, |pos, &(dx, dy)| {
            *pos = Position::new(pos.x + dx, pos.y + dy);
            Some(*pos)
        })
        .collect()
}

#[test]
fn scenario_path_reaches_end() {
    let verdict = check(
        [STEP_RIGHT, STEP_RIGHT, STEP_DOWN, STEP_DOWN],
        &field(5, 5, (1, 1), (3, 3)),
        &ObstacleSet::new(),
    );
    assert_eq!(verdict, Verdict::Success);
}

#[test]
fn scenario_one_action_short() {
    let verdict = check(
        [STEP_RIGHT, STEP_RIGHT, STEP_DOWN],
        &field(5, 5, (1, 1), (3, 3)),
        &ObstacleSet::new(),
    );
    assert!(!verdict.is_success());
}

#[test]
fn scenario_obstacle_on_end_cell() {
    let obstacles: ObstacleSet = [Position::new(2, 1)].into_iter().collect();
    let verdict = check([STEP_RIGHT], &field(5, 5, (1, 1), (2, 1)), &obstacles);
    assert!(matches!(verdict, Verdict::Collision { .. }));
}

#[test]
fn scenario_step_left_off_the_field() {
    let verdict = check([STEP_LEFT], &field(5, 5, (1, 1), (3, 3)), &ObstacleSet::new());
    assert_eq!(
        verdict,
        Verdict::OutOfBounds {
            step: 0,
            position: Position::new(0, 1)
        }
    );
}

#[test]
fn scenario_ids_through_default_catalog() {
    let catalog = Settings::default().catalog().unwrap();
    let field = field(5, 5, (1, 1), (3, 3));
    assert_eq!(
        check_answer(&[1, 1, 4, 4], &catalog, &field, &ObstacleSet::new()).unwrap(),
        Verdict::Success
    );
}

#[test]
fn malformed_field_is_an_error_not_a_verdict() {
    let err = GameField::new(-1, 5, Position::new(1, 1), Position::new(2, 2)).unwrap_err();
    assert!(matches!(err, FieldError::NonPositiveSize { .. }));
}

#[test]
fn empty_answer_on_start_succeeds_everywhere() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let (field, obstacles) = random_field(&mut rng);
        let same = GameField::new(field.width(), field.height(), field.start(), field.start()).unwrap();
        assert_eq!(check(Vec::<(i32, i32)>::new(), &same, &obstacles), Verdict::Success);
    }
}

#[test]
fn verdicts_agree_with_an_independent_walk() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..2000 {
        let (field, obstacles) = random_field(&mut rng);
        let actions = random_actions(&mut rng);
        let verdict = check(&actions, &field, &obstacles);

        let cells = landed_cells(field.start(), &actions);
        let first_bad = cells
            .iter()
            .position(|&p| !field.contains(p) || obstacles.contains(p));

        match first_bad {
            Some(step) => {
                assert_eq!(verdict.failed_step(), Some(step), "{:?} {:?}", actions, verdict);
                let position = cells[step];
                if field.contains(position) {
                    assert_eq!(verdict, Verdict::Collision { step, position });
                } else {
                    assert_eq!(verdict, Verdict::OutOfBounds { step, position });
                }
            }
            None => {
                let last = cells.last().copied().unwrap_or(field.start());
                assert_eq!(verdict.is_success(), last == field.end());
            }
        }
    }
}

#[test]
fn checking_twice_gives_the_same_verdict() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..500 {
        let (field, obstacles) = random_field(&mut rng);
        let actions = random_actions(&mut rng);
        assert_eq!(check(&actions, &field, &obstacles), check(&actions, &field, &obstacles));
    }
}

#[test]
fn actions_after_a_collision_are_not_evaluated() {
    let catalog = ActionCatalog::canonical();
    let field = field(5, 5, (1, 1), (3, 3));
    let obstacles: ObstacleSet = [Position::new(2, 1)].into_iter().collect();
    // 1000 is unknown; reaching it would be an error
    let verdict = check_answer(&[1, 1000], &catalog, &field, &obstacles).unwrap();
    assert_eq!(
        verdict,
        Verdict::Collision {
            step: 0,
            position: Position::new(2, 1)
        }
    );
}

#[test]
fn solver_answers_always_pass() {
    let mut rng = StdRng::seed_from_u64(11);
    let catalog = ActionCatalog::canonical();
    for _ in 0..300 {
        let (field, obstacles) = random_field(&mut rng);
        if let Some(answer) = antpath_core::solver::solve(&field, &obstacles, &catalog) {
            let verdict = check_answer(&answer, &catalog, &field, &obstacles).unwrap();
            assert_eq!(verdict, Verdict::Success, "{:?}", answer);
        }
    }
}
