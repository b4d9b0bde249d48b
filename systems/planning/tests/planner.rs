use std::collections::BTreeMap;

use colored_trails_core::{
    Agent, AgentId, Color, GridBounds, PlannerTuning, PlanningMode, Position, TileMap,
    TokenBundle, TokenSnapshot, SCARCITY_SENTINEL,
};
use colored_trails_system_planning::{compute_needs, PathPlanner};
use colored_trails_world::{query, World};

fn snapshot_with_scarcity(entries: &[(Color, f64)]) -> TokenSnapshot {
    TokenSnapshot {
        scarcity: entries.iter().copied().collect::<BTreeMap<_, _>>(),
        ..TokenSnapshot::default()
    }
}

fn agent(position: Position, goal: Position, tokens: &[(Color, u32)]) -> Agent {
    Agent::new(
        AgentId::new(1),
        position,
        goal,
        tokens.iter().copied().collect(),
    )
}

fn planner(mode: PlanningMode) -> PathPlanner {
    PathPlanner::new(PlannerTuning {
        mode,
        ..PlannerTuning::default()
    })
}

#[test]
fn scarce_color_is_avoided_when_an_equal_length_route_exists() {
    // Without weights the lexicographic tie-break walks through (0, 1).
    let world = World::new(
        TileMap::from_rows(&[
            vec![Color::Red, Color::Red],
            vec![Color::Blue, Color::Red],
        ])
        .expect("rectangular"),
        Position::new(1, 1),
    )
    .expect("valid world");
    let walker = agent(
        Position::new(0, 0),
        query::goal(&world),
        &[(Color::Red, 2), (Color::Blue, 2)],
    );
    let scarcity = snapshot_with_scarcity(&[(Color::Blue, SCARCITY_SENTINEL)]);

    let plain = planner(PlanningMode::Shortest)
        .plan(&walker, query::tile_map(&world), &scarcity)
        .expect("valid world");
    assert_eq!(plain.next_step(), Some(Position::new(0, 1)));

    let aware = planner(PlanningMode::ScarcityAware)
        .plan(&walker, query::tile_map(&world), &scarcity)
        .expect("valid world");
    assert_eq!(
        aware.cells(),
        &[Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)]
    );
}

#[test]
fn scarce_color_is_crossed_when_it_is_the_only_bridge() {
    let world = World::new(
        TileMap::from_rows(&[vec![Color::Red, Color::Blue, Color::Red]]).expect("rectangular"),
        Position::new(2, 0),
    )
    .expect("valid world");
    let walker = agent(Position::new(0, 0), query::goal(&world), &[(Color::Red, 1)]);
    let scarcity = snapshot_with_scarcity(&[(Color::Blue, SCARCITY_SENTINEL)]);

    let path = planner(PlanningMode::ScarcityAware)
        .plan(&walker, query::tile_map(&world), &scarcity)
        .expect("valid world");
    assert_eq!(
        path.cells(),
        &[Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]
    );
}

#[test]
fn unaffordable_search_falls_back_to_plain_shortest_path() {
    let world = World::new(
        TileMap::from_rows(&[vec![Color::Red, Color::Blue, Color::Red]]).expect("rectangular"),
        Position::new(2, 0),
    )
    .expect("valid world");
    let walker = agent(Position::new(0, 0), query::goal(&world), &[(Color::Red, 1)]);
    let strict = PathPlanner::new(PlannerTuning {
        avoid_unaffordable: true,
        ..PlannerTuning::default()
    });

    let path = strict
        .plan(&walker, query::tile_map(&world), &TokenSnapshot::default())
        .expect("valid world");
    assert_eq!(path.step_count(), 2);
    assert_eq!(path.origin(), Some(walker.position()));
}

#[test]
fn planned_path_starts_at_the_agent_position() {
    let world = World::generate(
        GridBounds::new(7, 5),
        &[Color::Green, Color::Yellow, Color::Purple, Color::Grey],
        11,
        Position::new(6, 4),
    )
    .expect("valid world");
    let walker = agent(Position::new(0, 2), query::goal(&world), &[(Color::Green, 2)]);

    for mode in [
        PlanningMode::Shortest,
        PlanningMode::ScarcityAware,
        PlanningMode::MultiPath,
    ] {
        let path = planner(mode)
            .plan(&walker, query::tile_map(&world), &TokenSnapshot::default())
            .expect("valid world");
        assert_eq!(path.origin(), Some(walker.position()), "{mode:?}");
        assert_eq!(path.destination(), Some(query::goal(&world)), "{mode:?}");
        for pair in path.cells().windows(2) {
            assert!(pair[0].is_adjacent_to(pair[1]), "{mode:?} path is not contiguous");
        }
    }
}

#[test]
fn multi_path_prefers_the_route_the_agent_can_pay_for() {
    // Top row is blue, everything else green; the agent only holds green.
    let world = World::new(
        TileMap::from_fn(GridBounds::new(3, 3), |cell| {
            if cell.row() == 0 {
                Color::Blue
            } else {
                Color::Green
            }
        }),
        Position::new(2, 0),
    )
    .expect("valid world");
    let walker = agent(Position::new(0, 1), query::goal(&world), &[(Color::Green, 3)]);
    let multi = planner(PlanningMode::MultiPath);

    let path = multi
        .plan(&walker, query::tile_map(&world), &TokenSnapshot::default())
        .expect("valid world");
    let needs = compute_needs(&path, walker.tokens(), query::tile_map(&world)).expect("valid path");
    assert_eq!(needs.count(Color::Blue), 1, "only the goal tile should be blue");
    assert_eq!(needs.count(Color::Green), 0);
}

#[test]
fn select_cheapest_weighs_length_against_deficit() {
    let tiles = TileMap::from_fn(GridBounds::new(3, 2), |cell| {
        if cell == Position::new(1, 0) {
            Color::Blue
        } else {
            Color::Red
        }
    });
    let held: TokenBundle = [(Color::Red, 5)].into_iter().collect();
    let short = colored_trails_core::Path::new(vec![
        Position::new(0, 0),
        Position::new(1, 0),
        Position::new(2, 0),
    ]);
    let detour = colored_trails_core::Path::new(vec![
        Position::new(0, 0),
        Position::new(0, 1),
        Position::new(1, 1),
        Position::new(2, 1),
        Position::new(2, 0),
    ]);

    let chosen = PathPlanner::default()
        .select_cheapest(vec![short.clone(), detour.clone()], &held, &tiles)
        .expect("valid tiles");
    // short: 2 * 2 + 1 * 5 = 9, detour: 4 * 2 + 0 = 8
    assert_eq!(chosen, Some(detour));

    let chosen = PathPlanner::default()
        .select_cheapest(vec![short.clone()], &held, &tiles)
        .expect("valid tiles");
    assert_eq!(chosen, Some(short));
}
