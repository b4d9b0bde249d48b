use colored_trails_core::{Path, SimulationError, TileMap, TokenBundle};

/// Token deficit an agent holding `held` must cover to walk `path`.
///
/// Every step after the starting cell costs one token of its tile's color.
/// Colors already held in sufficient quantity are omitted, so the result only
/// lists strictly positive shortfalls.
pub fn compute_needs(
    path: &Path,
    held: &TokenBundle,
    tiles: &TileMap,
) -> Result<TokenBundle, SimulationError> {
    Ok(path.requirement(tiles)?.surplus_over(held))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored_trails_core::{Color, GridBounds, Position};

    fn board() -> TileMap {
        TileMap::from_rows(&[vec![Color::Red, Color::Blue, Color::Blue, Color::Green]])
            .expect("rectangular")
    }

    fn corridor() -> Path {
        Path::new((0..4).map(|column| Position::new(column, 0)).collect())
    }

    #[test]
    fn deficits_only_cover_missing_tokens() {
        let held: TokenBundle = [(Color::Blue, 1), (Color::Green, 3)].into_iter().collect();
        let needs = compute_needs(&corridor(), &held, &board()).expect("valid path");
        assert_eq!(needs.iter().collect::<Vec<_>>(), vec![(Color::Blue, 1)]);
    }

    #[test]
    fn starting_tile_is_free() {
        let needs = compute_needs(&corridor(), &TokenBundle::new(), &board()).expect("valid path");
        assert_eq!(needs.count(Color::Red), 0);
        assert_eq!(needs.count(Color::Blue), 2);
        assert_eq!(needs.count(Color::Green), 1);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let held: TokenBundle = [(Color::Blue, 1)].into_iter().collect();
        let tiles = board();
        let path = corridor();
        let first = compute_needs(&path, &held, &tiles).expect("valid path");
        let second = compute_needs(&path, &held, &tiles).expect("valid path");
        assert_eq!(first, second);
    }

    #[test]
    fn path_leaving_the_map_is_malformed() {
        let tiles = TileMap::from_fn(GridBounds::new(1, 1), |_| Color::Red);
        let path = Path::new(vec![Position::new(0, 0), Position::new(1, 0)]);
        assert_eq!(
            compute_needs(&path, &TokenBundle::new(), &tiles),
            Err(SimulationError::MalformedTileMap(Position::new(1, 0)))
        );
    }
}
