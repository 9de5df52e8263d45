//! Tile grid the cars drive on
//!
//! The grid is immutable once built. The track also keeps a registry of the
//! cars driving on it so every car can look at its neighbours.

use std::sync::{PoisonError, RwLock, Weak};

use log::debug;
use rand::Rng;

use super::car::Car;
use super::error::{SimError, SimResult};
use super::types::{Direction, SPAWN_RETRY_BUDGET};
use super::vector::{TileCoord, Vector2D};

#[derive(Debug)]
pub struct Track {
    width: usize,
    height: usize,
    /// Row-major tile directions
    tiles: Vec<Direction>,
    /// Non-owning handles to the cars on the track, appended once per car
    cars: RwLock<Vec<Weak<RwLock<Car>>>>,
}

impl Track {
    /// Parse a layout written in the track authoring format, one row per line
    pub fn parse(layout: &str) -> SimResult<Self> {
        let rows: Vec<&str> = layout.lines().collect();
        Self::from_rows(&rows)
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> SimResult<Self> {
        let width = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .ok_or(SimError::EmptyTrack)?;
        if width == 0 {
            return Err(SimError::EmptyTrack);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(SimError::RaggedTrack {
                    row: row_index,
                    expected: width,
                    found,
                });
            }
            for (column, ch) in row.chars().enumerate() {
                let direction = Direction::from_char(ch).ok_or(SimError::UnknownTileChar {
                    ch,
                    row: row_index,
                    column,
                })?;
                tiles.push(direction);
            }
        }

        if !tiles.iter().any(|direction| direction.is_road()) {
            return Err(SimError::NoRoadTiles);
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
            cars: RwLock::new(Vec::new()),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Geometric center of the map
    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn road_tile_count(&self) -> usize {
        self.tiles.iter().filter(|direction| direction.is_road()).count()
    }

    pub fn is_in_bounds(&self, tile: TileCoord) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as usize) < self.width && (tile.y as usize) < self.height
    }

    /// Direction stored at `tile`, `Empty` outside the grid
    pub fn tile_at(&self, tile: TileCoord) -> Direction {
        if !self.is_in_bounds(tile) {
            return Direction::Empty;
        }
        self.tiles[tile.y as usize * self.width + tile.x as usize]
    }

    pub fn is_road(direction: Direction) -> bool {
        direction.is_road()
    }

    pub fn is_road_at(&self, tile: TileCoord) -> bool {
        self.tile_at(tile).is_road()
    }

    /// The tile containing a continuous position
    pub fn map_to_tile(position: Vector2D) -> TileCoord {
        TileCoord::containing(position)
    }

    /// Direction of the tile under a continuous position
    pub fn direction_at(&self, position: Vector2D) -> Direction {
        self.tile_at(Self::map_to_tile(position))
    }

    /// Pick a road tile center for a new car
    ///
    /// A random cell is drawn and scanned forward in raster order until a road
    /// tile turns up. Points rejected by `is_free` are redrawn, up to
    /// `SPAWN_RETRY_BUDGET` times.
    pub fn spawn_point<R, F>(&self, rng: &mut R, is_free: F) -> SimResult<Vector2D>
    where
        R: Rng,
        F: Fn(Vector2D) -> bool,
    {
        let cell_count = self.tiles.len();
        for attempt in 0..SPAWN_RETRY_BUDGET {
            let start = rng.random_range(0..cell_count);
            let Some(index) = (0..cell_count)
                .map(|offset| (start + offset) % cell_count)
                .find(|&index| self.tiles[index].is_road())
            else {
                return Err(SimError::NoRoadTiles);
            };

            let tile = TileCoord::new((index % self.width) as i32, (index / self.width) as i32);
            let point = tile.center();
            if is_free(point) {
                return Ok(point);
            }
            debug!("Spawn point {} taken, redrawing (attempt {})", point, attempt + 1);
        }
        Err(SimError::SpawnBudgetExhausted {
            attempts: SPAWN_RETRY_BUDGET,
        })
    }

    /// Register a car as driving on this track
    pub fn register_car(&self, car: Weak<RwLock<Car>>) {
        self.cars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(car);
    }

    /// Number of registry entries, including cars that no longer exist
    pub fn registered_count(&self) -> usize {
        self.cars.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Snapshot of every live car registered on the track
    ///
    /// Each car is copied under its own read lock, so a snapshot is
    /// consistent per car but not across cars.
    pub fn cars_on_track(&self) -> Vec<Car> {
        self.cars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .map(|slot| *slot.read().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    /// The layout back in the authoring format
    pub fn to_layout(&self) -> String {
        self.tiles
            .chunks(self.width)
            .map(|row| row.iter().map(|direction| direction.to_char()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
