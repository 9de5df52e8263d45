//! ASCII rendering of the simulation
//!
//! A frame is the whole track with every car drawn over the tile it stands
//! on. An optional zoom view samples a region at sub-tile resolution and is
//! placed to the right of the map.

use crate::simulation::{Car, Direction, TileCoord, Track, Vector2D, CAR_COLLISION_RADIUS};

/// Columns left blank between the map and the zoom view
const ZOOM_GUTTER: usize = 2;

/// Region of the track drawn at a finer resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomView {
    pub center: Vector2D,
    pub width: f32,
    pub height: f32,
    /// World units covered by one character
    pub step: f32,
}

impl ZoomView {
    /// Zoom of `width` x `height` tiles around `center`, five characters per tile
    pub fn around(center: Vector2D, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
            step: 0.2,
        }
    }

    fn columns(&self) -> usize {
        (self.width / self.step).ceil().max(0.0) as usize
    }

    fn rows(&self) -> usize {
        (self.height / self.step).ceil().max(0.0) as usize
    }
}

/// Line-drawing glyph for a tile
pub fn tile_glyph(direction: Direction) -> char {
    match direction {
        Direction::Right | Direction::Left => '─',
        Direction::Up | Direction::Down => '│',
        Direction::DownRight | Direction::UpLeft => '╲',
        Direction::UpRight | Direction::DownLeft => '╱',
        Direction::Intersection => '┼',
        Direction::Empty => ' ',
    }
}

pub struct AsciiRenderer {
    /// Radius inside which a car hides the track in the zoom view
    pub car_radius: f32,
    pub zoom: Option<ZoomView>,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self {
            car_radius: CAR_COLLISION_RADIUS,
            zoom: None,
        }
    }
}

impl AsciiRenderer {
    pub fn new(car_radius: f32, zoom: Option<ZoomView>) -> Self {
        Self { car_radius, zoom }
    }

    /// Build one frame as text lines
    pub fn render_lines(&self, track: &Track, cars: &[Car]) -> Vec<String> {
        let mut map: Vec<Vec<char>> = (0..track.height())
            .map(|y| {
                (0..track.width())
                    .map(|x| tile_glyph(track.tile_at(TileCoord::new(x as i32, y as i32))))
                    .collect()
            })
            .collect();

        for car in cars {
            let tile = Track::map_to_tile(car.position());
            if track.is_in_bounds(tile) {
                map[tile.y as usize][tile.x as usize] = car.display_char();
            }
        }

        let mut lines: Vec<String> = map.into_iter().map(|row| row.into_iter().collect()).collect();

        if let Some(zoom) = &self.zoom {
            let zoom_lines = self.render_zoom(track, cars, zoom);
            let pad = track.width() + ZOOM_GUTTER;
            for (index, zoom_line) in zoom_lines.into_iter().enumerate() {
                if index >= lines.len() {
                    lines.push(String::new());
                }
                let line = &mut lines[index];
                let missing = pad.saturating_sub(line.chars().count());
                line.extend(std::iter::repeat(' ').take(missing));
                line.push_str(&zoom_line);
            }
        }

        lines
    }

    /// Build one frame as a single string, one line per row
    pub fn render(&self, track: &Track, cars: &[Car]) -> String {
        let mut frame = self.render_lines(track, cars).join("\n");
        frame.push('\n');
        frame
    }

    fn render_zoom(&self, track: &Track, cars: &[Car], zoom: &ZoomView) -> Vec<String> {
        let origin = Vector2D::new(
            zoom.center.x - zoom.width / 2.0,
            zoom.center.y - zoom.height / 2.0,
        );
        (0..zoom.rows())
            .map(|row| {
                (0..zoom.columns())
                    .map(|column| {
                        let sample = origin
                            + Vector2D::new(column as f32 * zoom.step, row as f32 * zoom.step);
                        match cars.iter().find(|car| car.covers(sample, self.car_radius)) {
                            Some(car) => car.display_char(),
                            None => tile_glyph(track.direction_at(sample)),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Clear the terminal and print a frame in one write
pub fn draw_frame(frame: &str) {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    // Errors only mean the terminal went away
    let _ = write!(stdout, "\x1B[2J\x1B[H{}", frame);
    let _ = stdout.flush();
}
