//! ASCII frames of the track and its cars

use car_sim::render::{tile_glyph, AsciiRenderer, ZoomView};
use car_sim::simulation::{Car, CarId, Direction, DrivingRules, Track, Vector2D};

fn car_at(id: usize, track: &Track, x: f32, y: f32) -> Car {
    Car::new(CarId(id), Vector2D::new(x, y), 1.0, 1.0, track, &DrivingRules::default())
}

#[test]
fn test_tile_glyphs() {
    assert_eq!(tile_glyph(Direction::Right), '─');
    assert_eq!(tile_glyph(Direction::Left), '─');
    assert_eq!(tile_glyph(Direction::Up), '│');
    assert_eq!(tile_glyph(Direction::DownRight), '╲');
    assert_eq!(tile_glyph(Direction::UpLeft), '╲');
    assert_eq!(tile_glyph(Direction::DownLeft), '╱');
    assert_eq!(tile_glyph(Direction::Intersection), '┼');
    assert_eq!(tile_glyph(Direction::Empty), ' ');
}

#[test]
fn test_frame_draws_the_track() {
    let track = Track::parse("DC \n *X\nECZ").unwrap();
    let lines = AsciiRenderer::default().render_lines(&track, &[]);

    assert_eq!(lines, vec!["─╲ ", " ┼│", "╱╲╱"]);
}

#[test]
fn test_cars_replace_their_tile() {
    let track = Track::parse("DDDD\nDDDD").unwrap();
    let cars = [car_at(0, &track, 0.5, 0.5), car_at(11, &track, 2.9, 1.1)];

    let frame = AsciiRenderer::default().render(&track, &cars);
    assert_eq!(frame, "0───\n──b─\n");
}

#[test]
fn test_cars_off_the_grid_are_not_drawn() {
    let track = Track::parse("DD").unwrap();
    let cars = [car_at(0, &track, 5.5, 0.5), car_at(1, &track, -0.5, 0.5)];

    let lines = AsciiRenderer::default().render_lines(&track, &cars);
    assert_eq!(lines, vec!["──"]);
}

#[test]
fn test_zoom_view_is_placed_right_of_the_map() {
    let track = Track::parse("DDDD\nDDDD").unwrap();
    let cars = [car_at(0, &track, 1.5, 0.5)];
    let zoom = ZoomView {
        center: Vector2D::new(1.5, 0.5),
        width: 1.0,
        height: 1.0,
        step: 0.25,
    };

    let lines = AsciiRenderer::new(0.3, Some(zoom)).render_lines(&track, &cars);
    assert_eq!(lines.len(), 4);
    for line in &lines {
        assert_eq!(line.chars().count(), 4 + 2 + 4, "{:?}", line);
    }
    // The map itself
    assert!(lines[0].starts_with("─0──  "));
    assert!(lines[2].starts_with("      "));

    // Samples from (1.0, 0.0) to (1.75, 0.75), the car covers the middle
    let zoom_rows: Vec<String> = lines.iter().map(|line| line.chars().skip(6).collect()).collect();
    assert_eq!(zoom_rows[2], "─000");
    assert!(zoom_rows[0].chars().all(|ch| ch == '─'));
}

#[test]
fn test_default_zoom_samples_five_characters_per_tile() {
    let zoom = ZoomView::around(Vector2D::new(3.0, 3.0), 6.0, 6.0);
    assert_eq!(zoom.step, 0.2);

    let track = Track::parse("DD").unwrap();
    let lines = AsciiRenderer::new(0.25, Some(zoom)).render_lines(&track, &[]);
    assert_eq!(lines.len(), 30);
    assert_eq!(lines[0].chars().count(), 2 + 2 + 30);
}
