//! Tests for filled-contour figure rendering.

use mpas_common::Tick;
use renderer::colormap::{Color, Colormap};
use renderer::contour::{BandScheme, Extend};
use renderer::figure::{
    render_filled_contour, AxisSpec, ColorbarOrientation, ColorbarSpec, FieldGrid, FigureConfig,
};
use renderer::png::PNG_SIGNATURE;

fn small_config() -> FigureConfig {
    FigureConfig {
        width: 400,
        height: 400,
        ..FigureConfig::default()
    }
}

fn pixel_at(fig: &renderer::Figure, x: f64, y: f64) -> Option<Color> {
    let (px, py) = fig.frame().data_to_pixel(x, y);
    fig.pixel(px as u32, py as u32)
}

#[test]
fn test_uniform_field_fills_with_single_band() {
    let values = [0.5; 4];
    let x = [0.0, 1.0];
    let y = [0.0, 1.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 1.0, 2.0], Extend::Neither).unwrap();
    let cmap = Colormap::by_name("RdYlBu_r").unwrap();

    let fig = render_filled_contour(&grid, &scheme, &cmap, &small_config()).unwrap();
    let colors = scheme.colors(&cmap);
    assert_eq!(pixel_at(&fig, 0.5, 0.5), Some(colors[0]));
    assert_eq!(pixel_at(&fig, 0.2, 0.8), Some(colors[0]));
}

#[test]
fn test_nan_cells_left_unfilled() {
    // Last column missing: x in (2, 3] has no data
    #[rustfmt::skip]
    let values = [
        1.0, 1.0, 1.0, f64::NAN,
        1.0, 1.0, 1.0, f64::NAN,
        1.0, 1.0, 1.0, f64::NAN,
    ];
    let x = [0.0, 1.0, 2.0, 3.0];
    let y = [0.0, 1.0, 2.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 2.0], Extend::Neither).unwrap();
    let cmap = Colormap::by_name("RdYlBu").unwrap();

    let fig = render_filled_contour(&grid, &scheme, &cmap, &small_config()).unwrap();
    assert_eq!(pixel_at(&fig, 0.5, 1.0), Some(scheme.colors(&cmap)[0]));
    assert_eq!(pixel_at(&fig, 2.5, 1.0), Some(Color::WHITE));
}

#[test]
fn test_out_of_range_values_follow_extend() {
    let values = [50.0; 4];
    let x = [0.0, 1.0];
    let y = [0.0, 1.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let cmap = Colormap::by_name("GMT_no_green").unwrap();

    let unextended = BandScheme::new(vec![0.0, 10.0, 20.0], Extend::Neither).unwrap();
    let fig = render_filled_contour(&grid, &unextended, &cmap, &small_config()).unwrap();
    assert_eq!(pixel_at(&fig, 0.5, 0.5), Some(Color::WHITE));

    let extended = BandScheme::new(vec![0.0, 10.0, 20.0], Extend::Max).unwrap();
    let config = FigureConfig {
        colorbar: ColorbarSpec {
            orientation: ColorbarOrientation::Vertical,
            label: Some("RH (%)".to_string()),
            ticks: Some(vec![0.0, 10.0, 20.0]),
        },
        ..small_config()
    };
    let fig = render_filled_contour(&grid, &extended, &cmap, &config).unwrap();
    let colors = extended.colors(&cmap);
    assert_eq!(pixel_at(&fig, 0.5, 0.5), colors.last().copied());
}

#[test]
fn test_inverted_y_axis_puts_first_row_at_top() {
    // Value equals the y coordinate
    let values = [0.0, 0.0, 10.0, 10.0];
    let x = [0.0, 1.0];
    let y = [0.0, 10.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 5.0, 10.0], Extend::Neither).unwrap();
    let cmap = Colormap::by_name("RdYlBu_r").unwrap();
    let colors = scheme.colors(&cmap);

    let config = FigureConfig {
        y_axis: AxisSpec {
            inverted: true,
            ticks: vec![Tick::new(0.0, "Jan 15"), Tick::new(5.0, "")],
            ..AxisSpec::default()
        },
        ..small_config()
    };
    let fig = render_filled_contour(&grid, &scheme, &cmap, &config).unwrap();
    let frame = fig.frame();

    let (_, py) = frame.data_to_pixel(0.5, 1.0);
    assert!(py < frame.top + frame.height / 2.0);
    assert_eq!(pixel_at(&fig, 0.5, 1.0), Some(colors[0]));
    assert_eq!(pixel_at(&fig, 0.5, 8.0), Some(colors[1]));

    let upright = render_filled_contour(&grid, &scheme, &cmap, &small_config()).unwrap();
    let (_, py) = upright.frame().data_to_pixel(0.5, 1.0);
    assert!(py > upright.frame().top + upright.frame().height / 2.0);
}

#[test]
fn test_axis_range_crops_display() {
    let values = [1.0; 4];
    let x = [0.0, 360.0];
    let y = [0.0, 1.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 2.0], Extend::Neither).unwrap();
    let cmap = Colormap::by_name("RdYlBu").unwrap();

    let config = FigureConfig {
        x_axis: AxisSpec {
            range: Some((45.0, 150.0)),
            label: Some("Longitude".to_string()),
            ..AxisSpec::default()
        },
        ..small_config()
    };
    let fig = render_filled_contour(&grid, &scheme, &cmap, &config).unwrap();
    assert_eq!(fig.frame().x_range, (45.0, 150.0));
    let (px, _) = fig.frame().data_to_pixel(45.0, 0.5);
    assert_eq!(px, fig.frame().left);
}

#[test]
fn test_band_edges_render() {
    #[rustfmt::skip]
    let values = [
        0.0, 0.0, 0.0,
        0.0, 8.0, 0.0,
        0.0, 0.0, 0.0,
    ];
    let x = [0.0, 1.0, 2.0];
    let y = [0.0, 1.0, 2.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 4.0, 10.0], Extend::Neither).unwrap();
    let cmap = Colormap::by_name("RdYlBu_r").unwrap();

    let config = FigureConfig {
        band_edges: true,
        title: Some("peak".to_string()),
        ..small_config()
    };
    let fig = render_filled_contour(&grid, &scheme, &cmap, &config).unwrap();
    assert_eq!(fig.width(), 400);
    assert_eq!(fig.height(), 400);
}

#[test]
fn test_invalid_inputs() {
    let x = [0.0, 1.0];
    let y = [0.0, 1.0];
    assert!(FieldGrid::new(&[0.0; 3], &x, &y).is_err());
    assert!(FieldGrid::new(&[0.0; 2], &[0.0], &y).is_err());
    assert!(FieldGrid::new(&[0.0; 4], &[1.0, 0.0], &y).is_err());

    let values = [0.0; 4];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 1.0], Extend::Neither).unwrap();
    let cmap = Colormap::by_name("RdYlBu").unwrap();

    let tiny = FigureConfig {
        width: 50,
        height: 50,
        ..FigureConfig::default()
    };
    assert!(render_filled_contour(&grid, &scheme, &cmap, &tiny).is_err());

    let empty_range = FigureConfig {
        x_axis: AxisSpec {
            range: Some((1.0, 1.0)),
            ..AxisSpec::default()
        },
        ..small_config()
    };
    assert!(render_filled_contour(&grid, &scheme, &cmap, &empty_range).is_err());
}

#[test]
fn test_save_writes_png() {
    let values = [0.0, 1.0, 2.0, 3.0];
    let x = [0.0, 1.0];
    let y = [0.0, 1.0];
    let grid = FieldGrid::new(&values, &x, &y).unwrap();
    let scheme = BandScheme::new(vec![0.0, 1.0, 2.0, 3.0], Extend::Both).unwrap();
    let cmap = Colormap::by_name("RdYlBu_r").unwrap();
    let fig = render_filled_contour(&grid, &scheme, &cmap, &small_config()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    fig.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..8], &PNG_SIGNATURE);
    assert_eq!(bytes, fig.to_png().unwrap());
}
