//! Plot configuration loading and types.
//!
//! One YAML file with a `hovmoller` and a `profile` section. Every field has
//! a default reproducing the January 2009 15 km analysis, so an empty file
//! (or no file at all) is a valid configuration. `${VAR}` and
//! `${VAR:-default}` are expanded from the environment before parsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use mpas_common::{CalendarAxis, GeoWindow, LatitudeBand, LonConvention, MpasResult, Tick};
use mpas_diagnostics::ReferencePressure;
use renderer::{arange_levels, BandScheme, Colormap, Extend};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub hovmoller: HovmollerConfig,
    pub profile: ProfileConfig,
}

impl PlotConfig {
    /// Load, expand and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        tracing::info!(path = %path.display(), "Loaded plot configuration");
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        // An empty document deserializes to unit, not an empty mapping
        let config: PlotConfig = if expanded.trim().is_empty() {
            PlotConfig::default()
        } else {
            serde_yaml::from_str(&expanded)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check levels, colormaps and geometry before any data is read.
    pub fn validate(&self) -> Result<()> {
        let h = &self.hovmoller;
        anyhow::ensure!(!h.fields.is_empty(), "hovmoller.fields cannot be empty");
        for field in &h.fields {
            field
                .band_scheme(h.extend)
                .with_context(|| format!("Invalid levels for field {}", field.name))?;
        }
        Colormap::by_name(&h.colormap)?;
        anyhow::ensure!(
            h.longitude_increment > 0.0 && h.longitude_increment <= 360.0,
            "hovmoller.longitude_increment must be in (0, 360], got {}",
            h.longitude_increment
        );
        anyhow::ensure!(
            h.display_longitudes.min < h.display_longitudes.max,
            "hovmoller.display_longitudes min must be below max"
        );
        LatitudeBand::new(h.latitude_band.min, h.latitude_band.max)?;
        h.figure.validate("hovmoller")?;

        let p = &self.profile;
        p.window
            .geo_window()
            .with_context(|| format!("Invalid profile window {}", p.window.name))?;
        p.band_scheme().context("Invalid profile levels")?;
        p.colorbar_ticks.resolve().context("Invalid profile colorbar ticks")?;
        Colormap::by_name(&p.colormap)?;
        anyhow::ensure!(p.max_altitude_m > 0.0, "profile.max_altitude_m must be positive");
        anyhow::ensure!(p.altitude_tick_m > 0.0, "profile.altitude_tick_m must be positive");
        p.figure.validate("profile")?;

        Ok(())
    }
}

/// Contour levels: an explicit list, or a half-open `start..stop` range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelSpec {
    List(Vec<f64>),
    Range { start: f64, stop: f64, step: f64 },
}

impl LevelSpec {
    pub fn range(start: f64, stop: f64, step: f64) -> Self {
        LevelSpec::Range { start, stop, step }
    }

    pub fn resolve(&self) -> MpasResult<Vec<f64>> {
        match self {
            LevelSpec::List(levels) => Ok(levels.clone()),
            LevelSpec::Range { start, stop, step } => arange_levels(*start, *stop, *step),
        }
    }
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl FigureSize {
    fn validate(&self, section: &str) -> Result<()> {
        anyhow::ensure!(
            self.width >= 200 && self.height >= 200,
            "{}.figure must be at least 200x200, got {}x{}",
            section,
            self.width,
            self.height
        );
        Ok(())
    }
}

/// Ticks along the time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeAxisConfig {
    /// Steps between ticks (4 = daily for 6-hourly output)
    pub tick_every: usize,
    /// Label every n-th tick, leave the rest blank
    pub label_every: usize,
    /// Valid time of step 0, overriding the file names
    pub start: Option<NaiveDateTime>,
    /// Steps per day when `start` is given
    pub steps_per_day: u32,
    /// Literal tick labels, one per tick
    pub labels: Option<Vec<String>>,
}

impl Default for TimeAxisConfig {
    fn default() -> Self {
        Self {
            tick_every: 4,
            label_every: 2,
            start: None,
            steps_per_day: 4,
            labels: None,
        }
    }
}

impl TimeAxisConfig {
    /// Tick positions and labels over `n_steps` steps.
    ///
    /// Literal labels win, then a configured start, then the calendar read
    /// from the file names. Without any of those ticks carry step numbers.
    pub fn ticks(&self, calendar: Option<CalendarAxis>, n_steps: usize) -> Vec<Tick> {
        if let Some(labels) = &self.labels {
            return Tick::from_labels(self.tick_every, labels)
                .into_iter()
                .filter(|t| (t.position as usize) < n_steps)
                .collect();
        }

        let calendar = self
            .start
            .map(|start| CalendarAxis::new(start, self.steps_per_day))
            .or(calendar);

        match calendar {
            Some(calendar) => calendar.day_ticks(n_steps, self.tick_every, self.label_every),
            None => {
                let label_every = self.label_every.max(1);
                (0..n_steps)
                    .step_by(self.tick_every.max(1))
                    .enumerate()
                    .map(|(i, step)| {
                        let label = if i % label_every == 0 {
                            step.to_string()
                        } else {
                            String::new()
                        };
                        Tick::new(step as f64, label)
                    })
                    .collect()
            }
        }
    }
}

// ============================================================================
// Hovmöller
// ============================================================================

/// A field plotted in the Hovmöller diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub levels: LevelSpec,
    #[serde(default = "default_velocity_units")]
    pub units: String,
}

impl FieldConfig {
    pub fn band_scheme(&self, extend: Extend) -> MpasResult<BandScheme> {
        BandScheme::new(self.levels.resolve()?, extend)
    }
}

fn default_velocity_units() -> String {
    "m s-1".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HovmollerConfig {
    /// Glob matching the diagnostics series
    pub pattern: String,
    /// File providing `latCell`/`lonCell`
    pub grid_file: PathBuf,
    pub fields: Vec<FieldConfig>,
    pub latitude_band: LatitudeBand,
    /// Longitude bin width in degrees
    pub longitude_increment: f64,
    pub display_longitudes: LonRange,
    pub colormap: String,
    pub extend: Extend,
    pub time_axis: TimeAxisConfig,
    pub figure: FigureSize,
    pub band_edges: bool,
    pub output_dir: PathBuf,
}

impl Default for HovmollerConfig {
    fn default() -> Self {
        Self {
            pattern: "diagnostics.2009-0*.nc".to_string(),
            grid_file: PathBuf::from("output.nc"),
            fields: vec![
                FieldConfig {
                    name: "w_500hPa".to_string(),
                    levels: LevelSpec::range(-0.04, 0.13, 0.01),
                    units: default_velocity_units(),
                },
                FieldConfig {
                    name: "w_200hPa".to_string(),
                    levels: LevelSpec::range(-0.05, 0.15, 0.01),
                    units: default_velocity_units(),
                },
            ],
            latitude_band: LatitudeBand::default(),
            longitude_increment: 1.0,
            display_longitudes: LonRange {
                min: 45.0,
                max: 150.0,
            },
            colormap: "RdYlBu_r".to_string(),
            extend: Extend::Neither,
            time_axis: TimeAxisConfig::default(),
            figure: FigureSize {
                width: 800,
                height: 1000,
            },
            band_edges: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl HovmollerConfig {
    /// Configured fields, or only those named in `names` when non-empty.
    pub fn select_fields(&self, names: &[String]) -> Result<Vec<FieldConfig>> {
        if names.is_empty() {
            return Ok(self.fields.clone());
        }
        names
            .iter()
            .map(|name| {
                self.fields
                    .iter()
                    .find(|f| &f.name == name)
                    .cloned()
                    .with_context(|| {
                        format!(
                            "Field {} is not configured (known: {})",
                            name,
                            self.fields
                                .iter()
                                .map(|f| f.name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        )
                    })
            })
            .collect()
    }
}

// ============================================================================
// Humidity profile
// ============================================================================

/// Window bounds in degrees, checked when converted to a [`GeoWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// A window with a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedWindow {
    pub name: String,
    #[serde(flatten)]
    pub bounds: WindowBounds,
}

impl NamedWindow {
    pub fn geo_window(&self) -> MpasResult<GeoWindow> {
        let b = self.bounds;
        GeoWindow::new(b.lat_min, b.lat_max, b.lon_min, b.lon_max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Glob matching the model output series
    pub pattern: String,
    pub window: NamedWindow,
    /// Convention the window longitudes are written in; inferred from the
    /// window bounds when absent
    pub longitude_convention: Option<LonConvention>,
    pub reference_pressure: ReferencePressure,
    pub levels: LevelSpec,
    pub extend: Extend,
    pub colormap: String,
    pub colorbar_ticks: LevelSpec,
    pub max_altitude_m: f64,
    pub altitude_tick_m: f64,
    pub time_axis: TimeAxisConfig,
    pub figure: FigureSize,
    pub band_edges: bool,
    pub output: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            pattern: "x1.2621442.output.2009-*_00.00.00.nc".to_string(),
            window: NamedWindow {
                name: "South Maldives".to_string(),
                bounds: WindowBounds {
                    lat_min: -0.5,
                    lat_max: 1.5,
                    lon_min: 72.0,
                    lon_max: 74.0,
                },
            },
            longitude_convention: None,
            reference_pressure: ReferencePressure::default(),
            levels: LevelSpec::range(0.0, 125.0, 5.0),
            extend: Extend::Max,
            colormap: "GMT_no_green".to_string(),
            colorbar_ticks: LevelSpec::range(0.0, 130.0, 10.0),
            max_altitude_m: 20_000.0,
            altitude_tick_m: 2_000.0,
            time_axis: TimeAxisConfig::default(),
            figure: FigureSize {
                width: 1800,
                height: 600,
            },
            band_edges: false,
            output: PathBuf::from("rh_profile.png"),
        }
    }
}

impl ProfileConfig {
    pub fn band_scheme(&self) -> MpasResult<BandScheme> {
        BandScheme::new(self.levels.resolve()?, self.extend)
    }

    pub fn lon_convention(&self) -> MpasResult<LonConvention> {
        match self.longitude_convention {
            Some(convention) => Ok(convention),
            None => Ok(self.window.geo_window()?.lon_convention()),
        }
    }

    /// Altitude ticks from 0 to `max_altitude_m`, labelled in km.
    pub fn altitude_ticks(&self) -> Vec<Tick> {
        let n = (self.max_altitude_m / self.altitude_tick_m).floor() as usize;
        (0..=n)
            .map(|i| {
                let z = i as f64 * self.altitude_tick_m;
                Tick::new(z, renderer::figure::format_tick(z / 1000.0))
            })
            .collect()
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` in YAML content.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }
            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
