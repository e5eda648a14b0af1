#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Towers adapters.
//!
//! Nothing here draws. Adapters map pointer pixels to grid coordinates with
//! [`ViewParameters`], build a [`Scene`] from the two most recent snapshots and
//! hand it to a [`RenderingBackend`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use towers_core::{GridPoint, Team, TowerId, TowerKind};
use towers_world::{query, GameState, Soldier};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Lightening applied to the tower under the pointer.
const HOVER_HIGHLIGHT: f32 = 0.2;
/// Lightening applied to the selected tower.
const ACTIVE_HIGHLIGHT: f32 = 0.4;

/// Color used for everything owned by `team`.
#[must_use]
pub const fn team_color(team: Team) -> Color {
    match team {
        Team::None => Color::from_rgb_u8(0x7f, 0x7f, 0x7f),
        Team::Purple => Color::from_rgb_u8(0x7f, 0x38, 0xc7),
        Team::Blue => Color::from_rgb_u8(0x38, 0x6f, 0xc7),
        Team::Red => Color::from_rgb_u8(0xc7, 0x38, 0x65),
    }
}

/// Screen geometry shared by the view and the renderer.
///
/// The board is inset by [`ViewParameters::PADDING`] pixels and scaled so its
/// width fills the screen; cells are square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParameters {
    /// Width of the drawing surface in pixels.
    pub screen_width: f32,
    /// Height of the drawing surface in pixels.
    pub screen_height: f32,
    /// Number of grid columns.
    pub grid_width: u32,
    /// Number of grid rows.
    pub grid_height: u32,
}

impl ViewParameters {
    /// Pixels left free around the board.
    pub const PADDING: f32 = 25.0;

    /// Creates view parameters for a surface of the given size.
    ///
    /// Returns an error when the grid has no columns or the surface is too
    /// narrow to hold the padding.
    pub fn new(
        screen_width: f32,
        screen_height: f32,
        grid_width: u32,
        grid_height: u32,
    ) -> std::result::Result<Self, RenderingError> {
        if grid_width == 0 {
            return Err(RenderingError::EmptyGrid);
        }
        if screen_width <= 2.0 * Self::PADDING {
            return Err(RenderingError::SurfaceTooNarrow { screen_width });
        }

        Ok(Self {
            screen_width,
            screen_height,
            grid_width,
            grid_height,
        })
    }

    /// Side length of one grid cell in pixels.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        (self.screen_width - 2.0 * Self::PADDING) / self.grid_width as f32
    }

    /// Pixel size of the whole board, padding excluded.
    #[must_use]
    pub fn board_size(&self) -> Vec2 {
        let cell = self.cell_size();
        Vec2::new(
            self.grid_width as f32 * cell,
            self.grid_height as f32 * cell,
        )
    }

    /// Reports whether `pixel` falls on the board rather than its padding.
    #[must_use]
    pub fn contains(&self, pixel: Vec2) -> bool {
        let origin = Vec2::splat(Self::PADDING);
        point_in_rect(pixel, origin, origin + self.board_size())
    }

    /// Pixel position of the centre of the cell anchored at `point`.
    #[must_use]
    pub fn grid_to_view(&self, point: Vec2) -> Vec2 {
        let cell = self.cell_size();
        point * cell + Vec2::splat(cell / 2.0 + Self::PADDING)
    }

    /// Pixel position of the top-left corner of the cell anchored at `point`.
    #[must_use]
    pub fn grid_bound_to_view(&self, point: Vec2) -> Vec2 {
        point * self.cell_size() + Vec2::splat(Self::PADDING)
    }

    /// Inverse of [`ViewParameters::grid_bound_to_view`].
    ///
    /// Pointer input is converted with this mapping, so a pixel anywhere
    /// inside a tower's cell resolves to that tower.
    #[must_use]
    pub fn view_to_grid_bound(&self, pixel: Vec2) -> GridPoint {
        let grid = (pixel - Vec2::splat(Self::PADDING)) / self.cell_size();
        GridPoint::new(f64::from(grid.x), f64::from(grid.y))
    }
}

/// Reports whether `point` lies in the half-open rectangle `[min, max)`.
#[must_use]
pub fn point_in_rect(point: Vec2, min: Vec2, max: Vec2) -> bool {
    point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
}

/// Outline used to draw a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerShape {
    /// Six-sided outline used by regular towers.
    Hexagon,
    /// Upward triangle used by attack towers.
    Triangle,
    /// Circle used by defense towers.
    Circle,
}

impl From<TowerKind> for TowerShape {
    fn from(kind: TowerKind) -> Self {
        match kind {
            TowerKind::Regular => Self::Hexagon,
            TowerKind::Attack => Self::Triangle,
            TowerKind::Defense => Self::Circle,
        }
    }
}

/// Immutable snapshot describing a tower within the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier of the tower in the world arena.
    pub id: TowerId,
    /// Grid position of the tower's cell.
    pub position: Vec2,
    /// Outline derived from the tower kind.
    pub shape: TowerShape,
    /// Owner of the tower.
    pub team: Team,
    /// Fill color, highlighted when hovered or selected.
    pub color: Color,
    /// Text drawn over the tower.
    pub label: String,
    /// Whether the pointer rests on the tower.
    pub hovered: bool,
    /// Whether the player selected the tower.
    pub active: bool,
}

/// Soldier drawn at its interpolated position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSoldier {
    /// Grid position of the soldier.
    pub position: Vec2,
    /// Team color.
    pub color: Color,
}

/// Line drawn for a link.
///
/// Links running both ways are drawn from each end to the midpoint so both
/// owners' colors stay visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConnection {
    /// Owner of the link.
    pub source: TowerId,
    /// Destination of the link.
    pub target: TowerId,
    /// Grid position the line starts at.
    pub from: Vec2,
    /// Grid position the line ends at.
    pub to: Vec2,
    /// Color of the owning team.
    pub color: Color,
    /// Whether the target links back to the source.
    pub two_way: bool,
}

/// Scene description combining the board and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of grid columns.
    pub grid_width: u32,
    /// Number of grid rows.
    pub grid_height: u32,
    /// Links, drawn first.
    pub connections: Vec<SceneConnection>,
    /// Soldiers, drawn over links.
    pub soldiers: Vec<SceneSoldier>,
    /// Towers, drawn last.
    pub towers: Vec<SceneTower>,
}

impl Scene {
    /// Builds the scene shown `alpha` of the way from `previous` to `current`.
    ///
    /// Towers and links always reflect `current`. Soldiers found in both
    /// snapshots are interpolated; soldiers spawned during the last tick are
    /// drawn where they stand. Neither snapshot is modified.
    #[must_use]
    pub fn from_states(previous: &GameState, current: &GameState, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);

        let towers = current
            .tower_ids()
            .zip(current.towers.iter())
            .map(|(id, tower)| {
                let hovered = current.hovered == Some(id);
                let active = current.active == Some(id);
                let mut color = team_color(tower.team);
                if active {
                    color = color.lighten(ACTIVE_HIGHLIGHT);
                } else if hovered {
                    color = color.lighten(HOVER_HIGHLIGHT);
                }

                SceneTower {
                    id,
                    position: to_vec2(tower.position),
                    shape: TowerShape::from(tower.kind),
                    team: tower.team,
                    color,
                    label: if tower.is_full() {
                        String::from("max")
                    } else {
                        tower.value.to_string()
                    },
                    hovered,
                    active,
                }
            })
            .collect();

        let connections = query::links(current)
            .filter_map(|(source, target)| {
                let owner = current.tower(source).ok()?;
                let from = to_vec2(owner.position);
                let end = to_vec2(current.tower(target).ok()?.position);
                let two_way = query::is_two_way(current, source, target);

                Some(SceneConnection {
                    source,
                    target,
                    from,
                    to: if two_way { from.lerp(end, 0.5) } else { end },
                    color: team_color(owner.team),
                    two_way,
                })
            })
            .collect();

        let soldiers = current
            .soldiers
            .iter()
            .map(|soldier| {
                let position = to_vec2(soldier.position);
                let position = previous
                    .soldiers
                    .iter()
                    .find(|earlier| stepped_into(earlier, soldier))
                    .map_or(position, |earlier| {
                        to_vec2(earlier.position).lerp(position, alpha)
                    });

                SceneSoldier {
                    position,
                    color: team_color(soldier.team),
                }
            })
            .collect();

        Self {
            grid_width: current.grid_width,
            grid_height: current.grid_height,
            connections,
            soldiers,
            towers,
        }
    }
}

/// Reports whether one step of `earlier` lands exactly where `later` stands.
fn stepped_into(earlier: &Soldier, later: &Soldier) -> bool {
    const TOLERANCE: f64 = 1e-9;

    earlier.team == later.team
        && earlier.source == later.source
        && earlier.target == later.target
        && earlier.original_source == later.original_source
        && (earlier.position.x + earlier.dx - later.position.x).abs() < TOLERANCE
        && (earlier.position.y + earlier.dy - later.position.y).abs() < TOLERANCE
}

fn to_vec2(point: GridPoint) -> Vec2 {
    Vec2::new(point.x as f32, point.y as f32)
}

/// Input gathered by adapters for a single frame, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position, when the pointer is over the surface.
    pub cursor: Option<Vec2>,
    /// Position of a click made since the previous frame.
    pub click: Option<Vec2>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Screen geometry the scene is laid out in.
    pub view: ViewParameters,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, view: ViewParameters, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            view,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Towers scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and replaces the scene before it is
    /// presented. An error returned by the closure stops the backend and is
    /// passed back to the caller.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid has no columns, leaving the cell size undefined.
    EmptyGrid,
    /// The surface cannot hold the padding on both sides.
    SurfaceTooNarrow {
        /// Provided surface width.
        screen_width: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one column"),
            Self::SurfaceTooNarrow { screen_width } => {
                write!(
                    f,
                    "surface of {screen_width}px cannot hold {}px of padding",
                    2.0 * ViewParameters::PADDING
                )
            }
        }
    }
}

impl Error for RenderingError {}
