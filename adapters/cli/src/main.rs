#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the stock Towers board without a window.

mod headless;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use towers_core::{Event, GridPoint, Rules, Team};
use towers_engine::Session;
use towers_rendering::{Color, Presentation, RenderingBackend, Scene, ViewParameters};
use towers_world::{default_state, query};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    headless::{FrameClick, HeadlessBackend},
    script::ScriptedClick,
};

/// Surface the scripted pointer positions are laid out on.
const SCREEN_WIDTH: f32 = 1050.0;
const SCREEN_HEIGHT: f32 = 550.0;
const CLEAR_COLOR: Color = Color::from_rgb_u8(0x0b, 0x0f, 0x1a);

/// Runs the stock three-tower board for a fixed number of ticks.
#[derive(Debug, Parser)]
#[command(name = "towers", version, about)]
struct Args {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Click at grid position X,Y during tick TICK, e.g. `1.5,1.5@10`. Repeatable.
    #[arg(long = "click", value_name = "X,Y@TICK", value_parser = script::parse_click)]
    clicks: Vec<ScriptedClick>,
    /// Grid position the pointer rests on.
    #[arg(long, value_name = "X,Y", value_parser = script::parse_point)]
    hover: Option<GridPoint>,
    /// Pace ticks at the simulation's real-time cadence.
    #[arg(long)]
    realtime: bool,
    /// Log a board summary every N ticks; 0 only logs the final board.
    #[arg(long, value_name = "N", default_value_t = 100)]
    report_every: u64,
}

/// Entry point for the Towers command-line interface.
fn main() -> Result<()> {
    init_tracing();
    run(Args::parse())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: Args) -> Result<()> {
    let rules = Rules::default();
    let initial = default_state();
    let view = ViewParameters::new(
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        initial.grid_width,
        initial.grid_height,
    )
    .context("invalid view geometry")?;

    let mut backend = HeadlessBackend::new(args.ticks, args.report_every).with_clicks(
        args.clicks
            .iter()
            .map(|click| FrameClick {
                frame: click.tick,
                pixel: to_pixel(&view, click.position),
            })
            .collect(),
    );
    if let Some(hover) = args.hover {
        backend = backend.with_cursor(to_pixel(&view, hover));
    }
    if args.realtime {
        backend = backend.paced(rules.tick_interval);
    }

    let presentation = Presentation::new(
        "Towers",
        CLEAR_COLOR,
        view,
        Scene::from_states(&initial, &initial, 1.0),
    );
    let mut session = Session::new(initial, rules);

    backend.run(presentation, |_, input, scene| {
        if let Some(cursor) = input.cursor {
            session.set_hover(view.view_to_grid_bound(cursor));
        }
        if let Some(click) = input.click {
            session.register_click(view.view_to_grid_bound(click));
        }

        let tick = session.ticks();
        let events = session
            .step()
            .with_context(|| format!("tick {tick} failed"))?;
        log_events(tick, events);

        *scene = Scene::from_states(session.previous(), session.current(), 1.0);
        Ok(())
    })?;

    for team in [Team::Blue, Team::Red, Team::Purple, Team::None] {
        let state = session.current();
        info!(
            ?team,
            towers = query::towers_owned(state, team),
            strength = query::team_strength(state, team),
            soldiers = query::soldiers_fielded(state, team),
            "final standing"
        );
    }

    Ok(())
}

fn to_pixel(view: &ViewParameters, point: GridPoint) -> Vec2 {
    view.grid_bound_to_view(Vec2::new(point.x as f32, point.y as f32))
}

fn log_events(tick: u64, events: &[Event]) {
    for event in events {
        match event {
            Event::TowerCaptured { tower, from, to } => {
                info!(tick, %tower, ?from, ?to, "tower captured");
            }
            Event::LinkRejected {
                source,
                target,
                reason,
            } => info!(tick, %source, %target, ?reason, "link refused"),
            other => debug!(tick, event = ?other),
        }
    }
}
