//! Rendering backend that presents scenes to the log instead of a window.

use std::time::Duration;

use anyhow::Result;
use glam::Vec2;
use towers_rendering::{FrameInput, Presentation, RenderingBackend, Scene, ViewParameters};
use tracing::{info, warn};

/// Pixel-space click delivered on a given frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrameClick {
    /// Frame the click belongs to.
    pub(crate) frame: u64,
    /// Pixel position of the click.
    pub(crate) pixel: Vec2,
}

/// Backend running a fixed number of frames and logging board summaries.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    frames: u64,
    report_every: u64,
    pacing: Option<Duration>,
    cursor: Option<Vec2>,
    clicks: Vec<FrameClick>,
}

impl HeadlessBackend {
    /// Creates a backend that runs `frames` frames flat out.
    pub(crate) fn new(frames: u64, report_every: u64) -> Self {
        Self {
            frames,
            report_every,
            pacing: None,
            cursor: None,
            clicks: Vec::new(),
        }
    }

    /// Sleeps `interval` after every frame.
    pub(crate) fn paced(mut self, interval: Duration) -> Self {
        self.pacing = Some(interval);
        self
    }

    /// Keeps the pointer resting on `pixel`.
    pub(crate) fn with_cursor(mut self, pixel: Vec2) -> Self {
        self.cursor = Some(pixel);
        self
    }

    /// Delivers the given clicks; the last click scheduled for a frame wins.
    pub(crate) fn with_clicks(mut self, clicks: Vec<FrameClick>) -> Self {
        self.clicks = clicks;
        self
    }

    /// Scripted clicks that fall in the padding around the board.
    fn off_board_clicks<'a>(
        &'a self,
        view: &'a ViewParameters,
    ) -> impl Iterator<Item = &'a FrameClick> + 'a {
        self.clicks.iter().filter(move |click| !view.contains(click.pixel))
    }

    fn input_for(&self, frame: u64) -> FrameInput {
        FrameInput {
            cursor: self.cursor,
            click: self
                .clicks
                .iter()
                .rev()
                .find(|click| click.frame == frame)
                .map(|click| click.pixel),
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()>,
    {
        info!(title = %presentation.window_title, frames = self.frames, "headless run started");
        for click in self.off_board_clicks(&presentation.view) {
            warn!(frame = click.frame, pixel = ?click.pixel, "scripted click misses the board");
        }
        let delta = self.pacing.unwrap_or_default();
        let mut scene = presentation.scene;

        for frame in 0..self.frames {
            update_scene(delta, self.input_for(frame), &mut scene)?;

            let shown = frame + 1;
            if self.report_every > 0 && shown % self.report_every == 0 && shown < self.frames {
                report(shown, &scene);
            }
            if let Some(interval) = self.pacing {
                std::thread::sleep(interval);
            }
        }

        report(self.frames, &scene);
        Ok(())
    }
}

fn report(tick: u64, scene: &Scene) {
    for tower in &scene.towers {
        let links = scene
            .connections
            .iter()
            .filter(|connection| connection.source == tower.id)
            .count();
        info!(
            tick,
            tower = %tower.id,
            team = ?tower.team,
            strength = %tower.label,
            links,
            "board"
        );
    }
    info!(tick, soldiers = scene.soldiers.len(), "field");
}

#[cfg(test)]
mod tests {
    use super::*;
    use towers_rendering::Color;
    use towers_world::default_state;

    fn presentation() -> Presentation {
        let state = default_state();
        Presentation::new(
            "test",
            Color::from_rgb_u8(0, 0, 0),
            ViewParameters::new(550.0, 300.0, 20, 10).expect("valid surface"),
            Scene::from_states(&state, &state, 1.0),
        )
    }

    #[test]
    fn latest_click_of_a_frame_wins() {
        let backend = HeadlessBackend::new(3, 0).with_clicks(vec![
            FrameClick {
                frame: 1,
                pixel: Vec2::new(1.0, 1.0),
            },
            FrameClick {
                frame: 1,
                pixel: Vec2::new(2.0, 2.0),
            },
        ]);

        assert_eq!(backend.input_for(0).click, None);
        assert_eq!(backend.input_for(1).click, Some(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn clicks_in_the_padding_are_flagged() {
        let view = ViewParameters::new(550.0, 300.0, 20, 10).expect("valid surface");
        let on_board = FrameClick {
            frame: 0,
            pixel: Vec2::new(62.5, 62.5),
        };
        let in_padding = FrameClick {
            frame: 1,
            pixel: Vec2::new(10.0, 62.5),
        };
        let backend = HeadlessBackend::new(2, 0).with_clicks(vec![on_board, in_padding]);

        let flagged: Vec<&FrameClick> = backend.off_board_clicks(&view).collect();

        assert_eq!(flagged, vec![&in_padding]);
    }

    #[test]
    fn runs_the_requested_number_of_frames() {
        let mut inputs = Vec::new();
        let cursor = Vec2::new(10.0, 20.0);

        HeadlessBackend::new(4, 2)
            .with_cursor(cursor)
            .run(presentation(), |_, input, _| {
                inputs.push(input);
                Ok(())
            })
            .expect("closure never fails");

        assert_eq!(inputs.len(), 4);
        assert!(inputs.iter().all(|input| input.cursor == Some(cursor)));
    }
}
