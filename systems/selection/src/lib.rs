#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system translating pointer input into hover and link commands.

use towers_core::{Command, GridPoint, TickInput, TowerId};

/// Selection system that resolves hover and click input into commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Selection;

impl Selection {
    /// Creates a new selection system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits the commands implied by `input` given the current selection.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `GameState::tower_at` helper so hover and clicks resolve to the same
    /// tower the player sees under the pointer.
    pub fn handle<F>(
        &self,
        input: &TickInput,
        active: Option<TowerId>,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridPoint) -> Option<TowerId>,
    {
        out.push(Command::SetHovered {
            tower: tower_at(input.hover),
        });

        let Some(click) = input.click else {
            return;
        };

        match (tower_at(click), active) {
            (Some(clicked), Some(source)) => {
                out.push(Command::ToggleLink {
                    source,
                    target: clicked,
                });
                out.push(Command::ClearSelection);
            }
            (Some(clicked), None) => out.push(Command::SelectTower { tower: clicked }),
            (None, _) => out.push(Command::ClearSelection),
        }
    }
}
