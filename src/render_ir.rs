use core::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::metrics::TextStyle;

/// Which paint a text command uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayer {
    /// Source text.
    Base,
    /// Ruby text above the source.
    Annotation,
}

/// Text draw command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextCommand {
    /// Left x.
    pub x: f32,
    /// Baseline y.
    pub baseline_y: f32,
    /// Content.
    pub text: String,
    /// Paint used for the run.
    pub style: TextStyle,
    /// Semantic layer.
    pub layer: TextLayer,
}

/// Backend-agnostic output of one draw pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Fill the whole surface.
    Background { color: Color },
    /// Draw a text run.
    Text(TextCommand),
}

/// Host drawing primitives.
pub trait Surface {
    type Error;

    fn fill_background(&mut self, color: Color) -> Result<(), Self::Error>;

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle)
        -> Result<(), Self::Error>;

    /// Execute one command.
    fn execute(&mut self, cmd: &DrawCommand) -> Result<(), Self::Error> {
        match cmd {
            DrawCommand::Background { color } => self.fill_background(*color),
            DrawCommand::Text(text) => {
                self.draw_text(&text.text, text.x, text.baseline_y, &text.style)
            }
        }
    }
}

/// Surface that records commands instead of drawing them.
///
/// Commands replayed through [`Surface::execute`] are stored as given. Direct
/// [`Surface::draw_text`] calls carry no layer and are recorded as base text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_commands(&self) -> impl Iterator<Item = &TextCommand> + '_ {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(text) => Some(text),
            DrawCommand::Background { .. } => None,
        })
    }
}

impl Surface for CommandRecorder {
    type Error = Infallible;

    fn fill_background(&mut self, color: Color) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Background { color });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle,
    ) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Text(TextCommand {
            x,
            baseline_y: y,
            text: text.to_string(),
            style: *style,
            layer: TextLayer::Base,
        }));
        Ok(())
    }

    fn execute(&mut self, cmd: &DrawCommand) -> Result<(), Self::Error> {
        self.commands.push(cmd.clone());
        Ok(())
    }
}
