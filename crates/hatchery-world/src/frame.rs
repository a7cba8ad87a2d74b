//! Renderer-facing draw lists.
//!
//! A [`Frame`] is everything a rasterizer needs to paint one tick: the world
//! size and, per body, its colour, fill style and the periodic images of its
//! circles. No torus arithmetic is left to the renderer.

use crate::organism::BodyKind;
use crate::simulation::WorldView;
use hatchery_core::{Circle, Result};
use serde::{Deserialize, Serialize};

pub type Rgb = [u8; 3];

pub const PALETTE: [Rgb; 12] = [
    [141, 211, 199],
    [255, 255, 179],
    [190, 186, 218],
    [251, 128, 114],
    [128, 177, 211],
    [253, 180, 98],
    [179, 222, 105],
    [252, 205, 229],
    [217, 217, 217],
    [188, 128, 189],
    [204, 235, 197],
    [255, 237, 111],
];

/// Only the first ten palette entries are used for shape colours.
const SHAPE_COLOURS: u32 = 10;

/// Colour assigned to a shape hash.
pub fn shape_colour(shape_hash: u32) -> Rgb {
    PALETTE[(shape_hash % SHAPE_COLOURS) as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Fill,
    Stroke,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawItem {
    pub kind: BodyKind,
    pub style: Style,
    pub shape_hash: u32,
    pub colour: Rgb,
    /// Nine periodic images of every body circle.
    pub circles: Vec<Circle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub width: f64,
    pub height: f64,
    pub items: Vec<DrawItem>,
}

impl Frame {
    /// Movers are filled, eggs are outlined; movers come first.
    pub fn capture(view: &WorldView<'_>) -> Self {
        let torus = view.torus;
        let offsets = torus.image_offsets();
        let items = view
            .bodies()
            .map(|(kind, body)| {
                let shape_hash = body.shape_hash(&torus);
                let circles = body
                    .circles()
                    .flat_map(|circle| offsets.into_iter().map(move |offset| circle.offset(offset)))
                    .collect();
                DrawItem {
                    kind,
                    style: match kind {
                        BodyKind::Mover => Style::Fill,
                        BodyKind::Egg => Style::Stroke,
                    },
                    shape_hash,
                    colour: shape_colour(shape_hash),
                    circles,
                }
            })
            .collect();

        Self {
            tick: view.tick,
            width: torus.width,
            height: torus.height,
            items,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
