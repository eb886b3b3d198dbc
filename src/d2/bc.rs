use super::Lattice;
use crate::global_variables::*;
use std::collections::HashMap;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub enum BoundaryFace {
    Up,
    Bottom,
    Left,
    Right,
}

// Faces are stamped in this order; a corner keeps the last value written.
pub const FACE_ORDER: [BoundaryFace; 4] = [
    BoundaryFace::Up,
    BoundaryFace::Bottom,
    BoundaryFace::Left,
    BoundaryFace::Right,
];

#[derive(Clone, Copy)]
pub struct FaceStrengths {
    pub left: Float,
    pub right: Float,
    pub up: Float,
    pub bottom: Float,
}

impl FaceStrengths {
    pub fn uniform(value: Float) -> Self {
        Self {
            left: value,
            right: value,
            up: value,
            bottom: value,
        }
    }

    pub fn strength(&self, face: BoundaryFace) -> Float {
        match face {
            BoundaryFace::Up => self.up,
            BoundaryFace::Bottom => self.bottom,
            BoundaryFace::Left => self.left,
            BoundaryFace::Right => self.right,
        }
    }

    pub fn from_conditions(conditions: &HashMap<String, String>) -> Self {
        Self {
            left: conditions["left_strength"].parse::<Float>().unwrap(),
            right: conditions["right_strength"].parse::<Float>().unwrap(),
            up: conditions["up_strength"].parse::<Float>().unwrap(),
            bottom: conditions["bottom_strength"].parse::<Float>().unwrap(),
        }
    }
}

impl Lattice {
    pub(super) fn stamp_boundaries(&mut self) {
        let strengths = self.strengths;
        for face in FACE_ORDER {
            self.stamp_face(face, strengths.strength(face));
        }
    }

    fn stamp_face(&mut self, face: BoundaryFace, strength: Float) {
        let nx = self.nx;
        let ny = self.ny;
        match face {
            BoundaryFace::Up => {
                for x in 0..nx {
                    self.stamp_cell(x, 0, strength);
                }
            }
            BoundaryFace::Bottom => {
                for x in 0..nx {
                    self.stamp_cell(x, ny - 1, strength);
                }
            }
            BoundaryFace::Left => {
                for y in 0..ny {
                    self.stamp_cell(0, y, strength);
                }
            }
            BoundaryFace::Right => {
                for y in 0..ny {
                    self.stamp_cell(nx - 1, y, strength);
                }
            }
        }
    }

    fn stamp_cell(&mut self, x: usize, y: usize, strength: Float) {
        let cell = self.get_cell_mut(&[x, y]);
        cell.potential = strength;
        cell.is_boundary = true;
    }
}
