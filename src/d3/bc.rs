use super::Lattice;
use crate::global_variables::*;
use std::collections::HashMap;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub enum BoundaryFace {
    Front,
    Back,
    Left,
    Right,
    Down,
    Up,
}

// Faces are stamped in this order; shared edges and corners keep the last
// value written.
pub const FACE_ORDER: [BoundaryFace; 6] = [
    BoundaryFace::Front,
    BoundaryFace::Back,
    BoundaryFace::Left,
    BoundaryFace::Right,
    BoundaryFace::Down,
    BoundaryFace::Up,
];

#[derive(Clone, Copy)]
pub struct FaceStrengths {
    pub front: Float,
    pub back: Float,
    pub left: Float,
    pub right: Float,
    pub down: Float,
    pub up: Float,
}

impl FaceStrengths {
    pub fn uniform(value: Float) -> Self {
        Self {
            front: value,
            back: value,
            left: value,
            right: value,
            down: value,
            up: value,
        }
    }

    pub fn strength(&self, face: BoundaryFace) -> Float {
        match face {
            BoundaryFace::Front => self.front,
            BoundaryFace::Back => self.back,
            BoundaryFace::Left => self.left,
            BoundaryFace::Right => self.right,
            BoundaryFace::Down => self.down,
            BoundaryFace::Up => self.up,
        }
    }

    pub fn from_conditions(conditions: &HashMap<String, String>) -> Self {
        Self {
            front: conditions["front_strength"].parse::<Float>().unwrap(),
            back: conditions["back_strength"].parse::<Float>().unwrap(),
            left: conditions["left_strength"].parse::<Float>().unwrap(),
            right: conditions["right_strength"].parse::<Float>().unwrap(),
            down: conditions["down_strength"].parse::<Float>().unwrap(),
            up: conditions["up_strength"].parse::<Float>().unwrap(),
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
        let nz = self.nz;
        match face {
            BoundaryFace::Front => {
                for y in 0..ny {
                    for x in 0..nx {
                        self.stamp_cell(x, y, 0, strength);
                    }
                }
            }
            BoundaryFace::Back => {
                for y in 0..ny {
                    for x in 0..nx {
                        self.stamp_cell(x, y, nz - 1, strength);
                    }
                }
            }
            BoundaryFace::Left => {
                for z in 0..nz {
                    for y in 0..ny {
                        self.stamp_cell(0, y, z, strength);
                    }
                }
            }
            BoundaryFace::Right => {
                for z in 0..nz {
                    for y in 0..ny {
                        self.stamp_cell(nx - 1, y, z, strength);
                    }
                }
            }
            BoundaryFace::Down => {
                for z in 0..nz {
                    for x in 0..nx {
                        self.stamp_cell(x, 0, z, strength);
                    }
                }
            }
            BoundaryFace::Up => {
                for z in 0..nz {
                    for x in 0..nx {
                        self.stamp_cell(x, ny - 1, z, strength);
                    }
                }
            }
        }
    }

    fn stamp_cell(&mut self, x: usize, y: usize, z: usize, strength: Float) {
        let cell = self.get_cell_mut(&[x, y, z]);
        cell.potential = strength;
        cell.is_boundary = true;
    }
}
