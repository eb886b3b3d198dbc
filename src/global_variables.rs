pub const CASE_NAME: &'static str = "Case Test";

pub type Float = f32;

pub const ALLOWED_ERROR: Float = 1e-5;

pub const ALLOWED_ITER: usize = 1000;

pub const SOR_COEF: Float = 1.0;

pub const SOR_COEF_MIN: Float = 1.0;

pub const SOR_COEF_MAX: Float = 1.3;

// The two original variants ship different neutral interior values.
pub const INTERIOR_DEFAULT_2D: Float = 0.0;

pub const INTERIOR_DEFAULT_3D: Float = 0.5;
