use super::Lattice;
use crate::global_variables::*;
use crate::post::PostResult;
use rayon::prelude::*;

pub fn compute_mean_potential(lattice: &Lattice) -> Vec<PostResult> {
    let potential_sum = lattice
        .cells
        .par_iter()
        .map(|cell| cell.potential)
        .sum::<Float>();
    let potential_mean = potential_sum / (lattice.len() as Float);
    let mean_result: PostResult = PostResult::new("mean_potential".to_string(), potential_mean);
    vec![mean_result]
}

pub fn compute_potential_extrema(lattice: &Lattice) -> Vec<PostResult> {
    let interior = lattice.cells.par_iter().filter(|cell| !cell.is_boundary);
    let potential_min = interior
        .clone()
        .map(|cell| cell.potential)
        .reduce(|| Float::INFINITY, Float::min);
    let potential_max = interior
        .map(|cell| cell.potential)
        .reduce(|| Float::NEG_INFINITY, Float::max);
    let min_result: PostResult = PostResult::new("min_potential".to_string(), potential_min);
    let max_result: PostResult = PostResult::new("max_potential".to_string(), potential_max);
    vec![min_result, max_result]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::d2::FaceStrengths;

    #[test]
    fn post_results_carry_named_diagnostics() {
        // 12 boundary cells at 0.5 and 4 interior cells at 0.25.
        let lattice = Lattice::new(4, 4, FaceStrengths::uniform(0.5), 0.25).unwrap();
        let mean = compute_mean_potential(&lattice);
        assert_eq!(mean[0].name, "mean_potential");
        assert_eq!(mean[0].value, 7.0 / 16.0);
        let extrema = compute_potential_extrema(&lattice);
        assert_eq!(extrema[0].name, "min_potential");
        assert_eq!(extrema[1].name, "max_potential");
        assert_eq!(extrema[0].value, 0.25);
        assert_eq!(extrema[1].value, 0.25);
    }
}
