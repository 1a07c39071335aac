use crate::frame::Point;
use crate::intensity::CentroidSums;

/// Centroid `(sum_ix / sum_i, sum_iy / sum_i)`, or `None` when no pixel
/// cleared the signal floor.
pub fn estimate_centroid(sums: &CentroidSums) -> Option<Point> {
    if sums.sum_i > 0.0 {
        Some(Point {
            x: (sums.sum_ix / sums.sum_i) as f32,
            y: (sums.sum_iy / sums.sum_i) as f32,
        })
    } else {
        None
    }
}
