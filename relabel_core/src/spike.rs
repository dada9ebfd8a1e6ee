//! Spike detection and the median cut filter.
//!
//! A spike is a frame whose acceleration magnitude exceeds a hardcoded limit
//! of 150 m/s², the same default the host's trajectory editor uses. The
//! median cut filter replaces each spike with the median of the curve around
//! it; applying the filter twice (or more) has no effect on the data, which
//! pairs well with a smoothing filter downstream.
//!
//! Both functions are pure transforms over a windowed view of the history.
//! Replacement values are all computed from the input before any is applied,
//! so one spike's replacement never feeds into another's window.

use crate::geom;
use nalgebra::Point3;

/// Acceleration magnitude above which a frame counts as a spike, in m/s².
pub const SPIKE_ACCEL_LIMIT: f64 = 150.0;

/// Frames on each side of a spike that contribute to its replacement median.
pub const MEDIAN_WINDOW: usize = 3;

/// Returns the frames whose acceleration magnitude exceeds
/// [`SPIKE_ACCEL_LIMIT`].
///
/// Acceleration is the central second difference scaled by the sample rate
/// squared. Frames adjacent to a gap are skipped: an absent neighbor makes
/// the difference meaningless, and absent samples are never read as the
/// origin.
pub fn find_spikes(history: &[Option<Point3<f64>>], sample_rate_hz: f64) -> Vec<usize> {
    let rate_sq = sample_rate_hz * sample_rate_hz;
    let mut spikes = Vec::new();

    for frame in 1..history.len().saturating_sub(1) {
        let (Some(prev), Some(cur), Some(next)) = (
            history[frame - 1].as_ref(),
            history[frame].as_ref(),
            history[frame + 1].as_ref(),
        ) else {
            continue;
        };

        let acceleration = ((next - cur) - (cur - prev)) * rate_sq;
        if acceleration.norm() > SPIKE_ACCEL_LIMIT {
            spikes.push(frame);
        }
    }

    spikes
}

/// Replaces every spike with the component-wise median of the present
/// samples around it, and returns the filtered history.
///
/// Idempotent: a second application finds no spikes left and returns the
/// data unchanged.
pub fn median_cut(
    history: &[Option<Point3<f64>>],
    sample_rate_hz: f64,
) -> Vec<Option<Point3<f64>>> {
    let mut filtered: Vec<Option<Point3<f64>>> = history.to_vec();

    for frame in find_spikes(history, sample_rate_hz) {
        if let Some(median) = window_median(history, frame) {
            filtered[frame] = Some(median);
        }
    }

    filtered
}

/// Component-wise median of the present samples within [`MEDIAN_WINDOW`]
/// frames of `frame`, the spike sample itself excluded.
fn window_median(history: &[Option<Point3<f64>>], frame: usize) -> Option<Point3<f64>> {
    let lo = frame.saturating_sub(MEDIAN_WINDOW);
    let hi = (frame + MEDIAN_WINDOW).min(history.len() - 1);

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut zs = Vec::new();
    for (i, position) in geom::present(&history[lo..=hi]) {
        if lo + i == frame {
            continue;
        }
        xs.push(position.x);
        ys.push(position.y);
        zs.push(position.z);
    }

    if xs.is_empty() {
        return None;
    }
    Some(Point3::new(median(xs), median(ys), median(zs)))
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 100.0;

    /// Straight-line motion at 1 mm per frame, with optional displaced frames.
    fn line(frames: usize) -> Vec<Option<Point3<f64>>> {
        (0..frames)
            .map(|i| Some(Point3::new(i as f64 * 0.001, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn test_smooth_motion_has_no_spikes() {
        assert!(find_spikes(&line(50), RATE).is_empty());
    }

    #[test]
    fn test_displaced_frame_is_detected() {
        let mut history = line(50);
        history[20] = Some(Point3::new(1.0, 0.0, 0.0));

        let spikes = find_spikes(&history, RATE);
        assert!(spikes.contains(&20));
    }

    #[test]
    fn test_frames_adjacent_to_gaps_are_skipped() {
        let mut history = line(50);
        history[20] = Some(Point3::new(1.0, 0.0, 0.0));
        history[19] = None;
        history[21] = None;

        // The displaced frame has no present neighbors, so no acceleration
        // can be formed there
        assert!(find_spikes(&history, RATE).is_empty());
    }

    #[test]
    fn test_median_cut_flattens_spike() {
        let mut history = line(50);
        history[20] = Some(Point3::new(1.0, 0.0, 0.0));

        let filtered = median_cut(&history, RATE);
        let replaced = filtered[20].unwrap();

        // Replacement lands back on the local curve, far from the spike
        assert!((replaced.x - 0.020).abs() < 0.005);
        assert!(find_spikes(&filtered, RATE).is_empty());
    }

    #[test]
    fn test_median_cut_is_idempotent() {
        let mut history = line(80);
        history[15] = Some(Point3::new(0.8, 0.2, -0.1));
        history[47] = Some(Point3::new(-0.5, 0.0, 0.9));

        let once = median_cut(&history, RATE);
        let twice = median_cut(&once, RATE);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_median_cut_preserves_clean_frames_and_gaps() {
        let mut history = line(50);
        history[10] = None;
        history[30] = Some(Point3::new(2.0, 0.0, 0.0));

        let filtered = median_cut(&history, RATE);

        assert_eq!(filtered[10], None);
        for frame in (0..50).filter(|&f| !(29..=31).contains(&f)) {
            assert_eq!(filtered[frame], history[frame], "frame {frame} changed");
        }
    }

    #[test]
    fn test_spike_replaced_from_sparse_window() {
        let mut history = vec![None; 9];
        history[3] = Some(Point3::new(0.0, 0.0, 0.0));
        history[4] = Some(Point3::new(1.0, 0.0, 0.0));
        history[5] = Some(Point3::new(0.0, 0.0, 0.0));

        let spikes = find_spikes(&history, RATE);
        assert_eq!(spikes, vec![4]);

        // The only window samples are the spike's own neighbors
        let filtered = median_cut(&history, RATE);
        assert_eq!(filtered[4], Some(Point3::new(0.0, 0.0, 0.0)));
    }
}
