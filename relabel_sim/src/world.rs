//! Synthetic capture generator.
//!
//! Markers orbit well-separated centers on smooth paths, so spatial
//! proximity is an unambiguous ground-truth signal. A "cut" moves one
//! marker's tail onto a fresh unlabeled trajectory, reproducing what a
//! tracker does when it loses and re-acquires a marker under a new identity.

use nalgebra::{Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use relabel_core::spike;
use relabel_host::{MemoryHost, TrajectoryId};
use std::f64::consts::TAU;

/// Configuration of one synthetic capture.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Master seed; every random choice derives from it
    pub seed: u64,

    /// Number of labeled markers
    pub markers: usize,

    /// Recording length in frames
    pub frames: usize,

    /// Capture rate in Hz
    pub sample_rate_hz: f64,

    /// Standard deviation of per-axis measurement noise, in meters
    pub noise_std: f64,

    /// Probability that any one frame of a marker is a gap
    pub dropout: f64,

    /// Frame at which the donor marker's tail is cut onto the trouble id
    pub cut_frame: usize,

    /// Isolated spikes injected into each marker's history
    pub spikes_per_marker: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            markers: 6,
            frames: 600,
            sample_rate_hz: 100.0,
            noise_std: 0.0,
            dropout: 0.0,
            cut_frame: 300,
            spikes_per_marker: 0,
        }
    }
}

/// A generated capture loaded into an in-memory host.
pub struct SyntheticCapture {
    pub host: MemoryHost,

    /// Labeled marker trajectories, in insertion order
    pub marker_ids: Vec<TrajectoryId>,

    /// Marker labels, parallel to `marker_ids`
    pub labels: Vec<String>,

    /// The unlabeled fragment cut from the donor marker
    pub trouble_id: TrajectoryId,

    /// Index into `marker_ids` of the marker the fragment belongs to
    pub donor: usize,

    /// Frame where the cut happened
    pub cut_frame: usize,
}

/// Ideal (noise-free) position of one marker at one frame.
fn marker_position(marker: usize, markers: usize, frame: usize, sample_rate_hz: f64) -> Point3<f64> {
    let phase = marker as f64 * TAU / markers as f64;
    let center = Point3::new(1.2 * phase.cos(), 1.2 * phase.sin(), 1.0);

    let t = frame as f64 / sample_rate_hz;
    let angle = TAU * 0.25 * t + phase;
    center
        + Vector3::new(
            0.1 * angle.cos(),
            0.1 * angle.sin(),
            0.05 * (0.5 * angle).sin(),
        )
}

/// Builds a capture from the configuration.
pub fn generate(config: &WorldConfig) -> SyntheticCapture {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_std.max(f64::MIN_POSITIVE)).unwrap();
    let donor = rng.gen_range(0..config.markers);

    let mut host = MemoryHost::new(config.sample_rate_hz);
    let mut marker_ids = Vec::with_capacity(config.markers);
    let mut labels = Vec::with_capacity(config.markers);
    let mut trouble_samples: Vec<Option<Point3<f64>>> = vec![None; config.frames];

    for marker in 0..config.markers {
        let mut samples: Vec<Option<Point3<f64>>> = Vec::with_capacity(config.frames);
        for frame in 0..config.frames {
            if config.dropout > 0.0 && rng.gen_bool(config.dropout) {
                samples.push(None);
                continue;
            }
            let ideal = marker_position(marker, config.markers, frame, config.sample_rate_hz);
            let jitter = if config.noise_std > 0.0 {
                Vector3::new(
                    noise.sample(&mut rng),
                    noise.sample(&mut rng),
                    noise.sample(&mut rng),
                )
            } else {
                Vector3::zeros()
            };
            samples.push(Some(ideal + jitter));
        }

        inject_spikes(&mut samples, config, &mut rng);

        if marker == donor {
            // The tail becomes the trouble fragment; the marker goes dark
            for frame in config.cut_frame..config.frames {
                trouble_samples[frame] = samples[frame].take();
            }
        }

        let label = format!("Marker_{marker:02}");
        let id = host.insert(Some(&label), samples);
        marker_ids.push(id);
        labels.push(label);
    }

    let trouble_id = host.insert(None, trouble_samples);

    SyntheticCapture {
        host,
        marker_ids,
        labels,
        trouble_id,
        donor,
        cut_frame: config.cut_frame,
    }
}

/// Displaces a few jittered, well-spaced frames by a large offset.
///
/// Spacing keeps spikes isolated from each other, so one spike's median
/// window never contains another spike. Frames near the cut are skipped:
/// the fragment's first samples are the operator's query point and must
/// reflect the marker's real path.
fn inject_spikes(
    samples: &mut [Option<Point3<f64>>],
    config: &WorldConfig,
    rng: &mut ChaCha8Rng,
) {
    if config.spikes_per_marker == 0 || config.frames < 8 {
        return;
    }
    let stride = (config.frames / (config.spikes_per_marker + 1)).max(1);
    let jitter = (stride / 4).max(1) as i64;
    for i in 1..=config.spikes_per_marker {
        let frame = (i * stride) as i64 + rng.gen_range(-jitter..jitter);
        let frame = frame.clamp(2, config.frames as i64 - 3) as usize;
        if frame.abs_diff(config.cut_frame) <= 2 * spike::MEDIAN_WINDOW {
            continue;
        }
        if let Some(position) = samples[frame] {
            let direction = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            samples[frame] = Some(position + direction.normalize());
        }
    }
}
