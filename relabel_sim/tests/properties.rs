//! Property tests over generated captures.

use nalgebra::Point3;
use proptest::prelude::*;
use relabel_core::{resolver, spike, TroublePool};
use relabel_host::{HostContext, MemoryHost};
use relabel_sim::{generate, WorldConfig};

proptest! {
    /// After any two loads, the pool is exactly the labeled subset of the
    /// second selection - never a union with the first.
    #[test]
    fn pool_equals_labeled_subset_of_last_selection(
        labeled in proptest::collection::vec(any::<bool>(), 6),
        first in proptest::collection::vec(any::<bool>(), 6),
        second in proptest::collection::vec(any::<bool>(), 6),
    ) {
        let mut host = MemoryHost::new(100.0);
        let ids: Vec<_> = labeled
            .iter()
            .enumerate()
            .map(|(i, &is_labeled)| {
                let label = is_labeled.then(|| format!("Marker_{i:02}"));
                host.insert(label.as_deref(), vec![Some(Point3::new(i as f64, 0.0, 0.0))])
            })
            .collect();

        let pick = |mask: &[bool]| {
            ids.iter()
                .zip(mask)
                .filter_map(|(&id, &selected)| selected.then_some(id))
                .collect::<Vec<_>>()
        };

        let mut pool = TroublePool::new();
        host.select(&pick(&first));
        pool.load(&mut host);
        host.select(&pick(&second));
        pool.load(&mut host);

        let expected: Vec<_> = ids
            .iter()
            .zip(second.iter().zip(&labeled))
            .filter_map(|(&id, (&selected, &is_labeled))| (selected && is_labeled).then_some(id))
            .collect();
        let actual: Vec<_> = pool.entries().iter().map(|e| e.id).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Two resolutions over the same capture always agree.
    #[test]
    fn resolution_is_deterministic(seed in any::<u64>()) {
        let config = WorldConfig {
            seed,
            noise_std: 0.004,
            dropout: 0.15,
            ..Default::default()
        };
        let mut capture = generate(&config);

        capture.host.select(&capture.marker_ids);
        let mut pool = TroublePool::new();
        pool.load(&mut capture.host);

        let reference = capture
            .host
            .samples(capture.trouble_id)
            .unwrap()
            .iter()
            .position(Option::is_some);
        prop_assume!(reference.is_some());
        let frame = reference.unwrap();

        let one = resolver::resolve(&capture.host, &pool, capture.trouble_id, frame);
        let two = resolver::resolve(&capture.host, &pool, capture.trouble_id, frame);
        match (one, two) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "resolution outcome changed between runs"),
        }
    }

    /// The vote lands on the marker the fragment was actually cut from.
    #[test]
    fn vote_recovers_ground_truth_donor(seed in any::<u64>()) {
        let config = WorldConfig {
            seed,
            noise_std: 0.004,
            dropout: 0.15,
            ..Default::default()
        };
        let mut capture = generate(&config);

        capture.host.select(&capture.marker_ids);
        let mut pool = TroublePool::new();
        pool.load(&mut capture.host);

        let reference = capture
            .host
            .samples(capture.trouble_id)
            .unwrap()
            .iter()
            .position(Option::is_some);
        prop_assume!(reference.is_some());

        let resolution = resolver::resolve(
            &capture.host,
            &pool,
            capture.trouble_id,
            reference.unwrap(),
        );
        prop_assert_eq!(
            resolution.unwrap().winner,
            capture.marker_ids[capture.donor]
        );
    }

    /// Applying the median cut filter twice has no effect beyond the first
    /// application, whatever the capture looks like.
    #[test]
    fn median_cut_is_idempotent(seed in any::<u64>(), spikes in 0usize..4) {
        let config = WorldConfig {
            seed,
            noise_std: 0.0004,
            dropout: 0.1,
            spikes_per_marker: spikes,
            ..Default::default()
        };
        let capture = generate(&config);

        for &id in &capture.marker_ids {
            let history = capture.host.history(id).unwrap();
            let once = spike::median_cut(&history, config.sample_rate_hz);
            let twice = spike::median_cut(&once, config.sample_rate_hz);
            prop_assert_eq!(once, twice);
        }
    }
}
