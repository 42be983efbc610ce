//! End-to-end feature extraction on synthetic epochs

use std::f64::consts::{FRAC_PI_2, PI};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rootstar_qeeg_core::{Condition, EpochSet, FeatureConfig};
use rootstar_qeeg_native::features::alpha_peak::AlphaPeak;
use rootstar_qeeg_native::{extract_features, EpochsByCondition, FeatureError, FeatureExtractor};

const FS: f64 = 250.0;
const N_SAMPLES: usize = 500;

/// Build an epoch set from `signal(epoch, channel, sample) -> volts`
fn epochs_from<F>(channels: &[&str], n_epochs: usize, condition: Condition, mut signal: F) -> EpochSet
where
    F: FnMut(usize, usize, usize) -> f64,
{
    let mut data = Vec::with_capacity(n_epochs * channels.len() * N_SAMPLES);
    for e in 0..n_epochs {
        for c in 0..channels.len() {
            for i in 0..N_SAMPLES {
                data.push(signal(e, c, i));
            }
        }
    }
    let names = channels.iter().map(ToString::to_string).collect();
    EpochSet::new(FS, names, condition, n_epochs, N_SAMPLES, data).unwrap()
}

fn noise_epochs(channels: &[&str], n_epochs: usize, seed: u64, condition: Condition) -> EpochSet {
    let mut rng = Pcg64::seed_from_u64(seed);
    epochs_from(channels, n_epochs, condition, |_, _, _| 20e-6 * (rng.random::<f64>() - 0.5))
}

const TEN_TWENTY: [&str; 19] = [
    "Fp1", "Fp2", "F7", "F3", "Fz", "F4", "F8", "T7", "C3", "Cz", "C4", "T8", "P7", "P3", "Pz", "P4",
    "P8", "O1", "O2",
];

#[test]
fn test_no_input_fails() {
    assert!(matches!(extract_features(&EpochsByCondition::default()), Err(FeatureError::InputAbsent)));
}

#[test]
fn test_relative_power_sums_to_one() {
    let input = EpochsByCondition {
        eyes_open: None,
        eyes_closed: Some(noise_epochs(&TEN_TWENTY, 4, 1, Condition::EyesClosed)),
    };
    let result = extract_features(&input).unwrap();
    let power = result.band_power.ec.as_ref().unwrap();

    assert_eq!(power.len(), 19);
    for name in TEN_TWENTY {
        let bands = power.channel(name).unwrap();
        assert_eq!(bands.len(), 8);
        let sum: f64 = bands.values().map(|p| p.relative).sum();
        assert!((sum - 1.0).abs() < 1e-6, "{name}: {sum}");
        assert!(bands.values().all(|p| p.absolute >= 0.0));
    }
}

#[test]
fn test_connectivity_matrices_are_well_formed() {
    let input = EpochsByCondition {
        eyes_open: Some(noise_epochs(&TEN_TWENTY, 3, 2, Condition::EyesOpen)),
        eyes_closed: None,
    };
    let result = extract_features(&input).unwrap();
    let report = result.connectivity.eo.as_ref().unwrap();

    assert_eq!(report.len(), 4);
    for band in report.values() {
        let m = &band.matrix;
        assert_eq!(m.size(), 19);
        for i in 0..19 {
            for j in 0..19 {
                assert_eq!(m.get(i, j), m.get(j, i));
                if i != j {
                    // Noise at EEG amplitude: small but never degenerate
                    assert!(m.get(i, j) > 0.0 && m.get(i, j) <= 1.0, "({i}, {j}): {}", m.get(i, j));
                }
            }
        }

        let metrics = &band.network_metrics;
        assert!(metrics.global_efficiency > 0.0 && metrics.global_efficiency <= 1.0);
        assert!((0.0..=1.0).contains(&metrics.mean_clustering_coefficient));
        assert!((0.0..=1.0).contains(&metrics.interhemispheric_connectivity));
        assert!(metrics.small_worldness.is_finite());
        assert_eq!(metrics.node_strength.len(), 19);
        assert!(metrics.regional_connectivity.contains_key("frontal_posterior"));
        assert_eq!(band.pairwise.len(), 7);
    }
}

#[test]
fn test_phase_locked_pair_is_fully_synchronised() {
    // 10 Hz, second channel lags by 90°
    let epochs = epochs_from(&["O1", "O2"], 6, Condition::EyesClosed, |e, c, i| {
        let t = (e * N_SAMPLES + i) as f64 / FS;
        let lag = if c == 1 { FRAC_PI_2 } else { 0.0 };
        10e-6 * (2.0 * PI * 10.0 * t - lag).sin()
    });
    let input = EpochsByCondition { eyes_open: None, eyes_closed: Some(epochs) };

    let result = extract_features(&input).unwrap();
    let alpha = &result.connectivity.ec.as_ref().unwrap()["alpha"];
    assert!(alpha.matrix.get(0, 1) > 0.95, "wPLI {}", alpha.matrix.get(0, 1));
    assert!(alpha.pairwise[0].wpli > 0.95);
}

#[test]
fn test_independent_noise_is_unsynchronised() {
    let epochs = noise_epochs(&["C3", "C4"], 30, 11, Condition::EyesOpen);
    let input = EpochsByCondition { eyes_open: Some(epochs), eyes_closed: None };

    let result = extract_features(&input).unwrap();
    for (band, conn) in result.connectivity.eo.as_ref().unwrap() {
        let wpli = conn.matrix.get(0, 1);
        assert!(wpli > 0.0 && wpli < 0.35, "{band}: wPLI {wpli}");
    }
}

#[test]
fn test_alpha_peak_of_sine_in_noise() {
    let mut rng = Pcg64::seed_from_u64(5);
    let epochs = epochs_from(&["O1", "Fz"], 20, Condition::EyesClosed, |e, c, i| {
        let t = (e * N_SAMPLES + i) as f64 / FS;
        let noise = 4e-6 * (rng.random::<f64>() - 0.5);
        if c == 0 {
            noise + 10e-6 * (2.0 * PI * 10.0 * t).sin()
        } else {
            noise
        }
    });
    let input = EpochsByCondition { eyes_open: None, eyes_closed: Some(epochs) };

    let result = extract_features(&input).unwrap();
    let peaks = result.alpha_peak.ec.as_ref().unwrap();
    let o1 = peaks["O1"];
    assert!((o1.peak_frequency - 10.0).abs() < 0.25, "peak at {}", o1.peak_frequency);
    assert!(o1.peak_power > 0.0);
    assert!(peaks["Fz"] == AlphaPeak::NOT_FOUND || (8.0..=12.0).contains(&peaks["Fz"].peak_frequency));
}

#[test]
fn test_flat_signal_degrades_gracefully() {
    let epochs = epochs_from(&["F3", "F4", "P3"], 3, Condition::EyesClosed, |_, _, _| 0.0);
    let input = EpochsByCondition { eyes_open: None, eyes_closed: Some(epochs) };

    let result = extract_features(&input).unwrap();

    let lzc = result.lzc.ec.as_ref().unwrap();
    assert!(lzc.values().all(|c| c.lzc == 2.0));

    let power = result.band_power.ec.as_ref().unwrap();
    for name in ["F3", "F4", "P3"] {
        assert!(power.channel(name).unwrap().values().all(|p| p.absolute == 0.0 && p.relative == 0.0));
    }

    let peaks = result.alpha_peak.ec.as_ref().unwrap();
    assert!(peaks.values().all(|p| *p == AlphaPeak::NOT_FOUND));

    for conn in result.connectivity.ec.as_ref().unwrap().values() {
        assert_eq!(conn.matrix.upper_triangle(), vec![0.0; 3]);
        assert_eq!(conn.network_metrics.small_worldness, 0.0);
    }
    assert_eq!(result.asymmetry["frontal_alpha"], 0.0);
}

#[test]
fn test_reduced_montage_omits_missing_channels() {
    let input = EpochsByCondition {
        eyes_open: None,
        eyes_closed: Some(noise_epochs(&["F3", "Cz", "O1"], 3, 3, Condition::EyesClosed)),
    };
    let result = extract_features(&input).unwrap();

    for conn in result.connectivity.ec.as_ref().unwrap().values() {
        assert!(conn.pairwise.is_empty());
        assert!(conn.network_metrics.regional_connectivity.get("frontal").is_none());
        assert!(conn.network_metrics.regional_connectivity.contains_key("frontal_posterior"));
        assert_eq!(conn.network_metrics.interhemispheric_connectivity, 0.0);
    }
    assert!(result.asymmetry.values().all(|&a| a == 0.0));
    assert!(result.band_ratios["theta_beta_ratio"]["central_avg"] > 0.0);
}

/// Per-channel noise that depends only on the channel name
fn montage_epochs(channels: &[&str], n_epochs: usize) -> EpochSet {
    let per_channel: Vec<Vec<f64>> = channels
        .iter()
        .map(|name| {
            let seed = TEN_TWENTY.iter().position(|c| c == name).unwrap() as u64;
            let mut rng = Pcg64::seed_from_u64(1000 + seed);
            (0..n_epochs * N_SAMPLES).map(|_| 20e-6 * (rng.random::<f64>() - 0.5)).collect()
        })
        .collect();
    epochs_from(channels, n_epochs, Condition::EyesClosed, |e, c, i| per_channel[c][e * N_SAMPLES + i])
}

#[test]
fn test_missing_channels_leave_present_ones_unchanged() {
    let reduced_names = ["F3", "F4", "O1"];
    let full = extract_features(&EpochsByCondition {
        eyes_open: None,
        eyes_closed: Some(montage_epochs(&TEN_TWENTY, 4)),
    })
    .unwrap();
    let reduced = extract_features(&EpochsByCondition {
        eyes_open: None,
        eyes_closed: Some(montage_epochs(&reduced_names, 4)),
    })
    .unwrap();

    let full_power = full.band_power.ec.as_ref().unwrap();
    let reduced_power = reduced.band_power.ec.as_ref().unwrap();
    let full_lzc = full.lzc.ec.as_ref().unwrap();
    let reduced_lzc = reduced.lzc.ec.as_ref().unwrap();
    for name in reduced_names {
        assert_eq!(full_power.channel(name), reduced_power.channel(name), "{name}");
        assert_eq!(full_lzc[name], reduced_lzc[name], "{name}");
    }

    assert_ne!(full.asymmetry["frontal_alpha"], 0.0);
    assert_eq!(full.asymmetry["frontal_alpha"], reduced.asymmetry["frontal_alpha"]);
    assert_eq!(full.asymmetry["frontal_theta"], reduced.asymmetry["frontal_theta"]);

    let full_conn = full.connectivity.ec.as_ref().unwrap();
    let reduced_conn = reduced.connectivity.ec.as_ref().unwrap();
    for (band, conn) in full_conn {
        let full_wpli = conn.matrix.get(3, 5); // F3, F4
        let reduced_wpli = reduced_conn[band].matrix.get(0, 1);
        assert!(full_wpli > 0.0, "{band}");
        assert_eq!(full_wpli, reduced_wpli, "{band}");

        let pair = |c: &rootstar_qeeg_native::features::BandConnectivity| {
            c.pairwise.iter().find(|p| p.ch1 == "F3" && p.ch2 == "F4").map(|p| p.wpli)
        };
        assert_eq!(pair(conn), Some(full_wpli));
        assert_eq!(pair(&reduced_conn[band]), Some(full_wpli));
    }
}

#[test]
fn test_eyes_open_only_result() {
    let input = EpochsByCondition {
        eyes_open: Some(noise_epochs(&["F3", "F4", "O1", "O2"], 2, 4, Condition::EyesOpen)),
        eyes_closed: None,
    };
    let result = extract_features(&input).unwrap();
    assert_eq!(result.primary_condition, Condition::EyesOpen);

    let json = result.to_json().unwrap();
    for key in ["band_power", "connectivity", "lzc", "alpha_peak"] {
        assert!(json[key]["ec"].is_null(), "{key}");
        assert!(json[key]["eo"].is_object(), "{key}");
    }
    assert!(json["band_ratios"]["theta_beta_ratio"]["frontal_avg"].is_number());
    assert!(json["asymmetry"]["frontal_alpha"].is_number());
    assert!(json["risk_patterns"]["adhd_like"].is_boolean());
    assert!(json["connectivity"]["eo"]["alpha"]["matrix"][0].is_array());
    assert_eq!(json["connectivity"]["eo"]["alpha"]["pairwise"][0]["type"], "interhemispheric");
}

#[test]
fn test_eyes_closed_is_primary() {
    // Eyes-closed power is flat, eyes-open is not
    let eo = epochs_from(&["F3", "F4"], 2, Condition::EyesOpen, |_, c, i| {
        let amp = if c == 0 { 10e-6 } else { 2e-6 };
        amp * (2.0 * PI * 11.0 * i as f64 / FS).sin()
    });
    let ec = noise_epochs(&["F3", "F4"], 2, 9, Condition::EyesClosed);
    let input = EpochsByCondition { eyes_open: Some(eo), eyes_closed: Some(ec.clone()) };

    let both = extract_features(&input).unwrap();
    let ec_only =
        extract_features(&EpochsByCondition { eyes_open: None, eyes_closed: Some(ec) }).unwrap();

    assert_eq!(both.primary_condition, Condition::EyesClosed);
    assert_eq!(both.asymmetry, ec_only.asymmetry);
    assert_eq!(both.band_ratios, ec_only.band_ratios);
    assert_eq!(both.band_power.ec, ec_only.band_power.ec);
}

#[test]
fn test_extraction_is_deterministic() {
    let input = EpochsByCondition {
        eyes_open: Some(noise_epochs(&["Fp1", "Fp2", "C3", "C4"], 3, 21, Condition::EyesOpen)),
        eyes_closed: Some(noise_epochs(&["Fp1", "Fp2", "C3", "C4"], 3, 22, Condition::EyesClosed)),
    };
    let extractor = FeatureExtractor::new(FeatureConfig::default());

    let first = extractor.extract(&input).unwrap();
    let second = extractor.extract(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.to_json().unwrap()).unwrap(),
        serde_json::to_string(&second.to_json().unwrap()).unwrap()
    );
}
