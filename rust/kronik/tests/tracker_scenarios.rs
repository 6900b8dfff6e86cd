use kronik::serde::{
    read_detection_feed,
    write_profile_report_file,
};
use kronik::{
    CorrelationMode,
    Detection,
    PersistentSignalTracker,
    ProfileSortKey,
    ProfileStore,
    ScanDetectionStore,
    ScanRecord,
    TrackerConfig,
};
use rand::{
    Rng,
    SeedableRng,
};
use rand_chacha::ChaCha8Rng;

/// One detection list per scan, scan numbers start at `first_scan`.
fn build_store(first_scan: u32, scans: &[Vec<(f64, i32, f32)>]) -> ScanDetectionStore {
    let mut store = ScanDetectionStore::default();
    for (i, dets) in scans.iter().enumerate() {
        let scan_number = first_scan + i as u32;
        let mut record = ScanRecord::new(scan_number, scan_number as f32 * 0.05, "synthetic.ms1");
        for &(mass, charge, intensity) in dets {
            let base_peak = (mass + charge as f64 * 1.00727649) / charge as f64;
            record.push(Detection::new(mass, charge, intensity, base_peak));
        }
        store.push(record);
    }
    store
}

fn assert_profile_invariants(profiles: &ProfileStore) {
    for prof in profiles {
        assert!(prof.low_scan <= prof.best_scan, "{:?}", prof);
        assert!(prof.best_scan <= prof.high_scan, "{:?}", prof);
        assert!(
            prof.points()
                .windows(2)
                .all(|w| w[0].scan_number < w[1].scan_number)
        );
        let expect: f32 = prof.points().iter().map(|p| p.intensity).sum();
        assert_eq!(prof.sum_intensity(), expect);
    }
}

#[test]
fn test_five_consecutive_scans_make_one_profile() {
    let scans: Vec<_> = (0..5).map(|_| vec![(1000.0, 2, 5000.0)]).collect();
    let mut store = build_store(1, &scans);
    let tracker = PersistentSignalTracker::new(TrackerConfig::default());
    let profiles = tracker.run(&mut store);

    assert_eq!(profiles.len(), 1);
    let prof = &profiles[0];
    assert_eq!(prof.points().len(), 5);
    assert_eq!(prof.num_interpolated(), 0);
    assert_eq!(prof.low_scan, 1);
    assert_eq!(prof.high_scan, 5);
    // Equal intensities, the earliest scan seeds
    assert_eq!(prof.best_scan, 1);
    assert_eq!(prof.sum_intensity(), 25000.0);
    assert_eq!(store.num_detections(), 0);
    assert_profile_invariants(&profiles);
}

#[test]
fn test_gap_within_tolerance_is_bridged() {
    let scans = vec![
        vec![(1000.0, 2, 100.0)],
        vec![(1000.0, 2, 200.0)],
        vec![(1000.0, 2, 1000.0)],
        vec![],
        vec![(1000.0, 2, 300.0)],
    ];
    let mut store = build_store(1, &scans);
    let profiles = PersistentSignalTracker::new(TrackerConfig::default()).run(&mut store);

    assert_eq!(profiles.len(), 1);
    let prof = &profiles[0];
    assert_eq!((prof.low_scan, prof.best_scan, prof.high_scan), (1, 3, 5));
    assert_eq!(prof.num_interpolated(), 1);
    let gap = prof.points()[3];
    assert_eq!(gap.scan_number, 4);
    assert!(gap.interpolated);
    assert_eq!(gap.intensity, 650.0);
    assert_eq!(gap.xcorr, 0.0);
    assert_profile_invariants(&profiles);
}

#[test]
fn test_gap_beyond_tolerance_breaks_the_run() {
    let scans = vec![
        vec![(1000.0, 2, 100.0)],
        vec![(1000.0, 2, 200.0)],
        vec![(1000.0, 2, 1000.0)],
        vec![],
        vec![],
        vec![(1000.0, 2, 300.0)],
    ];
    let mut store = build_store(1, &scans);
    let tracker = PersistentSignalTracker::new(TrackerConfig::default());
    let (profiles, summary) = tracker.run_with_progress(&mut store, |_| {});

    assert_eq!(profiles.len(), 1);
    let prof = &profiles[0];
    assert_eq!((prof.low_scan, prof.high_scan), (1, 3));
    assert_eq!(prof.num_interpolated(), 0);
    // The isolated detection at scan 6 seeds a run of its own that is rejected
    assert_eq!(summary.discarded_seeds, 1);
    assert_eq!(summary.remaining_detections, 0);
}

#[test]
fn test_interior_gap_interpolation() {
    let scans = vec![
        vec![(1000.0, 2, 100.0)],
        vec![],
        vec![],
        vec![(1000.0, 2, 400.0)],
    ];
    let mut store = build_store(10, &scans);
    let config = TrackerConfig {
        gap_tolerance: 2,
        match_run_length: 2,
        ..Default::default()
    };
    let profiles = PersistentSignalTracker::new(config).run(&mut store);

    assert_eq!(profiles.len(), 1);
    let got: Vec<(u32, f32, bool)> = profiles[0]
        .points()
        .iter()
        .map(|p| (p.scan_number, p.intensity, p.interpolated))
        .collect();
    assert_eq!(
        got,
        vec![
            (10, 100.0, false),
            (11, 200.0, true),
            (12, 300.0, true),
            (13, 400.0, false),
        ]
    );
    assert_eq!(profiles[0].sum_intensity(), 1000.0);
}

#[test]
fn test_mass_outside_ppm_is_not_stitched() {
    // 20 ppm away from the seed
    let scans = vec![
        vec![(1000.02, 2, 100.0)],
        vec![(1000.0, 2, 500.0)],
        vec![(1000.02, 2, 100.0)],
    ];
    let mut store = build_store(1, &scans);
    let profiles = PersistentSignalTracker::new(TrackerConfig::default()).run(&mut store);
    assert!(profiles.is_empty());
}

#[test]
fn test_every_detection_is_accounted_for() {
    let rng = std::cell::RefCell::new(ChaCha8Rng::seed_from_u64(42));
    let masses = [800.4, 1200.6, 1500.75, 2100.05];
    let scans: Vec<Vec<(f64, i32, f32)>> = (0..60)
        .map(|_| {
            masses
                .iter()
                .enumerate()
                .filter(|_| rng.borrow_mut().gen_bool(0.7))
                .map(|(i, &m)| {
                    let jitter = rng.borrow_mut().gen_range(-4e-6..4e-6) * m;
                    let charge = 2 + (i % 2) as i32;
                    (m + jitter, charge, rng.borrow_mut().gen_range(1.0f32..1e5))
                })
                .collect()
        })
        .collect();
    let mut store = build_store(1, &scans);
    let initial = store.num_detections();

    let tracker = PersistentSignalTracker::new(TrackerConfig::default());
    let mut progress = Vec::new();
    let (profiles, summary) = tracker.run_with_progress(&mut store, |p| progress.push(p));

    assert_eq!(summary.initial_detections, initial);
    assert_eq!(summary.remaining_detections, 0);
    assert_eq!(store.num_detections(), 0);
    assert_eq!(
        summary.consumed_detections + summary.discarded_seeds,
        initial
    );
    let observed_points: usize = profiles
        .iter()
        .map(|p| p.num_scans() - p.num_interpolated())
        .sum();
    assert_eq!(observed_points, summary.consumed_detections);
    assert_eq!(summary.num_profiles, profiles.len());
    assert!(!profiles.is_empty());
    assert_profile_invariants(&profiles);

    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.last(), Some(&100));
}

#[test]
fn test_nan_intensities_do_not_panic() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut store = ScanDetectionStore::default();
    let mut num_pushed = 0;
    for scan_number in 1..=16u32 {
        let mut record = ScanRecord::new(scan_number, scan_number as f32 * 0.05, "nan.ms1");
        for slot in 0..4 {
            let mass = 1000.0 + slot as f64 * 250.0;
            let intensity = if num_pushed % 7 == 0 {
                f32::NAN
            } else {
                rng.gen_range(10.0f32..1e4)
            };
            record.push(Detection::new(mass, 2, intensity, (mass + 2.0 * 1.00727649) / 2.0));
            num_pushed += 1;
        }
        store.push(record);
    }
    assert_eq!(num_pushed, 64);

    let tracker = PersistentSignalTracker::new(TrackerConfig::default());
    let (mut profiles, summary) = tracker.run_with_progress(&mut store, |_| {});
    assert_eq!(summary.initial_detections, 64);
    assert_eq!(
        summary.consumed_detections + summary.discarded_seeds,
        64
    );
    assert_eq!(profiles.len(), 4);
    profiles.sort_by(ProfileSortKey::IntensityDescending);
    assert!(profiles.is_sorted_by(ProfileSortKey::IntensityDescending));
}

#[test]
fn test_sorting_is_idempotent_on_tracked_profiles() {
    let scans: Vec<Vec<(f64, i32, f32)>> = (0..10)
        .map(|i| {
            vec![
                (900.0, 2, 50.0 + i as f32),
                (1100.0, 3, 70.0),
                (1300.0, 1, 60.0 - i as f32),
            ]
        })
        .collect();
    let mut store = build_store(1, &scans);
    let mut profiles = PersistentSignalTracker::new(TrackerConfig::default()).run(&mut store);
    assert_eq!(profiles.len(), 3);

    for key in [
        ProfileSortKey::BasePeak,
        ProfileSortKey::MonoMass,
        ProfileSortKey::FirstRetentionTime,
        ProfileSortKey::IntensityDescending,
    ] {
        profiles.sort_by(key);
        let once: Vec<f64> = profiles.iter().map(|p| p.mono_mass).collect();
        profiles.sort_by(key);
        let twice: Vec<f64> = profiles.iter().map(|p| p.mono_mass).collect();
        assert_eq!(once, twice);
        assert!(profiles.is_sorted_by(key));
    }
}

#[test]
fn test_correlating_co_eluting_profiles() {
    let shape = [1.0f32, 3.0, 9.0, 12.0, 9.0, 3.0, 1.0];
    let scans: Vec<Vec<(f64, i32, f32)>> = shape
        .iter()
        .map(|&x| vec![(1000.0, 2, 1000.0 * x), (1500.0, 3, 400.0 * x)])
        .collect();
    let mut store = build_store(1, &scans);
    let profiles = PersistentSignalTracker::new(TrackerConfig::default()).run(&mut store);
    assert_eq!(profiles.len(), 2);

    let res = profiles.correlate(0, 1, CorrelationMode::ByScan).unwrap().unwrap();
    assert_eq!(res.num_pairs, 7);
    assert!((res.r - 1.0).abs() < 1e-6);
    assert!(res.p_value < 1e-3);

    let apex = profiles
        .correlate(0, 1, CorrelationMode::new(false, true))
        .unwrap()
        .unwrap();
    assert!((apex.r - res.r).abs() < 1e-9);
}

#[test]
fn test_feed_to_report_round() {
    let dir = tempfile::tempdir().unwrap();
    let feed_path = dir.path().join("run.hk");
    let report_path = dir.path().join("run.kro");

    let mut feed = String::new();
    for scan in 1..=4u32 {
        feed.push_str(&format!("S\t{}\t{:.2}\trun.ms1\n", scan, scan as f32 * 0.1));
        feed.push_str(&format!(
            "P\t1000.0000\t2\t{:.1}\t501.0073\t500.5000-503.5000\t0.0000\t_\t0.9000\n",
            1000.0 * scan as f32
        ));
    }
    std::fs::write(&feed_path, feed).unwrap();

    let mut store = read_detection_feed(&feed_path).unwrap();
    assert_eq!(store.num_detections(), 4);
    let profiles = PersistentSignalTracker::new(TrackerConfig::default()).run(&mut store);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].best_scan, 4);

    write_profile_report_file(&profiles, &report_path).unwrap();
    let report = std::fs::read_to_string(&report_path).unwrap();
    let row: Vec<&str> = report.lines().nth(1).unwrap().split('\t').collect();
    assert_eq!(row[0], "NULL");
    assert_eq!(row[1], "1");
    assert_eq!(row[2], "4");
    assert_eq!(row[3], "4");
    assert_eq!(row[8], "10000.000000");
}
