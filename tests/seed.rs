use std::io::Write;

use band_life::{BandLife, BandLifeConfig, SeedError, TextSink, load_seed};

fn seed_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create seed file");
    file.write_all(contents.as_bytes()).expect("write seed file");
    file
}

#[test]
fn loads_glider_seed_from_file() {
    let file = seed_file("10 12\n5\n1 0\n2 1\n0 2\n1 2\n2 2\n");
    let grid = load_seed(file.path()).unwrap();

    assert_eq!(grid.width(), 12);
    assert_eq!(grid.height(), 10);
    assert_eq!(grid.population(), 5);
    assert!(grid.get(2, 1));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_seed(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, SeedError::Io { .. }));
    assert!(err.to_string().contains("absent.txt"));
}

#[test]
fn malformed_file_yields_no_grid() {
    let file = seed_file("5 5 2\n0 0\n1 one\n");
    let err = load_seed(file.path()).unwrap_err();
    assert!(matches!(err, SeedError::InvalidCell { index: 1, .. }));
}

#[test]
fn seeded_run_streams_text_frames() {
    let file = seed_file("4 4 4  1 1  2 1  1 2  2 2");
    let grid = load_seed(file.path()).unwrap();
    let mut engine = BandLife::with_config(
        grid,
        BandLifeConfig::default()
            .thread_count(3)
            .turn_delay(std::time::Duration::ZERO),
    );

    let mut sink = TextSink::new(Vec::new());
    engine.run(2, &mut sink).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();

    let frame = "....\n.@@.\n.@@.\n....\n\n";
    let expected: String = (0..=2)
        .map(|step| format!("{frame}Time Step: {step}\n\n"))
        .collect();
    assert_eq!(text, expected);
}

#[test]
fn bundled_demo_seeds_load() {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    let glider = load_seed(demos.join("glider.txt")).unwrap();
    assert_eq!((glider.width(), glider.height()), (20, 20));
    assert_eq!(glider.population(), 5);

    let mut engine = BandLife::new(load_seed(demos.join("block_blinker.txt")).unwrap());
    engine.step_n(2).unwrap();
    assert_eq!(engine.grid(), &load_seed(demos.join("block_blinker.txt")).unwrap());
}
