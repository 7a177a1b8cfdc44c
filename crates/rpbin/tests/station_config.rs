//! Integration tests: the default station configuration end to end.

use rpbin::{fingerprint, Pixel, RawPixelPayload, RpBinConfig, RpBinReader, RpBinWriter};
use test_utils::{create_position_grid, station};

fn station_pixels() -> Vec<Pixel> {
    station::SENSITIVE_PIXELS
        .iter()
        .map(|&p| Pixel::from(p))
        .collect()
}

#[test]
fn test_default_config_matches_station() {
    let config = RpBinConfig::default();
    assert_eq!(config.centre, Pixel::from(station::CENTRE));
    assert_eq!(config.sensitive_pixels, station_pixels());
    assert_eq!(config.heavy_threshold as i32, station::HEAVY_THRESHOLD);
    assert_eq!(config.fingerprint(), station::FINGERPRINT);
}

#[test]
fn test_fingerprint_from_station_fixture() {
    let centre = Pixel::from(station::CENTRE);
    let pixels = station_pixels();
    assert_eq!(
        fingerprint(centre, &pixels, station::HEAVY_THRESHOLD),
        station::FINGERPRINT
    );

    let mut swapped = pixels.clone();
    swapped.swap(0, 1);
    assert_ne!(
        fingerprint(centre, &swapped, station::HEAVY_THRESHOLD),
        station::FINGERPRINT
    );
    assert_ne!(
        fingerprint(centre, &pixels, station::HEAVY_THRESHOLD + 1),
        station::FINGERPRINT
    );
}

#[test]
fn test_offset_grid_absolute_lookup() {
    // A 16x8 window placed at rows 200.., cols 230.. of the station image.
    let grid = create_position_grid(16, 8);
    let raw = RawPixelPayload::from_grid(16, 8, 230, 200, grid).unwrap();

    let mut writer = RpBinWriter::new();
    writer.add_raw_with_rescales(raw, &[2]).unwrap();
    let reader = RpBinReader::from_bytes(&writer.to_bytes().unwrap()).unwrap();

    let full = reader.raw_at_scale(1).unwrap();
    assert_eq!(full.value_at(Pixel::new(200, 230)), Some(0));
    assert_eq!(full.value_at(Pixel::new(203, 235)), Some(3 * 16 + 5));
    assert_eq!(full.value_at(Pixel::new(208, 230)), None);

    // Scale 2 cell (1, 2) covers rows 202..204, cols 234..236.
    let half = reader.raw_at_scale(2).unwrap();
    assert_eq!(half.value_at(Pixel::new(203, 235)), Some(3 * 16 + 5));
    assert_eq!(half.value_at(Pixel::new(202, 234)), Some(3 * 16 + 5));
}
