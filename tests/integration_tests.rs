//! Integration tests for delivery fee calculation

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use delivery_fee::{
    DeliveryFeeConfig, FeeCalculator, FeeError, SnapshotStore, WeatherImporter, WeatherSnapshot,
};
use delivery_fee::models::WeatherField;
use rstest::rstest;

fn request_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 28, 12, 0, 0).unwrap()
}

fn calculator(snapshots: Vec<WeatherSnapshot>) -> FeeCalculator<SnapshotStore> {
    let store = SnapshotStore::new();
    store.record_all(snapshots);
    FeeCalculator::with_defaults(store)
}

fn clear_weather(station: &str) -> WeatherSnapshot {
    WeatherSnapshot::new(station, request_time() - Duration::minutes(45))
        .with_temperature(10.0)
        .with_wind_speed(5.0)
        .with_phenomenon("clear")
}

fn tallinn(snapshot: WeatherSnapshot) -> FeeCalculator<SnapshotStore> {
    calculator(vec![snapshot])
}

fn harku() -> WeatherSnapshot {
    WeatherSnapshot::new("Tallinn-Harku", request_time() - Duration::minutes(45))
}

#[rstest]
#[case("Tallinn", "car", 4.0)]
#[case("Tallinn", "scooter", 3.5)]
#[case("Tallinn", "bike", 3.0)]
#[case("Tartu", "car", 3.5)]
#[case("Tartu", "scooter", 3.0)]
#[case("Tartu", "bike", 2.5)]
#[case("Pärnu", "car", 3.0)]
#[case("Pärnu", "scooter", 2.5)]
#[case("Pärnu", "bike", 2.0)]
fn test_clear_weather_costs_exactly_base_fee(
    #[case] city: &str,
    #[case] vehicle: &str,
    #[case] expected: f64,
) {
    let calculator = calculator(vec![
        clear_weather("Tallinn-Harku"),
        clear_weather("Tartu-Tõravere"),
        clear_weather("Pärnu"),
    ]);
    assert_eq!(calculator.calculate(city, vehicle, request_time()).unwrap(), expected);
}

#[test]
fn test_tallinn_car_in_clear_weather() {
    let calculator = tallinn(
        harku()
            .with_temperature(10.0)
            .with_wind_speed(5.0)
            .with_phenomenon("clear"),
    );
    assert_eq!(calculator.calculate("tallinn", "car", request_time()).unwrap(), 4.0);
}

#[test]
fn test_scooter_in_extreme_cold() {
    let calculator = tallinn(harku().with_temperature(-15.0));
    assert_eq!(
        calculator.calculate("tallinn", "scooter", request_time()).unwrap(),
        4.5
    );
}

#[test]
fn test_bike_in_strong_wind_is_forbidden() {
    let calculator = tallinn(harku().with_temperature(5.0).with_wind_speed(21.0));
    assert!(matches!(
        calculator.calculate("tallinn", "bike", request_time()),
        Err(FeeError::VehicleUseForbidden { .. })
    ));
}

#[rstest]
#[case(Some(25.0), Some(3.0))]
#[case(Some(-20.0), Some(15.0))]
#[case(None, None)]
fn test_thunder_forbids_bike_regardless_of_other_weather(
    #[case] temperature: Option<f64>,
    #[case] wind: Option<f64>,
) {
    let mut snapshot = harku().with_phenomenon("thunder");
    snapshot.air_temperature = temperature;
    snapshot.wind_speed = wind;

    let err = tallinn(snapshot)
        .calculate("tallinn", "bike", request_time())
        .unwrap_err();
    assert_eq!(err.to_string(), "Usage of selected vehicle type is forbidden");
}

#[test]
fn test_snow_shower_costs_full_snow_surcharge() {
    let calculator = tallinn(
        harku()
            .with_temperature(5.0)
            .with_phenomenon("snow shower"),
    );
    assert_eq!(
        calculator.calculate("tallinn", "scooter", request_time()).unwrap(),
        3.5 + 1.0
    );
}

#[test]
fn test_unknown_city() {
    let calculator = tallinn(harku());
    assert_eq!(
        calculator
            .calculate("unknowncity", "bike", request_time())
            .unwrap_err(),
        FeeError::UnsupportedCity("unknowncity".to_string())
    );
}

#[test]
fn test_unknown_vehicle_type() {
    let calculator = tallinn(harku());
    assert_eq!(
        calculator.calculate("tallinn", "tank", request_time()).unwrap_err(),
        FeeError::UnsupportedVehicleType("tank".to_string())
    );
}

#[test]
fn test_no_observation_before_request_time() {
    let later = WeatherSnapshot::new("Tallinn-Harku", request_time() + Duration::minutes(15))
        .with_phenomenon("clear");
    let calculator = tallinn(later);

    match calculator.calculate("tallinn", "car", request_time()) {
        Err(FeeError::WeatherDataUnavailable { station, at }) => {
            assert_eq!(station, "Tallinn-Harku");
            assert_eq!(at, request_time());
        }
        other => panic!("expected WeatherDataUnavailable, got {other:?}"),
    }
}

#[test]
fn test_uses_most_recent_observation_at_or_before_request() {
    let calculator = calculator(vec![
        harku().with_temperature(-15.0),
        WeatherSnapshot::new("Tallinn-Harku", request_time()).with_temperature(-5.0),
        WeatherSnapshot::new("Tallinn-Harku", request_time() + Duration::hours(1))
            .with_temperature(20.0),
    ]);
    assert_eq!(
        calculator.calculate("tallinn", "scooter", request_time()).unwrap(),
        4.0
    );
    assert_eq!(
        calculator
            .calculate("tallinn", "scooter", request_time() - Duration::minutes(1))
            .unwrap(),
        4.5
    );
}

#[test]
fn test_repeated_calls_are_identical() {
    let calculator = tallinn(
        harku()
            .with_temperature(-3.0)
            .with_wind_speed(12.0)
            .with_phenomenon("Light rain"),
    );
    let first = calculator.calculate("Tallinn", "Bike", request_time()).unwrap();
    for _ in 0..10 {
        assert_eq!(
            calculator.calculate("Tallinn", "Bike", request_time()).unwrap(),
            first
        );
    }
    assert_eq!(first, 4.5);
}

#[rstest]
#[case("car", 4.0)]
#[case("scooter", 3.5)]
#[case("bike", 3.0)]
fn test_observation_without_measurements(#[case] vehicle: &str, #[case] expected: f64) {
    let calculator = tallinn(harku());
    let breakdown = calculator
        .breakdown("tallinn", vehicle, request_time())
        .unwrap();
    assert_eq!(breakdown.total, expected);
    assert_eq!(breakdown.surcharge, 0.0);
    assert!(!breakdown.missing_fields.is_empty());
}

#[test]
fn test_imported_feed_drives_calculation() {
    let xml = r#"<observations timestamp="1711627200">
  <station><name>Tartu-Tõravere</name><wmocode>26242</wmocode><phenomenon>Light sleet</phenomenon><airtemperature>-11.0</airtemperature><windspeed>10.0</windspeed></station>
  <station><name>Pärnu</name><wmocode>41803</wmocode><phenomenon>Hail</phenomenon><airtemperature>2.0</airtemperature><windspeed>3.0</windspeed></station>
</observations>"#;

    let config = DeliveryFeeConfig::default();
    let store = Arc::new(SnapshotStore::new());
    let importer = WeatherImporter::new(&config.weather, store.clone()).unwrap();
    let summary = importer.ingest(xml, Utc::now()).unwrap();
    assert_eq!(summary.stored, 2);

    let calculator = FeeCalculator::new(
        config.fees.base_fee_table().unwrap(),
        config.fees.evaluator(),
        store,
    );

    // 2.5 base + 1.0 cold + 1.0 sleet + 0.5 wind
    assert_eq!(calculator.calculate("tartu", "bike", request_time()).unwrap(), 5.0);
    assert!(matches!(
        calculator.calculate("pärnu", "car", request_time()),
        Err(FeeError::VehicleUseForbidden { .. })
    ));
    assert!(matches!(
        calculator.calculate("tallinn", "car", request_time()),
        Err(FeeError::WeatherDataUnavailable { .. })
    ));
}

#[test]
fn test_non_finite_feed_readings_are_treated_as_missing() {
    let xml = r#"<observations timestamp="1711627200">
  <station><name>Tallinn-Harku</name><phenomenon>Clear</phenomenon><airtemperature>NaN</airtemperature><windspeed>inf</windspeed></station>
</observations>"#;

    let config = DeliveryFeeConfig::default();
    let store = Arc::new(SnapshotStore::new());
    WeatherImporter::new(&config.weather, store.clone())
        .unwrap()
        .ingest(xml, Utc::now())
        .unwrap();
    let calculator = FeeCalculator::with_defaults(store);

    let scooter = calculator
        .breakdown("tallinn", "scooter", request_time())
        .unwrap();
    assert_eq!(scooter.total, 3.5);
    assert_eq!(scooter.missing_fields, vec![WeatherField::AirTemperature]);

    let bike = calculator
        .breakdown("tallinn", "bike", request_time())
        .unwrap();
    assert_eq!(bike.total, 3.0);
    assert_eq!(
        bike.missing_fields,
        vec![WeatherField::AirTemperature, WeatherField::WindSpeed]
    );
}
