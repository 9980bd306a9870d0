use std::sync::Arc;

use anyhow::{Context, Result};
use delivery_fee::{
    DeliveryFeeConfig, FeeCalculator, SnapshotProvider, SnapshotStore, WeatherImporter, api,
    logging, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = DeliveryFeeConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    let store = Arc::new(SnapshotStore::new());
    let importer = WeatherImporter::new(&config.weather, store.clone())?;
    tokio::spawn(importer.run(
        config.weather.import_minute,
        config.weather.import_on_startup,
    ));

    let provider: Arc<dyn SnapshotProvider> = store;
    let calculator = FeeCalculator::new(
        config.fees.base_fee_table()?,
        config.fees.evaluator(),
        provider,
    );

    web::run(&config.server, api::router(Arc::new(calculator))).await
}
