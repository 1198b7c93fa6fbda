//! Report generation business logic.
//!
//! Chart series for the admin dashboard and the farm-wide summary. All
//! functions are framework-agnostic and return plain serializable data that
//! the web layer hands out as JSON.

use crate::{
    core::forms::DATE_FORMAT,
    entities::{Flock, HealthRecord, Production, Role, User, production, user},
    errors::Result,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;

/// One chart series: `labels[i]` goes with `data[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

impl ChartData {
    /// Sums values per label, keeping labels in first-seen order.
    pub fn accumulate<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let mut chart = Self::default();
        for (label, value) in entries {
            match chart.labels.iter().position(|existing| *existing == label) {
                Some(index) => chart.data[index] += value,
                None => {
                    chart.labels.push(label);
                    chart.data.push(value);
                }
            }
        }
        chart
    }
}

/// Eggs collected per production record, by collection date.
pub async fn production_chart(db: &DatabaseConnection) -> Result<ChartData> {
    let records = Production::find()
        .order_by_asc(production::Column::DateCollected)
        .order_by_asc(production::Column::Id)
        .all(db)
        .await?;

    let (labels, data) = records
        .into_iter()
        .map(|p| {
            (
                p.date_collected.format(DATE_FORMAT).to_string(),
                i64::from(p.number_eggs_collected),
            )
        })
        .unzip();
    Ok(ChartData { labels, data })
}

/// Number of health records per symptom.
pub async fn symptom_chart(db: &DatabaseConnection) -> Result<ChartData> {
    let records = HealthRecord::find()
        .order_by_asc(crate::entities::HealthRecordColumn::Id)
        .all(db)
        .await?;
    Ok(ChartData::accumulate(
        records.into_iter().map(|r| (r.symptom, 1)),
    ))
}

/// Total birds per breed.
pub async fn breed_chart(db: &DatabaseConnection) -> Result<ChartData> {
    let flocks = Flock::find()
        .order_by_asc(crate::entities::FlockColumn::Id)
        .all(db)
        .await?;
    Ok(ChartData::accumulate(
        flocks.into_iter().map(|f| (f.breed, i64::from(f.quantity))),
    ))
}

/// Farm-wide totals shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FarmSummary {
    /// Birds currently held (`quantity` summed over flocks)
    pub total_birds: i64,
    pub total_deaths: i64,
    pub total_sold: i64,
    /// Deaths as a percentage of all birds ever held
    pub mortality_rate: f64,
    pub eggs_collected: i64,
    pub eggs_sold: i64,
    pub worker_count: u64,
}

/// Calculates mortality as `deaths / (deaths + alive) * 100`.
///
/// Returns 0 when there are no birds at all.
#[must_use]
// Bird counts are far below 2^52, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_mortality_rate(deaths: i64, alive: i64) -> f64 {
    let total = deaths + alive;
    if total <= 0 {
        return 0.0;
    }

    (deaths as f64 / total as f64) * 100.0
}

pub async fn farm_summary(db: &DatabaseConnection) -> Result<FarmSummary> {
    let flocks = Flock::find().all(db).await?;
    let productions = Production::find().all(db).await?;
    let worker_count = User::find()
        .filter(user::Column::Role.eq(Role::Worker))
        .count(db)
        .await?;

    let total_birds: i64 = flocks.iter().map(|f| i64::from(f.quantity)).sum();
    let total_deaths: i64 = flocks.iter().map(|f| i64::from(f.deaths)).sum();
    let total_sold: i64 = flocks.iter().map(|f| i64::from(f.sold)).sum();

    Ok(FarmSummary {
        total_birds,
        total_deaths,
        total_sold,
        mortality_rate: calculate_mortality_rate(total_deaths, total_birds),
        eggs_collected: productions
            .iter()
            .map(|p| i64::from(p.number_eggs_collected))
            .sum(),
        eggs_sold: productions.iter().map(|p| i64::from(p.eggs_sold)).sum(),
        worker_count,
    })
}
