//! Health record business logic - sick birds, symptoms and treatment.

use crate::{
    core::forms::FormFields,
    entities::{HealthRecord, health_record, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::info;

const TEXT_MAX: usize = 200;

/// A health report as submitted on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHealthRecord {
    pub number_sick: i32,
    pub symptom: String,
    pub medication_given: String,
    pub date_reported: NaiveDate,
}

impl NewHealthRecord {
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let input = Self {
            number_sick: form.integer("number_sick", 0, None),
            symptom: form.text_max("symptom", TEXT_MAX),
            medication_given: form.text_max("medication_given", TEXT_MAX),
            date_reported: form
                .date("date_reported")
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        };
        let input = form.finish(input)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.number_sick < 0 {
            return Err(Error::invalid_field("number_sick", "Number must be at least 0."));
        }
        for (field, value) in [
            ("symptom", &self.symptom),
            ("medication_given", &self.medication_given),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_field(field, "This field is required."));
            }
            if value.chars().count() > TEXT_MAX {
                return Err(Error::invalid_field(
                    field,
                    format!("Field cannot be longer than {TEXT_MAX} characters."),
                ));
            }
        }
        Ok(())
    }
}

pub async fn create_health_record(
    db: &DatabaseConnection,
    input: NewHealthRecord,
    owner: Option<&user::Model>,
) -> Result<health_record::Model> {
    input.validate()?;
    let now = chrono::Utc::now().naive_utc();

    let record = health_record::ActiveModel {
        number_sick: Set(input.number_sick),
        symptom: Set(input.symptom.trim().to_string()),
        medication_given: Set(input.medication_given.trim().to_string()),
        date_reported: Set(input.date_reported),
        user_id: Set(owner.map(|u| u.id)),
        created_by_username: Set(owner.map(|u| u.username.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = record.insert(db).await?;
    info!(health_record_id = created.id, "health record added");
    Ok(created)
}

/// All health records, newest first.
pub async fn list_health_records(db: &DatabaseConnection) -> Result<Vec<health_record::Model>> {
    HealthRecord::find()
        .order_by_desc(health_record::Column::CreatedAt)
        .order_by_desc(health_record::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_health_record_by_id(
    db: &DatabaseConnection,
    record_id: i64,
) -> Result<Option<health_record::Model>> {
    HealthRecord::find_by_id(record_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn update_health_record(
    db: &DatabaseConnection,
    record_id: i64,
    input: NewHealthRecord,
) -> Result<health_record::Model> {
    input.validate()?;
    let existing = get_health_record_by_id(db, record_id)
        .await?
        .ok_or_else(|| not_found(record_id))?;

    let mut active: health_record::ActiveModel = existing.into();
    active.number_sick = Set(input.number_sick);
    active.symptom = Set(input.symptom.trim().to_string());
    active.medication_given = Set(input.medication_given.trim().to_string());
    active.date_reported = Set(input.date_reported);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

pub async fn delete_health_record(db: &DatabaseConnection, record_id: i64) -> Result<()> {
    let result = HealthRecord::delete_by_id(record_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(record_id));
    }
    info!(health_record_id = record_id, "health record deleted");
    Ok(())
}

fn not_found(id: i64) -> Error {
    Error::RecordNotFound {
        kind: "health_record".to_string(),
        id,
    }
}
