//! PostgreSQL-backed `DeliveryLedger` appending one row per delivery outcome.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DeliveryLedger, DeliveryLedgerError, DeliveryRecord, DeliveryStatus};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewDeliveryRecordRow;
use super::pool::{DbPool, PoolError};
use super::schema::delivery_records;

/// Diesel-backed delivery ledger.
#[derive(Clone)]
pub struct DieselDeliveryLedger {
    pool: DbPool,
}

impl DieselDeliveryLedger {
    /// Create a new ledger with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DeliveryLedgerError {
    map_basic_pool_error(error, |message| DeliveryLedgerError::write(message))
}

fn map_diesel_error(error: diesel::result::Error) -> DeliveryLedgerError {
    map_basic_diesel_error(error, DeliveryLedgerError::write, DeliveryLedgerError::write)
}

fn to_row(record: &DeliveryRecord) -> Result<NewDeliveryRecordRow<'_>, DeliveryLedgerError> {
    let (failure_kind, failure_reason) = match &record.status {
        DeliveryStatus::Delivered => (None, None),
        DeliveryStatus::Failed { kind, reason } => (Some(kind.as_str()), Some(reason.as_str())),
    };
    Ok(NewDeliveryRecordRow {
        sighting_id: record.sighting_id.value(),
        subscription_id: record.subscription_id.value(),
        user_id: record.user_id.value(),
        status: record.status.label(),
        failure_kind,
        failure_reason,
        attempts: i32::try_from(record.attempts)
            .map_err(|err| DeliveryLedgerError::write(format!("attempt count: {err}")))?,
        completed_at: record.completed_at,
    })
}

#[async_trait]
impl DeliveryLedger for DieselDeliveryLedger {
    async fn record(&self, record: &DeliveryRecord) -> Result<(), DeliveryLedgerError> {
        let row = to_row(record)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(delivery_records::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::DeliveryFailureKind;
    use crate::domain::{SightingId, SubscriptionId, UserId};

    fn record(status: DeliveryStatus) -> DeliveryRecord {
        DeliveryRecord {
            sighting_id: SightingId::new(42).expect("id"),
            subscription_id: SubscriptionId::new(5).expect("id"),
            user_id: UserId::new(3).expect("id"),
            status,
            attempts: 3,
            completed_at: Utc::now(),
        }
    }

    #[rstest]
    fn delivered_rows_carry_no_failure_columns() {
        let record = record(DeliveryStatus::Delivered);

        let row = to_row(&record).expect("row");

        assert_eq!(row.status, "delivered");
        assert_eq!(row.failure_kind, None);
        assert_eq!(row.attempts, 3);
    }

    #[rstest]
    fn failed_rows_store_kind_and_reason() {
        let record = record(DeliveryStatus::Failed {
            kind: DeliveryFailureKind::RetryExhausted,
            reason: "timeout".to_owned(),
        });

        let row = to_row(&record).expect("row");

        assert_eq!(row.status, "failed");
        assert_eq!(row.failure_kind, Some("retry_exhausted"));
        assert_eq!(row.failure_reason, Some("timeout"));
    }
}
