//! `SELECT 1` liveness probe against the pooled database.

use async_trait::async_trait;
use diesel::sql_types::Integer;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DatabaseProbe, DatabaseProbeError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;

#[derive(Clone)]
pub struct DieselDatabaseProbe {
    pool: DbPool,
}

impl DieselDatabaseProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseProbe for DieselDatabaseProbe {
    async fn ping(&self) -> Result<(), DatabaseProbeError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DatabaseProbeError::connection))?;
        let value: i32 = diesel::select(diesel::dsl::sql::<Integer>("1"))
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    DatabaseProbeError::query,
                    DatabaseProbeError::connection,
                )
            })?;
        if value == 1 {
            Ok(())
        } else {
            Err(DatabaseProbeError::query("unexpected probe result"))
        }
    }
}
