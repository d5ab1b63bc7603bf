use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use pandi_dorty_core::{AdminUserId, BlockedDateId};

/// A calendar date with no deliveries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedDate {
    pub id: BlockedDateId,
    pub date: NaiveDate,
    pub created_by: Option<AdminUserId>,
    /// Name of the admin who blocked the date, if still present.
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
