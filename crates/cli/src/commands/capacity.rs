//! Capacity report for limited order kinds.
//!
//! ```bash
//! pd-cli capacity --max 15
//! ```

use pandi_dorty_core::OrderKind;
use pandi_dorty_web::db::OrderRepository;
use pandi_dorty_web::services::orders::CapacityStatus;

use super::{CommandError, connect};

/// Log how many wedding tastings are booked against `max`.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn report(max: u32) -> Result<CapacityStatus, CommandError> {
    let pool = connect().await?;
    let current = OrderRepository::new(&pool)
        .count_by_kind(OrderKind::WeddingTasting)
        .await?;
    let status = CapacityStatus::new(current, max);

    tracing::info!(
        "Wedding tastings: {}/{} booked, {} remaining",
        status.current,
        status.max,
        status.remaining
    );
    if !status.is_available {
        tracing::warn!("Wedding tasting capacity is full");
    }
    Ok(status)
}
