//! # Reports
//!
//! Summary numbers computed over the sales mirror. Rendering belongs to
//! the presentation layer; this module only does the arithmetic.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::StoreService;
use almacen_core::Money;

/// Revenue and sale count for one day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub count: usize,
    pub total: Money,
}

impl StoreService {
    /// Today's sale count and revenue.
    pub fn today_summary(&self) -> DailySummary {
        let today = Utc::now().date_naive();

        self.sales.with(|sales| {
            let mut count = 0;
            let mut total = Money::zero();
            for sale in sales.iter().filter(|s| s.created_at.date_naive() == today) {
                count += 1;
                total += sale.total;
            }
            DailySummary {
                date: today,
                count,
                total,
            }
        })
    }
}
