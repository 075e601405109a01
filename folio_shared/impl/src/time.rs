use chrono::{DateTime, Utc};
use folio_di::Build;
use folio_shared_contracts::time::TimeService;

#[derive(Debug, Clone, Copy, Build)]
pub struct TimeServiceImpl;

impl TimeService for TimeServiceImpl {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
