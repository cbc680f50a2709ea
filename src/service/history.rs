use crate::config::HistoryConfig;
use crate::db::{DbActorHandle, DbExchange, HistoryPage, HistoryStats};
use crate::error::VisadeskError;
use crate::service::query::normalize_user_id;
use std::sync::Arc;

/// A resolved history page: the rows plus the page numbers actually applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub result: HistoryPage,
}

/// Read side of the history store, with page-number arithmetic and bounds.
#[derive(Clone)]
pub struct HistoryService {
    db: DbActorHandle,
    cfg: Arc<HistoryConfig>,
}

impl HistoryService {
    pub fn new(db: DbActorHandle, cfg: Arc<HistoryConfig>) -> Self {
        Self { db, cfg }
    }

    /// One-based page of exchanges, newest first. `page` defaults to 1 and
    /// `page_size` is clamped to the configured maximum.
    pub async fn page(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
        user_id: Option<&str>,
    ) -> Result<PageWindow, VisadeskError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(VisadeskError::Validation {
                field: "page",
                reason: "must be at least 1".to_string(),
            });
        }
        let page_size = self.cfg.page_size(page_size);
        let offset = u64::from(page - 1) * u64::from(page_size);

        let result = self
            .db
            .page(normalize_user_id(user_id), offset, page_size)
            .await?;

        Ok(PageWindow {
            page,
            page_size,
            result,
        })
    }

    pub async fn get(&self, id: i64) -> Result<DbExchange, VisadeskError> {
        self.db
            .get_by_id(id)
            .await?
            .ok_or(VisadeskError::NotFound(id))
    }

    pub async fn stats(&self) -> Result<HistoryStats, VisadeskError> {
        self.db.stats().await
    }

    /// Cheap round trip through the store, used by health checks.
    pub async fn probe(&self) -> Result<(), VisadeskError> {
        self.db.count().await.map(|_| ())
    }
}
