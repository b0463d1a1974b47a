use super::Result;
use crate::daily::DailyTodoListStore;
use crate::domain::DailyTodoList;
use crate::store::EntityStore;
use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;

/// Header shown above a daily list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyHeader {
    pub date: NaiveDate,
    /// e.g. "Jul 20, Thu"
    pub title: String,
    pub total: usize,
    pub remaining: usize,
}

impl DailyHeader {
    pub fn from_list(list: &DailyTodoList) -> Self {
        Self {
            date: list.date,
            title: list.date.format("%b %-d, %a").to_string(),
            total: list.total_count(),
            remaining: list.remaining_count(),
        }
    }
}

/// Loads daily lists from the store into the index and moves between days
pub struct DailyTodoListUseCase {
    store: Arc<dyn EntityStore>,
    daily: Arc<DailyTodoListStore>,
}

impl DailyTodoListUseCase {
    pub fn new(store: Arc<dyn EntityStore>, daily: Arc<DailyTodoListStore>) -> Self {
        Self { store, daily }
    }

    /// Refresh the index from the store and return the list for `date`
    pub async fn get_daily_todo_list(&self, date: NaiveDate) -> Result<Arc<DailyTodoList>> {
        let todos = self.store.read_all_todos().await?;
        self.daily.rebuild(&todos);
        Ok(self.daily.get_or_create(date))
    }

    /// Load `date` and make it the current list
    pub async fn fetch(&self, date: NaiveDate) -> Result<Arc<DailyTodoList>> {
        self.get_daily_todo_list(date).await?;
        Ok(self.daily.set_current(date))
    }

    pub async fn fetch_today(&self) -> Result<Arc<DailyTodoList>> {
        self.fetch(Local::now().date_naive()).await
    }

    /// Fetch today unless today is already the current list
    pub async fn fetch_today_if_needed(&self) -> Result<Arc<DailyTodoList>> {
        match self.daily.current() {
            Some(list) if self.is_today_fetched() => Ok(list),
            _ => self.fetch_today().await,
        }
    }

    pub fn is_today_fetched(&self) -> bool {
        self.daily.current_date() == Some(Local::now().date_naive())
    }

    pub async fn goto_previous_day(&self) -> Result<Arc<DailyTodoList>> {
        self.goto_relative(-1).await
    }

    pub async fn goto_next_day(&self) -> Result<Arc<DailyTodoList>> {
        self.goto_relative(1).await
    }

    async fn goto_relative(&self, days: i64) -> Result<Arc<DailyTodoList>> {
        let base = self
            .daily
            .current_date()
            .unwrap_or_else(|| Local::now().date_naive());
        self.fetch(base + Duration::days(days)).await
    }

    /// Header for the current list, if any
    pub fn header(&self) -> Option<DailyHeader> {
        self.daily.current().map(|list| DailyHeader::from_list(&list))
    }
}
