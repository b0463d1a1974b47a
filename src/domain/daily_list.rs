use super::todo::Todo;
use chrono::NaiveDate;
use uuid::Uuid;

/// Format of the date string keying each daily list
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Render a date as its daily list key (yyyy-MM-dd)
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a daily list key back into a date
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// The todos a user intends to address on one calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTodoList {
    /// Section identity, stable for the lifetime of the list
    pub id: Uuid,
    pub date: NaiveDate,
    /// Non-deleted todos assigned to `date`, ascending by `order`
    pub todos: Vec<Todo>,
}

impl DailyTodoList {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            todos: Vec::new(),
        }
    }

    pub fn date_string(&self) -> String {
        date_key(self.date)
    }

    pub fn total_count(&self) -> usize {
        self.todos.len()
    }

    /// Todos still open on this date
    pub fn remaining_count(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.is_completed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn contains(&self, todo: &Todo) -> bool {
        self.todos.iter().any(|t| t.id == todo.id)
    }

    /// Insert or replace a todo, keeping `order` sorted
    pub(crate) fn upsert(&mut self, todo: Todo) {
        self.todos.retain(|t| t.id != todo.id);
        let position = self
            .todos
            .partition_point(|t| (t.order, t.created_at) <= (todo.order, todo.created_at));
        self.todos.insert(position, todo);
    }

    /// Remove a todo by id, returning whether it was present
    pub(crate) fn remove(&mut self, todo: &Todo) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != todo.id);
        before != self.todos.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, day).unwrap()
    }

    #[test]
    fn test_date_key_roundtrip() {
        assert_eq!(date_key(date(9)), "2023-07-09");
        assert_eq!(parse_date_key("2023-07-09"), Some(date(9)));
        assert_eq!(parse_date_key("07/09/2023"), None);
    }

    #[test]
    fn test_upsert_keeps_order() {
        let mut list = DailyTodoList::new(date(20));
        let mut second = Todo::new(None, "second".to_string(), 2);
        let first = Todo::new(None, "first".to_string(), 1);
        list.upsert(second.clone());
        list.upsert(first);

        let titles: Vec<_> = list.todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);

        second.complete(Local::now());
        list.upsert(second);
        assert_eq!(list.total_count(), 2);
        assert_eq!(list.remaining_count(), 1);
    }

    #[test]
    fn test_remove() {
        let mut list = DailyTodoList::new(date(20));
        let todo = Todo::new(None, "a".to_string(), 0);
        list.upsert(todo.clone());
        assert!(list.contains(&todo));
        assert!(list.remove(&todo));
        assert!(!list.remove(&todo));
        assert!(list.is_empty());
        assert_eq!(list.date_string(), "2023-07-20");
    }
}
