use crate::domain::{date_key, DailyTodoList, Todo};
use crate::notifications::{Notifier, SubscriptionId};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tracing::trace;

type Lists = BTreeMap<String, Arc<DailyTodoList>>;

/// Date-keyed index of daily to-do lists.
///
/// Holds at most one list per date string. Lists are handed out as `Arc`s and
/// replaced copy-on-write, so a caller keeps seeing the same instance until
/// that date's contents change. The index never decides membership itself:
/// whoever mutates todos pushes them in through [`apply`](Self::apply) or
/// [`rebuild`](Self::rebuild).
#[derive(Debug, Default)]
pub struct DailyTodoListStore {
    lists: RwLock<Lists>,
    current: RwLock<Option<NaiveDate>>,
    notifier: Notifier,
}

impl DailyTodoListStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Lists> {
        self.lists.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Lists> {
        self.lists.write().unwrap_or_else(|e| e.into_inner())
    }

    /// List for an exact date string, or None if no list exists yet
    pub fn get_list(&self, date_string: &str) -> Option<Arc<DailyTodoList>> {
        self.read().get(date_string).cloned()
    }

    pub fn get_list_for(&self, date: NaiveDate) -> Option<Arc<DailyTodoList>> {
        self.get_list(&date_key(date))
    }

    /// List for `date`, created empty on first access
    pub fn get_or_create(&self, date: NaiveDate) -> Arc<DailyTodoList> {
        let key = date_key(date);
        if let Some(list) = self.read().get(&key) {
            return list.clone();
        }
        self.write()
            .entry(key)
            .or_insert_with(|| Arc::new(DailyTodoList::new(date)))
            .clone()
    }

    /// Date strings of every known list, ascending
    pub fn dates(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Designate the list shown to the user, creating it if needed
    pub fn set_current(&self, date: NaiveDate) -> Arc<DailyTodoList> {
        let list = self.get_or_create(date);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(date);
        self.notify_changed();
        list
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn current(&self) -> Option<Arc<DailyTodoList>> {
        self.current_date().and_then(|date| self.get_list_for(date))
    }

    /// Signal observers that the backing collection changed
    pub fn notify_changed(&self) {
        self.notifier.notify();
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn watch(&self) -> watch::Receiver<u64> {
        self.notifier.watch()
    }

    /// Bring membership up to date for one mutated todo.
    ///
    /// Moves it between dates, replaces it in place, or drops it once
    /// soft-deleted. Observers are notified only if something changed.
    pub fn apply(&self, todo: &Todo) -> bool {
        let target = if todo.is_active() { todo.daily_list } else { None };
        let mut changed = false;
        {
            let mut lists = self.write();

            for list in lists.values_mut() {
                if Some(list.date) != target && list.contains(todo) {
                    Arc::make_mut(list).remove(todo);
                    changed = true;
                }
            }

            if let Some(date) = target {
                let list = lists
                    .entry(date_key(date))
                    .or_insert_with(|| Arc::new(DailyTodoList::new(date)));
                if !list.todos.iter().any(|t| t == todo) {
                    Arc::make_mut(list).upsert(todo.clone());
                    changed = true;
                }
            }
        }

        if changed {
            trace!(todo = %todo.id, date = ?target, "daily index updated");
            self.notify_changed();
        }
        changed
    }

    /// Regroup the whole todo collection by date.
    ///
    /// Lists whose contents did not change keep their instance; lists that
    /// lost every todo stay in the index, empty.
    pub fn rebuild(&self, todos: &[Todo]) -> bool {
        let mut grouped: BTreeMap<NaiveDate, Vec<Todo>> = BTreeMap::new();
        for todo in todos.iter().filter(|t| t.is_active()) {
            if let Some(date) = todo.daily_list {
                grouped.entry(date).or_default().push(todo.clone());
            }
        }
        for group in grouped.values_mut() {
            group.sort_by_key(|t| (t.order, t.created_at));
        }

        let mut changed = false;
        {
            let mut lists = self.write();

            for list in lists.values_mut() {
                if !grouped.contains_key(&list.date) && !list.is_empty() {
                    Arc::make_mut(list).todos.clear();
                    changed = true;
                }
            }

            for (date, group) in grouped {
                let list = lists
                    .entry(date_key(date))
                    .or_insert_with(|| Arc::new(DailyTodoList::new(date)));
                if list.todos != group {
                    Arc::make_mut(list).todos = group;
                    changed = true;
                }
            }

            trace!(lists = lists.len(), changed, "daily index rebuilt");
        }

        if changed {
            self.notify_changed();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, day).unwrap()
    }

    fn todo_on(day: u32, order: u64) -> Todo {
        Todo::new(None, format!("todo {}", order), order).with_daily_list(Some(date(day)))
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let store = DailyTodoListStore::new();
        assert!(store.get_list("2023-07-20").is_none());
        assert!(store.get_list("not a date").is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_get_or_create_never_duplicates() {
        let store = DailyTodoListStore::new();
        let first = store.get_or_create(date(20));
        let second = store.get_or_create(date(20));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.dates(), vec!["2023-07-20".to_string()]);
    }

    #[test]
    fn test_same_instance_until_contents_change() {
        let store = DailyTodoListStore::new();
        store.apply(&todo_on(20, 1));

        let before = store.get_list("2023-07-20").unwrap();
        assert!(Arc::ptr_eq(&before, &store.get_list("2023-07-20").unwrap()));

        // A change on another date leaves this list alone
        store.apply(&todo_on(21, 2));
        assert!(Arc::ptr_eq(&before, &store.get_list("2023-07-20").unwrap()));

        store.apply(&todo_on(20, 3));
        let after = store.get_list("2023-07-20").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.total_count(), 1);
        assert_eq!(after.total_count(), 2);
        assert_eq!(before.id, after.id);
    }

    #[test]
    fn test_apply_moves_and_drops() {
        let store = DailyTodoListStore::new();
        let mut todo = todo_on(20, 1);
        store.apply(&todo);

        todo.daily_list = Some(date(21));
        assert!(store.apply(&todo));
        assert!(store.get_list_for(date(20)).unwrap().is_empty());
        assert!(store.get_list_for(date(21)).unwrap().contains(&todo));

        todo.complete(Local::now());
        assert!(store.apply(&todo));
        assert_eq!(store.get_list_for(date(21)).unwrap().remaining_count(), 0);

        // Reapplying an identical todo is not a change
        assert!(!store.apply(&todo));

        todo.soft_delete();
        assert!(store.apply(&todo));
        assert!(store.get_list_for(date(21)).unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_keeps_unchanged_instances() {
        let store = DailyTodoListStore::new();
        let a = todo_on(20, 1);
        let b = todo_on(21, 2);
        store.rebuild(&[a.clone(), b.clone()]);

        let list_20 = store.get_list_for(date(20)).unwrap();
        let list_21 = store.get_list_for(date(21)).unwrap();

        let mut b_moved = b;
        b_moved.daily_list = None;
        assert!(store.rebuild(&[a.clone(), b_moved.clone()]));

        assert!(Arc::ptr_eq(&list_20, &store.get_list_for(date(20)).unwrap()));
        let emptied = store.get_list_for(date(21)).unwrap();
        assert!(!Arc::ptr_eq(&list_21, &emptied));
        assert!(emptied.is_empty());

        // Same collection again: nothing to do
        assert!(!store.rebuild(&[a, b_moved]));
    }

    #[test]
    fn test_set_current_and_observers() {
        let store = DailyTodoListStore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let list = store.set_current(date(20));
        assert_eq!(list.date_string(), "2023-07-20");
        assert_eq!(store.current_date(), Some(date(20)));
        assert!(Arc::ptr_eq(&list, &store.current().unwrap()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        store.apply(&todo_on(20, 1));
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        store.unsubscribe(id);
        store.notify_changed();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
