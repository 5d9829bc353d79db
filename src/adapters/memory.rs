use crate::config::StorageConfig;
use crate::domain::model::{Example, OtpRecord};
use crate::domain::ports::{ExampleRepository, OtpRepository};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-wide document store shared by every request in this process.
///
/// The connection settings are kept as given; documents live in memory.
#[derive(Debug, Default)]
pub struct DocumentStore {
    settings: StorageConfig,
    examples: RwLock<HashMap<String, Example>>,
    otps: RwLock<HashMap<String, OtpRecord>>,
}

impl DocumentStore {
    pub fn new(settings: StorageConfig) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn describe(&self) -> String {
        let database = self.settings.database.as_deref().unwrap_or("default");
        match &self.settings.uri {
            Some(_) => format!("document store '{}' (remote uri configured)", database),
            None => format!("document store '{}' (in-memory)", database),
        }
    }
}

// A handler that panicked while holding a guard leaves the map intact, so the
// poison flag is ignored.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl ExampleRepository for DocumentStore {
    fn list(&self) -> Vec<Example> {
        let mut examples: Vec<Example> = read(&self.examples).values().cloned().collect();
        examples.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        examples
    }

    fn find(&self, id: &str) -> Option<Example> {
        read(&self.examples).get(id).cloned()
    }

    fn insert(&self, example: Example) {
        write(&self.examples).insert(example.id.clone(), example);
    }

    fn update(&self, example: Example) -> bool {
        let mut examples = write(&self.examples);
        match examples.get_mut(&example.id) {
            Some(slot) => {
                *slot = example;
                true
            }
            None => false,
        }
    }

    fn delete(&self, id: &str) -> bool {
        write(&self.examples).remove(id).is_some()
    }
}

impl OtpRepository for DocumentStore {
    fn find(&self, id: &str) -> Option<OtpRecord> {
        read(&self.otps).get(id).cloned()
    }

    fn save(&self, record: OtpRecord) {
        write(&self.otps).insert(record.id().to_string(), record);
    }

    fn modify(&self, id: &str, change: &mut dyn FnMut(&mut OtpRecord)) -> bool {
        let mut otps = write(&self.otps);
        match otps.get_mut(id) {
            Some(record) => {
                change(record);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn example(id: &str, offset: i64) -> Example {
        let at = Utc::now() + Duration::seconds(offset);
        Example {
            id: id.to_string(),
            name: format!("example {id}"),
            description: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_example_crud() {
        let store = DocumentStore::default();
        store.insert(example("b", 1));
        store.insert(example("a", 0));

        let ids: Vec<String> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let mut renamed = ExampleRepository::find(&store, "a").unwrap();
        renamed.name = "renamed".to_string();
        assert!(store.update(renamed));
        assert_eq!(ExampleRepository::find(&store, "a").unwrap().name, "renamed");

        assert!(!store.update(example("missing", 0)));
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
    }

    #[test]
    fn test_store_survives_poisoned_lock() {
        let store = std::sync::Arc::new(DocumentStore::default());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.examples.write().unwrap();
            panic!("handler fault");
        })
        .join();

        store.insert(example("after", 0));
        assert!(ExampleRepository::find(store.as_ref(), "after").is_some());
    }

    #[test]
    fn test_modify_updates_stored_otp_in_place() {
        let store = DocumentStore::default();
        let now = Utc::now();
        let record = OtpRecord::issue("123456", "+15550100", "user-1", now);
        let id = record.id().to_string();
        store.save(record);

        assert!(store.modify(&id, &mut |otp: &mut OtpRecord| otp.record_retry(now)));
        assert!(!store.modify("missing", &mut |otp: &mut OtpRecord| otp.record_retry(now)));
        assert_eq!(OtpRepository::find(&store, &id).unwrap().retry_attempts(), 1);
    }

    #[test]
    fn test_describe_does_not_leak_uri() {
        let store = DocumentStore::new(StorageConfig {
            uri: Some("mongodb://user:secret@db:27017".to_string()),
            database: Some("templates".to_string()),
        });
        let description = store.describe();
        assert!(description.contains("templates"));
        assert!(!description.contains("secret"));
    }
}
