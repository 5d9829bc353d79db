use crate::domain::model::{Example, OtpRecord};

/// Logging sink handed to collaborators by the composition root.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
}

pub trait ExampleRepository: Send + Sync {
    fn list(&self) -> Vec<Example>;
    fn find(&self, id: &str) -> Option<Example>;
    fn insert(&self, example: Example);
    /// Replaces a stored example. Returns `false` when the id is unknown.
    fn update(&self, example: Example) -> bool;
    fn delete(&self, id: &str) -> bool;
}

pub trait OtpRepository: Send + Sync {
    fn find(&self, id: &str) -> Option<OtpRecord>;
    fn save(&self, record: OtpRecord);
    /// Applies `change` to the stored record while holding it exclusively.
    /// Returns `false` when the id is unknown.
    fn modify(&self, id: &str, change: &mut dyn FnMut(&mut OtpRecord)) -> bool;
}
