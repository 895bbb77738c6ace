/// Progress of anything fetched from a remote service.
///
/// Rendering code matches on this one type instead of juggling separate
/// loading/error/data flags.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Load::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Load::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Load<U> {
        match self {
            Load::Loading => Load::Loading,
            Load::Loaded(data) => Load::Loaded(f(data)),
            Load::Failed(message) => Load::Failed(message),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Load<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Load::Loaded(data),
            Err(e) => Load::Failed(e.to_string()),
        }
    }
}

impl<T> Default for Load<T> {
    fn default() -> Self {
        Load::Loading
    }
}
