//! Last-write-wins observer over one list query.

use std::fmt::Display;

use crate::query::cache::QueryKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Handle for one in-flight fetch. Only the ticket of the latest `begin` resolves.
#[derive(Debug)]
#[must_use = "a fetch ticket has to be resolved"]
pub struct FetchTicket {
    seq: u64,
    key: QueryKey,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Observed state of a list query: the last good data plus the status of the
/// latest fetch. Data from a previous key stays visible while a new key loads.
#[derive(Debug)]
pub struct ListQuery<T> {
    data: Option<T>,
    key: Option<QueryKey>,
    status: QueryStatus,
    error: Option<String>,
    issued: u64,
}

impl<T> Default for ListQuery<T> {
    fn default() -> Self {
        Self {
            data: None,
            key: None,
            status: QueryStatus::Idle,
            error: None,
            issued: 0,
        }
    }
}

impl<T> ListQuery<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer seeded with data that is already known, e.g. a stale cache entry.
    pub fn with_placeholder(key: QueryKey, data: T) -> Self {
        Self {
            data: Some(data),
            key: Some(key),
            status: QueryStatus::Success,
            ..Self::default()
        }
    }

    pub fn begin(&mut self, key: QueryKey) -> FetchTicket {
        self.issued += 1;
        self.status = QueryStatus::Pending;
        self.key = Some(key.clone());
        FetchTicket {
            seq: self.issued,
            key,
        }
    }

    /// Applies the outcome of `ticket`. Returns `false` when a later fetch superseded it.
    pub fn resolve<E: Display>(&mut self, ticket: FetchTicket, result: Result<T, E>) -> bool {
        if ticket.seq != self.issued {
            log::debug!(
                "Discarding superseded fetch for {}:{}",
                ticket.key.scope(),
                ticket.key.options()
            );
            return false;
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.status = QueryStatus::Success;
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.status = QueryStatus::Error;
            }
        }
        true
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    /// Pending with nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.data.is_none()
    }

    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(options: &str) -> QueryKey {
        QueryKey::raw("products", options)
    }

    #[test]
    fn later_fetch_wins_regardless_of_resolution_order() {
        let mut query: ListQuery<&str> = ListQuery::new();
        let first = query.begin(key("page=1"));
        let second = query.begin(key("page=2"));

        assert!(query.resolve::<String>(second, Ok("page two")));
        assert!(!query.resolve::<String>(first, Ok("page one")));

        assert_eq!(query.data(), Some(&"page two"));
        assert_eq!(query.key(), Some(&key("page=2")));
    }

    #[test]
    fn previous_data_stays_visible_while_pending() {
        let mut query = ListQuery::with_placeholder(key("page=1"), vec![1, 2]);
        let ticket = query.begin(key("page=2"));

        assert!(query.is_fetching());
        assert!(!query.is_loading());
        assert_eq!(query.data(), Some(&vec![1, 2]));

        query.resolve::<String>(ticket, Ok(vec![3]));
        assert_eq!(query.status(), QueryStatus::Success);
        assert_eq!(query.data(), Some(&vec![3]));
    }

    #[test]
    fn error_keeps_previous_data() {
        let mut query = ListQuery::with_placeholder(key("page=1"), vec![1]);
        let ticket = query.begin(key("page=1"));

        query.resolve(ticket, Err("connection refused"));

        assert!(query.is_error());
        assert_eq!(query.error(), Some("connection refused"));
        assert_eq!(query.data(), Some(&vec![1]));
    }

    #[test]
    fn first_fetch_is_loading() {
        let mut query: ListQuery<Vec<u8>> = ListQuery::new();
        let ticket = query.begin(key("page=1"));
        assert!(query.is_loading());
        query.resolve(ticket, Err("boom"));
        assert!(query.data().is_none());
        assert!(query.is_error());
    }
}
