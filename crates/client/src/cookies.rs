//! Cookie jar persisted through the credential store
//!
//! The backend keeps the refresh credential in a cookie. Persisting the jar
//! lets a later process holding the same store refresh the session.

use std::sync::{Arc, PoisonError};

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, warn};

use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: Arc<CookieStoreMutex>,
}

impl CookieJar {
    /// Restore the jar saved in `sessions`; unreadable jars start empty
    pub fn restore(sessions: &SessionStore) -> Self {
        let store = match sessions.cookie_jar() {
            Some(raw) => cookie_store::serde::json::load(raw.as_bytes()).unwrap_or_else(|e| {
                warn!("Discarding unreadable cookie jar: {e}");
                CookieStore::default()
            }),
            None => CookieStore::default(),
        };

        Self {
            cookies: Arc::new(CookieStoreMutex::new(store)),
        }
    }

    /// Cookie provider handed to the HTTP client
    pub fn provider(&self) -> Arc<CookieStoreMutex> {
        self.cookies.clone()
    }

    /// Write the current jar, session cookies included
    pub fn persist(&self, sessions: &SessionStore) {
        let mut buffer = Vec::new();
        let saved = {
            let store = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut buffer)
        };

        match saved.map(|()| String::from_utf8(buffer)) {
            Ok(Ok(jar)) => {
                debug!("Persisting cookie jar");
                sessions.save_cookie_jar(&jar);
            }
            Ok(Err(e)) => warn!("Failed to encode cookie jar: {e}"),
            Err(e) => warn!("Failed to serialize cookie jar: {e}"),
        }
    }

    /// Drop every cookie held in memory
    pub fn clear(&self) {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_any()
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sessions() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn session_cookie_survives_restore() {
        let sessions = sessions();
        let jar = CookieJar::restore(&sessions);
        let url = "http://127.0.0.1:7240/api/User/Login".parse().unwrap();
        jar.cookies
            .lock()
            .unwrap()
            .parse("refreshToken=rt1; Path=/; HttpOnly", &url)
            .unwrap();
        jar.persist(&sessions);

        let restored = CookieJar::restore(&sessions);
        assert_eq!(restored.len(), 1);
        let refresh = "http://127.0.0.1:7240/api/auth/refresh".parse().unwrap();
        let sent: Vec<_> = restored
            .cookies
            .lock()
            .unwrap()
            .get_request_values(&refresh)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        assert_eq!(sent, ["refreshToken=rt1"]);
    }

    #[test]
    fn unreadable_jar_starts_empty() {
        let sessions = sessions();
        sessions.save_cookie_jar("{not a jar");
        assert_eq!(CookieJar::restore(&sessions).len(), 0);
    }

    #[test]
    fn clear_empties_memory() {
        let sessions = sessions();
        let jar = CookieJar::restore(&sessions);
        let url = "http://127.0.0.1:7240/".parse().unwrap();
        jar.cookies.lock().unwrap().parse("a=1; Path=/", &url).unwrap();
        jar.clear();
        assert_eq!(jar.len(), 0);
    }
}
