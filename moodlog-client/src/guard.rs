//! Route guard. Keeps logged out users out of the `/(tabs)/` namespace and logged in users
//! off the landing, login and register pages.

use crate::router::Location;
use crate::screen::Screen;
use crate::session::SessionStatus;

pub const PRIVATE_PREFIX: &str = "/(tabs)/";

pub const INDEX: &str = "/";
pub const LOGIN: &str = "/logowanie";
pub const REGISTER: &str = "/rejestracja";
pub const OFFLINE: &str = "/offline";
pub const HOME: &str = "/(tabs)/home";
pub const NEW_ENTRY: &str = "/(tabs)/new";
pub const HISTORY: &str = "/(tabs)/history";
pub const ADVICE: &str = "/(tabs)/advice";

pub fn is_private(path: &str) -> bool {
    path.starts_with(PRIVATE_PREFIX)
}

pub fn is_public_only(path: &str) -> bool {
    matches!(path, INDEX | LOGIN | REGISTER)
}

/// Returns whether the view for `path` may render. Redirects go through `location`; while
/// the login state is still unknown a loading placeholder is shown instead.
pub fn guard(status: SessionStatus, path: &str, location: &Location, screen: &Screen) -> bool {
    match status {
        SessionStatus::Unknown => {
            screen.render_loading();
            false
        }
        SessionStatus::Unauthenticated if is_private(path) => {
            location.navigate(LOGIN);
            false
        }
        SessionStatus::Authenticated if is_public_only(path) => {
            location.navigate(HOME);
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(hash: &str) -> (Location, crate::router::HashChanges, Screen) {
        let (location, changes) = Location::new(hash);
        (location, changes, Screen::new())
    }

    #[test]
    fn unknown_status_never_navigates() {
        let (location, mut changes, screen) = setup("#/(tabs)/home");
        for path in [HOME, INDEX, LOGIN, OFFLINE] {
            assert!(!guard(SessionStatus::Unknown, path, &location, &screen));
        }
        assert!(changes.try_next().is_none());
        assert_eq!(screen.content(), "Loading...");
    }

    #[test]
    fn private_path_sends_guest_to_login_once() {
        let (location, mut changes, screen) = setup("#/(tabs)/history");

        assert!(!guard(SessionStatus::Unauthenticated, HISTORY, &location, &screen));
        assert_eq!(changes.try_next().as_deref(), Some("#/logowanie"));
        assert!(changes.try_next().is_none());
    }

    #[test]
    fn public_only_path_sends_user_home() {
        let (location, mut changes, screen) = setup("#/logowanie");

        assert!(!guard(SessionStatus::Authenticated, LOGIN, &location, &screen));
        assert_eq!(changes.try_next().as_deref(), Some("#/(tabs)/home"));
    }

    #[test]
    fn allowed_paths_pass() {
        let (location, mut changes, screen) = setup("#/");

        assert!(guard(SessionStatus::Unauthenticated, INDEX, &location, &screen));
        assert!(guard(SessionStatus::Unauthenticated, OFFLINE, &location, &screen));
        assert!(guard(SessionStatus::Authenticated, OFFLINE, &location, &screen));
        assert!(guard(SessionStatus::Authenticated, ADVICE, &location, &screen));
        assert!(changes.try_next().is_none());
    }
}
