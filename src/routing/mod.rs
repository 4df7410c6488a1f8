use uuid::Uuid;
use crate::character::Character;
use crate::database::CharacterStore;
use crate::error::GameResult;
use crate::identity::{IdentityProvider, Session};

/// Where a caller stands before any screen is shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Unauthenticated,
    NoCharacter(Session),
    Ready(Session, Character),
}

impl Resolution {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Resolution::Unauthenticated => None,
            Resolution::NoCharacter(session) | Resolution::Ready(session, _) => Some(session),
        }
    }
}

/// A screen. `route_for` turns a requested screen into the one actually
/// shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    SignIn,
    CreateCharacter,
    Dashboard,
}

/// Resolves a session token into a typed outcome. Store failures are
/// returned as errors, never folded into `NoCharacter`.
pub fn resolve<I, S>(identity: &I, store: &S, token: Option<Uuid>) -> GameResult<Resolution>
where
    I: IdentityProvider + ?Sized,
    S: CharacterStore + ?Sized,
{
    let Some(session) = token.and_then(|token| identity.session(token)) else {
        log::debug!("Resolved: unauthenticated");
        return Ok(Resolution::Unauthenticated);
    };

    match store.find_by_account(session.account_id)? {
        Some(character) => {
            log::debug!("Resolved account {}: ready", session.account_id);
            Ok(Resolution::Ready(session, character))
        }
        None => {
            log::debug!("Resolved account {}: no character", session.account_id);
            Ok(Resolution::NoCharacter(session))
        }
    }
}

/// Maps the requested screen and the caller's resolution to a route.
pub fn route_for(requested: Route, resolution: &Resolution) -> Route {
    match (requested, resolution) {
        (Route::Landing, _) => Route::Landing,

        (Route::SignIn, Resolution::Unauthenticated) => Route::SignIn,
        (Route::SignIn, _) => Route::Dashboard,

        (Route::CreateCharacter | Route::Dashboard, Resolution::Unauthenticated) => Route::SignIn,
        (Route::CreateCharacter | Route::Dashboard, Resolution::NoCharacter(_)) => {
            Route::CreateCharacter
        }
        (Route::CreateCharacter | Route::Dashboard, Resolution::Ready(..)) => Route::Dashboard,
    }
}
