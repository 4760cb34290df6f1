use super::Identity;

/// Session as seen by a protected view: who is signed in, and whether the
/// provider has finished deciding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<Identity>,
    pub loading: bool,
}

impl SessionState {
    pub fn pending() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn resolved(user: Option<Identity>) -> Self {
        Self {
            user,
            loading: false,
        }
    }
}

/// `Pending` is initial; the other two are terminal for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Pending,
    Authorized(Identity),
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome<T> {
    /// Session still resolving: show a neutral placeholder, do not redirect
    Loading,
    Render(T),
    /// Navigate to the login route and render nothing
    Redirect(String),
}

/// Guard applied uniformly in front of every protected view
#[derive(Debug, Clone)]
pub struct AuthGate {
    login_route: String,
}

impl AuthGate {
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn evaluate(&self, session: &SessionState) -> GateState {
        if session.loading {
            return GateState::Pending;
        }
        match &session.user {
            Some(identity) => GateState::Authorized(identity.clone()),
            None => GateState::Unauthorized,
        }
    }

    /// Run `render` only for an authorized session
    pub fn guard<T>(&self, session: &SessionState, render: impl FnOnce(&Identity) -> T) -> GateOutcome<T> {
        match self.evaluate(session) {
            GateState::Pending => GateOutcome::Loading,
            GateState::Authorized(identity) => GateOutcome::Render(render(&identity)),
            GateState::Unauthorized => GateOutcome::Redirect(self.login_route.clone()),
        }
    }
}
