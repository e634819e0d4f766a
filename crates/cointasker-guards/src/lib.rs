//! Route guards for the CoinTasker client.
//!
//! A guard decides whether a protected page subtree may be shown. Three
//! variants, each a **pure function** of the current session (and,
//! where required, the resolved role):
//!
//! - [`authenticated_only`] — members' pages. Denies to the login
//!   entry point, preserving the attempted path for post-login return.
//! - [`anonymous_only`] — login/registration pages. Denies to home
//!   when someone is already signed in.
//! - [`role_restricted`] — worker/buyer/admin dashboards. Denies to
//!   the generic dashboard on any role mismatch, and treats an
//!   unresolved role conservatively (deny, never hang).
//!
//! Each guard is a state machine over three states:
//!
//! ```text
//!          ┌──(inputs settle, access ok)──→ Allowed   (terminal)
//! Pending ─┤
//!          └──(inputs settle, access no)──→ Denied    (terminal)
//! ```
//!
//! `Pending` is never terminal: once `Session::is_loading` clears and
//! the role (if required) settles, the guard leaves it. Guards are
//! re-evaluated on every session/role change — the [`settle_*`]
//! helpers drive that loop over a session subscription.
//!
//! [`settle_*`]: settle_authenticated_only

use cointasker_roles::RoleResolution;
use cointasker_session::Session;
use cointasker_types::Role;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Where a denied navigation is sent instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// To the login entry point, remembering where the user was going
    /// so a successful login can return them there.
    Login {
        /// The path the user originally attempted.
        return_to: String,
    },
    /// To the public landing page.
    Home,
    /// To the generic (role-agnostic) dashboard.
    Dashboard,
}

impl RedirectTarget {
    /// The route path of this target.
    pub fn path(&self) -> &'static str {
        match self {
            RedirectTarget::Login { .. } => "/login",
            RedirectTarget::Home => "/",
            RedirectTarget::Dashboard => "/dashboard",
        }
    }
}

/// A guard's decision about a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The inputs haven't settled yet; show nothing, decide again on
    /// the next change.
    Pending,
    /// Render the protected subtree.
    Allowed,
    /// Redirect instead of rendering.
    Denied(RedirectTarget),
}

impl GuardOutcome {
    /// True while the guard is still waiting on its inputs.
    pub fn is_pending(&self) -> bool {
        matches!(self, GuardOutcome::Pending)
    }
}

/// The role input to [`role_restricted`]: either still being looked up,
/// or settled to a terminal [`RoleResolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStatus {
    /// The lookup is in flight.
    Loading,
    /// The lookup settled (resolved, absent, or failed).
    Settled(RoleResolution),
}

// ---------------------------------------------------------------------------
// The three guards
// ---------------------------------------------------------------------------

/// Gate for pages that require *someone* to be signed in.
pub fn authenticated_only(
    session: &Session,
    attempted_path: &str,
) -> GuardOutcome {
    if session.is_loading {
        return GuardOutcome::Pending;
    }
    match &session.identity {
        Some(_) => GuardOutcome::Allowed,
        None => GuardOutcome::Denied(RedirectTarget::Login {
            return_to: attempted_path.to_string(),
        }),
    }
}

/// Gate for pages that only make sense signed *out* (login,
/// registration).
pub fn anonymous_only(session: &Session) -> GuardOutcome {
    if session.is_loading {
        return GuardOutcome::Pending;
    }
    match &session.identity {
        Some(_) => GuardOutcome::Denied(RedirectTarget::Home),
        None => GuardOutcome::Allowed,
    }
}

/// Gate for pages restricted to one role.
///
/// Applies [`authenticated_only`] semantics first, then requires the
/// role to be settled and to match exactly. Absent and failed
/// resolutions deny — an unknown role never grants access and never
/// leaves the guard pending.
pub fn role_restricted(
    session: &Session,
    role: RoleStatus,
    required: Role,
    attempted_path: &str,
) -> GuardOutcome {
    match authenticated_only(session, attempted_path) {
        GuardOutcome::Allowed => {}
        other => return other,
    }

    match role {
        RoleStatus::Loading => GuardOutcome::Pending,
        RoleStatus::Settled(RoleResolution::Resolved(actual))
            if actual == required =>
        {
            GuardOutcome::Allowed
        }
        RoleStatus::Settled(_) => {
            GuardOutcome::Denied(RedirectTarget::Dashboard)
        }
    }
}

// ---------------------------------------------------------------------------
// Reactive settlement
// ---------------------------------------------------------------------------

/// Re-evaluates a guard on every session change until it leaves
/// `Pending`.
///
/// If the session store goes away while the guard is still pending,
/// the final observed value is evaluated one last time and returned —
/// the application is tearing down at that point.
pub async fn settle(
    rx: &mut watch::Receiver<Session>,
    mut evaluate: impl FnMut(&Session) -> GuardOutcome,
) -> GuardOutcome {
    loop {
        let outcome = evaluate(&rx.borrow_and_update());
        if !outcome.is_pending() {
            return outcome;
        }
        if rx.changed().await.is_err() {
            tracing::debug!("session store closed while guard pending");
            return evaluate(&rx.borrow());
        }
    }
}

/// [`authenticated_only`], re-evaluated until the session settles.
pub async fn settle_authenticated_only(
    rx: &mut watch::Receiver<Session>,
    attempted_path: &str,
) -> GuardOutcome {
    settle(rx, |session| authenticated_only(session, attempted_path))
        .await
}

/// [`anonymous_only`], re-evaluated until the session settles.
pub async fn settle_anonymous_only(
    rx: &mut watch::Receiver<Session>,
) -> GuardOutcome {
    settle(rx, anonymous_only).await
}

// =========================================================================
// Tests
// =========================================================================
