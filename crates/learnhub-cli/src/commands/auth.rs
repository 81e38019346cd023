//! Account commands: signup, login, logout, status.

use crate::app::App;
use crate::output;
use learnhub_backend::UserRole;

/// Create an account and its profile row.
pub async fn signup(app: &App, email: &str, name: &str, role: UserRole) -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Password: ")?;

    let mut rx = app.notifier.subscribe();
    let result = app.identity.sign_up(email, &password, name, role).await;
    app.wait_for_settle().await;
    output::print_notifications(&mut rx);

    result?;
    Ok(())
}

/// Sign in; the profile resolves via the session-change cycle.
pub async fn login(app: &App, email: &str) -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Password: ")?;

    let mut rx = app.notifier.subscribe();
    let result = app.identity.sign_in(email, &password).await;
    app.wait_for_settle().await;
    output::print_notifications(&mut rx);

    result?;

    if let Some(profile) = app.identity.snapshot().profile {
        println!("Signed in as {} ({})", profile.name, profile.role);
    }
    Ok(())
}

/// Sign out. Failures are reported but never fatal.
pub async fn logout(app: &App) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    app.identity.sign_out().await;
    app.wait_for_settle().await;
    output::print_notifications(&mut rx);
    Ok(())
}

/// Show the current identity snapshot.
pub fn status(app: &App) -> anyhow::Result<()> {
    let snapshot = app.identity.snapshot();

    match (&snapshot.session, &snapshot.profile) {
        (Some(session), Some(profile)) => {
            println!("Signed in as {} <{}>", profile.name, profile.email);
            println!("  role:    {}", profile.role);
            println!("  user id: {}", session.user_id);
            println!("  expires: {}", session.expires_at.to_rfc3339());
        }
        (Some(session), None) => {
            println!("Signed in as {} (no profile on record)", session.user_id);
        }
        _ => println!("Not signed in"),
    }

    Ok(())
}
