//! Enrollment commands.

use crate::app::App;
use crate::output;

/// Enroll the signed-in user in a course.
pub async fn enroll(app: &App, course_id: &str) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    let result = app.ledger.enroll_in_course(course_id).await;
    output::print_notifications(&mut rx);

    result?;
    Ok(())
}

/// Update progress on an enrollment.
pub async fn progress(app: &App, enrollment_id: &str, percent: i32) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    let result = app.ledger.update_progress(enrollment_id, percent).await;
    output::print_notifications(&mut rx);

    result?;
    Ok(())
}
