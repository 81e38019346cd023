//! Role-specific dashboard command.

use crate::app::App;
use crate::output;
use anyhow::bail;
use learnhub_backend::UserRole;
use learnhub_catalog::instructor_stats;
use learnhub_enrollment::student_stats;

/// Render the dashboard matching the signed-in user's role.
pub async fn show(app: &App) -> anyhow::Result<()> {
    let Some(profile) = app.identity.snapshot().profile else {
        bail!("Sign in to see your dashboard");
    };

    match profile.role {
        UserRole::Student => student(app).await,
        UserRole::Instructor => instructor(app, &profile.id).await,
    }
}

async fn student(app: &App) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    app.ledger.fetch_enrollments().await;
    output::print_notifications(&mut rx);

    let enrollments = app.ledger.enrollments();
    let stats = student_stats(&enrollments);

    println!("Student dashboard");
    println!("  enrolled:  {}", stats.enrolled);
    println!("  completed: {}", stats.completed);
    println!("  average:   {:.0}%", stats.average_progress);

    if !enrollments.is_empty() {
        println!("\nYour courses:");
        for enrollment in &enrollments {
            output::print_enrollment(enrollment);
        }
    }
    Ok(())
}

async fn instructor(app: &App, instructor_id: &str) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    app.directory.fetch_courses().await;
    output::print_notifications(&mut rx);

    let courses = app.directory.courses();
    let stats = instructor_stats(&courses, instructor_id);

    println!("Instructor dashboard");
    println!("  courses:  {}", stats.courses);
    println!("  students: {}", stats.total_students);
    println!("  revenue:  ${:.2}", stats.total_revenue);

    let own: Vec<_> = courses
        .iter()
        .filter(|c| c.instructor_id == instructor_id)
        .collect();
    if !own.is_empty() {
        println!("\nYour courses:");
        for course in own {
            output::print_course(course);
        }
    }
    Ok(())
}
