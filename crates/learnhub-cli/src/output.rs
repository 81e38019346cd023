//! Terminal rendering helpers.

use learnhub_backend::{Course, EnrolledCourse};
use learnhub_core::{Notification, NotificationKind};
use tokio::sync::broadcast;

/// Print every notification queued on the receiver since it was subscribed.
///
/// Successes go to stdout, failures to stderr.
pub fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        match n.kind {
            NotificationKind::Success => println!("ok: {} - {}", n.title, n.description),
            NotificationKind::Error => eprintln!("error: {} - {}", n.title, n.description),
        }
    }
}

/// One-line course rendering for list output.
pub fn print_course(course: &Course) {
    let instructor = course
        .instructor
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("unknown");
    println!(
        "{}  {} [{} | {}] ${:.2}  by {}  ({} students, rated {:.1})",
        course.id,
        course.title,
        course.category,
        course.level,
        course.price,
        instructor,
        course.students,
        course.rating,
    );
}

/// One-line enrollment rendering for dashboard output.
pub fn print_enrollment(enrollment: &EnrolledCourse) {
    println!(
        "{}  {}  {}%  (enrolled {})",
        enrollment.id,
        enrollment.course.title,
        enrollment.progress,
        enrollment.enrolled_at.format("%Y-%m-%d"),
    );
}
