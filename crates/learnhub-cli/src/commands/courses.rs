//! Course catalog commands.

use crate::app::App;
use crate::output;
use anyhow::bail;
use learnhub_backend::{CourseLevel, CourseUpdate, NewCourse, UserProfile, UserRole};
use learnhub_catalog::{categories, filter_courses};

/// The signed-in instructor's profile, or a user-facing error.
fn require_instructor(app: &App) -> anyhow::Result<UserProfile> {
    match app.identity.snapshot().profile {
        Some(profile) if profile.role == UserRole::Instructor => Ok(profile),
        Some(_) => bail!("Only instructors can manage courses"),
        None => bail!("Sign in as an instructor to manage courses"),
    }
}

/// List the catalog, optionally filtered.
pub async fn list(app: &App, search: Option<&str>, category: Option<&str>) -> anyhow::Result<()> {
    let mut rx = app.notifier.subscribe();
    app.directory.fetch_courses().await;
    output::print_notifications(&mut rx);

    let courses = app.directory.courses();
    let filtered = filter_courses(&courses, search.unwrap_or(""), category);

    if filtered.is_empty() {
        println!("No courses found");
        return Ok(());
    }

    for course in &filtered {
        output::print_course(course);
    }
    println!(
        "\n{} of {} courses; categories: {}",
        filtered.len(),
        courses.len(),
        categories(&courses).join(", ")
    );
    Ok(())
}

/// Create a course owned by the signed-in instructor.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    app: &App,
    title: String,
    description: String,
    thumbnail: String,
    price: f64,
    level: CourseLevel,
    category: String,
) -> anyhow::Result<()> {
    let instructor = require_instructor(app)?;

    let mut rx = app.notifier.subscribe();
    let result = app
        .directory
        .create_course(NewCourse {
            title,
            description,
            thumbnail,
            instructor_id: instructor.id,
            price,
            level,
            category,
            rating: 0.0,
            students: 0,
        })
        .await;
    output::print_notifications(&mut rx);

    let created = result?;
    println!("Created course {}", created.id);
    Ok(())
}

/// Update a course by id.
pub async fn update(app: &App, course_id: &str, patch: CourseUpdate) -> anyhow::Result<()> {
    require_instructor(app)?;

    let mut rx = app.notifier.subscribe();
    let result = app.directory.update_course(course_id, patch).await;
    output::print_notifications(&mut rx);

    result?;
    Ok(())
}

/// Delete a course by id.
pub async fn delete(app: &App, course_id: &str) -> anyhow::Result<()> {
    require_instructor(app)?;

    let mut rx = app.notifier.subscribe();
    let result = app.directory.delete_course(course_id).await;
    output::print_notifications(&mut rx);

    result?;
    Ok(())
}
