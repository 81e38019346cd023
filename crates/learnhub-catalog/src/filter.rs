//! Pure catalog filters over the cached course list.

use learnhub_backend::Course;

/// Filter courses by a free-text search term and an optional category.
///
/// The search term matches title or description, case-insensitively; an empty
/// term matches everything. `category` of `None` means all categories.
pub fn filter_courses<'a>(
    courses: &'a [Course],
    search: &str,
    category: Option<&str>,
) -> Vec<&'a Course> {
    let needle = search.trim().to_lowercase();

    courses
        .iter()
        .filter(|course| {
            needle.is_empty()
                || course.title.to_lowercase().contains(&needle)
                || course.description.to_lowercase().contains(&needle)
        })
        .filter(|course| category.map_or(true, |c| course.category == c))
        .collect()
}

/// Distinct categories present in the course list, sorted alphabetically.
pub fn categories(courses: &[Course]) -> Vec<String> {
    let mut categories: Vec<String> = courses.iter().map(|c| c.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use learnhub_backend::CourseLevel;

    fn course(title: &str, description: &str, category: &str) -> Course {
        Course {
            id: format!("course-{}", title),
            title: title.to_string(),
            description: description.to_string(),
            thumbnail: String::new(),
            instructor_id: "instructor-1".to_string(),
            instructor: None,
            price: 49.0,
            level: CourseLevel::Beginner,
            category: category.to_string(),
            rating: 4.0,
            students: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_catalog() -> Vec<Course> {
        vec![
            course("Rust Fundamentals", "Ownership and borrowing", "Programming"),
            course("Watercolor Basics", "Painting with light washes", "Art"),
            course("Async Rust", "Futures and runtimes", "Programming"),
        ]
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let catalog = sample_catalog();
        assert_eq!(filter_courses(&catalog, "", None).len(), 3);
        assert_eq!(filter_courses(&catalog, "   ", None).len(), 3);
    }

    #[test]
    fn test_search_matches_title_case_insensitively() {
        let catalog = sample_catalog();
        let hits = filter_courses(&catalog, "rust", None);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_matches_description() {
        let catalog = sample_catalog();
        let hits = filter_courses(&catalog, "ownership", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust Fundamentals");
    }

    #[test]
    fn test_category_filter() {
        let catalog = sample_catalog();
        let hits = filter_courses(&catalog, "", Some("Art"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Watercolor Basics");
    }

    #[test]
    fn test_search_and_category_combine() {
        let catalog = sample_catalog();
        let hits = filter_courses(&catalog, "rust", Some("Art"));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_categories_sorted_and_deduped() {
        let catalog = sample_catalog();
        assert_eq!(categories(&catalog), vec!["Art", "Programming"]);
    }
}
