//! LearnHub CLI - command-line front end for the course marketplace.

mod app;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use learnhub_backend::{CourseLevel, UserRole};
use learnhub_core::{init_logging, Config, Paths};
use tracing::debug;

/// LearnHub CLI - browse the catalog, manage courses, and track enrollments.
#[derive(Parser)]
#[command(name = "learnhub")]
#[command(about = "LearnHub CLI for the course marketplace")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account (password is prompted)
    Signup {
        /// Account email
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Account role (student or instructor)
        #[arg(long, default_value = "student")]
        role: UserRole,
    },

    /// Sign in with email and password (password is prompted)
    Login {
        /// Account email
        #[arg(long)]
        email: String,
    },

    /// Sign out and clear the session
    Logout,

    /// Show the current identity
    Status,

    /// Browse and manage courses
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },

    /// Enroll in a course
    Enroll {
        /// Course ID
        course_id: String,
    },

    /// Update progress on an enrollment
    Progress {
        /// Enrollment ID
        enrollment_id: String,
        /// Completion percentage (0-100)
        percent: i32,
    },

    /// Show the role-specific dashboard
    Dashboard,
}

#[derive(Subcommand)]
enum CourseCommands {
    /// List courses
    List {
        /// Free-text search over title and description
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Create a course (instructors only)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        thumbnail: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "Beginner")]
        level: CourseLevel,
        #[arg(long)]
        category: String,
    },
    /// Update a course (instructors only)
    Update {
        /// Course ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        thumbnail: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        level: Option<CourseLevel>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a course (instructors only)
    Delete {
        /// Course ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let paths = Paths::new()?;
    let config = Config::load(&paths)?;
    debug!(url = %config.supabase_url, "Loaded configuration");

    let app = app::App::bootstrap(&config, &paths).await?;

    match cli.command {
        Commands::Signup { email, name, role } => {
            commands::auth::signup(&app, &email, &name, role).await
        }
        Commands::Login { email } => commands::auth::login(&app, &email).await,
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Status => commands::auth::status(&app),
        Commands::Courses { command } => match command {
            CourseCommands::List { search, category } => {
                commands::courses::list(&app, search.as_deref(), category.as_deref()).await
            }
            CourseCommands::Create {
                title,
                description,
                thumbnail,
                price,
                level,
                category,
            } => {
                commands::courses::create(
                    &app,
                    title,
                    description,
                    thumbnail,
                    price,
                    level,
                    category,
                )
                .await
            }
            CourseCommands::Update {
                id,
                title,
                description,
                thumbnail,
                price,
                level,
                category,
            } => {
                commands::courses::update(
                    &app,
                    &id,
                    learnhub_backend::CourseUpdate {
                        title,
                        description,
                        thumbnail,
                        price,
                        level,
                        category,
                    },
                )
                .await
            }
            CourseCommands::Delete { id } => commands::courses::delete(&app, &id).await,
        },
        Commands::Enroll { course_id } => commands::enrollment::enroll(&app, &course_id).await,
        Commands::Progress {
            enrollment_id,
            percent,
        } => commands::enrollment::progress(&app, &enrollment_id, percent).await,
        Commands::Dashboard => commands::dashboard::show(&app).await,
    }
}
