//! Provisions a demo author and a handful of posts in the configured database.
//!
//! Safe to run repeatedly: the author is reused when it already exists.

use bbs_config::Settings;
use bbs_core::models::{Post, User};
use bbs_core::traits::{PostRepo, UserRepo};
use bbs_db_sqlite::SqliteBbsRepo;

const DEMO_USER: &str = "demo";
const DEMO_POSTS: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(settings.log_level.as_str()));

    let repo = SqliteBbsRepo::new(&settings.database.url).await?;

    let author = match repo.find_user_by_name(DEMO_USER).await? {
        Some(existing) => existing,
        None => repo.create_user(User::new(DEMO_USER, 25, "reading")).await?,
    };
    log::info!("seeding as {} ({})", author.name, author.id);

    for n in 1..=DEMO_POSTS {
        let (post, _) = repo
            .create_post(Post::new(author.id, format!("Welcome #{n}"), "Hello from the seed script."))
            .await?;
        log::info!("created post {}", post.id);
    }

    Ok(())
}
