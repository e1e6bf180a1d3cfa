use super::{error::PostsError, markdown, types::*};
use chrono::Datelike;
use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub struct PostsManager {
    config: PostsConfig,
    posts: Arc<RwLock<HashMap<String, Post>>>,
    sorted_slugs: Arc<RwLock<Vec<String>>>,
}

impl PostsManager {
    pub fn new(config: PostsConfig) -> Self {
        Self {
            config,
            posts: Arc::new(RwLock::new(HashMap::new())),
            sorted_slugs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn refresh_posts(&self) -> Result<(), PostsError> {
        info!(
            "Refreshing posts from directory: {:?}",
            self.config.source_directory
        );

        let mut new_posts = HashMap::new();
        self.scan_directory(&self.config.source_directory, &mut new_posts)
            .await?;

        let mut sorted_slugs: Vec<String> = new_posts.keys().cloned().collect();
        sort_newest_first(&mut sorted_slugs, &new_posts);

        info!("Found {} posts", new_posts.len());

        let mut posts = self.posts.write().await;
        let mut slugs = self.sorted_slugs.write().await;
        *posts = new_posts;
        *slugs = sorted_slugs;

        Ok(())
    }

    pub fn start_background_refresh(posts_manager: Arc<PostsManager>, interval_minutes: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                interval_minutes.saturating_mul(60),
            ));
            interval.tick().await; // Skip the first immediate tick

            loop {
                interval.tick().await;
                info!("Starting scheduled posts refresh");

                if let Err(e) = posts_manager.refresh_posts().await {
                    error!("Failed to refresh posts: {}", e);
                } else {
                    info!("Posts refresh completed successfully");
                }
            }
        });
    }

    async fn scan_directory(
        &self,
        dir: &Path,
        posts: &mut HashMap<String, Post>,
    ) -> Result<(), PostsError> {
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                Box::pin(self.scan_directory(&path, posts)).await?;
            } else if file_type.is_file()
                && let Some(extension) = path.extension()
                && (extension == "md" || extension == "markdown")
            {
                match self.load_post(&path).await {
                    Ok(post) => {
                        debug!("Loaded post: {}", post.slug);
                        posts.insert(post.slug.clone(), post);
                    }
                    Err(e) => {
                        error!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(())
    }

    async fn load_post(&self, path: &Path) -> Result<Post, PostsError> {
        let content = tokio::fs::read_to_string(path).await?;

        let file_metadata = tokio::fs::metadata(path).await?;
        let last_modified = file_metadata.modified().ok();

        let (metadata, markdown_content) = markdown::parse_front_matter(&content)?;
        let slug = self.slug_for_path(path)?;

        let html_content = markdown::render_html(&markdown_content);
        let summary = metadata.summary.unwrap_or_else(|| {
            markdown::extract_excerpt(&markdown_content, self.config.excerpt_length)
        });
        let read_time_minutes = markdown::calculate_read_time(&markdown_content);

        Ok(Post {
            slug,
            path: path.to_path_buf(),
            title: metadata.title,
            summary,
            date: metadata.date,
            modified: metadata.modified,
            category: metadata.category,
            tags: metadata.tags,
            author: metadata.author,
            cover_image: metadata.cover_image,
            read_time_minutes,
            content: markdown_content,
            html_content,
            last_modified,
        })
    }

    fn slug_for_path(&self, path: &Path) -> Result<String, PostsError> {
        let relative_path = path
            .strip_prefix(&self.config.source_directory)
            .map_err(|_| {
                PostsError::InvalidFormat(format!(
                    "Path {:?} is not under source directory {:?}",
                    path, self.config.source_directory
                ))
            })?;

        let slug = relative_path
            .to_str()
            .ok_or_else(|| PostsError::InvalidFormat("Invalid UTF-8 in path".to_string()))?
            .replace('\\', "/");

        let slug = if let Some(slug) = slug.strip_suffix(".md") {
            slug.to_string()
        } else if let Some(slug) = slug.strip_suffix(".markdown") {
            slug.to_string()
        } else {
            slug
        };

        Ok(slug)
    }

    pub fn summarize(&self, post: &Post) -> PostSummary {
        PostSummary {
            slug: post.slug.clone(),
            title: post.title.clone(),
            summary: post.summary.clone(),
            date: post.date,
            date_formatted: markdown::format_date(&post.date),
            category: post.category.clone(),
            tags: post.tags.clone(),
            read_time: markdown::format_read_time(post.read_time_minutes),
            cover_image: post.cover_image.clone(),
            url: format!("{}/{}", self.config.url_prefix, post.slug),
        }
    }

    pub fn detail(&self, post: &Post) -> PostDetail {
        PostDetail {
            slug: post.slug.clone(),
            title: post.title.clone(),
            summary: post.summary.clone(),
            date: post.date,
            date_formatted: markdown::format_date(&post.date),
            modified: post.modified,
            category: post.category.clone(),
            tags: post.tags.clone(),
            author: post.author.clone(),
            cover_image: post.cover_image.clone(),
            read_time: markdown::format_read_time(post.read_time_minutes),
            html_content: post.html_content.clone(),
        }
    }

    /// Page of summaries, 0-indexed. Pages past the end come back empty.
    pub async fn get_posts_page(&self, page: usize, filter: &PostsFilter) -> PostsPage {
        let posts = self.posts.read().await;
        let slugs = self.sorted_slugs.read().await;

        let mut matching: Vec<&Post> = slugs
            .iter()
            .filter_map(|slug| posts.get(slug))
            .filter(|post| match &filter.category {
                Some(category) => markdown::generate_slug(&post.category) == *category,
                None => true,
            })
            .collect();
        if filter.order == SortOrder::Oldest {
            matching.reverse();
        }

        let per_page = self.config.posts_per_page.max(1);
        let total = matching.len();
        let total_pages = total.div_ceil(per_page);
        let start = page.saturating_mul(per_page).min(total);
        let end = (start + per_page).min(total);

        PostsPage {
            posts: matching[start..end]
                .iter()
                .map(|post| self.summarize(post))
                .collect(),
            page,
            total,
            total_pages,
            has_prev: page > 0,
            has_next: page.saturating_add(1) < total_pages,
        }
    }

    pub async fn get_post(&self, slug: &str) -> Option<Post> {
        if let Some(post) = self.get_post_if_fresh(slug).await {
            return Some(post);
        }

        // Stale or unknown; try to reload it from disk
        if let Err(e) = self.reload_post_by_slug(slug).await {
            debug!("Failed to reload post {}: {}", slug, e);
        }

        let posts = self.posts.read().await;
        posts.get(slug).cloned()
    }

    async fn get_post_if_fresh(&self, slug: &str) -> Option<Post> {
        let posts = self.posts.read().await;

        if let Some(post) = posts.get(slug)
            && let Ok(metadata) = tokio::fs::metadata(&post.path).await
            && let (Ok(file_modified), Some(post_modified)) =
                (metadata.modified(), post.last_modified)
            && file_modified <= post_modified
        {
            return Some(post.clone());
        }

        None
    }

    async fn reload_post_by_slug(&self, slug: &str) -> Result<(), PostsError> {
        let path = {
            let posts = self.posts.read().await;
            posts.get(slug).map(|p| p.path.clone())
        };

        let Some(path) = path else {
            return Err(PostsError::PostNotFound(slug.to_string()));
        };

        let post = self.load_post(&path).await?;
        let mut posts = self.posts.write().await;
        let mut slugs = self.sorted_slugs.write().await;
        posts.insert(slug.to_string(), post);
        // The date may have been edited
        sort_newest_first(&mut slugs, &posts);

        debug!("Reloaded post: {}", slug);
        Ok(())
    }

    /// Categories with their post counts, most used first.
    pub async fn categories(&self) -> Vec<Category> {
        let posts = self.posts.read().await;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in posts.values() {
            *counts.entry(post.category.as_str()).or_default() += 1;
        }

        let mut categories: Vec<Category> = counts
            .into_iter()
            .map(|(name, count)| Category {
                name: name.to_string(),
                slug: markdown::generate_slug(name),
                count,
            })
            .collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        categories
    }

    /// Posts grouped by year and month, newest first at every level.
    pub async fn timeline(&self) -> Vec<TimelineYear> {
        let posts = self.posts.read().await;
        let slugs = self.sorted_slugs.read().await;

        let mut years: BTreeMap<Reverse<i32>, BTreeMap<Reverse<u32>, Vec<PostSummary>>> =
            BTreeMap::new();
        for post in slugs.iter().filter_map(|slug| posts.get(slug)) {
            years
                .entry(Reverse(post.date.year()))
                .or_default()
                .entry(Reverse(post.date.month()))
                .or_default()
                .push(self.summarize(post));
        }

        years
            .into_iter()
            .map(|(Reverse(year), months)| {
                let months: Vec<TimelineMonth> = months
                    .into_iter()
                    .map(|(Reverse(month), posts)| TimelineMonth {
                        month,
                        month_name: format!("{}月", month),
                        posts,
                    })
                    .collect();
                TimelineYear {
                    year,
                    count: months.iter().map(|m| m.posts.len()).sum(),
                    months,
                }
            })
            .collect()
    }

    pub async fn post_count(&self) -> usize {
        self.sorted_slugs.read().await.len()
    }

    pub async fn get_total_pages(&self) -> usize {
        let slugs = self.sorted_slugs.read().await;
        slugs.len().div_ceil(self.config.posts_per_page.max(1))
    }

    pub fn get_config(&self) -> &PostsConfig {
        &self.config
    }
}

/// Newest first; slug breaks ties so the order is stable across refreshes.
fn sort_newest_first(slugs: &mut [String], posts: &HashMap<String, Post>) {
    slugs.sort_by(|a, b| match (posts.get(a), posts.get(b)) {
        (Some(post_a), Some(post_b)) => post_b.date.cmp(&post_a.date).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    });
}
