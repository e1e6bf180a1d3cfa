#[cfg(test)]
mod tests {
    use super::super::*;
    use std::{fs, time::Duration};
    use tempfile::TempDir;

    fn config_for(dir: &std::path::Path) -> PostsConfig {
        PostsConfig {
            source_directory: dir.to_path_buf(),
            url_prefix: "/posts".to_string(),
            posts_per_page: 10,
            ..PostsConfig::default()
        }
    }

    async fn setup_test_posts_dir() -> (TempDir, PostsConfig) {
        let temp_dir = TempDir::new().unwrap();
        let posts_dir = temp_dir.path();

        let post1_content = r#"+++
title = "First Post"
summary = "This is the first test post"
date = "2024-01-01"
category = "Life"
+++

# First Post

This is the content of the first post.

It has multiple paragraphs."#;

        let post2_content = r#"---
title: 第二篇文章
date: 2024-01-02 08:00:00
category: Travel
tags: [japan]
---

# 第二篇

這是第二篇文章的內容。

## With a subsection

And some more content."#;

        fs::write(posts_dir.join("first-post.md"), post1_content).unwrap();
        fs::write(posts_dir.join("second-post.md"), post2_content).unwrap();

        let subdir = posts_dir.join("tutorials");
        fs::create_dir(&subdir).unwrap();

        let post3_content = r#"+++
title = "Tutorial Post"
summary = "This is a tutorial"
date = "2024-02-03"
category = "Travel"
+++

# Tutorial

This is a tutorial post in a subdirectory."#;

        fs::write(subdir.join("tutorial.md"), post3_content).unwrap();

        let config = config_for(posts_dir);
        (temp_dir, config)
    }

    #[tokio::test]
    async fn test_posts_manager_creation() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config.clone());
        assert_eq!(manager.get_config().url_prefix, "/posts");
        assert_eq!(manager.post_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_posts() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);

        let result = manager.refresh_posts().await;
        assert!(result.is_ok());

        let page = manager.get_posts_page(0, &PostsFilter::default()).await;
        assert_eq!(page.posts.len(), 3);
        assert_eq!(page.total, 3);

        // Newest first
        assert_eq!(page.posts[0].title, "Tutorial Post");
        assert_eq!(page.posts[1].title, "第二篇文章");
        assert_eq!(page.posts[2].title, "First Post");
        assert_eq!(page.posts[0].url, "/posts/tutorials/tutorial");
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let manager = PostsManager::new(config_for(&temp_dir.path().join("missing")));
        assert!(matches!(
            manager.refresh_posts().await,
            Err(PostsError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_get_post() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let post = manager.get_post("first-post").await.unwrap();
        assert_eq!(post.title, "First Post");
        assert_eq!(post.summary, "This is the first test post");
        assert_eq!(post.category, "Life");
        assert!(post.html_content.contains("<h1>First Post</h1>"));
        assert_eq!(post.read_time_minutes, 1);

        assert!(manager.get_post("no-such-post").await.is_none());
    }

    #[tokio::test]
    async fn test_derived_summary_and_display_fields() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let post = manager.get_post("second-post").await.unwrap();
        assert_eq!(
            post.summary,
            "第二篇 這是第二篇文章的內容。 With a subsection And some more content."
        );

        let summary = manager.summarize(&post);
        assert_eq!(summary.date_formatted, "2024年1月2日");
        assert_eq!(summary.read_time, "1 分鐘");
        assert_eq!(summary.tags, vec!["japan"]);

        let detail = manager.detail(&post);
        assert!(detail.html_content.contains("<h2>With a subsection</h2>"));
    }

    #[tokio::test]
    async fn test_get_post_from_subdirectory() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let post = manager.get_post("tutorials/tutorial").await.unwrap();
        assert_eq!(post.title, "Tutorial Post");
        assert_eq!(post.slug, "tutorials/tutorial");
    }

    #[tokio::test]
    async fn test_pagination() {
        let (_temp_dir, mut config) = setup_test_posts_dir().await;
        config.posts_per_page = 2;

        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let page1 = manager.get_posts_page(0, &PostsFilter::default()).await;
        assert_eq!(page1.posts.len(), 2);
        assert_eq!(page1.total_pages, 2);
        assert!(!page1.has_prev);
        assert!(page1.has_next);

        let page2 = manager.get_posts_page(1, &PostsFilter::default()).await;
        assert_eq!(page2.posts.len(), 1);
        assert!(page2.has_prev);
        assert!(!page2.has_next);

        let past_end = manager.get_posts_page(7, &PostsFilter::default()).await;
        assert!(past_end.posts.is_empty());

        assert_eq!(manager.get_total_pages().await, 2);
    }

    #[tokio::test]
    async fn test_category_filter_and_order() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let filter = PostsFilter {
            category: Some("travel".to_string()),
            order: SortOrder::Oldest,
        };
        let page = manager.get_posts_page(0, &filter).await;
        let titles: Vec<_> = page.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["第二篇文章", "Tutorial Post"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_categories_sorted_by_count() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let categories = manager.categories().await;
        assert_eq!(
            categories,
            vec![
                Category {
                    name: "Travel".to_string(),
                    slug: "travel".to_string(),
                    count: 2,
                },
                Category {
                    name: "Life".to_string(),
                    slug: "life".to_string(),
                    count: 1,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_timeline_groups_by_year_and_month() {
        let (_temp_dir, config) = setup_test_posts_dir().await;
        let manager = PostsManager::new(config);
        manager.refresh_posts().await.unwrap();

        let timeline = manager.timeline().await;
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].year, 2024);
        assert_eq!(timeline[0].count, 3);

        let months: Vec<_> = timeline[0].months.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![2, 1]);
        assert_eq!(timeline[0].months[1].month_name, "1月");
        assert_eq!(timeline[0].months[1].posts[0].title, "第二篇文章");
    }

    #[tokio::test]
    async fn test_invalid_front_matter() {
        let temp_dir = TempDir::new().unwrap();
        let posts_dir = temp_dir.path();

        let invalid_content = r#"This post has no front matter

Just content."#;

        fs::write(posts_dir.join("invalid.md"), invalid_content).unwrap();
        fs::write(posts_dir.join("notes.txt"), "+++\ntitle = \"x\"\n+++").unwrap();

        let manager = PostsManager::new(config_for(posts_dir));
        let result = manager.refresh_posts().await;
        assert!(result.is_ok()); // Should not fail completely

        let page = manager.get_posts_page(0, &PostsFilter::default()).await;
        assert_eq!(page.posts.len(), 0);
    }

    #[tokio::test]
    async fn test_date_formats() {
        let temp_dir = TempDir::new().unwrap();
        let posts_dir = temp_dir.path();

        let post_with_full_date = r#"+++
title = "Full Date Post"
date = "2024-01-15T10:30:00Z"
+++

Content"#;

        let post_with_simple_date = r#"---
title: Simple Date Post
date: 2024-01-16
---

Content"#;

        fs::write(posts_dir.join("full-date.md"), post_with_full_date).unwrap();
        fs::write(posts_dir.join("simple-date.markdown"), post_with_simple_date).unwrap();

        let manager = PostsManager::new(config_for(posts_dir));
        manager.refresh_posts().await.unwrap();

        let page = manager.get_posts_page(0, &PostsFilter::default()).await;
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].slug, "simple-date");
        assert_eq!(page.posts[1].category, "Uncategorized");
    }

    #[tokio::test]
    async fn test_stale_post_is_reloaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("draft.md");
        fs::write(&path, "+++\ntitle = \"Draft\"\ndate = \"2024-05-01\"\n+++\nOld body").unwrap();

        let manager = PostsManager::new(config_for(temp_dir.path()));
        manager.refresh_posts().await.unwrap();
        assert_eq!(manager.get_post("draft").await.unwrap().content, "Old body");

        tokio::time::sleep(Duration::from_millis(20)).await;
        fs::write(&path, "+++\ntitle = \"Final\"\ndate = \"2024-05-01\"\n+++\nNew body").unwrap();
        let later = std::time::SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let post = manager.get_post("draft").await.unwrap();
        assert_eq!(post.title, "Final");
        assert_eq!(post.content, "New body");
    }

    #[tokio::test]
    async fn test_reloaded_post_moves_to_its_new_date() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("alpha.md"), "+++\ntitle = \"Alpha\"\ndate = \"2024-01-01\"\n+++\nA").unwrap();
        fs::write(dir.join("beta.md"), "+++\ntitle = \"Beta\"\ndate = \"2024-02-01\"\n+++\nB").unwrap();

        let manager = PostsManager::new(config_for(dir));
        manager.refresh_posts().await.unwrap();
        let page = manager.get_posts_page(0, &PostsFilter::default()).await;
        assert_eq!(page.posts[0].title, "Beta");

        let path = dir.join("alpha.md");
        fs::write(&path, "+++\ntitle = \"Alpha\"\ndate = \"2024-03-01\"\n+++\nA").unwrap();
        let later = std::time::SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        manager.get_post("alpha").await.unwrap();
        let page = manager.get_posts_page(0, &PostsFilter::default()).await;
        assert_eq!(page.posts[0].title, "Alpha");
        assert_eq!(page.posts[1].title, "Beta");

        let timeline = manager.timeline().await;
        assert_eq!(timeline[0].months[0].month, 3);
    }

    #[tokio::test]
    async fn test_markdown_rendering() {
        let temp_dir = TempDir::new().unwrap();
        let posts_dir = temp_dir.path();

        let markdown_content = r#"+++
title = "Markdown Test"
summary = "Testing markdown features"
date = "2024-01-01"
+++

# Heading 1

## Heading 2

This is a paragraph with **bold** and *italic* text.

- List item 1
- List item 2

1. Numbered item 1
2. Numbered item 2

```rust
fn main() {
    println!("Hello, world!");
}
```

> This is a blockquote

[Link to example](https://example.com)

| Column 1 | Column 2 |
|----------|----------|
| Cell 1   | Cell 2   |

~~Strikethrough text~~

- [ ] open task

Footnote[^1]

[^1]: This is a footnote
"#;

        fs::write(posts_dir.join("markdown-test.md"), markdown_content).unwrap();

        let manager = PostsManager::new(config_for(posts_dir));
        manager.refresh_posts().await.unwrap();

        let post = manager.get_post("markdown-test").await.unwrap();

        assert!(post.html_content.contains("<h1>Heading 1</h1>"));
        assert!(post.html_content.contains("<h2>Heading 2</h2>"));
        assert!(post.html_content.contains("<strong>bold</strong>"));
        assert!(post.html_content.contains("<em>italic</em>"));
        assert!(post.html_content.contains("<ul>"));
        assert!(post.html_content.contains("<ol>"));
        assert!(post.html_content.contains("<pre><code"));
        assert!(post.html_content.contains("<blockquote>"));
        assert!(post.html_content.contains("<a href=\"https://example.com\""));
        assert!(post.html_content.contains("<table>"));
        assert!(post.html_content.contains("<del>Strikethrough text</del>"));
        assert!(post.html_content.contains("type=\"checkbox\""));
        assert!(post.html_content.contains("sup")); // Footnote reference
    }
}
