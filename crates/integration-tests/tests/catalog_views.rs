//! Integration tests for the per-screen view assemblers.
//!
//! Each assembler loads an immutable snapshot through the repository, then
//! renders it through the query pipeline. These tests seed the in-memory
//! store directly and check what each screen would show.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use widgetvault_catalog::query::{RecencyBucket, WidgetQuery};
use widgetvault_catalog::views::favorites::view as favorites_view;
use widgetvault_catalog::views::{
    CommunityAssembler, DashboardAssembler, FavoritesAssembler, RecentAssembler, RecentSource,
};
use widgetvault_core::UserId;
use widgetvault_integration_tests::{SeedWidget, TestCatalog, init_tracing};

fn text_query(text: &str) -> WidgetQuery {
    WidgetQuery {
        text: text.to_string(),
        ..WidgetQuery::default()
    }
}

async fn seed_at(
    catalog: &TestCatalog,
    owner: UserId,
    name: &str,
    updated_at: DateTime<Utc>,
) -> widgetvault_core::WidgetId {
    let mut seed = SeedWidget::new(owner, name);
    seed.updated_at = updated_at;
    catalog.seed_widget(&seed).await
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_stats_ignore_the_active_filter() {
    init_tracing();
    let catalog = TestCatalog::new();
    let session = catalog.seed_user("Ada").await;
    catalog.seed_category("Layout", "layout").await;
    catalog.seed_category("Forms", "forms").await;

    let base = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
    seed_at(&catalog, session.user_id(), "Hero Banner", base).await;
    seed_at(&catalog, session.user_id(), "Footer", base - Duration::hours(1)).await;
    seed_at(&catalog, session.user_id(), "Sidebar", base - Duration::hours(2)).await;

    let assembler = DashboardAssembler::new(catalog.repository.clone());
    let snapshot = assembler.load(&session).await.unwrap();
    let view = snapshot.view(&text_query("hero"));

    assert_eq!(view.widgets.len(), 1);
    assert_eq!(view.widgets.first().unwrap().name, "Hero Banner");
    // Stats describe the full snapshot, not the filtered subset.
    assert_eq!(view.stats.total_widgets, 3);
    assert_eq!(view.stats.category_count, 2);
    assert_eq!(view.stats.last_updated, Some(base));
}

#[tokio::test]
async fn test_dashboard_excludes_other_users_widgets() {
    let catalog = TestCatalog::new();
    let ada = catalog.seed_user("Ada").await;
    let bo = catalog.seed_user("Bo").await;

    catalog.seed_widget(&SeedWidget::new(ada.user_id(), "Mine")).await;
    let mut public = SeedWidget::new(bo.user_id(), "Theirs");
    public.is_public = true;
    catalog.seed_widget(&public).await;

    let assembler = DashboardAssembler::new(catalog.repository.clone());
    let snapshot = assembler.load(&ada).await.unwrap();

    assert_eq!(snapshot.widgets.len(), 1);
    assert_eq!(snapshot.widgets.as_slice().first().unwrap().name, "Mine");
}

// =============================================================================
// Recent
// =============================================================================

#[tokio::test]
async fn test_recent_caps_at_load_before_any_filter() {
    let catalog = TestCatalog::new();
    let session = catalog.seed_user("Ada").await;
    let base = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    // Ten fresh widgets, then two older "archived" ones past the cap.
    for n in 0..10 {
        seed_at(
            &catalog,
            session.user_id(),
            &format!("Fresh {n}"),
            base - Duration::minutes(n),
        )
        .await;
    }
    seed_at(&catalog, session.user_id(), "Archived 1", base - Duration::days(30)).await;
    seed_at(&catalog, session.user_id(), "Archived 2", base - Duration::days(31)).await;

    let assembler =
        RecentAssembler::with_cap(catalog.repository.clone(), RecentSource::OwnedOnly, 10);
    let snapshot = assembler.load(&session).await.unwrap();
    assert_eq!(snapshot.widgets.len(), 10);

    // The archived widgets were cut by the cap, so a filter matching only
    // them finds nothing; it cannot pull older widgets back in.
    let groups = snapshot.view(&text_query("archived"), base);
    assert!(groups.is_empty());

    let all = snapshot.view(&WidgetQuery::default(), base);
    let total: usize = all.iter().map(|group| group.widgets.len()).sum();
    assert_eq!(total, 10);
}

#[tokio::test]
async fn test_recent_groups_follow_bucket_order() {
    let catalog = TestCatalog::new();
    let session = catalog.seed_user("Ada").await;
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    seed_at(&catalog, session.user_id(), "Fresh", now - Duration::hours(2)).await;
    seed_at(&catalog, session.user_id(), "Recent", now - Duration::days(1)).await;
    seed_at(&catalog, session.user_id(), "Weekly", now - Duration::days(3)).await;
    seed_at(&catalog, session.user_id(), "Stale", now - Duration::days(40)).await;

    let assembler = RecentAssembler::new(catalog.repository.clone(), RecentSource::OwnedOnly);
    let snapshot = assembler.load(&session).await.unwrap();
    let groups = snapshot.view(&WidgetQuery::default(), now);

    let buckets: Vec<RecencyBucket> = groups.iter().map(|group| group.bucket).collect();
    assert_eq!(
        buckets,
        vec![
            RecencyBucket::Today,
            RecencyBucket::Yesterday,
            RecencyBucket::ThisWeek,
            RecencyBucket::Earlier,
        ]
    );
    for group in &groups {
        assert_eq!(group.widgets.len(), 1);
    }
}

#[tokio::test]
async fn test_recent_omits_empty_buckets() {
    let catalog = TestCatalog::new();
    let session = catalog.seed_user("Ada").await;
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

    seed_at(&catalog, session.user_id(), "Fresh", now - Duration::hours(1)).await;
    seed_at(&catalog, session.user_id(), "Stale", now - Duration::days(90)).await;

    let assembler = RecentAssembler::new(catalog.repository.clone(), RecentSource::OwnedOnly);
    let snapshot = assembler.load(&session).await.unwrap();
    let groups = snapshot.view(&WidgetQuery::default(), now);

    let buckets: Vec<RecencyBucket> = groups.iter().map(|group| group.bucket).collect();
    assert_eq!(buckets, vec![RecencyBucket::Today, RecencyBucket::Earlier]);
}

#[tokio::test]
async fn test_recent_all_visible_includes_public_widgets() {
    let catalog = TestCatalog::new();
    let ada = catalog.seed_user("Ada").await;
    let bo = catalog.seed_user("Bo").await;

    catalog.seed_widget(&SeedWidget::new(ada.user_id(), "Mine")).await;
    let mut public = SeedWidget::new(bo.user_id(), "Shared");
    public.is_public = true;
    catalog.seed_widget(&public).await;
    catalog.seed_widget(&SeedWidget::new(bo.user_id(), "Hidden")).await;

    let assembler = RecentAssembler::new(catalog.repository.clone(), RecentSource::AllVisible);
    let snapshot = assembler.load(&ada).await.unwrap();

    let names: Vec<&str> = snapshot
        .widgets
        .iter()
        .map(|widget| widget.name.as_str())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Mine"));
    assert!(names.contains(&"Shared"));
}

// =============================================================================
// Community
// =============================================================================

#[tokio::test]
async fn test_community_shows_public_widgets_and_contributors() {
    let catalog = TestCatalog::new();
    let bo = catalog.seed_user("Bo").await;
    let ada = catalog.seed_user("Ada").await;
    let viewer = catalog.seed_user("Cal").await;

    for name in ["Hero Banner", "Footer"] {
        let mut seed = SeedWidget::new(ada.user_id(), name);
        seed.is_public = true;
        catalog.seed_widget(&seed).await;
    }
    catalog.seed_widget(&SeedWidget::new(ada.user_id(), "Draft")).await;
    let mut bo_widget = SeedWidget::new(bo.user_id(), "Carousel");
    bo_widget.is_public = true;
    catalog.seed_widget(&bo_widget).await;

    let assembler = CommunityAssembler::new(catalog.repository.clone());
    let snapshot = assembler.load(&viewer).await.unwrap();

    // Only public widgets; the viewer with none published is no contributor.
    assert_eq!(snapshot.widgets.len(), 3);
    let names: Vec<&str> = snapshot
        .contributors
        .iter()
        .map(|profile| profile.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ada", "Bo"]);

    // Contributor counts cover everything they own, drafts included.
    let ada_profile = snapshot.contributors.first().unwrap();
    assert_eq!(ada_profile.widget_count, 3);
}

#[tokio::test]
async fn test_community_view_narrows_to_one_author() {
    let catalog = TestCatalog::new();
    let ada = catalog.seed_user("Ada").await;
    let bo = catalog.seed_user("Bo").await;

    let mut ada_widget = SeedWidget::new(ada.user_id(), "Hero Banner");
    ada_widget.is_public = true;
    catalog.seed_widget(&ada_widget).await;
    let mut bo_widget = SeedWidget::new(bo.user_id(), "Carousel");
    bo_widget.is_public = true;
    catalog.seed_widget(&bo_widget).await;

    let assembler = CommunityAssembler::new(catalog.repository.clone());
    let snapshot = assembler.load(&ada).await.unwrap();

    let scoped = snapshot.view(&WidgetQuery::default(), Some(bo.user_id()));
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped.first().unwrap().name, "Carousel");

    let everyone = snapshot.view(&WidgetQuery::default(), None);
    assert_eq!(everyone.len(), 2);
}

// =============================================================================
// Taxonomy
// =============================================================================

#[tokio::test]
async fn test_taxonomy_counts_come_from_link_tables() {
    let catalog = TestCatalog::new();
    let session = catalog.seed_user("Ada").await;
    let layout = catalog.seed_category("Layout", "layout").await;
    catalog.seed_category("Forms", "forms").await;
    let dark = catalog.seed_tag("Dark Mode", "dark-mode").await;

    let first = catalog
        .seed_widget(&SeedWidget::new(session.user_id(), "Hero Banner"))
        .await;
    let second = catalog
        .seed_widget(&SeedWidget::new(session.user_id(), "Footer"))
        .await;
    catalog.link_widget_category(first, layout).await;
    catalog.link_widget_category(second, layout).await;
    catalog.link_widget_tag(first, dark).await;

    let categories = catalog.repository.list_categories().await.unwrap();
    let counted: Vec<(&str, usize)> = categories
        .iter()
        .map(|category| (category.name.as_str(), category.usage_count))
        .collect();
    assert_eq!(counted, vec![("Forms", 0), ("Layout", 2)]);

    let tags = catalog.repository.list_tags().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags.first().unwrap().usage_count, 1);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_favorites_screen_shows_only_starred_widgets() {
    let catalog = TestCatalog::new();
    let session = catalog.seed_user("Ada").await;

    let starred = catalog
        .seed_widget(&SeedWidget::new(session.user_id(), "Hero Banner"))
        .await;
    let also_starred = catalog
        .seed_widget(&SeedWidget::new(session.user_id(), "Footer"))
        .await;
    catalog
        .seed_widget(&SeedWidget::new(session.user_id(), "Sidebar"))
        .await;

    catalog
        .repository
        .add_favorite(session.user_id(), starred)
        .await
        .unwrap();
    catalog
        .repository
        .add_favorite(session.user_id(), also_starred)
        .await
        .unwrap();

    let assembler = FavoritesAssembler::new(catalog.repository.clone());
    let snapshot = assembler.load(&session).await.unwrap();

    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.iter().all(|widget| widget.is_favorite));

    let narrowed = favorites_view(&snapshot, &text_query("footer"));
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed.first().unwrap().name, "Footer");
}
