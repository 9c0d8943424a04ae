//! Live per-status post list.
//!
//! A [`PostFeed`] holds the latest list of posts with one status. It listens
//! on the posts change channel and re-queries the whole list whenever a change
//! touches its status. Readers observe it through a `tokio::sync::watch`
//! channel, so the newest snapshot always wins. A [`FeedHub`] keeps one feed
//! per status for the whole process.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use contentoire_core::domain::{Post, PostStatus};
use contentoire_core::error::RepoError;
use contentoire_core::ports::{
    PostRepository, PubSub, PubSubError, Subscription, message_handler,
};
use contentoire_core::services::{POSTS_CHANNEL, PostEvent};

/// What a client renders: the list plus the loading flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub status: PostStatus,
    pub posts: Vec<Post>,
    /// True until the first load finishes.
    pub loading: bool,
    /// True while a user-requested refresh is in flight.
    pub refreshing: bool,
    /// Last load failure. The list keeps its previous contents.
    pub error: Option<String>,
}

impl FeedSnapshot {
    fn empty(status: PostStatus) -> Self {
        Self {
            status,
            posts: Vec::new(),
            loading: true,
            refreshing: false,
            error: None,
        }
    }
}

struct FeedState {
    status: PostStatus,
    repo: Arc<dyn PostRepository>,
    tx: watch::Sender<FeedSnapshot>,
}

impl FeedState {
    async fn reload(&self) -> Result<(), RepoError> {
        match self.repo.find_by_status(self.status).await {
            Ok(posts) => {
                self.tx.send_modify(|snapshot| {
                    snapshot.posts = posts;
                    snapshot.loading = false;
                    snapshot.refreshing = false;
                    snapshot.error = None;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(status = %self.status, error = %e, "Failed to load posts");
                let message = e.to_string();
                self.tx.send_modify(|snapshot| {
                    snapshot.loading = false;
                    snapshot.refreshing = false;
                    snapshot.error = Some(message);
                });
                Err(e)
            }
        }
    }

    async fn on_event(&self, payload: &str) {
        match serde_json::from_str::<PostEvent>(payload) {
            Ok(event) if !event.concerns(self.status) => return,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable post event, reloading anyway");
            }
        }
        // Failures are already recorded on the snapshot.
        let _ = self.reload().await;
    }
}

/// Posts with one status, kept current by change notifications.
///
/// Dropping the feed ends the subscription.
pub struct PostFeed {
    state: Arc<FeedState>,
    _subscription: Subscription,
}

impl PostFeed {
    /// Subscribe to post changes, then load the initial list.
    ///
    /// A failed initial load is recorded on the snapshot, not returned.
    pub async fn start(
        status: PostStatus,
        repo: Arc<dyn PostRepository>,
        events: Arc<dyn PubSub>,
    ) -> Result<Self, PubSubError> {
        let (tx, _) = watch::channel(FeedSnapshot::empty(status));
        let state = Arc::new(FeedState { status, repo, tx });

        let listener = state.clone();
        let subscription = events
            .subscribe(
                POSTS_CHANNEL,
                message_handler(move |message| {
                    let listener = listener.clone();
                    async move { listener.on_event(&message.payload).await }
                }),
            )
            .await?;

        let _ = state.reload().await;
        tracing::debug!(status = %status, "Post feed started");

        Ok(Self {
            state,
            _subscription: subscription,
        })
    }

    pub fn status(&self) -> PostStatus {
        self.state.status
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.tx.borrow().clone()
    }

    /// A receiver that sees every later snapshot.
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.tx.subscribe()
    }

    /// Pull-to-refresh: one fetch with the refreshing flag raised.
    pub async fn force_refresh(&self) -> Result<(), RepoError> {
        self.state.tx.send_modify(|snapshot| snapshot.refreshing = true);
        self.state.reload().await
    }

    /// Patch the local list after a successful write, before the change
    /// notification arrives. A post that left this status is dropped.
    pub fn update_local(&self, post: &Post) {
        let status = self.state.status;
        self.state.tx.send_modify(|snapshot| {
            snapshot.posts.retain(|p| p.id != post.id);
            if post.status == status {
                snapshot.posts.push(post.clone());
                snapshot
                    .posts
                    .sort_by_key(|p| (p.active_time(), p.created_at));
            }
        });
    }

    pub fn remove_local(&self, id: Uuid) {
        self.state
            .tx
            .send_modify(|snapshot| snapshot.posts.retain(|p| p.id != id));
    }
}

/// One live [`PostFeed`] per status, started on first use and shared by
/// every stream on this instance.
pub struct FeedHub {
    repo: Arc<dyn PostRepository>,
    events: Arc<dyn PubSub>,
    feeds: Mutex<HashMap<PostStatus, Arc<PostFeed>>>,
}

impl FeedHub {
    pub fn new(repo: Arc<dyn PostRepository>, events: Arc<dyn PubSub>) -> Self {
        Self {
            repo,
            events,
            feeds: Mutex::new(HashMap::new()),
        }
    }

    /// The feed for `status`, starting it if nobody has asked before.
    pub async fn feed(&self, status: PostStatus) -> Result<Arc<PostFeed>, PubSubError> {
        let mut feeds = self.feeds.lock().await;
        if let Some(feed) = feeds.get(&status) {
            return Ok(feed.clone());
        }

        let feed =
            Arc::new(PostFeed::start(status, self.repo.clone(), self.events.clone()).await?);
        feeds.insert(status, feed.clone());
        Ok(feed)
    }

    /// Apply a written post to every running feed.
    pub async fn apply_local(&self, post: &Post) {
        for feed in self.feeds.lock().await.values() {
            feed.update_local(post);
        }
    }

    /// Drop a deleted post from every running feed.
    pub async fn remove_local(&self, id: Uuid) {
        for feed in self.feeds.lock().await.values() {
            feed.remove_local(id);
        }
    }

    pub async fn running(&self) -> usize {
        self.feeds.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeDelta, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};
    use contentoire_core::domain::{NewPost, PostChanges, ScheduleRequest};
    use contentoire_core::ports::BaseRepository;
    use contentoire_core::services::PostService;
    use std::time::Duration;

    use crate::database::InMemoryPostRepository;
    use crate::pubsub::InMemoryPubSub;

    fn draft(offset_hours: i64) -> NewPost {
        NewPost {
            title: format!("Story +{offset_hours}h"),
            content: "Body".to_string(),
            image_url: None,
            source_url: None,
            suggested_time: Utc::now() + TimeDelta::hours(offset_hours),
        }
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<FeedSnapshot>, f: F) -> FeedSnapshot
    where
        F: FnMut(&FeedSnapshot) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(f))
            .await
            .expect("feed did not update in time")
            .expect("feed closed")
            .clone()
    }

    #[tokio::test]
    async fn test_initial_load() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let events = Arc::new(InMemoryPubSub::default());
        let service = PostService::new(repo.clone(), events.clone());
        service.create(draft(2)).await.unwrap();
        service.create(draft(1)).await.unwrap();

        let feed = PostFeed::start(PostStatus::Waiting, repo, events)
            .await
            .unwrap();

        let snapshot = feed.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.posts.len(), 2);
        assert_eq!(snapshot.posts[0].title, "Story +1h");
    }

    #[tokio::test]
    async fn test_schedule_moves_post_between_feeds() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let events = Arc::new(InMemoryPubSub::default());
        let service = PostService::new(repo.clone(), events.clone());
        let post = service.create(draft(1)).await.unwrap();

        let waiting = PostFeed::start(PostStatus::Waiting, repo.clone(), events.clone())
            .await
            .unwrap();
        let scheduled = PostFeed::start(PostStatus::Scheduled, repo.clone(), events.clone())
            .await
            .unwrap();
        let mut waiting_rx = waiting.watch();
        let mut scheduled_rx = scheduled.watch();

        service
            .schedule(
                post.id,
                ScheduleRequest::at(Utc::now() + TimeDelta::hours(5)),
            )
            .await
            .unwrap();

        let w = wait_for(&mut waiting_rx, |s| s.posts.is_empty()).await;
        assert!(w.posts.is_empty());
        let s = wait_for(&mut scheduled_rx, |s| s.posts.len() == 1).await;
        assert_eq!(s.posts[0].id, post.id);
        assert_eq!(s.posts[0].status, PostStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_update_local_moves_post_out() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let events = Arc::new(InMemoryPubSub::default());
        let mut post = Post::new(draft(1)).unwrap();
        repo.save(post.clone()).await.unwrap();

        let feed = PostFeed::start(PostStatus::Waiting, repo, events)
            .await
            .unwrap();
        assert_eq!(feed.snapshot().posts.len(), 1);

        post.apply(&PostChanges {
            status: Some(PostStatus::Scheduled),
            scheduled_time: Some(Some(Utc::now() + TimeDelta::hours(4))),
            ..PostChanges::default()
        });
        feed.update_local(&post);

        assert!(feed.snapshot().posts.is_empty());
    }

    /// Serves the inner store until switched offline.
    #[derive(Default)]
    struct FlakyRepo {
        inner: InMemoryPostRepository,
        offline: AtomicBool,
    }

    impl FlakyRepo {
        fn check(&self) -> Result<(), RepoError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(RepoError::Connection("offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for FlakyRepo {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            self.check()?;
            self.inner.find_by_id(id).await
        }
        async fn save(&self, post: Post) -> Result<Post, RepoError> {
            self.check()?;
            self.inner.save(post).await
        }
        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.check()?;
            self.inner.delete(id).await
        }
    }

    #[async_trait]
    impl PostRepository for FlakyRepo {
        async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
            self.check()?;
            self.inner.find_by_status(status).await
        }
        async fn find_between(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<Post>, RepoError> {
            self.check()?;
            self.inner.find_between(from, to).await
        }
        async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
            self.check()?;
            self.inner.find_due(now).await
        }
        async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Post, RepoError> {
            self.check()?;
            self.inner.update(id, changes).await
        }
        async fn update_if_due(
            &self,
            id: Uuid,
            now: DateTime<Utc>,
            changes: &PostChanges,
        ) -> Result<Option<Post>, RepoError> {
            self.check()?;
            self.inner.update_if_due(id, now, changes).await
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_flags_and_keeps_list() {
        let repo = Arc::new(FlakyRepo::default());
        repo.save(Post::new(draft(1)).unwrap()).await.unwrap();
        repo.save(Post::new(draft(2)).unwrap()).await.unwrap();
        let events = Arc::new(InMemoryPubSub::default());

        let feed = PostFeed::start(PostStatus::Waiting, repo.clone(), events)
            .await
            .unwrap();
        assert_eq!(feed.snapshot().posts.len(), 2);

        repo.offline.store(true, Ordering::SeqCst);
        assert!(feed.force_refresh().await.is_err());

        let snapshot = feed.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.refreshing);
        assert_eq!(snapshot.error.as_deref(), Some("Database connection failed: offline"));
        let titles: Vec<&str> = snapshot.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Story +1h", "Story +2h"]);

        repo.offline.store(false, Ordering::SeqCst);
        feed.force_refresh().await.unwrap();
        assert!(feed.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_dropping_feed_ends_subscription() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let events = Arc::new(InMemoryPubSub::default());
        let feed = PostFeed::start(PostStatus::Waiting, repo, events.clone())
            .await
            .unwrap();
        assert_eq!(events.subscriber_count(POSTS_CHANNEL).await, 1);

        drop(feed);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(events.subscriber_count(POSTS_CHANNEL).await, 0);
    }

    #[tokio::test]
    async fn test_hub_shares_one_feed_per_status() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let events = Arc::new(InMemoryPubSub::default());
        let hub = FeedHub::new(repo.clone(), events.clone());

        let first = hub.feed(PostStatus::Waiting).await.unwrap();
        let again = hub.feed(PostStatus::Waiting).await.unwrap();
        hub.feed(PostStatus::Scheduled).await.unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(hub.running().await, 2);
        assert_eq!(events.subscriber_count(POSTS_CHANNEL).await, 2);
    }

    #[tokio::test]
    async fn test_hub_patches_running_feeds() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let events = Arc::new(InMemoryPubSub::default());
        let mut post = repo.save(Post::new(draft(1)).unwrap()).await.unwrap();
        let hub = FeedHub::new(repo, events);
        let waiting = hub.feed(PostStatus::Waiting).await.unwrap();
        let scheduled = hub.feed(PostStatus::Scheduled).await.unwrap();
        assert_eq!(waiting.snapshot().posts.len(), 1);

        post.apply(&PostChanges {
            status: Some(PostStatus::Scheduled),
            scheduled_time: Some(Some(Utc::now() + TimeDelta::hours(4))),
            ..PostChanges::default()
        });
        hub.apply_local(&post).await;

        assert!(waiting.snapshot().posts.is_empty());
        assert_eq!(scheduled.snapshot().posts[0].id, post.id);

        hub.remove_local(post.id).await;
        assert!(scheduled.snapshot().posts.is_empty());
    }
}
