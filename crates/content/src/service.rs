//! Content operations behind the admin dashboard.

use std::sync::Arc;

use pressroom_core::slug::slugify;
use pressroom_core::{CoreError, Session};
use pressroom_store::{tables, Filter, Order, Query, RecordStore, Row};
use serde_json::Value;

use crate::activity::{entities, ActivityAction, ActivityEntry, ActivityLogger};
use crate::error::ContentResult;
use crate::post::{Post, PostDraft};
use crate::testimonial::{Testimonial, TestimonialDraft};

/// Posts fetched per dashboard page load.
const POST_FETCH_LIMIT: usize = 1000;

/// Post and testimonial CRUD, with a trail entry per mutation.
///
/// Every operation validates its input before touching the store. Trail
/// appends are best-effort and never fail the mutation they describe.
/// Callers run one mutation at a time per operator; overlapping
/// submissions from the same actor are not guarded against.
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn RecordStore>,
    activity: ActivityLogger,
}

impl ContentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let activity = ActivityLogger::new(store.clone());
        Self { store, activity }
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    /// Create or update a post.
    ///
    /// The slug is derived from the title on every save. New posts always
    /// start unpublished; updates keep the draft's published state.
    pub async fn save_post(
        &self,
        actor: &Session,
        draft: &PostDraft,
        existing_id: Option<&str>,
    ) -> ContentResult<Post> {
        draft.validate()?;
        let slug = slugify(&draft.title);

        let post = match existing_id {
            Some(id) => {
                let rows = self
                    .store
                    .update(
                        tables::POSTS,
                        draft.update_row(&slug),
                        Filter::new().eq("id", id),
                    )
                    .await?;
                let Some(row) = rows.into_iter().next() else {
                    return Err(CoreError::NotFound {
                        entity: "post",
                        id: id.to_string(),
                    }
                    .into());
                };
                let post = Post::from_row(row)?;
                self.activity
                    .append(
                        &actor.email,
                        ActivityAction::Update,
                        entities::POST,
                        Some(&post.id),
                        format!("Post updated: {}", post.title),
                    )
                    .await;
                post
            }
            None => {
                let rows = self
                    .store
                    .insert(tables::POSTS, vec![draft.insert_row(&slug)])
                    .await?;
                let Some(row) = rows.into_iter().next() else {
                    return Err(
                        CoreError::Internal("insert returned no rows".to_string()).into()
                    );
                };
                let post = Post::from_row(row)?;
                self.activity
                    .append(
                        &actor.email,
                        ActivityAction::Create,
                        entities::POST,
                        Some(&post.id),
                        format!("Post created: {}", post.title),
                    )
                    .await;
                post
            }
        };
        Ok(post)
    }

    /// Flip a post's published flag.
    pub async fn set_post_published(
        &self,
        actor: &Session,
        id: &str,
        published: bool,
    ) -> ContentResult<Post> {
        let mut patch = Row::new();
        patch.insert("published".to_string(), Value::Bool(published));
        let rows = self
            .store
            .update(tables::POSTS, patch, Filter::new().eq("id", id))
            .await?;
        let Some(row) = rows.into_iter().next() else {
            return Err(CoreError::NotFound {
                entity: "post",
                id: id.to_string(),
            }
            .into());
        };
        let post = Post::from_row(row)?;
        let verb = if published { "published" } else { "unpublished" };
        self.activity
            .append(
                &actor.email,
                ActivityAction::Update,
                entities::POST,
                Some(&post.id),
                format!("Post {verb}: {}", post.title),
            )
            .await;
        Ok(post)
    }

    /// Delete a post. The title only feeds the trail entry.
    pub async fn delete_post(&self, actor: &Session, id: &str, title: &str) -> ContentResult<()> {
        self.store
            .delete(tables::POSTS, Filter::new().eq("id", id))
            .await?;
        self.activity
            .append(
                &actor.email,
                ActivityAction::Delete,
                entities::POST,
                Some(id),
                format!("Post deleted: {title}"),
            )
            .await;
        Ok(())
    }

    /// Latest posts, newest first.
    pub async fn list_posts(&self) -> ContentResult<Vec<Post>> {
        let query = Query::new()
            .order(Order::desc("created_at"))
            .limit(POST_FETCH_LIMIT);
        let rows = self.store.select(tables::POSTS, query).await?;
        let posts = rows
            .into_iter()
            .map(Post::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    // -----------------------------------------------------------------------
    // Testimonials
    // -----------------------------------------------------------------------

    /// Create or update a testimonial.
    pub async fn save_testimonial(
        &self,
        actor: &Session,
        draft: &TestimonialDraft,
        existing_id: Option<&str>,
    ) -> ContentResult<Testimonial> {
        draft.validate()?;

        let testimonial = match existing_id {
            Some(id) => {
                let rows = self
                    .store
                    .update(
                        tables::TESTIMONIALS,
                        draft.update_row(),
                        Filter::new().eq("id", id),
                    )
                    .await?;
                let Some(row) = rows.into_iter().next() else {
                    return Err(CoreError::NotFound {
                        entity: "testimonial",
                        id: id.to_string(),
                    }
                    .into());
                };
                let testimonial = Testimonial::from_row(row)?;
                self.activity
                    .append(
                        &actor.email,
                        ActivityAction::Update,
                        entities::TESTIMONIAL,
                        Some(&testimonial.id),
                        format!(
                            "Testimonial updated: {} ({})",
                            testimonial.name, testimonial.company
                        ),
                    )
                    .await;
                testimonial
            }
            None => {
                let rows = self
                    .store
                    .insert(tables::TESTIMONIALS, vec![draft.insert_row()])
                    .await?;
                let Some(row) = rows.into_iter().next() else {
                    return Err(
                        CoreError::Internal("insert returned no rows".to_string()).into()
                    );
                };
                let testimonial = Testimonial::from_row(row)?;
                self.activity
                    .append(
                        &actor.email,
                        ActivityAction::Create,
                        entities::TESTIMONIAL,
                        Some(&testimonial.id),
                        format!(
                            "Testimonial created: {} ({})",
                            testimonial.name, testimonial.company
                        ),
                    )
                    .await;
                testimonial
            }
        };
        Ok(testimonial)
    }

    /// Delete a testimonial. Name and company only feed the trail entry.
    pub async fn delete_testimonial(
        &self,
        actor: &Session,
        id: &str,
        name: &str,
        company: &str,
    ) -> ContentResult<()> {
        self.store
            .delete(tables::TESTIMONIALS, Filter::new().eq("id", id))
            .await?;
        self.activity
            .append(
                &actor.email,
                ActivityAction::Delete,
                entities::TESTIMONIAL,
                Some(id),
                format!("Testimonial deleted: {name} ({company})"),
            )
            .await;
        Ok(())
    }

    /// All testimonials, newest first.
    pub async fn list_testimonials(&self) -> ContentResult<Vec<Testimonial>> {
        let query = Query::new().order(Order::desc("created_at"));
        let rows = self.store.select(tables::TESTIMONIALS, query).await?;
        let testimonials = rows
            .into_iter()
            .map(Testimonial::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(testimonials)
    }

    // -----------------------------------------------------------------------
    // Activity trail
    // -----------------------------------------------------------------------

    /// Latest trail entries, optionally restricted to one entity type.
    pub async fn recent_activity(
        &self,
        entity_type: Option<&str>,
        limit: usize,
    ) -> ContentResult<Vec<ActivityEntry>> {
        Ok(self.activity.recent(entity_type, limit).await?)
    }
}
