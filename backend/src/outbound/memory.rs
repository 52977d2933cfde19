//! In-process repositories used when no `DATABASE_URL` is configured and by
//! the HTTP tests.
//!
//! They mirror the constraints the PostgreSQL schema enforces (unique email,
//! unique refer code, unique kind+slug, upsert on subscriber email) so the
//! services behave the same against either backend. Data lives only as long
//! as the process.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, LeadRepository, LeadRepositoryError,
    SubscriberRepository, SubscriberRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Article, ArticleKind, ArticleSummary, DisplayName, EmailAddress, LeadKind, LeadRecord,
    LeadStatus, LeadStatusCount, Page, PageRequest, RefereeSummary, ReferCode, Role, Slug,
    SubscribeOutcome, Subscriber, SubscriberStatus, Subscription, User, UserId, UserListing,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex
        .lock()
        .map_err(|_| "in-memory store poisoned by a panicked writer".to_owned())
}

/// Slice `rows` (already in display order) into the requested page.
fn paginate<T: Clone>(rows: Vec<&T>, page: PageRequest) -> Page<T> {
    let total = rows.len() as u64;
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let items = rows
        .into_iter()
        .skip(skip)
        .take(page.page_size() as usize)
        .cloned()
        .collect();
    Page::new(items, page, total)
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = lock(&self.users).map_err(UserPersistenceError::query)?;
        Ok(users.iter().find(|user| &user.id == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = lock(&self.users).map_err(UserPersistenceError::query)?;
        Ok(users.iter().find(|user| &user.email == email).cloned())
    }

    async fn find_by_refer_code(
        &self,
        code: &ReferCode,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = lock(&self.users).map_err(UserPersistenceError::query)?;
        Ok(users.iter().find(|user| &user.refer_code == code).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users).map_err(UserPersistenceError::query)?;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_str()));
        }
        if users.iter().any(|existing| existing.refer_code == user.refer_code) {
            return Err(UserPersistenceError::duplicate_refer_code(
                user.refer_code.as_str(),
            ));
        }
        if user.referrer_code.as_ref() == Some(&user.refer_code) {
            return Err(UserPersistenceError::query("a user cannot refer themselves"));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        display_name: &DisplayName,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = lock(&self.users).map_err(UserPersistenceError::query)?;
        Ok(users.iter_mut().find(|user| &user.id == id).map(|user| {
            user.display_name = display_name.clone();
            user.role = role;
            user.clone()
        }))
    }

    async fn referees(
        &self,
        code: &ReferCode,
    ) -> Result<Vec<RefereeSummary>, UserPersistenceError> {
        let users = lock(&self.users).map_err(UserPersistenceError::query)?;
        let mut referees: Vec<RefereeSummary> = users
            .iter()
            .filter(|user| user.referrer_code.as_ref() == Some(code))
            .map(|user| RefereeSummary {
                display_name: user.display_name.clone(),
                joined_at: user.created_at,
            })
            .collect();
        referees.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.display_name.as_str().cmp(b.display_name.as_str()))
        });
        Ok(referees)
    }

    async fn list_with_referee_counts(
        &self,
        page: PageRequest,
    ) -> Result<Page<UserListing>, UserPersistenceError> {
        let users = lock(&self.users).map_err(UserPersistenceError::query)?;
        let listings: Vec<UserListing> = users
            .iter()
            .rev()
            .map(|user| UserListing {
                user: user.clone(),
                referee_count: users
                    .iter()
                    .filter(|other| other.referrer_code.as_ref() == Some(&user.refer_code))
                    .count() as u64,
            })
            .collect();
        Ok(paginate(listings.iter().collect(), page))
    }
}

#[derive(Default)]
pub struct MemoryLeadRepository {
    leads: Mutex<Vec<LeadRecord>>,
}

#[async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn insert(&self, record: &LeadRecord) -> Result<(), LeadRepositoryError> {
        lock(&self.leads)
            .map_err(LeadRepositoryError::query)?
            .push(record.clone());
        Ok(())
    }

    async fn list(
        &self,
        kind: LeadKind,
        status: Option<LeadStatus>,
        page: PageRequest,
    ) -> Result<Page<LeadRecord>, LeadRepositoryError> {
        let leads = lock(&self.leads).map_err(LeadRepositoryError::query)?;
        let rows = leads
            .iter()
            .rev()
            .filter(|lead| lead.kind() == kind)
            .filter(|lead| status.is_none_or(|wanted| lead.status == wanted))
            .collect();
        Ok(paginate(rows, page))
    }

    async fn update_status(
        &self,
        kind: LeadKind,
        id: Uuid,
        status: LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<LeadRecord>, LeadRepositoryError> {
        let mut leads = lock(&self.leads).map_err(LeadRepositoryError::query)?;
        Ok(leads
            .iter_mut()
            .find(|lead| lead.id == id && lead.kind() == kind)
            .map(|lead| {
                lead.status = status;
                lead.updated_at = updated_at;
                lead.clone()
            }))
    }

    async fn count_by_status(&self) -> Result<Vec<LeadStatusCount>, LeadRepositoryError> {
        let leads = lock(&self.leads).map_err(LeadRepositoryError::query)?;
        let mut counts = Vec::new();
        for kind in LeadKind::ALL {
            for status in LeadStatus::ALL {
                let count = leads
                    .iter()
                    .filter(|lead| lead.kind() == *kind && lead.status == *status)
                    .count() as u64;
                if count > 0 {
                    counts.push(LeadStatusCount {
                        kind: *kind,
                        status: *status,
                        count,
                    });
                }
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct MemorySubscriberRepository {
    subscribers: Mutex<Vec<Subscriber>>,
}

#[async_trait]
impl SubscriberRepository for MemorySubscriberRepository {
    async fn upsert(
        &self,
        id: Uuid,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> Result<SubscribeOutcome, SubscriberRepositoryError> {
        let mut subscribers =
            lock(&self.subscribers).map_err(SubscriberRepositoryError::query)?;
        if let Some(existing) = subscribers
            .iter_mut()
            .find(|row| row.email == subscription.email)
        {
            existing.name = subscription.name.clone();
            existing.source = subscription.source.clone();
            existing.status = SubscriberStatus::Active;
            existing.updated_at = now;
            return Ok(SubscribeOutcome::Reactivated(existing.clone()));
        }
        let created = Subscriber {
            id,
            email: subscription.email.clone(),
            name: subscription.name.clone(),
            source: subscription.source.clone(),
            status: SubscriberStatus::Active,
            created_at: now,
            updated_at: now,
        };
        subscribers.push(created.clone());
        Ok(SubscribeOutcome::Created(created))
    }

    async fn set_status(
        &self,
        email: &EmailAddress,
        status: SubscriberStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscriber>, SubscriberRepositoryError> {
        let mut subscribers =
            lock(&self.subscribers).map_err(SubscriberRepositoryError::query)?;
        Ok(subscribers
            .iter_mut()
            .find(|row| &row.email == email)
            .map(|row| {
                row.status = status;
                row.updated_at = now;
                row.clone()
            }))
    }

    async fn list(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<Page<Subscriber>, SubscriberRepositoryError> {
        let subscribers = lock(&self.subscribers).map_err(SubscriberRepositoryError::query)?;
        let rows = subscribers
            .iter()
            .rev()
            .filter(|row| status.is_none_or(|wanted| row.status == wanted))
            .collect();
        Ok(paginate(rows, page))
    }
}

#[derive(Default)]
pub struct MemoryArticleRepository {
    articles: Mutex<Vec<Article>>,
}

#[async_trait]
impl ArticleRepository for MemoryArticleRepository {
    async fn insert(&self, article: &Article) -> Result<(), ArticleRepositoryError> {
        let mut articles = lock(&self.articles).map_err(ArticleRepositoryError::query)?;
        if articles
            .iter()
            .any(|existing| existing.kind == article.kind && existing.slug == article.slug)
        {
            return Err(ArticleRepositoryError::duplicate_slug(article.slug.as_str()));
        }
        articles.push(article.clone());
        Ok(())
    }

    async fn find_published(
        &self,
        kind: ArticleKind,
        slug: &Slug,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        let articles = lock(&self.articles).map_err(ArticleRepositoryError::query)?;
        Ok(articles
            .iter()
            .find(|article| article.published && article.kind == kind && &article.slug == slug)
            .cloned())
    }

    async fn list_published(
        &self,
        kind: ArticleKind,
        page: PageRequest,
    ) -> Result<Page<ArticleSummary>, ArticleRepositoryError> {
        let articles = lock(&self.articles).map_err(ArticleRepositoryError::query)?;
        let mut published: Vec<&Article> = articles
            .iter()
            .filter(|article| article.published && article.kind == kind)
            .collect();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        let summaries: Vec<ArticleSummary> =
            published.into_iter().map(Article::summary).collect();
        Ok(paginate(summaries.iter().collect(), page))
    }

    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut articles = lock(&self.articles).map_err(ArticleRepositoryError::query)?;
        Ok(articles.iter_mut().find(|article| article.id == id).map(|article| {
            article.published = published;
            if published && article.published_at.is_none() {
                article.published_at = Some(now);
            }
            article.clone()
        }))
    }
}
