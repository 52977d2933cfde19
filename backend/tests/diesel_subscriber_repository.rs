//! Integration tests for `DieselSubscriberRepository`.

use chrono::{DateTime, TimeZone, Utc};
use finlead::domain::ports::SubscriberRepository;
use finlead::domain::{
    EmailAddress, PageRequest, PersonName, SubscribeOutcome, SubscriberStatus, Subscription, Slug,
};
use finlead::outbound::persistence::DieselSubscriberRepository;
use rstest::{fixture, rstest};
use uuid::Uuid;

mod support;

use support::{DatabaseContext, handle_cluster_setup_failure, setup_database_context};

struct TestContext {
    repository: DieselSubscriberRepository,
    db: DatabaseContext,
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_database_context() {
        Ok(db) => Some(TestContext {
            repository: DieselSubscriberRepository::new(db.pool.clone()),
            db,
        }),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn subscription(email: &str, name: Option<&str>, source: Option<&str>) -> Subscription {
    Subscription {
        email: EmailAddress::new(email).expect("fixture email"),
        name: name.map(|value| PersonName::new(value).expect("fixture name")),
        source: source.map(|value| Slug::new(value).expect("fixture source")),
    }
}

#[rstest]
fn resubscribing_reactivates_the_existing_row(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: resubscribing_reactivates_the_existing_row skipped");
        return;
    };
    let first_id = Uuid::new_v4();

    ctx.db.block_on(async {
        let created = ctx
            .repository
            .upsert(
                first_id,
                &subscription("isha@example.in", None, Some("footer")),
                at(9),
            )
            .await
            .expect("first subscribe");
        assert!(created.is_created());
        assert_eq!(created.subscriber().status, SubscriberStatus::Active);

        let email = created.subscriber().email.clone();
        let unsubscribed = ctx
            .repository
            .set_status(&email, SubscriberStatus::Unsubscribed, at(10))
            .await
            .expect("unsubscribe")
            .expect("subscriber exists");
        assert_eq!(unsubscribed.status, SubscriberStatus::Unsubscribed);

        let again = ctx
            .repository
            .upsert(
                Uuid::new_v4(),
                &subscription("ISHA@example.in", Some("Isha Kapoor"), Some("blog")),
                at(11),
            )
            .await
            .expect("second subscribe");
        let SubscribeOutcome::Reactivated(subscriber) = again else {
            panic!("expected reactivation, got {again:?}");
        };
        assert_eq!(subscriber.id, first_id);
        assert_eq!(subscriber.status, SubscriberStatus::Active);
        assert_eq!(subscriber.name.as_ref().map(PersonName::as_str), Some("Isha Kapoor"));
        assert_eq!(subscriber.source.as_ref().map(Slug::as_str), Some("blog"));
        assert_eq!(subscriber.created_at, at(9));
        assert_eq!(subscriber.updated_at, at(11));
    });
}

#[rstest]
fn unknown_emails_cannot_be_unsubscribed(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: unknown_emails_cannot_be_unsubscribed skipped");
        return;
    };
    let email = EmailAddress::new("nobody@example.in").expect("fixture email");

    let result = ctx
        .db
        .block_on(ctx.repository.set_status(&email, SubscriberStatus::Unsubscribed, at(9)))
        .expect("query runs");
    assert!(result.is_none());
}

#[rstest]
fn listing_filters_by_status(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: listing_filters_by_status skipped");
        return;
    };

    ctx.db.block_on(async {
        for (hour, email) in [(9, "a@example.in"), (10, "b@example.in"), (11, "c@example.in")] {
            ctx.repository
                .upsert(Uuid::new_v4(), &subscription(email, None, None), at(hour))
                .await
                .expect("subscribe");
        }
        let leaving = EmailAddress::new("b@example.in").expect("fixture email");
        ctx.repository
            .set_status(&leaving, SubscriberStatus::Unsubscribed, at(12))
            .await
            .expect("unsubscribe");

        let active = ctx
            .repository
            .list(Some(SubscriberStatus::Active), PageRequest::default())
            .await
            .expect("list active");
        let emails: Vec<&str> = active.items.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(active.total, 2);
        assert_eq!(emails, ["c@example.in", "a@example.in"]);

        let everyone = ctx
            .repository
            .list(None, PageRequest::new(1, 2))
            .await
            .expect("list all");
        assert_eq!(everyone.total, 3);
        assert_eq!(everyone.items.len(), 2);
        assert!(everyone.has_next());
    });
}
