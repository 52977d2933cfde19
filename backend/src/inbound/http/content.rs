//! Public content: news, research reports, and service material pages.
//!
//! ```text
//! GET /api/v1/content/{kind}?page=&pageSize=
//! GET /api/v1/content/{kind}/{slug}
//! ```

use actix_web::{get, web};

use crate::domain::{Article, ArticleSummary, Error, Page, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{PageQuery, article_kind};

/// Published articles of one section, most recently published first.
#[utoipa::path(
    get,
    path = "/api/v1/content/{kind}",
    params(
        ("kind" = String, Path, description = "news, report, or material"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Article summaries", body = Page<ArticleSummary>),
        (status = 400, description = "Bad paging parameters", body = Error),
        (status = 404, description = "Unknown section", body = Error)
    ),
    tags = ["content"],
    operation_id = "listContent",
    security([])
)]
#[get("/content/{kind}")]
pub async fn list_content(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<ArticleSummary>>> {
    let kind = article_kind(&path)?;
    let page = query.page_request()?;
    Ok(web::Json(state.content.list_published(kind, page).await?))
}

/// One published article with its body.
#[utoipa::path(
    get,
    path = "/api/v1/content/{kind}/{slug}",
    params(
        ("kind" = String, Path, description = "news, report, or material"),
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article", body = Article),
        (status = 404, description = "No such published article", body = Error)
    ),
    tags = ["content"],
    operation_id = "getContent",
    security([])
)]
#[get("/content/{kind}/{slug}")]
pub async fn get_content(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Article>> {
    let (kind, slug) = path.into_inner();
    let kind = article_kind(&kind)?;
    let slug = Slug::new(&slug)
        .map_err(|_| Error::not_found(format!("no published {kind} named {slug}")))?;
    Ok(web::Json(state.content.published(kind, &slug).await?))
}

#[cfg(test)]
mod tests {
    use crate::domain::{ArticleDraft, NewArticle};
    use crate::inbound::http::test_utils::TestHarness;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    async fn seed(harness: &TestHarness, slug: &str, published: bool) {
        let article = NewArticle::validate(ArticleDraft {
            kind: Some("report".to_owned()),
            slug: Some(slug.to_owned()),
            title: Some(format!("Report {slug}")),
            body: Some("Full text".to_owned()),
            published: Some(published),
            ..ArticleDraft::default()
        })
        .expect("valid article");
        harness.state.content.create(article).await.expect("create article");
    }

    #[actix_web::test]
    async fn lists_only_published_articles_without_bodies() {
        let harness = TestHarness::new();
        seed(&harness, "q1-outlook", true).await;
        seed(&harness, "q2-draft", false).await;
        let app = actix_test::init_service(harness.app()).await;

        let page: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/content/report")
                .to_request(),
        )
        .await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["items"][0]["slug"], "q1-outlook");
        assert!(page["items"][0].get("body").is_none());
    }

    #[actix_web::test]
    async fn unpublished_article_is_not_found() {
        let harness = TestHarness::new();
        seed(&harness, "q2-draft", false).await;
        let app = actix_test::init_service(harness.app()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/content/report/q2-draft")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn published_article_includes_body() {
        let harness = TestHarness::new();
        seed(&harness, "q1-outlook", true).await;
        let app = actix_test::init_service(harness.app()).await;

        let article: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/content/report/q1-outlook")
                .to_request(),
        )
        .await;
        assert_eq!(article["body"], "Full text");
        assert_eq!(article["published"], true);
    }

    #[actix_web::test]
    async fn unknown_section_is_not_found() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/content/podcasts")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn out_of_range_page_size_is_a_bad_request() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/content/news?pageSize=101")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
