//! Route table shared by the server and the handler tests.

use actix_web::web;

use super::{admin, admin_pages, content, leads, referrals, subscribers, users};

/// Register the JSON API. Mount inside the `/api/v1` scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::sign_in)
        .service(users::sign_out)
        .service(users::current_user)
        .service(referrals::my_referrals)
        .service(leads::submit_loan)
        .service(leads::submit_insurance)
        .service(leads::submit_callback)
        .service(leads::submit_referral)
        .service(subscribers::subscribe)
        .service(subscribers::unsubscribe)
        .service(content::list_content)
        .service(content::get_content)
        .service(admin::list_leads)
        .service(admin::update_lead_status)
        .service(admin::list_subscribers)
        .service(admin::list_users)
        .service(admin::referrals_for_code)
        .service(admin::create_article)
        .service(admin::publish_article);
}

/// Register the server-rendered back-office at the application root.
pub fn configure_admin_pages(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_pages::dashboard)
        .service(admin_pages::leads)
        .service(admin_pages::subscribers);
}
