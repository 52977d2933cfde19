//! Behavioural tests for referral credit at sign-up.
#[expect(
    dead_code,
    reason = "Shared harness has fields used only by other behaviour suites."
)]
#[path = "bdd/harness.rs"]
mod harness;
#[expect(dead_code, reason = "Lead submission helpers serve the other suites.")]
#[path = "bdd/common_steps.rs"]
mod common_steps;

use actix_web::http::Method;
use harness::WorldFixture;
use rstest::fixture;
use rstest_bdd_macros::{scenario, then, when};
use serde_json::Value;

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

#[when("{name} signs up as {email} with the refer code of {referrer}")]
fn signs_up_with_the_refer_code_of(
    world: &WorldFixture,
    name: String,
    email: String,
    referrer: String,
) {
    let shared = world.world();
    let code = shared
        .borrow()
        .refer_codes
        .get(&referrer)
        .cloned()
        .unwrap_or_else(|| panic!("{referrer} has not signed in"));
    harness::sign_in(&shared, &name, &email, Some(code));
}

#[when("{name} signs up as {email} quoting the unknown code {code}")]
fn signs_up_quoting_an_unknown_code(
    world: &WorldFixture,
    name: String,
    email: String,
    code: String,
) {
    harness::sign_in(&world.world(), &name, &email, Some(code));
}

#[when("{email} asks for their referral summary")]
fn asks_for_their_referral_summary(world: &WorldFixture, email: String) {
    harness::send(
        &world.world(),
        Method::GET,
        "/api/v1/referrals/me",
        Some(&email),
        None,
    );
}

#[when("an anonymous visitor asks for a referral summary")]
fn an_anonymous_visitor_asks_for_a_referral_summary(world: &WorldFixture) {
    harness::send(&world.world(), Method::GET, "/api/v1/referrals/me", None, None);
}

#[then("the referee count is {count}")]
fn the_referee_count_is(world: &WorldFixture, count: u64) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(ctx.last().status, 200);
    let body = ctx.last_body();
    assert_eq!(body.get("refereeCount").and_then(Value::as_u64), Some(count));
    let listed = body["referees"].as_array().map_or(0, Vec::len);
    assert_eq!(listed as u64, count);
}

#[then("the referees include {name}")]
fn the_referees_include(world: &WorldFixture, name: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let referees = ctx.last_body()["referees"].as_array().expect("referees");
    assert!(
        referees
            .iter()
            .any(|entry| entry.get("displayName").and_then(Value::as_str) == Some(name.as_str())),
        "{name} missing from {referees:?}"
    );
}

#[then("the signed-in user has no referrer")]
fn the_signed_in_user_has_no_referrer(world: &WorldFixture) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let referrer = ctx.last_body().get("referrerCode");
    assert!(referrer.is_none_or(Value::is_null), "unexpected referrer {referrer:?}");
}

#[scenario(path = "tests/features/referrals.feature")]
fn referrals(world: WorldFixture) {
    drop(world);
}
