//! Steps shared by every HTTP behaviour suite.

use actix_web::http::Method;
use rstest_bdd_macros::{given, then};
use serde_json::{Value, json};

use super::harness::{self, WorldFixture};

/// A complete loan application for `name`.
pub(crate) fn loan_payload(name: &str) -> Value {
    json!({
        "loanType": "personal",
        "fullName": name,
        "email": "neha@example.in",
        "phone": "9876543210",
        "pan": "ABCDE1234F",
        "city": "Jaipur",
        "amountRequested": 500000,
        "monthlyIncome": 85000,
        "employmentType": "salaried",
    })
}

pub(crate) fn submit_loan(world: &WorldFixture, payload: Value) {
    harness::send(
        &world.world(),
        Method::POST,
        "/api/v1/leads/loans",
        None,
        Some(payload),
    );
}

#[given("a running lead desk server")]
fn a_running_lead_desk_server(world: &WorldFixture) {
    assert!(world.world().borrow().last.is_none());
}

#[given("{name} has signed in as {email}")]
fn has_signed_in_as(world: &WorldFixture, name: String, email: String) {
    harness::sign_in(&world.world(), &name, &email, None);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let reply = ctx.last();
    assert_eq!(reply.status, status, "unexpected body: {:?}", reply.body);
}

#[then("the error code is {code}")]
fn the_error_code_is(world: &WorldFixture, code: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    assert_eq!(
        ctx.last_body().get("code").and_then(Value::as_str),
        Some(code.as_str())
    );
}
