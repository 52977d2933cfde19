//! Query-string and path parsing shared by the inbound HTTP handlers.
//!
//! Failures use the same `{ "fields": [...] }` detail shape as body
//! validation so clients handle both the same way.

use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::domain::{
    ArticleKind, Error, FieldError, LeadKind, LeadStatus, PageRequest, SubscriberStatus,
    ViolationCode, Violations,
};

/// `?page=&pageSize=` parameters.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number. Defaults to 1.
    pub page: Option<i64>,
    /// Rows per page, 1 to 100. Defaults to 25.
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn page_request(&self) -> Result<PageRequest, Error> {
        PageRequest::parse(self.page, self.page_size).map_err(Error::from)
    }
}

/// `?page=&pageSize=&status=` parameters for filtered back-office lists.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatusPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Only return rows in this state.
    pub status: Option<String>,
}

impl StatusPageQuery {
    /// Validate paging and the status filter together, reporting every
    /// offending parameter at once.
    pub fn parse<S>(
        &self,
        parse_status: impl FnOnce(&str) -> Result<S, FieldError>,
    ) -> Result<(Option<S>, PageRequest), Error> {
        let mut violations = Violations::default();
        let page = match PageRequest::parse(self.page, self.page_size) {
            Ok(page) => Some(page),
            Err(errors) => {
                violations.absorb(errors);
                None
            }
        };
        let status = violations.optional(
            "status",
            self.status.as_deref().filter(|raw| !raw.trim().is_empty()),
            parse_status,
        );
        violations
            .finish(|| Some((status?, page?)))
            .map_err(Error::from)
    }

    pub fn lead_filter(&self) -> Result<(Option<LeadStatus>, PageRequest), Error> {
        self.parse(|raw| LeadStatus::parse(raw))
    }

    pub fn subscriber_filter(&self) -> Result<(Option<SubscriberStatus>, PageRequest), Error> {
        self.parse(|raw| SubscriberStatus::parse(raw))
    }
}

fn path_error(field: &'static str, error: FieldError) -> Error {
    let mut violations = Violations::default();
    violations.push(field, error);
    Error::from(violations)
}

/// Parse the `{kind}` segment of a lead route (`loans`, `insurance`, ...).
pub fn lead_kind(segment: &str) -> Result<LeadKind, Error> {
    LeadKind::from_path_segment(segment).ok_or_else(|| {
        let accepted: Vec<&str> = LeadKind::ALL.iter().map(|kind| kind.path_segment()).collect();
        Error::not_found(format!(
            "unknown lead kind {segment}; expected one of: {}",
            accepted.join(", ")
        ))
    })
}

/// Parse the `{kind}` segment of a content route.
pub fn article_kind(segment: &str) -> Result<ArticleKind, Error> {
    ArticleKind::parse(segment)
        .map_err(|_| Error::not_found(format!("unknown content section {segment}")))
}

/// Parse a UUID path parameter.
pub fn uuid_param(field: &'static str, raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        path_error(
            field,
            FieldError::new(ViolationCode::InvalidUuid, "must be a UUID"),
        )
    })
}

/// Reject a JSON body that parsed but carried nothing usable.
pub fn missing_field(field: &'static str) -> Error {
    Error::from({
        let mut violations = Violations::default();
        violations.push(field, FieldError::new(ViolationCode::MissingField, "is required"));
        violations
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    fn fields(error: &Error) -> Vec<String> {
        error
            .details()
            .and_then(|details| details.get("fields"))
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|field| field.get("field").and_then(Value::as_str))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[rstest]
    fn page_query_defaults() {
        let page = PageQuery::default().page_request().expect("defaults");
        assert_eq!(page, PageRequest::default());
    }

    #[rstest]
    fn status_page_query_reports_every_bad_parameter() {
        let query = StatusPageQuery {
            page: Some(0),
            page_size: Some(500),
            status: Some("archived".to_owned()),
        };
        let error = query.lead_filter().expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(fields(&error), vec!["page", "pageSize", "status"]);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("contacted"), Some(LeadStatus::Contacted))]
    fn status_filter_is_optional(
        #[case] raw: Option<&str>,
        #[case] expected: Option<LeadStatus>,
    ) {
        let query = StatusPageQuery {
            status: raw.map(str::to_owned),
            ..StatusPageQuery::default()
        };
        let (status, _) = query.lead_filter().expect("valid");
        assert_eq!(status, expected);
    }

    #[rstest]
    #[case("loans", Some(LeadKind::Loan))]
    #[case("callbacks", Some(LeadKind::Callback))]
    #[case("loan", None)]
    fn lead_kind_uses_plural_segments(#[case] raw: &str, #[case] expected: Option<LeadKind>) {
        assert_eq!(lead_kind(raw).ok(), expected);
    }

    #[rstest]
    fn bad_uuid_names_the_field() {
        let error = uuid_param("id", "nope").expect_err("invalid");
        assert_eq!(fields(&error), vec!["id"]);
    }
}
