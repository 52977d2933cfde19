//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts created at first sign-in.
    users (id) {
        id -> Uuid,
        /// Lower-cased, unique.
        email -> Text,
        display_name -> Text,
        /// `member` or `admin`.
        role -> Text,
        /// Unique, never updated.
        refer_code -> Text,
        /// Set once at creation; never equal to `refer_code`.
        referrer_code -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    loan_applications (id) {
        id -> Uuid,
        status -> Text,
        loan_type -> Text,
        full_name -> Text,
        email -> Text,
        phone -> Text,
        pan -> Text,
        city -> Text,
        /// Rupees.
        amount_requested -> Int8,
        monthly_income -> Nullable<Int8>,
        employment_type -> Text,
        message -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    insurance_quote_requests (id) {
        id -> Uuid,
        status -> Text,
        insurance_type -> Text,
        full_name -> Text,
        email -> Text,
        phone -> Text,
        city -> Text,
        age -> Nullable<Int2>,
        sum_insured -> Nullable<Int8>,
        message -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    callback_requests (id) {
        id -> Uuid,
        status -> Text,
        /// Slug of the service page the form was on.
        service -> Text,
        full_name -> Text,
        phone -> Text,
        email -> Nullable<Text>,
        preferred_time -> Nullable<Text>,
        message -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    referral_leads (id) {
        id -> Uuid,
        status -> Text,
        /// Refer code of the signed-in user who made the referral.
        referrer_code -> Text,
        product -> Text,
        friend_name -> Text,
        friend_phone -> Text,
        friend_email -> Nullable<Text>,
        note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    subscribers (id) {
        id -> Uuid,
        /// Unique; re-subscribing updates the existing row.
        email -> Text,
        name -> Nullable<Text>,
        source -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// News, research reports, and service material. `(kind, slug)` is unique.
    articles (id) {
        id -> Uuid,
        kind -> Text,
        slug -> Text,
        title -> Text,
        summary -> Text,
        body -> Text,
        document_url -> Nullable<Text>,
        published -> Bool,
        published_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    loan_applications,
    insurance_quote_requests,
    callback_requests,
    referral_leads,
    subscribers,
    articles,
);
