//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Minimal user directory used to resolve notification addresses.
    users (id) {
        id -> Int8,
        login -> Varchar,
        email -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Administrator-managed animal catalogue.
    animals (id) {
        id -> Int8,
        name -> Varchar,
        picture_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Standing interest of a user in an animal. Duplicate pairs are allowed.
    subscriptions (id) {
        id -> Int8,
        user_id -> Int8,
        animal_id -> Int8,
        description -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reported sightings. Either `place` or both coordinates are present.
    sightings (id) {
        id -> Int8,
        animal_id -> Int8,
        user_id -> Int8,
        observed_on -> Nullable<Date>,
        place -> Nullable<Varchar>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        individual_count -> Nullable<Int4>,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per completed notification delivery.
    delivery_records (id) {
        id -> Int8,
        sighting_id -> Int8,
        subscription_id -> Int8,
        user_id -> Int8,
        status -> Varchar,
        failure_kind -> Nullable<Varchar>,
        failure_reason -> Nullable<Text>,
        attempts -> Int4,
        completed_at -> Timestamptz,
    }
}

// Subscribers are resolved with a LEFT JOIN on `user_id`; there is no foreign
// key, so the join is declared here rather than inferred.
diesel::joinable!(subscriptions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    animals,
    delivery_records,
    sightings,
    subscriptions,
    users,
);
