//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{animals, delivery_records, sightings, subscriptions, users};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
}

/// Insertable struct for registering users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub login: &'a str,
    pub email: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Animal models
// ---------------------------------------------------------------------------

/// Row struct for reading from the animals table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = animals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnimalRow {
    pub id: i64,
    pub name: String,
    pub picture_url: Option<String>,
}

/// Insertable and changeset struct for animal writes.
///
/// `treat_none_as_null` lets an update clear a previously stored picture.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = animals)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AnimalWrite<'a> {
    pub name: &'a str,
    pub picture_url: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Subscription models
// ---------------------------------------------------------------------------

/// Row struct for reading from the subscriptions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub id: i64,
    pub user_id: i64,
    pub animal_id: i64,
    pub description: Option<String>,
}

/// Insertable and changeset struct for subscription writes.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = subscriptions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SubscriptionWrite<'a> {
    pub user_id: i64,
    pub animal_id: i64,
    pub description: Option<&'a str>,
}

/// Subscription joined with its owner's address.
///
/// `email` is `None` both when the user has no address and when the user row
/// no longer exists.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct SubscriberRow {
    pub subscription_id: i64,
    pub user_id: i64,
    pub description: Option<String>,
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Sighting models
// ---------------------------------------------------------------------------

/// Row struct for reading from the sightings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sightings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SightingRow {
    pub id: i64,
    pub animal_id: i64,
    pub user_id: i64,
    pub observed_on: Option<NaiveDate>,
    pub place: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub individual_count: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for new sightings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sightings)]
pub(crate) struct NewSightingRow<'a> {
    pub animal_id: i64,
    pub user_id: i64,
    pub observed_on: Option<NaiveDate>,
    pub place: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub individual_count: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

/// Changeset for sighting updates; `recorded_at` is never rewritten.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sightings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SightingUpdate<'a> {
    pub animal_id: i64,
    pub user_id: i64,
    pub observed_on: Option<NaiveDate>,
    pub place: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub individual_count: Option<i32>,
}

// ---------------------------------------------------------------------------
// Delivery ledger models
// ---------------------------------------------------------------------------

/// Insertable struct for delivery outcomes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = delivery_records)]
pub(crate) struct NewDeliveryRecordRow<'a> {
    pub sighting_id: i64,
    pub subscription_id: i64,
    pub user_id: i64,
    pub status: &'a str,
    pub failure_kind: Option<&'a str>,
    pub failure_reason: Option<&'a str>,
    pub attempts: i32,
    pub completed_at: DateTime<Utc>,
}
