//! Notification payloads produced by the dispatch path.
//!
//! A [`SightingRecorded`] event is matched against the subscribers of the
//! sighted animal; every subscriber with an address receives one rendered
//! [`OutboundMessage`].

use std::fmt::Write as _;

use chrono::NaiveDate;

use super::{
    AnimalName, EmailAddress, Location, Sighting, SightingCount, SubscriptionId, TraceId, UserId,
};

/// Event emitted once a sighting has been committed.
///
/// Carries the animal name captured at ingest so a later rename or delete of
/// the animal does not change what subscribers are told.
#[derive(Debug, Clone, PartialEq)]
pub struct SightingRecorded {
    pub sighting: Sighting,
    pub animal_name: AnimalName,
    /// Trace of the request that recorded the sighting.
    pub trace_id: Option<TraceId>,
}

/// Subscription joined with the owning user's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub email: Option<EmailAddress>,
    pub description: Option<String>,
}

/// Message handed to a notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
    pub is_multipart: bool,
}

/// Fields of a single subscriber's sighting notification.
#[derive(Debug, Clone, PartialEq)]
pub struct SightingNotification<'a> {
    recipient: &'a EmailAddress,
    animal_name: &'a AnimalName,
    location: &'a Location,
    date: Option<NaiveDate>,
    count: Option<SightingCount>,
    description: Option<&'a str>,
}

impl<'a> SightingNotification<'a> {
    /// Build the notification for `subscriber`, or `None` when they have no
    /// address to deliver to.
    pub fn for_subscriber(event: &'a SightingRecorded, subscriber: &'a Subscriber) -> Option<Self> {
        let recipient = subscriber.email.as_ref()?;
        Some(Self {
            recipient,
            animal_name: &event.animal_name,
            location: event.sighting.location(),
            date: event.sighting.date(),
            count: event.sighting.count(),
            description: subscriber.description.as_deref(),
        })
    }

    /// Render a plain-text, single-part message.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use spotting::domain::{
    ///     AnimalName, EmailAddress, LocationPolicy, NewSighting, SightingCandidate,
    ///     SightingId, SightingNotification, SightingRecorded, Subscriber, SubscriptionId, UserId,
    /// };
    ///
    /// let sighting = NewSighting::validate(
    ///     SightingCandidate {
    ///         animal_id: Some(1),
    ///         user_id: Some(3),
    ///         place: Some("Tatra".to_owned()),
    ///         ..SightingCandidate::default()
    ///     },
    ///     LocationPolicy::Either,
    /// )
    /// .expect("valid sighting")
    /// .into_stored(SightingId::new(10).expect("id"), Utc.timestamp_opt(0, 0).single().expect("time"));
    /// let event = SightingRecorded {
    ///     sighting,
    ///     animal_name: AnimalName::new("Lynx").expect("name"),
    ///     trace_id: None,
    /// };
    /// let subscriber = Subscriber {
    ///     subscription_id: SubscriptionId::new(1).expect("id"),
    ///     user_id: UserId::new(2).expect("id"),
    ///     email: Some(EmailAddress::new("a@example.org").expect("email")),
    ///     description: None,
    /// };
    /// let message = SightingNotification::for_subscriber(&event, &subscriber)
    ///     .expect("addressable")
    ///     .render();
    /// assert!(message.subject.contains("Lynx"));
    /// assert!(!message.is_html);
    /// ```
    pub fn render(&self) -> OutboundMessage {
        let mut body = format!("Hello, a {} was sighted at {}", self.animal_name, self.location);
        if let Some(date) = self.date {
            let _ = write!(body, " on {date}");
        }
        if let Some(count) = self.count {
            let noun = if count.get() == 1 { "individual" } else { "individuals" };
            let _ = write!(body, " ({} {noun})", count.get());
        }
        body.push('.');
        if let Some(description) = self.description {
            let _ = write!(body, "\n\nYou subscribed with the note: {description}");
        }

        OutboundMessage {
            to: self.recipient.clone(),
            subject: format!("New {} sighting", self.animal_name),
            body,
            is_html: false,
            is_multipart: false,
        }
    }
}
