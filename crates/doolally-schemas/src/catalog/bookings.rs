//! Event booking and review payloads.
//!
//! `EventResp` and `EventSingle` share the date/time/description block
//! through a common `Event` base, each re-declaring `description` with its
//! own bounds.

use doolally_core::{
    union_with_null, Field, FieldExt, NumberField, Schema, SchemaError, StaticTypeArray,
    StringField,
};

use super::accounts::ID_LEN;
use crate::validators::{
    event_date, hexstring_of_length, iso_timestamp, javascript_date, time_of_day,
};

const DESCRIPTION_MAX: usize = 4096;

fn time_field(description: &str) -> Field {
    StringField::new()
        .required()
        .described(description)
        .validated_by(time_of_day())
}

fn event_description() -> StringField {
    StringField::new().min_length(1)
}

fn price(description: &str) -> Field {
    NumberField::new().min_value(0).required().described(description)
}

fn weight() -> NumberField {
    NumberField::new().integer().min_value(0).max_value(255)
}

fn b64_string(description: &str) -> Field {
    StringField::new().required().described(description)
}

/// Fields common to every rendering of a booked event.
fn event_base() -> Schema {
    Schema::builder("Event")
        .field(
            "date",
            StringField::new()
                .required()
                .described("date of event")
                .validated_by(event_date()),
        )
        .field("start_time", time_field("start time of event"))
        .field("end_time", time_field("end time of event"))
        .field("description", event_description().required().described("description of event"))
        .build()
}

pub fn new_event_req() -> Schema {
    Schema::builder("NewEventReq")
        .description("data to create a new event")
        .field("name", StringField::new().required().described("name of contact"))
        .field(
            "phone_or_email",
            StringField::new().required().described("phone or email of contact"),
        )
        .field(
            "date",
            StringField::new()
                .required()
                .described("date of event")
                .validated_by(javascript_date()),
        )
        .field("start_time", time_field("start time of event"))
        .field("end_time", time_field("end time of event"))
        .field(
            "description",
            event_description()
                .max_length(DESCRIPTION_MAX)
                .required()
                .described("description of event"),
        )
        .field("total_price", price("total price of event"))
        .field("deposit", price("deposit amount of event"))
        .build()
}

pub fn new_event_resp() -> Schema {
    Schema::builder("NewEventResp")
        .description("response of newly created event")
        .field("event_id", b64_string("event_id urlsafe b64 encoded"))
        .field("user_token", b64_string("user token, urlsafe b64 encoded"))
        .build()
}

pub fn review() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("Review")
        .description("stored review")
        .field("review", StringField::new().required().described("review"))
        .field(
            "creation_time",
            StringField::new()
                .required()
                .described("creation time of review")
                .validated_by(iso_timestamp()),
        )
        .field(
            "response",
            union_with_null([StringField::new().described("response by tulip")])?.required(),
        )
        .field(
            "response_time",
            union_with_null([StringField::new()
                .described("time of response")
                .validated_by(iso_timestamp())])?
            .required(),
        )
        .build())
}

pub fn event_resp() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("EventResp")
        .description("event response for an individual event")
        .extends(&event_base())
        .field(
            "description",
            event_description()
                .max_length(DESCRIPTION_MAX)
                .required()
                .described("description of event"),
        )
        .field("total_price", price("total price of event"))
        .field("deposit", price("deposit amount of event"))
        .field("review", union_with_null([review()?.into()])?.required())
        .build())
}

pub fn event_single() -> Schema {
    Schema::builder("EventSingle")
        .description("single event for events admin screen")
        .extends(&event_base())
        .field("event_id", b64_string("event_id urlsafe b64 encoded"))
        .field("user_token", b64_string("user token, urlsafe b64 encoded"))
        .build()
}

pub fn events_resp() -> Schema {
    Schema::builder("EventsResp")
        .description("all events")
        .field("events", StaticTypeArray::new(event_single()).required())
        .build()
}

pub fn new_review_req() -> Schema {
    Schema::builder("NewReviewReq")
        .description("new review")
        .field(
            "review",
            StringField::new()
                .min_length(1)
                .max_length(DESCRIPTION_MAX)
                .required()
                .described("review to be posted"),
        )
        .field(
            "event_id",
            StringField::new()
                .min_length(16)
                .required()
                .described("event to which review is attached"),
        )
        .build()
}

pub fn new_review_resp() -> Schema {
    Schema::builder("NewReviewResp")
        .description("respond to new review with review id")
        .field("review_id", hexstring_of_length(ID_LEN).required().described("review id"))
        .build()
}

pub fn review_single() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("ReviewSingle")
        .field("review_id", hexstring_of_length(ID_LEN).required())
        .field("weight", weight().required())
        .field("review", StringField::new().required())
        .field("event_id", union_with_null([StringField::new().into()])?.required())
        .field("user_token", union_with_null([StringField::new().into()])?.required())
        .build())
}

pub fn reviews_resp() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("ReviewsResp")
        .field("reviews", StaticTypeArray::new(review_single()?).required())
        .build())
}

pub fn new_review_response_req() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("NewReviewResponseReq")
        .description("respond to an existing review")
        .field("review_id", hexstring_of_length(ID_LEN).required().described("review id"))
        .field("weight", weight().required().described("weight"))
        .field(
            "response",
            union_with_null([StringField::new()
                .max_length(DESCRIPTION_MAX)
                .described("tulip response to comment")])?
            .required(),
        )
        .build())
}

pub(super) fn schemas() -> Result<Vec<Schema>, SchemaError> {
    Ok(vec![
        new_event_req(),
        new_event_resp(),
        review()?,
        event_resp()?,
        event_single(),
        events_resp(),
        new_review_req(),
        new_review_resp(),
        review_single()?,
        reviews_resp()?,
        new_review_response_req()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use doolally_core::validate;
    use serde_json::{json, Value};

    fn event_single_doc() -> Value {
        json!({
            "date": "Fri 01 Mar 2024",
            "startTime": "14:00",
            "endTime": "16:30",
            "description": "birthday party",
            "eventId": "ZXZlbnQtMQ",
            "userToken": "dG9rZW4"
        })
    }

    #[test]
    fn test_event_single_inherits_base_fields() {
        let schema = event_single();
        let keys: Vec<&str> = schema.fields().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            ["date", "startTime", "endTime", "description", "eventId", "userToken"]
        );
        assert!(validate(&event_single_doc(), &schema).is_ok());
    }

    #[test]
    fn test_event_resp_overrides_description_in_place() {
        let schema = event_resp().unwrap();
        let keys: Vec<&str> = schema.fields().map(|(key, _)| key).collect();
        assert_eq!(keys[3], "description");
        assert_eq!(
            schema.field("description").unwrap().to_string(),
            "String(min_length=1,max_length=4096)"
        );
    }

    #[test]
    fn test_event_resp_with_and_without_review() {
        let schema = event_resp().unwrap();
        let mut doc = json!({
            "date": "Fri 01 Mar 2024",
            "startTime": "14:00",
            "endTime": "16:30",
            "description": "birthday party",
            "totalPrice": 120,
            "deposit": 20.5,
            "review": null
        });
        assert!(validate(&doc, &schema).is_ok());

        doc["review"] = json!({
            "review": "great",
            "creationTime": "2024-03-02T09:00:00",
            "response": null,
            "responseTime": null
        });
        assert!(validate(&doc, &schema).is_ok());

        doc["review"]["creationTime"] = json!("soon");
        let err = validate(&doc, &schema).unwrap_err();
        let err = err.as_validation().unwrap();
        assert_eq!(err.path(), "/review");
        assert_eq!(err.message(), "no element_field in union passes validation");
    }

    #[test]
    fn test_new_event_req_date_format() {
        let mut doc = json!({
            "name": "Ann",
            "phoneOrEmail": "ann@example.com",
            "date": "2024-03-01",
            "startTime": "14:00",
            "endTime": "16:00",
            "description": "party",
            "totalPrice": 100,
            "deposit": 0
        });
        assert!(validate(&doc, &new_event_req()).is_ok());
        doc["date"] = json!("Fri 01 Mar 2024");
        let err = validate(&doc, &new_event_req()).unwrap_err();
        assert_eq!(err.as_validation().unwrap().path(), "/date");
    }

    #[test]
    fn test_review_weight_bounds() {
        let schema = new_review_response_req().unwrap();
        let doc = |weight: Value| {
            json!({
                "reviewId": "00112233445566778899aabbccddeeff",
                "weight": weight,
                "response": null
            })
        };
        assert!(validate(&doc(json!(255)), &schema).is_ok());
        assert!(validate(&doc(json!(256)), &schema).is_err());
        assert!(validate(&doc(json!(1.5)), &schema).is_err());
    }
}
