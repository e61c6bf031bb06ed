//! Contact form and message board payloads.

use doolally_core::{FieldExt, NumberField, Schema, StaticTypeArray, StringField};

use super::accounts::ID_LEN;
use crate::validators::{email_address, hexstring_of_length, iso_timestamp, phone_number};

const NAME: &str = "self identifying name of person";
const MESSAGE: &str = "message from person";
const PHONE_OR_EMAIL: &str = "self described phone or email of person";

fn contact_message(max: usize) -> StringField {
    StringField::new().min_length(2).max_length(max)
}

fn board_name() -> StringField {
    StringField::new().min_length(2).max_length(32)
}

pub fn contact_by_email_req() -> Schema {
    Schema::builder("ContactByEmailReq")
        .description("contact by email request payload")
        .field("name", StringField::new().min_length(2).required().described(NAME))
        .field(
            "email",
            StringField::new()
                .required()
                .described("self described email of person")
                .validated_by(email_address()),
        )
        .field("message", contact_message(2048).required().described(MESSAGE))
        .build()
}

pub fn contact_by_number_req() -> Schema {
    Schema::builder("ContactByNumberReq")
        .description("contact by number request payload")
        .field("name", StringField::new().min_length(2).required().described(NAME))
        .field(
            "number",
            StringField::new()
                .required()
                .described("self described number of person")
                .validated_by(phone_number()),
        )
        .field("message", contact_message(2048).required().described(MESSAGE))
        .build()
}

pub fn new_message_req() -> Schema {
    Schema::builder("NewMessageReq")
        .description("leave a message on the board")
        .field("name", board_name().required().described(NAME))
        .field("phone_or_email", StringField::new().required().described(PHONE_OR_EMAIL))
        .field("message", contact_message(8192).required().described(MESSAGE))
        .build()
}

pub fn message() -> Schema {
    Schema::builder("Message")
        .description("an individual message stored on the server")
        .field("name", board_name().required().described(NAME))
        .field("phone_or_email", StringField::new().required().described(PHONE_OR_EMAIL))
        .field(
            "contact_id",
            hexstring_of_length(ID_LEN).required().described("contact id of individual"),
        )
        .field("message", contact_message(4096).required().described(MESSAGE))
        .field(
            "creation_time",
            StringField::new()
                .required()
                .described("timestamp message was created")
                .validated_by(iso_timestamp()),
        )
        .build()
}

pub fn messages_resp() -> Schema {
    Schema::builder("MessagesResp")
        .description("array of messages received by server")
        .field(
            "messages",
            StaticTypeArray::new(message()).required().described("an individual message"),
        )
        .build()
}

pub fn contact_query_resp() -> Schema {
    Schema::builder("ContactQueryResp")
        .description("contact query to see if session_id has been used")
        .field(
            "time_remaining",
            NumberField::new()
                .unsigned()
                .required()
                .described("time remaining in seconds before another request can be sent"),
        )
        .build()
}

pub fn new_contact_req() -> Schema {
    Schema::builder("NewContactReq")
        .description("create a new contact in DB")
        .field(
            "name",
            StringField::new().min_length(4).max_length(64).required().described("name of person"),
        )
        .field("phoneOrEmail", StringField::new().required().described("contact string"))
        .build()
}

pub fn new_contact_resp() -> Schema {
    Schema::builder("NewContactResp")
        .description("create a new contact response - contains contact_id")
        .field(
            "contact_id",
            hexstring_of_length(ID_LEN).required().described("contact_id of created contact"),
        )
        .build()
}

pub(super) fn schemas() -> Vec<Schema> {
    vec![
        contact_by_email_req(),
        contact_by_number_req(),
        new_message_req(),
        message(),
        messages_resp(),
        contact_query_resp(),
        new_contact_req(),
        new_contact_resp(),
    ]
}
