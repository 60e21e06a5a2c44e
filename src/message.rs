use chrono::Utc;
use lapin::BasicProperties;
use uuid::Uuid;

/// An outbound message: a byte payload and the type label it is published under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Publishing {
    pub body: Vec<u8>,
    pub kind: String,
}

impl Publishing {
    pub fn new(kind: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Publishing {
            body: body.into(),
            kind: kind.into(),
        }
    }

    /// AMQP properties for this message. The type label goes into the `type` property,
    /// `app_id` carries the client tag.
    pub fn properties(&self, app_id: &str) -> BasicProperties {
        BasicProperties::default()
            .with_type(self.kind.clone().into())
            .with_message_id(Uuid::new_v4().to_string().into())
            .with_timestamp(Utc::now().timestamp() as u64)
            .with_app_id(app_id.to_string().into())
    }
}
