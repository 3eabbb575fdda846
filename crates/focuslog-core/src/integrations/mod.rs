pub mod webhook;

pub use webhook::{DeliveryResult, WebhookClient, WebhookEventType, WebhookPayload};
