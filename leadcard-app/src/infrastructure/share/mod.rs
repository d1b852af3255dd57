mod webhook;

pub use webhook::WebhookShareTarget;
